// ============================================
// Model Inference Client
// ============================================
//
// Batch scoring against TensorFlow-Serving style REST endpoints:
//   POST {"instances": [ {...}, {...} ]}
//   200  {"predictions": [[0.83], [0.12]]}
//
// One prediction per instance, in request order. Anything else is
// rejected; scores are never padded or defaulted.

use crate::error::{RecommendationError, Result};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictRequest {
    pub instances: Vec<serde_json::Value>,
}

impl PredictRequest {
    pub fn from_instances<T: Serialize>(instances: &[T]) -> Result<Self> {
        let instances = instances
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| RecommendationError::Inference(format!("Request encoding failed: {}", e)))?;

        Ok(Self { instances })
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    pub predictions: Vec<Vec<f64>>,
}

impl PredictResponse {
    /// First output of each prediction, checked against the request size.
    pub fn into_scores(self, expected: usize) -> Result<Vec<f64>> {
        if self.predictions.len() != expected {
            return Err(RecommendationError::MalformedResponse(format!(
                "Expected {} predictions, got {}",
                expected,
                self.predictions.len()
            )));
        }

        self.predictions
            .into_iter()
            .enumerate()
            .map(|(i, prediction)| match prediction.first() {
                Some(score) if score.is_finite() => Ok(*score),
                Some(score) => Err(RecommendationError::MalformedResponse(format!(
                    "Prediction {} is not finite: {}",
                    i, score
                ))),
                None => Err(RecommendationError::MalformedResponse(format!(
                    "Prediction {} is empty",
                    i
                ))),
            })
            .collect()
    }
}

#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Score every instance of `request` against the model at `endpoint`.
    async fn predict(&self, endpoint: &str, request: &PredictRequest) -> Result<Vec<f64>>;
}

/// reqwest-backed client; the underlying connection pool is shared by all
/// requests.
pub struct HttpInferenceClient {
    client: HttpClient,
}

impl HttpInferenceClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                RecommendationError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn predict(&self, endpoint: &str, request: &PredictRequest) -> Result<Vec<f64>> {
        debug!(
            "Sending {} instances to model endpoint {}",
            request.len(),
            endpoint
        );

        let response = self.client.post(endpoint).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RecommendationError::Inference(format!(
                "Model endpoint returned {}: {}",
                status, error_text
            )));
        }

        let body = response.bytes().await?;
        let parsed: PredictResponse = serde_json::from_slice(&body)?;

        parsed.into_scores(request.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(n: usize) -> PredictRequest {
        PredictRequest {
            instances: (0..n).map(|i| json!({"userId": 1, "movieId": i})).collect(),
        }
    }

    fn client() -> HttpInferenceClient {
        HttpInferenceClient::new(Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_into_scores_rejects_short_response() {
        let response = PredictResponse {
            predictions: vec![vec![0.4]],
        };
        assert!(matches!(
            response.into_scores(2),
            Err(RecommendationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_into_scores_rejects_empty_prediction() {
        let response = PredictResponse {
            predictions: vec![vec![0.4], vec![]],
        };
        assert!(response.into_scores(2).is_err());
    }

    #[tokio::test]
    async fn test_predict_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/models/recmodel:predict"))
            .and(body_json(json!({
                "instances": [{"userId": 1, "movieId": 0}, {"userId": 1, "movieId": 1}]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"predictions": [[0.9], [0.1]]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = format!("{}/v1/models/recmodel:predict", server.uri());
        let scores = client().predict(&endpoint, &request(2)).await.unwrap();

        assert_eq!(scores, vec![0.9, 0.1]);
    }

    #[tokio::test]
    async fn test_predict_undersized_response_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"predictions": [[0.9]]})),
            )
            .mount(&server)
            .await;

        let result = client().predict(&server.uri(), &request(3)).await;
        assert!(matches!(
            result,
            Err(RecommendationError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_predict_missing_predictions_field_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "oops"})))
            .mount(&server)
            .await;

        let result = client().predict(&server.uri(), &request(1)).await;
        assert!(matches!(
            result,
            Err(RecommendationError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_predict_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let result = client().predict(&server.uri(), &request(1)).await;
        match result {
            Err(RecommendationError::Inference(msg)) => assert!(msg.contains("model not loaded")),
            other => panic!("expected inference error, got {:?}", other),
        }
    }
}
