//! Ranking Module
//!
//! Scores the recalled candidates under one of the ranking strategies and
//! orders them best first.
//!
//! # Strategies
//! - **Embedding**: cosine similarity between user and movie embeddings
//! - **NeuralCF**: remote neural collaborative filtering model
//! - **DIN**: remote deep interest network model with user/movie features
//! - **Default**: keeps the recall order
//!
//! Scores are carried as a list parallel to the candidates, so each
//! candidate receives exactly one score and nothing is keyed by identity.
pub mod din;
pub mod neural_cf;
pub mod similarity;

use crate::error::{RecommendationError, Result};
use crate::models::{Movie, RankedMovie, User, MISSING_SIMILARITY};
use crate::services::inference::{InferenceClient, PredictRequest};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankingStrategy {
    Embedding,
    NeuralCf,
    Din,
    Default,
}

impl RankingStrategy {
    /// Unrecognised names select [`RankingStrategy::Default`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "emb" => RankingStrategy::Embedding,
            "neuralcf" => RankingStrategy::NeuralCf,
            "din" => RankingStrategy::Din,
            _ => RankingStrategy::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RankingStrategy::Embedding => "emb",
            RankingStrategy::NeuralCf => "neuralcf",
            RankingStrategy::Din => "din",
            RankingStrategy::Default => "default",
        }
    }
}

/// Prediction endpoints of the served models.
#[derive(Debug, Clone)]
pub struct ModelEndpoints {
    pub neural_cf: String,
    pub din: String,
}

/// Scores candidates with the selected strategy and orders them.
pub struct RankingLayer {
    inference: Arc<dyn InferenceClient>,
    endpoints: ModelEndpoints,
}

impl RankingLayer {
    pub fn new(inference: Arc<dyn InferenceClient>, endpoints: ModelEndpoints) -> Self {
        Self {
            inference,
            endpoints,
        }
    }

    /// Rank `candidates` for `user`, best first.
    ///
    /// Remote strategies must return exactly one score per candidate.
    pub async fn rank_candidates(
        &self,
        user: &User,
        candidates: Vec<Movie>,
        strategy: RankingStrategy,
    ) -> Result<Vec<RankedMovie>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let scores = match strategy {
            RankingStrategy::Embedding => similarity::embedding_scores(user, &candidates)?,
            RankingStrategy::NeuralCf => {
                let request = neural_cf::build_request(user, &candidates)?;
                self.remote_scores(&self.endpoints.neural_cf, user, strategy, &request)
                    .await?
            }
            RankingStrategy::Din => {
                // Feature parsing fails here, before any network call
                let request = din::build_request(user, &candidates)?;
                self.remote_scores(&self.endpoints.din, user, strategy, &request)
                    .await?
            }
            RankingStrategy::Default => recall_order_scores(candidates.len()),
        };

        sort_by_score(candidates, scores)
    }

    async fn remote_scores(
        &self,
        endpoint: &str,
        user: &User,
        strategy: RankingStrategy,
        request: &PredictRequest,
    ) -> Result<Vec<Option<f64>>> {
        debug!(
            "Sending user {} request to {} model ({} candidates)",
            user.user_id,
            strategy.as_str(),
            request.len()
        );

        let scores = self.inference.predict(endpoint, request).await?;
        if scores.len() != request.len() {
            return Err(RecommendationError::MalformedResponse(format!(
                "{} model returned {} scores for {} candidates",
                strategy.as_str(),
                scores.len(),
                request.len()
            )));
        }

        Ok(scores.into_iter().map(Some).collect())
    }
}

/// `N, N-1, ..., 1` for `N` candidates: preserves the recall order.
pub fn recall_order_scores(n: usize) -> Vec<Option<f64>> {
    (0..n).map(|i| Some((n - i) as f64)).collect()
}

/// Pair each candidate with its score and order best first.
///
/// Scored candidates come before unscored ones, which are reported with
/// [`MISSING_SIMILARITY`]. Ties break on ascending movie id.
pub fn sort_by_score(candidates: Vec<Movie>, scores: Vec<Option<f64>>) -> Result<Vec<RankedMovie>> {
    if candidates.len() != scores.len() {
        return Err(RecommendationError::MalformedResponse(format!(
            "Got {} scores for {} candidates",
            scores.len(),
            candidates.len()
        )));
    }

    let mut scored: Vec<(Movie, Option<f64>)> = candidates.into_iter().zip(scores).collect();

    scored.sort_by(|(a, a_score), (b, b_score)| {
        let by_score = match (a_score, b_score) {
            (Some(a_score), Some(b_score)) => b_score.total_cmp(a_score),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_score.then_with(|| a.movie_id.cmp(&b.movie_id))
    });

    Ok(scored
        .into_iter()
        .map(|(movie, score)| RankedMovie {
            movie,
            score: score.unwrap_or(MISSING_SIMILARITY),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Embedding, MovieId};
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        pub Inference {}

        #[async_trait]
        impl InferenceClient for Inference {
            async fn predict(&self, endpoint: &str, request: &PredictRequest) -> Result<Vec<f64>>;
        }
    }

    fn endpoints() -> ModelEndpoints {
        ModelEndpoints {
            neural_cf: "http://models/recmodel:predict".to_string(),
            din: "http://models/dinmodel:predict".to_string(),
        }
    }

    fn layer(mock: MockInference) -> RankingLayer {
        RankingLayer::new(Arc::new(mock), endpoints())
    }

    fn movies(ids: &[MovieId]) -> Vec<Movie> {
        ids.iter()
            .map(|id| Movie::new(*id, format!("Movie {}", id)))
            .collect()
    }

    fn ids(ranked: &[RankedMovie]) -> Vec<MovieId> {
        ranked.iter().map(|r| r.movie.movie_id).collect()
    }

    #[test]
    fn test_strategy_from_name() {
        assert_eq!(RankingStrategy::from_name("emb"), RankingStrategy::Embedding);
        assert_eq!(RankingStrategy::from_name("neuralcf"), RankingStrategy::NeuralCf);
        assert_eq!(RankingStrategy::from_name("DIN"), RankingStrategy::Din);
        assert_eq!(RankingStrategy::from_name("wide&deep"), RankingStrategy::Default);
        assert_eq!(RankingStrategy::from_name(""), RankingStrategy::Default);
    }

    #[test]
    fn test_sort_by_score_ties_break_on_movie_id() {
        let ranked =
            sort_by_score(movies(&[30, 10, 20]), vec![Some(0.5), Some(0.5), Some(0.9)]).unwrap();
        assert_eq!(ids(&ranked), vec![20, 10, 30]);
    }

    #[test]
    fn test_sort_by_score_rejects_count_mismatch() {
        let result = sort_by_score(movies(&[1, 2]), vec![Some(0.5)]);
        assert!(matches!(
            result,
            Err(RecommendationError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_embedding_ranking_opposite_beats_missing() {
        let mut mock = MockInference::new();
        mock.expect_predict().never();

        let user = User::new(1).with_embedding(Embedding::new(vec![1.0, 0.0]));
        let mut candidates = movies(&[1, 2]);
        candidates[1].embedding = Some(Embedding::new(vec![-1.0, 0.0]));

        let ranked = layer(mock)
            .rank_candidates(&user, candidates, RankingStrategy::Embedding)
            .await
            .unwrap();

        // Same reported score, but the unscored movie goes last despite its lower id
        assert_eq!(ids(&ranked), vec![2, 1]);
        assert_eq!(ranked[0].score, -1.0);
        assert_eq!(ranked[1].score, MISSING_SIMILARITY);
    }

    #[tokio::test]
    async fn test_remote_score_count_mismatch_fails() {
        let mut mock = MockInference::new();
        mock.expect_predict()
            .times(1)
            .returning(|_, _| Ok(vec![0.5]));

        let result = layer(mock)
            .rank_candidates(&User::new(5), movies(&[1, 2, 3]), RankingStrategy::NeuralCf)
            .await;

        assert!(matches!(
            result,
            Err(RecommendationError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_default_ranking_preserves_input_order() {
        let mut mock = MockInference::new();
        mock.expect_predict().never();

        let ranked = layer(mock)
            .rank_candidates(&User::new(1), movies(&[7, 3, 9]), RankingStrategy::Default)
            .await
            .unwrap();

        assert_eq!(ids(&ranked), vec![7, 3, 9]);
        let scores: Vec<f64> = ranked.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![3.0, 2.0, 1.0]);
    }

    #[tokio::test]
    async fn test_embedding_ranking_missing_embeddings_sort_last() {
        let mut mock = MockInference::new();
        mock.expect_predict().never();

        let user = User::new(1).with_embedding(Embedding::new(vec![1.0, 0.0]));
        let mut candidates = movies(&[1, 2, 3]);
        candidates[0].embedding = Some(Embedding::new(vec![0.0, 1.0]));
        candidates[2].embedding = Some(Embedding::new(vec![1.0, 0.1]));

        let ranked = layer(mock)
            .rank_candidates(&user, candidates, RankingStrategy::Embedding)
            .await
            .unwrap();

        assert_eq!(ids(&ranked), vec![3, 1, 2]);
        assert_eq!(ranked[2].score, MISSING_SIMILARITY);
    }

    #[tokio::test]
    async fn test_neural_cf_assigns_scores_positionally() {
        let mut mock = MockInference::new();
        mock.expect_predict()
            .withf(|endpoint, _| endpoint == "http://models/recmodel:predict")
            .times(1)
            .returning(|_, request| {
                assert_eq!(request.instances.len(), 3);
                assert_eq!(request.instances[1]["movieId"], 20);
                assert_eq!(request.instances[1]["userId"], 5);
                Ok(vec![0.1, 0.8, 0.4])
            });

        let ranked = layer(mock)
            .rank_candidates(&User::new(5), movies(&[10, 20, 30]), RankingStrategy::NeuralCf)
            .await
            .unwrap();

        assert_eq!(ids(&ranked), vec![20, 30, 10]);
    }

    #[tokio::test]
    async fn test_empty_candidates_skip_inference() {
        let mut mock = MockInference::new();
        mock.expect_predict().never();

        let ranked = layer(mock)
            .rank_candidates(&User::new(5), Vec::new(), RankingStrategy::NeuralCf)
            .await
            .unwrap();

        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn test_inference_failure_propagates() {
        let mut mock = MockInference::new();
        mock.expect_predict().returning(|_, _| {
            Err(RecommendationError::MalformedResponse(
                "Expected 2 predictions, got 1".to_string(),
            ))
        });

        let result = layer(mock)
            .rank_candidates(&User::new(5), movies(&[1, 2]), RankingStrategy::NeuralCf)
            .await;

        assert!(matches!(
            result,
            Err(RecommendationError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_din_invalid_features_fail_before_network() {
        let mut mock = MockInference::new();
        mock.expect_predict().never();

        // User has none of the DIN features
        let result = layer(mock)
            .rank_candidates(&User::new(5), movies(&[1]), RankingStrategy::Din)
            .await;

        assert!(matches!(
            result,
            Err(RecommendationError::MissingFeature(_))
        ));
    }

    #[tokio::test]
    async fn test_din_ranking_uses_model_scores() {
        let mut mock = MockInference::new();
        mock.expect_predict()
            .withf(|endpoint, request| {
                endpoint == "http://models/dinmodel:predict" && request.instances.len() == 3
            })
            .times(1)
            .returning(|_, _| Ok(vec![0.1, 0.5, 0.9]));

        let mut user = User::new(5)
            .with_feature("userAvgRating", "3.5")
            .with_feature("userRatingStddev", "0.8")
            .with_feature("userRatingCount", "120");
        for slot in 1..=5 {
            user = user.with_feature(format!("userRatedMovie{}", slot), slot.to_string());
        }

        let mut candidates = movies(&[1, 2, 3]);
        for movie in &mut candidates {
            for (name, value) in [
                ("movieAvgRating", "4.0"),
                ("movieRatingStddev", "0.9"),
                ("movieRatingCount", "300"),
                ("releaseYear", "1995"),
            ] {
                movie.features.insert(name.to_string(), value.to_string());
            }
        }

        let ranked = layer(mock)
            .rank_candidates(&user, candidates, RankingStrategy::Din)
            .await
            .unwrap();

        // Model order, not the recall order the default ranking would keep
        assert_eq!(ids(&ranked), vec![3, 2, 1]);
        let scores: Vec<f64> = ranked.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![0.9, 0.5, 0.1]);
    }
}
