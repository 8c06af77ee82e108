use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecommendationError>;

/// Failures surfaced by the recommendation pipeline.
///
/// Unknown users and absent optional data (embeddings, cached features) are
/// not errors; they degrade to empty results or sentinel scores instead.
#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    /// Transport-level failure or non-success status from a model endpoint.
    #[error("Inference request failed: {0}")]
    Inference(String),

    /// The endpoint answered, but not with one prediction per instance.
    #[error("Malformed inference response: {0}")]
    MalformedResponse(String),

    #[error("Missing feature: {0}")]
    MissingFeature(String),

    #[error("Invalid value {value:?} for feature {name}")]
    InvalidFeature { name: String, value: String },

    #[error("Embedding dimension mismatch: user={user}, item={item}")]
    DimensionMismatch { user: usize, item: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<sqlx::Error> for RecommendationError {
    fn from(err: sqlx::Error) -> Self {
        RecommendationError::Database(err.to_string())
    }
}

impl From<redis::RedisError> for RecommendationError {
    fn from(err: redis::RedisError) -> Self {
        RecommendationError::Cache(err.to_string())
    }
}

impl From<reqwest::Error> for RecommendationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RecommendationError::MalformedResponse(err.to_string())
        } else {
            RecommendationError::Inference(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RecommendationError {
    fn from(err: serde_json::Error) -> Self {
        RecommendationError::MalformedResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RecommendationError::InvalidFeature {
            name: "userAvgRating".to_string(),
            value: "n/a".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value \"n/a\" for feature userAvgRating"
        );

        let err = RecommendationError::DimensionMismatch { user: 10, item: 8 };
        assert_eq!(
            err.to_string(),
            "Embedding dimension mismatch: user=10, item=8"
        );
    }

    #[test]
    fn test_from_json_error_is_malformed_response() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: RecommendationError = json_err.into();
        assert!(matches!(err, RecommendationError::MalformedResponse(_)));
    }
}
