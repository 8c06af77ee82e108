// Utility functions for recommendation-service

use crate::error::{RecommendationError, Result};
use crate::models::Embedding;
use std::collections::HashMap;
use std::str::FromStr;

/// Parse a cached embedding string ("0.12 -0.3 0.9" or "0.12,-0.3,0.9").
/// Returns `None` for empty or non-numeric input.
pub fn parse_embedding(raw: &str) -> Option<Embedding> {
    let values: Option<Vec<f32>> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<f32>().ok())
        .collect();

    match values {
        Some(values) if !values.is_empty() => Some(Embedding::new(values)),
        _ => None,
    }
}

/// Read a required numeric feature from a string-typed feature map.
pub fn parse_feature<T: FromStr>(features: &HashMap<String, String>, name: &str) -> Result<T> {
    let value = features
        .get(name)
        .ok_or_else(|| RecommendationError::MissingFeature(name.to_string()))?;

    value
        .trim()
        .parse::<T>()
        .map_err(|_| RecommendationError::InvalidFeature {
            name: name.to_string(),
            value: value.clone(),
        })
}
