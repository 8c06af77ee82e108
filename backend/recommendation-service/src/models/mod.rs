use crate::error::{RecommendationError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type UserId = i64;
pub type MovieId = i64;

/// Score reported when a similarity cannot be computed. Equal to the lowest
/// cosine similarity; ranking still places such candidates after every
/// computed score.
pub const MISSING_SIMILARITY: f64 = -1.0;

/// Dense latent vector for a user or a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Cosine similarity with `other`, clamped to `[-1, 1]`.
    ///
    /// Vectors of different length indicate corrupt embedding data and are
    /// rejected. A zero-magnitude vector has no direction, so there is no
    /// similarity.
    pub fn cosine_similarity(&self, other: &Embedding) -> Result<Option<f64>> {
        if self.dimension() != other.dimension() {
            return Err(RecommendationError::DimensionMismatch {
                user: self.dimension(),
                item: other.dimension(),
            });
        }

        let mut dot = 0.0_f64;
        let mut norm_a = 0.0_f64;
        let mut norm_b = 0.0_f64;
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            let (a, b) = (f64::from(*a), f64::from(*b));
            dot += a * b;
            norm_a += a * a;
            norm_b += b * b;
        }

        let denominator = norm_a.sqrt() * norm_b.sqrt();
        if denominator == 0.0 {
            return Ok(None);
        }

        // Rounding can land just outside the range for (anti)parallel vectors
        Ok(Some((dot / denominator).clamp(-1.0, 1.0)))
    }
}

/// User profile as stored in the catalog database.
///
/// Values are immutable; cached state is applied with [`User::hydrate`],
/// which returns a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub embedding: Option<Embedding>,
    pub features: HashMap<String, String>,
}

/// Optional overrides loaded from the feature cache.
#[derive(Debug, Clone, Default)]
pub struct CachedUserState {
    pub embedding: Option<Embedding>,
    pub features: Option<HashMap<String, String>>,
}

impl User {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            embedding: None,
            features: HashMap::new(),
        }
    }

    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_feature(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.features.insert(name.into(), value.into());
        self
    }

    /// Build the request-scoped user from the stored record plus whatever the
    /// cache had. Absent overrides keep the stored values.
    pub fn hydrate(self, cached: CachedUserState) -> Self {
        Self {
            user_id: self.user_id,
            embedding: cached.embedding.or(self.embedding),
            features: cached.features.unwrap_or(self.features),
        }
    }

    pub fn feature(&self, name: &str) -> Option<&str> {
        self.features.get(name).map(String::as_str)
    }

    /// Genre preference tags `userGenre1..userGenre{max}`, first-seen order,
    /// duplicates and absent slots dropped.
    pub fn preferred_genres(&self, max: usize) -> Vec<String> {
        let mut genres: Vec<String> = Vec::with_capacity(max);
        for slot in 1..=max {
            if let Some(genre) = self.feature(&format!("userGenre{}", slot)) {
                if !genre.is_empty() && !genres.iter().any(|g| g == genre) {
                    genres.push(genre.to_string());
                }
            }
        }
        genres
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub movie_id: MovieId,
    pub title: String,
    pub release_year: Option<i32>,
    pub average_rating: f64,
    pub genres: Vec<String>,
    pub embedding: Option<Embedding>,
    pub features: HashMap<String, String>,
}

impl Movie {
    pub fn new(movie_id: MovieId, title: impl Into<String>) -> Self {
        Self {
            movie_id,
            title: title.into(),
            release_year: None,
            average_rating: 0.0,
            genres: Vec::new(),
            embedding: None,
            features: HashMap::new(),
        }
    }

    pub fn feature(&self, name: &str) -> Option<&str> {
        self.features.get(name).map(String::as_str)
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

/// Ordering keys understood by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Rating,
    ReleaseYear,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Rating => "rating",
            SortKey::ReleaseYear => "releaseYear",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecallSource {
    Genre,     // top-rated within the user's preferred genres
    TopRated,  // top-rated overall
    Latest,    // most recent releases
}

impl RecallSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecallSource::Genre => "genre",
            RecallSource::TopRated => "top_rated",
            RecallSource::Latest => "latest",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedMovie {
    pub movie: Movie,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecallStats {
    pub genre_recall_count: usize,
    pub top_rated_recall_count: usize,
    pub latest_recall_count: usize,
    pub total_candidates: usize,
}
