// ============================================
// Data Gateways
// ============================================
// Read-only access to the movie catalog, user profiles and the
// feature cache. Implementations must be safe to share across
// concurrent requests.

mod memory;
mod postgres;
mod redis_cache;

pub use memory::{InMemoryCache, InMemoryCatalog, InMemoryUserStore};
pub use postgres::{migrate, PgMovieCatalog, PgUserStore};
pub use redis_cache::RedisFeatureCache;

use crate::error::Result;
use crate::models::{Movie, MovieId, SortKey, User, UserId};
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn get_movie(&self, movie_id: MovieId) -> Result<Option<Movie>>;

    /// Movies tagged with `genre`, best first under `sort_key`.
    async fn get_movies_by_genre(
        &self,
        genre: &str,
        limit: i64,
        sort_key: SortKey,
    ) -> Result<Vec<Movie>>;

    /// Whole-catalog top-N under `sort_key`.
    async fn get_top_movies(&self, limit: i64, sort_key: SortKey) -> Result<Vec<Movie>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>>;
}

/// Key-value cache holding precomputed user embeddings and feature hashes.
#[async_trait]
pub trait FeatureCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// All fields of a hash; `None` when the key does not exist.
    async fn hash_get_all(&self, key: &str) -> Result<Option<HashMap<String, String>>>;
}

/// Cache key for a user's serialized embedding.
pub fn user_embedding_key(user_id: UserId) -> String {
    format!("uEmb:{}", user_id)
}

/// Cache key for a user's feature hash.
pub fn user_features_key(user_id: UserId) -> String {
    format!("uf:{}", user_id)
}
