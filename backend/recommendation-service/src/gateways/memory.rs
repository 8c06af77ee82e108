use super::{FeatureCache, MovieCatalog, UserStore};
use crate::error::Result;
use crate::models::{Movie, MovieId, SortKey, User, UserId};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Catalog held entirely in memory, loaded once at construction.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    movies: HashMap<MovieId, Movie>,
}

impl InMemoryCatalog {
    pub fn new(movies: impl IntoIterator<Item = Movie>) -> Self {
        Self {
            movies: movies.into_iter().map(|m| (m.movie_id, m)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    fn sorted<'a>(
        movies: impl Iterator<Item = &'a Movie>,
        limit: i64,
        sort_key: SortKey,
    ) -> Vec<Movie> {
        let mut selected: Vec<&Movie> = movies.collect();
        selected.sort_by(|a, b| compare_by(a, b, sort_key));

        let limit = usize::try_from(limit).unwrap_or(0);
        selected.into_iter().take(limit).cloned().collect()
    }
}

/// Descending by the sort key, ascending movie id on ties.
fn compare_by(a: &Movie, b: &Movie, sort_key: SortKey) -> Ordering {
    let primary = match sort_key {
        SortKey::Rating => b.average_rating.total_cmp(&a.average_rating),
        // Unknown release years go last
        SortKey::ReleaseYear => b.release_year.cmp(&a.release_year),
    };
    primary.then_with(|| a.movie_id.cmp(&b.movie_id))
}

#[async_trait]
impl MovieCatalog for InMemoryCatalog {
    async fn get_movie(&self, movie_id: MovieId) -> Result<Option<Movie>> {
        Ok(self.movies.get(&movie_id).cloned())
    }

    async fn get_movies_by_genre(
        &self,
        genre: &str,
        limit: i64,
        sort_key: SortKey,
    ) -> Result<Vec<Movie>> {
        Ok(Self::sorted(
            self.movies.values().filter(|m| m.has_genre(genre)),
            limit,
            sort_key,
        ))
    }

    async fn get_top_movies(&self, limit: i64, sort_key: SortKey) -> Result<Vec<Movie>> {
        Ok(Self::sorted(self.movies.values(), limit, sort_key))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    users: HashMap<UserId, User>,
}

impl InMemoryUserStore {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.user_id, u)).collect(),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        Ok(self.users.get(&user_id).cloned())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCache {
    strings: HashMap<String, String>,
    hashes: HashMap<String, HashMap<String, String>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.strings.insert(key.into(), value.into());
        self
    }

    pub fn with_hash(mut self, key: impl Into<String>, fields: HashMap<String, String>) -> Self {
        self.hashes.insert(key.into(), fields);
        self
    }
}

#[async_trait]
impl FeatureCache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.strings.get(key).cloned())
    }

    async fn hash_get_all(&self, key: &str) -> Result<Option<HashMap<String, String>>> {
        Ok(self.hashes.get(key).filter(|h| !h.is_empty()).cloned())
    }
}
