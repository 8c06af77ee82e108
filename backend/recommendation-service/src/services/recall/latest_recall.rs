use super::{RecallSource, RecallStrategy};
use crate::error::Result;
use crate::gateways::MovieCatalog;
use crate::models::{Movie, SortKey, User};
use async_trait::async_trait;
use std::sync::Arc;

/// Latest Recall Strategy
///
/// Most recent movies by release year.
pub struct LatestRecallStrategy {
    catalog: Arc<dyn MovieCatalog>,
    limit: i64,
}

impl LatestRecallStrategy {
    pub fn new(catalog: Arc<dyn MovieCatalog>, limit: i64) -> Self {
        Self { catalog, limit }
    }
}

#[async_trait]
impl RecallStrategy for LatestRecallStrategy {
    async fn recall(&self, _user: &User) -> Result<Vec<Movie>> {
        self.catalog
            .get_top_movies(self.limit, SortKey::ReleaseYear)
            .await
    }

    fn source(&self) -> RecallSource {
        RecallSource::Latest
    }
}
