use super::{RecallSource, RecallStrategy};
use crate::error::Result;
use crate::gateways::MovieCatalog;
use crate::models::{Movie, SortKey, User};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Top Rated Recall Strategy
///
/// Highest-rated movies across the whole catalog, independent of the user.
pub struct TopRatedRecallStrategy {
    catalog: Arc<dyn MovieCatalog>,
    limit: i64,
}

impl TopRatedRecallStrategy {
    pub fn new(catalog: Arc<dyn MovieCatalog>, limit: i64) -> Self {
        Self { catalog, limit }
    }
}

#[async_trait]
impl RecallStrategy for TopRatedRecallStrategy {
    async fn recall(&self, _user: &User) -> Result<Vec<Movie>> {
        let movies = self
            .catalog
            .get_top_movies(self.limit, SortKey::Rating)
            .await?;

        if movies.is_empty() {
            warn!("No rated movies found in catalog");
        }

        Ok(movies)
    }

    fn source(&self) -> RecallSource {
        RecallSource::TopRated
    }
}
