use super::{RecallSource, RecallStrategy};
use crate::error::Result;
use crate::gateways::MovieCatalog;
use crate::models::{Movie, SortKey, User};
use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::debug;

/// Genre Recall Strategy
///
/// Highest-rated movies for each preferred genre (`userGenre1..5`).
pub struct GenreRecallStrategy {
    catalog: Arc<dyn MovieCatalog>,
    per_genre_limit: i64,
    max_genres: usize,
}

impl GenreRecallStrategy {
    pub fn new(catalog: Arc<dyn MovieCatalog>, per_genre_limit: i64, max_genres: usize) -> Self {
        Self {
            catalog,
            per_genre_limit,
            max_genres,
        }
    }
}

#[async_trait]
impl RecallStrategy for GenreRecallStrategy {
    async fn recall(&self, user: &User) -> Result<Vec<Movie>> {
        let genres = user.preferred_genres(self.max_genres);

        if genres.is_empty() {
            debug!("User {} has no genre preferences", user.user_id);
            return Ok(Vec::new());
        }

        // Lookups are independent; results are concatenated in genre order
        let batches = try_join_all(genres.iter().map(|genre| {
            self.catalog
                .get_movies_by_genre(genre, self.per_genre_limit, SortKey::Rating)
        }))
        .await?;

        Ok(batches.into_iter().flatten().collect())
    }

    fn source(&self) -> RecallSource {
        RecallSource::Genre
    }
}
