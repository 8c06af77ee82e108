mod genre_recall;
mod latest_recall;
mod top_rated_recall;

use crate::config::RecallConfig;
use crate::error::Result;
use crate::gateways::MovieCatalog;
use crate::models::{Movie, MovieId, RecallSource, RecallStats, User};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub use genre_recall::GenreRecallStrategy;
pub use latest_recall::LatestRecallStrategy;
pub use top_rated_recall::TopRatedRecallStrategy;

/// One source of candidates.
#[async_trait]
pub trait RecallStrategy: Send + Sync {
    async fn recall(&self, user: &User) -> Result<Vec<Movie>>;
    fn source(&self) -> RecallSource;
}

/// Candidates keyed by movie id.
///
/// A repeated id replaces the stored movie in place, so iteration follows the
/// order in which ids were first seen.
#[derive(Debug, Default)]
pub struct CandidatePool {
    movies: Vec<Movie>,
    index: HashMap<MovieId, usize>,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, movie: Movie) {
        match self.index.get(&movie.movie_id) {
            Some(&pos) => self.movies[pos] = movie,
            None => {
                self.index.insert(movie.movie_id, self.movies.len());
                self.movies.push(movie);
            }
        }
    }

    pub fn extend(&mut self, movies: impl IntoIterator<Item = Movie>) {
        for movie in movies {
            self.insert(movie);
        }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn into_movies(self) -> Vec<Movie> {
        self.movies
    }
}

/// Runs every recall strategy and merges the results into one pool.
pub struct RecallLayer {
    strategies: Vec<Box<dyn RecallStrategy>>,
}

impl RecallLayer {
    /// Genre, top-rated and latest recall, merged in that order.
    pub fn new(catalog: Arc<dyn MovieCatalog>, config: RecallConfig) -> Self {
        let strategies: Vec<Box<dyn RecallStrategy>> = vec![
            Box::new(GenreRecallStrategy::new(
                catalog.clone(),
                config.genre_recall_limit,
                config.max_user_genres,
            )),
            Box::new(TopRatedRecallStrategy::new(
                catalog.clone(),
                config.top_rated_recall_limit,
            )),
            Box::new(LatestRecallStrategy::new(catalog, config.latest_recall_limit)),
        ];

        Self { strategies }
    }

    pub fn with_strategies(strategies: Vec<Box<dyn RecallStrategy>>) -> Self {
        Self { strategies }
    }

    /// Strategies run sequentially and any gateway failure aborts the recall.
    pub async fn recall_candidates(&self, user: &User) -> Result<(Vec<Movie>, RecallStats)> {
        let mut pool = CandidatePool::new();
        let mut stats = RecallStats::default();

        for strategy in &self.strategies {
            let candidates = strategy.recall(user).await?;
            match strategy.source() {
                RecallSource::Genre => stats.genre_recall_count += candidates.len(),
                RecallSource::TopRated => stats.top_rated_recall_count += candidates.len(),
                RecallSource::Latest => stats.latest_recall_count += candidates.len(),
            }
            pool.extend(candidates);
        }

        stats.total_candidates = pool.len();

        info!(
            "Recall completed: user_id={}, genre={}, top_rated={}, latest={}, total={}",
            user.user_id,
            stats.genre_recall_count,
            stats.top_rated_recall_count,
            stats.latest_recall_count,
            stats.total_candidates
        );

        Ok((pool.into_movies(), stats))
    }
}
