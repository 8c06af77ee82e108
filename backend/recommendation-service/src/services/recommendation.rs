use crate::error::Result;
use crate::gateways::{user_embedding_key, user_features_key, FeatureCache, UserStore};
use crate::models::{CachedUserState, RankedMovie, User, UserId};
use crate::services::ranking::{RankingLayer, RankingStrategy};
use crate::services::recall::RecallLayer;
use crate::utils::parse_embedding;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Which cached user state to apply before recall.
#[derive(Debug, Clone, Copy)]
pub struct HydrationConfig {
    pub embedding: bool,
    pub features: bool,
}

impl Default for HydrationConfig {
    fn default() -> Self {
        Self {
            embedding: true,
            features: true,
        }
    }
}

/// Entry point of the pipeline: user lookup, cache hydration, recall,
/// ranking and truncation.
pub struct RecommendationService {
    users: Arc<dyn UserStore>,
    cache: Arc<dyn FeatureCache>,
    recall: RecallLayer,
    ranking: RankingLayer,
    hydration: HydrationConfig,
}

impl RecommendationService {
    pub fn new(
        users: Arc<dyn UserStore>,
        cache: Arc<dyn FeatureCache>,
        recall: RecallLayer,
        ranking: RankingLayer,
        hydration: HydrationConfig,
    ) -> Self {
        Self {
            users,
            cache,
            recall,
            ranking,
            hydration,
        }
    }

    /// Up to `size` movies for `user_id`, best first.
    ///
    /// Unknown users get an empty list. Gateway, inference and feature
    /// errors are returned as-is.
    pub async fn get_recommendations(
        &self,
        user_id: UserId,
        size: usize,
        strategy: RankingStrategy,
    ) -> Result<Vec<RankedMovie>> {
        let span = info_span!(
            "recommend",
            request_id = %Uuid::new_v4(),
            user_id,
            strategy = strategy.as_str()
        );

        self.recommend(user_id, size, strategy).instrument(span).await
    }

    async fn recommend(
        &self,
        user_id: UserId,
        size: usize,
        strategy: RankingStrategy,
    ) -> Result<Vec<RankedMovie>> {
        if size == 0 {
            return Ok(Vec::new());
        }

        let Some(user) = self.users.get_user(user_id).await? else {
            debug!("User {} not found", user_id);
            return Ok(Vec::new());
        };

        let user = self.hydrate(user).await?;

        let (candidates, _stats) = self.recall.recall_candidates(&user).await?;
        let mut ranked = self
            .ranking
            .rank_candidates(&user, candidates, strategy)
            .await?;

        ranked.truncate(size);

        info!(
            "Recommended {} movies for user {} with {}",
            ranked.len(),
            user_id,
            strategy.as_str()
        );

        Ok(ranked)
    }

    /// Apply cached embedding/features. Missing or unparseable cache
    /// entries leave the stored values in place; cache errors propagate.
    async fn hydrate(&self, user: User) -> Result<User> {
        let mut cached = CachedUserState::default();

        if self.hydration.embedding {
            if let Some(raw) = self.cache.get(&user_embedding_key(user.user_id)).await? {
                cached.embedding = parse_embedding(&raw);
                if cached.embedding.is_none() {
                    warn!("Ignoring unparseable cached embedding for user {}", user.user_id);
                }
            }
        }

        if self.hydration.features {
            cached.features = self
                .cache
                .hash_get_all(&user_features_key(user.user_id))
                .await?;
        }

        Ok(user.hydrate(cached))
    }
}
