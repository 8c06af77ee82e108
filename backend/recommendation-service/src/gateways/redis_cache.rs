use super::FeatureCache;
use crate::error::Result;
use anyhow::Context;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashMap;

/// Feature cache backed by Redis.
///
/// `ConnectionManager` multiplexes one connection and reconnects on failure;
/// clones share it, so a single instance serves every request.
#[derive(Clone)]
pub struct RedisFeatureCache {
    manager: ConnectionManager,
}

impl RedisFeatureCache {
    pub async fn connect(redis_url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url).context("failed to parse REDIS_URL")?;
        let manager = ConnectionManager::new(client)
            .await
            .context("failed to connect to Redis")?;

        Ok(Self { manager })
    }
}

#[async_trait]
impl FeatureCache for RedisFeatureCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn hash_get_all(&self, key: &str) -> Result<Option<HashMap<String, String>>> {
        let mut conn = self.manager.clone();
        // HGETALL on a missing key answers with an empty hash
        let fields: HashMap<String, String> = conn.hgetall(key).await?;
        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(fields))
    }
}
