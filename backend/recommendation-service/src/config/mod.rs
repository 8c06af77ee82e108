use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // PostgreSQL (movie catalog + user profiles)
    pub database_url: String,
    pub database_max_connections: u32,
    pub run_migrations: bool,

    // Redis (user embedding / feature cache)
    pub redis_url: String,
    pub hydrate_embedding_from_cache: bool,
    pub hydrate_features_from_cache: bool,

    // Model serving endpoints
    pub neural_cf_endpoint: String,
    pub din_endpoint: String,
    pub inference_timeout_ms: u64,

    // Recall
    pub genre_recall_limit: i64,
    pub top_rated_recall_limit: i64,
    pub latest_recall_limit: i64,
    pub max_user_genres: usize,

    // Observability
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct RecallConfig {
    pub genre_recall_limit: i64,
    pub top_rated_recall_limit: i64,
    pub latest_recall_limit: i64,
    pub max_user_genres: usize,
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            genre_recall_limit: 20,
            top_rated_recall_limit: 100,
            latest_recall_limit: 100,
            max_user_genres: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("database_url", "postgres://localhost/movies")?
            .set_default("database_max_connections", 10)?
            .set_default("run_migrations", false)?
            .set_default("redis_url", "redis://localhost:6379")?
            .set_default("hydrate_embedding_from_cache", true)?
            .set_default("hydrate_features_from_cache", true)?
            .set_default(
                "neural_cf_endpoint",
                "http://localhost:8501/v1/models/recmodel:predict",
            )?
            .set_default(
                "din_endpoint",
                "http://localhost:8501/v1/models/dinmodel:predict",
            )?
            .set_default("inference_timeout_ms", 2000)?
            .set_default("genre_recall_limit", 20)?
            .set_default("top_rated_recall_limit", 100)?
            .set_default("latest_recall_limit", 100)?
            .set_default("max_user_genres", 5)?
            .set_default("log_level", "info")?
            .add_source(config::Environment::default().separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_url.is_empty() {
            return Err(anyhow!("Database URL is required"));
        }

        if self.database_max_connections == 0 {
            return Err(anyhow!("Database max connections must be greater than 0"));
        }

        if self.redis_url.is_empty() {
            return Err(anyhow!("Redis URL is required"));
        }

        if self.neural_cf_endpoint.is_empty() || self.din_endpoint.is_empty() {
            return Err(anyhow!("Inference endpoints are required"));
        }

        if self.inference_timeout_ms == 0 {
            return Err(anyhow!("Inference timeout must be greater than 0"));
        }

        self.recall().validate()
    }

    pub fn recall(&self) -> RecallConfig {
        RecallConfig {
            genre_recall_limit: self.genre_recall_limit,
            top_rated_recall_limit: self.top_rated_recall_limit,
            latest_recall_limit: self.latest_recall_limit,
            max_user_genres: self.max_user_genres,
        }
    }
}

impl RecallConfig {
    pub fn validate(&self) -> Result<()> {
        if self.genre_recall_limit <= 0
            || self.top_rated_recall_limit <= 0
            || self.latest_recall_limit <= 0
        {
            return Err(anyhow!("Recall limits must be greater than 0"));
        }

        if !(1..=5).contains(&self.max_user_genres) {
            return Err(anyhow!("Max user genres must be between 1 and 5"));
        }

        Ok(())
    }
}
