use anyhow::{anyhow, Context, Result};
use recommendation_service::{
    gateways::{migrate, PgMovieCatalog, PgUserStore, RedisFeatureCache},
    models::UserId,
    services::{HttpInferenceClient, HydrationConfig, ModelEndpoints},
    Config, RankingLayer, RankingStrategy, RecallLayer, RecommendationService,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_SIZE: usize = 10;
const USAGE: &str = "usage: recommendation-service <user_id> [size] [model]";

#[tokio::main]
async fn main() -> Result<()> {
    // Load config
    let config = Config::from_env().context("Failed to load config")?;

    // Initialize tracing (stderr keeps stdout for the JSON result)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str())),
        )
        .init();

    config.validate()?;

    let (user_id, size, strategy) = parse_args(std::env::args().skip(1))?;

    // Initialize stores
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    if config.run_migrations {
        migrate(&db_pool).await?;
    }

    let cache = RedisFeatureCache::connect(&config.redis_url).await?;
    let inference =
        HttpInferenceClient::new(Duration::from_millis(config.inference_timeout_ms))?;

    // Initialize layers
    let recall_layer = RecallLayer::new(
        Arc::new(PgMovieCatalog::new(db_pool.clone())),
        config.recall(),
    );
    let ranking_layer = RankingLayer::new(
        Arc::new(inference),
        ModelEndpoints {
            neural_cf: config.neural_cf_endpoint.clone(),
            din: config.din_endpoint.clone(),
        },
    );
    let service = RecommendationService::new(
        Arc::new(PgUserStore::new(db_pool)),
        Arc::new(cache),
        recall_layer,
        ranking_layer,
        HydrationConfig {
            embedding: config.hydrate_embedding_from_cache,
            features: config.hydrate_features_from_cache,
        },
    );

    info!(
        "Computing recommendations: user_id={}, size={}, model={}",
        user_id,
        size,
        strategy.as_str()
    );

    let recommendations = service
        .get_recommendations(user_id, size, strategy)
        .await?;

    println!("{}", serde_json::to_string_pretty(&recommendations)?);
    Ok(())
}

/// `<user_id> [size] [model]`; negative sizes mean "nothing".
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<(UserId, usize, RankingStrategy)> {
    let user_id: UserId = args
        .next()
        .ok_or_else(|| anyhow!(USAGE))?
        .parse()
        .context("user_id must be an integer")?;

    let size = match args.next() {
        Some(raw) => {
            let size: i64 = raw.parse().context("size must be an integer")?;
            usize::try_from(size).unwrap_or(0)
        }
        None => DEFAULT_SIZE,
    };

    let strategy = args
        .next()
        .map(|model| RankingStrategy::from_name(&model))
        .unwrap_or(RankingStrategy::Default);

    Ok((user_id, size, strategy))
}
