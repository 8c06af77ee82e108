pub mod config;
pub mod error;
pub mod gateways;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::config::Config;
pub use error::{RecommendationError, Result};
pub use services::{RankingLayer, RankingStrategy, RecallLayer, RecommendationService};
