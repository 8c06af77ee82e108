pub mod inference;
pub mod ranking;
pub mod recall;
pub mod recommendation;

pub use inference::{HttpInferenceClient, InferenceClient};
pub use ranking::{ModelEndpoints, RankingLayer, RankingStrategy};
pub use recall::RecallLayer;
pub use recommendation::{HydrationConfig, RecommendationService};
