use crate::error::Result;
use crate::models::{Movie, MovieId, User, UserId};
use crate::services::inference::PredictRequest;
use serde::Serialize;

/// One (user, movie) pair for the NeuralCF model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeuralCfInstance {
    pub user_id: UserId,
    pub movie_id: MovieId,
}

pub fn build_request(user: &User, candidates: &[Movie]) -> Result<PredictRequest> {
    let instances: Vec<NeuralCfInstance> = candidates
        .iter()
        .map(|movie| NeuralCfInstance {
            user_id: user.user_id,
            movie_id: movie.movie_id,
        })
        .collect();

    PredictRequest::from_instances(&instances)
}
