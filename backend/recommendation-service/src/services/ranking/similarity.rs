use crate::error::Result;
use crate::models::{Embedding, Movie, User};

/// Similarity between a user embedding and a movie embedding.
///
/// `None` when either side is missing or has no direction; mismatched
/// dimensions are an error.
pub fn similarity(user: Option<&Embedding>, movie: Option<&Embedding>) -> Result<Option<f64>> {
    match (user, movie) {
        (Some(user), Some(movie)) => user.cosine_similarity(movie),
        _ => Ok(None),
    }
}

/// One similarity per candidate, in candidate order.
pub fn embedding_scores(user: &User, candidates: &[Movie]) -> Result<Vec<Option<f64>>> {
    candidates
        .iter()
        .map(|movie| similarity(user.embedding.as_ref(), movie.embedding.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecommendationError;

    #[test]
    fn test_similarity_missing_side() {
        let emb = Embedding::new(vec![0.3, 0.4]);
        assert_eq!(similarity(None, Some(&emb)).unwrap(), None);
        assert_eq!(similarity(Some(&emb), None).unwrap(), None);
        assert_eq!(similarity(None, None).unwrap(), None);
    }

    #[test]
    fn test_embedding_scores_user_without_embedding() {
        let mut movie = Movie::new(1, "Alien");
        movie.embedding = Some(Embedding::new(vec![1.0, 1.0]));

        let scores = embedding_scores(&User::new(1), &[movie, Movie::new(2, "Aliens")]).unwrap();
        assert_eq!(scores, vec![None, None]);
    }

    #[test]
    fn test_embedding_scores_dimension_mismatch_fails() {
        let user = User::new(1).with_embedding(Embedding::new(vec![1.0, 0.0, 0.0]));
        let mut movie = Movie::new(1, "Alien");
        movie.embedding = Some(Embedding::new(vec![1.0, 0.0]));

        assert!(matches!(
            embedding_scores(&user, &[movie]),
            Err(RecommendationError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_opposite_embedding_still_scored() {
        let user = User::new(1).with_embedding(Embedding::new(vec![1.0, 0.0]));
        let mut opposite = Movie::new(2, "Opposite");
        opposite.embedding = Some(Embedding::new(vec![-1.0, 0.0]));

        let scores = embedding_scores(&user, &[Movie::new(1, "Unknown"), opposite]).unwrap();
        assert_eq!(scores, vec![None, Some(-1.0)]);
    }
}
