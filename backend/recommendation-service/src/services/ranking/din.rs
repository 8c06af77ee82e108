//! Deep Interest Network request building.
//!
//! Every numeric feature is read from the string-typed feature maps and must
//! parse; genre slots are optional and omitted from the instance when
//! absent.

use crate::error::Result;
use crate::models::{Movie, MovieId, User, UserId};
use crate::services::inference::PredictRequest;
use crate::utils::parse_feature;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DinInstance {
    pub user_id: UserId,
    pub user_avg_rating: f32,
    pub user_rating_stddev: f32,
    pub user_rating_count: i64,

    pub user_rated_movie1: MovieId,
    pub user_rated_movie2: MovieId,
    pub user_rated_movie3: MovieId,
    pub user_rated_movie4: MovieId,
    pub user_rated_movie5: MovieId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_genre1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_genre2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_genre3: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_genre4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_genre5: Option<String>,

    pub movie_id: MovieId,
    pub movie_avg_rating: f32,
    pub movie_rating_stddev: f32,
    pub movie_rating_count: i64,
    pub release_year: i32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie_genre1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie_genre2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie_genre3: Option<String>,
}

/// User half of a DIN instance, parsed once and shared by every candidate.
#[derive(Debug, Clone, PartialEq)]
struct UserSide {
    avg_rating: f32,
    rating_stddev: f32,
    rating_count: i64,
    rated_movies: [MovieId; 5],
    genres: [Option<String>; 5],
}

impl UserSide {
    fn parse(user: &User) -> Result<Self> {
        let features = &user.features;
        let mut rated_movies = [0; 5];
        for (slot, rated) in rated_movies.iter_mut().enumerate() {
            *rated = parse_feature(features, &format!("userRatedMovie{}", slot + 1))?;
        }

        Ok(Self {
            avg_rating: parse_feature(features, "userAvgRating")?,
            rating_stddev: parse_feature(features, "userRatingStddev")?,
            rating_count: parse_feature(features, "userRatingCount")?,
            rated_movies,
            genres: std::array::from_fn(|slot| {
                user.feature(&format!("userGenre{}", slot + 1))
                    .map(str::to_string)
            }),
        })
    }
}

impl DinInstance {
    fn build(user_id: UserId, user: &UserSide, movie: &Movie) -> Result<Self> {
        let features = &movie.features;
        let genre = |slot: usize| movie.feature(&format!("movieGenre{}", slot)).map(str::to_string);
        let [rated1, rated2, rated3, rated4, rated5] = user.rated_movies;
        let [genre1, genre2, genre3, genre4, genre5] = user.genres.clone();

        Ok(Self {
            user_id,
            user_avg_rating: user.avg_rating,
            user_rating_stddev: user.rating_stddev,
            user_rating_count: user.rating_count,
            user_rated_movie1: rated1,
            user_rated_movie2: rated2,
            user_rated_movie3: rated3,
            user_rated_movie4: rated4,
            user_rated_movie5: rated5,
            user_genre1: genre1,
            user_genre2: genre2,
            user_genre3: genre3,
            user_genre4: genre4,
            user_genre5: genre5,
            movie_id: movie.movie_id,
            movie_avg_rating: parse_feature(features, "movieAvgRating")?,
            movie_rating_stddev: parse_feature(features, "movieRatingStddev")?,
            movie_rating_count: parse_feature(features, "movieRatingCount")?,
            release_year: parse_feature(features, "releaseYear")?,
            movie_genre1: genre(1),
            movie_genre2: genre(2),
            movie_genre3: genre(3),
        })
    }
}

/// Build the whole batch or fail on the first unparseable feature.
pub fn build_request(user: &User, candidates: &[Movie]) -> Result<PredictRequest> {
    let user_side = UserSide::parse(user)?;
    let instances = candidates
        .iter()
        .map(|movie| DinInstance::build(user.user_id, &user_side, movie))
        .collect::<Result<Vec<_>>>()?;

    PredictRequest::from_instances(&instances)
}
