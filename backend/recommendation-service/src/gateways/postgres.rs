use super::{MovieCatalog, UserStore};
use crate::error::Result;
use crate::models::{Embedding, Movie, MovieId, SortKey, User, UserId};
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{debug, info};

const MOVIE_COLUMNS: &str =
    "movie_id, title, release_year, average_rating, genres, embedding, features";

#[derive(sqlx::FromRow)]
struct MovieRow {
    movie_id: i64,
    title: String,
    release_year: Option<i32>,
    average_rating: f64,
    genres: Vec<String>,
    embedding: Option<Vec<f32>>,
    features: Json<HashMap<String, String>>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            movie_id: row.movie_id,
            title: row.title,
            release_year: row.release_year,
            average_rating: row.average_rating,
            genres: row.genres,
            embedding: row.embedding.filter(|e| !e.is_empty()).map(Embedding::new),
            features: row.features.0,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: i64,
    embedding: Option<Vec<f32>>,
    features: Json<HashMap<String, String>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            user_id: row.user_id,
            embedding: row.embedding.filter(|e| !e.is_empty()).map(Embedding::new),
            features: row.features.0,
        }
    }
}

/// ORDER BY clause for a sort key; movie id keeps the order total.
fn order_clause(sort_key: SortKey) -> &'static str {
    match sort_key {
        SortKey::Rating => "ORDER BY average_rating DESC, movie_id ASC",
        SortKey::ReleaseYear => "ORDER BY release_year DESC NULLS LAST, movie_id ASC",
    }
}

/// Movie catalog backed by the `movies` table.
#[derive(Clone)]
pub struct PgMovieCatalog {
    pool: PgPool,
}

impl PgMovieCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MovieCatalog for PgMovieCatalog {
    async fn get_movie(&self, movie_id: MovieId) -> Result<Option<Movie>> {
        let sql = format!("SELECT {} FROM movies WHERE movie_id = $1", MOVIE_COLUMNS);
        let row = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(movie_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Movie::from))
    }

    async fn get_movies_by_genre(
        &self,
        genre: &str,
        limit: i64,
        sort_key: SortKey,
    ) -> Result<Vec<Movie>> {
        let sql = format!(
            "SELECT {} FROM movies WHERE $1 = ANY(genres) {} LIMIT $2",
            MOVIE_COLUMNS,
            order_clause(sort_key)
        );
        let rows = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(genre)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(
            "Fetched {} movies for genre={} sort={}",
            rows.len(),
            genre,
            sort_key.as_str()
        );
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn get_top_movies(&self, limit: i64, sort_key: SortKey) -> Result<Vec<Movie>> {
        let sql = format!(
            "SELECT {} FROM movies {} LIMIT $1",
            MOVIE_COLUMNS,
            order_clause(sort_key)
        );
        let rows = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }
}

/// User profiles backed by the `users` table.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT user_id, embedding, features FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }
}

/// Create the catalog schema if it is missing.
pub async fn migrate(pool: &PgPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;

    info!("Database migrations completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_clause_is_total() {
        assert!(order_clause(SortKey::Rating).ends_with("movie_id ASC"));
        assert!(order_clause(SortKey::ReleaseYear).contains("NULLS LAST"));
    }

    #[test]
    fn test_movie_row_conversion_drops_empty_embedding() {
        let mut features = HashMap::new();
        features.insert("releaseYear".to_string(), "1995".to_string());

        let movie = Movie::from(MovieRow {
            movie_id: 1,
            title: "Toy Story (1995)".to_string(),
            release_year: Some(1995),
            average_rating: 3.92,
            genres: vec!["Animation".to_string(), "Comedy".to_string()],
            embedding: Some(Vec::new()),
            features: Json(features),
        });

        assert!(movie.embedding.is_none());
        assert!(movie.has_genre("Comedy"));
        assert_eq!(movie.feature("releaseYear"), Some("1995"));
    }
}
