//! Genres repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{contains_pattern, GenreStore};
use crate::{
    error::{AppError, AppResult},
    models::Genre,
};

#[derive(Clone)]
pub struct GenresRepository {
    pool: Pool<Postgres>,
}

impl GenresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenreStore for GenresRepository {
    async fn find_all(&self) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>("SELECT * FROM genres ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, Genre>("SELECT * FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn save(&self, genre: &Genre) -> AppResult<Genre> {
        match genre.id {
            None => {
                let row = sqlx::query_as::<_, Genre>(
                    "INSERT INTO genres (name, description) VALUES ($1, $2) RETURNING *",
                )
                .bind(&genre.name)
                .bind(&genre.description)
                .fetch_one(&self.pool)
                .await?;
                Ok(row)
            }
            Some(id) => sqlx::query_as::<_, Genre>(
                r#"
                UPDATE genres
                SET name = $1, description = $2, updated_at = NOW()
                WHERE id = $3
                RETURNING *
                "#,
            )
            .bind(&genre.name)
            .bind(&genre.description)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id))),
        }
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::IntegrityViolation(_) => {
                    AppError::DependencyExists(format!("Genre {} still has books", id))
                }
                other => other,
            })?;
        Ok(result.rows_affected())
    }

    async fn search(&self, term: &str) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>(
            "SELECT * FROM genres WHERE name ILIKE $1 ORDER BY id",
        )
        .bind(contains_pattern(term))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, Genre>(
            "SELECT * FROM genres WHERE LOWER(name) = LOWER($1) LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
