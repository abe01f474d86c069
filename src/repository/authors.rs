//! Authors repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{contains_pattern, AuthorStore};
use crate::{
    error::{AppError, AppResult},
    models::Author,
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorStore for AuthorsRepository {
    async fn find_all(&self) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>("SELECT * FROM authors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Author>> {
        let row = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn save(&self, author: &Author) -> AppResult<Author> {
        match author.id {
            None => {
                let row = sqlx::query_as::<_, Author>(
                    r#"
                    INSERT INTO authors (first_name, last_name, birth_year, country, biography)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING *
                    "#,
                )
                .bind(&author.first_name)
                .bind(&author.last_name)
                .bind(author.birth_year)
                .bind(&author.country)
                .bind(&author.biography)
                .fetch_one(&self.pool)
                .await?;
                Ok(row)
            }
            Some(id) => sqlx::query_as::<_, Author>(
                r#"
                UPDATE authors
                SET first_name = $1, last_name = $2, birth_year = $3,
                    country = $4, biography = $5, updated_at = NOW()
                WHERE id = $6
                RETURNING *
                "#,
            )
            .bind(&author.first_name)
            .bind(&author.last_name)
            .bind(author.birth_year)
            .bind(&author.country)
            .bind(&author.biography)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id))),
        }
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match AppError::from(e) {
                // ON DELETE RESTRICT fired: a book was added after the guard ran
                AppError::IntegrityViolation(_) => {
                    AppError::DependencyExists(format!("Author {} still has books", id))
                }
                other => other,
            })?;
        Ok(result.rows_affected())
    }

    async fn search(&self, term: &str) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>(
            r#"
            SELECT * FROM authors
            WHERE first_name ILIKE $1 OR last_name ILIKE $1
            ORDER BY id
            "#,
        )
        .bind(contains_pattern(term))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
