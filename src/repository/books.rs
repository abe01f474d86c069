//! Books repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{contains_pattern, BookStore};
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookDetails},
};

/// Book columns joined with author and genre names
const SELECT_DETAILS: &str = r#"
    SELECT b.*,
           a.first_name AS author_first_name,
           a.last_name AS author_last_name,
           g.name AS genre_name
    FROM books b
    JOIN authors a ON a.id = b.author_id
    JOIN genres g ON g.id = b.genre_id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn find_where(&self, condition: &str, id: i32) -> AppResult<Vec<BookDetails>> {
        let query = format!("{} WHERE {} ORDER BY b.id", SELECT_DETAILS, condition);
        let rows = sqlx::query_as::<_, BookDetails>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn find_all(&self) -> AppResult<Vec<BookDetails>> {
        let query = format!("{} ORDER BY b.id", SELECT_DETAILS);
        let rows = sqlx::query_as::<_, BookDetails>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<BookDetails>> {
        Ok(self.find_where("b.id = $1", id).await?.into_iter().next())
    }

    async fn save(&self, book: &Book) -> AppResult<BookDetails> {
        let id: i32 = match book.id {
            None => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO books (title, author_id, genre_id, publication_year,
                                       isbn, pages, quantity, description)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    RETURNING id
                    "#,
                )
                .bind(&book.title)
                .bind(book.author_id)
                .bind(book.genre_id)
                .bind(book.publication_year)
                .bind(&book.isbn)
                .bind(book.pages)
                .bind(book.quantity)
                .bind(&book.description)
                .fetch_one(&self.pool)
                .await?
            }
            Some(id) => sqlx::query_scalar(
                r#"
                UPDATE books
                SET title = $1, author_id = $2, genre_id = $3, publication_year = $4,
                    isbn = $5, pages = $6, quantity = $7, description = $8,
                    updated_at = NOW()
                WHERE id = $9
                RETURNING id
                "#,
            )
            .bind(&book.title)
            .bind(book.author_id)
            .bind(book.genre_id)
            .bind(book.publication_year)
            .bind(&book.isbn)
            .bind(book.pages)
            .bind(book.quantity)
            .bind(&book.description)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?,
        };

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Book {} vanished after save", id)))
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn search(&self, term: &str) -> AppResult<Vec<BookDetails>> {
        let query = format!(
            r#"{}
            WHERE b.title ILIKE $1
               OR a.first_name ILIKE $1
               OR a.last_name ILIKE $1
               OR g.name ILIKE $1
               OR b.isbn ILIKE $1
            ORDER BY b.id"#,
            SELECT_DETAILS
        );
        let rows = sqlx::query_as::<_, BookDetails>(&query)
            .bind(contains_pattern(term))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_author(&self, author_id: i32) -> AppResult<Vec<BookDetails>> {
        self.find_where("b.author_id = $1", author_id).await
    }

    async fn find_by_genre(&self, genre_id: i32) -> AppResult<Vec<BookDetails>> {
        self.find_where("b.genre_id = $1", genre_id).await
    }
}
