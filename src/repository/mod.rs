//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod genres;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Author, Book, BookDetails, Genre},
};

/// Persistence contract for authors
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<Author>>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Author>>;
    /// Insert when `id` is unset, update otherwise
    async fn save(&self, author: &Author) -> AppResult<Author>;
    /// Returns the number of rows removed
    async fn delete_by_id(&self, id: i32) -> AppResult<u64>;
    /// Case-insensitive substring match on first or last name
    async fn search(&self, term: &str) -> AppResult<Vec<Author>>;
}

/// Persistence contract for books
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<BookDetails>>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<BookDetails>>;
    async fn save(&self, book: &Book) -> AppResult<BookDetails>;
    async fn delete_by_id(&self, id: i32) -> AppResult<u64>;
    /// Case-insensitive substring match on title, author names, genre name or ISBN
    async fn search(&self, term: &str) -> AppResult<Vec<BookDetails>>;
    async fn find_by_author(&self, author_id: i32) -> AppResult<Vec<BookDetails>>;
    async fn find_by_genre(&self, genre_id: i32) -> AppResult<Vec<BookDetails>>;
}

/// Persistence contract for genres
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenreStore: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<Genre>>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Genre>>;
    async fn save(&self, genre: &Genre) -> AppResult<Genre>;
    async fn delete_by_id(&self, id: i32) -> AppResult<u64>;
    /// Case-insensitive substring match on name
    async fn search(&self, term: &str) -> AppResult<Vec<Genre>>;
    /// Case-insensitive exact match on name
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>>;
}

/// Main repository struct holding one store per entity
#[derive(Clone)]
pub struct Repository {
    pool: Option<Pool<Postgres>>,
    pub authors: Arc<dyn AuthorStore>,
    pub books: Arc<dyn BookStore>,
    pub genres: Arc<dyn GenreStore>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: Arc::new(authors::AuthorsRepository::new(pool.clone())),
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            genres: Arc::new(genres::GenresRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Create a repository backed by process memory
    pub fn in_memory() -> Self {
        let store = memory::InMemoryStore::new();
        Self {
            pool: None,
            authors: Arc::new(store.clone()),
            books: Arc::new(store.clone()),
            genres: Arc::new(store),
        }
    }

    /// Assemble a repository from arbitrary stores
    pub fn from_stores(
        authors: Arc<dyn AuthorStore>,
        books: Arc<dyn BookStore>,
        genres: Arc<dyn GenreStore>,
    ) -> Self {
        Self {
            pool: None,
            authors,
            books,
            genres,
        }
    }

    /// Check database connectivity (always succeeds without a pool)
    pub async fn ping(&self) -> AppResult<()> {
        if let Some(ref pool) = self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}

/// Build an `ILIKE` pattern matching `term` anywhere, with wildcards in the term escaped
pub(crate) fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
