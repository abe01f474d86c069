//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{clean, parse_id, parse_number};
use crate::error::{AppError, AppResult};

/// Book record. Holds the foreign keys to its author and genre.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "Title is required and must not exceed 200 characters"))]
    pub title: String,
    #[validate(range(min = 1, message = "Author is required"))]
    pub author_id: i32,
    #[validate(range(min = 1, message = "Genre is required"))]
    pub genre_id: i32,
    #[validate(range(min = 1000, max = 2100, message = "Publication year must be between 1000 and 2100"))]
    pub publication_year: i32,
    #[validate(length(max = 20, message = "ISBN must not exceed 20 characters"))]
    pub isbn: Option<String>,
    #[validate(range(min = 1, message = "Page count must be at least 1"))]
    pub pages: Option<i32>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    #[validate(length(max = 1000, message = "Description must not exceed 1000 characters"))]
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Book joined with the names of its author and genre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub book: Book,
    pub author_first_name: String,
    pub author_last_name: String,
    pub genre_name: String,
}

impl BookDetails {
    pub fn author_full_name(&self) -> String {
        format!("{} {}", self.author_first_name, self.author_last_name)
    }
}

/// Book form submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookForm {
    pub id: Option<String>,
    pub title: Option<String>,
    pub author_id: Option<String>,
    pub genre_id: Option<String>,
    pub publication_year: Option<String>,
    pub isbn: Option<String>,
    pub pages: Option<String>,
    pub quantity: Option<String>,
    pub description: Option<String>,
}

impl BookForm {
    pub fn trimmed(self) -> Self {
        Self {
            id: clean(self.id),
            title: clean(self.title),
            author_id: clean(self.author_id),
            genre_id: clean(self.genre_id),
            publication_year: clean(self.publication_year),
            isbn: clean(self.isbn),
            pages: clean(self.pages),
            quantity: clean(self.quantity),
            description: clean(self.description),
        }
    }

    /// Build the book to persist. The form requires an ISBN even though the
    /// record itself treats it as optional.
    pub fn to_book(&self, id: Option<i32>) -> AppResult<Book> {
        let title = self
            .title
            .clone()
            .ok_or_else(|| AppError::Validation("Book title is required".to_string()))?;
        let author_id = parse_id(self.author_id.as_deref())
            .ok_or_else(|| AppError::Validation("An author must be selected".to_string()))?;
        let genre_id = parse_id(self.genre_id.as_deref())
            .ok_or_else(|| AppError::Validation("A genre must be selected".to_string()))?;
        let publication_year = parse_number(self.publication_year.as_deref(), "Publication year")?
            .filter(|year| (1000..=2100).contains(year))
            .ok_or_else(|| {
                AppError::Validation("Publication year must be between 1000 and 2100".to_string())
            })?;
        let isbn = self
            .isbn
            .clone()
            .ok_or_else(|| AppError::Validation("ISBN is required".to_string()))?;
        let pages = parse_number(self.pages.as_deref(), "Page count")?;
        let quantity = parse_number(self.quantity.as_deref(), "Quantity")?.unwrap_or(0);

        Ok(Book {
            id,
            title,
            author_id,
            genre_id,
            publication_year,
            isbn: Some(isbn),
            pages,
            quantity,
            description: self.description.clone(),
            ..Default::default()
        })
    }
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.map(|id| id.to_string()),
            title: Some(book.title.clone()),
            author_id: Some(book.author_id.to_string()),
            genre_id: Some(book.genre_id.to_string()),
            publication_year: Some(book.publication_year.to_string()),
            isbn: book.isbn.clone(),
            pages: book.pages.map(|p| p.to_string()),
            quantity: Some(book.quantity.to_string()),
            description: book.description.clone(),
        }
    }
}
