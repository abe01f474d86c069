//! Data models for the library catalog

pub mod author;
pub mod book;
pub mod genre;

// Re-export commonly used types
pub use author::{Author, AuthorForm};
pub use book::{Book, BookDetails, BookForm};
pub use genre::{Genre, GenreForm};

use crate::error::{AppError, AppResult};

/// Trim a submitted form value; blank values count as absent.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an optional numeric form field.
pub(crate) fn parse_number(value: Option<&str>, label: &str) -> AppResult<Option<i32>> {
    match value {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("{} must be a number", label))),
    }
}

/// Parse a record identifier; only positive integers identify a record.
pub fn parse_id(raw: Option<&str>) -> Option<i32> {
    raw.and_then(|v| v.trim().parse::<i32>().ok())
        .filter(|id| *id > 0)
}
