//! Author model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{clean, parse_number};
use crate::error::{AppError, AppResult};

/// Author record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Assigned by the store on creation
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "First name is required and must not exceed 100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required and must not exceed 100 characters"))]
    pub last_name: String,
    #[validate(range(min = 1000, max = 2100, message = "Birth year must be between 1000 and 2100"))]
    pub birth_year: Option<i32>,
    #[validate(length(max = 100, message = "Country must not exceed 100 characters"))]
    pub country: Option<String>,
    #[validate(length(max = 1000, message = "Biography must not exceed 1000 characters"))]
    pub biography: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Author {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Author form submission; every field arrives as raw text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorForm {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_year: Option<String>,
    pub country: Option<String>,
    pub biography: Option<String>,
}

impl AuthorForm {
    /// Trim every value, dropping blank ones
    pub fn trimmed(self) -> Self {
        Self {
            id: clean(self.id),
            first_name: clean(self.first_name),
            last_name: clean(self.last_name),
            birth_year: clean(self.birth_year),
            country: clean(self.country),
            biography: clean(self.biography),
        }
    }

    /// Build the author to persist. Required fields are checked in form order
    /// and the first missing one aborts.
    pub fn to_author(&self, id: Option<i32>) -> AppResult<Author> {
        let first_name = self
            .first_name
            .clone()
            .ok_or_else(|| AppError::Validation("First name is required".to_string()))?;
        let last_name = self
            .last_name
            .clone()
            .ok_or_else(|| AppError::Validation("Last name is required".to_string()))?;
        let birth_year = parse_number(self.birth_year.as_deref(), "Birth year")?;

        Ok(Author {
            id,
            first_name,
            last_name,
            birth_year,
            country: self.country.clone(),
            biography: self.biography.clone(),
            ..Default::default()
        })
    }
}

impl From<&Author> for AuthorForm {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id.map(|id| id.to_string()),
            first_name: Some(author.first_name.clone()),
            last_name: Some(author.last_name.clone()),
            birth_year: author.birth_year.map(|y| y.to_string()),
            country: author.country.clone(),
            biography: author.biography.clone(),
        }
    }
}
