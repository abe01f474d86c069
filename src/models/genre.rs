//! Genre model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::clean;
use crate::error::{AppError, AppResult};

/// Genre record. Names are unique ignoring case.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "Genre name is required and must not exceed 100 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Genre form submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreForm {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl GenreForm {
    pub fn trimmed(self) -> Self {
        Self {
            id: clean(self.id),
            name: clean(self.name),
            description: clean(self.description),
        }
    }

    pub fn to_genre(&self, id: Option<i32>) -> AppResult<Genre> {
        let name = self
            .name
            .clone()
            .ok_or_else(|| AppError::Validation("Genre name is required".to_string()))?;

        Ok(Genre {
            id,
            name,
            description: self.description.clone(),
            ..Default::default()
        })
    }
}

impl From<&Genre> for GenreForm {
    fn from(genre: &Genre) -> Self {
        Self {
            id: genre.id.map(|id| id.to_string()),
            name: Some(genre.name.clone()),
            description: genre.description.clone(),
        }
    }
}
