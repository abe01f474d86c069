//! Genre service

use validator::Validate;

use super::search_term;
use crate::{
    error::{AppError, AppResult},
    models::{BookDetails, Genre},
    repository::Repository,
};

#[derive(Clone)]
pub struct GenreService {
    repository: Repository,
}

impl GenreService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_all(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.find_all().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Genre> {
        self.repository
            .genres
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    pub async fn save(&self, genre: &Genre) -> AppResult<Genre> {
        genre.validate()?;
        self.repository.genres.save(genre).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if self.repository.genres.delete_by_id(id).await? == 0 {
            return Err(AppError::NotFound(format!("Genre {} not found", id)));
        }
        Ok(())
    }

    pub async fn search(&self, term: Option<&str>) -> AppResult<Vec<Genre>> {
        match search_term(term) {
            Some(term) => self.repository.genres.search(term).await,
            None => self.get_all().await,
        }
    }

    /// Whether another genre (not `except_id`) already uses `name`, ignoring case
    pub async fn name_taken(&self, name: &str, except_id: Option<i32>) -> AppResult<bool> {
        let existing = self.repository.genres.find_by_name(name).await?;
        Ok(existing.is_some_and(|g| g.id != except_id))
    }

    pub async fn books(&self, id: i32) -> AppResult<Vec<BookDetails>> {
        self.repository.books.find_by_genre(id).await
    }

    pub async fn ensure_deletable(&self, id: i32) -> AppResult<Genre> {
        let genre = self.get_by_id(id).await?;
        let books = self.books(id).await?;
        if !books.is_empty() {
            return Err(AppError::DependencyExists(format!(
                "Cannot delete genre '{}' which has {} book(s). Delete or reassign the books first.",
                genre.name,
                books.len()
            )));
        }
        Ok(genre)
    }
}
