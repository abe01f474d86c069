//! Author service

use validator::Validate;

use super::search_term;
use crate::{
    error::{AppError, AppResult},
    models::{Author, BookDetails},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthorService {
    repository: Repository,
}

impl AuthorService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All authors in creation order
    pub async fn get_all(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.find_all().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        self.repository
            .authors
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    /// Insert a new author or overwrite the one with the same id
    pub async fn save(&self, author: &Author) -> AppResult<Author> {
        author.validate()?;
        self.repository.authors.save(author).await
    }

    /// Unconditional delete; callers check `ensure_deletable` first
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if self.repository.authors.delete_by_id(id).await? == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        Ok(())
    }

    /// Authors whose first or last name contains `term`; all authors when blank
    pub async fn search(&self, term: Option<&str>) -> AppResult<Vec<Author>> {
        match search_term(term) {
            Some(term) => self.repository.authors.search(term).await,
            None => self.get_all().await,
        }
    }

    /// Books written by the author
    pub async fn books(&self, id: i32) -> AppResult<Vec<BookDetails>> {
        self.repository.books.find_by_author(id).await
    }

    /// Load the author, failing when any book still references it
    pub async fn ensure_deletable(&self, id: i32) -> AppResult<Author> {
        let author = self.get_by_id(id).await?;
        let books = self.books(id).await?;
        if !books.is_empty() {
            return Err(AppError::DependencyExists(format!(
                "Cannot delete author {} who has {} book(s). Delete or reassign the books first.",
                author.full_name(),
                books.len()
            )));
        }
        Ok(author)
    }
}
