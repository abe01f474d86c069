//! Book service

use validator::Validate;

use super::search_term;
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookDetails},
    repository::Repository,
};

#[derive(Clone)]
pub struct BookService {
    repository: Repository,
}

impl BookService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_all(&self) -> AppResult<Vec<BookDetails>> {
        self.repository.books.find_all().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<BookDetails> {
        self.repository
            .books
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Validate, resolve the author and genre, then insert or overwrite
    pub async fn save(&self, book: &Book) -> AppResult<BookDetails> {
        book.validate()?;

        if self.repository.authors.find_by_id(book.author_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Author {} not found",
                book.author_id
            )));
        }
        if self.repository.genres.find_by_id(book.genre_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Genre {} not found",
                book.genre_id
            )));
        }

        self.repository.books.save(book).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if self.repository.books.delete_by_id(id).await? == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }

    /// Books whose title, author name, genre name or ISBN contains `term`
    pub async fn search(&self, term: Option<&str>) -> AppResult<Vec<BookDetails>> {
        match search_term(term) {
            Some(term) => self.repository.books.search(term).await,
            None => self.get_all().await,
        }
    }
}
