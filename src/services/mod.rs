//! Business logic services

pub mod authors;
pub mod books;
pub mod genres;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub authors: authors::AuthorService,
    pub books: books::BookService,
    pub genres: genres::GenreService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            authors: authors::AuthorService::new(repository.clone()),
            books: books::BookService::new(repository.clone()),
            genres: genres::GenreService::new(repository),
        }
    }
}

/// A search term that is absent or blank means "no filter"
pub(crate) fn search_term(term: Option<&str>) -> Option<&str> {
    term.map(str::trim).filter(|t| !t.is_empty())
}
