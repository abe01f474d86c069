//! In-memory storage for tests and development. Does NOT persist data.
//!
//! All three tables live behind one lock so the relational constraints
//! (unique genre names, book foreign keys, restrict-on-delete) are checked
//! and applied atomically.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{AuthorStore, BookStore, GenreStore};
use crate::{
    error::{AppError, AppResult},
    models::{Author, Book, BookDetails, Genre},
};

#[derive(Default)]
struct Tables {
    authors: BTreeMap<i32, Author>,
    genres: BTreeMap<i32, Genre>,
    books: BTreeMap<i32, Book>,
    last_author_id: i32,
    last_genre_id: i32,
    last_book_id: i32,
}

impl Tables {
    fn details(&self, book: &Book) -> Option<BookDetails> {
        let author = self.authors.get(&book.author_id)?;
        let genre = self.genres.get(&book.genre_id)?;
        Some(BookDetails {
            book: book.clone(),
            author_first_name: author.first_name.clone(),
            author_last_name: author.last_name.clone(),
            genre_name: genre.name.clone(),
        })
    }

    fn books_where(&self, predicate: impl Fn(&BookDetails) -> bool) -> Vec<BookDetails> {
        self.books
            .values()
            .filter_map(|book| self.details(book))
            .filter(|details| predicate(details))
            .collect()
    }

    fn has_books(&self, predicate: impl Fn(&Book) -> bool) -> bool {
        self.books.values().any(predicate)
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorStore for InMemoryStore {
    async fn find_all(&self) -> AppResult<Vec<Author>> {
        Ok(self.tables.read().await.authors.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Author>> {
        Ok(self.tables.read().await.authors.get(&id).cloned())
    }

    async fn save(&self, author: &Author) -> AppResult<Author> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut row = author.clone();

        match author.id {
            None => {
                tables.last_author_id += 1;
                row.id = Some(tables.last_author_id);
                row.created_at = Some(now);
            }
            Some(id) => {
                let existing = tables
                    .authors
                    .get(&id)
                    .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))?;
                row.created_at = existing.created_at;
            }
        }
        row.updated_at = Some(now);

        let id = row.id.unwrap_or_default();
        tables.authors.insert(id, row.clone());
        Ok(row)
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        if tables.has_books(|b| b.author_id == id) {
            return Err(AppError::DependencyExists(format!(
                "Author {} still has books",
                id
            )));
        }
        Ok(tables.authors.remove(&id).map_or(0, |_| 1))
    }

    async fn search(&self, term: &str) -> AppResult<Vec<Author>> {
        let needle = term.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .authors
            .values()
            .filter(|a| {
                contains_ignore_case(&a.first_name, &needle)
                    || contains_ignore_case(&a.last_name, &needle)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GenreStore for InMemoryStore {
    async fn find_all(&self) -> AppResult<Vec<Genre>> {
        Ok(self.tables.read().await.genres.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Genre>> {
        Ok(self.tables.read().await.genres.get(&id).cloned())
    }

    async fn save(&self, genre: &Genre) -> AppResult<Genre> {
        let mut tables = self.tables.write().await;

        let name = genre.name.to_lowercase();
        let duplicate = tables
            .genres
            .values()
            .any(|g| g.id != genre.id && g.name.to_lowercase() == name);
        if duplicate {
            return Err(AppError::IntegrityViolation(format!(
                "Genre name '{}' already exists",
                genre.name
            )));
        }

        let now = Utc::now();
        let mut row = genre.clone();
        match genre.id {
            None => {
                tables.last_genre_id += 1;
                row.id = Some(tables.last_genre_id);
                row.created_at = Some(now);
            }
            Some(id) => {
                let existing = tables
                    .genres
                    .get(&id)
                    .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))?;
                row.created_at = existing.created_at;
            }
        }
        row.updated_at = Some(now);

        let id = row.id.unwrap_or_default();
        tables.genres.insert(id, row.clone());
        Ok(row)
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        if tables.has_books(|b| b.genre_id == id) {
            return Err(AppError::DependencyExists(format!(
                "Genre {} still has books",
                id
            )));
        }
        Ok(tables.genres.remove(&id).map_or(0, |_| 1))
    }

    async fn search(&self, term: &str) -> AppResult<Vec<Genre>> {
        let needle = term.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .genres
            .values()
            .filter(|g| contains_ignore_case(&g.name, &needle))
            .cloned()
            .collect())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        let name = name.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .genres
            .values()
            .find(|g| g.name.to_lowercase() == name)
            .cloned())
    }
}

#[async_trait]
impl BookStore for InMemoryStore {
    async fn find_all(&self) -> AppResult<Vec<BookDetails>> {
        Ok(self.tables.read().await.books_where(|_| true))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<BookDetails>> {
        let tables = self.tables.read().await;
        Ok(tables.books.get(&id).and_then(|b| tables.details(b)))
    }

    async fn save(&self, book: &Book) -> AppResult<BookDetails> {
        let mut tables = self.tables.write().await;

        if !tables.authors.contains_key(&book.author_id) {
            return Err(AppError::IntegrityViolation(format!(
                "Author {} does not exist",
                book.author_id
            )));
        }
        if !tables.genres.contains_key(&book.genre_id) {
            return Err(AppError::IntegrityViolation(format!(
                "Genre {} does not exist",
                book.genre_id
            )));
        }

        let now = Utc::now();
        let mut row = book.clone();
        match book.id {
            None => {
                tables.last_book_id += 1;
                row.id = Some(tables.last_book_id);
                row.created_at = Some(now);
            }
            Some(id) => {
                let existing = tables
                    .books
                    .get(&id)
                    .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;
                row.created_at = existing.created_at;
            }
        }
        row.updated_at = Some(now);

        let id = row.id.unwrap_or_default();
        tables.books.insert(id, row.clone());
        tables
            .details(&row)
            .ok_or_else(|| AppError::Internal(format!("Book {} vanished after save", id)))
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<u64> {
        Ok(self.tables.write().await.books.remove(&id).map_or(0, |_| 1))
    }

    async fn search(&self, term: &str) -> AppResult<Vec<BookDetails>> {
        let needle = term.to_lowercase();
        Ok(self.tables.read().await.books_where(|d| {
            contains_ignore_case(&d.book.title, &needle)
                || contains_ignore_case(&d.author_first_name, &needle)
                || contains_ignore_case(&d.author_last_name, &needle)
                || contains_ignore_case(&d.genre_name, &needle)
                || d.book
                    .isbn
                    .as_deref()
                    .is_some_and(|isbn| contains_ignore_case(isbn, &needle))
        }))
    }

    async fn find_by_author(&self, author_id: i32) -> AppResult<Vec<BookDetails>> {
        Ok(self
            .tables
            .read()
            .await
            .books_where(|d| d.book.author_id == author_id))
    }

    async fn find_by_genre(&self, genre_id: i32) -> AppResult<Vec<BookDetails>> {
        Ok(self
            .tables
            .read()
            .await
            .books_where(|d| d.book.genre_id == genre_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (InMemoryStore, Author, Genre) {
        let store = InMemoryStore::new();
        let author = AuthorStore::save(
            &store,
            &Author {
                first_name: "Isaac".to_string(),
                last_name: "Asimov".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let genre = GenreStore::save(
            &store,
            &Genre {
                name: "Sci-Fi".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        (store, author, genre)
    }

    fn book(title: &str, author: &Author, genre: &Genre, isbn: &str) -> Book {
        Book {
            title: title.to_string(),
            author_id: author.id.unwrap(),
            genre_id: genre.id.unwrap(),
            publication_year: 1951,
            isbn: Some(isbn.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_ids_are_assigned_in_creation_order() {
        let (store, author, genre) = seeded().await;
        let second = AuthorStore::save(
            &store,
            &Author {
                first_name: "Ursula".to_string(),
                last_name: "Le Guin".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(author.id, Some(1));
        assert_eq!(second.id, Some(2));
        assert_eq!(genre.id, Some(1));
        assert!(second.created_at.is_some());

        let all = AuthorStore::find_all(&store).await.unwrap();
        let ids: Vec<_> = all.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn test_update_of_missing_id_is_not_found() {
        let store = InMemoryStore::new();
        let result = AuthorStore::save(
            &store,
            &Author {
                id: Some(9),
                first_name: "No".to_string(),
                last_name: "Body".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_genre_names_are_unique_ignoring_case() {
        let (store, _, genre) = seeded().await;
        let result = GenreStore::save(
            &store,
            &Genre {
                name: "SCI-FI".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::IntegrityViolation(_))));

        // Re-saving the same genre under its own id is fine
        let renamed = GenreStore::save(
            &store,
            &Genre {
                name: "sci-fi".to_string(),
                ..genre.clone()
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.id, genre.id);
        assert_eq!(renamed.created_at, genre.created_at);
    }

    #[tokio::test]
    async fn test_book_requires_existing_author_and_genre() {
        let (store, author, genre) = seeded().await;
        let mut orphan = book("Foundation", &author, &genre, "123");
        orphan.author_id = 42;
        let result = BookStore::save(&store, &orphan).await;
        assert!(matches!(result, Err(AppError::IntegrityViolation(_))));
        assert!(BookStore::find_all(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_restricted_while_books_reference_the_row() {
        let (store, author, genre) = seeded().await;
        let saved = BookStore::save(&store, &book("Foundation", &author, &genre, "123"))
            .await
            .unwrap();

        let result = GenreStore::delete_by_id(&store, genre.id.unwrap()).await;
        assert!(matches!(result, Err(AppError::DependencyExists(_))));
        let result = AuthorStore::delete_by_id(&store, author.id.unwrap()).await;
        assert!(matches!(result, Err(AppError::DependencyExists(_))));

        let book_id = saved.book.id.unwrap();
        assert_eq!(BookStore::delete_by_id(&store, book_id).await.unwrap(), 1);
        assert_eq!(GenreStore::delete_by_id(&store, genre.id.unwrap()).await.unwrap(), 1);
        assert_eq!(GenreStore::delete_by_id(&store, genre.id.unwrap()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_book_search_matches_each_field_once() {
        let (store, author, genre) = seeded().await;
        BookStore::save(&store, &book("Foundation", &author, &genre, "978-0553293357"))
            .await
            .unwrap();
        BookStore::save(&store, &book("I, Robot", &author, &genre, "555"))
            .await
            .unwrap();

        // Title
        assert_eq!(BookStore::search(&store, "FOUND").await.unwrap().len(), 1);
        // Author last name, matched by both books
        assert_eq!(BookStore::search(&store, "asim").await.unwrap().len(), 2);
        // Genre name
        assert_eq!(BookStore::search(&store, "sci").await.unwrap().len(), 2);
        // ISBN
        let hits = BookStore::search(&store, "0553").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].book.title, "Foundation");
        // "o" matches both titles and the author name; each book is returned once
        assert_eq!(BookStore::search(&store, "o").await.unwrap().len(), 2);
        assert!(BookStore::search(&store, "tolkien").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_book_details_follow_author_rename() {
        let (store, author, genre) = seeded().await;
        let saved = BookStore::save(&store, &book("Foundation", &author, &genre, "1"))
            .await
            .unwrap();
        AuthorStore::save(
            &store,
            &Author {
                first_name: "Isaak".to_string(),
                ..author.clone()
            },
        )
        .await
        .unwrap();

        let reloaded = BookStore::find_by_id(&store, saved.book.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.author_full_name(), "Isaak Asimov");
        assert_eq!(
            BookStore::find_by_author(&store, author.id.unwrap())
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
