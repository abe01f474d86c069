//! Book pages
//!
//! The book form offers authors and genres as select options, so every form
//! render (blank, edit or failed save) reloads both lists.

use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Path, Query, State,
    },
    Form,
};
use serde::Serialize;

use super::{accept, log_failure, Flash, FormQuery, ListQuery, Page};
use crate::{
    error::AppResult,
    models::{parse_id, BookDetails, BookForm},
    views::View,
    AppState,
};

const LIST_URL: &str = "/books";

/// One `<option>` of the author or genre select
#[derive(Debug, Serialize)]
pub struct SelectOption {
    pub id: i32,
    pub label: String,
    pub selected: bool,
}

pub async fn list_books(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Page {
    let (query, rejected) = accept(query.map(|Query(q)| q), "Listing books");
    tracing::debug!("Listing books, search={:?}", query.search());
    let view = query.apply_flash(View::new("books/list"));

    let view = match state.services.books.search(query.search()).await {
        Ok(books) => view.with("bookCount", books.len()).with("books", books),
        Err(e) => {
            log_failure("Listing books", &e);
            view.with("books", Vec::<BookDetails>::new())
                .with("bookCount", 0)
                .with("error", format!("Could not load books: {}", e.message()))
        }
    };

    let view = view.with("search", query.search());
    Page::View(match rejected {
        Some(msg) => view.with("error", msg),
        None => view,
    })
}

pub async fn book_form(
    State(state): State<AppState>,
    query: Result<Query<FormQuery>, QueryRejection>,
) -> Page {
    let (query, rejected) = accept(query.map(|Query(q)| q), "Loading book form");
    if let Some(msg) = rejected {
        let view = form_view(&state, &BookForm::default(), true).await;
        return Page::View(view.with("error", msg));
    }
    tracing::debug!("Book form, id={:?}", query.id);
    let Some(id) = parse_id(query.id.as_deref()) else {
        return Page::View(form_view(&state, &BookForm::default(), true).await);
    };

    match state.services.books.get_by_id(id).await {
        Ok(details) => Page::View(form_view(&state, &BookForm::from(&details.book), false).await),
        Err(e) => {
            log_failure("Loading book form", &e);
            Flash::Error(e.message()).redirect(LIST_URL)
        }
    }
}

/// Create or update a book; the author and genre must exist
pub async fn save_book(
    State(state): State<AppState>,
    form: Result<Form<BookForm>, FormRejection>,
) -> Page {
    let (form, rejected) = accept(form.map(|Form(f)| f), "Saving book");
    if let Some(msg) = rejected {
        let view = form_view(&state, &BookForm::default(), true).await;
        return Page::View(view.with("error", format!("Could not save book: {}", msg)));
    }
    tracing::debug!("Saving book, id={:?}", form.id);
    let form = form.trimmed();
    let id = parse_id(form.id.as_deref());

    match store_book(&state, &form, id).await {
        Ok(saved) => {
            tracing::info!(
                "Saved book '{}' ({}) by {}",
                saved.book.title,
                saved.book.id.unwrap_or_default(),
                saved.author_full_name()
            );
            let message = if id.is_some() { "Book updated" } else { "Book added" };
            Flash::Success(message.to_string()).redirect(LIST_URL)
        }
        Err(e) => {
            log_failure("Saving book", &e);
            Page::View(
                form_view(&state, &form, id.is_none())
                    .await
                    .with("error", format!("Could not save book: {}", e.message())),
            )
        }
    }
}

async fn store_book(state: &AppState, form: &BookForm, id: Option<i32>) -> AppResult<BookDetails> {
    if let Some(id) = id {
        state.services.books.get_by_id(id).await?;
    }
    let book = form.to_book(id)?;
    state.services.books.save(&book).await
}

pub async fn delete_book(State(state): State<AppState>, Path(id): Path<String>) -> Page {
    tracing::debug!("Deleting book {}", id);
    let Some(id) = parse_id(Some(id.as_str())) else {
        return Flash::Error(format!("Invalid book id '{}'", id)).redirect(LIST_URL);
    };

    match state.services.books.delete(id).await {
        Ok(()) => {
            tracing::info!("Deleted book {}", id);
            Flash::Deleted("Book deleted".to_string()).redirect(LIST_URL)
        }
        Err(e) => {
            log_failure("Deleting book", &e);
            Flash::Error(e.message()).redirect(LIST_URL)
        }
    }
}

pub async fn view_book(State(state): State<AppState>, Path(id): Path<String>) -> Page {
    tracing::debug!("Viewing book {}", id);
    let Some(id) = parse_id(Some(id.as_str())) else {
        return Flash::Error(format!("Invalid book id '{}'", id)).redirect(LIST_URL);
    };

    match state.services.books.get_by_id(id).await {
        Ok(book) => Page::View(View::new("books/view").with("book", book)),
        Err(e) => {
            log_failure("Viewing book", &e);
            Flash::Error(e.message()).redirect(LIST_URL)
        }
    }
}

/// Form view with the select options; a failed lookup leaves its list empty
async fn form_view(state: &AppState, form: &BookForm, is_new: bool) -> View {
    let selected_author = parse_id(form.author_id.as_deref());
    let selected_genre = parse_id(form.genre_id.as_deref());

    let authors: Vec<SelectOption> = match state.services.authors.get_all().await {
        Ok(authors) => authors
            .iter()
            .filter_map(|a| {
                a.id.map(|id| SelectOption {
                    id,
                    label: a.full_name(),
                    selected: Some(id) == selected_author,
                })
            })
            .collect(),
        Err(e) => {
            log_failure("Loading authors for book form", &e);
            Vec::new()
        }
    };
    let genres: Vec<SelectOption> = match state.services.genres.get_all().await {
        Ok(genres) => genres
            .into_iter()
            .filter_map(|g| {
                g.id.map(|id| SelectOption {
                    id,
                    label: g.name,
                    selected: Some(id) == selected_genre,
                })
            })
            .collect(),
        Err(e) => {
            log_failure("Loading genres for book form", &e);
            Vec::new()
        }
    };

    let view = View::new("books/form")
        .with("book", form)
        .with("isNew", is_new);
    let view = match missing_choices_warning(&authors, &genres) {
        Some(warning) => view.with("warning", warning),
        None => view,
    };
    view.with("authors", authors).with("genres", genres)
}

fn missing_choices_warning(authors: &[SelectOption], genres: &[SelectOption]) -> Option<&'static str> {
    match (authors.is_empty(), genres.is_empty()) {
        (true, true) => Some("Add an author and a genre first"),
        (true, false) => Some("Add an author first"),
        (false, true) => Some("Add a genre first"),
        (false, false) => None,
    }
}
