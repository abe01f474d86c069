//! Author pages

use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Path, Query, State,
    },
    Form,
};

use super::{accept, log_failure, Flash, FormQuery, ListQuery, Page};
use crate::{
    error::{AppError, AppResult},
    models::{parse_id, Author, AuthorForm},
    views::View,
    AppState,
};

const LIST_URL: &str = "/authors";

/// List authors, optionally filtered by `search`
pub async fn list_authors(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Page {
    let (query, rejected) = accept(query.map(|Query(q)| q), "Listing authors");
    tracing::debug!("Listing authors, search={:?}", query.search());
    let view = query.apply_flash(View::new("authors/list"));

    let view = match state.services.authors.search(query.search()).await {
        Ok(authors) => view
            .with("authorCount", authors.len())
            .with("authors", authors),
        Err(e) => {
            log_failure("Listing authors", &e);
            view.with("authors", Vec::<Author>::new())
                .with("authorCount", 0)
                .with("error", format!("Could not load authors: {}", e.message()))
        }
    };

    let view = view.with("search", query.search());
    Page::View(match rejected {
        Some(msg) => view.with("error", msg),
        None => view,
    })
}

/// Blank form, or the author identified by `id` ready for editing
pub async fn author_form(
    State(state): State<AppState>,
    query: Result<Query<FormQuery>, QueryRejection>,
) -> Page {
    let (query, rejected) = accept(query.map(|Query(q)| q), "Loading author form");
    if let Some(msg) = rejected {
        return Page::View(form_view(&AuthorForm::default(), true).with("error", msg));
    }
    tracing::debug!("Author form, id={:?}", query.id);
    let Some(id) = parse_id(query.id.as_deref()) else {
        return Page::View(form_view(&AuthorForm::default(), true));
    };

    match state.services.authors.get_by_id(id).await {
        Ok(author) => Page::View(form_view(&AuthorForm::from(&author), false)),
        Err(e) => {
            log_failure("Loading author form", &e);
            Flash::Error(e.message()).redirect(LIST_URL)
        }
    }
}

/// Create or update an author from the submitted form
pub async fn save_author(
    State(state): State<AppState>,
    form: Result<Form<AuthorForm>, FormRejection>,
) -> Page {
    let (form, rejected) = accept(form.map(|Form(f)| f), "Saving author");
    if let Some(msg) = rejected {
        return Page::View(
            form_view(&AuthorForm::default(), true)
                .with("error", format!("Could not save author: {}", msg)),
        );
    }
    tracing::debug!("Saving author, id={:?}", form.id);
    let form = form.trimmed();
    let id = parse_id(form.id.as_deref());

    match store_author(&state, &form, id).await {
        Ok(author) => {
            tracing::info!("Saved author {} ({})", author.full_name(), author.id.unwrap_or_default());
            let message = if id.is_some() { "Author updated" } else { "Author added" };
            Flash::Success(message.to_string()).redirect(LIST_URL)
        }
        Err(e) => {
            log_failure("Saving author", &e);
            Page::View(
                form_view(&form, id.is_none())
                    .with("error", format!("Could not save author: {}", e.message())),
            )
        }
    }
}

async fn store_author(state: &AppState, form: &AuthorForm, id: Option<i32>) -> AppResult<Author> {
    if let Some(id) = id {
        // Editing a record that has gone away fails before validation
        state.services.authors.get_by_id(id).await?;
    }
    let author = form.to_author(id)?;
    state.services.authors.save(&author).await
}

/// Delete an author that no longer has books
pub async fn delete_author(State(state): State<AppState>, Path(id): Path<String>) -> Page {
    tracing::debug!("Deleting author {}", id);
    let Some(id) = parse_id(Some(id.as_str())) else {
        return Flash::Error(format!("Invalid author id '{}'", id)).redirect(LIST_URL);
    };

    let result = async {
        let author = state.services.authors.ensure_deletable(id).await?;
        state.services.authors.delete(id).await?;
        Ok::<_, AppError>(author)
    }
    .await;

    match result {
        Ok(author) => {
            tracing::info!("Deleted author {} ({})", author.full_name(), id);
            Flash::Deleted("Author deleted".to_string()).redirect(LIST_URL)
        }
        Err(e) => {
            log_failure("Deleting author", &e);
            Flash::Error(e.message()).redirect(LIST_URL)
        }
    }
}

/// Author details with the books they wrote
pub async fn view_author(State(state): State<AppState>, Path(id): Path<String>) -> Page {
    tracing::debug!("Viewing author {}", id);
    let Some(id) = parse_id(Some(id.as_str())) else {
        return Flash::Error(format!("Invalid author id '{}'", id)).redirect(LIST_URL);
    };

    let result = async {
        let author = state.services.authors.get_by_id(id).await?;
        let books = state.services.authors.books(id).await?;
        Ok::<_, AppError>((author, books))
    }
    .await;

    match result {
        Ok((author, books)) => Page::View(
            View::new("authors/view")
                .with("author", &author)
                .with("bookCount", books.len())
                .with("books", books),
        ),
        Err(e) => {
            log_failure("Viewing author", &e);
            Flash::Error(e.message()).redirect(LIST_URL)
        }
    }
}

fn form_view(form: &AuthorForm, is_new: bool) -> View {
    View::new("authors/form")
        .with("author", form)
        .with("isNew", is_new)
}
