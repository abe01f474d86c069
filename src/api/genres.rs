//! Genre pages

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
    models::{parse_id, Genre, GenreForm},
    views::View,
    AppState,
};

const LIST_URL: &str = "/genres";

pub async fn list_genres(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Page {
    let (query, rejected) = accept(query.map(|Query(q)| q), "Listing genres");
    tracing::debug!("Listing genres, search={:?}", query.search());
    let view = query.apply_flash(View::new("genres/list"));

    let view = match state.services.genres.search(query.search()).await {
        Ok(genres) => view.with("genreCount", genres.len()).with("genres", genres),
        Err(e) => {
            log_failure("Listing genres", &e);
            view.with("genres", Vec::<Genre>::new())
                .with("genreCount", 0)
                .with("error", format!("Could not load genres: {}", e.message()))
        }
    };

    let view = view.with("search", query.search());
    Page::View(match rejected {
        Some(msg) => view.with("error", msg),
        None => view,
    })
}

pub async fn genre_form(
    State(state): State<AppState>,
    query: Result<Query<FormQuery>, QueryRejection>,
) -> Page {
    let (query, rejected) = accept(query.map(|Query(q)| q), "Loading genre form");
    if let Some(msg) = rejected {
        return Page::View(form_view(&GenreForm::default(), true).with("error", msg));
    }
    tracing::debug!("Genre form, id={:?}", query.id);
    let Some(id) = parse_id(query.id.as_deref()) else {
        return Page::View(form_view(&GenreForm::default(), true));
    };

    match state.services.genres.get_by_id(id).await {
        Ok(genre) => Page::View(form_view(&GenreForm::from(&genre), false)),
        Err(e) => {
            log_failure("Loading genre form", &e);
            Flash::Error(e.message()).redirect(LIST_URL)
        }
    }
}

/// Create or update a genre; names are unique regardless of case
pub async fn save_genre(
    State(state): State<AppState>,
    form: Result<Form<GenreForm>, FormRejection>,
) -> Page {
    let (form, rejected) = accept(form.map(|Form(f)| f), "Saving genre");
    if let Some(msg) = rejected {
        return Page::View(
            form_view(&GenreForm::default(), true)
                .with("error", format!("Could not save genre: {}", msg)),
        );
    }
    tracing::debug!("Saving genre, id={:?}", form.id);
    let form = form.trimmed();
    let id = parse_id(form.id.as_deref());

    match store_genre(&state, &form, id).await {
        Ok(genre) => {
            tracing::info!("Saved genre '{}' ({})", genre.name, genre.id.unwrap_or_default());
            let message = if id.is_some() { "Genre updated" } else { "Genre added" };
            Flash::Success(message.to_string()).redirect(LIST_URL)
        }
        Err(e) => {
            log_failure("Saving genre", &e);
            Page::View(
                form_view(&form, id.is_none())
                    .with("error", format!("Could not save genre: {}", e.message())),
            )
        }
    }
}

async fn store_genre(state: &AppState, form: &GenreForm, id: Option<i32>) -> AppResult<Genre> {
    if let Some(id) = id {
        state.services.genres.get_by_id(id).await?;
    }
    let genre = form.to_genre(id)?;

    if state.services.genres.name_taken(&genre.name, id).await? {
        return Err(AppError::IntegrityViolation(
            "A genre with this name already exists".to_string(),
        ));
    }
    state.services.genres.save(&genre).await
}

/// Delete a genre that no longer has books
pub async fn delete_genre(State(state): State<AppState>, Path(id): Path<String>) -> Page {
    tracing::debug!("Deleting genre {}", id);
    let Some(id) = parse_id(Some(id.as_str())) else {
        return Flash::Error(format!("Invalid genre id '{}'", id)).redirect(LIST_URL);
    };

    let result = async {
        let genre = state.services.genres.ensure_deletable(id).await?;
        state.services.genres.delete(id).await?;
        Ok::<_, AppError>(genre)
    }
    .await;

    match result {
        Ok(genre) => {
            tracing::info!("Deleted genre '{}' ({})", genre.name, id);
            Flash::Deleted("Genre deleted".to_string()).redirect(LIST_URL)
        }
        Err(e) => {
            log_failure("Deleting genre", &e);
            Flash::Error(e.message()).redirect(LIST_URL)
        }
    }
}

pub async fn view_genre(State(state): State<AppState>, Path(id): Path<String>) -> Page {
    tracing::debug!("Viewing genre {}", id);
    let Some(id) = parse_id(Some(id.as_str())) else {
        return Flash::Error(format!("Invalid genre id '{}'", id)).redirect(LIST_URL);
    };

    let result = async {
        let genre = state.services.genres.get_by_id(id).await?;
        let books = state.services.genres.books(id).await?;
        Ok::<_, AppError>((genre, books))
    }
    .await;

    match result {
        Ok((genre, books)) => Page::View(
            View::new("genres/view")
                .with("genre", &genre)
                .with("bookCount", books.len())
                .with("books", books),
        ),
        Err(e) => {
            log_failure("Viewing genre", &e);
            Flash::Error(e.message()).redirect(LIST_URL)
        }
    }
}

fn form_view(form: &GenreForm, is_new: bool) -> View {
    View::new("genres/form")
        .with("genre", form)
        .with("isNew", is_new)
}
