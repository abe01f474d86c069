//! Request handlers for the catalog web pages
//!
//! Handlers never fail: every outcome is a [`Page`], either a view to render
//! or a redirect carrying a flash indicator in its query string.

pub mod authors;
pub mod books;
pub mod genres;
pub mod health;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::{error::AppError, views::View, AppState};

/// Outcome of a request handler
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    View(View),
    Redirect(String),
}

impl Page {
    pub fn as_view(&self) -> Option<&View> {
        match self {
            Page::View(view) => Some(view),
            Page::Redirect(_) => None,
        }
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Page::Redirect(url) => Some(url),
            Page::View(_) => None,
        }
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        match self {
            Page::Redirect(url) => Redirect::to(&url).into_response(),
            Page::View(view) => {
                // Rendered by `render_views`, which owns the template engine
                let mut response = StatusCode::OK.into_response();
                response.extensions_mut().insert(view);
                response
            }
        }
    }
}

/// One-shot outcome message carried to the next page load
#[derive(Debug, Clone, PartialEq)]
pub enum Flash {
    Success(String),
    Deleted(String),
    Error(String),
}

impl Flash {
    fn parts(&self) -> (&'static str, &str) {
        match self {
            Flash::Success(msg) => ("success", msg.as_str()),
            Flash::Deleted(msg) => ("deleted", msg.as_str()),
            Flash::Error(msg) => ("error", msg.as_str()),
        }
    }

    /// Redirect to `target` with this flash in the query string
    pub fn redirect(&self, target: &str) -> Page {
        match serde_urlencoded::to_string([self.parts()]) {
            Ok(query) => Page::Redirect(format!("{}?{}", target, query)),
            Err(e) => {
                tracing::error!("Cannot encode flash message: {}", e);
                Page::Redirect(target.to_string())
            }
        }
    }
}

/// Query parameters of a list page
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub success: Option<String>,
    pub deleted: Option<String>,
    pub error: Option<String>,
}

impl ListQuery {
    /// Copy the flash indicators of the previous redirect onto the view
    pub fn apply_flash(&self, view: View) -> View {
        let success = match (&self.success, &self.deleted) {
            (Some(msg), _) => Some(non_empty_or(msg, "Saved successfully")),
            (None, Some(msg)) => Some(non_empty_or(msg, "Deleted successfully")),
            (None, None) => None,
        };

        let view = match success {
            Some(msg) => view.with("success", msg),
            None => view,
        };
        match self.error {
            Some(ref msg) => view.with("error", non_empty_or(msg, "Operation failed")),
            None => view,
        }
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

fn non_empty_or(msg: &str, default: &str) -> String {
    if msg.trim().is_empty() {
        default.to_string()
    } else {
        msg.to_string()
    }
}

/// Log a failed operation; user mistakes are warnings, the rest are errors
pub(crate) fn log_failure(action: &str, err: &AppError) {
    match err {
        AppError::Validation(_)
        | AppError::NotFound(_)
        | AppError::IntegrityViolation(_)
        | AppError::DependencyExists(_) => tracing::warn!("{} rejected: {}", action, err),
        AppError::Database(_) | AppError::Internal(_) => tracing::error!("{} failed: {}", action, err),
    }
}

/// Unwrap an extractor result. A request that cannot be decoded falls back to
/// the default value plus a message for the page.
pub(crate) fn accept<T: Default>(
    extracted: Result<T, impl std::fmt::Display>,
    action: &str,
) -> (T, Option<String>) {
    match extracted {
        Ok(value) => (value, None),
        Err(rejection) => {
            tracing::warn!("{} rejected: {}", action, rejection);
            (T::default(), Some(format!("Invalid request: {}", rejection)))
        }
    }
}

/// Query parameters of a form page
#[derive(Debug, Default, Deserialize)]
pub struct FormQuery {
    pub id: Option<String>,
}

/// Render the `View` attached to a handler response
pub async fn render_views(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let Some(view) = response.extensions_mut().remove::<View>() else {
        return response;
    };

    match state.views.render(&view) {
        Ok(html) => Html(html).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/books") }))
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authors
        .route("/authors", get(authors::list_authors))
        .route("/authors/form", get(authors::author_form))
        .route("/authors/save", post(authors::save_author))
        .route("/authors/delete/:id", get(authors::delete_author))
        .route("/authors/view/:id", get(authors::view_author))
        // Books
        .route("/books", get(books::list_books))
        .route("/books/form", get(books::book_form))
        .route("/books/save", post(books::save_book))
        .route("/books/delete/:id", get(books::delete_book))
        .route("/books/view/:id", get(books::view_book))
        // Genres
        .route("/genres", get(genres::list_genres))
        .route("/genres/form", get(genres::genre_form))
        .route("/genres/save", post(genres::save_genre))
        .route("/genres/delete/:id", get(genres::delete_genre))
        .route("/genres/view/:id", get(genres::view_genre))
        .layer(middleware::from_fn_with_state(state.clone(), render_views))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
    };
    use serde_json::json;
    use tower::ServiceExt;

    #[test]
    fn test_flash_redirect_is_url_encoded() {
        let page = Flash::Error("Author not found & gone".to_string()).redirect("/authors");
        assert_eq!(
            page.redirect_target(),
            Some("/authors?error=Author+not+found+%26+gone")
        );

        let page = Flash::Deleted("Book deleted".to_string()).redirect("/books");
        assert_eq!(page.redirect_target(), Some("/books?deleted=Book+deleted"));
    }

    #[test]
    fn test_bare_indicators_get_default_messages() {
        let query = ListQuery {
            success: Some(String::new()),
            error: Some("Genre not found".to_string()),
            ..Default::default()
        };
        let view = query.apply_flash(View::new("genres/list"));
        assert_eq!(view.attribute("success"), Some(&json!("Saved successfully")));
        assert_eq!(view.attribute("error"), Some(&json!("Genre not found")));

        let query = ListQuery {
            deleted: Some(String::new()),
            ..Default::default()
        };
        let view = query.apply_flash(View::new("books/list"));
        assert_eq!(view.attribute("success"), Some(&json!("Deleted successfully")));
        assert_eq!(view.attribute("error"), None);
    }

    #[tokio::test]
    async fn test_router_renders_list_page() {
        let app = router(test_support::state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/genres?deleted")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("<h1>Genres</h1>"));
        assert!(html.contains("Deleted successfully"));
    }

    #[tokio::test]
    async fn test_router_save_redirects_with_see_other() {
        let state = test_support::state();
        let app = router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/genres/save")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("name=Sci-Fi&description="))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("/genres?success="));

        let genres = state.services.genres.get_all().await.unwrap();
        assert_eq!(genres.len(), 1);
        assert_eq!(genres[0].description, None);
    }

    #[tokio::test]
    async fn test_router_root_redirects_to_books() {
        let app = router(test_support::state());
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/books");
    }

    async fn body_text(response: Response) -> String {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_undecodable_query_still_renders_list() {
        let app = router(test_support::state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/books?search=a&search=b")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<h1>Books</h1>"));
        assert!(html.contains("Invalid request: "));
    }

    #[tokio::test]
    async fn test_undecodable_form_query_renders_blank_form() {
        let app = router(test_support::state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/authors/form?id=1&id=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"action="/authors/save""#));
        assert!(html.contains("Invalid request: "));
    }

    #[tokio::test]
    async fn test_save_without_form_content_type_rerenders_form() {
        let state = test_support::state();
        let app = router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/genres/save")
                    .body(Body::from("name=Sci-Fi"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"action="/genres/save""#));
        assert!(html.contains("Could not save genre: Invalid request: "));
        assert!(state.services.genres.get_all().await.unwrap().is_empty());
    }
}
