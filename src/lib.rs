//! Library Catalog
//!
//! Server-rendered management of authors, books and genres, with keyword
//! search and delete guards for authors and genres that still have books.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
    pub repository: repository::Repository,
    pub views: Arc<views::ViewEngine>,
}

impl AppState {
    pub fn new(repository: repository::Repository) -> AppResult<Self> {
        Ok(Self {
            services: Arc::new(services::Services::new(repository.clone())),
            repository,
            views: Arc::new(views::ViewEngine::new()?),
        })
    }
}
