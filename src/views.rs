//! Server-side views
//!
//! A [`View`] names a template and carries a flat attribute map. The
//! [`ViewEngine`] renders it with handlebars; templates are compiled into the
//! binary.

use handlebars::Handlebars;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

const LAYOUT: &str = include_str!("../templates/partials/layout.hbs");

const TEMPLATES: &[(&str, &str)] = &[
    ("authors/list", include_str!("../templates/authors/list.hbs")),
    ("authors/form", include_str!("../templates/authors/form.hbs")),
    ("authors/view", include_str!("../templates/authors/view.hbs")),
    ("books/list", include_str!("../templates/books/list.hbs")),
    ("books/form", include_str!("../templates/books/form.hbs")),
    ("books/view", include_str!("../templates/books/view.hbs")),
    ("genres/list", include_str!("../templates/genres/list.hbs")),
    ("genres/form", include_str!("../templates/genres/form.hbs")),
    ("genres/view", include_str!("../templates/genres/view.hbs")),
];

/// A template name plus the attributes it is rendered with
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    name: &'static str,
    attributes: Map<String, Value>,
}

impl View {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: Map::new(),
        }
    }

    /// Set an attribute, replacing any previous value under `key`
    pub fn with<T: Serialize>(mut self, key: &str, value: T) -> Self {
        let value = serde_json::to_value(value).unwrap_or_else(|e| {
            tracing::error!("Cannot serialize view attribute '{}': {}", key, e);
            Value::Null
        });
        self.attributes.insert(key.to_string(), value);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

/// Handlebars engine holding every catalog template
pub struct ViewEngine {
    handlebars: Handlebars<'static>,
}

impl ViewEngine {
    pub fn new() -> AppResult<Self> {
        let mut handlebars = Handlebars::new();

        handlebars
            .register_partial("layout", LAYOUT)
            .map_err(|e| AppError::Internal(format!("Invalid layout template: {}", e)))?;

        for (name, source) in TEMPLATES {
            handlebars
                .register_template_string(name, *source)
                .map_err(|e| AppError::Internal(format!("Invalid template {}: {}", name, e)))?;
        }

        Ok(Self { handlebars })
    }

    pub fn render(&self, view: &View) -> AppResult<String> {
        self.handlebars
            .render(view.name(), view.attributes())
            .map_err(|e| AppError::Internal(format!("Cannot render {}: {}", view.name(), e)))
    }
}
