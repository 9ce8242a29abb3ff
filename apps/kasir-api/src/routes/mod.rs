//! # HTTP Routes
//!
//! One module per resource. Each exposes `router()` returning a
//! `Router<AppState>` that [`crate::build_router`] merges.
//!
//! Extractors are taken as `Result<_, Rejection>` so malformed input is
//! reported through [`crate::ApiError`] like every other failure.

pub mod categories;
pub mod checkout;
pub mod health;
pub mod products;
pub mod report;

use axum::Json;
use serde::Serialize;

/// Body returned by successful deletes.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub(crate) fn message(text: impl Into<String>) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.into(),
    })
}
