//! # Checkout Routes
//!
//! ## Request / Response
//! ```text
//! POST /checkout
//! { "items": [ { "product_id": 1, "quantity": 4 } ] }
//!
//! 200 ─► { "id": 12, "total_amount": 4000, "created_at": "...",
//!          "details": [ { "transaction_id": 12, "product_id": 1,
//!                         "product_name": "Kopi", "quantity": 4,
//!                         "subtotal": 4000 } ] }
//!
//! 400 ─► empty cart, quantity ≤ 0
//! 404 ─► unknown or deleted product
//! 409 ─► quantity above stock (nothing is written)
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use kasir_core::{CheckoutItem, Transaction};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::AppState;

/// Body of `POST /checkout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout))
        .route("/transactions/{id}", get(show_transaction))
}

async fn checkout(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<Json<Transaction>> {
    let Json(request) = payload?;
    let transaction = state.db.transactions().checkout(&request.items).await?;

    Ok(Json(transaction))
}

async fn show_transaction(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Transaction>> {
    let Path(id) = id?;
    Ok(Json(state.db.transactions().get_by_id(id).await?))
}
