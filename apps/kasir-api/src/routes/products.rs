//! # Product Routes
//!
//! ```text
//! GET    /products?name=kopi  list live products, optional name filter
//! POST   /products            create (201), category must be live
//! GET    /products/{id}       get one with its category
//! PUT    /products/{id}       partial update
//! DELETE /products/{id}       soft-delete
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use kasir_core::{NewProduct, ProductPatch, ProductWithCategory};
use serde::Deserialize;
use tracing::info;

use super::{message, MessageResponse};
use crate::error::ApiResult;
use crate::AppState;

/// Query string for `GET /products`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Case-insensitive substring of the product name.
    pub name: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list).post(create))
        .route("/products/{id}", get(show).put(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<ProductWithCategory>>> {
    let Query(params) = params?;
    Ok(Json(state.db.products().list(params.name.as_deref()).await?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ProductWithCategory>)> {
    let Json(input) = payload?;
    let created = state.db.products().create(&input).await?;

    info!(
        id = %created.product.id,
        name = %created.product.name,
        category_id = %created.category.id,
        "Product created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

async fn show(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ProductWithCategory>> {
    let Path(id) = id?;
    Ok(Json(state.db.products().get_by_id(id).await?))
}

async fn update(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProductPatch>, JsonRejection>,
) -> ApiResult<Json<ProductWithCategory>> {
    let Path(id) = id?;
    let Json(patch) = payload?;

    Ok(Json(state.db.products().update(id, &patch).await?))
}

async fn remove(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    state.db.products().delete(id).await?;

    info!(id = %id, "Product deleted");
    Ok(message("Product deleted successfully"))
}
