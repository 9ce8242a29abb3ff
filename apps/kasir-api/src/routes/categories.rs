//! # Category Routes
//!
//! ```text
//! GET    /categories          list live categories
//! POST   /categories          create (201)
//! GET    /categories/{id}     get one
//! PUT    /categories/{id}     partial update
//! DELETE /categories/{id}     soft-delete, refused while products use it
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use kasir_core::{Category, CategoryPatch, NewCategory};
use tracing::info;

use super::{message, MessageResponse};
use crate::error::ApiResult;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list).post(create))
        .route("/categories/{id}", get(show).put(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db.categories().list().await?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let Json(input) = payload?;
    let category = state.db.categories().create(&input).await?;

    info!(id = %category.id, name = %category.name, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

async fn show(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Category>> {
    let Path(id) = id?;
    Ok(Json(state.db.categories().get_by_id(id).await?))
}

async fn update(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CategoryPatch>, JsonRejection>,
) -> ApiResult<Json<Category>> {
    let Path(id) = id?;
    let Json(patch) = payload?;

    Ok(Json(state.db.categories().update(id, &patch).await?))
}

async fn remove(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    state.db.categories().delete(id).await?;

    info!(id = %id, "Category deleted");
    Ok(message("Category deleted successfully"))
}
