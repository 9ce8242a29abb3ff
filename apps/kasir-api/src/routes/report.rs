//! # Report Routes
//!
//! Days are calendar days in the server's local time zone.
//!
//! ```text
//! GET /report/hari-ini                                  today
//! GET /report?start_date=2026-10-01&end_date=2026-10-07 inclusive dates
//! GET /report?start_date=2026-10-01                     Oct 1 up to today
//! ```

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use kasir_core::SalesReport;
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiResult;
use crate::AppState;

/// Query string for `GET /report`. Missing dates default to today.
#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/report/hari-ini", get(today))
        .route("/report", get(for_dates))
}

async fn today(State(state): State<AppState>) -> ApiResult<Json<SalesReport>> {
    Ok(Json(state.db.reports().daily(&Local).await?))
}

async fn for_dates(
    State(state): State<AppState>,
    params: Result<Query<ReportParams>, QueryRejection>,
) -> ApiResult<Json<SalesReport>> {
    let Query(params) = params?;

    let today = Local::now().date_naive();
    let start = params.start_date.unwrap_or(today);
    let end = params.end_date.unwrap_or(today);

    debug!(start = %start, end = %end, "Report requested");
    Ok(Json(state.db.reports().for_dates(&Local, start, end).await?))
}
