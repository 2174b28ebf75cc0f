//! Dashboard statistics endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

/// Dashboard statistics response
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    /// Loan statistics
    pub loans: LoanStats,
}

#[derive(Serialize, ToSchema)]
pub struct LoanStats {
    /// Active loans
    pub active: i64,
    /// Active loans past their due date
    pub overdue: i64,
}

/// Get dashboard statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Dashboard statistics", body = StatsResponse)
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
) -> AppResult<Json<StatsResponse>> {
    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}
