//! Incident reporting endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::incident::{CreateIncident, Incident, IncidentDetails},
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct IncidentQuery {
    /// Restrict to incidents on one item
    pub item_id: Option<i32>,
}

/// File an incident report
#[utoipa::path(
    post,
    path = "/incidents",
    tag = "incidents",
    request_body = CreateIncident,
    responses(
        (status = 201, description = "Incident recorded"),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Reporting user no longer exists"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn create_incident(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateIncident>,
) -> AppResult<(StatusCode, Json<Incident>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let incident = state.services.incidents.record(request).await?;
    Ok((StatusCode::CREATED, Json(incident)))
}

/// List incidents, optionally filtered by item
#[utoipa::path(
    get,
    path = "/incidents",
    tag = "incidents",
    params(IncidentQuery),
    responses(
        (status = 200, description = "Incident reports, newest first", body = Vec<IncidentDetails>)
    )
)]
pub async fn list_incidents(
    State(state): State<crate::AppState>,
    Query(query): Query<IncidentQuery>,
) -> AppResult<Json<Vec<IncidentDetails>>> {
    let incidents = state.services.incidents.list(query.item_id).await?;
    Ok(Json(incidents))
}
