//! Incident (condition report) models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::enums::{AssetStatus, IncidentKind};

/// Incident record: a logged event changing an item's or part's condition
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Incident {
    pub id: i32,
    pub kind: IncidentKind,
    pub description: String,
    pub date: DateTime<Utc>,
    pub item_id: i32,
    pub reported_by: Uuid,
    /// New status applied to the item, if the report changes it
    pub item_new_status: Option<AssetStatus>,
}

/// Per-part detail of an incident
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct IncidentPart {
    pub id: i32,
    pub incident_id: i32,
    pub part_id: i32,
    pub quantity: Option<i32>,
    pub new_status: Option<AssetStatus>,
    pub description: Option<String>,
}

/// Incident with display snapshots
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IncidentDetails {
    pub id: i32,
    pub kind: IncidentKind,
    pub description: String,
    pub date: DateTime<Utc>,
    pub item_id: i32,
    pub item_code: Option<String>,
    pub reported_by: Uuid,
    pub reported_by_name: Option<String>,
    pub item_new_status: Option<AssetStatus>,
    pub parts: Vec<IncidentPart>,
}

/// Create incident request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateIncident {
    pub kind: IncidentKind,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub item_id: i32,
    /// Staff user filing the report
    pub reported_by: Uuid,
    pub item_new_status: Option<AssetStatus>,
    #[serde(default)]
    pub parts: Vec<IncidentPartRequest>,
}

/// Per-part detail of a create incident request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IncidentPartRequest {
    pub part_id: i32,
    pub quantity: Option<i32>,
    pub new_status: Option<AssetStatus>,
    pub description: Option<String>,
}
