//! Staff user model
//!
//! Authentication lives outside this service; the ledger only needs to
//! verify that the staff actor referenced by a request still exists.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Staff user snapshot for loan and incident views
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserShort {
    pub id: Uuid,
    pub name: String,
}
