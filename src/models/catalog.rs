//! Asset catalog models (items and parts)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::AssetStatus;

/// Item record: a uniquely identified physical asset, stock implicitly 1
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    pub id: i32,
    /// Inventory code, unique
    pub code: String,
    pub description: String,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub status: AssetStatus,
    pub template_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Part record: a fungible sub-component of an item with a stock count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Part {
    pub id: i32,
    pub item_id: i32,
    pub name: String,
    /// Total stock in the pool
    pub quantity: i32,
    pub notes: Option<String>,
    pub status: AssetStatus,
    pub created_at: DateTime<Utc>,
}

/// Item snapshot embedded in loan and incident views
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ItemShort {
    pub id: i32,
    pub code: String,
    pub description: String,
    pub status: AssetStatus,
}

/// Part snapshot embedded in loan and incident views
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PartShort {
    pub id: i32,
    pub item_id: i32,
    pub name: String,
    pub quantity: i32,
    pub status: AssetStatus,
}

/// Item with its parts and computed availability, for catalog reads
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemDetails {
    #[serde(flatten)]
    pub item: Item,
    /// Units not currently out on an active loan (0 or 1 for an item)
    pub available: i64,
    pub parts: Vec<PartAvailability>,
}

/// Part with its computed availability
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PartAvailability {
    #[serde(flatten)]
    pub part: Part,
    /// Stock not currently out on an active loan
    pub available: i64,
}

/// Availability report for a single loan target
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvailabilityReport {
    pub item_id: Option<i32>,
    pub part_id: Option<i32>,
    /// Total stock in the catalog
    pub total: i64,
    /// Quantity out on outstanding lines of active loans
    pub outstanding: i64,
    /// `total - outstanding`
    pub available: i64,
}
