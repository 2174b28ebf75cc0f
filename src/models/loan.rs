//! Loan ledger models: loans, loan lines, and return decisions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::catalog::{ItemShort, PartShort};
use super::enums::{BorrowerType, LoanStatus, ReturnCondition};
use super::user::UserShort;

/// Loan record from the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: i32,
    pub borrower_type: BorrowerType,
    /// External borrower id (student RU, citizen CI, ...)
    pub borrower_identifier: String,
    pub borrower_name: String,
    /// Set at creation, immutable
    pub checkout_date: DateTime<Utc>,
    /// Caller-supplied due date
    pub due_date: DateTime<Utc>,
    /// Set once, when the last line is returned
    pub returned_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    /// Staff user who issued the loan
    pub issued_by: Uuid,
    /// Staff user who received the return, set when the loan closes
    pub received_by: Option<Uuid>,
}

/// Loan line record: one borrowed quantity of a single item or part
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoanLine {
    pub id: i32,
    pub loan_id: i32,
    pub item_id: Option<i32>,
    pub part_id: Option<i32>,
    pub quantity: i32,
    pub returned: bool,
    pub returned_date: Option<DateTime<Utc>>,
    pub return_condition: Option<ReturnCondition>,
    pub return_notes: Option<String>,
}

impl LoanLine {
    /// The target this line reserves stock against.
    ///
    /// The schema guarantees exactly one of `item_id`/`part_id` is set; a row
    /// violating that is a data-integrity failure, not a caller error.
    pub fn target(&self) -> Option<LoanTarget> {
        match (self.item_id, self.part_id) {
            (Some(id), None) => Some(LoanTarget::Item(id)),
            (None, Some(id)) => Some(LoanTarget::Part(id)),
            _ => None,
        }
    }
}

/// A loan target: a whole item or a quantity drawn from a part's pool.
///
/// Ordered (items first, then by id) so that multi-target transactions can
/// take row locks in a deterministic order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LoanTarget {
    Item(i32),
    Part(i32),
}

/// Loan with nested lines and display snapshots
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub borrower_type: BorrowerType,
    pub borrower_identifier: String,
    pub borrower_name: String,
    pub checkout_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub issued_by: Option<UserShort>,
    pub received_by: Option<UserShort>,
    pub is_overdue: bool,
    pub lines: Vec<LineDetails>,
}

/// Loan line with its target snapshot
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LineDetails {
    pub id: i32,
    pub quantity: i32,
    pub returned: bool,
    pub returned_date: Option<DateTime<Utc>>,
    pub return_condition: Option<ReturnCondition>,
    pub return_notes: Option<String>,
    pub item: Option<ItemShort>,
    pub part: Option<PartShort>,
}

/// Create loan request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLoan {
    pub borrower_type: BorrowerType,
    #[validate(length(min = 1, message = "borrower_identifier is required"))]
    pub borrower_identifier: String,
    #[validate(length(min = 1, message = "borrower_name is required"))]
    pub borrower_name: String,
    pub due_date: DateTime<Utc>,
    /// Staff user issuing the loan; must exist in the user store
    pub issued_by: Uuid,
    #[validate(length(min = 1, message = "at least one line is required"))]
    pub lines: Vec<LineRequest>,
}

/// One requested loan line
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LineRequest {
    pub item_id: Option<i32>,
    pub part_id: Option<i32>,
    pub quantity: i32,
}

impl LineRequest {
    /// Resolve the line target, enforcing the exactly-one-of invariant and
    /// the per-target quantity rules (positive; items are not fungible, so
    /// item lines always carry quantity 1).
    pub fn target(&self) -> Result<LoanTarget, String> {
        let target = match (self.item_id, self.part_id) {
            (Some(id), None) => LoanTarget::Item(id),
            (None, Some(id)) => LoanTarget::Part(id),
            (Some(_), Some(_)) => {
                return Err("a line references either an item or a part, not both".to_string())
            }
            (None, None) => {
                return Err("a line must reference an item or a part".to_string())
            }
        };
        if self.quantity <= 0 {
            return Err("quantity must be positive".to_string());
        }
        if matches!(target, LoanTarget::Item(_)) && self.quantity != 1 {
            return Err("item lines must have quantity 1".to_string());
        }
        Ok(target)
    }
}

/// Per-line return decision
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReturnDecision {
    pub line_id: i32,
    pub condition: ReturnCondition,
    pub notes: Option<String>,
}

/// Process return request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProcessReturn {
    /// Staff user receiving the return
    pub received_by: Uuid,
    #[validate(length(min = 1, message = "at least one return decision is required"))]
    pub decisions: Vec<ReturnDecision>,
}
