//! Data models for Almacen

pub mod catalog;
pub mod enums;
pub mod incident;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use catalog::{Item, ItemShort, Part, PartShort};
pub use enums::{AssetStatus, BorrowerType, IncidentKind, LoanStatus, ReturnCondition};
pub use loan::{Loan, LoanDetails, LoanLine, LoanTarget};
pub use user::UserShort;
