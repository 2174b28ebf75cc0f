//! Loan ledger endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        catalog::AvailabilityReport,
        loan::{CreateLoan, LoanDetails, LoanTarget, ProcessReturn},
    },
};

/// Availability query: exactly one of `item_id` / `part_id`
#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    pub item_id: Option<i32>,
    pub part_id: Option<i32>,
}

impl AvailabilityQuery {
    fn target(&self) -> AppResult<LoanTarget> {
        match (self.item_id, self.part_id) {
            (Some(id), None) => Ok(LoanTarget::Item(id)),
            (None, Some(id)) => Ok(LoanTarget::Part(id)),
            _ => Err(AppError::Validation(
                "exactly one of item_id or part_id is required".to_string(),
            )),
        }
    }
}

/// Create a new loan
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanDetails),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Issuing user no longer exists"),
        (status = 404, description = "Item or part not found"),
        (status = 409, description = "Requested quantity exceeds availability")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanDetails>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let loan = state.services.loans.create_loan(request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// List all loans with nested line details
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    responses(
        (status = 200, description = "All loans, newest first", body = Vec<LoanDetails>)
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.list_loans().await?;
    Ok(Json(loans))
}

/// Get a single loan
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan details", body = LoanDetails),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.get_loan(loan_id).await?;
    Ok(Json(loan))
}

/// Process a batch of return decisions for a loan
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    request_body = ProcessReturn,
    responses(
        (status = 200, description = "Return processed", body = LoanDetails),
        (status = 400, description = "Invalid decision list"),
        (status = 403, description = "Receiving user no longer exists"),
        (status = 404, description = "Loan or outstanding line not found")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    Path(loan_id): Path<i32>,
    Json(request): Json<ProcessReturn>,
) -> AppResult<Json<LoanDetails>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let loan = state.services.loans.process_return(loan_id, request).await?;
    Ok(Json(loan))
}

/// Availability for a single item or part
#[utoipa::path(
    get,
    path = "/availability",
    tag = "loans",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Availability report", body = AvailabilityReport),
        (status = 400, description = "Missing or ambiguous target"),
        (status = 404, description = "Item or part not found")
    )
)]
pub async fn get_availability(
    State(state): State<crate::AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityReport>> {
    let report = state.services.loans.availability(query.target()?).await?;
    Ok(Json(report))
}
