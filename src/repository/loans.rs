//! Loan ledger repository for database operations
//!
//! The two multi-statement mutations (create, process return) each run in a
//! single transaction. Creation takes row locks on every distinct target so
//! that two concurrent requests cannot both observe availability > 0 and
//! over-commit scarce stock.

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        catalog::{ItemShort, PartShort},
        enums::LoanStatus,
        loan::{CreateLoan, LineDetails, Loan, LoanLine, LoanTarget, ReturnDecision},
    },
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// List all loans, newest first
    pub async fn find_all(&self) -> AppResult<Vec<Loan>> {
        let loans =
            sqlx::query_as::<_, Loan>("SELECT * FROM loans ORDER BY checkout_date DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(loans)
    }

    /// Quantity out on outstanding lines of active loans for one target
    pub async fn outstanding_quantity(&self, target: LoanTarget) -> AppResult<i64> {
        outstanding_on(&self.pool, target).await
    }

    /// Create a loan with all its lines atomically.
    ///
    /// `requirements` is the requested quantity aggregated per distinct
    /// target, sorted; each target row is locked in that order before its
    /// availability is re-checked, and a shortfall aborts the whole insert
    /// with a conflict.
    pub async fn create(
        &self,
        request: &CreateLoan,
        requirements: &[(LoanTarget, i64)],
    ) -> AppResult<Loan> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for &(target, required) in requirements {
            let total: i64 = match target {
                LoanTarget::Item(id) => {
                    sqlx::query_scalar::<_, i32>("SELECT id FROM items WHERE id = $1 FOR UPDATE")
                        .bind(id)
                        .fetch_optional(&mut *tx)
                        .await?
                        .ok_or_else(|| {
                            AppError::NotFound(format!("Item with id {} not found", id))
                        })?;
                    1
                }
                LoanTarget::Part(id) => sqlx::query_scalar::<_, i32>(
                    "SELECT quantity FROM parts WHERE id = $1 FOR UPDATE",
                )
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Part with id {} not found", id)))?
                    as i64,
            };

            let outstanding = outstanding_on(&mut *tx, target).await?;
            let available = total - outstanding;
            if required > available {
                return Err(AppError::Conflict(format!(
                    "Insufficient availability for {:?}: requested {}, available {}",
                    target, required, available
                )));
            }
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (
                borrower_type, borrower_identifier, borrower_name,
                checkout_date, due_date, status, issued_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(request.borrower_type)
        .bind(&request.borrower_identifier)
        .bind(&request.borrower_name)
        .bind(now)
        .bind(request.due_date)
        .bind(LoanStatus::Active)
        .bind(request.issued_by)
        .fetch_one(&mut *tx)
        .await?;

        for line in &request.lines {
            sqlx::query(
                "INSERT INTO loan_lines (loan_id, item_id, part_id, quantity) VALUES ($1, $2, $3, $4)",
            )
            .bind(loan.id)
            .bind(line.item_id)
            .bind(line.part_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(loan)
    }

    /// Apply a batch of return decisions to a loan, all-or-nothing.
    ///
    /// Each decision must hit a line of this loan that is still outstanding;
    /// the `returned = FALSE` guard in the update makes re-returning an
    /// already-returned line a not-found error, keeping returned lines
    /// immutable. When the last outstanding line returns, the loan itself
    /// transitions to returned.
    pub async fn process_return(
        &self,
        loan_id: i32,
        received_by: Uuid,
        decisions: &[ReturnDecision],
    ) -> AppResult<(Loan, Vec<LoanLine>)> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(loan_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        let mut updated = Vec::with_capacity(decisions.len());
        for decision in decisions {
            let line = sqlx::query_as::<_, LoanLine>(
                r#"
                UPDATE loan_lines
                SET returned = TRUE, returned_date = $1,
                    return_condition = $2, return_notes = $3
                WHERE id = $4 AND loan_id = $5 AND returned = FALSE
                RETURNING *
                "#,
            )
            .bind(now)
            .bind(decision.condition)
            .bind(&decision.notes)
            .bind(decision.line_id)
            .bind(loan_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Outstanding line {} not found in loan {}",
                    decision.line_id, loan_id
                ))
            })?;
            updated.push(line);
        }

        let pending: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loan_lines WHERE loan_id = $1 AND returned = FALSE",
        )
        .bind(loan_id)
        .fetch_one(&mut *tx)
        .await?;

        let loan = if pending == 0 {
            sqlx::query_as::<_, Loan>(
                r#"
                UPDATE loans
                SET status = $1, returned_date = $2, received_by = $3
                WHERE id = $4
                RETURNING *
                "#,
            )
            .bind(LoanStatus::Returned)
            .bind(now)
            .bind(received_by)
            .bind(loan_id)
            .fetch_one(&mut *tx)
            .await?
        } else {
            loan
        };

        tx.commit().await?;
        Ok((loan, updated))
    }

    /// Line details with target snapshots for a set of loans
    pub async fn line_details(&self, loan_ids: &[i32]) -> AppResult<Vec<(i32, LineDetails)>> {
        if loan_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT ll.id, ll.loan_id, ll.item_id, ll.part_id, ll.quantity, ll.returned,
                   ll.returned_date, ll.return_condition, ll.return_notes,
                   i.code AS item_code, i.description AS item_description,
                   i.status AS item_status,
                   p.item_id AS part_item_id, p.name AS part_name,
                   p.quantity AS part_quantity, p.status AS part_status
            FROM loan_lines ll
            LEFT JOIN items i ON ll.item_id = i.id
            LEFT JOIN parts p ON ll.part_id = p.id
            WHERE ll.loan_id = ANY($1)
            ORDER BY ll.id
            "#,
        )
        .bind(loan_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let item = match row.get::<Option<i32>, _>("item_id") {
                Some(id) => Some(ItemShort {
                    id,
                    code: row.get("item_code"),
                    description: row.get("item_description"),
                    status: row.get("item_status"),
                }),
                None => None,
            };
            let part = match row.get::<Option<i32>, _>("part_id") {
                Some(id) => Some(PartShort {
                    id,
                    item_id: row.get("part_item_id"),
                    name: row.get("part_name"),
                    quantity: row.get("part_quantity"),
                    status: row.get("part_status"),
                }),
                None => None,
            };

            result.push((
                row.get("loan_id"),
                LineDetails {
                    id: row.get("id"),
                    quantity: row.get("quantity"),
                    returned: row.get("returned"),
                    returned_date: row.get("returned_date"),
                    return_condition: row.get("return_condition"),
                    return_notes: row.get("return_notes"),
                    item,
                    part,
                },
            ));
        }

        Ok(result)
    }

    /// Count active loans
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE status = $1")
            .bind(LoanStatus::Active)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count overdue loans
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE status = $1 AND due_date < NOW()",
        )
        .bind(LoanStatus::Active)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

/// Sum of `quantity` over outstanding lines of active loans for one target.
///
/// Recomputed from the ledger on every call; at the dataset sizes this
/// service manages (hundreds to low thousands of loans) the scan is cheap
/// and a cache would only add staleness.
async fn outstanding_on<'e, E>(executor: E, target: LoanTarget) -> AppResult<i64>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let (column, id) = match target {
        LoanTarget::Item(id) => ("item_id", id),
        LoanTarget::Part(id) => ("part_id", id),
    };
    let sql = format!(
        r#"
        SELECT COALESCE(SUM(ll.quantity), 0)::bigint
        FROM loan_lines ll
        JOIN loans l ON ll.loan_id = l.id
        WHERE l.status = $1 AND ll.returned = FALSE AND ll.{} = $2
        "#,
        column
    );
    let outstanding: i64 = sqlx::query_scalar(&sql)
        .bind(LoanStatus::Active)
        .bind(id)
        .fetch_one(executor)
        .await?;
    Ok(outstanding)
}
