//! Loan ledger service: creation, availability, and return processing

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        catalog::AvailabilityReport,
        enums::LoanStatus,
        incident::{CreateIncident, IncidentPartRequest},
        loan::{CreateLoan, LineRequest, Loan, LoanDetails, LoanLine, LoanTarget, ProcessReturn},
        user::UserShort,
    },
    repository::Repository,
    services::incidents::IncidentsService,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    incidents: IncidentsService,
}

impl LoansService {
    pub fn new(repository: Repository, incidents: IncidentsService) -> Self {
        Self {
            repository,
            incidents,
        }
    }

    /// Create a new loan with all its lines
    pub async fn create_loan(&self, request: CreateLoan) -> AppResult<LoanDetails> {
        let requirements =
            aggregate_requirements(&request.lines).map_err(AppError::Validation)?;

        // The session may reference a staff account that no longer exists in
        // this database; reject it before touching the ledger.
        if !self.repository.users.exists(request.issued_by).await? {
            return Err(AppError::Authorization(
                "Issuing user no longer exists; the session is stale".to_string(),
            ));
        }

        let loan = self.repository.loans.create(&request, &requirements).await?;
        tracing::info!(loan_id = loan.id, lines = request.lines.len(), "loan created");

        self.get_loan(loan.id).await
    }

    /// Get a single loan with nested line details
    pub async fn get_loan(&self, loan_id: i32) -> AppResult<LoanDetails> {
        let loan = self.repository.loans.get_by_id(loan_id).await?;
        let mut details = self.assemble_details(vec![loan]).await?;
        details
            .pop()
            .ok_or_else(|| AppError::Internal(format!("Loan {} vanished during read", loan_id)))
    }

    /// List all loans with nested line details, newest first
    pub async fn list_loans(&self) -> AppResult<Vec<LoanDetails>> {
        let loans = self.repository.loans.find_all().await?;
        self.assemble_details(loans).await
    }

    /// Process a batch of return decisions for a loan.
    ///
    /// The ledger mutation is all-or-nothing. Incident reports for degraded
    /// returns are fanned out after the commit: a failure there is logged
    /// and does not undo the return.
    pub async fn process_return(
        &self,
        loan_id: i32,
        request: ProcessReturn,
    ) -> AppResult<LoanDetails> {
        if !self.repository.users.exists(request.received_by).await? {
            return Err(AppError::Authorization(
                "Receiving user no longer exists; the session is stale".to_string(),
            ));
        }

        let (loan, lines) = self
            .repository
            .loans
            .process_return(loan_id, request.received_by, &request.decisions)
            .await?;

        tracing::info!(
            loan_id = loan.id,
            returned_lines = lines.len(),
            closed = (loan.status == LoanStatus::Returned),
            "return processed"
        );

        for line in &lines {
            if let Err(e) = self.report_degraded_return(line, request.received_by).await {
                tracing::warn!(
                    loan_id,
                    line_id = line.id,
                    error = %e,
                    "failed to record incident for degraded return"
                );
            }
        }

        self.get_loan(loan_id).await
    }

    /// Availability for a single target: total stock minus outstanding
    /// reservations on active loans.
    pub async fn availability(&self, target: LoanTarget) -> AppResult<AvailabilityReport> {
        let (item_id, part_id, total) = match target {
            LoanTarget::Item(id) => {
                self.repository.catalog.get_item(id).await?;
                (Some(id), None, 1)
            }
            LoanTarget::Part(id) => {
                let part = self.repository.catalog.get_part(id).await?;
                (None, Some(id), part.quantity as i64)
            }
        };

        let outstanding = self.repository.loans.outstanding_quantity(target).await?;
        let available = total - outstanding;
        if available < 0 {
            // Ledger invariant violated; this cannot happen through the
            // sanctioned mutation paths.
            tracing::error!(
                ?target,
                total,
                outstanding,
                "negative availability: ledger integrity error"
            );
        }

        Ok(AvailabilityReport {
            item_id,
            part_id,
            total,
            outstanding,
            available,
        })
    }

    /// File an incident for a returned line whose condition is degraded
    async fn report_degraded_return(&self, line: &LoanLine, reported_by: Uuid) -> AppResult<()> {
        let condition = match line.return_condition {
            Some(c) if c.is_degraded() => c,
            _ => return Ok(()),
        };

        // Part lines are reported against their parent item.
        let (item_id, part) = match line.target() {
            Some(LoanTarget::Item(id)) => (id, None),
            Some(LoanTarget::Part(id)) => {
                let part = self.repository.catalog.get_part(id).await?;
                (part.item_id, Some((id, line.quantity)))
            }
            None => {
                return Err(AppError::Internal(format!(
                    "Loan line {} has no target",
                    line.id
                )))
            }
        };

        let incident = return_incident(
            condition,
            item_id,
            part,
            line.return_notes.as_deref(),
            reported_by,
        )
        .ok_or_else(|| {
            AppError::Internal(format!("No incident kind for condition {}", condition))
        })?;

        self.incidents.record(incident).await?;
        Ok(())
    }

    /// Join loans with their line details and staff display names
    async fn assemble_details(&self, loans: Vec<Loan>) -> AppResult<Vec<LoanDetails>> {
        let loan_ids: Vec<i32> = loans.iter().map(|l| l.id).collect();
        let mut lines_by_loan: HashMap<i32, Vec<_>> = HashMap::new();
        for (loan_id, line) in self.repository.loans.line_details(&loan_ids).await? {
            lines_by_loan.entry(loan_id).or_default().push(line);
        }

        let mut user_ids: Vec<Uuid> = loans
            .iter()
            .flat_map(|l| [Some(l.issued_by), l.received_by])
            .flatten()
            .collect();
        user_ids.sort();
        user_ids.dedup();
        let users: HashMap<Uuid, UserShort> = self
            .repository
            .users
            .get_shorts(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let now = Utc::now();
        let details = loans
            .into_iter()
            .map(|loan| LoanDetails {
                id: loan.id,
                borrower_type: loan.borrower_type,
                borrower_identifier: loan.borrower_identifier,
                borrower_name: loan.borrower_name,
                checkout_date: loan.checkout_date,
                due_date: loan.due_date,
                returned_date: loan.returned_date,
                status: loan.status,
                issued_by: users.get(&loan.issued_by).cloned(),
                received_by: loan.received_by.and_then(|id| users.get(&id).cloned()),
                is_overdue: loan.status == LoanStatus::Active && loan.due_date < now,
                lines: lines_by_loan.remove(&loan.id).unwrap_or_default(),
            })
            .collect();

        Ok(details)
    }
}

/// Validate every requested line and aggregate quantities per distinct
/// target, in lock order. Duplicate targets within one request count
/// against availability as a single combined requirement.
fn aggregate_requirements(lines: &[LineRequest]) -> Result<Vec<(LoanTarget, i64)>, String> {
    if lines.is_empty() {
        return Err("at least one line is required".to_string());
    }
    let mut requirements: BTreeMap<LoanTarget, i64> = BTreeMap::new();
    for line in lines {
        let target = line.target()?;
        *requirements.entry(target).or_insert(0) += line.quantity as i64;
    }
    Ok(requirements.into_iter().collect())
}

/// Build the incident report for a degraded return, `None` if the condition
/// does not warrant one.
fn return_incident(
    condition: crate::models::enums::ReturnCondition,
    item_id: i32,
    part: Option<(i32, i32)>,
    notes: Option<&str>,
    reported_by: Uuid,
) -> Option<CreateIncident> {
    let kind = condition.incident_kind()?;
    let description = format!(
        "Reported during loan return: {}",
        notes.unwrap_or("no additional notes")
    );
    Some(CreateIncident {
        kind,
        description,
        item_id,
        reported_by,
        // Item status is only changed by explicit reports, not on return.
        item_new_status: None,
        parts: part
            .map(|(part_id, quantity)| IncidentPartRequest {
                part_id,
                quantity: Some(quantity),
                new_status: Some(condition.as_asset_status()),
                description: Some("Degraded during the loan".to_string()),
            })
            .into_iter()
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{AssetStatus, IncidentKind, ReturnCondition};

    fn item_line(item_id: i32) -> LineRequest {
        LineRequest {
            item_id: Some(item_id),
            part_id: None,
            quantity: 1,
        }
    }

    fn part_line(part_id: i32, quantity: i32) -> LineRequest {
        LineRequest {
            item_id: None,
            part_id: Some(part_id),
            quantity,
        }
    }

    #[test]
    fn requirements_aggregate_duplicate_targets() {
        let requirements =
            aggregate_requirements(&[part_line(7, 2), item_line(3), part_line(7, 1)]).unwrap();
        assert_eq!(
            requirements,
            vec![(LoanTarget::Item(3), 1), (LoanTarget::Part(7), 3)]
        );
    }

    #[test]
    fn requirements_are_in_lock_order() {
        let requirements =
            aggregate_requirements(&[part_line(1, 1), item_line(9), item_line(2)]).unwrap();
        let targets: Vec<_> = requirements.iter().map(|(t, _)| *t).collect();
        assert_eq!(
            targets,
            vec![
                LoanTarget::Item(2),
                LoanTarget::Item(9),
                LoanTarget::Part(1)
            ]
        );
    }

    #[test]
    fn requirements_catch_double_booked_item_in_one_request() {
        // Two lines for the same item aggregate to 2, which can never fit
        // the item's stock of 1.
        let requirements = aggregate_requirements(&[item_line(3), item_line(3)]).unwrap();
        assert_eq!(requirements, vec![(LoanTarget::Item(3), 2)]);
    }

    #[test]
    fn requirements_reject_invalid_lines() {
        assert!(aggregate_requirements(&[]).is_err());
        assert!(aggregate_requirements(&[part_line(7, 0)]).is_err());
        assert!(aggregate_requirements(&[LineRequest {
            item_id: Some(1),
            part_id: Some(2),
            quantity: 1,
        }])
        .is_err());
    }

    #[test]
    fn degraded_part_return_synthesizes_incident() {
        let reporter = Uuid::new_v4();
        let incident = return_incident(
            ReturnCondition::Damaged,
            4,
            Some((9, 2)),
            Some("cracked casing"),
            reporter,
        )
        .unwrap();

        assert_eq!(incident.kind, IncidentKind::Damaged);
        assert_eq!(incident.item_id, 4);
        assert_eq!(incident.reported_by, reporter);
        assert!(incident.description.contains("cracked casing"));
        assert_eq!(incident.item_new_status, None);
        assert_eq!(incident.parts.len(), 1);
        assert_eq!(incident.parts[0].part_id, 9);
        assert_eq!(incident.parts[0].quantity, Some(2));
        assert_eq!(incident.parts[0].new_status, Some(AssetStatus::Damaged));
    }

    #[test]
    fn degraded_item_return_has_no_part_detail() {
        let incident =
            return_incident(ReturnCondition::Lost, 4, None, None, Uuid::new_v4()).unwrap();
        assert_eq!(incident.kind, IncidentKind::Lost);
        assert!(incident.parts.is_empty());
        assert!(incident.description.contains("no additional notes"));
    }

    #[test]
    fn clean_returns_do_not_synthesize_incidents() {
        assert!(return_incident(ReturnCondition::Ok, 4, None, None, Uuid::new_v4()).is_none());
        assert!(
            return_incident(ReturnCondition::Available, 4, None, None, Uuid::new_v4()).is_none()
        );
    }
}
