//! Dashboard statistics service

use crate::{
    api::stats::{LoanStats, StatsResponse},
    error::AppResult,
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Loan counters for the dashboard header
    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let active = self.repository.loans.count_active().await?;
        let overdue = self.repository.loans.count_overdue().await?;

        Ok(StatsResponse {
            loans: LoanStats { active, overdue },
        })
    }
}
