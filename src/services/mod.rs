//! Business logic services

pub mod catalog;
pub mod incidents;
pub mod loans;
pub mod stats;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub incidents: incidents::IncidentsService,
    pub loans: loans::LoansService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        let incidents = incidents::IncidentsService::new(repository.clone());
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            stats: stats::StatsService::new(repository.clone()),
            loans: loans::LoansService::new(repository, incidents.clone()),
            incidents,
        }
    }
}
