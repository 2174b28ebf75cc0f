//! Incident reporting service

use crate::{
    error::{AppError, AppResult},
    models::incident::{CreateIncident, Incident, IncidentDetails},
    repository::Repository,
};

#[derive(Clone)]
pub struct IncidentsService {
    repository: Repository,
}

impl IncidentsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Record an incident and apply the requested status transitions.
    ///
    /// Status changes go through the catalog repository setters, the single
    /// writer path for item and part status, whether the report was filed
    /// directly or synthesized by return processing.
    pub async fn record(&self, data: CreateIncident) -> AppResult<Incident> {
        if !self.repository.users.exists(data.reported_by).await? {
            return Err(AppError::Authorization(
                "Reporting user no longer exists; the session is stale".to_string(),
            ));
        }
        // The report targets an existing item; part details are checked by
        // their foreign keys on insert.
        self.repository.catalog.get_item(data.item_id).await?;

        let incident = self.repository.incidents.create(&data).await?;
        tracing::info!(
            incident_id = incident.id,
            item_id = incident.item_id,
            kind = %incident.kind,
            "incident recorded"
        );

        if let Some(status) = data.item_new_status {
            self.repository
                .catalog
                .set_item_status(data.item_id, status)
                .await?;
        }
        for part in &data.parts {
            if let Some(status) = part.new_status {
                self.repository
                    .catalog
                    .set_part_status(part.part_id, status)
                    .await?;
            }
        }

        Ok(incident)
    }

    /// List incidents, optionally filtered by item
    pub async fn list(&self, item_id: Option<i32>) -> AppResult<Vec<IncidentDetails>> {
        self.repository.incidents.find_details(item_id).await
    }
}
