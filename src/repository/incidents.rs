//! Incidents repository for database operations

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::AppResult,
    models::incident::{CreateIncident, Incident, IncidentDetails, IncidentPart},
};

#[derive(Clone)]
pub struct IncidentsRepository {
    pool: Pool<Postgres>,
}

impl IncidentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create an incident with its part details atomically
    pub async fn create(&self, data: &CreateIncident) -> AppResult<Incident> {
        let mut tx = self.pool.begin().await?;

        let incident = sqlx::query_as::<_, Incident>(
            r#"
            INSERT INTO incidents (kind, description, item_id, reported_by, item_new_status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.kind)
        .bind(&data.description)
        .bind(data.item_id)
        .bind(data.reported_by)
        .bind(data.item_new_status)
        .fetch_one(&mut *tx)
        .await?;

        for part in &data.parts {
            sqlx::query(
                r#"
                INSERT INTO incident_parts (incident_id, part_id, quantity, new_status, description)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(incident.id)
            .bind(part.part_id)
            .bind(part.quantity)
            .bind(part.new_status)
            .bind(&part.description)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(incident)
    }

    /// List incidents with display snapshots, optionally filtered by item
    pub async fn find_details(&self, item_id: Option<i32>) -> AppResult<Vec<IncidentDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT n.id, n.kind, n.description, n.date, n.item_id, n.reported_by,
                   n.item_new_status, i.code AS item_code, u.name AS reported_by_name
            FROM incidents n
            LEFT JOIN items i ON n.item_id = i.id
            LEFT JOIN users u ON n.reported_by = u.id
            WHERE $1::int IS NULL OR n.item_id = $1
            ORDER BY n.date DESC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i32 = row.get("id");
            let parts = sqlx::query_as::<_, IncidentPart>(
                "SELECT * FROM incident_parts WHERE incident_id = $1 ORDER BY id",
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

            result.push(IncidentDetails {
                id,
                kind: row.get("kind"),
                description: row.get("description"),
                date: row.get("date"),
                item_id: row.get("item_id"),
                item_code: row.get("item_code"),
                reported_by: row.get("reported_by"),
                reported_by_name: row.get("reported_by_name"),
                item_new_status: row.get("item_new_status"),
                parts,
            });
        }

        Ok(result)
    }
}
