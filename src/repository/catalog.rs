//! Asset catalog repository for database operations
//!
//! Item and part status mutations all go through the setters here, so there
//! is a single writer path whether the change comes from a standalone
//! incident report or from return processing.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::catalog::{Item, Part},
    models::enums::AssetStatus,
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: Pool<Postgres>,
}

impl CatalogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all items
    pub async fn list_items(&self) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>("SELECT * FROM items ORDER BY code")
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    /// Get item by ID
    pub async fn get_item(&self, id: i32) -> AppResult<Item> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }

    /// Get part by ID
    pub async fn get_part(&self, id: i32) -> AppResult<Part> {
        sqlx::query_as::<_, Part>("SELECT * FROM parts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Part with id {} not found", id)))
    }

    /// List the parts of an item
    pub async fn list_parts(&self, item_id: i32) -> AppResult<Vec<Part>> {
        let parts = sqlx::query_as::<_, Part>(
            "SELECT * FROM parts WHERE item_id = $1 ORDER BY name",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(parts)
    }

    /// Set the status of an item
    pub async fn set_item_status(&self, id: i32, status: AssetStatus) -> AppResult<()> {
        let result = sqlx::query("UPDATE items SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Item with id {} not found", id)));
        }
        Ok(())
    }

    /// Set the status of a part
    pub async fn set_part_status(&self, id: i32, status: AssetStatus) -> AppResult<()> {
        let result = sqlx::query("UPDATE parts SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Part with id {} not found", id)));
        }
        Ok(())
    }
}
