//! Catalog read service
//!
//! Catalog CRUD lives in the surrounding application; the ledger server only
//! exposes read access with computed availability.

use crate::{
    error::AppResult,
    models::{
        catalog::{Item, ItemDetails, PartAvailability},
        loan::LoanTarget,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all items
    pub async fn list_items(&self) -> AppResult<Vec<Item>> {
        self.repository.catalog.list_items().await
    }

    /// Get an item with its parts and computed availability
    pub async fn get_item(&self, id: i32) -> AppResult<ItemDetails> {
        let item = self.repository.catalog.get_item(id).await?;
        let outstanding = self
            .repository
            .loans
            .outstanding_quantity(LoanTarget::Item(id))
            .await?;

        let mut parts = Vec::new();
        for part in self.repository.catalog.list_parts(id).await? {
            let part_outstanding = self
                .repository
                .loans
                .outstanding_quantity(LoanTarget::Part(part.id))
                .await?;
            parts.push(PartAvailability {
                available: part.quantity as i64 - part_outstanding,
                part,
            });
        }

        Ok(ItemDetails {
            available: 1 - outstanding,
            item,
            parts,
        })
    }

    /// Get a part with computed availability
    pub async fn get_part(&self, id: i32) -> AppResult<PartAvailability> {
        let part = self.repository.catalog.get_part(id).await?;
        let outstanding = self
            .repository
            .loans
            .outstanding_quantity(LoanTarget::Part(id))
            .await?;
        Ok(PartAvailability {
            available: part.quantity as i64 - outstanding,
            part,
        })
    }
}
