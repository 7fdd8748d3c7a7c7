use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::filter::TowerFilter;
use crate::model::{Tenant, Tower};
use crate::types::Page;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    pub fn tower_not_found(id: Uuid) -> Self {
        StoreError::NotFound(format!("tower {id} not found"))
    }

    pub fn tenant_not_found(id: Uuid) -> Self {
        StoreError::NotFound(format!("tenant {id} not found"))
    }

    pub fn duplicate_code(code: &str) -> Self {
        StoreError::Conflict(format!("tower code '{code}' is already in use"))
    }
}

/// Persistence for towers and their tenant contracts.
///
/// Tower codes are unique. Every mutation of a tenant also refreshes the
/// owning tower's `last_updated`.
#[async_trait]
pub trait TowerStore: Send + Sync {
    async fn list(&self, filter: &TowerFilter) -> Result<Page<Tower>, StoreError>;

    async fn all(&self) -> Result<Vec<Tower>, StoreError>;

    async fn by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tower>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Tower, StoreError>;

    /// Insert a new tower together with any tenants it carries.
    async fn insert(&self, tower: Tower) -> Result<Tower, StoreError>;

    /// Overwrite the tower's own fields. Tenants are left untouched.
    async fn replace(&self, tower: Tower) -> Result<Tower, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<Tower, StoreError>;

    /// Delete every listed tower that exists; returns how many were removed.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, StoreError>;

    async fn add_tenant(&self, tower_id: Uuid, tenant: Tenant) -> Result<Tower, StoreError>;

    async fn update_tenant(&self, tower_id: Uuid, tenant: Tenant) -> Result<Tower, StoreError>;

    async fn remove_tenant(&self, tower_id: Uuid, tenant_id: Uuid) -> Result<Tower, StoreError>;

    async fn health(&self) -> Result<(), StoreError>;

    fn backend(&self) -> &'static str;
}
