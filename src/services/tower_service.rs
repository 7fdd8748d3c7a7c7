use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::activity::{ActivityAction, ActivityLog};
use super::dashboard::{DashboardMetrics, RECENT_ACTIVITY_LIMIT};
use super::export::{towers_to_csv, ExportError};
use crate::database::{StoreError, TowerStore};
use crate::filter::TowerFilter;
use crate::model::{Tenant, Tower, TowerDetail};
use crate::types::Page;
use crate::validation::{TenantDraft, TowerDraft, ValidationErrors};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("{0}")]
    BadRequest(String),
}

/// Tower operations shared by every handler: persistence, validation and
/// the activity feed.
#[derive(Clone)]
pub struct TowerService {
    store: Arc<dyn TowerStore>,
    activity: Arc<ActivityLog>,
}

impl TowerService {
    pub fn new(store: Arc<dyn TowerStore>, activity_capacity: usize) -> Self {
        Self {
            store,
            activity: Arc::new(ActivityLog::new(activity_capacity)),
        }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn health(&self) -> Result<(), ServiceError> {
        Ok(self.store.health().await?)
    }

    pub async fn list(&self, filter: &TowerFilter) -> Result<Page<Tower>, ServiceError> {
        debug!(page = filter.page, limit = filter.limit, "Listing towers");
        Ok(self.store.list(filter).await?)
    }

    /// Match code, address or description; ordered by tower code.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<Tower>, ServiceError> {
        if query.trim().is_empty() {
            return Err(ServiceError::BadRequest("Search query is required".to_string()));
        }
        let page = self.store.list(&TowerFilter::search(query, limit)).await?;
        Ok(page.items)
    }

    pub async fn get(&self, id: Uuid) -> Result<TowerDetail, ServiceError> {
        Ok(self.store.get(id).await?.into())
    }

    pub async fn create(&self, draft: &TowerDraft, user: &str) -> Result<TowerDetail, ServiceError> {
        let tower = draft.validate_new()?;
        let tower = self.store.insert(tower).await?;
        info!(id = %tower.id, code = %tower.tower_code, "Tower created");
        self.activity.record(ActivityAction::TowerAdded, &tower.tower_code, user).await;
        Ok(tower.into())
    }

    /// Merge the present fields of `draft` into the stored tower.
    pub async fn update(&self, id: Uuid, draft: &TowerDraft, user: &str) -> Result<TowerDetail, ServiceError> {
        let before = self.store.get(id).await?;
        let mut next = before.clone();
        draft.apply_to(&mut next)?;
        next.touch();

        let action = if is_status_only_change(&before, &next) {
            ActivityAction::StatusUpdated
        } else {
            ActivityAction::TowerUpdated
        };

        let tower = self.store.replace(next).await?;
        info!(id = %tower.id, action = %action, "Tower updated");
        self.activity.record(action, &tower.tower_code, user).await;
        Ok(tower.into())
    }

    pub async fn delete(&self, id: Uuid, user: &str) -> Result<(), ServiceError> {
        let removed = self.store.delete(id).await?;
        info!(id = %removed.id, code = %removed.tower_code, "Tower deleted");
        self.activity.record(ActivityAction::TowerDeleted, &removed.tower_code, user).await;
        Ok(())
    }

    /// Delete every listed tower that exists. Unknown ids are skipped.
    pub async fn delete_many(&self, ids: &[Uuid], user: &str) -> Result<u64, ServiceError> {
        if ids.is_empty() {
            return Err(ServiceError::BadRequest("No tower ids given".to_string()));
        }
        let doomed = self.store.by_ids(ids).await?;
        let deleted = self.store.delete_many(ids).await?;
        for tower in &doomed {
            self.activity.record(ActivityAction::TowerDeleted, &tower.tower_code, user).await;
        }
        info!(requested = ids.len(), deleted, "Bulk tower delete");
        Ok(deleted)
    }

    /// CSV for the given towers, or for every tower when `ids` is `None`.
    pub async fn export(&self, ids: Option<&[Uuid]>) -> Result<Vec<u8>, ServiceError> {
        let mut towers = match ids {
            Some([]) => return Err(ServiceError::BadRequest("No tower ids given".to_string())),
            Some(ids) => self.store.by_ids(ids).await?,
            None => self.store.all().await?,
        };
        towers.sort_by(|a, b| a.tower_code.cmp(&b.tower_code));
        debug!(count = towers.len(), "Exporting towers");
        Ok(towers_to_csv(&towers)?)
    }

    pub async fn tenants(&self, tower_id: Uuid) -> Result<Vec<Tenant>, ServiceError> {
        Ok(self.store.get(tower_id).await?.tenants)
    }

    pub async fn add_tenant(&self, tower_id: Uuid, draft: &TenantDraft, user: &str) -> Result<Tenant, ServiceError> {
        let tenant = draft.validate()?;
        let tower = self.store.add_tenant(tower_id, tenant.clone()).await?;
        self.activity.record(ActivityAction::TenantAdded, &tower.tower_code, user).await;
        Ok(tenant)
    }

    /// Replace a tenant contract wholesale; the tenant keeps its id.
    pub async fn update_tenant(
        &self,
        tower_id: Uuid,
        tenant_id: Uuid,
        draft: &TenantDraft,
        user: &str,
    ) -> Result<Tenant, ServiceError> {
        let tenant = Tenant {
            id: tenant_id,
            ..draft.validate()?
        };
        let tower = self.store.update_tenant(tower_id, tenant.clone()).await?;
        self.activity.record(ActivityAction::TenantUpdated, &tower.tower_code, user).await;
        Ok(tenant)
    }

    pub async fn remove_tenant(&self, tower_id: Uuid, tenant_id: Uuid, user: &str) -> Result<(), ServiceError> {
        let tower = self.store.remove_tenant(tower_id, tenant_id).await?;
        self.activity.record(ActivityAction::TenantRemoved, &tower.tower_code, user).await;
        Ok(())
    }

    pub async fn dashboard(&self) -> Result<DashboardMetrics, ServiceError> {
        let towers = self.store.all().await?;
        let recent = self.activity.recent(RECENT_ACTIVITY_LIMIT).await;
        Ok(DashboardMetrics::compute(&towers, recent))
    }
}

fn is_status_only_change(before: &Tower, after: &Tower) -> bool {
    if before.status == after.status {
        return false;
    }
    let mut rest = after.clone();
    rest.status = before.status;
    rest.last_updated = before.last_updated;
    &rest == before
}
