use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{StoreError, TowerStore};
use crate::filter::TowerFilter;
use crate::model::{Tenant, Tower};
use crate::types::Page;

/// Process-local store used when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    towers: RwLock<HashMap<Uuid, Tower>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn code_taken(towers: &HashMap<Uuid, Tower>, code: &str, except: Option<Uuid>) -> bool {
        towers
            .values()
            .any(|t| Some(t.id) != except && t.tower_code.eq_ignore_ascii_case(code))
    }
}

#[async_trait]
impl TowerStore for MemoryStore {
    async fn list(&self, filter: &TowerFilter) -> Result<Page<Tower>, StoreError> {
        let towers = self.towers.read().await;
        Ok(filter.apply(towers.values().cloned()))
    }

    async fn all(&self) -> Result<Vec<Tower>, StoreError> {
        let towers = self.towers.read().await;
        let mut all: Vec<Tower> = towers.values().cloned().collect();
        all.sort_by(|a, b| a.tower_code.cmp(&b.tower_code).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tower>, StoreError> {
        let towers = self.towers.read().await;
        Ok(ids.iter().filter_map(|id| towers.get(id).cloned()).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Tower, StoreError> {
        let towers = self.towers.read().await;
        towers.get(&id).cloned().ok_or_else(|| StoreError::tower_not_found(id))
    }

    async fn insert(&self, tower: Tower) -> Result<Tower, StoreError> {
        let mut towers = self.towers.write().await;
        if Self::code_taken(&towers, &tower.tower_code, None) {
            return Err(StoreError::duplicate_code(&tower.tower_code));
        }
        towers.insert(tower.id, tower.clone());
        Ok(tower)
    }

    async fn replace(&self, tower: Tower) -> Result<Tower, StoreError> {
        let mut towers = self.towers.write().await;
        if Self::code_taken(&towers, &tower.tower_code, Some(tower.id)) {
            return Err(StoreError::duplicate_code(&tower.tower_code));
        }
        let existing = towers
            .get_mut(&tower.id)
            .ok_or_else(|| StoreError::tower_not_found(tower.id))?;
        let tenants = std::mem::take(&mut existing.tenants);
        *existing = Tower { tenants, ..tower };
        Ok(existing.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<Tower, StoreError> {
        let mut towers = self.towers.write().await;
        towers.remove(&id).ok_or_else(|| StoreError::tower_not_found(id))
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, StoreError> {
        let mut towers = self.towers.write().await;
        let removed = ids.iter().filter(|id| towers.remove(*id).is_some()).count();
        Ok(removed as u64)
    }

    async fn add_tenant(&self, tower_id: Uuid, tenant: Tenant) -> Result<Tower, StoreError> {
        let mut towers = self.towers.write().await;
        let tower = towers
            .get_mut(&tower_id)
            .ok_or_else(|| StoreError::tower_not_found(tower_id))?;
        tower.tenants.push(tenant);
        tower.touch();
        Ok(tower.clone())
    }

    async fn update_tenant(&self, tower_id: Uuid, tenant: Tenant) -> Result<Tower, StoreError> {
        let mut towers = self.towers.write().await;
        let tower = towers
            .get_mut(&tower_id)
            .ok_or_else(|| StoreError::tower_not_found(tower_id))?;
        let slot = tower
            .tenant_mut(tenant.id)
            .ok_or_else(|| StoreError::tenant_not_found(tenant.id))?;
        *slot = tenant;
        tower.touch();
        Ok(tower.clone())
    }

    async fn remove_tenant(&self, tower_id: Uuid, tenant_id: Uuid) -> Result<Tower, StoreError> {
        let mut towers = self.towers.write().await;
        let tower = towers
            .get_mut(&tower_id)
            .ok_or_else(|| StoreError::tower_not_found(tower_id))?;
        let before = tower.tenants.len();
        tower.tenants.retain(|t| t.id != tenant_id);
        if tower.tenants.len() == before {
            return Err(StoreError::tenant_not_found(tenant_id));
        }
        tower.touch();
        Ok(tower.clone())
    }

    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
