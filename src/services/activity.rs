use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityAction {
    #[serde(rename = "Tower Added")]
    TowerAdded,
    #[serde(rename = "Tower Updated")]
    TowerUpdated,
    #[serde(rename = "Status Updated")]
    StatusUpdated,
    #[serde(rename = "Tower Deleted")]
    TowerDeleted,
    #[serde(rename = "Tenant Added")]
    TenantAdded,
    #[serde(rename = "Tenant Updated")]
    TenantUpdated,
    #[serde(rename = "Tenant Removed")]
    TenantRemoved,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::TowerAdded => "Tower Added",
            ActivityAction::TowerUpdated => "Tower Updated",
            ActivityAction::StatusUpdated => "Status Updated",
            ActivityAction::TowerDeleted => "Tower Deleted",
            ActivityAction::TenantAdded => "Tenant Added",
            ActivityAction::TenantUpdated => "Tenant Updated",
            ActivityAction::TenantRemoved => "Tenant Removed",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the dashboard's recent activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub action: ActivityAction,
    /// Tower code at the time of the action.
    pub tower: String,
    pub timestamp: DateTime<Utc>,
    pub user: String,
}

/// Bounded log of recent mutations, newest first.
#[derive(Debug)]
pub struct ActivityLog {
    capacity: usize,
    entries: Mutex<VecDeque<ActivityEntry>>,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub async fn record(&self, action: ActivityAction, tower: &str, user: &str) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock().await;
        entries.push_front(ActivityEntry {
            id: Uuid::new_v4(),
            action,
            tower: tower.to_string(),
            timestamp: Utc::now(),
            user: user.to_string(),
        });
        entries.truncate(self.capacity);
    }

    pub async fn recent(&self, limit: usize) -> Vec<ActivityEntry> {
        let entries = self.entries.lock().await;
        entries.iter().take(limit).cloned().collect()
    }
}
