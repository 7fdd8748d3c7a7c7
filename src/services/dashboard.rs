use rust_decimal::Decimal;
use serde::Serialize;

use super::activity::ActivityEntry;
use crate::model::{Tower, TowerStatus, TowerType};

/// Number of activity entries shown on the dashboard.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub name: &'static str,
    pub value: u64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdowns {
    #[serde(rename = "type")]
    pub by_type: Vec<Slice>,
    pub status: Vec<Slice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_towers: u64,
    pub active_towers: u64,
    pub maintenance_due: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_revenue: Decimal,
    pub towers_by: Breakdowns,
    pub recent_activity: Vec<ActivityEntry>,
}

fn type_color(t: TowerType) -> &'static str {
    match t {
        TowerType::Monopole => "#3B82F6",
        TowerType::Lattice => "#10B981",
        TowerType::Guyed => "#F59E0B",
        TowerType::Stealth => "#8B5CF6",
    }
}

fn status_color(s: TowerStatus) -> &'static str {
    match s {
        TowerStatus::Active => "#10B981",
        TowerStatus::Maintenance => "#F59E0B",
        TowerStatus::Inactive => "#EF4444",
        TowerStatus::Planned => "#6B7280",
    }
}

impl DashboardMetrics {
    pub fn compute(towers: &[Tower], recent_activity: Vec<ActivityEntry>) -> Self {
        let count_status = |status: TowerStatus| towers.iter().filter(|t| t.status == status).count() as u64;

        let by_type = TowerType::ALL
            .into_iter()
            .map(|t| Slice {
                name: t.as_str(),
                value: towers.iter().filter(|x| x.tower_type == t).count() as u64,
                color: type_color(t),
            })
            .collect();

        let status = TowerStatus::ALL
            .into_iter()
            .map(|s| Slice {
                name: s.as_str(),
                value: count_status(s),
                color: status_color(s),
            })
            .collect();

        Self {
            total_towers: towers.len() as u64,
            active_towers: count_status(TowerStatus::Active),
            maintenance_due: count_status(TowerStatus::Maintenance),
            monthly_revenue: towers.iter().map(Tower::total_monthly_revenue).sum(),
            towers_by: Breakdowns { by_type, status },
            recent_activity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinates, Tenant, TenantType};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn tower(tower_type: TowerType, status: TowerStatus, revenue: &[i64]) -> Tower {
        Tower {
            id: Uuid::new_v4(),
            tower_code: format!("TWR-{}", Uuid::new_v4().simple()),
            address: "Somewhere".to_string(),
            tower_type,
            status,
            coordinates: Coordinates { latitude: 0.0, longitude: 0.0 },
            description: None,
            installation_date: None,
            height: None,
            capacity: None,
            last_updated: Utc::now(),
            tenants: revenue
                .iter()
                .map(|r| Tenant {
                    id: Uuid::new_v4(),
                    name: "Carrier Co".to_string(),
                    tenant_type: TenantType::Carrier,
                    contract_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    contract_end: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                    monthly_revenue: Decimal::from(*r),
                })
                .collect(),
        }
    }

    #[test]
    fn empty_fleet_lists_every_variant_with_zero() {
        let metrics = DashboardMetrics::compute(&[], vec![]);
        assert_eq!(metrics.total_towers, 0);
        assert_eq!(metrics.monthly_revenue, Decimal::ZERO);
        assert_eq!(metrics.towers_by.by_type.len(), 4);
        assert_eq!(metrics.towers_by.status.len(), 4);
        assert!(metrics.towers_by.status.iter().all(|s| s.value == 0));
    }

    #[test]
    fn counts_and_sums() {
        let towers = vec![
            tower(TowerType::Monopole, TowerStatus::Active, &[1000, 250]),
            tower(TowerType::Monopole, TowerStatus::Maintenance, &[500]),
            tower(TowerType::Stealth, TowerStatus::Active, &[]),
        ];
        let metrics = DashboardMetrics::compute(&towers, vec![]);

        assert_eq!(metrics.total_towers, 3);
        assert_eq!(metrics.active_towers, 2);
        assert_eq!(metrics.maintenance_due, 1);
        assert_eq!(metrics.monthly_revenue, Decimal::from(1750));

        let monopole = &metrics.towers_by.by_type[0];
        assert_eq!((monopole.name, monopole.value, monopole.color), ("Monopole", 2, "#3B82F6"));

        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["monthlyRevenue"], 1750.0);
        assert_eq!(json["towersBy"]["type"][3]["name"], "Stealth");
    }
}
