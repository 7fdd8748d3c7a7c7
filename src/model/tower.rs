use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::tenant::Tenant;
use super::UnknownVariant;

/// Structural type of a tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerType {
    Monopole,
    Lattice,
    Guyed,
    Stealth,
}

impl TowerType {
    pub const ALL: [TowerType; 4] = [
        TowerType::Monopole,
        TowerType::Lattice,
        TowerType::Guyed,
        TowerType::Stealth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TowerType::Monopole => "Monopole",
            TowerType::Lattice => "Lattice",
            TowerType::Guyed => "Guyed",
            TowerType::Stealth => "Stealth",
        }
    }
}

impl FromStr for TowerType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "tower type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for TowerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operational status of a tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerStatus {
    Active,
    Inactive,
    Maintenance,
    Planned,
}

impl TowerStatus {
    pub const ALL: [TowerStatus; 4] = [
        TowerStatus::Active,
        TowerStatus::Inactive,
        TowerStatus::Maintenance,
        TowerStatus::Planned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TowerStatus::Active => "Active",
            TowerStatus::Inactive => "Inactive",
            TowerStatus::Maintenance => "Maintenance",
            TowerStatus::Planned => "Planned",
        }
    }
}

impl FromStr for TowerStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "tower status",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for TowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A managed tower record, including its tenant contracts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tower {
    pub id: Uuid,
    pub tower_code: String,
    pub address: String,
    #[serde(rename = "type")]
    pub tower_type: TowerType,
    pub status: TowerStatus,
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installation_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub tenants: Vec<Tenant>,
}

impl Tower {
    /// Sum of the monthly revenue of every tenant on this tower.
    pub fn total_monthly_revenue(&self) -> Decimal {
        self.tenants.iter().map(|t| t.monthly_revenue).sum()
    }

    /// Advance `last_updated` to now; it moves forward even on a coarse clock.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.last_updated = if now > self.last_updated {
            now
        } else {
            self.last_updated + chrono::Duration::microseconds(1)
        };
    }

    pub fn tenant_mut(&mut self, tenant_id: Uuid) -> Option<&mut Tenant> {
        self.tenants.iter_mut().find(|t| t.id == tenant_id)
    }
}

/// Tower as returned by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TowerDetail {
    #[serde(flatten)]
    pub tower: Tower,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_monthly_revenue: Decimal,
}

impl From<Tower> for TowerDetail {
    fn from(tower: Tower) -> Self {
        let total_monthly_revenue = tower.total_monthly_revenue();
        Self {
            tower,
            total_monthly_revenue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TenantType;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn tower_with_revenues(revenues: &[&str]) -> Tower {
        let tenants = revenues
            .iter()
            .enumerate()
            .map(|(i, r)| Tenant {
                id: Uuid::new_v4(),
                name: format!("tenant-{i}"),
                tenant_type: TenantType::Carrier,
                contract_start: NaiveDate::from_ymd_opt(2023, 7, 1).unwrap(),
                contract_end: NaiveDate::from_ymd_opt(2028, 6, 30).unwrap(),
                monthly_revenue: dec(r),
            })
            .collect();

        Tower {
            id: Uuid::new_v4(),
            tower_code: "TWR-2024-001".to_string(),
            address: "123 Tower Street".to_string(),
            tower_type: TowerType::Monopole,
            status: TowerStatus::Active,
            coordinates: Coordinates {
                latitude: 40.7128,
                longitude: -74.006,
            },
            description: None,
            installation_date: None,
            height: Some(150.0),
            capacity: Some(12),
            last_updated: Utc::now(),
            tenants,
        }
    }

    #[test]
    fn revenue_total_sums_tenants() {
        let tower = tower_with_revenues(&["12500", "11800", "3200.50"]);
        assert_eq!(tower.total_monthly_revenue(), dec("27500.50"));
    }

    #[test]
    fn revenue_total_is_zero_without_tenants() {
        let tower = tower_with_revenues(&[]);
        assert_eq!(tower.total_monthly_revenue(), Decimal::ZERO);
    }

    #[test]
    fn serializes_with_camel_case_and_display_names() {
        let tower = tower_with_revenues(&["100"]);
        let value = serde_json::to_value(&tower).unwrap();
        assert_eq!(value["towerCode"], "TWR-2024-001");
        assert_eq!(value["type"], "Monopole");
        assert_eq!(value["status"], "Active");
        assert_eq!(value["coordinates"]["latitude"], 40.7128);
        assert!(value.get("description").is_none());
        assert_eq!(value["tenants"][0]["type"], "Carrier");
        assert_eq!(value["tenants"][0]["monthlyRevenue"], 100.0);
    }

    #[test]
    fn detail_flattens_tower_and_adds_total() {
        let detail = TowerDetail::from(tower_with_revenues(&["10", "5"]));
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["towerCode"], "TWR-2024-001");
        assert_eq!(value["totalMonthlyRevenue"], 15.0);
    }

    #[test]
    fn parses_variants_case_insensitively() {
        assert_eq!("guyed".parse::<TowerType>().unwrap(), TowerType::Guyed);
        assert_eq!(" Planned ".parse::<TowerStatus>().unwrap(), TowerStatus::Planned);
        let err = "Tripod".parse::<TowerType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown tower type 'Tripod'");
    }
}
