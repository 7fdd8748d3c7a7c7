use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenantType {
    Carrier,
    Broadcaster,
    #[serde(rename = "Emergency Services")]
    EmergencyServices,
}

impl TenantType {
    pub const ALL: [TenantType; 3] = [
        TenantType::Carrier,
        TenantType::Broadcaster,
        TenantType::EmergencyServices,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TenantType::Carrier => "Carrier",
            TenantType::Broadcaster => "Broadcaster",
            TenantType::EmergencyServices => "Emergency Services",
        }
    }
}

impl FromStr for TenantType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "tenant type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for TenantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contractual occupant of a tower.
///
/// Contract dates are stored as given; nothing requires `contract_start`
/// to precede `contract_end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub tenant_type: TenantType,
    pub contract_start: NaiveDate,
    pub contract_end: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_revenue: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emergency_services_uses_display_name() {
        let json = serde_json::to_value(TenantType::EmergencyServices).unwrap();
        assert_eq!(json, "Emergency Services");
        assert_eq!(
            "emergency services".parse::<TenantType>().unwrap(),
            TenantType::EmergencyServices
        );
    }

    #[test]
    fn deserializes_tenant_from_client_shape() {
        let tenant: Tenant = serde_json::from_value(serde_json::json!({
            "id": "7b0c3c5e-8f0e-4d55-9a39-3f5a3c7e2b11",
            "name": "Verizon Wireless",
            "type": "Carrier",
            "contractStart": "2023-07-01",
            "contractEnd": "2028-06-30",
            "monthlyRevenue": 12500
        }))
        .unwrap();

        assert_eq!(tenant.tenant_type, TenantType::Carrier);
        assert_eq!(tenant.monthly_revenue, Decimal::from(12500));
        assert_eq!(tenant.contract_start, NaiveDate::from_ymd_opt(2023, 7, 1).unwrap());
    }
}
