//! Submission validation for tower and tenant payloads.
//!
//! Drafts accept every field as optional so that all problems can be
//! reported together, keyed by the JSON path of the offending field.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::model::{Coordinates, Tenant, TenantType, Tower, TowerStatus, TowerType};

#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("validation failed for {} field(s)", .fields.len())]
pub struct ValidationErrors {
    pub fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    fn nest(&mut self, prefix: &str, other: ValidationErrors) {
        for (field, message) in other.fields {
            self.add(format!("{prefix}.{field}"), message);
        }
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.fields.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoordinatesDraft {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Revenue is stored as `NUMERIC(14, 2)`; both stores accept the same range.
const REVENUE_SCALE: u32 = 2;
const REVENUE_LIMIT: i64 = 1_000_000_000_000;

/// Tower payload for create (POST) and update (PUT).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TowerDraft {
    pub tower_code: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "type")]
    pub tower_type: Option<String>,
    pub status: Option<String>,
    pub coordinates: Option<CoordinatesDraft>,
    pub description: Option<String>,
    pub installation_date: Option<String>,
    pub height: Option<f64>,
    /// Any JSON number; only whole numbers pass validation.
    pub capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tenants: Vec<TenantDraft>,
}

/// Tenant contract payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantDraft {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub tenant_type: Option<String>,
    pub contract_start: Option<String>,
    pub contract_end: Option<String>,
    pub monthly_revenue: Option<Decimal>,
}

impl TowerDraft {
    /// Validate a complete submission and build a new tower from it.
    pub fn validate_new(&self) -> Result<Tower, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let tower_code = required_text(&mut errors, "towerCode", &self.tower_code, "Tower code is required");
        let address = required_text(&mut errors, "address", &self.address, "Address is required");
        let tower_type = required_variant::<TowerType>(&mut errors, "type", &self.tower_type, "Type is required");
        let status = required_variant::<TowerStatus>(&mut errors, "status", &self.status, "Status is required");

        let coordinates = self.coordinates.clone().unwrap_or_default();
        let latitude = match coordinates.latitude {
            Some(lat) => check_latitude(&mut errors, lat),
            None => {
                errors.add("coordinates.latitude", "Latitude is required");
                None
            }
        };
        let longitude = match coordinates.longitude {
            Some(lon) => check_longitude(&mut errors, lon),
            None => {
                errors.add("coordinates.longitude", "Longitude is required");
                None
            }
        };

        let installation_date = self.checked_installation_date(&mut errors);
        let height = self.height.and_then(|h| check_positive(&mut errors, "height", h));
        let capacity = self.capacity.and_then(|c| check_capacity(&mut errors, c));

        let mut tenants = Vec::with_capacity(self.tenants.len());
        for (i, draft) in self.tenants.iter().enumerate() {
            match draft.validate() {
                Ok(tenant) => tenants.push(tenant),
                Err(e) => errors.nest(&format!("tenants[{i}]"), e),
            }
        }

        match (tower_code, address, tower_type, status, latitude, longitude) {
            (Some(tower_code), Some(address), Some(tower_type), Some(status), Some(latitude), Some(longitude))
                if errors.fields.is_empty() =>
            {
                Ok(Tower {
                    id: Uuid::new_v4(),
                    tower_code,
                    address,
                    tower_type,
                    status,
                    coordinates: Coordinates { latitude, longitude },
                    description: optional_text(&self.description),
                    installation_date,
                    height,
                    capacity,
                    last_updated: Utc::now(),
                    tenants,
                })
            }
            _ => Err(errors),
        }
    }

    /// Merge the fields present in this draft into `tower`.
    ///
    /// Present fields follow the same rules as [`TowerDraft::validate_new`];
    /// absent fields keep their current value. Nothing is written unless
    /// every present field is valid. Tenants are managed separately and are
    /// ignored here.
    pub fn apply_to(&self, tower: &mut Tower) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let mut next = tower.clone();

        if self.tower_code.is_some() {
            if let Some(code) = required_text(&mut errors, "towerCode", &self.tower_code, "Tower code is required") {
                next.tower_code = code;
            }
        }
        if self.address.is_some() {
            if let Some(address) = required_text(&mut errors, "address", &self.address, "Address is required") {
                next.address = address;
            }
        }
        if self.tower_type.is_some() {
            if let Some(t) = required_variant::<TowerType>(&mut errors, "type", &self.tower_type, "Type is required") {
                next.tower_type = t;
            }
        }
        if self.status.is_some() {
            if let Some(s) = required_variant::<TowerStatus>(&mut errors, "status", &self.status, "Status is required") {
                next.status = s;
            }
        }
        if let Some(coordinates) = &self.coordinates {
            if let Some(lat) = coordinates.latitude.and_then(|lat| check_latitude(&mut errors, lat)) {
                next.coordinates.latitude = lat;
            }
            if let Some(lon) = coordinates.longitude.and_then(|lon| check_longitude(&mut errors, lon)) {
                next.coordinates.longitude = lon;
            }
        }
        if self.description.is_some() {
            next.description = optional_text(&self.description);
        }
        if self.installation_date.is_some() {
            next.installation_date = self.checked_installation_date(&mut errors);
        }
        if let Some(h) = self.height {
            next.height = check_positive(&mut errors, "height", h);
        }
        if let Some(c) = self.capacity {
            next.capacity = check_capacity(&mut errors, c);
        }

        errors.into_result(())?;
        *tower = next;
        Ok(())
    }

    fn checked_installation_date(&self, errors: &mut ValidationErrors) -> Option<NaiveDate> {
        let raw = optional_text(&self.installation_date)?;
        match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add("installationDate", "Installation date must be YYYY-MM-DD");
                None
            }
        }
    }
}

impl TenantDraft {
    /// Validate a tenant submission and build a tenant with a fresh id.
    pub fn validate(&self) -> Result<Tenant, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = required_text(&mut errors, "name", &self.name, "Tenant name is required");
        let tenant_type = required_variant::<TenantType>(&mut errors, "type", &self.tenant_type, "Tenant type is required");
        let contract_start = required_date(&mut errors, "contractStart", &self.contract_start, "Contract start is required");
        let contract_end = required_date(&mut errors, "contractEnd", &self.contract_end, "Contract end is required");
        let monthly_revenue = match self.monthly_revenue {
            Some(r) if r.is_sign_negative() && !r.is_zero() => {
                errors.add("monthlyRevenue", "Monthly revenue cannot be negative");
                None
            }
            Some(r) if r.normalize().scale() > REVENUE_SCALE => {
                errors.add("monthlyRevenue", "Monthly revenue must have at most 2 decimal places");
                None
            }
            Some(r) if r >= Decimal::from(REVENUE_LIMIT) => {
                errors.add("monthlyRevenue", "Monthly revenue must be below 1000000000000");
                None
            }
            Some(r) => Some(r.normalize()),
            None => {
                errors.add("monthlyRevenue", "Monthly revenue is required");
                None
            }
        };

        match (name, tenant_type, contract_start, contract_end, monthly_revenue) {
            (Some(name), Some(tenant_type), Some(contract_start), Some(contract_end), Some(monthly_revenue)) => {
                Ok(Tenant {
                    id: Uuid::new_v4(),
                    name,
                    tenant_type,
                    contract_start,
                    contract_end,
                    monthly_revenue,
                })
            }
            _ => Err(errors),
        }
    }
}

fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: &Option<String>,
    message: &str,
) -> Option<String> {
    let text = optional_text(value);
    if text.is_none() {
        errors.add(field, message);
    }
    text
}

fn required_variant<T>(
    errors: &mut ValidationErrors,
    field: &str,
    value: &Option<String>,
    message: &str,
) -> Option<T>
where
    T: std::str::FromStr<Err = crate::model::UnknownVariant>,
{
    let raw = match optional_text(value) {
        Some(raw) => raw,
        None => {
            errors.add(field, message);
            return None;
        }
    };
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(e) => {
            errors.add(field, e.to_string());
            None
        }
    }
}

fn required_date(
    errors: &mut ValidationErrors,
    field: &str,
    value: &Option<String>,
    message: &str,
) -> Option<NaiveDate> {
    let raw = match optional_text(value) {
        Some(raw) => raw,
        None => {
            errors.add(field, message);
            return None;
        }
    };
    match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "Date must be YYYY-MM-DD");
            None
        }
    }
}

fn check_latitude(errors: &mut ValidationErrors, lat: f64) -> Option<f64> {
    if lat.is_finite() && (-90.0..=90.0).contains(&lat) {
        Some(lat)
    } else {
        errors.add("coordinates.latitude", "Latitude must be between -90 and 90");
        None
    }
}

fn check_longitude(errors: &mut ValidationErrors, lon: f64) -> Option<f64> {
    if lon.is_finite() && (-180.0..=180.0).contains(&lon) {
        Some(lon)
    } else {
        errors.add("coordinates.longitude", "Longitude must be between -180 and 180");
        None
    }
}

fn check_positive(errors: &mut ValidationErrors, field: &str, value: f64) -> Option<f64> {
    if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        errors.add(field, format!("{field} must be a positive number"));
        None
    }
}

fn check_capacity(errors: &mut ValidationErrors, value: f64) -> Option<i32> {
    let value = check_positive(errors, "capacity", value)?;
    if value.fract() != 0.0 || value > f64::from(i32::MAX) {
        errors.add("capacity", "capacity must be a whole number");
        return None;
    }
    Some(value as i32)
}
