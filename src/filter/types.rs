use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::FilterError;

/// Listing parameters as sent by clients in the query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub tower_type: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(FilterError::InvalidSortOrder(other.to_string())),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tower attributes a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    TowerCode,
    Address,
    Type,
    Status,
    LastUpdated,
    InstallationDate,
    Height,
    Capacity,
}

impl SortField {
    pub const ALL: [SortField; 8] = [
        SortField::TowerCode,
        SortField::Address,
        SortField::Type,
        SortField::Status,
        SortField::LastUpdated,
        SortField::InstallationDate,
        SortField::Height,
        SortField::Capacity,
    ];

    /// Name used by clients (`sortBy=`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::TowerCode => "towerCode",
            SortField::Address => "address",
            SortField::Type => "type",
            SortField::Status => "status",
            SortField::LastUpdated => "lastUpdated",
            SortField::InstallationDate => "installationDate",
            SortField::Height => "height",
            SortField::Capacity => "capacity",
        }
    }

    /// Column in the `towers` table.
    /// User-entered text, as opposed to enum names, dates and numbers.
    pub fn is_free_text(&self) -> bool {
        matches!(self, SortField::TowerCode | SortField::Address)
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::TowerCode => "tower_code",
            SortField::Address => "address",
            SortField::Type => "tower_type",
            SortField::Status => "status",
            SortField::LastUpdated => "last_updated",
            SortField::InstallationDate => "installation_date",
            SortField::Height => "height",
            SortField::Capacity => "capacity",
        }
    }
}

impl FromStr for SortField {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(wanted) || f.column() == wanted)
            .ok_or_else(|| FilterError::InvalidSortField(wanted.to_string()))
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOrderInfo {
    pub field: SortField,
    pub sort: SortDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<String>,
}
