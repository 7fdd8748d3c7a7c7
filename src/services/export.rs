use thiserror::Error;

use crate::model::Tower;

pub const CSV_HEADER: [&str; 14] = [
    "id",
    "towerCode",
    "address",
    "type",
    "status",
    "latitude",
    "longitude",
    "description",
    "installationDate",
    "height",
    "capacity",
    "tenantCount",
    "monthlyRevenue",
    "lastUpdated",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("Failed to flush export: {0}")]
    Flush(String),
}

/// Render towers as CSV with a header row. Absent optional values are empty cells.
pub fn towers_to_csv(towers: &[Tower]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(CSV_HEADER)?;

    for tower in towers {
        writer.write_record([
            tower.id.to_string(),
            tower.tower_code.clone(),
            tower.address.clone(),
            tower.tower_type.to_string(),
            tower.status.to_string(),
            tower.coordinates.latitude.to_string(),
            tower.coordinates.longitude.to_string(),
            tower.description.clone().unwrap_or_default(),
            tower.installation_date.map(|d| d.to_string()).unwrap_or_default(),
            tower.height.map(|h| h.to_string()).unwrap_or_default(),
            tower.capacity.map(|c| c.to_string()).unwrap_or_default(),
            tower.tenants.len().to_string(),
            tower.total_monthly_revenue().to_string(),
            tower.last_updated.to_rfc3339(),
        ])?;
    }

    writer.into_inner().map_err(|e| ExportError::Flush(e.to_string()))
}
