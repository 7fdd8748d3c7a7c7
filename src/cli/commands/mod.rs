pub mod auth;
pub mod dashboard;
pub mod selection;
pub mod tenant;
pub mod towers;

use uuid::Uuid;

pub(crate) fn parse_uuid(raw: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| anyhow::anyhow!("'{}' is not a valid id", raw))
}
