pub mod tenant;
pub mod tower;

pub use tenant::{Tenant, TenantType};
pub use tower::{Coordinates, Tower, TowerDetail, TowerStatus, TowerType};

/// Raised when a stored or submitted string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
