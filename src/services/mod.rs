pub mod activity;
pub mod dashboard;
pub mod export;
pub mod tower_service;

pub use activity::{ActivityAction, ActivityEntry, ActivityLog};
pub use dashboard::DashboardMetrics;
pub use export::ExportError;
pub use tower_service::{ServiceError, TowerService};
