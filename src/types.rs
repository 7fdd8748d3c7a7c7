/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// One page of a listing together with the paging it was produced with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}
