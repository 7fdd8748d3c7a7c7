use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::filter::{SortDirection, SortField};

/// Client-side view state of the tower list: paging, ordering, filters and
/// the set of selected towers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListState {
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub sort_order: SortDirection,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub tower_type: Option<String>,
    pub selected: BTreeSet<Uuid>,
    /// Ids shown by the last `list`, used by `select --all`.
    pub visible: Vec<Uuid>,
    /// Total reported by the last `list`.
    pub total: u64,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            sort_by: SortField::LastUpdated,
            sort_order: SortDirection::Desc,
            status: None,
            tower_type: None,
            selected: BTreeSet::new(),
            visible: Vec::new(),
            total: 0,
        }
    }
}

impl ListState {
    /// Re-selecting the current ascending field flips to descending; any
    /// other choice sorts ascending. Paging restarts either way.
    pub fn sort_by(&mut self, field: SortField) {
        self.sort_order = if self.sort_by == field && self.sort_order == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.sort_by = field;
        self.page = 1;
    }

    /// Flip selection of one tower; returns whether it is now selected.
    pub fn toggle(&mut self, id: Uuid) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// Header checkbox: when every listed row is already selected the
    /// selection is cleared, otherwise it becomes exactly the listed rows.
    /// Returns whether the rows are now selected.
    pub fn toggle_all(&mut self, ids: &[Uuid]) -> bool {
        let all_selected = !ids.is_empty() && ids.iter().all(|id| self.selected.contains(id));
        if all_selected {
            self.selected.clear();
        } else {
            self.selected = ids.iter().copied().collect();
        }
        !all_selected
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &Uuid) -> bool {
        self.selected.contains(id)
    }

    pub fn total_pages(&self, total: u64) -> u32 {
        if self.limit == 0 {
            return 1;
        }
        let pages = total.div_ceil(u64::from(self.limit)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Advance one page unless already on the last one.
    pub fn next_page(&mut self, total: u64) -> bool {
        if self.page < self.total_pages(total) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn go_to(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn set_filters(&mut self, status: Option<String>, tower_type: Option<String>) {
        if status != self.status || tower_type != self.tower_type {
            self.page = 1;
        }
        self.status = status;
        self.tower_type = tower_type;
    }

    /// Query string pairs for `GET /api/towers`.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("sortBy", self.sort_by.as_str().to_string()),
            ("sortOrder", self.sort_order.as_str().to_string()),
        ];
        if let Some(status) = &self.status {
            query.push(("status", status.clone()));
        }
        if let Some(tower_type) = &self.tower_type {
            query.push(("type", tower_type.clone()));
        }
        query
    }
}
