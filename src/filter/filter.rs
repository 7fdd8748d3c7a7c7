use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::types::{FilterOrderInfo, ListParams, SqlResult};
use crate::config::ListingConfig;
use crate::model::{Tower, TowerStatus, TowerType};
use crate::types::Page;

/// Validated listing request: paging, ordering and optional narrowing.
#[derive(Debug, Clone, PartialEq)]
pub struct TowerFilter {
    pub page: u32,
    pub limit: u32,
    pub order: FilterOrderInfo,
    pub status: Option<TowerStatus>,
    pub tower_type: Option<TowerType>,
    pub search: Option<String>,
}

impl TowerFilter {
    pub fn from_params(params: &ListParams, listing: &ListingConfig) -> Result<Self, FilterError> {
        let page = params.page.unwrap_or(1);
        if page == 0 {
            return Err(FilterError::InvalidPage("Page numbers start at 1".to_string()));
        }

        let requested = params.limit.unwrap_or(listing.default_limit);
        if requested == 0 {
            return Err(FilterError::InvalidLimit("Limit must be positive".to_string()));
        }
        let limit = if requested > listing.max_limit {
            if listing.debug_logging {
                tracing::warn!("Limit {} exceeds max {}, capping to max", requested, listing.max_limit);
            }
            listing.max_limit
        } else {
            requested
        };

        let order = FilterOrder::parse(params.sort_by.as_deref(), params.sort_order.as_deref())?;

        let status = non_blank(&params.status)
            .map(|s| s.parse::<TowerStatus>())
            .transpose()
            .map_err(|e| FilterError::InvalidFilterValue(e.to_string()))?;
        let tower_type = non_blank(&params.tower_type)
            .map(|s| s.parse::<TowerType>())
            .transpose()
            .map_err(|e| FilterError::InvalidFilterValue(e.to_string()))?;

        Ok(Self {
            page,
            limit,
            order,
            status,
            tower_type,
            search: non_blank(&params.q).map(str::to_string),
        })
    }

    /// Unpaged search over code, address and description.
    pub fn search(query: &str, limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            order: FilterOrderInfo {
                field: super::types::SortField::TowerCode,
                sort: super::types::SortDirection::Asc,
            },
            status: None,
            tower_type: None,
            search: Some(query.trim().to_string()),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn matches(&self, tower: &Tower) -> bool {
        if self.status.is_some_and(|s| s != tower.status) {
            return false;
        }
        if self.tower_type.is_some_and(|t| t != tower.tower_type) {
            return false;
        }
        match &self.search {
            Some(q) => {
                let needle = q.to_lowercase();
                tower.tower_code.to_lowercase().contains(&needle)
                    || tower.address.to_lowercase().contains(&needle)
                    || tower
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }

    /// Narrow, order and slice an in-memory collection.
    pub fn apply(&self, towers: impl IntoIterator<Item = Tower>) -> Page<Tower> {
        let mut matching: Vec<Tower> = towers.into_iter().filter(|t| self.matches(t)).collect();
        matching.sort_by(|a, b| FilterOrder::compare(&self.order, a, b));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(self.offset()).unwrap_or(usize::MAX))
            .take(self.limit as usize)
            .collect();

        Page {
            items,
            total,
            page: self.page,
            limit: self.limit,
        }
    }

    /// Parameterised `WHERE` clause (without the keyword) over the `towers` table.
    pub fn to_where_sql(&self) -> SqlResult {
        let mut conditions = vec![];
        let mut params = vec![];

        if let Some(status) = self.status {
            params.push(status.as_str().to_string());
            conditions.push(format!("\"status\" = ${}", params.len()));
        }
        if let Some(tower_type) = self.tower_type {
            params.push(tower_type.as_str().to_string());
            conditions.push(format!("\"tower_type\" = ${}", params.len()));
        }
        if let Some(q) = &self.search {
            params.push(format!("%{}%", escape_like(q)));
            let n = params.len();
            conditions.push(format!(
                "(\"tower_code\" ILIKE ${n} OR \"address\" ILIKE ${n} OR \"description\" ILIKE ${n})"
            ));
        }

        let query = if conditions.is_empty() {
            "1=1".to_string()
        } else {
            conditions.join(" AND ")
        };
        SqlResult { query, params }
    }

    /// Page query selecting `columns`; tenants are hydrated separately.
    pub fn to_sql(&self, columns: &str) -> SqlResult {
        let where_result = self.to_where_sql();
        let query = format!(
            "SELECT {} FROM \"towers\" WHERE {} {} LIMIT {} OFFSET {}",
            columns,
            where_result.query,
            FilterOrder::generate(&self.order),
            self.limit,
            self.offset()
        );
        SqlResult { query, params: where_result.params }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let where_result = self.to_where_sql();
        SqlResult {
            query: format!("SELECT COUNT(*) AS count FROM \"towers\" WHERE {}", where_result.query),
            params: where_result.params,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
