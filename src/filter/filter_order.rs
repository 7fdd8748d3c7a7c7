use std::cmp::Ordering;

use super::error::FilterError;
use super::types::{FilterOrderInfo, SortDirection, SortField};
use crate::model::Tower;

pub struct FilterOrder;

impl FilterOrder {
    /// Default listing order: most recently updated first.
    pub const DEFAULT: FilterOrderInfo = FilterOrderInfo {
        field: SortField::LastUpdated,
        sort: SortDirection::Desc,
    };

    pub fn parse(sort_by: Option<&str>, sort_order: Option<&str>) -> Result<FilterOrderInfo, FilterError> {
        let field = match sort_by.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => s.parse::<SortField>()?,
            None => Self::DEFAULT.field,
        };
        let sort = match sort_order.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => s.parse::<SortDirection>()?,
            None => Self::DEFAULT.sort,
        };
        Ok(FilterOrderInfo { field, sort })
    }

    /// `ORDER BY` clause. NULLs sort last in both directions and `id` breaks ties.
    /// Free-text columns order case-insensitively by code point, then by exact value.
    pub fn generate(info: &FilterOrderInfo) -> String {
        let column = info.field.column();
        let dir = info.sort.to_sql();
        if info.field.is_free_text() {
            format!(
                "ORDER BY lower(\"{column}\") COLLATE \"C\" {dir}, \"{column}\" COLLATE \"C\" {dir}, \"id\" ASC"
            )
        } else {
            format!("ORDER BY \"{column}\" {dir} NULLS LAST, \"id\" ASC")
        }
    }

    /// In-memory equivalent of [`FilterOrder::generate`].
    pub fn compare(info: &FilterOrderInfo, a: &Tower, b: &Tower) -> Ordering {
        let primary = match info.field {
            SortField::TowerCode => directed(info.sort, text_order(&a.tower_code, &b.tower_code)),
            SortField::Address => directed(info.sort, text_order(&a.address, &b.address)),
            SortField::Type => directed(info.sort, a.tower_type.as_str().cmp(b.tower_type.as_str())),
            SortField::Status => directed(info.sort, a.status.as_str().cmp(b.status.as_str())),
            SortField::LastUpdated => directed(info.sort, a.last_updated.cmp(&b.last_updated)),
            SortField::InstallationDate => nulls_last(info.sort, a.installation_date.as_ref(), b.installation_date.as_ref(), |x, y| x.cmp(y)),
            SortField::Height => nulls_last(info.sort, a.height.as_ref(), b.height.as_ref(), |x, y| x.total_cmp(y)),
            SortField::Capacity => nulls_last(info.sort, a.capacity.as_ref(), b.capacity.as_ref(), |x, y| x.cmp(y)),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

fn text_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

fn directed(sort: SortDirection, ordering: Ordering) -> Ordering {
    match sort {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn nulls_last<T>(
    sort: SortDirection,
    a: Option<&T>,
    b: Option<&T>,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => directed(sort, cmp(x, y)),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_last_updated_desc() {
        let info = FilterOrder::parse(None, None).unwrap();
        assert_eq!(info, FilterOrder::DEFAULT);
    }

    #[test]
    fn accepts_client_and_column_names() {
        let info = FilterOrder::parse(Some("towerCode"), Some("ASC")).unwrap();
        assert_eq!(info.field, SortField::TowerCode);
        assert_eq!(info.sort, SortDirection::Asc);

        let info = FilterOrder::parse(Some("tower_code"), None).unwrap();
        assert_eq!(info.field, SortField::TowerCode);
    }

    #[test]
    fn rejects_unknown_field_and_order() {
        assert_eq!(
            FilterOrder::parse(Some("id; DROP TABLE towers"), None),
            Err(FilterError::InvalidSortField("id; DROP TABLE towers".to_string()))
        );
        assert!(matches!(
            FilterOrder::parse(None, Some("sideways")),
            Err(FilterError::InvalidSortOrder(_))
        ));
    }

    #[test]
    fn generates_quoted_order_clause() {
        let info = FilterOrderInfo { field: SortField::InstallationDate, sort: SortDirection::Desc };
        assert_eq!(
            FilterOrder::generate(&info),
            "ORDER BY \"installation_date\" DESC NULLS LAST, \"id\" ASC"
        );
    }

    #[test]
    fn text_columns_sort_case_insensitively() {
        use crate::model::{Coordinates, TowerStatus, TowerType};

        let info = FilterOrderInfo { field: SortField::TowerCode, sort: SortDirection::Asc };
        assert_eq!(
            FilterOrder::generate(&info),
            "ORDER BY lower(\"tower_code\") COLLATE \"C\" ASC, \"tower_code\" COLLATE \"C\" ASC, \"id\" ASC"
        );

        let mut towers: Vec<Tower> = ["b-2", "B-1", "a-9", "A-9"]
            .into_iter()
            .map(|code| Tower {
                id: uuid::Uuid::new_v4(),
                tower_code: code.to_string(),
                address: "1 Mast Road".to_string(),
                tower_type: TowerType::Guyed,
                status: TowerStatus::Active,
                coordinates: Coordinates { latitude: 0.0, longitude: 0.0 },
                description: None,
                installation_date: None,
                height: None,
                capacity: None,
                last_updated: chrono::Utc::now(),
                tenants: vec![],
            })
            .collect();
        towers.sort_by(|a, b| FilterOrder::compare(&info, a, b));
        let codes: Vec<&str> = towers.iter().map(|t| t.tower_code.as_str()).collect();
        assert_eq!(codes, vec!["A-9", "a-9", "B-1", "b-2"]);
    }
}
