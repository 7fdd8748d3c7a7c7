use serde_json::json;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::parse_uuid;
use crate::cli::client::{ApiClient, Listing};
use crate::cli::config::CliState;
use crate::cli::list_state::ListState;
use crate::cli::utils::{output_json, output_success, print_tower_detail, print_tower_table, read_json_stdin};
use crate::cli::OutputFormat;
use crate::filter::SortField;
use crate::model::{TowerStatus, TowerType};

/// Flags of `towerctl list`.
#[derive(Debug, Default, Clone)]
pub struct ListOptions {
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub next: bool,
    pub prev: bool,
    pub status: Option<String>,
    pub tower_type: Option<String>,
    pub reset: bool,
}

fn client(state: &CliState) -> anyhow::Result<ApiClient> {
    Ok(ApiClient::new(&state.server_url, state.token.clone())?)
}

/// Fold command-line flags into the persisted list state.
///
/// Every flag is checked before anything changes, so a rejected
/// invocation leaves the stored state as it was.
pub fn apply_list_options(list: &mut ListState, options: &ListOptions) -> anyhow::Result<()> {
    if options.limit == Some(0) {
        anyhow::bail!("limit must be positive");
    }
    let sort = options.sort.as_deref().map(str::parse::<SortField>).transpose()?;
    let status = filter_flag::<TowerStatus>(&options.status)?;
    let tower_type = filter_flag::<TowerType>(&options.tower_type)?;

    if options.reset {
        let selected = std::mem::take(&mut list.selected);
        *list = ListState { selected, ..ListState::default() };
    }

    if status.is_some() || tower_type.is_some() {
        let status = status.unwrap_or_else(|| list.status.clone());
        let tower_type = tower_type.unwrap_or_else(|| list.tower_type.clone());
        list.set_filters(status, tower_type);
    }

    if let Some(limit) = options.limit {
        list.limit = limit;
        list.page = 1;
    }

    if let Some(field) = sort {
        list.sort_by(field);
    }

    if let Some(page) = options.page {
        list.go_to(page);
    } else if options.next {
        let total = list.total;
        list.next_page(total);
    } else if options.prev {
        list.prev_page();
    }
    Ok(())
}

/// `None`: flag not given. `Some(None)`: blank, clears the filter.
/// `Some(Some(v))`: the canonical name of a known variant.
fn filter_flag<T>(raw: &Option<String>) -> anyhow::Result<Option<Option<String>>>
where
    T: FromStr + fmt::Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw.as_deref().map(str::trim) {
        None => Ok(None),
        Some("") => Ok(Some(None)),
        Some(value) => Ok(Some(Some(value.parse::<T>()?.to_string()))),
    }
}

pub async fn list(state: &mut CliState, output_format: &OutputFormat, options: ListOptions) -> anyhow::Result<()> {
    apply_list_options(&mut state.list, &options)?;
    let client = client(state)?;

    let mut listing = client.list(&state.list).await?;
    // Rows may have been deleted since the last look; land on the last real page.
    if listing.towers.is_empty() && listing.total > 0 && state.list.page > 1 {
        state.list.go_to(state.list.total_pages(listing.total));
        listing = client.list(&state.list).await?;
    }
    remember(&mut state.list, &listing);

    match output_format {
        OutputFormat::Json => output_json(&json!({
            "data": listing.towers,
            "total": listing.total,
            "page": listing.page,
            "limit": listing.limit,
            "sortBy": state.list.sort_by,
            "sortOrder": state.list.sort_order,
            "selected": state.list.selected,
        })),
        OutputFormat::Text => {
            if listing.towers.is_empty() {
                println!("No towers found");
            } else {
                print_tower_table(&listing.towers, Some(&state.list));
            }
            println!(
                "Page {} of {} ({} towers), sorted by {} {}, {} selected",
                listing.page,
                state.list.total_pages(listing.total),
                listing.total,
                state.list.sort_by,
                state.list.sort_order,
                state.list.selected.len()
            );
            Ok(())
        }
    }
}

fn remember(list: &mut ListState, listing: &Listing) {
    list.total = listing.total;
    // The server may cap the requested limit.
    list.limit = listing.limit.max(1);
    list.page = listing.page.max(1);
    list.visible = listing.towers.iter().map(|t| t.id).collect();
}

pub async fn show(state: &CliState, output_format: &OutputFormat, id: &str) -> anyhow::Result<()> {
    let detail = client(state)?.get(parse_uuid(id)?).await?;
    match output_format {
        OutputFormat::Json => output_json(&detail),
        OutputFormat::Text => {
            print_tower_detail(&detail);
            Ok(())
        }
    }
}

pub async fn create(state: &CliState, output_format: &OutputFormat) -> anyhow::Result<()> {
    let body = read_json_stdin()?;
    let detail = client(state)?.create(&body).await?;
    output_success(
        output_format,
        &format!("Created tower {} ({})", detail.tower.tower_code, detail.tower.id),
        Some(serde_json::to_value(&detail)?),
    )
}

pub async fn update(state: &CliState, output_format: &OutputFormat, id: &str) -> anyhow::Result<()> {
    let id = parse_uuid(id)?;
    let body = read_json_stdin()?;
    let detail = client(state)?.update(id, &body).await?;
    output_success(
        output_format,
        &format!("Updated tower {}", detail.tower.tower_code),
        Some(serde_json::to_value(&detail)?),
    )
}

pub async fn delete(state: &mut CliState, output_format: &OutputFormat, id: &str) -> anyhow::Result<()> {
    let id = parse_uuid(id)?;
    client(state)?.delete(id).await?;
    state.list.selected.remove(&id);
    output_success(output_format, &format!("Deleted tower {}", id), Some(json!({ "id": id })))
}

pub async fn search(state: &CliState, output_format: &OutputFormat, query: &str) -> anyhow::Result<()> {
    let towers = client(state)?.search(query).await?;
    match output_format {
        OutputFormat::Json => output_json(&towers),
        OutputFormat::Text => {
            if towers.is_empty() {
                println!("No towers match '{}'", query);
            } else {
                print_tower_table(&towers, None);
            }
            Ok(())
        }
    }
}

pub async fn export(
    state: &CliState,
    output_format: &OutputFormat,
    selected: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let ids: Option<Vec<_>> = if selected {
        if state.list.selected.is_empty() {
            anyhow::bail!("no towers selected; use `towerctl select`");
        }
        Some(state.list.selected.iter().copied().collect())
    } else {
        None
    };

    let csv = client(state)?.export(ids.as_deref()).await?;
    match output {
        Some(path) => {
            std::fs::write(&path, &csv)?;
            output_success(
                output_format,
                &format!("Exported {} rows to {}", csv_rows(&csv), path.display()),
                Some(json!({ "path": path, "rows": csv_rows(&csv) })),
            )
        }
        None => {
            print!("{}", String::from_utf8_lossy(&csv));
            Ok(())
        }
    }
}

fn csv_rows(csv: &[u8]) -> usize {
    csv.split(|b| *b == b'\n')
        .filter(|line| !line.is_empty())
        .count()
        .saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SortDirection;
    use uuid::Uuid;

    #[test]
    fn list_options_update_state() {
        let mut list = ListState::default();
        let options = ListOptions {
            sort: Some("towerCode".to_string()),
            status: Some("Active".to_string()),
            ..Default::default()
        };
        apply_list_options(&mut list, &options).unwrap();
        assert_eq!(list.sort_by, SortField::TowerCode);
        assert_eq!(list.sort_order, SortDirection::Asc);
        assert_eq!(list.status.as_deref(), Some("Active"));

        apply_list_options(&mut list, &ListOptions { sort: Some("towerCode".to_string()), ..Default::default() }).unwrap();
        assert_eq!(list.sort_order, SortDirection::Desc);
        assert_eq!(list.status.as_deref(), Some("Active"));

        apply_list_options(&mut list, &ListOptions { status: Some(String::new()), ..Default::default() }).unwrap();
        assert!(list.status.is_none());
    }

    #[test]
    fn next_uses_last_known_total() {
        let mut list = ListState { limit: 10, total: 15, ..Default::default() };
        apply_list_options(&mut list, &ListOptions { next: true, ..Default::default() }).unwrap();
        assert_eq!(list.page, 2);
        apply_list_options(&mut list, &ListOptions { next: true, ..Default::default() }).unwrap();
        assert_eq!(list.page, 2);
    }

    #[test]
    fn reset_keeps_selection() {
        let id = Uuid::new_v4();
        let mut list = ListState { page: 5, ..Default::default() };
        list.toggle(id);
        apply_list_options(&mut list, &ListOptions { reset: true, ..Default::default() }).unwrap();
        assert_eq!(list.page, 1);
        assert!(list.is_selected(&id));
    }

    #[test]
    fn unknown_sort_field_is_an_error() {
        let mut list = ListState::default();
        let err = apply_list_options(&mut list, &ListOptions { sort: Some("color".to_string()), ..Default::default() });
        assert!(err.is_err());
    }

    #[test]
    fn unknown_filter_leaves_state_untouched() {
        let mut list = ListState { page: 3, status: Some("Active".to_string()), ..Default::default() };
        let before = list.clone();

        let options = ListOptions { status: Some("Retird".to_string()), reset: true, ..Default::default() };
        assert!(apply_list_options(&mut list, &options).is_err());
        assert!(apply_list_options(&mut list, &ListOptions { tower_type: Some("Tripod".to_string()), ..Default::default() }).is_err());
        assert!(apply_list_options(&mut list, &ListOptions { limit: Some(0), sort: Some("height".to_string()), ..Default::default() }).is_err());
        assert_eq!(list, before);
    }

    #[test]
    fn filters_are_stored_by_canonical_name() {
        let mut list = ListState::default();
        apply_list_options(&mut list, &ListOptions { status: Some(" maintenance ".to_string()), tower_type: Some("guyed".to_string()), ..Default::default() }).unwrap();
        assert_eq!(list.status.as_deref(), Some("Maintenance"));
        assert_eq!(list.tower_type.as_deref(), Some("Guyed"));
    }

    #[test]
    fn listing_limit_replaces_requested_limit() {
        let mut list = ListState { limit: 50, ..Default::default() };
        let listing = Listing { towers: vec![], total: 5, page: 1, limit: 2 };
        remember(&mut list, &listing);
        assert_eq!(list.limit, 2);
        assert_eq!(list.total_pages(5), 3);
    }

    #[test]
    fn counts_csv_data_rows() {
        assert_eq!(csv_rows(b"id,towerCode\n1,A\n2,B\n"), 2);
        assert_eq!(csv_rows(b"id,towerCode\n"), 0);
    }
}
