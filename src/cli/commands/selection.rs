use serde_json::json;
use uuid::Uuid;

use super::parse_uuid;
use crate::cli::client::ApiClient;
use crate::cli::config::CliState;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

/// `select ID...` toggles each id; `--all` toggles the last listed page
/// as a whole; `--clear` empties the selection.
pub fn select(
    state: &mut CliState,
    output_format: &OutputFormat,
    ids: Vec<String>,
    all: bool,
    clear: bool,
) -> anyhow::Result<()> {
    if clear {
        state.list.clear_selection();
    }
    if all {
        if state.list.visible.is_empty() {
            anyhow::bail!("nothing listed yet; run `towerctl list` first");
        }
        let visible = state.list.visible.clone();
        state.list.toggle_all(&visible);
    }
    for raw in &ids {
        state.list.toggle(parse_uuid(raw)?);
    }

    let selected: Vec<Uuid> = state.list.selected.iter().copied().collect();
    output_success(
        output_format,
        &format!("{} tower(s) selected", selected.len()),
        Some(json!({ "selected": selected })),
    )
}

pub async fn delete_selected(state: &mut CliState, output_format: &OutputFormat) -> anyhow::Result<()> {
    if state.list.selected.is_empty() {
        anyhow::bail!("no towers selected; use `towerctl select`");
    }
    let ids: Vec<Uuid> = state.list.selected.iter().copied().collect();

    let client = ApiClient::new(&state.server_url, state.token.clone())?;
    let deleted = client.bulk_delete(&ids).await?;
    state.list.clear_selection();
    state.list.visible.retain(|id| !ids.contains(id));

    output_success(
        output_format,
        &format!("Deleted {} of {} selected tower(s)", deleted, ids.len()),
        Some(json!({ "deleted": deleted })),
    )
}
