use serde::Serialize;
use serde_json::{json, Value};
use std::io::Read;

use super::list_state::ListState;
use crate::cli::OutputFormat;
use crate::model::{Tenant, Tower, TowerDetail};

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(data_value) = data {
                response["data"] = data_value;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Read a JSON document from stdin.
pub fn read_json_stdin() -> anyhow::Result<Value> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    if input.trim().is_empty() {
        anyhow::bail!("expected a JSON document on stdin");
    }
    Ok(serde_json::from_str(&input)?)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

pub fn print_tower_table(towers: &[Tower], state: Option<&ListState>) {
    println!(
        "{:<3} {:<36}  {:<14} {:<9} {:<11} {:<30} {:>7}  {}",
        "", "ID", "CODE", "TYPE", "STATUS", "ADDRESS", "TENANTS", "UPDATED"
    );
    for tower in towers {
        let marker = match state {
            Some(s) if s.is_selected(&tower.id) => "[x]",
            Some(_) => "[ ]",
            None => "",
        };
        println!(
            "{:<3} {:<36}  {:<14} {:<9} {:<11} {:<30} {:>7}  {}",
            marker,
            tower.id,
            truncate(&tower.tower_code, 14),
            tower.tower_type,
            tower.status,
            truncate(&tower.address, 30),
            tower.tenants.len(),
            tower.last_updated.format("%Y-%m-%d %H:%M"),
        );
    }
}

pub fn print_tower_detail(detail: &TowerDetail) {
    let tower = &detail.tower;
    println!("{} ({})", tower.tower_code, tower.id);
    println!("  Address:      {}", tower.address);
    println!("  Type:         {}", tower.tower_type);
    println!("  Status:       {}", tower.status);
    println!(
        "  Coordinates:  {}, {}",
        tower.coordinates.latitude, tower.coordinates.longitude
    );
    if let Some(description) = &tower.description {
        println!("  Description:  {}", description);
    }
    if let Some(date) = tower.installation_date {
        println!("  Installed:    {}", date);
    }
    if let Some(height) = tower.height {
        println!("  Height:       {} m", height);
    }
    if let Some(capacity) = tower.capacity {
        println!("  Capacity:     {}", capacity);
    }
    println!("  Updated:      {}", tower.last_updated.to_rfc3339());
    println!("  Tenants:      {}", tower.tenants.len());
    print_tenants(&tower.tenants);
    println!("  Monthly revenue: {}", detail.total_monthly_revenue.round_dp(2));
}

pub fn print_tenants(tenants: &[Tenant]) {
    for tenant in tenants {
        println!(
            "    - {} [{}] {} {} to {}  {}/month",
            tenant.id,
            tenant.tenant_type,
            tenant.name,
            tenant.contract_start,
            tenant.contract_end,
            tenant.monthly_revenue.round_dp(2)
        );
    }
}
