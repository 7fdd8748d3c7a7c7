use serde_json::Value;

use crate::cli::client::ApiClient;
use crate::cli::config::CliState;
use crate::cli::utils::output_json;
use crate::cli::OutputFormat;

pub async fn metrics(state: &CliState, output_format: &OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::new(&state.server_url, state.token.clone())?;
    let metrics = client.metrics().await?;

    match output_format {
        OutputFormat::Json => output_json(&metrics),
        OutputFormat::Text => {
            println!("Total towers:     {}", metrics["totalTowers"]);
            println!("Active towers:    {}", metrics["activeTowers"]);
            println!("Maintenance due:  {}", metrics["maintenanceDue"]);
            println!("Monthly revenue:  {}", metrics["monthlyRevenue"]);
            print_breakdown("By type", &metrics["towersBy"]["type"]);
            print_breakdown("By status", &metrics["towersBy"]["status"]);

            println!("Recent activity:");
            match metrics["recentActivity"].as_array() {
                Some(entries) if !entries.is_empty() => {
                    for entry in entries {
                        println!(
                            "  {}  {:<15} {:<16} by {}",
                            entry["timestamp"].as_str().unwrap_or(""),
                            entry["action"].as_str().unwrap_or(""),
                            entry["tower"].as_str().unwrap_or(""),
                            entry["user"].as_str().unwrap_or("")
                        );
                    }
                }
                _ => println!("  (none)"),
            }
            Ok(())
        }
    }
}

fn print_breakdown(title: &str, slices: &Value) {
    println!("{}:", title);
    for slice in slices.as_array().into_iter().flatten() {
        println!(
            "  {:<12} {}",
            slice["name"].as_str().unwrap_or("?"),
            slice["value"]
        );
    }
}
