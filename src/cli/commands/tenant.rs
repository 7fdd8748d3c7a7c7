use clap::Subcommand;
use serde_json::json;

use super::parse_uuid;
use crate::cli::client::ApiClient;
use crate::cli::config::CliState;
use crate::cli::utils::{output_json, output_success, print_tenants, read_json_stdin};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "List tenant contracts on a tower")]
    List {
        #[arg(help = "Tower ID")]
        tower: String,
    },

    #[command(about = "Add a tenant contract from stdin")]
    Add {
        #[arg(help = "Tower ID")]
        tower: String,
    },

    #[command(about = "Replace a tenant contract from stdin")]
    Update {
        #[arg(help = "Tower ID")]
        tower: String,
        #[arg(help = "Tenant ID")]
        tenant: String,
    },

    #[command(about = "Remove a tenant contract")]
    Remove {
        #[arg(help = "Tower ID")]
        tower: String,
        #[arg(help = "Tenant ID")]
        tenant: String,
    },
}

pub async fn handle(cmd: TenantCommands, state: &CliState, output_format: &OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::new(&state.server_url, state.token.clone())?;

    match cmd {
        TenantCommands::List { tower } => {
            let tenants = client.tenants(parse_uuid(&tower)?).await?;
            match output_format {
                OutputFormat::Json => output_json(&tenants),
                OutputFormat::Text => {
                    if tenants.is_empty() {
                        println!("No tenants");
                    } else {
                        print_tenants(&tenants);
                    }
                    Ok(())
                }
            }
        }
        TenantCommands::Add { tower } => {
            let tower_id = parse_uuid(&tower)?;
            let tenant = client.add_tenant(tower_id, &read_json_stdin()?).await?;
            output_success(
                output_format,
                &format!("Added tenant {} ({})", tenant.name, tenant.id),
                Some(serde_json::to_value(&tenant)?),
            )
        }
        TenantCommands::Update { tower, tenant } => {
            let tower_id = parse_uuid(&tower)?;
            let tenant_id = parse_uuid(&tenant)?;
            let tenant = client.update_tenant(tower_id, tenant_id, &read_json_stdin()?).await?;
            output_success(
                output_format,
                &format!("Updated tenant {}", tenant.name),
                Some(serde_json::to_value(&tenant)?),
            )
        }
        TenantCommands::Remove { tower, tenant } => {
            let tower_id = parse_uuid(&tower)?;
            let tenant_id = parse_uuid(&tenant)?;
            client.remove_tenant(tower_id, tenant_id).await?;
            output_success(
                output_format,
                &format!("Removed tenant {}", tenant_id),
                Some(json!({ "tower": tower_id, "tenant": tenant_id })),
            )
        }
    }
}
