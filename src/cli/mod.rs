pub mod client;
pub mod commands;
pub mod config;
pub mod list_state;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use self::client::ClientError;
use self::commands::towers::ListOptions;
use self::config::CliState;

#[derive(Parser)]
#[command(name = "towerctl")]
#[command(about = "towerctl - manage tower records and tenant contracts")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Log in and store a session token")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (reads TOWERCTL_PASSWORD or prompts if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Forget the stored session token")]
    Logout,

    #[command(about = "Show the user behind the stored token")]
    Whoami,

    #[command(about = "Show or set the API base URL")]
    Server {
        #[arg(help = "Base URL, e.g. http://localhost:8080/api")]
        url: Option<String>,
    },

    #[command(about = "List towers one page at a time")]
    List {
        #[arg(long, help = "Sort by field; repeating the current ascending field sorts descending")]
        sort: Option<String>,
        #[arg(long, help = "Jump to page")]
        page: Option<u32>,
        #[arg(long, help = "Rows per page")]
        limit: Option<u32>,
        #[arg(long, conflicts_with_all = ["prev", "page"], help = "Next page")]
        next: bool,
        #[arg(long, conflicts_with = "page", help = "Previous page")]
        prev: bool,
        #[arg(long, help = "Only this status (empty string clears)")]
        status: Option<String>,
        #[arg(long = "type", help = "Only this tower type (empty string clears)")]
        tower_type: Option<String>,
        #[arg(long, help = "Reset paging, sorting and filters")]
        reset: bool,
    },

    #[command(about = "Show one tower with tenants and revenue total")]
    Show {
        #[arg(help = "Tower ID")]
        id: String,
    },

    #[command(about = "Create a tower from JSON on stdin")]
    Create,

    #[command(about = "Update a tower from JSON on stdin (only given fields change)")]
    Update {
        #[arg(help = "Tower ID")]
        id: String,
    },

    #[command(about = "Delete a tower")]
    Delete {
        #[arg(help = "Tower ID")]
        id: String,
    },

    #[command(about = "Toggle selection of towers for bulk actions")]
    Select {
        #[arg(help = "Tower IDs to toggle")]
        ids: Vec<String>,
        #[arg(long, help = "Select every tower on the last listed page")]
        all: bool,
        #[arg(long, help = "Clear the selection")]
        clear: bool,
    },

    #[command(about = "Delete every selected tower")]
    DeleteSelected,

    #[command(about = "Search towers by code, address or description")]
    Search {
        #[arg(help = "Search text")]
        query: String,
    },

    #[command(about = "Export towers as CSV")]
    Export {
        #[arg(long, help = "Only the selected towers")]
        selected: bool,
        #[arg(short, long, help = "Write to file instead of stdout")]
        output: Option<PathBuf>,
    },

    #[command(about = "Dashboard metrics")]
    Metrics,

    #[command(about = "Tenant contract management")]
    Tenant {
        #[command(subcommand)]
        cmd: commands::tenant::TenantCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let dir = config::get_config_dir()?;
    run_in(cli, &dir).await
}

/// Run one command against the state stored in `dir`. State is saved
/// afterwards even when the command fails; a 401 also drops the token.
pub async fn run_in(cli: Cli, dir: &Path) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let mut state = CliState::load_from(dir)?;

    let result = dispatch(cli.command, &mut state, &output_format).await;

    if let Err(e) = &result {
        if matches!(e.downcast_ref::<ClientError>(), Some(ClientError::Unauthorized)) {
            state.clear_session();
        }
    }
    state.save_to(dir)?;
    result
}

async fn dispatch(command: Commands, state: &mut CliState, output_format: &OutputFormat) -> anyhow::Result<()> {
    use commands::{auth, dashboard, selection, tenant, towers};

    match command {
        Commands::Login { username, password } => auth::login(state, output_format, username, password).await,
        Commands::Logout => auth::logout(state, output_format),
        Commands::Whoami => auth::whoami(state, output_format).await,
        Commands::Server { url } => auth::server(state, output_format, url),
        Commands::List { sort, page, limit, next, prev, status, tower_type, reset } => {
            let options = ListOptions { sort, page, limit, next, prev, status, tower_type, reset };
            towers::list(state, output_format, options).await
        }
        Commands::Show { id } => towers::show(state, output_format, &id).await,
        Commands::Create => towers::create(state, output_format).await,
        Commands::Update { id } => towers::update(state, output_format, &id).await,
        Commands::Delete { id } => towers::delete(state, output_format, &id).await,
        Commands::Select { ids, all, clear } => selection::select(state, output_format, ids, all, clear),
        Commands::DeleteSelected => selection::delete_selected(state, output_format).await,
        Commands::Search { query } => towers::search(state, output_format, &query).await,
        Commands::Export { selected, output } => towers::export(state, output_format, selected, output).await,
        Commands::Metrics => dashboard::metrics(state, output_format).await,
        Commands::Tenant { cmd } => tenant::handle(cmd, state, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_list_flags() {
        let cli = Cli::try_parse_from(["towerctl", "--json", "list", "--sort", "height", "--next", "--type", "Guyed"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::List { sort, next, tower_type, .. } => {
                assert_eq!(sort.as_deref(), Some("height"));
                assert!(next);
                assert_eq!(tower_type.as_deref(), Some("Guyed"));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn next_and_prev_conflict() {
        assert!(Cli::try_parse_from(["towerctl", "list", "--next", "--prev"]).is_err());
    }
}
