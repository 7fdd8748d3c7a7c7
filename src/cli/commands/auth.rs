use serde_json::json;
use std::io::{BufRead, Write};

use crate::cli::client::ApiClient;
use crate::cli::config::CliState;
use crate::cli::utils::{output_json, output_success};
use crate::cli::OutputFormat;

pub async fn login(
    state: &mut CliState,
    output_format: &OutputFormat,
    username: String,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = match password.or_else(|| std::env::var("TOWERCTL_PASSWORD").ok()) {
        Some(p) => p,
        None => prompt_password()?,
    };

    let client = ApiClient::new(&state.server_url, None)?;
    let session = client.login(&username, &password).await?;

    state.token = Some(session.token);
    state.username = Some(session.user.clone());

    output_success(
        output_format,
        &format!("Logged in as {}", session.user),
        Some(json!({ "user": session.user, "expiresIn": session.expires_in })),
    )
}

pub fn logout(state: &mut CliState, output_format: &OutputFormat) -> anyhow::Result<()> {
    state.clear_session();
    output_success(output_format, "Logged out", None)
}

pub async fn whoami(state: &CliState, output_format: &OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::new(&state.server_url, state.token.clone())?;
    let me = client.whoami().await?;

    match output_format {
        OutputFormat::Json => output_json(&me)?,
        OutputFormat::Text => {
            println!("User:    {}", me["username"].as_str().unwrap_or("?"));
            println!("Server:  {}", client.base_url());
            if let Some(expires) = me["expiresAt"].as_str() {
                println!("Expires: {}", expires);
            }
        }
    }
    Ok(())
}

/// Show the configured server, or switch to a new one (which ends the session).
pub fn server(state: &mut CliState, output_format: &OutputFormat, url: Option<String>) -> anyhow::Result<()> {
    match url {
        Some(url) => {
            ApiClient::new(&url, None)?;
            if url != state.server_url {
                state.clear_session();
            }
            state.server_url = url;
            output_success(
                output_format,
                &format!("Server set to {}", state.server_url),
                Some(json!({ "server": state.server_url })),
            )
        }
        None => match output_format {
            OutputFormat::Json => output_json(&json!({ "server": state.server_url })),
            OutputFormat::Text => {
                println!("{}", state.server_url);
                Ok(())
            }
        },
    }
}

fn prompt_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        anyhow::bail!("password is required");
    }
    Ok(password)
}
