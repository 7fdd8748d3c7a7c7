mod common;

use anyhow::Result;
use clap::Parser;

use common::{test_config, tower_json, TestServer, ADMIN_PASSWORD, ADMIN_USER};
use tower_admin_api::cli::client::ClientError;
use tower_admin_api::cli::config::CliState;
use tower_admin_api::cli::{run_in, Cli};

async fn towerctl(dir: &std::path::Path, args: &[&str]) -> Result<()> {
    let cli = Cli::try_parse_from(std::iter::once("towerctl").chain(args.iter().copied()))?;
    run_in(cli, dir).await
}

#[tokio::test]
async fn login_list_select_and_delete() -> Result<()> {
    let server = TestServer::spawn().await?;
    let dir = tempfile::tempdir()?;
    let api = server.api_base();

    towerctl(dir.path(), &["--json", "server", &api]).await?;
    towerctl(dir.path(), &["--json", "login", ADMIN_USER, "--password", ADMIN_PASSWORD]).await?;

    let state = CliState::load_from(dir.path())?;
    assert_eq!(state.username.as_deref(), Some(ADMIN_USER));
    let token = state.token.clone().expect("token stored after login");

    for code in ["TWR-C1", "TWR-C2", "TWR-C3"] {
        server.create_tower(&token, tower_json(code)).await?;
    }

    towerctl(dir.path(), &["--json", "list", "--limit", "2", "--sort", "towerCode"]).await?;
    let state = CliState::load_from(dir.path())?;
    assert_eq!(state.list.total, 3);
    assert_eq!(state.list.visible.len(), 2);

    towerctl(dir.path(), &["--json", "list", "--next"]).await?;
    let state = CliState::load_from(dir.path())?;
    assert_eq!(state.list.page, 2);
    assert_eq!(state.list.visible.len(), 1);

    towerctl(dir.path(), &["--json", "select", "--all"]).await?;
    towerctl(dir.path(), &["--json", "delete-selected"]).await?;

    let state = CliState::load_from(dir.path())?;
    assert!(state.list.selected.is_empty());

    let res = server
        .client
        .get(server.url("/api/towers"))
        .bearer_auth(&token)
        .send()
        .await?;
    let body: serde_json::Value = res.json().await?;
    assert_eq!(body["total"], 2);
    Ok(())
}

#[tokio::test]
async fn rejected_token_is_forgotten() -> Result<()> {
    let server = TestServer::spawn().await?;
    let dir = tempfile::tempdir()?;

    let state = CliState {
        server_url: server.api_base(),
        token: Some("not-a-jwt".to_string()),
        username: Some(ADMIN_USER.to_string()),
        ..Default::default()
    };
    state.save_to(dir.path())?;

    let err = towerctl(dir.path(), &["--json", "whoami"]).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<ClientError>(), Some(ClientError::Unauthorized)));

    let state = CliState::load_from(dir.path())?;
    assert!(state.token.is_none());
    assert_eq!(state.server_url, server.api_base());
    Ok(())
}

#[tokio::test]
async fn wrong_password_keeps_logged_out() -> Result<()> {
    let server = TestServer::spawn().await?;
    let dir = tempfile::tempdir()?;

    towerctl(dir.path(), &["--json", "server", &server.api_base()]).await?;
    let result = towerctl(dir.path(), &["--json", "login", ADMIN_USER, "--password", "wrong"]).await;
    assert!(result.is_err());
    assert!(CliState::load_from(dir.path())?.token.is_none());
    Ok(())
}

async fn logged_in(server: &TestServer, dir: &std::path::Path) -> Result<String> {
    towerctl(dir, &["--json", "server", &server.api_base()]).await?;
    towerctl(dir, &["--json", "login", ADMIN_USER, "--password", ADMIN_PASSWORD]).await?;
    CliState::load_from(dir)?
        .token
        .ok_or_else(|| anyhow::anyhow!("no token stored after login"))
}

#[tokio::test]
async fn paging_follows_server_capped_limit() -> Result<()> {
    let mut config = test_config();
    config.listing.max_limit = 2;
    let server = TestServer::spawn_with(config).await?;
    let dir = tempfile::tempdir()?;
    let token = logged_in(&server, dir.path()).await?;

    for code in ["TWR-P1", "TWR-P2", "TWR-P3", "TWR-P4", "TWR-P5"] {
        server.create_tower(&token, tower_json(code)).await?;
    }

    towerctl(dir.path(), &["--json", "list", "--limit", "50"]).await?;
    let state = CliState::load_from(dir.path())?;
    assert_eq!(state.list.limit, 2);
    assert_eq!(state.list.total, 5);

    towerctl(dir.path(), &["--json", "list", "--next"]).await?;
    towerctl(dir.path(), &["--json", "list", "--next"]).await?;
    let state = CliState::load_from(dir.path())?;
    assert_eq!(state.list.page, 3);
    assert_eq!(state.list.visible.len(), 1);
    Ok(())
}

#[tokio::test]
async fn rejected_filter_is_not_remembered() -> Result<()> {
    let server = TestServer::spawn().await?;
    let dir = tempfile::tempdir()?;
    let token = logged_in(&server, dir.path()).await?;
    server.create_tower(&token, tower_json("TWR-F1")).await?;

    towerctl(dir.path(), &["--json", "list", "--status", "Active"]).await?;
    assert!(towerctl(dir.path(), &["--json", "list", "--status", "Retird"]).await.is_err());

    let state = CliState::load_from(dir.path())?;
    assert_eq!(state.list.status.as_deref(), Some("Active"));

    towerctl(dir.path(), &["--json", "list"]).await?;
    assert_eq!(CliState::load_from(dir.path())?.list.visible.len(), 1);
    Ok(())
}
