mod common;

use anyhow::Result;
use reqwest::{header, StatusCode};
use serde_json::json;

use common::{tower_json, TestServer};

#[tokio::test]
async fn exports_all_towers_as_csv() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;
    server.create_tower(&token, tower_json("TWR-E2")).await?;
    server.create_tower(&token, tower_json("TWR-E1")).await?;

    let res = server
        .client
        .post(server.url("/api/towers/export"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()[header::CONTENT_TYPE].to_str()?.starts_with("text/csv"));
    let disposition = res.headers()[header::CONTENT_DISPOSITION].to_str()?.to_string();
    assert!(disposition.starts_with("attachment; filename=\"towers-"));
    assert!(disposition.ends_with(".csv\""));

    let text = res.text().await?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("id,towerCode,"));
    assert!(lines[1].contains("TWR-E1"));
    assert!(lines[2].contains("TWR-E2"));
    Ok(())
}

#[tokio::test]
async fn exports_only_requested_ids() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;
    let keep = server.create_tower(&token, tower_json("TWR-KEEP")).await?;
    server.create_tower(&token, tower_json("TWR-SKIP")).await?;

    let res = server
        .client
        .post(server.url("/api/towers/export"))
        .bearer_auth(&token)
        .json(&json!({ "ids": [keep["id"]] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let text = res.text().await?;
    assert!(text.contains("TWR-KEEP"));
    assert!(!text.contains("TWR-SKIP"));
    Ok(())
}

#[tokio::test]
async fn rejects_bad_export_requests() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login().await?;

    let res = server
        .client
        .post(server.url("/api/towers/export"))
        .bearer_auth(&token)
        .json(&json!({ "ids": ["nope"] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .client
        .post(server.url("/api/towers/export"))
        .bearer_auth(&token)
        .json(&json!({ "ids": [] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .client
        .post(server.url("/api/towers/export"))
        .bearer_auth(&token)
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
