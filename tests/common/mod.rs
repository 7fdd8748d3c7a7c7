#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use tower_admin_api::app::{app, AppState};
use tower_admin_api::config::{AppConfig, Environment};
use tower_admin_api::database::MemoryStore;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

/// In-process server bound to a free port with a fresh in-memory store.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::for_environment(Environment::Development).with_admin_password(ADMIN_PASSWORD);
    config.security.jwt_secret = "integration-test-secret".to_string();
    config.database.url = None;
    config
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(test_config()).await
    }

    pub async fn spawn_with(mut config: AppConfig) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        config.server.port = port;

        let router = app(AppState::new(Arc::new(MemoryStore::new()), config));
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn api_base(&self) -> String {
        format!("{}/api", self.base_url)
    }

    pub async fn login(&self) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": ADMIN_USER, "password": ADMIN_PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response carried no token")
    }

    /// Create a tower and return the `data` of the response.
    pub async fn create_tower(&self, token: &str, body: Value) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/api/towers"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"].clone())
    }
}

pub fn tower_json(code: &str) -> Value {
    json!({
        "towerCode": code,
        "address": format!("{code} Transmission Way"),
        "type": "Monopole",
        "status": "Active",
        "coordinates": { "latitude": 40.7128, "longitude": -74.0060 },
        "height": 120.0,
        "capacity": 8
    })
}

pub fn tenant_json(name: &str, revenue: f64) -> Value {
    json!({
        "name": name,
        "type": "Carrier",
        "contractStart": "2024-01-01",
        "contractEnd": "2029-12-31",
        "monthlyRevenue": revenue
    })
}
