use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use super::list_state::ListState;
use crate::model::{Tenant, Tower, TowerDetail};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("session expired, run `towerctl login`")]
    Unauthorized,

    #[error("{}", describe_api_error(.message, .field_errors))]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        field_errors: BTreeMap<String, String>,
    },

    #[error("invalid server URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

fn describe_api_error(message: &str, field_errors: &BTreeMap<String, String>) -> String {
    if field_errors.is_empty() {
        return message.to_string();
    }
    let fields: Vec<String> = field_errors.iter().map(|(f, m)| format!("{f}: {m}")).collect();
    format!("{message} ({})", fields.join("; "))
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
    total: Option<u64>,
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
    code: Option<String>,
    #[serde(default)]
    field_errors: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone)]
pub struct Listing {
    pub towers: Vec<Tower>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// Thin typed wrapper over the tower admin REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ClientError> {
        // Url::join drops the last segment unless the base ends with '/'
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, base, token })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.base.join(path)?;
        let builder = self.http.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Envelope<T>, ClientError> {
        let response = check(builder.send().await?).await?;
        Ok(response.json::<Envelope<T>>().await?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ClientError> {
        let builder = self
            .request(Method::POST, "auth/login")?
            .json(&json!({ "username": username, "password": password }));
        match self.send::<Session>(builder).await {
            Ok(envelope) => Ok(envelope.data),
            Err(ClientError::Unauthorized) => Err(ClientError::Api {
                status: StatusCode::UNAUTHORIZED.as_u16(),
                code: Some("UNAUTHORIZED".to_string()),
                message: "Invalid username or password".to_string(),
                field_errors: BTreeMap::new(),
            }),
            Err(e) => Err(e),
        }
    }

    pub async fn whoami(&self) -> Result<Value, ClientError> {
        Ok(self.send(self.request(Method::GET, "auth/whoami")?).await?.data)
    }

    pub async fn list(&self, state: &ListState) -> Result<Listing, ClientError> {
        let builder = self.request(Method::GET, "towers")?.query(&state.to_query());
        let envelope = self.send::<Vec<Tower>>(builder).await?;
        Ok(Listing {
            total: envelope.total.unwrap_or(envelope.data.len() as u64),
            page: envelope.page.unwrap_or(state.page),
            limit: envelope.limit.unwrap_or(state.limit),
            towers: envelope.data,
        })
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Tower>, ClientError> {
        let builder = self.request(Method::GET, "towers/search")?.query(&[("q", query)]);
        Ok(self.send(builder).await?.data)
    }

    pub async fn get(&self, id: Uuid) -> Result<TowerDetail, ClientError> {
        Ok(self.send(self.request(Method::GET, &format!("towers/{id}"))?).await?.data)
    }

    pub async fn create(&self, body: &Value) -> Result<TowerDetail, ClientError> {
        let builder = self.request(Method::POST, "towers")?.json(body);
        Ok(self.send(builder).await?.data)
    }

    pub async fn update(&self, id: Uuid, body: &Value) -> Result<TowerDetail, ClientError> {
        let builder = self.request(Method::PUT, &format!("towers/{id}"))?.json(body);
        Ok(self.send(builder).await?.data)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        check(self.request(Method::DELETE, &format!("towers/{id}"))?.send().await?).await?;
        Ok(())
    }

    pub async fn bulk_delete(&self, ids: &[Uuid]) -> Result<u64, ClientError> {
        let builder = self.request(Method::DELETE, "towers/bulk")?.json(&json!({ "ids": ids }));
        let data: Value = self.send(builder).await?.data;
        Ok(data["deleted"].as_u64().unwrap_or(0))
    }

    /// CSV bytes for the given towers, or for all towers.
    pub async fn export(&self, ids: Option<&[Uuid]>) -> Result<Vec<u8>, ClientError> {
        let body = match ids {
            Some(ids) => json!({ "ids": ids }),
            None => json!({}),
        };
        let response = check(self.request(Method::POST, "towers/export")?.json(&body).send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn metrics(&self) -> Result<Value, ClientError> {
        Ok(self.send(self.request(Method::GET, "dashboard/metrics")?).await?.data)
    }

    pub async fn tenants(&self, tower_id: Uuid) -> Result<Vec<Tenant>, ClientError> {
        Ok(self
            .send(self.request(Method::GET, &format!("towers/{tower_id}/tenants"))?)
            .await?
            .data)
    }

    pub async fn add_tenant(&self, tower_id: Uuid, body: &Value) -> Result<Tenant, ClientError> {
        let builder = self
            .request(Method::POST, &format!("towers/{tower_id}/tenants"))?
            .json(body);
        Ok(self.send(builder).await?.data)
    }

    pub async fn update_tenant(&self, tower_id: Uuid, tenant_id: Uuid, body: &Value) -> Result<Tenant, ClientError> {
        let builder = self
            .request(Method::PUT, &format!("towers/{tower_id}/tenants/{tenant_id}"))?
            .json(body);
        Ok(self.send(builder).await?.data)
    }

    pub async fn remove_tenant(&self, tower_id: Uuid, tenant_id: Uuid) -> Result<(), ClientError> {
        let builder = self.request(Method::DELETE, &format!("towers/{tower_id}/tenants/{tenant_id}"))?;
        check(builder.send().await?).await?;
        Ok(())
    }
}

/// Pass successful responses through; turn failures into `ClientError`.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    let envelope: ErrorEnvelope = serde_json::from_str(&body).unwrap_or_default();
    Err(ClientError::Api {
        status: status.as_u16(),
        code: envelope.code,
        message: envelope
            .error
            .unwrap_or_else(|| format!("request failed with status {status}")),
        field_errors: envelope.field_errors,
    })
}
