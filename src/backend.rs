//! Backend-as-a-service client
//!
//! Built from a project URL and a public key; speaks the REST convention
//! `{url}/rest/v1/{table}` with the key in both the `apikey` and bearer
//! headers. Plain CRUD only. Tables and row shapes belong to the caller.

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const REST_PREFIX: &str = "rest/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid table name '{0}'")]
    InvalidTable(String),
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base: Url,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key stays out of logs
        f.debug_struct("BackendClient").field("base", &self.base.as_str()).finish()
    }
}

impl BackendClient {
    pub fn connect(url: &str, key: &str) -> anyhow::Result<Self> {
        let mut base = Url::parse(url).with_context(|| format!("Invalid backend URL: {}", url))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("Backend key must not be empty");
        }

        let mut headers = HeaderMap::new();
        let mut apikey =
            HeaderValue::from_str(key).context("Backend key is not a valid header value")?;
        apikey.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", key))
            .context("Backend key is not a valid header value")?;
        bearer.set_sensitive(true);
        headers.insert("apikey", apikey);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create backend HTTP client")?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn table_url(&self, table: &str) -> Result<Url, BackendError> {
        let valid = !table.is_empty()
            && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(BackendError::InvalidTable(table.to_string()));
        }
        self.base
            .join(&format!("{}/{}", REST_PREFIX, table))
            .map_err(|_| BackendError::InvalidTable(table.to_string()))
    }

    async fn send(
        &self,
        method: Method,
        table: &str,
        filters: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value, BackendError> {
        let url = self.table_url(table)?;
        let mut request = self
            .client
            .request(method.clone(), url)
            .query(filters)
            .header("Prefer", "return=representation");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!("Backend {} {} -> {}", method, table, status);

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }

    /// Insert one row or an array of rows
    pub async fn insert(&self, table: &str, rows: &Value) -> Result<Value, BackendError> {
        self.send(Method::POST, table, &[], Some(rows)).await
    }

    /// `filters` are raw query pairs, e.g. `("crop", "eq.rice")`
    pub async fn select(
        &self,
        table: &str,
        filters: &[(&str, &str)],
    ) -> Result<Value, BackendError> {
        self.send(Method::GET, table, filters, None).await
    }

    pub async fn update(
        &self,
        table: &str,
        filters: &[(&str, &str)],
        patch: &Value,
    ) -> Result<Value, BackendError> {
        self.send(Method::PATCH, table, filters, Some(patch)).await
    }

    pub async fn delete(
        &self,
        table: &str,
        filters: &[(&str, &str)],
    ) -> Result<Value, BackendError> {
        self.send(Method::DELETE, table, filters, None).await
    }
}
