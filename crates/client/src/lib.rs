//! # OpenMRS client
//!
//! [`ChartFetcher`] over HTTP, using `reqwest` with basic authentication.
//!
//! Paths handed to the client are server-relative (`/ws/fhir2/R4/...`, `/ws/rest/v1/...`) and
//! are appended to the configured base URL as given.

use async_trait::async_trait;
use chart_core::{AbortHandle, ChartError, ChartFetcher, ChartResult, SaveResponse};
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Username and password for basic authentication.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// HTTP access to one OpenMRS server.
#[derive(Clone, Debug)]
pub struct OpenmrsClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl OpenmrsClient {
    /// Create a client for the server at `base_url` (e.g. `https://demo.openmrs.org/openmrs`).
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::InvalidInput`] for a base URL that is blank or not http(s), and
    /// [`ChartError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, credentials: Option<Credentials>) -> ChartResult<Self> {
        Self::with_timeout(base_url, credentials, DEFAULT_TIMEOUT)
    }

    /// As [`OpenmrsClient::new`], with an explicit per-request timeout.
    pub fn with_timeout(
        base_url: &str,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> ChartResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ChartError::InvalidInput("base URL cannot be empty".into()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ChartError::InvalidInput(format!(
                "base URL must start with http:// or https://, got '{base_url}'"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");
        match &self.credentials {
            Some(c) => builder.basic_auth(&c.username, Some(&c.password)),
            None => builder,
        }
    }
}

fn transport(err: reqwest::Error) -> ChartError {
    ChartError::Transport(err.to_string())
}

fn http_error(status: StatusCode) -> ChartError {
    ChartError::Http {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
    }
}

/// Decode a response body. Empty bodies decode to `null`.
fn decode_body(bytes: &[u8]) -> ChartResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(bytes)?)
}

#[async_trait]
impl ChartFetcher for OpenmrsClient {
    async fn get(&self, path: &str) -> ChartResult<Value> {
        tracing::debug!("GET {path}");
        let response = self
            .request(Method::GET, path)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("GET {path} answered {status}");
            return Err(http_error(status));
        }

        let bytes = response.bytes().await.map_err(transport)?;
        decode_body(&bytes)
    }

    async fn post(
        &self,
        path: &str,
        body: &Value,
        abort: &AbortHandle,
    ) -> ChartResult<SaveResponse> {
        tracing::debug!("POST {path}");
        let exchange = async {
            let response = self
                .request(Method::POST, path)
                .json(body)
                .send()
                .await
                .map_err(transport)?;
            let status = response.status().as_u16();
            let bytes = response.bytes().await.map_err(transport)?;
            // Error pages are not always JSON; keep them as text.
            let body = decode_body(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
            Ok(SaveResponse { status, body })
        };

        tokio::select! {
            result = exchange => result,
            _ = abort.aborted() => {
                tracing::info!("POST {path} cancelled");
                Err(ChartError::Cancelled)
            }
        }
    }
}
