//! HTTP client for the SOAR REST API.
//!
//! [`SoarClient`] implements the collaborator traits the MCP server needs:
//! the integration instance directory, the manual action endpoint, the
//! permitted scope listing and generic case management calls. Every call is
//! a single request with no retry; errors are returned to the caller
//! unchanged.

pub mod endpoints;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use soar_core::case::{ApiCall, Method};
use soar_core::config::SoarApiConfig;
use soar_core::model::{ActionRequest, InstanceList, InstanceRecord};
use soar_core::{ActionEndpoint, InstanceDirectory, ScopeSource, SoarApi};

/// Header carrying the SOAR application key.
pub const APP_KEY_HEADER: &str = "AppKey";

/// Errors returned by [`SoarClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid SOAR URL: {0}")]
    InvalidUrl(String),

    #[error("invalid application key: {0}")]
    InvalidAppKey(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("SOAR API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid JSON in SOAR response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for one SOAR platform.
#[derive(Debug, Clone)]
pub struct SoarClient {
    base_url: Url,
    http: Client,
}

impl SoarClient {
    /// Create a client for `base_url`, authenticating with `app_key` when given.
    pub fn new(base_url: &str, app_key: Option<&str>) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        if let Some(key) = app_key.filter(|k| !k.is_empty()) {
            let mut value =
                HeaderValue::from_str(key).map_err(|e| ClientError::InvalidAppKey(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(APP_KEY_HEADER, value);
        }

        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self { base_url, http })
    }

    /// Create a client from the `soar` configuration section.
    pub fn from_config(config: &SoarApiConfig) -> Result<Self, ClientError> {
        let url = config
            .base_url()
            .ok_or_else(|| ClientError::InvalidUrl("no SOAR URL configured".to_string()))?;
        Self::new(url, config.app_key.as_deref())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an absolute URL from path segments below the base URL.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn instances_url(&self, integration: &str) -> Result<Url, ClientError> {
        let mut url = self.url(&endpoints::integration_instances(integration))?;
        Self::set_odata(&mut url, &[(endpoints::SELECT_PARAM, endpoints::SELECT_IDENTIFIER)]);
        Ok(url)
    }

    /// `$`-prefixed OData options must reach the server unencoded.
    fn set_odata<K, V>(url: &mut Url, options: &[(K, V)])
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if options.is_empty() {
            return;
        }
        let query = options
            .iter()
            .map(|(key, value)| format!("{}={}", key.as_ref(), value.as_ref()))
            .collect::<Vec<_>>()
            .join("&");
        url.set_query(Some(&query));
    }

    fn check_status(status: StatusCode, body: &[u8]) -> Result<(), ClientError> {
        if status.is_success() {
            return Ok(());
        }
        Err(ClientError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(body).into_owned(),
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.bytes().await?;
        Self::check_status(status, &body)?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Like `read_json`, but an empty body reads as `null`.
    async fn read_value(response: Response) -> Result<Value, ClientError> {
        let status = response.status();
        let body = response.bytes().await?;
        Self::check_status(status, &body)?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    /// List the configured instances of an integration.
    pub async fn get_instances(&self, integration: &str) -> Result<Vec<InstanceRecord>, ClientError> {
        let url = self.instances_url(integration)?;

        tracing::debug!(%integration, "Fetching integration instances");
        let response = self.http.get(url).send().await?;
        let list: InstanceList = Self::read_json(response).await?;
        Ok(list.integration_instances)
    }

    /// Post a manual action request and return the response body.
    pub async fn post_action(&self, request: &ActionRequest) -> Result<serde_json::Value, ClientError> {
        let url = self.url(&endpoints::EXECUTE_MANUAL_ACTION)?;

        tracing::debug!(action = %request.action_name, case_id = %request.case_id, "Executing manual action");
        let response = self.http.post(url).json(request).send().await?;
        Self::read_json(response).await
    }

    /// Fetch the scope names the platform accepts.
    pub async fn get_scopes(&self) -> Result<Vec<String>, ClientError> {
        let url = self.url(&endpoints::GET_SCOPES)?;
        let response = self.http.get(url).send().await?;
        Self::read_json(response).await
    }

    /// Send a case management call and return the response body.
    pub async fn send(&self, call: &ApiCall) -> Result<Value, ClientError> {
        let segments: Vec<&str> = call.path.iter().map(String::as_str).collect();
        let mut url = self.url(&segments)?;
        Self::set_odata(&mut url, &call.odata);
        if !call.query.is_empty() {
            url.query_pairs_mut().extend_pairs(call.query.iter());
        }

        tracing::debug!(method = ?call.method, path = %url.path(), "Calling SOAR API");
        let request = match call.method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
            Method::Patch => self.http.patch(url),
        };
        let request = match &call.body {
            Some(body) => request.json(body),
            None => request,
        };
        Self::read_value(request.send().await?).await
    }
}

#[async_trait]
impl InstanceDirectory for SoarClient {
    async fn list_instances(&self, integration: &str) -> anyhow::Result<Vec<InstanceRecord>> {
        Ok(self.get_instances(integration).await?)
    }
}

#[async_trait]
impl ActionEndpoint for SoarClient {
    async fn execute_action(&self, request: &ActionRequest) -> anyhow::Result<serde_json::Value> {
        Ok(self.post_action(request).await?)
    }
}

#[async_trait]
impl ScopeSource for SoarClient {
    async fn fetch_scopes(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.get_scopes().await?)
    }
}

#[async_trait]
impl SoarApi for SoarClient {
    async fn send(&self, call: &ApiCall) -> anyhow::Result<Value> {
        Ok(SoarClient::send(self, call).await?)
    }
}
