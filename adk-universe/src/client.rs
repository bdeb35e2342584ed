//! Universe server document store.
//!
//! [`UniverseStore`] implements [`RagPlugin`] by turning each file operation
//! into one REST call against a universe server:
//!
//! | Operation | Request |
//! |---|---|
//! | `add_file` / `update_file` | `POST /emit` with `{universe, thing: {id, text}}` |
//! | `delete_file` | `DELETE /thing/{universe}/{file_id}` |
//! | `delete_all_files` | `DELETE /universe/{universe}` |
//!
//! The server overwrites an existing item on `/emit`, so adding and updating
//! are the same request. Every call happens immediately and is committed by
//! the server when it answers, so [`finalize`](RagPlugin::finalize) has
//! nothing to flush.
//!
//! # Example
//!
//! ```rust,ignore
//! use adk_universe::{RagPlugin, UniverseConfig, UniverseStore};
//!
//! let config = UniverseConfig::builder()
//!     .server_url("https://store.example")
//!     .universe_name("myuni")
//!     .build()?;
//! let mut store = UniverseStore::new(config)?;
//! store.init(&credentials, None).await?;
//! store.add_file("doc1", "hello world").await?;
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::UniverseConfig;
use crate::credentials::{BearerToken, credential_description};
use crate::document::{Document, EmitRequest, validate_file_id};
use crate::error::{Result, UniverseError};
use crate::plugin::RagPlugin;
use crate::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};

/// Delay before the single retry of a request that got no response.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// What to do when a request fails before any response arrives.
///
/// HTTP error statuses are never retried, whatever the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Surface the first transport failure.
    Never,
    /// Wait the given delay and send the request exactly once more.
    Once(Duration),
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::Once(DEFAULT_RETRY_DELAY)
    }
}

/// State fixed by [`RagPlugin::init`].
#[derive(Debug)]
struct Session {
    config: UniverseConfig,
    base_url: Url,
    token: BearerToken,
}

/// A [`RagPlugin`] that stores files as items of one universe on a
/// universe server.
///
/// Construct it with a validated config via [`UniverseStore::new`], or with
/// [`UniverseStore::unconfigured`] when the host passes the config to
/// [`required_credentials`](RagPlugin::required_credentials) and
/// [`init`](RagPlugin::init) instead. File operations fail with
/// [`UniverseError::CredentialError`] until `init` has succeeded.
pub struct UniverseStore {
    config: Option<UniverseConfig>,
    session: Option<Session>,
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
}

impl UniverseStore {
    /// Create a store for `config`, validating it right away.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError::ConfigError`] if the server URL or universe
    /// name is missing or malformed.
    pub fn new(config: UniverseConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config: Some(config), ..Self::unconfigured() })
    }

    /// Create a store whose configuration will be supplied to `init`.
    pub fn unconfigured() -> Self {
        Self {
            config: None,
            session: None,
            transport: Arc::new(ReqwestTransport::new()),
            retry: RetryPolicy::default(),
        }
    }

    /// Send requests through `transport` instead of the default reqwest client.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Set the retry policy for requests that get no response.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The active configuration, if one is known yet.
    pub fn config(&self) -> Option<&UniverseConfig> {
        self.session.as_ref().map(|s| &s.config).or(self.config.as_ref())
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or_else(|| {
            UniverseError::CredentialError(
                "universe store is not initialized; call init first".to_string(),
            )
        })
    }

    /// Send one request to `segments` under the server URL and decode the reply.
    ///
    /// Successful replies yield their JSON body (`null` when empty). Error
    /// statuses become [`UniverseError::ApiError`].
    async fn fetch_api(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Value>,
    ) -> Result<Value> {
        let session = self.session()?;
        let url = endpoint_url(&session.base_url, segments)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(reqwest::header::AUTHORIZATION, session.token.authorization_header()?);

        let request = ApiRequest { method, url, headers, body };
        debug!(
            universe = %session.config.universe_name,
            method = %request.method,
            url = %request.url,
            "sending universe request"
        );

        let response = self.send(&request).await.inspect_err(|e| {
            debug!(method = %request.method, url = %request.url, error = %e, "universe request failed");
        })?;
        decode_response(response).inspect_err(|e| {
            debug!(method = %request.method, url = %request.url, error = %e, "universe request rejected");
        })
    }

    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        match self.transport.send(request).await {
            Err(UniverseError::TransportError { message }) => match self.retry {
                RetryPolicy::Never => Err(UniverseError::TransportError { message }),
                RetryPolicy::Once(delay) => {
                    warn!(
                        url = %request.url,
                        error = %message,
                        delay_ms = delay.as_millis() as u64,
                        "no response from universe server, retrying once"
                    );
                    tokio::time::sleep(delay).await;
                    self.transport.send(request).await.inspect_err(|e| {
                        error!(url = %request.url, error = %e, "universe server unreachable after retry");
                    })
                }
            },
            other => other,
        }
    }
}

impl std::fmt::Debug for UniverseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniverseStore")
            .field("config", &self.config())
            .field("initialized", &self.is_initialized())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

/// Append `segments` to the base URL's path, percent-encoding each one.
fn endpoint_url(base_url: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|_| {
            UniverseError::ConfigError(format!("serverUrl '{base_url}' cannot be used as a base URL"))
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn decode_response(response: ApiResponse) -> Result<Value> {
    if !response.status.is_success() {
        return Err(UniverseError::ApiError {
            status: response.status.as_u16(),
            message: error_message(&response),
        });
    }
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&response.body).unwrap_or(Value::String(response.body)))
}

/// The body's `error` or `description` field, else the status line.
fn error_message(response: &ApiResponse) -> String {
    serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|body| {
            ["error", "description"].iter().find_map(|key| match body.get(key) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Null) | None => None,
                Some(Value::String(_)) => None,
                Some(other) => Some(other.to_string()),
            })
        })
        .unwrap_or_else(|| status_line(response.status))
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}

#[async_trait]
impl RagPlugin for UniverseStore {
    type Config = UniverseConfig;

    fn required_credentials(
        &self,
        config: Option<&UniverseConfig>,
    ) -> Result<BTreeMap<String, String>> {
        let config = match config {
            Some(config) => {
                config.validate()?;
                config
            }
            None => self.config().ok_or_else(|| {
                UniverseError::ConfigError(
                    "serverUrl is unknown; pass a configuration to required_credentials"
                        .to_string(),
                )
            })?,
        };

        Ok(BTreeMap::from([(
            config.credential_name(),
            credential_description(&config.server_url),
        )]))
    }

    async fn init(
        &mut self,
        credentials: &HashMap<String, String>,
        config: Option<UniverseConfig>,
    ) -> Result<()> {
        let config = match config {
            Some(config) => {
                config.validate()?;
                config
            }
            None => self.config().cloned().ok_or_else(|| {
                UniverseError::ConfigError(
                    "no configuration supplied: serverUrl and universeName are required"
                        .to_string(),
                )
            })?,
        };

        let name = config.credential_name();
        let token = credentials
            .get(&name)
            .map(BearerToken::new)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                UniverseError::CredentialError(format!("missing credential '{name}'"))
            })?;
        token.authorization_header()?;
        let base_url = config.base_url()?;

        info!(
            universe = %config.universe_name,
            server_url = %config.server_url,
            "universe store initialized"
        );
        self.config = Some(config.clone());
        self.session = Some(Session { config, base_url, token });
        Ok(())
    }

    async fn add_file(&self, file_id: &str, content: &str) -> Result<()> {
        validate_file_id(file_id)?;
        let universe = self.session()?.config.universe_name.as_str();
        let body = EmitRequest { universe, thing: Document::new(file_id, content)? };
        let body = serde_json::to_value(&body)
            .map_err(|e| UniverseError::ValidationError(format!("unserializable item: {e}")))?;

        self.fetch_api(Method::POST, &["emit"], Some(body)).await?;
        debug!(universe = %universe, file_id, text_len = content.len(), "emitted item");
        Ok(())
    }

    async fn update_file(&self, file_id: &str, content: &str) -> Result<()> {
        self.add_file(file_id, content).await
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        validate_file_id(file_id)?;
        let universe = self.session()?.config.universe_name.as_str();

        self.fetch_api(Method::DELETE, &["thing", universe, file_id], None).await?;
        debug!(universe = %universe, file_id, "deleted item");
        Ok(())
    }

    async fn delete_all_files(&self) -> Result<()> {
        let universe = self.session()?.config.universe_name.as_str();

        self.fetch_api(Method::DELETE, &["universe", universe], None).await?;
        info!(universe = %universe, "deleted all items in universe");
        Ok(())
    }

    async fn finalize(&self) -> Result<()> {
        Ok(())
    }
}
