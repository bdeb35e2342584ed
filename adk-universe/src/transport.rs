//! HTTP transport used by [`UniverseStore`](crate::UniverseStore).
//!
//! The store builds fully formed [`ApiRequest`]s and hands them to a
//! [`Transport`]. [`ReqwestTransport`] is the default; tests and hosts with
//! their own HTTP stack can supply another implementation.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use tracing::debug;
use url::Url;

use crate::error::{Result, UniverseError};

/// A request ready to be put on the wire.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    /// Includes `Content-Type` and the sensitive `Authorization` header.
    pub headers: HeaderMap,
    /// JSON body, if the endpoint takes one.
    pub body: Option<serde_json::Value>,
}

/// The status and raw body of a response, whatever the status.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }
}

/// Sends a single [`ApiRequest`].
///
/// Implementations return `Ok` for every response the server produced,
/// including error statuses, and [`UniverseError::TransportError`] only when
/// no response was obtained at all. Retrying is the caller's business.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// A [`Transport`] backed by a [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing client, e.g. one configured with timeouts or a proxy.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn map_err(e: reqwest::Error) -> UniverseError {
        UniverseError::TransportError { message: e.to_string() }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(Self::map_err)?;
        let status = response.status();
        // A response was received, so a truncated body is not a transport failure.
        let body = response.text().await.unwrap_or_else(|e| {
            debug!(%status, error = %e, "failed to read universe response body");
            String::new()
        });

        debug!(%status, body_len = body.len(), "universe server responded");
        Ok(ApiResponse { status, body })
    }
}
