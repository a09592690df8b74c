//! Generic network request primitive (`$axios`).
//!
//! The primitive owns the configured timeout and normalizes response bodies;
//! the wire work is delegated to an [`HttpTransport`].

use crate::error::{ContextError, TransportError};
use crate::normalize::normalize_response_body;
use crate::types::{HeaderMap, RawBody, RawResponse, Request, Response};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Transport port. Implementations report transport-level failures only;
/// any HTTP status is a successful response.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &Request) -> Result<RawResponse, TransportError>;
}

/// `reqwest`-backed transport.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ContextError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ContextError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &Request) -> Result<RawResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.to_uppercase().as_bytes())
            .map_err(|_| {
                TransportError::InvalidRequest(format!("unsupported method: {}", request.method))
            })?;

        let mut builder = self
            .client
            .request(method, &request.url)
            .timeout(Duration::from_millis(request.timeout_ms));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            Some(Value::String(text)) => builder.body(text.clone()),
            Some(other) => builder.json(other),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| classify_error(e, request.timeout_ms))?;

        let status = response.status().as_u16();
        let mut headers = HeaderMap::new();
        for (name, value) in response.headers() {
            let Ok(value) = value.to_str() else {
                continue;
            };
            headers
                .entry(name.to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_error(e, request.timeout_ms))?;

        Ok(RawResponse {
            status,
            headers,
            body: classify_body(&bytes),
        })
    }
}

fn classify_error(err: reqwest::Error, timeout_ms: u64) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout { timeout_ms }
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

/// JSON objects and arrays are structured, other valid UTF-8 is text and
/// everything else is binary.
pub fn classify_body(bytes: &[u8]) -> RawBody {
    if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
        if value.is_object() || value.is_array() {
            return RawBody::Structured(value);
        }
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => RawBody::Text(text.to_string()),
        Err(_) => RawBody::Binary(bytes.to_vec()),
    }
}

/// The shared request primitive.
#[derive(Clone)]
pub struct HttpRequester {
    transport: Arc<dyn HttpTransport>,
    timeout_ms: u64,
}

impl HttpRequester {
    pub fn new(transport: Arc<dyn HttpTransport>, timeout_ms: u64) -> Self {
        Self {
            transport,
            timeout_ms,
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Dispatch `req` with the configured timeout, replacing whatever the
    /// caller set. Transport failures are logged and returned.
    pub async fn request(&self, mut req: Request) -> Result<Response, TransportError> {
        req.timeout_ms = self.timeout_ms;
        debug!(method = %req.method, url = %req.url, "dispatching request");

        match self.transport.send(&req).await {
            Ok(raw) => Ok(Response {
                status: raw.status,
                headers: raw.headers,
                body: normalize_response_body(raw.body),
            }),
            Err(e) => {
                error!(url = %req.url, error = %e, "$axios error on");
                Err(e)
            }
        }
    }
}
