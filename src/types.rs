//! Core types shared by the primitives, the normalizer and both adapters.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Header mapping as seen by scripts and transports.
pub type HeaderMap = BTreeMap<String, String>;

/// Header input as written by a script: either a mapping or an encoded string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawHeaders {
    Map(HeaderMap),
    Encoded(String),
}

impl RawHeaders {
    /// The declared `Content-Type`, only available on mappings.
    pub fn content_type(&self) -> Option<&str> {
        match self {
            RawHeaders::Map(map) => map.get("Content-Type").map(String::as_str),
            RawHeaders::Encoded(_) => None,
        }
    }
}

/// Request description in the shape both script environments write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptRequest {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<RawHeaders>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl ScriptRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut map = match self.headers.take() {
            Some(RawHeaders::Map(map)) => map,
            _ => HeaderMap::new(),
        };
        map.insert(name.into(), value.into());
        self.headers = Some(RawHeaders::Map(map));
        self
    }

    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

/// Request in the shape the shared network primitive dispatches.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub url: String,
    pub headers: HeaderMap,
    /// `Value::String` is sent verbatim, anything else as JSON.
    pub body: Option<Value>,
    pub method: String,
    /// Overwritten with the configured timeout before dispatch.
    pub timeout_ms: u64,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            method: "GET".to_string(),
            timeout_ms: 0,
        }
    }
}

/// Normalized response handed back to scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

/// Response body as produced by a transport, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBody {
    Text(String),
    Binary(Vec<u8>),
    Structured(Value),
}

/// Response as produced by a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: RawBody,
}

/// Script-level truthiness: null, false, zero and the empty string are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
