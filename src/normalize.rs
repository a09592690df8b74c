//! Request/Response Normalizer
//!
//! Pure conversions between the request/response shapes scripts write and
//! the shapes the shared network primitive works with. Nothing here fails
//! towards the caller: malformed input degrades to an empty value and is
//! logged.

use crate::error::HeaderError;
use crate::types::{is_truthy, value_kind, HeaderMap, RawBody, RawHeaders, ScriptRequest};
use serde_json::{Map, Value};
use tracing::error;

/// Header entry removed from caller-supplied mappings. Stale lengths after a
/// body rewrite break downstream transports. Exact key match only.
pub const STRIPPED_HEADER: &str = "Content-Length";

/// Turn script header input into a plain mapping.
///
/// Mappings lose their `Content-Length` entry. Encoded strings are parsed as
/// a JSON object; on failure the error is logged and an empty mapping is
/// returned.
pub fn normalize_headers(raw: Option<&RawHeaders>) -> HeaderMap {
    match raw {
        None => HeaderMap::new(),
        Some(RawHeaders::Map(map)) => {
            let mut headers = map.clone();
            headers.remove(STRIPPED_HEADER);
            headers
        }
        Some(RawHeaders::Encoded(text)) => match parse_encoded_headers(text) {
            Ok(headers) => headers,
            Err(e) => {
                error!(error = %e, "req headers error");
                HeaderMap::new()
            }
        },
    }
}

/// Parse encoded header text into a mapping. Scalar values are stringified.
pub fn parse_encoded_headers(text: &str) -> Result<HeaderMap, HeaderError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(entries) = value else {
        return Err(HeaderError::NotAnObject(value_kind(&value)));
    };
    Ok(entries
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (name, value)
        })
        .collect())
}

/// Pick the body to send.
///
/// An explicit (truthy) body wins. Otherwise the text after the first `?` of
/// the URL is used: decoded into a mapping when the header mapping declares
/// a JSON `Content-Type`, raw otherwise.
pub fn normalize_body(req: &ScriptRequest) -> Option<Value> {
    if let Some(body) = req.body.as_ref().filter(|b| is_truthy(b)) {
        return Some(body.clone());
    }
    let (_, query) = req.url.split_once('?')?;
    let json_declared = req
        .headers
        .as_ref()
        .and_then(RawHeaders::content_type)
        .map(|ct| ct.contains("json"))
        .unwrap_or(false);
    if json_declared {
        Some(parse_form(query))
    } else {
        Some(Value::String(query.to_string()))
    }
}

/// Decode `a=1&b=2` into `{"a": "1", "b": "2"}`.
///
/// Repeated keys collect into an array, `+` decodes to a space and pairs
/// without `=` map to the empty string.
pub fn parse_form(query: &str) -> Value {
    let mut out = Map::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key);
        if key.is_empty() {
            continue;
        }
        let value = Value::String(decode_component(value));
        match out.get_mut(&key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                out.insert(key, value);
            }
        }
    }
    Value::Object(out)
}

/// Encode a mapping as `a=1&b=2`. Arrays repeat their key.
pub fn stringify_form(value: &Value) -> String {
    let Value::Object(entries) = value else {
        return String::new();
    };
    let mut pairs = Vec::new();
    for (key, value) in entries {
        let items: Vec<&Value> = match value {
            Value::Array(items) => items.iter().collect(),
            Value::Null => continue,
            other => vec![other],
        };
        for item in items {
            let text = match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            pairs.push(format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(&text)
            ));
        }
    }
    pairs.join("&")
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Flatten a transport body into the string every environment expects.
pub fn normalize_response_body(body: RawBody) -> String {
    match body {
        RawBody::Text(text) => text,
        RawBody::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        RawBody::Structured(value) => value.to_string(),
    }
}

/// Normalize the value a script hands to `$done`.
///
/// Falsy or absent data becomes `{}`, structured data passes through and
/// anything else is wrapped as `{"body": data}`.
pub fn normalize_completion(data: Option<Value>) -> Value {
    match data {
        Some(value) if is_truthy(&value) => match value {
            Value::Object(_) | Value::Array(_) => value,
            scalar => {
                let mut wrapped = Map::new();
                wrapped.insert("body".to_string(), scalar);
                Value::Object(wrapped)
            }
        },
        _ => Value::Object(Map::new()),
    }
}
