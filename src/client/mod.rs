//! API client implementations
//!
//! This module contains both execution variants of the client:
//! - [`Client`]: suspend-on-I/O, for tokio callers; holds a persistent
//!   connection pool for its whole lifetime
//! - [`blocking::Client`]: blocks the calling thread per operation
//!
//! Both variants share the same operation set, payload construction,
//! response classification, and retry behavior.

mod asynchronous;
pub mod blocking;
mod response;

pub use asynchronous::Client;

pub(crate) use response::{decode_success, error_from_status};

use serde::Serialize;
use serde_json::{Map, Value};

/// Default request content type.
pub(crate) const JSON: &str = "application/json";

/// Content type selecting JSON-Lines framing for streamed responses.
pub(crate) const JSONL: &str = "application/jsonl";

/// Content type for binary downloads.
pub(crate) const OCTET_STREAM: &str = "application/octet-stream";

/// Merges caller parameters over an endpoint's required fields.
///
/// Caller-supplied keys win on conflict. Values an operation must force
/// (e.g. the scrape page limit) are inserted by the caller *after* this
/// merge.
pub(crate) fn merge_payload<P: Serialize>(
    required: Map<String, Value>,
    params: Option<&P>,
) -> Map<String, Value> {
    let mut payload = required;
    if let Some(params) = params {
        if let Ok(Value::Object(object)) = serde_json::to_value(params) {
            payload.extend(object);
        }
    }
    payload
}

/// Payload for the URL-keyed POST operations.
pub(crate) fn url_payload<P: Serialize>(url: &str, params: Option<&P>) -> Map<String, Value> {
    let mut required = Map::new();
    required.insert("url".to_string(), Value::String(url.to_string()));
    merge_payload(required, params)
}
