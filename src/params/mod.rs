//! Request parameter types
//!
//! Typed request surfaces for the remote service. Every field is optional
//! and omitted from the payload when unset; the service rejects invalid
//! combinations server-side, so no cross-field validation happens here.

mod query;
mod types;

pub use query::query_pairs;
pub use types::{
    AutomationStep, ChunkBy, ProxyPool, QueryParams, RequestMode, RequestParams, ReturnFormat,
    SearchParams, TransformInput, TransformParams, Viewport, WaitFor, WaitTarget, WebhookSettings,
};
