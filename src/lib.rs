//! Driftline client: a thin interface to the Driftline crawling cloud
//!
//! This crate talks to the hosted Driftline service, which performs the
//! actual crawling, scraping, and data extraction remotely. The client's job
//! is to build requests, attach credentials, decode responses (including
//! JSON-Lines streams), and surface failures as typed errors.
//!
//! Two variants share one operation set: [`Client`] suspends on I/O and is
//! meant for tokio callers; [`blocking::Client`] blocks the calling thread.

pub mod client;
pub mod config;
pub mod params;
pub mod stream;

use thiserror::Error;

/// Main error type for Driftline client operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no API key provided (argument or DRIFTLINE_API_KEY)")]
    MissingApiKey,

    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("transport failure while trying to {action}: {source}")]
    Transport {
        action: String,
        source: reqwest::Error,
    },

    #[error("failed to {action}: status {status}: {message}")]
    Api {
        action: String,
        status: u16,
        message: String,
    },

    #[error("unexpected status {status} while trying to {action}: {body}")]
    UnexpectedStatus {
        action: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode response body for {action}: {source}")]
    Decode {
        action: String,
        source: serde_json::Error,
    },

    #[error("stream read failed while trying to {action}: {source}")]
    StreamRead {
        action: String,
        source: std::io::Error,
    },

    #[error("client has been closed")]
    Closed,
}

impl ClientError {
    /// Builds a transport error carrying the operation context.
    pub(crate) fn transport(action: &str, source: reqwest::Error) -> Self {
        ClientError::Transport {
            action: action.to_string(),
            source,
        }
    }
}

/// Result type alias for Driftline client operations
pub type Result<T> = std::result::Result<T, ClientError>;

// Re-export commonly used types
pub use client::blocking;
pub use client::Client;
pub use config::{ClientConfig, ClientConfigBuilder, RetryPolicy};
pub use params::{
    QueryParams, RequestMode, RequestParams, ReturnFormat, SearchParams, TransformInput,
    TransformParams,
};
pub use stream::{LineDecoder, RecordStream};
