//! Client configuration
//!
//! This module holds everything a client needs before it can talk to the
//! service: the credential, the base URL, the transport timeout, and the
//! retry policy. Configuration is always explicit and injected at
//! construction time; there is no process-wide credential holder.
//!
//! # Example
//!
//! ```no_run
//! use driftline_client::config::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .api_key("dl_live_...")
//!     .build()
//!     .unwrap();
//! ```

mod retry;
mod types;

pub use retry::RetryPolicy;
pub use types::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
