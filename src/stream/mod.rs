//! Incremental JSON-Lines decoding
//!
//! Streaming crawl responses arrive as one JSON document per line, split
//! across arbitrary transport chunks. [`LineDecoder`] reassembles lines and
//! parses them one at a time; [`RecordStream`] (async) and [`Records`]
//! (blocking) expose the decoded sequence for pull-style consumption, and
//! the client's callback mode drives the same sequence push-style.
//!
//! A line that fails to parse is logged and skipped; it never aborts the
//! rest of the stream.

mod decoder;
mod records;

pub use decoder::LineDecoder;
pub use records::{RecordStream, Records};
