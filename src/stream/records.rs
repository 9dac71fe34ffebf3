use crate::stream::LineDecoder;
use crate::ClientError;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use std::collections::VecDeque;
use std::io::Read;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A lazy, finite, single-pass sequence of streamed records (async)
///
/// Yields one decoded JSON document per well-formed line of the response
/// body. Undecodable lines are skipped by the decoder; a transport failure
/// mid-stream surfaces as an `Err` item and ends the sequence. Dropping the
/// stream releases the underlying response.
///
/// Restarting is not possible; issue a new request instead.
pub struct RecordStream {
    inner: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: LineDecoder,
    pending: VecDeque<Value>,
    action: String,
    done: bool,
}

impl RecordStream {
    pub(crate) fn new(response: reqwest::Response, action: &str) -> Self {
        Self {
            inner: response.bytes_stream().boxed(),
            decoder: LineDecoder::new(),
            pending: VecDeque::new(),
            action: action.to_string(),
            done: false,
        }
    }
}

impl Stream for RecordStream {
    type Item = crate::Result<Value>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(record) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(record)));
            }
            if this.done {
                return Poll::Ready(None);
            }
            match this.inner.as_mut().poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(chunk))) => {
                    this.pending.extend(this.decoder.feed(&chunk));
                }
                Poll::Ready(Some(Err(source))) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(ClientError::transport(&this.action, source))));
                }
                Poll::Ready(None) => {
                    this.done = true;
                    if let Some(record) = this.decoder.finish() {
                        return Poll::Ready(Some(Ok(record)));
                    }
                    return Poll::Ready(None);
                }
            }
        }
    }
}

impl std::fmt::Debug for RecordStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStream")
            .field("action", &self.action)
            .field("pending", &self.pending.len())
            .field("done", &self.done)
            .finish()
    }
}

/// A lazy, finite, single-pass sequence of streamed records (blocking)
///
/// Blocking counterpart of [`RecordStream`], reading the response body
/// through `std::io::Read`.
pub struct Records<R> {
    reader: R,
    decoder: LineDecoder,
    pending: VecDeque<Value>,
    action: String,
    done: bool,
}

impl<R: Read> Records<R> {
    pub(crate) fn new(reader: R, action: &str) -> Self {
        Self {
            reader,
            decoder: LineDecoder::new(),
            pending: VecDeque::new(),
            action: action.to_string(),
            done: false,
        }
    }
}

impl<R: Read> Iterator for Records<R> {
    type Item = crate::Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(Ok(record));
            }
            if self.done {
                return None;
            }
            let mut chunk = [0u8; 8 * 1024];
            match self.reader.read(&mut chunk) {
                Ok(0) => {
                    self.done = true;
                    if let Some(record) = self.decoder.finish() {
                        return Some(Ok(record));
                    }
                    return None;
                }
                Ok(n) => {
                    self.pending.extend(self.decoder.feed(&chunk[..n]));
                }
                Err(source) if source.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    self.done = true;
                    return Some(Err(ClientError::StreamRead {
                        action: self.action.clone(),
                        source,
                    }));
                }
            }
        }
    }
}
