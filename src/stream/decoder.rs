use serde_json::Value;

/// Reassembles JSON-Lines records from arbitrary byte chunks
///
/// The decoder keeps whatever trails the last newline in an internal
/// buffer, so chunk boundaries can fall anywhere (including inside a
/// record) without affecting the decoded output. The server frames one
/// complete JSON document per line; this is line splitting plus per-line
/// parsing, not a streaming JSON parser.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buf: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one chunk and returns the records completed by it.
    ///
    /// Lines that are blank or fail to parse are skipped; parse failures
    /// are logged at `warn`.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Value> {
        self.buf.extend_from_slice(chunk);

        let mut records = Vec::new();
        while let Some(newline) = self.buf.iter().position(|&byte| byte == b'\n') {
            let rest = self.buf.split_off(newline + 1);
            let mut line = std::mem::replace(&mut self.buf, rest);
            line.pop(); // the newline itself
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if let Some(record) = parse_line(&line) {
                records.push(record);
            }
        }
        records
    }

    /// Flushes the trailing buffer at end-of-stream.
    ///
    /// A final record without a terminating newline is still delivered if
    /// it parses.
    pub fn finish(&mut self) -> Option<Value> {
        let line = std::mem::take(&mut self.buf);
        parse_line(&line)
    }
}

fn parse_line(line: &[u8]) -> Option<Value> {
    let trimmed = trim_ascii(line);
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_slice(trimmed) {
        Ok(record) => Some(record),
        Err(error) => {
            tracing::warn!(%error, "skipping undecodable stream line");
            None
        }
    }
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|byte| !byte.is_ascii_whitespace())
        .map(|index| index + 1)
        .unwrap_or(start);
    &bytes[start..end]
}
