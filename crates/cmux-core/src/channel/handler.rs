//! Easy2 Handler that buffers one response: final header block and body.

use std::str;

/// Handler state for one GET job.
#[derive(Debug, Default)]
pub struct ResponseCollector {
    header_lines: Vec<String>,
    body: Vec<u8>,
    /// Abort the transfer once the body would grow past this many bytes.
    max_body_bytes: Option<u64>,
    truncated: bool,
}

impl ResponseCollector {
    pub fn new(max_body_bytes: Option<u64>) -> Self {
        Self {
            max_body_bytes,
            ..Self::default()
        }
    }

    /// Header lines of the last response (status line first), without CRLF.
    pub fn header_lines(&self) -> &[String] {
        &self.header_lines
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// True if the body cap was hit and the transfer was aborted.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Splits the collector into header lines and body.
    pub fn into_parts(self) -> (Vec<String>, Vec<u8>) {
        (self.header_lines, self.body)
    }
}

impl curl::easy::Handler for ResponseCollector {
    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(s) = str::from_utf8(data) {
            let line = s.trim_end();
            if line.starts_with("HTTP/") {
                // New response (redirect hop or 100-continue): drop the previous block.
                self.header_lines.clear();
                self.body.clear();
            }
            if !line.is_empty() {
                self.header_lines.push(line.to_string());
            }
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        if let Some(max) = self.max_body_bytes {
            if self.body.len() as u64 + data.len() as u64 > max {
                self.truncated = true;
                return Ok(0);
            }
        }
        self.body.extend_from_slice(data);
        Ok(data.len())
    }
}
