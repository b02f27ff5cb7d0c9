//! Interpreting raw response header lines.
//!
//! The scheduler hands out a [`HeaderParser`] through
//! [`crate::scheduler::Scheduler::header_parser`]; channels and callers use it
//! to make sense of the header lines a [`crate::channel::ResponseCollector`] kept.

mod parse;

pub use parse::parse_header_lines;

/// Fields of one response header block that callers commonly need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    /// Status code from the `HTTP/x y` line.
    pub status: Option<u32>,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    /// `ETag` without surrounding quotes.
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    /// Raw `Content-Disposition` value.
    pub content_disposition: Option<String>,
}

/// Turns header lines into a [`ResponseHead`].
pub trait HeaderParser {
    fn parse(&self, lines: &[String]) -> ResponseHead;
}

/// Default parser: case-insensitive names, last status line wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardHeaderParser;

impl HeaderParser for StandardHeaderParser {
    fn parse(&self, lines: &[String]) -> ResponseHead {
        parse_header_lines(lines)
    }
}
