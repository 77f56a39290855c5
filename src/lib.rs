//! # proxyparse
//!
//! Parses the head of a proxy-style HTTP/1.x request (an absolute-URI request
//! line followed by `Name: Value` header lines) into an editable
//! [`ParsedRequest`], and renders it back to wire bytes.
//!
//! An untouched request re-serializes byte-for-byte, header order included,
//! and [`ParsedRequest::total_len`] always equals the length of
//! [`ParsedRequest::unparse`], so a forwarding proxy can size its transmit
//! buffer before rendering.
//!
//! ## Quick start
//!
//! ```rust
//! use proxyparse::parse_request;
//!
//! let raw = b"GET http://www.example.com:8080/path HTTP/1.1\r\nHost: www.example.com\r\n\r\n";
//! let mut request = parse_request(raw).expect("valid request");
//! assert_eq!(request.line.host, "www.example.com");
//! assert_eq!(request.line.port, "8080");
//! assert_eq!(request.unparse().as_bytes(), raw);
//!
//! request.set_header("Connection", "close").unwrap();
//! request.remove_header("Host").unwrap();
//! assert_eq!(request.total_len(), request.unparse().len());
//! ```
//!
//! ## Diagnostics
//!
//! Parsing never logs on its own. Pass a [`Logger`] to
//! [`ParsedRequest::parse_with`], for example [`TracingLogger`] to route
//! messages through `tracing`.

mod config;
mod error;
mod header;
mod log;
mod output;
mod request;
mod request_line;

// Re-export public API.
pub use config::ParserConfig;
pub use error::{ParseError, Result};
pub use header::{HeaderEntry, HeaderTable};
pub use log::{Logger, NoopLogger, TracingLogger};
pub use output::{format_debug, format_json};
pub use request::ParsedRequest;
pub use request_line::RequestLine;

/// Parse a request head from a byte slice in one call.
///
/// Bytes after the blank line that ends the head are ignored.
///
/// # Errors
///
/// Returns [`ParseError`] if the head is malformed.
pub fn parse_request(data: &[u8]) -> Result<ParsedRequest> {
    let mut request = ParsedRequest::new();
    request.parse(data)?;
    Ok(request)
}

/// Parse a request head using custom [`ParserConfig`] limits.
///
/// # Errors
///
/// Returns [`ParseError`] if the head is malformed or exceeds the
/// configured limits.
pub fn parse_request_with_config(data: &[u8], config: ParserConfig) -> Result<ParsedRequest> {
    let mut request = ParsedRequest::new();
    request.parse_with(data, &config, &NoopLogger)?;
    Ok(request)
}
