use std::fmt;

use serde::Serialize;

use crate::config::ParserConfig;
use crate::error::{ParseError, Result};
use crate::header::{HeaderEntry, HeaderTable};
use crate::log::{Logger, NoopLogger};
use crate::request_line::{self, RequestLine};

const CRLF: &str = "\r\n";

/// A parsed, editable request head: request line plus header table.
///
/// A failed [`ParsedRequest::parse`] leaves the value partially populated;
/// parse again before relying on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedRequest {
    /// Request-line fields.
    #[serde(flatten)]
    pub line: RequestLine,
    headers: HeaderTable,
}

impl ParsedRequest {
    /// Create an empty request head.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a request head with the default [`ParserConfig`] and no logging.
    ///
    /// Returns the number of bytes consumed: everything up to and including
    /// the blank line that closes the header block, or the whole buffer when
    /// no blank line is present. Bytes after that offset are not examined.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] encountered.
    pub fn parse(&mut self, buffer: &[u8]) -> Result<usize> {
        self.parse_with(buffer, &ParserConfig::default(), &NoopLogger)
    }

    /// Parse a request head with explicit limits and a diagnostic logger.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] encountered.
    pub fn parse_with(
        &mut self,
        buffer: &[u8],
        config: &ParserConfig,
        logger: &dyn Logger,
    ) -> Result<usize> {
        let result = self.parse_inner(buffer, config, logger);
        if let Err(e) = &result {
            logger.log(&format!("request rejected: {e}"));
        }
        result
    }

    fn parse_inner(
        &mut self,
        buffer: &[u8],
        config: &ParserConfig,
        logger: &dyn Logger,
    ) -> Result<usize> {
        self.headers.clear();
        let head = head_slice(buffer, config.allow_bare_lf);
        let text = std::str::from_utf8(head).map_err(|_| ParseError::NonUtf8)?;
        let mut lines = Lines::new(text, config.allow_bare_lf);

        // `split` yields at least one item, so the request line always exists.
        let first = lines.next().unwrap_or_default();
        check_line_len(first, config)?;
        if !config.allow_bare_lf && first.contains('\n') {
            return Err(ParseError::MalformedLine(first.to_string()));
        }
        self.line = RequestLine::parse(first)?;
        logger.log(&format!(
            "request line: method={} host={} port={} path={}",
            self.line.method, self.line.host, self.line.port, self.line.path
        ));

        let mut header_lines = 0usize;
        for line in lines {
            if line.is_empty() {
                break;
            }
            check_line_len(line, config)?;
            header_lines += 1;
            if header_lines > config.max_headers_count {
                return Err(ParseError::TooManyHeaders);
            }
            if line.contains(['\r', '\n']) {
                return Err(ParseError::MalformedHeaderLine(line.to_string()));
            }

            let entry = HeaderEntry::parse_line(line)?;
            if self.headers.upsert(&entry.name, &entry.value) {
                logger.log(&format!("header overwritten: {}", entry.name));
            } else {
                logger.log(&format!("header stored: {}", entry.name));
            }
        }

        logger.log(&format!(
            "request head parsed: {} headers, {} bytes",
            self.headers.count(),
            head.len()
        ));
        Ok(head.len())
    }

    /// Render the full request head, ending with the blank line.
    pub fn unparse(&self) -> String {
        let mut out = String::with_capacity(self.total_len());
        self.unparse_into(&mut out);
        out
    }

    /// Append the full request head to `out`.
    pub fn unparse_into(&self, out: &mut String) {
        self.line.render_into(out);
        out.push_str(CRLF);
        self.headers.write_into(out);
        out.push_str(CRLF);
    }

    /// Render only the header lines; empty when there are no headers.
    pub fn unparse_headers(&self) -> String {
        let mut out = String::with_capacity(self.headers_len());
        self.unparse_headers_into(&mut out);
        out
    }

    /// Append only the header lines to `out`.
    pub fn unparse_headers_into(&self, out: &mut String) {
        self.headers.write_into(out);
    }

    /// Length of [`ParsedRequest::unparse`] output, computed without rendering.
    pub fn total_len(&self) -> usize {
        self.line.rendered_len() + CRLF.len() + self.headers_len() + CRLF.len()
    }

    /// Length of [`ParsedRequest::unparse_headers`] output.
    pub fn headers_len(&self) -> usize {
        self.headers.headers_len()
    }

    // ----- request-line rewrites --------------------------------------------

    /// Replace the host in the request line.
    ///
    /// # Errors
    ///
    /// [`ParseError::InvalidHost`] if the host is empty, contains whitespace
    /// or `/`, or contains `:` outside a bracketed IPv6 literal. The request
    /// is left unchanged.
    pub fn set_host(&mut self, host: &str) -> Result<()> {
        request_line::check_host(host)?;
        self.line.host = host.to_string();
        Ok(())
    }

    /// Replace the port in the request line.
    ///
    /// Setting the scheme's default port makes it disappear from the
    /// rendered URI.
    ///
    /// # Errors
    ///
    /// [`ParseError::InvalidPort`] if the port is empty or not all digits.
    pub fn set_port(&mut self, port: &str) -> Result<()> {
        request_line::check_port(port)?;
        self.line.port = port.to_string();
        Ok(())
    }

    // ----- header access ---------------------------------------------------

    /// Insert or overwrite a header. A new name is appended to the end.
    ///
    /// Leading spaces and tabs of the value are stripped, as they are when a
    /// header line is parsed.
    ///
    /// # Errors
    ///
    /// [`ParseError::InvalidHeaderName`] if the name is empty, contains a
    /// colon or line break, or has surrounding whitespace.
    /// [`ParseError::InvalidHeaderValue`] if the value contains a line break.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        if !is_settable_name(name) {
            return Err(ParseError::InvalidHeaderName(name.to_string()));
        }
        if value.contains(['\r', '\n']) {
            return Err(ParseError::InvalidHeaderValue(name.to_string()));
        }
        self.headers.upsert(name, value.trim_start_matches([' ', '\t']));
        Ok(())
    }

    /// Exact-match lookup. The reference cannot outlive the next mutation.
    pub fn get_header(&self, name: &str) -> Option<&HeaderEntry> {
        self.headers.lookup(name)
    }

    /// Value of the header with exactly this name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.lookup(name).map(|e| e.value.as_str())
    }

    /// Remove a header, keeping the order of the rest.
    ///
    /// # Errors
    ///
    /// [`ParseError::HeaderNotFound`] if no header has exactly this name.
    pub fn remove_header(&mut self, name: &str) -> Result<HeaderEntry> {
        self.headers.remove(name)
    }

    /// Number of distinct header names.
    pub fn header_count(&self) -> usize {
        self.headers.count()
    }

    /// The header table, in serialization order.
    pub fn headers(&self) -> &HeaderTable {
        &self.headers
    }
}

impl fmt::Display for ParsedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unparse())
    }
}

// ---------------------------------------------------------------------------
// Line splitting
// ---------------------------------------------------------------------------

/// The prefix of `buffer` that makes up the head, blank line included.
fn head_slice(buffer: &[u8], allow_bare_lf: bool) -> &[u8] {
    let mut start = 0;
    while start <= buffer.len() {
        let rest = &buffer[start..];
        let Some(lf) = rest.iter().position(|&b| b == b'\n') else {
            break;
        };
        let line = &rest[..lf];
        let terminated_by_crlf = line.last() == Some(&b'\r');
        let is_blank = if terminated_by_crlf {
            line.len() == 1
        } else {
            allow_bare_lf && line.is_empty()
        };
        // The request line itself is never the blank line.
        if is_blank && start > 0 {
            return &buffer[..start + lf + 1];
        }
        start += lf + 1;
    }
    buffer
}

/// Iterator over head lines without their terminators.
///
/// In strict mode only CRLF separates lines, so a stray `\n` stays inside
/// the line it appears in and is rejected there.
struct Lines<'a> {
    inner: std::str::Split<'a, &'static str>,
    allow_bare_lf: bool,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str, allow_bare_lf: bool) -> Self {
        let separator = if allow_bare_lf { "\n" } else { CRLF };
        Self {
            inner: text.split(separator),
            allow_bare_lf,
        }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let line = self.inner.next()?;
        if self.allow_bare_lf {
            Some(line.strip_suffix('\r').unwrap_or(line))
        } else {
            Some(line)
        }
    }
}

fn check_line_len(line: &str, config: &ParserConfig) -> Result<()> {
    if line.len() > config.max_line_len {
        return Err(ParseError::LineTooLong);
    }
    Ok(())
}

fn is_settable_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains([':', '\r', '\n'])
        && !name.starts_with([' ', '\t'])
        && !name.ends_with([' ', '\t'])
}

// ---------------------------------------------------------------------------
// Tests (unit)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_slice_stops_after_blank_line() {
        let raw = b"GET http://a/ HTTP/1.1\r\nHost: a\r\n\r\nBODY";
        let head = head_slice(raw, false);
        assert!(head.ends_with(b"\r\n\r\n"));
        assert_eq!(head.len(), raw.len() - 4);
    }

    #[test]
    fn head_slice_without_blank_line_is_whole_buffer() {
        let raw = b"GET http://a/ HTTP/1.1\r\nHost: a\r\n";
        assert_eq!(head_slice(raw, false), raw);
    }

    #[test]
    fn head_slice_ignores_bare_lf_in_strict_mode() {
        let raw = b"GET http://a/ HTTP/1.1\nHost: a\n\n";
        assert_eq!(head_slice(raw, false), raw);
        assert_eq!(head_slice(raw, true), raw);
        let with_body = b"GET http://a/ HTTP/1.1\nHost: a\n\nxyz";
        assert_eq!(head_slice(with_body, true).len(), with_body.len() - 3);
    }

    #[test]
    fn lines_lenient_strips_cr() {
        let lines: Vec<_> = Lines::new("a\r\nb\nc", true).collect();
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn lines_strict_keeps_bare_lf() {
        let lines: Vec<_> = Lines::new("a\r\nb\nc\r\n", false).collect();
        assert_eq!(lines, vec!["a", "b\nc", ""]);
    }

    #[test]
    fn settable_names() {
        assert!(is_settable_name("X-Forwarded-For"));
        assert!(!is_settable_name(""));
        assert!(!is_settable_name("A:B"));
        assert!(!is_settable_name(" A"));
        assert!(!is_settable_name("A\r\nB"));
    }

    #[test]
    fn logger_sees_rejection() {
        use std::cell::RefCell;

        let seen = RefCell::new(Vec::new());
        let logger = |m: &str| seen.borrow_mut().push(m.to_string());
        let mut req = ParsedRequest::new();
        let result = req.parse_with(
            b"GET http://a.com/ HTTP/1.1\r\nX-Broken\r\n\r\n",
            &ParserConfig::default(),
            &logger,
        );
        assert!(result.is_err());
        let seen = seen.borrow();
        assert!(seen.iter().any(|m| m.starts_with("request line:")));
        assert!(seen.last().unwrap().starts_with("request rejected:"));
    }
}
