use serde::Serialize;

use crate::error::{ParseError, Result};

/// The fields of a proxy-style request line:
/// `METHOD SP scheme://host[:port][/path] SP HTTP/x.y`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestLine {
    /// Method token, verbatim (case-sensitive).
    pub method: String,
    /// URI scheme, verbatim (e.g. `http`).
    pub protocol: String,
    /// Host, including brackets for IPv6 literals.
    pub host: String,
    /// Explicit port, or the scheme's well-known port when none was given.
    /// Empty for an unknown scheme without an explicit port.
    pub port: String,
    /// Path beginning with `/`, including any query string.
    pub path: String,
    /// Version token, e.g. `HTTP/1.1`.
    pub version: String,
}

impl RequestLine {
    /// Parse a request line without its terminator.
    ///
    /// # Errors
    ///
    /// Fails on the first violated rule; there is no partial result.
    pub fn parse(line: &str) -> Result<Self> {
        if line.is_empty() {
            return Err(ParseError::MissingMethod);
        }

        let mut tokens = line.split(' ');
        let (Some(method), Some(uri), Some(version), None) =
            (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(ParseError::MalformedLine(line.to_string()));
        };

        if method.is_empty() {
            return Err(ParseError::MissingMethod);
        }
        if method.contains(is_line_break) {
            return Err(ParseError::MalformedLine(line.to_string()));
        }

        let (protocol, host, port, path) = split_absolute_uri(uri)?;

        if !is_valid_version(version) {
            return Err(ParseError::InvalidVersion(version.to_string()));
        }

        let port = match port {
            Some(port) => port.to_string(),
            None => Self::default_port(protocol).unwrap_or_default().to_string(),
        };

        Ok(Self {
            method: method.to_string(),
            protocol: protocol.to_string(),
            host: host.to_string(),
            port,
            path: path.to_string(),
            version: version.to_string(),
        })
    }

    /// Well-known port for a scheme, compared case-insensitively.
    pub fn default_port(protocol: &str) -> Option<&'static str> {
        const DEFAULTS: [(&str, &str); 5] = [
            ("http", "80"),
            ("https", "443"),
            ("ws", "80"),
            ("wss", "443"),
            ("ftp", "21"),
        ];
        DEFAULTS
            .iter()
            .find(|(scheme, _)| scheme.eq_ignore_ascii_case(protocol))
            .map(|&(_, port)| port)
    }

    /// Whether the port is written out on serialization.
    ///
    /// An empty port or the scheme's default port is omitted.
    pub fn shows_port(&self) -> bool {
        !self.port.is_empty() && Self::default_port(&self.protocol) != Some(self.port.as_str())
    }

    /// Exact byte length of [`RequestLine::render_into`] output.
    pub fn rendered_len(&self) -> usize {
        let port_len = if self.shows_port() { 1 + self.port.len() } else { 0 };
        self.method.len()
            + 1
            + self.protocol.len()
            + 3
            + self.host.len()
            + port_len
            + self.path.len()
            + 1
            + self.version.len()
    }

    /// Append the rendered request line (without terminator).
    pub fn render_into(&self, out: &mut String) {
        out.push_str(&self.method);
        out.push(' ');
        out.push_str(&self.protocol);
        out.push_str("://");
        out.push_str(&self.host);
        if self.shows_port() {
            out.push(':');
            out.push_str(&self.port);
        }
        out.push_str(&self.path);
        out.push(' ');
        out.push_str(&self.version);
    }

    /// Render the request line into a new string.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.rendered_len());
        self.render_into(&mut out);
        out
    }
}

/// Split `scheme://authority[/path]` into `(scheme, host, port, path)`.
///
/// `port` is `None` when the authority has no `:` segment. `path` defaults
/// to `/` when the URI ends at the authority.
fn split_absolute_uri(uri: &str) -> Result<(&str, &str, Option<&str>, &str)> {
    if uri.is_empty() {
        return Err(ParseError::InvalidUri(uri.to_string()));
    }
    let Some((scheme, rest)) = uri.split_once("://") else {
        return Err(ParseError::InvalidUri(uri.to_string()));
    };
    if !is_valid_scheme(scheme) {
        return Err(ParseError::InvalidUri(uri.to_string()));
    }

    let host_end = if rest.starts_with('[') {
        // IPv6 literal: the host runs through the closing bracket.
        match rest.find(']') {
            Some(close) => close + 1,
            None => return Err(ParseError::InvalidHost(rest.to_string())),
        }
    } else {
        rest.find(['/', ':']).unwrap_or(rest.len())
    };

    let (host, rest) = rest.split_at(host_end);
    check_host(host)?;

    let (port, rest) = match rest.strip_prefix(':') {
        Some(after_colon) => {
            let port_end = after_colon.find('/').unwrap_or(after_colon.len());
            let (port, rest) = after_colon.split_at(port_end);
            check_port(port)?;
            (Some(port), rest)
        }
        None if rest.is_empty() || rest.starts_with('/') => (None, rest),
        // Anything else directly after a bracketed host.
        None => return Err(ParseError::InvalidHost(format!("{host}{rest}"))),
    };

    let path = if rest.is_empty() { "/" } else { rest };
    if path.contains(is_line_break) {
        return Err(ParseError::InvalidUri(uri.to_string()));
    }

    Ok((scheme, host, port, path))
}

/// Accept a host that renders and reparses as exactly itself.
///
/// A bracketed IPv6 literal may contain colons; any other host may not.
/// Whitespace, `/`, and stray brackets are rejected.
pub(crate) fn check_host(host: &str) -> Result<()> {
    let well_formed = !host.is_empty()
        && !host.contains(|c: char| c.is_ascii_whitespace() || c == '/')
        && match host.strip_prefix('[') {
            Some(inner) => inner
                .strip_suffix(']')
                .is_some_and(|addr| !addr.is_empty() && !addr.contains(['[', ']'])),
            None => !host.contains([':', '[', ']']),
        };
    if well_formed {
        Ok(())
    } else {
        Err(ParseError::InvalidHost(host.to_string()))
    }
}

/// Accept a non-empty, all-digit port.
pub(crate) fn check_port(port: &str) -> Result<()> {
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidPort(port.to_string()));
    }
    Ok(())
}

/// `scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
fn is_valid_scheme(scheme: &str) -> bool {
    let mut bytes = scheme.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
}

/// `HTTP/<digit>+.<digit>+`
fn is_valid_version(version: &str) -> bool {
    let Some(numbers) = version.strip_prefix("HTTP/") else {
        return false;
    };
    let Some((major, minor)) = numbers.split_once('.') else {
        return false;
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(major) && all_digits(minor)
}

#[inline]
fn is_line_break(c: char) -> bool {
    c == '\r' || c == '\n'
}

// ---------------------------------------------------------------------------
// Tests (unit)
// ---------------------------------------------------------------------------
