use thiserror::Error;

/// Errors produced while parsing a request head or editing its headers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The request line does not split into exactly three space-separated tokens.
    #[error("malformed request line: '{0}'")]
    MalformedLine(String),
    /// The request line has an empty method token.
    #[error("missing request method")]
    MissingMethod,
    /// The request URI has no `<scheme>://` prefix or an invalid scheme.
    #[error("invalid request URI: '{0}'")]
    InvalidUri(String),
    /// The authority part of the URI has an empty or malformed host.
    #[error("invalid host in request URI: '{0}'")]
    InvalidHost(String),
    /// The explicit port is empty or contains non-digits.
    #[error("invalid port in request URI: '{0}'")]
    InvalidPort(String),
    /// The version token is not `HTTP/<digits>.<digits>`.
    #[error("invalid HTTP version: '{0}'")]
    InvalidVersion(String),
    /// A header line has no colon or a badly delimited name.
    #[error("malformed header line: '{0}'")]
    MalformedHeaderLine(String),
    /// A header name passed to `set_header` is empty or unsafe to serialize.
    #[error("invalid header name: '{0}'")]
    InvalidHeaderName(String),
    /// A header value passed to `set_header` contains a line terminator.
    #[error("invalid header value for '{0}'")]
    InvalidHeaderValue(String),
    /// No header with this exact name exists.
    #[error("header not found: '{0}'")]
    HeaderNotFound(String),
    /// The request head is not valid UTF-8.
    #[error("request head is not valid UTF-8")]
    NonUtf8,
    /// A head line exceeds the configured maximum length.
    #[error("line exceeds maximum allowed length")]
    LineTooLong,
    /// The number of header lines exceeds the configured maximum.
    #[error("number of headers exceeds maximum")]
    TooManyHeaders,
}

pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offending_text() {
        let err = ParseError::InvalidPort("80x".into());
        assert_eq!(err.to_string(), "invalid port in request URI: '80x'");
    }

    #[test]
    fn unit_variants_have_messages() {
        assert_eq!(ParseError::MissingMethod.to_string(), "missing request method");
        assert_eq!(
            ParseError::NonUtf8.to_string(),
            "request head is not valid UTF-8"
        );
    }
}
