use serde::Deserialize;

/// Limits and line-ending policy for request-head parsing.
///
/// All sizes are in bytes unless stated otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum length of any single head line, excluding its terminator (default: 8 192).
    pub max_line_len: usize,
    /// Maximum number of header lines (default: 128).
    pub max_headers_count: usize,
    /// Accept a bare `\n` as a line terminator (default: `false`, CRLF only).
    ///
    /// Serialization always emits CRLF regardless of this setting.
    pub allow_bare_lf: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_line_len: 8_192,
            max_headers_count: 128,
            allow_bare_lf: false,
        }
    }
}
