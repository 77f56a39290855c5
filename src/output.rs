use crate::request::ParsedRequest;

/// Serialize a [`ParsedRequest`] to a JSON string.
///
/// When `pretty` is `true` the output is indented for readability.
pub fn format_json(request: &ParsedRequest, pretty: bool) -> String {
    let result = if pretty {
        serde_json::to_string_pretty(request)
    } else {
        serde_json::to_string(request)
    };
    result.unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

/// Render a [`ParsedRequest`] in a human-readable debug format.
pub fn format_debug(request: &ParsedRequest) -> String {
    let line = &request.line;
    let mut out = String::with_capacity(256);

    out.push_str("=== Request Head ===\n");
    out.push_str(&format!("Method:   {}\n", line.method));
    out.push_str(&format!("Protocol: {}\n", line.protocol));
    out.push_str(&format!("Host:     {}\n", line.host));
    out.push_str(&format!("Port:     {}\n", line.port));
    out.push_str(&format!("Path:     {}\n", line.path));
    out.push_str(&format!("Version:  {}\n", line.version));

    out.push_str(&format!("\n--- Headers ({}) ---\n", request.header_count()));
    for header in request.headers() {
        out.push_str(&format!("  {}: {}\n", header.name, header.value));
    }

    out.push_str(&format!("\n--- Wire length: {} bytes ---\n", request.total_len()));
    out.push_str("====================\n");
    out
}
