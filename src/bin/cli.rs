use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser as ClapParser};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use proxyparse::{
    NoopLogger, ParsedRequest, ParserConfig, TracingLogger, format_debug, format_json,
};

/// proxyparse CLI: parse, rewrite and re-serialize a proxy request head.
///
/// Reads a raw request head from a file, --raw string, or stdin, applies
/// any header rewrites, and prints the result in the chosen format.
///
/// Escape sequences (\r, \n, \t, \\) in the --raw value are interpreted so
/// you can pass a full request head as a single shell argument.
#[derive(ClapParser)]
#[command(name = "proxyparse-cli", version, about, long_about = None)]
struct Cli {
    /// Path to a file containing a raw request head.
    /// Reads from stdin when neither FILE nor --raw is given.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Raw request string (escape sequences \r \n \t \\ are expanded).
    #[arg(long)]
    raw: Option<String>,

    /// Output format.
    #[arg(short, long, default_value = "wire", value_enum)]
    format: OutputFormat,

    /// Pretty-print JSON output (ignored for other formats).
    #[arg(short, long)]
    pretty: bool,

    /// Set or overwrite a header, as NAME:VALUE. May be repeated.
    #[arg(long = "set", value_name = "NAME:VALUE")]
    set_headers: Vec<String>,

    /// Remove a header by exact name. May be repeated.
    #[arg(long = "remove", value_name = "NAME")]
    remove_headers: Vec<String>,

    /// Rewrite the host in the request line.
    #[arg(long)]
    host: Option<String>,

    /// Rewrite the port in the request line.
    #[arg(long)]
    port: Option<String>,

    /// Accept bare LF line endings.
    #[arg(long)]
    lenient: bool,

    /// Maximum number of header lines allowed.
    #[arg(long, default_value = "128")]
    max_headers: usize,

    /// Maximum length of a single head line in bytes.
    #[arg(long, default_value = "8192")]
    max_line_len: usize,

    /// Log parser diagnostics to stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    /// Re-serialized request head
    Wire,
    /// JSON output
    Json,
    /// Human-readable debug output
    Debug,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // When no input source is provided and stdin is a terminal (not piped),
    // show help instead of blocking.
    if cli.file.is_none() && cli.raw.is_none() && std::io::stdin().is_terminal() {
        Cli::command().print_help().ok();
        println!();
        process::exit(0);
    }

    let data = match read_input(&cli) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading input: {e}");
            process::exit(1);
        }
    };

    if data.is_empty() {
        eprintln!("Error: empty input");
        process::exit(1);
    }

    let config = ParserConfig {
        max_headers_count: cli.max_headers,
        max_line_len: cli.max_line_len,
        allow_bare_lf: cli.lenient,
    };

    let mut request = ParsedRequest::new();
    let parsed = if cli.verbose {
        request.parse_with(&data, &config, &TracingLogger)
    } else {
        request.parse_with(&data, &config, &NoopLogger)
    };
    let consumed = match parsed {
        Ok(n) => n,
        Err(e) => {
            eprintln!("Parse error: {e}");
            process::exit(2);
        }
    };
    if consumed < data.len() {
        tracing::info!(body_bytes = data.len() - consumed, "ignoring bytes after request head");
    }

    if let Err(e) = apply_rewrites(&cli, &mut request) {
        eprintln!("Rewrite error: {e}");
        process::exit(3);
    }

    let output = match cli.format {
        OutputFormat::Wire => request.unparse(),
        OutputFormat::Json => format_json(&request, cli.pretty),
        OutputFormat::Debug => format_debug(&request),
    };

    print!("{output}");
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "proxyparse=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Apply removals, then sets, then the host and port rewrites.
fn apply_rewrites(cli: &Cli, request: &mut ParsedRequest) -> Result<(), String> {
    for name in &cli.remove_headers {
        request.remove_header(name).map_err(|e| e.to_string())?;
        tracing::debug!(header = %name, "removed header");
    }

    for pair in &cli.set_headers {
        let (name, value) = pair
            .split_once(':')
            .ok_or_else(|| format!("expected NAME:VALUE, got '{pair}'"))?;
        request
            .set_header(name, value.trim_start())
            .map_err(|e| e.to_string())?;
        tracing::debug!(header = %name, "set header");
    }

    if let Some(host) = &cli.host {
        request.set_host(host).map_err(|e| e.to_string())?;
        tracing::debug!(%host, "rewrote host");
    }
    if let Some(port) = &cli.port {
        request.set_port(port).map_err(|e| e.to_string())?;
        tracing::debug!(%port, "rewrote port");
    }

    Ok(())
}

/// Pick the input source: `--raw` wins over FILE, stdin is the fallback.
fn read_input(cli: &Cli) -> std::io::Result<Vec<u8>> {
    match (&cli.raw, &cli.file) {
        (Some(raw), _) => Ok(unescape(raw).into_bytes()),
        (None, Some(path)) => std::fs::read(path),
        (None, None) => {
            let mut head = Vec::with_capacity(1024);
            std::io::stdin().lock().read_to_end(&mut head)?;
            Ok(head)
        }
    }
}

/// Expand `\r`, `\n`, `\t` and `\\` in a shell argument.
///
/// Unknown escapes, and a lone trailing backslash, are kept literally.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_backslash = false;
    for ch in s.chars() {
        if !pending_backslash {
            if ch == '\\' {
                pending_backslash = true;
            } else {
                out.push(ch);
            }
            continue;
        }
        pending_backslash = false;
        match escaped(ch) {
            Some(c) => out.push(c),
            None => {
                out.push('\\');
                out.push(ch);
            }
        }
    }
    if pending_backslash {
        out.push('\\');
    }
    out
}

fn escaped(ch: char) -> Option<char> {
    match ch {
        'r' => Some('\r'),
        'n' => Some('\n'),
        't' => Some('\t'),
        '\\' => Some('\\'),
        _ => None,
    }
}
