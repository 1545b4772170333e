//! Purpose: `jsonlens` CLI entry point.
//! Role: Binary crate root; loads one document, navigates, coerces, emits JSON on stdout.
//! Invariants: Output on stdout is always a single JSON value (`null` when absent).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::ffi::OsString;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::{Parser, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::EnvFilter;

mod color_json;

use color_json::colorize_json;
use jsonlens::api::{
    Accessor, CallbackQueue, CoercionError, DynamicValue, Error, ErrorKind, Request, Target,
    Transport, decode, to_exit_code,
};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse_from(std::env::args_os().collect::<Vec<OsString>>()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                return Ok(RunOutcome::with_code(0));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `jsonlens --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    let value = evaluate(&cli).map_err(|err| (err, color_mode))?;
    emit_json(&value, color_mode);
    Ok(RunOutcome::ok())
}

#[derive(Parser)]
#[command(
    name = "jsonlens",
    version,
    about = "Read one JSON document and pull a typed value out of it",
    after_help = r#"EXAMPLES
  $ jsonlens --file post.json --path author.name --as string
  $ echo '{"n":"12"}' | jsonlens --path n --as int
  $ jsonlens --url https://example.com/doc.json --path items.0 --as dict
  $ jsonlens --file doc.json --path at --as date --date-format "yyyy/MM/dd"

NOTES
  - Absent or unconvertible values print `null`; add --strict to fail instead.
  - Dot-path segments index arrays when they are non-negative integers."#
)]
struct Cli {
    #[arg(
        long,
        value_hint = ValueHint::FilePath,
        conflicts_with = "url",
        help = "Read the document from a file (default: stdin)"
    )]
    file: Option<PathBuf>,

    #[arg(long, value_hint = ValueHint::Url, help = "Fetch the document over http(s)")]
    url: Option<String>,

    #[arg(
        long = "header",
        value_name = "NAME:VALUE",
        requires = "url",
        help = "Extra request header for --url (repeatable)"
    )]
    headers: Vec<String>,

    #[arg(long, help = "Dot-separated key path to navigate before coercing")]
    path: Option<String>,

    #[arg(
        long = "as",
        value_enum,
        default_value = "json",
        help = "Coerce the selected value to this type"
    )]
    as_type: OutputAs,

    #[arg(
        long = "date-format",
        value_name = "PATTERN",
        help = "Custom date pattern tried before the built-in styles (repeatable)"
    )]
    date_formats: Vec<String>,

    #[arg(long, help = "Exit with a coercion error instead of printing null")]
    strict: bool,

    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics and pretty JSON output: auto|always|never"
    )]
    color: ColorMode,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputAs {
    String,
    Double,
    Int,
    Float,
    Bool,
    Date,
    Dict,
    Json,
}

impl OutputAs {
    fn target(self) -> Target {
        match self {
            OutputAs::String => Target::String,
            OutputAs::Double => Target::Double,
            OutputAs::Int => Target::Int,
            OutputAs::Float => Target::Float,
            OutputAs::Bool => Target::Bool,
            OutputAs::Date => Target::Date,
            OutputAs::Dict => Target::Dictionary,
            OutputAs::Json => Target::Custom("Json"),
        }
    }
}

fn evaluate(cli: &Cli) -> Result<DynamicValue, Error> {
    let document = load_document(cli)?;
    let mut root = Accessor::new(&document);
    for pattern in &cli.date_formats {
        root.register_date_format(pattern.as_str());
    }
    let selected = match cli.path.as_deref() {
        Some(path) => root.path(path),
        None => root,
    };
    let coerced = coerce(&selected, cli.as_type)?;
    match coerced {
        Some(value) => Ok(value),
        None if cli.strict => Err(CoercionError::new(cli.as_type.target()).into()),
        None => {
            tracing::debug!(target_type = ?cli.as_type, "value absent or not convertible");
            Ok(DynamicValue::Null)
        }
    }
}

fn coerce(accessor: &Accessor<'_>, as_type: OutputAs) -> Result<Option<DynamicValue>, Error> {
    let value = match as_type {
        OutputAs::String => accessor.as_string().map(DynamicValue::from),
        OutputAs::Double => accessor.as_f64().map(DynamicValue::from),
        OutputAs::Int => accessor.as_i64().map(DynamicValue::from),
        OutputAs::Float => accessor.as_f32().map(|n| DynamicValue::from(f64::from(n))),
        OutputAs::Bool => accessor.as_bool().map(DynamicValue::from),
        OutputAs::Date => match accessor.as_date() {
            Some(date) => Some(DynamicValue::from(date.format(&Rfc3339).map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("failed to format date")
                    .with_source(err)
            })?)),
            None => None,
        },
        OutputAs::Dict => accessor.as_map().cloned().map(DynamicValue::Map),
        OutputAs::Json => accessor.value().cloned(),
    };
    Ok(value)
}

fn load_document(cli: &Cli) -> Result<DynamicValue, Error> {
    if let Some(url) = cli.url.as_deref() {
        return fetch_document(url, &cli.headers);
    }
    if let Some(path) = cli.file.as_deref() {
        let bytes = read_file(path)?;
        return decode(&bytes, &format!("file {}", path.display()));
    }
    let mut bytes = Vec::new();
    io::stdin().read_to_end(&mut bytes).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read stdin")
            .with_source(err)
    })?;
    decode(&bytes, "stdin")
}

fn read_file(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|err| {
        let kind = match err.kind() {
            io::ErrorKind::NotFound => ErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => ErrorKind::Permission,
            _ => ErrorKind::Io,
        };
        Error::new(kind)
            .with_message(format!("failed to read {}", path.display()))
            .with_source(err)
    })
}

/// Fetches on a worker and drains the completion on this thread.
fn fetch_document(url: &str, headers: &[String]) -> Result<DynamicValue, Error> {
    let mut request = Request::get(url)?;
    for raw in headers {
        let (name, value) = parse_header(raw)?;
        request = request.with_header(name, value);
    }

    let queue = CallbackQueue::new();
    let slot: Arc<Mutex<Option<Result<DynamicValue, Error>>>> = Arc::new(Mutex::new(None));
    let delivered = slot.clone();
    let handle = Transport::new().fetch_json(request, queue.sender(), move |outcome| {
        if let Ok(mut guard) = delivered.lock() {
            *guard = Some(outcome);
        }
    })?;
    handle.join()?;
    queue.run_pending();

    let outcome = slot.lock().ok().and_then(|mut guard| guard.take());
    outcome.unwrap_or_else(|| {
        Err(Error::new(ErrorKind::Internal).with_message("fetch completed without a result"))
    })
}

fn parse_header(raw: &str) -> Result<(String, String), Error> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(Error::new(ErrorKind::Usage)
            .with_message(format!("invalid header: {raw}"))
            .with_hint("Use --header 'Name: value'.")),
    }
}

fn emit_json(value: &DynamicValue, color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let use_color = color_mode.use_color(is_tty);
    let pretty = is_tty || use_color;
    let json = if pretty {
        colorize_json(value, use_color)
    } else {
        value.canonical_text()
    };
    println!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Decode => "invalid document".to_string(),
        ErrorKind::Coercion => "conversion failed".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(url) = err.url() {
        inner.insert("url".to_string(), json!(url));
    }
    if let Some(status) = err.status() {
        inner.insert("status".to_string(), json!(status));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(url) = err.url() {
        lines.push(format!(
            "{} {url}",
            colorize_label("url:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
