use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

const DEFAULT_LOG_FILTER: &str = "warn,groqsh=info";
const DEFAULT_LOG_FILE_PATH: &str = "logs/groqsh.log";

// Keeps the non-blocking appender alive for the process lifetime.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogOutput {
    Stderr,
    File,
    Both,
}

#[derive(Debug)]
struct Settings {
    format: LogFormat,
    output: LogOutput,
    file_path: PathBuf,
}

fn parse_settings(
    format: Option<&str>,
    output: Option<&str>,
    file_path: Option<&str>,
) -> Settings {
    let format = match format.unwrap_or("pretty").trim().to_ascii_lowercase().as_str() {
        "json" => LogFormat::Json,
        _ => LogFormat::Pretty,
    };
    let output = match output.unwrap_or("stderr").trim().to_ascii_lowercase().as_str() {
        "file" => LogOutput::File,
        "both" => LogOutput::Both,
        _ => LogOutput::Stderr,
    };
    let file_path = file_path
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE_PATH));

    Settings {
        format,
        output,
        file_path,
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn file_writer(path: &Path) -> std::io::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| std::ffi::OsStr::new("groqsh.log"));

    fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

fn try_init(format: LogFormat, writer: BoxMakeWriter) -> bool {
    let result = match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(writer)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter())
            .with_writer(writer)
            .try_init(),
    };
    result.is_ok()
}

/// Initialize the tracing subscriber from `LOG_FORMAT`, `LOG_OUTPUT`,
/// and `LOG_FILE_PATH`. A subscriber that cannot be set up (bad file
/// path, already-initialized registry) falls back to stderr and never
/// aborts the CLI.
pub fn init() {
    let settings = parse_settings(
        env::var("LOG_FORMAT").ok().as_deref(),
        env::var("LOG_OUTPUT").ok().as_deref(),
        env::var("LOG_FILE_PATH").ok().as_deref(),
    );

    match settings.output {
        LogOutput::Stderr => {
            try_init(settings.format, BoxMakeWriter::new(std::io::stderr));
        }
        LogOutput::File | LogOutput::Both => match file_writer(&settings.file_path) {
            Ok((file, guard)) => {
                let writer = if settings.output == LogOutput::Both {
                    BoxMakeWriter::new(std::io::stderr.and(file))
                } else {
                    BoxMakeWriter::new(file)
                };
                if try_init(settings.format, writer) {
                    let _ = LOG_GUARD.set(guard);
                }
            }
            Err(err) => {
                eprintln!(
                    "groqsh: failed to open log file '{}': {}; logging to stderr",
                    settings.file_path.display(),
                    err
                );
                try_init(settings.format, BoxMakeWriter::new(std::io::stderr));
            }
        },
    }
}
