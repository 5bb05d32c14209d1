use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

const DEFAULT_LOG_FILTER: &str = "warn,covera=info";
const DEFAULT_LOG_FILE_PATH: &str = "logs/covera.log";

type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

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

fn parse_log_format(raw: Option<&str>) -> LogFormat {
    match raw.unwrap_or("pretty").trim().to_ascii_lowercase().as_str() {
        "json" => LogFormat::Json,
        _ => LogFormat::Pretty,
    }
}

fn parse_log_output(raw: Option<&str>) -> LogOutput {
    match raw.unwrap_or("stderr").trim().to_ascii_lowercase().as_str() {
        "file" => LogOutput::File,
        "both" => LogOutput::Both,
        _ => LogOutput::Stderr,
    }
}

fn parse_log_file_path(raw: Option<&str>) -> PathBuf {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE_PATH))
}

fn env_filter_from_env() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn build_writer(output: LogOutput, file_path: &Path) -> (BoxMakeWriter, Option<WorkerGuard>) {
    let stderr = BoxMakeWriter::new(std::io::stderr);
    if output == LogOutput::Stderr {
        return (stderr, None);
    }

    let dir = file_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = file_path
        .file_name()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| std::ffi::OsStr::new("covera.log"));

    if let Err(err) = fs::create_dir_all(dir) {
        eprintln!(
            "covera: failed to prepare log directory '{}': {}; using stderr instead",
            dir.display(),
            err
        );
        return (stderr, None);
    }

    let appender = tracing_appender::rolling::daily(dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let writer = match output {
        LogOutput::File => BoxMakeWriter::new(file_writer),
        _ => BoxMakeWriter::new(std::io::stderr.and(file_writer)),
    };
    (writer, Some(guard))
}

fn init_with_writer(format: LogFormat, writer: BoxMakeWriter) -> InitResult {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(env_filter_from_env())
            .with_writer(writer)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter_from_env())
            .with_writer(writer)
            .try_init(),
    }
}

/// Installs the global subscriber. The returned guard keeps the
/// non-blocking file appender flushing; hold it until shutdown.
pub fn init() -> Option<WorkerGuard> {
    let format = parse_log_format(env::var("LOG_FORMAT").ok().as_deref());
    let output = parse_log_output(env::var("LOG_OUTPUT").ok().as_deref());
    let file_path = parse_log_file_path(env::var("LOG_FILE_PATH").ok().as_deref());

    let (writer, guard) = build_writer(output, &file_path);
    let _ = init_with_writer(format, writer);
    guard
}
