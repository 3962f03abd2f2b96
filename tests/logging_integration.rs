use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

// Runs the binary without an API key: startup logs the loaded
// configuration, then the key check fails the command, so the whole
// logging pipeline is exercised without any network access.
fn run_with_logging_env(
    log_output: &str,
    log_format: &str,
    log_file_path: Option<&Path>,
) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_groqsh"));
    cmd.args(["-p", "hi"])
        .env_remove("GROQ_API_KEY")
        .env("RUST_LOG", "groqsh=info")
        .env("LOG_OUTPUT", log_output)
        .env("LOG_FORMAT", log_format);

    if let Some(path) = log_file_path {
        cmd.env("LOG_FILE_PATH", path);
    } else {
        cmd.env_remove("LOG_FILE_PATH");
    }

    cmd.output().expect("failed to run groqsh binary")
}

fn temp_log_dir(suffix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(&format!("groqsh-logging-{suffix}-"))
        .tempdir()
        .expect("failed to create temp directory")
}

fn find_rotated_log_file(dir: &Path, base_file_name: &str) -> PathBuf {
    let expected_prefix = format!("{base_file_name}.");
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)
        .expect("failed to read temp directory")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(&expected_prefix))
                .unwrap_or(false)
        })
        .collect();

    matches.sort();
    matches
        .pop()
        .expect("expected a rotated log file to be created")
}

#[test]
fn json_format_emits_json_log_lines_on_stderr() {
    let output = run_with_logging_env("stderr", "json", None);
    assert!(
        !output.status.success(),
        "missing API key should fail the command"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    let json_lines: Vec<&str> = stderr
        .lines()
        .filter(|line| line.trim_start().starts_with('{'))
        .collect();
    assert!(
        !json_lines.is_empty(),
        "expected at least one JSON log line, got stderr:\n{stderr}"
    );

    let parsed: Vec<Value> = json_lines
        .iter()
        .map(|line| serde_json::from_str::<Value>(line).expect("line should be valid JSON"))
        .collect();
    assert!(
        parsed.iter().any(|entry| {
            entry
                .get("fields")
                .and_then(|fields| fields.get("message"))
                .and_then(Value::as_str)
                == Some("loaded runtime configuration")
        }),
        "expected startup log message in JSON output, got stderr:\n{stderr}"
    );
}

#[test]
fn file_output_writes_logs_to_rotated_file() {
    let dir = temp_log_dir("file");
    let log_path = dir.path().join("groqsh.log");
    let output = run_with_logging_env("file", "pretty", Some(&log_path));
    assert!(
        !output.status.success(),
        "missing API key should fail the command"
    );

    let rotated = find_rotated_log_file(dir.path(), "groqsh.log");
    let file_contents = fs::read_to_string(&rotated).expect("failed to read rotated log file");
    assert!(
        file_contents.contains("loaded runtime configuration"),
        "expected startup log message in file, got:\n{file_contents}"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("loaded runtime configuration"),
        "did not expect normal logs on stderr for file-only mode:\n{stderr}"
    );
}

#[test]
fn both_output_writes_logs_to_stderr_and_file() {
    let dir = temp_log_dir("both");
    let log_path = dir.path().join("groqsh.log");
    let output = run_with_logging_env("both", "pretty", Some(&log_path));
    assert!(
        !output.status.success(),
        "missing API key should fail the command"
    );

    let rotated = find_rotated_log_file(dir.path(), "groqsh.log");
    let file_contents = fs::read_to_string(&rotated).expect("failed to read rotated log file");
    assert!(
        file_contents.contains("loaded runtime configuration"),
        "expected startup log message in file, got:\n{file_contents}"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("loaded runtime configuration"),
        "expected startup log message on stderr, got:\n{stderr}"
    );
}

#[test]
fn invalid_file_path_falls_back_to_stderr_logging() {
    let dir = temp_log_dir("fallback");
    let blocking_file = dir.path().join("not-a-directory");
    fs::write(&blocking_file, "block").expect("failed to create blocking file");
    let log_path = blocking_file.join("groqsh.log");

    let output = run_with_logging_env("file", "pretty", Some(&log_path));
    assert!(
        !output.status.success(),
        "missing API key should fail the command"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to open log file"),
        "expected fallback warning, got:\n{stderr}"
    );
    assert!(
        stderr.contains("loaded runtime configuration"),
        "expected logs to continue on stderr after fallback, got:\n{stderr}"
    );
}

#[test]
fn missing_api_key_prints_guidance_and_exits_nonzero() {
    let output = run_with_logging_env("stderr", "pretty", None);
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("GROQ_API_KEY is not set"),
        "expected guidance, got:\n{stdout}"
    );
    assert!(stdout.contains("export GROQ_API_KEY"));
}
