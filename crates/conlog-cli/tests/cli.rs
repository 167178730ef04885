//! End-to-end tests driving the `conlog` binary.
//!
//! Every test points `CONLOG_HOME` at a scratch directory so the user's
//! own configuration is never read.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use flate2::read::GzDecoder;
use tempfile::TempDir;

fn conlog(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_conlog"));
    cmd.env("CONLOG_HOME", home)
        .env_remove("CONLOG_LEVEL")
        .env_remove("CONLOG_TRACE");
    cmd
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("failed to run conlog")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

#[test]
fn test_log_reaches_console_and_file() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("app.log");

    let output = run(conlog(home.path())
        .arg("--file")
        .arg(&file)
        .args(["log", "--level", "warn", "low", "disk"]));

    assert!(output.status.success());
    assert!(stdout(&output).contains("low disk"));
    let content = fs::read_to_string(&file).unwrap();
    assert!(content.ends_with(" [WARN]  low disk\n"));
}

#[test]
fn test_split_levels_from_config_file() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("app.log");
    fs::write(
        home.path().join("config.toml"),
        format!(
            "path = {:?}\nwrite_level = \"info\"\nprint_level = \"warn\"\n",
            file.to_str().unwrap()
        ),
    )
    .unwrap();

    let debug = run(conlog(home.path()).args(["log", "--level", "debug", "x"]));
    assert!(debug.status.success());
    assert_eq!(stdout(&debug), "");
    assert_eq!(fs::read_to_string(&file).unwrap(), "");

    let info = run(conlog(home.path()).args(["log", "--level", "info", "started"]));
    assert!(info.status.success());
    assert_eq!(stdout(&info), "");
    assert!(fs::read_to_string(&file).unwrap().ends_with(" [INFO]  started\n"));
}

#[test]
fn test_env_level_overrides_config() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("app.log");

    let output = run(conlog(home.path())
        .env("CONLOG_LEVEL", "error")
        .arg("--file")
        .arg(&file)
        .args(["log", "--level", "info", "quiet"]));

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&file).unwrap(), "");
}

#[test]
fn test_fatal_exits_with_status_one() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("app.log");

    let output = run(conlog(home.path())
        .env("CONLOG_LEVEL", "none")
        .arg("--file")
        .arg(&file)
        .args(["fatal", "out", "of", "memory"]));

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("[FATAL] out of memory"));
    assert!(fs::read_to_string(&file)
        .unwrap()
        .ends_with(" [FATAL] out of memory\n"));
}

#[test]
fn test_rotate_produces_dated_gzip() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("app.log");
    let archive = home.path().join("archive");

    run(conlog(home.path())
        .arg("--file")
        .arg(&file)
        .args(["log", "first"]));
    let before = fs::read(&file).unwrap();
    assert!(!before.is_empty());

    let output = run(conlog(home.path())
        .arg("--file")
        .arg(&file)
        .arg("rotate")
        .arg(&archive));
    assert!(output.status.success());

    let artifact = archive.join(format!("log.{}.gz", today()));
    assert!(stdout(&output).contains("Rotated to"));
    let mut decoder = GzDecoder::new(File::open(&artifact).unwrap());
    let mut restored = Vec::new();
    decoder.read_to_end(&mut restored).unwrap();
    assert_eq!(restored, before);
    assert_eq!(
        decoder.header().unwrap().filename(),
        Some("console.log".as_bytes())
    );

    assert_eq!(fs::read(&file).unwrap().len(), 0);
}

#[test]
fn test_rotate_rename_mode() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("app.log");

    run(conlog(home.path())
        .arg("--file")
        .arg(&file)
        .args(["log", "kept"]));
    let output = run(conlog(home.path())
        .arg("--file")
        .arg(&file)
        .arg("--rename")
        .arg("rotate")
        .arg(home.path()));
    assert!(output.status.success());

    let artifact = home.path().join(format!("log.{}", today()));
    assert!(fs::read_to_string(artifact).unwrap().contains("[INFO]  kept"));
}

#[test]
fn test_rotate_without_file_is_noop() {
    let home = TempDir::new().unwrap();
    let dest = home.path().join("archive");

    let output = run(conlog(home.path()).arg("rotate").arg(&dest));

    assert!(output.status.success());
    assert!(stdout(&output).contains("nothing to rotate"));
    assert!(!dest.exists());
}

#[test]
fn test_unopenable_file_fails() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("missing").join("app.log");

    let output = run(conlog(home.path())
        .arg("--file")
        .arg(&file)
        .args(["log", "hello"]));

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to open log file"));
}

#[test]
fn test_config_prints_resolved_toml() {
    let home = TempDir::new().unwrap();

    let output = run(conlog(home.path())
        .env("CONLOG_LEVEL", "debug")
        .arg("--rename")
        .arg("config"));

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("write_level = \"debug\""));
    assert!(text.contains("rotation = \"rename\""));
}

/// Spawn with stdout connected to a pipe whose read end is already closed.
fn run_with_closed_stdout(cmd: &mut Command) -> std::process::ExitStatus {
    let mut child = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn conlog");
    drop(child.stdout.take());
    child.wait().expect("failed to wait for conlog")
}

#[test]
fn test_closed_stdout_still_reaches_file() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("app.log");

    let status = run_with_closed_stdout(conlog(home.path())
        .arg("--file")
        .arg(&file)
        .args(["log", "--level", "warn", "hello"]));

    assert_eq!(status.code(), Some(0));
    assert!(fs::read_to_string(&file)
        .unwrap()
        .ends_with(" [WARN]  hello\n"));
}

#[test]
fn test_fatal_with_closed_stdout_exits_one() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("app.log");

    let status = run_with_closed_stdout(conlog(home.path())
        .arg("--file")
        .arg(&file)
        .args(["fatal", "boom"]));

    assert_eq!(status.code(), Some(1));
    assert!(fs::read_to_string(&file)
        .unwrap()
        .ends_with(" [FATAL] boom\n"));
}

#[test]
fn test_fatal_flushes_trace_events() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("app.log");

    let output = run(conlog(home.path())
        .env("CONLOG_TRACE", "debug")
        .arg("--file")
        .arg(&file)
        .args(["fatal", "boom"]));

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("resolved configuration"));
}
