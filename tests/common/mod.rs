//! Shared harness for running the `hostwatch` binary in integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

/// Captured outcome of one CLI invocation.
pub struct CliResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    /// Per-case transcript, kept for post-mortem inspection.
    pub log_path: PathBuf,
}

/// Run the binary with `args` under a pinned `TZ=UTC` and record the
/// transcript to `<target tmpdir>/cli-cases/<name>.log`.
pub fn run_cli_case(name: &str, args: &[&str]) -> CliResult {
    run_cli_case_in_zone(name, "UTC", args)
}

/// Like [`run_cli_case`], with the host time zone set to `tz`.
pub fn run_cli_case_in_zone(name: &str, tz: &str, args: &[&str]) -> CliResult {
    let output = Command::new(env!("CARGO_BIN_EXE_hostwatch"))
        .args(args)
        .env("TZ", tz)
        .env_remove("RUST_LOG")
        .env_remove("CLICOLOR_FORCE")
        .output()
        .expect("spawn hostwatch");

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    let log_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("cli-cases");
    fs::create_dir_all(&log_dir).expect("create log dir");
    let log_path = log_dir.join(format!("{name}.log"));
    let transcript = format!(
        "TZ={tz} args: {args:?}\nstatus: {}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}\n",
        output.status
    );
    fs::write(&log_path, transcript).expect("write case log");

    CliResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}
