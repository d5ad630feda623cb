// Shared helpers for integration tests: spawn the real binary with a
// scratch $HOME so decision logs and daemon state stay inside the test.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub fn binary_path() -> PathBuf {
    let path = PathBuf::from(env!("CARGO_BIN_EXE_almost-yolo-guard"));
    assert!(path.exists(), "binary not found at {}", path.display());
    path
}

/// Runs `almost-yolo-guard hook` with the given stdin and $HOME.
/// Returns (stdout, stderr, exit_code).
pub fn run_hook(stdin_input: &str, home: &Path) -> (String, String, i32) {
    let output = Command::new(binary_path())
        .arg("hook")
        .env("HOME", home)
        .env_remove("ANTHROPIC_API_KEY")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .and_then(|mut child| {
            use std::io::{ErrorKind, Write};
            let write_result = child
                .stdin
                .take()
                .unwrap()
                .write_all(stdin_input.as_bytes());
            if let Err(e) = write_result {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(e);
                }
            }
            child.wait_with_output()
        })
        .expect("failed to execute binary");

    let stdout = String::from_utf8(output.stdout).expect("stdout not valid UTF-8");
    let stderr = String::from_utf8(output.stderr).expect("stderr not valid UTF-8");
    let exit_code = output.status.code().unwrap_or(-1);
    (stdout, stderr, exit_code)
}

/// Runs a daemon control subcommand with the given $HOME.
pub fn run_daemon_cmd(action: &str, home: &Path) -> (String, i32) {
    let output = Command::new(binary_path())
        .args(["daemon", action])
        .env("HOME", home)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("failed to execute binary");
    (
        String::from_utf8(output.stdout).expect("stdout not valid UTF-8"),
        output.status.code().unwrap_or(-1),
    )
}

pub fn make_input_json(tool_name: &str, tool_input: serde_json::Value, cwd: &str) -> String {
    serde_json::json!({
        "session_id": "sess-e2e-test",
        "tool_name": tool_name,
        "tool_input": tool_input,
        "cwd": cwd
    })
    .to_string()
}

pub fn bash_input_json(command: &str, cwd: &str) -> String {
    make_input_json("Bash", serde_json::json!({"command": command}), cwd)
}

/// Parses stdout as the hook output JSON.
pub fn parse_hook_output(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout.trim()).expect("stdout should be valid JSON")
}

pub fn decision_log(home: &Path) -> String {
    std::fs::read_to_string(
        home.join(".config")
            .join("almost-yolo-guard")
            .join("decisions.log"),
    )
    .unwrap_or_default()
}
