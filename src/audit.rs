//! Append-only decision log.
//!
//! Strictly best-effort: a decision must never depend on whether it could
//! be recorded, so every failure here is swallowed.

use std::fs::OpenOptions;
use std::io::Write;

use chrono::Local;

use crate::path;
use crate::protocol::Source;

/// Longest tool-input excerpt kept in a log line.
const INPUT_EXCERPT_LEN: usize = 200;

/// Append one decision line. All errors are ignored.
pub(crate) fn log_decision(
    tool_name: &str,
    tool_input: &str,
    work_dir: &str,
    decision: &str,
    source: Source,
    reason: &str,
) {
    let dir = path::config_dir();
    let _ = std::fs::create_dir_all(&dir);

    let Ok(mut file) = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path::log_path())
    else {
        return;
    };

    let input = truncate_input(tool_input);
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    let line = format!(
        "[{timestamp}] {decision} | tool={tool_name} | dir={work_dir} | source={source} | input={input} | reason={reason}\n"
    );
    let _ = file.write_all(line.as_bytes());
}

/// First 200 bytes of the input, backed off to a character boundary, with an
/// ellipsis when truncated.
fn truncate_input(input: &str) -> String {
    if input.len() <= INPUT_EXCERPT_LEN {
        return input.to_string();
    }
    let mut end = INPUT_EXCERPT_LEN;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &input[..end])
}
