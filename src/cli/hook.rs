//! Hook client: one request per process.
//!
//! The contract with the host is narrow: emit the auto-approve JSON and exit
//! 0, or emit nothing and exit 0 (the host then shows its own confirmation
//! dialog). Every error path reduces to the silent case — a bug here can
//! cause a redundant dialog, never a silent approval.

use std::io::Read;

use crate::audit;
use crate::daemon::client;
use crate::protocol::{EvalRequest, HookInput, HookOutput, Source, Verdict};
use crate::rules;

/// Execute the hook subcommand: read one JSON request from stdin, decide,
/// optionally emit the approval JSON on stdout.
pub fn run() {
    let mut raw = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut raw) {
        passthrough_error(&format!("failed to read stdin: {e}"));
        return;
    }

    let input: HookInput = match serde_json::from_str(&raw) {
        Ok(input) => input,
        Err(e) => {
            passthrough_error(&format!("failed to parse input: {e}"));
            return;
        }
    };

    if input.tool_name.is_empty() || rules::should_skip(&input.tool_name) {
        return;
    }

    let tool_input_text = input.tool_input.to_string();

    let ruling = rules::evaluate(&input.tool_name, &input.tool_input, &input.working_dir);
    match ruling.verdict {
        Verdict::Allow => {
            audit::log_decision(
                &input.tool_name,
                &tool_input_text,
                &input.working_dir,
                "ALLOW",
                Source::Rules,
                &ruling.reason,
            );
            emit_allow();
        }
        Verdict::Ask => {
            audit::log_decision(
                &input.tool_name,
                &tool_input_text,
                &input.working_dir,
                "ASK",
                Source::Rules,
                &ruling.reason,
            );
        }
        Verdict::Uncertain => escalate(&input, &tool_input_text),
    }
}

/// The rules had no opinion: ask the companion daemon, failing safe to the
/// host dialog on any error along the way.
fn escalate(input: &HookInput, tool_input_text: &str) {
    let request = EvalRequest {
        tool_name: input.tool_name.clone(),
        tool_input: tool_input_text.to_string(),
        work_dir: input.working_dir.clone(),
    };

    let response = match client::query_companion(&request) {
        Ok(response) => response,
        Err(e) => {
            audit::log_decision(
                &input.tool_name,
                tool_input_text,
                &input.working_dir,
                "ASK",
                Source::FailSafe,
                &e.to_string(),
            );
            return;
        }
    };

    audit::log_decision(
        &input.tool_name,
        tool_input_text,
        &input.working_dir,
        &response.decision,
        Source::Companion,
        &response.reason,
    );

    if response.is_allow() {
        emit_allow();
    }
}

/// Serialize the approval JSON and print it, newline-terminated.
///
/// # Panics
///
/// Panics if serialization fails, which cannot happen with the derived
/// `Serialize` impl on static strings. Failure here is a programming bug,
/// not a runtime condition.
fn emit_allow() {
    let json = serde_json::to_string(&HookOutput::allow())
        .expect("HookOutput serialization cannot fail");
    println!("{json}");
}

fn passthrough_error(reason: &str) {
    audit::log_decision("(error)", "", "", "ASK", Source::FailSafe, reason);
}
