//! Shell command classification.
//!
//! A compound command is split into segments, each segment is reduced to its
//! base command and classified, and the whole command takes the worst
//! per-segment verdict under `Allow < Ask < Uncertain`. Any interpreter
//! appearing downstream of an operator short-circuits to Ask.

use serde_json::Value;

use super::{cloud, fs, git, pkg, runtime, Ruling};
use crate::command::{split_compound, Segment};

/// Commands that always require confirmation, whatever the arguments.
const ALWAYS_ASK: &[&str] = &["sudo", "eval", "dd", "systemctl", "launchctl"];

/// Commands that are safe regardless of arguments.
const ALWAYS_SAFE: &[&str] = &[
    // File inspection
    "cat", "head", "tail", "less", "more", "file", "stat", "wc", "od", "xxd", "strings",
    // Directory listing
    "ls", "tree", "locate", "du", "df",
    // Search
    "grep", "rg", "ag", "ack", "fzf",
    // Text processing
    "awk", "cut", "sort", "uniq", "tr", "diff", "comm", "jq", "yq",
    // System info
    "whoami", "id", "groups", "hostname", "uname", "date", "uptime", "which", "type", "where",
    "env", "printenv", "echo", "printf", "pwd", "realpath", "dirname", "basename", "true",
    "false", "test", "[",
    // Network inspection
    "ping", "dig", "nslookup", "host",
    // Process inspection
    "ps", "top", "htop", "pgrep", "lsof",
    // Archive
    "tar", "zip", "unzip", "gzip", "gunzip",
    // macOS
    "open", "pbcopy", "pbpaste",
    // Terminal multiplexers
    "tmux", "screen",
    // Build tools with project-defined targets
    "make", "cmake", "bazel",
    // Dev utilities
    "sleep", "seq", "pre-commit", "prettier", "eslint", "golangci-lint", "tsc", "jest",
    "pytest", "phpunit",
    // K8s tools
    "kustomize",
    // Version managers
    "asdf",
    // Team tools
    "access-gke",
];

/// Interpreters that turn a pipe into remote code execution.
const PIPE_INTERPRETERS: &[&str] = &[
    "bash", "sh", "zsh", "fish", "python", "python3", "perl", "ruby", "node",
];

/// Classify the Bash tool: extract the command string and evaluate it.
pub(super) fn evaluate_bash(tool_input: &Value, working_dir: &str) -> Ruling {
    let command = match tool_input.get("command") {
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Ruling::uncertain("failed to parse command"),
        None if tool_input.is_object() || tool_input.is_null() => "",
        None => return Ruling::uncertain("failed to parse command"),
    };

    let command = command.trim();
    if command.is_empty() {
        return Ruling::uncertain("empty command");
    }

    evaluate_command(command, working_dir)
}

/// Classify a full (possibly compound) command string.
///
/// Also the recursion target for wrapper commands (`nohup`, `time`,
/// `timeout`), which re-enter here with their wrapped command text.
pub(super) fn evaluate_command(command: &str, working_dir: &str) -> Ruling {
    let segments = split_compound(command);

    let mut worst = Ruling::allow("");

    for (i, raw) in segments.iter().enumerate() {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        if i > 0 && is_pipe_to_interpreter(raw) {
            return Ruling::ask(format!("pipe to shell interpreter: {raw}"));
        }

        let ruling = evaluate_segment(raw, working_dir);
        if ruling.verdict > worst.verdict {
            worst = ruling;
        }
    }

    worst
}

fn is_pipe_to_interpreter(raw: &str) -> bool {
    PIPE_INTERPRETERS.contains(&Segment::parse(raw).base.as_str())
}

/// Classify one segment: fixed sets first, then the per-command sub-policy,
/// then unknown.
fn evaluate_segment(raw: &str, working_dir: &str) -> Ruling {
    let segment = Segment::parse(raw);
    if segment.raw.is_empty() {
        return Ruling::allow("");
    }
    if segment.base.is_empty() {
        return Ruling::uncertain("could not extract command");
    }

    let base = segment.base.as_str();
    let args = &segment.args;

    if ALWAYS_ASK.contains(&base) {
        return Ruling::ask(format!("dangerous command: {base}"));
    }
    if ALWAYS_SAFE.contains(&base) {
        return Ruling::allow(format!("safe command: {base}"));
    }

    match base {
        "git" => git::evaluate_git(args),
        "kubectl" => cloud::evaluate_kubectl(args),
        "rm" => fs::evaluate_rm(args, working_dir),
        "chmod" => fs::evaluate_chmod(args),
        "chown" => fs::evaluate_chown(args),
        "gh" => cloud::evaluate_gh(args),
        "gcloud" => cloud::evaluate_gcloud(args),
        "bq" => cloud::evaluate_bq(args),
        "aws" => cloud::evaluate_aws(args),
        "sed" => fs::evaluate_sed(args),
        // A piped curl/wget is caught upstream; a bare one only downloads.
        "curl" | "wget" => Ruling::allow(format!("{base} (not piped to shell)")),
        "kill" | "pkill" | "killall" => Ruling::allow("process management"),
        "cp" | "mv" | "mkdir" | "touch" => fs::evaluate_file_cmd(base, args, working_dir),
        "ssh" => runtime::evaluate_ssh(args),
        "scp" => Ruling::uncertain("scp (remote file transfer)"),
        "docker" | "podman" => pkg::evaluate_docker(args),
        "docker-compose" => pkg::evaluate_docker_compose(args),
        "npm" | "yarn" | "pnpm" => pkg::evaluate_node_pkg_mgr(base, args),
        "npx" => Ruling::uncertain("npx downloads and runs code"),
        "pip" | "pip3" => pkg::evaluate_pip(base, args),
        "python" | "python3" | "node" | "deno" | "bun" | "ruby" | "swift" => {
            runtime::evaluate_runtime(base, args)
        }
        "go" => pkg::evaluate_go(args),
        "cargo" => pkg::evaluate_cargo(args),
        "helm" => cloud::evaluate_helm(args),
        "find" => fs::evaluate_find(args),
        "tee" => fs::evaluate_tee(args, working_dir),
        "nc" => Ruling::uncertain("netcat"),
        "xargs" => Ruling::uncertain("xargs executes commands"),
        "yes" => Ruling::uncertain("yes auto-confirms prompts"),
        "nohup" | "time" => {
            if args.is_empty() {
                return Ruling::uncertain(format!("{base} (no command)"));
            }
            evaluate_command(&args.join(" "), working_dir)
        }
        "timeout" => evaluate_timeout(args, working_dir),
        "brew" | "apt" | "apt-get" | "yum" | "pacman" => {
            pkg::evaluate_package_manager(base, args)
        }
        other => Ruling::uncertain(format!("unknown command: {other}")),
    }
}

/// `timeout [flags] <duration> <command...>`: skip flags and the duration,
/// then classify the wrapped command.
fn evaluate_timeout(args: &[String], working_dir: &str) -> Ruling {
    let mut i = 0;
    while i < args.len() && args[i].starts_with('-') {
        i += 1;
    }
    if i < args.len() {
        i += 1; // duration
    }
    if i >= args.len() {
        return Ruling::uncertain("timeout (no command)");
    }
    evaluate_command(&args[i..].join(" "), working_dir)
}
