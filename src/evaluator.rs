//! Language-model evaluation of tool calls the rule engine cannot classify.
//!
//! The backend is a black box behind [`Evaluator`]: it gets one request and
//! must come back with `ALLOW` or `ASK`. The production implementation calls
//! the Anthropic Messages API; tests inject mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::protocol::{EvalRequest, EvalResponse};

/// Default model used for evaluation.
pub const DEFAULT_MODEL: &str = "claude-opus-4-5-20251101";

/// Environment variable overriding the evaluation model.
pub const MODEL_ENV_VAR: &str = "ALMOST_YOLO_MODEL";

const API_KEY_ENV_VAR: &str = "ANTHROPIC_API_KEY";
const API_BASE: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_TOKENS: u32 = 256;

const SYSTEM_PROMPT: &str = r#"You are a security evaluator for Claude Code tool calls. Your job is to decide if a tool call is safe to auto-approve or should require user confirmation.

RESPOND WITH ONLY ONE WORD: "ALLOW" or "ASK"

# Tool Types

## Bash commands
Evaluate shell commands for safety.

### ALLOW these Bash operations:

#### Read-only commands (always safe)
- File inspection: cat, head, tail, less, more, file, stat, wc, od, xxd, strings
- Directory listing: ls, tree, find, locate, du, df
- Search: grep, rg, ag, ack, fzf
- Text processing: sed (without -i), awk, cut, sort, uniq, tr, diff, comm
- System info: whoami, id, groups, hostname, uname, date, uptime, which, type, where, env, printenv, echo, pwd, realpath, dirname, basename
- Network inspection: ping, dig, nslookup, host, curl (GET), wget (download), nc (read)
- Process inspection: ps, top, htop, pgrep, lsof

#### Development tools (safe)
- Version control: git status, diff, log, show, branch, fetch, stash, add, commit, pull, clone, checkout, rebase, merge, cherry-pick, tag, remote, reflog
- git reset, git clean (local-only operations, safe)
- git push (including --force) to any branch EXCEPT main/master
- git push --delete to any branch EXCEPT main/master
- git branch -D (force delete) on any branch
- Build/run: make, go, cargo, npm, npx, yarn, pnpm, pip, python, node, deno, bun, ruby, rust, swift
- Containers: docker (build, run, ps, logs, images, inspect), docker-compose
- Package managers: brew, apt, yum, pacman, asdf

#### Cloud CLI - READ operations (safe)
- kubectl: get, describe, logs, top, explain, api-resources, config view, cluster-info
- kubectl delete pod (pods are ephemeral, this is routine)
- gcloud: list, describe, info, config list
- bq: query (SELECT only), ls, show, head
- aws: describe-*, list-*, get-*

#### GitHub CLI (mostly safe)
- gh pr: view, list, create, checks, diff, ready, comment
- gh issue: view, list, create, comment
- gh run: view, list, watch, download
- gh repo: view, clone, fork
- gh api (GET requests)

#### File operations (context-dependent)
- rm: Safe if removing files within a project directory, build artifacts, node_modules, __pycache__, .cache, tmp files
- rm -rf: Safe if target is clearly a build/temp directory (e.g., dist/, build/, out/, .next/, target/)
- cp, mv, mkdir, touch, chmod, chown: Generally safe within project directories

#### Other safe commands
- ssh, scp (just access, reading)
- tmux, screen (session management)
- open, pbcopy, pbpaste (macOS utilities)
- tar, zip, unzip, gzip, gunzip (archiving)
- kill, pkill, killall (process management, usually fixing stuck processes)

### ASK for these Bash operations:

#### Destructive cloud operations
- kubectl: apply, delete (except pods), exec, edit, patch, scale, rollout, create, replace
- gcloud: create, delete, update, deploy, ssh
- bq: queries with INSERT, UPDATE, DELETE, DROP, CREATE, ALTER, TRUNCATE
- aws: create-*, delete-*, update-*, put-*, run-*

#### Destructive git operations (ONLY on main/master)
- git push --force to main or master
- git push --delete main or master
- git reset --hard on main/master with unpushed changes

#### Dangerous file operations
- rm -rf targeting: ~, $HOME, /, /etc, /usr, /var, /home, /Users, or any path outside the current project
- rm -rf with wildcards at risky paths
- rm -rf on parent directories (../)
- chmod 777, chmod -R with broad scope
- chown -R with broad scope
- dd (disk operations)

#### GitHub CLI - destructive
- gh repo delete
- gh repo edit --visibility (changing to public)

#### Other risky operations
- curl/wget piped to sh/bash (code execution)
- eval, exec with untrusted input
- sudo anything
- System modification: systemctl, launchctl load/unload (starting/stopping services)
- Database writes: mysql, psql, sqlite3 with write operations

## Write tool
Creates or overwrites files. Input has file_path and content.

### ALLOW Write when:
- Writing to project directories (code, config, docs)
- Creating new source files, tests, configs
- Overwriting files that Claude just read or is working on
- Writing to temp/build directories

### ASK for Write when:
- Writing to system paths (/etc, /usr, ~/.bashrc, ~/.zshrc, etc.)
- Overwriting important config files outside the project
- Writing executable scripts to PATH directories

## Edit tool
Modifies existing files. Input has file_path, old_string, new_string.

### ALLOW Edit when:
- Editing project files (code, config, docs)
- Standard refactoring, bug fixes, feature additions
- Editing files Claude is actively working on

### ASK for Edit when:
- Editing system configuration files
- Editing files outside the current project
- Editing sensitive files (credentials, keys)

## Read tool
Reads file contents. Almost always safe.

### ALLOW Read when:
- Reading any project files
- Reading documentation
- Reading config files for context

### ASK for Read when:
- Reading clearly sensitive paths like ~/.ssh/id_rsa, ~/.aws/credentials (but usually fine to allow)

## Other tools (Task, Glob, Grep, WebFetch, WebSearch, MCP tools)
Generally safe - these are read-only or spawn subagents.

### ALLOW:
- Task (spawning subagents)
- Glob (file pattern matching)
- Grep (searching)
- WebFetch, WebSearch (web access)
- MCP tools for reading/querying

### ASK for:
- MCP tools that modify external systems

# Decision Guidelines

1. When in doubt, ASK
2. Read operations are almost always ALLOW
3. Write/Edit within project directories: ALLOW
4. Write/Edit to system paths: ASK
5. Local development operations (build, test, run): ALLOW
6. Cloud/infra writes should generally ASK unless clearly safe
7. git push/reset/delete on feature branches: ALLOW
8. git push --force to main/master: ASK
9. Subagents writing files: ALLOW (they're doing legitimate work)
10. Deleting ephemeral resources (pods, containers, temp files): ALLOW
11. Deleting persistent resources (deployments, services, databases): ASK"#;

/// Error from the evaluation backend itself.
///
/// The Claude implementation encodes its own failures as `ASK` responses;
/// this error is how other implementations (and tests) surface hard
/// failures, which the daemon also answers with `ASK`.
#[derive(Debug, thiserror::Error)]
pub enum EvaluatorError {
    #[error("{0}")]
    Backend(String),
}

/// One-shot evaluation contract between the daemon and its model backend.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, request: &EvalRequest) -> Result<EvalResponse, EvaluatorError>;

    /// Release backend resources on daemon shutdown.
    fn close(&self) {}
}

/// Evaluator backed by the Anthropic Messages API.
pub struct ClaudeEvaluator {
    client: reqwest::Client,
    model: String,
    api_key: Option<String>,
    api_base: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<MessageParam<'a>>,
}

#[derive(Serialize)]
struct MessageParam<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl ClaudeEvaluator {
    /// Build an evaluator for the given model. The API key is read from the
    /// environment; a missing key surfaces per request rather than at
    /// construction so the daemon can still start and answer `ASK`.
    pub fn new(model: impl Into<String>) -> Self {
        ClaudeEvaluator {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            model: model.into(),
            api_key: std::env::var(API_KEY_ENV_VAR).ok().filter(|k| !k.is_empty()),
            api_base: API_BASE.to_string(),
        }
    }

    /// Model from `ALMOST_YOLO_MODEL`, falling back to the built-in default.
    pub fn model_from_env() -> String {
        std::env::var(MODEL_ENV_VAR)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    async fn query_model(&self, prompt: &str) -> Result<String, String> {
        let api_key = self.api_key.as_deref().ok_or("ANTHROPIC_API_KEY not set")?;

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system: SYSTEM_PROMPT,
            messages: vec![MessageParam {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.api_base))
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(format!("API returned {status}: {detail}"));
        }

        let parsed: MessagesResponse = response.json().await.map_err(|e| e.to_string())?;
        let text = parsed
            .content
            .iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text.clone())
            .unwrap_or_default();

        Ok(text)
    }
}

#[async_trait]
impl Evaluator for ClaudeEvaluator {
    async fn evaluate(&self, request: &EvalRequest) -> Result<EvalResponse, EvaluatorError> {
        let prompt = format_prompt(request);

        let text = match self.query_model(&prompt).await {
            Ok(text) => text,
            Err(e) => return Ok(EvalResponse::ask(format!("SDK error: {e}"))),
        };

        if text.is_empty() {
            return Ok(EvalResponse::ask("empty response"));
        }

        Ok(EvalResponse {
            decision: parse_decision(&text).to_string(),
            reason: text.trim().to_string(),
        })
    }
}

/// The per-request prompt shown to the model.
pub fn format_prompt(request: &EvalRequest) -> String {
    format!(
        "Tool: {}\nInput: {}\nWorking directory: {}\n\nRespond with ALLOW or ASK.",
        request.tool_name, request.tool_input, request.work_dir
    )
}

/// Extract ALLOW or ASK from a model response. Defaults to ASK.
pub fn parse_decision(response: &str) -> &'static str {
    if response.trim().to_uppercase().contains("ALLOW") {
        "ALLOW"
    } else {
        "ASK"
    }
}
