use serde::Deserialize;
use serde_json::Value;

/// The input received from Claude Code on stdin for a PermissionRequest hook.
///
/// `tool_input` is kept as an opaque JSON value; each classifier extracts
/// only the keys it needs (`command`, `file_path`, `notebook_path`).
#[derive(Debug, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: Value,
    /// Absolute path of the session working directory.
    #[serde(default, rename = "cwd")]
    pub working_dir: String,
}
