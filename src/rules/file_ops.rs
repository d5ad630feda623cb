//! Write/Edit/NotebookEdit classification.
//!
//! Purely path-based: inside the project auto-approves, system paths ask,
//! anywhere else escalates to the companion.

use serde_json::Value;

use super::Ruling;
use crate::path;

pub(super) fn evaluate_file_op(tool_name: &str, tool_input: &Value, working_dir: &str) -> Ruling {
    if !tool_input.is_object() {
        return Ruling::uncertain(format!("failed to parse {tool_name} input"));
    }

    let path_key = if tool_name == "NotebookEdit" {
        "notebook_path"
    } else {
        "file_path"
    };

    let file_path = match tool_input.get(path_key) {
        None => return Ruling::uncertain(format!("{tool_name} missing {path_key}")),
        Some(Value::String(s)) => s,
        Some(_) => return Ruling::uncertain(format!("failed to parse {path_key}")),
    };

    let file_path = path::clean(file_path);

    if path::is_within_dir(&file_path, working_dir) {
        return Ruling::allow(format!("{tool_name} within project"));
    }

    if path::is_system_path(&file_path) {
        return Ruling::ask(format!("{tool_name} targeting system path: {file_path}"));
    }

    Ruling::uncertain(format!("{tool_name} outside project: {file_path}"))
}
