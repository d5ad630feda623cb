use serde::{Deserialize, Serialize};

/// One evaluation request, sent client → daemon as a single JSON line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalRequest {
    pub tool_name: String,
    /// Raw JSON text of the tool input, passed through verbatim.
    pub tool_input: String,
    pub work_dir: String,
}

/// One evaluation reply, sent daemon → client as a single JSON line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalResponse {
    /// `"ALLOW"` or `"ASK"`.
    pub decision: String,
    pub reason: String,
}

impl EvalResponse {
    pub fn ask(reason: impl Into<String>) -> Self {
        EvalResponse {
            decision: "ASK".to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_allow(&self) -> bool {
        self.decision == "ALLOW"
    }
}
