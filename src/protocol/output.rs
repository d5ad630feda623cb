use serde::Serialize;

/// The output returned to Claude Code on stdout.
///
/// Emitted only for an auto-approval; on Ask the hook writes nothing and the
/// host shows its normal confirmation dialog.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    pub hook_specific_output: PermissionRequestOutput,
}

/// PermissionRequest-specific output wrapper.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRequestOutput {
    pub hook_event_name: &'static str,
    pub decision: AllowDecision,
}

/// The auto-approval decision. The hook never emits any other behavior:
/// everything short of "allow" is expressed by staying silent.
#[derive(Debug, Serialize)]
pub struct AllowDecision {
    pub behavior: &'static str,
}

impl HookOutput {
    /// Build the one output shape this hook ever emits.
    pub fn allow() -> Self {
        HookOutput {
            hook_specific_output: PermissionRequestOutput {
                hook_event_name: "PermissionRequest",
                decision: AllowDecision { behavior: "allow" },
            },
        }
    }
}
