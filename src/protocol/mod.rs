pub mod input;
pub mod output;
pub mod verdict;
pub mod wire;

pub use input::HookInput;
pub use output::{AllowDecision, HookOutput, PermissionRequestOutput};
pub use verdict::{Source, Verdict};
pub use wire::{EvalRequest, EvalResponse};
