use std::fmt;

/// Outcome of a rule engine evaluation.
///
/// The engine combines per-segment verdicts by taking the maximum under
/// `Allow < Ask < Uncertain`. `Uncertain` never leaves the hook process:
/// it is the internal signal to escalate to the companion daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verdict {
    /// Deterministically safe to auto-approve.
    Allow,
    /// Deterministically requires user confirmation.
    Ask,
    /// The rules have no opinion — escalate to the companion daemon.
    Uncertain,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Allow => "ALLOW",
            Verdict::Ask => "ASK",
            Verdict::Uncertain => "UNCERTAIN",
        };
        f.write_str(s)
    }
}

/// Where a decision came from, recorded in the decision log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The deterministic rule engine.
    Rules,
    /// The companion daemon (LLM-backed).
    Companion,
    /// An error path that fell back to asking the user.
    FailSafe,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Source::Rules => "rules",
            Source::Companion => "companion",
            Source::FailSafe => "fail-safe",
        };
        f.write_str(s)
    }
}
