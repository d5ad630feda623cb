//! Compound shell command splitting and per-segment word extraction.
//!
//! The splitter is a deliberately small character walker: it tracks single
//! and double quote state and splits on `&&`, `||`, `;`, and `|` outside
//! quotes. Backslash escapes, heredocs, and nested quoting are not
//! interpreted. Exotic commands that confuse it come out as unknown
//! segments, which escalate instead of auto-approving.

/// A parsed segment of a compound command, representing one program
/// invocation between shell operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// The segment text as it appeared in the command, trimmed.
    pub raw: String,
    /// File name of the first command word, after peeling `NAME=value`
    /// prefixes and the `env` wrapper. Empty when no command word survives.
    pub base: String,
    /// Every word after the base command.
    pub args: Vec<String>,
}

impl Segment {
    /// Extract base command and arguments from one segment.
    ///
    /// Words are split on whitespace with no escape handling. Leading
    /// `NAME=value` tokens are treated as environment assignments unless
    /// they start with `-`, `/`, or `.` (those read as flags or paths).
    /// An `env` first word is walked past, together with any further
    /// assignments, to reach the real command.
    pub fn parse(raw: &str) -> Segment {
        let raw = raw.trim();
        let words: Vec<&str> = raw.split_whitespace().collect();

        let (base, args) = match command_words(&words) {
            Some(rest) => {
                let base = file_name(rest[0]).to_string();
                let args = rest[1..].iter().map(|w| w.to_string()).collect();
                (base, args)
            }
            None => (String::new(), Vec::new()),
        };

        Segment {
            raw: raw.to_string(),
            base,
            args,
        }
    }
}

/// Skip leading assignments and the `env` wrapper; return the slice starting
/// at the real command word, or `None` when only assignments remain.
fn command_words<'a>(words: &'a [&'a str]) -> Option<&'a [&'a str]> {
    let start = words.iter().position(|w| !is_assignment(w))?;
    let words = &words[start..];

    if words[0] == "env" {
        // env itself takes NAME=value arguments; the first word without '='
        // is the wrapped command.
        let cmd = words[1..].iter().position(|w| !w.contains('='))?;
        return Some(&words[1 + cmd..]);
    }

    Some(words)
}

/// A word is an environment assignment if it contains `=` and does not start
/// with `-`, `/`, or `.`.
fn is_assignment(word: &str) -> bool {
    word.contains('=')
        && !word.starts_with('-')
        && !word.starts_with('/')
        && !word.starts_with('.')
}

/// Final path component of a command word (`/usr/bin/git` → `git`).
fn file_name(word: &str) -> &str {
    let trimmed = word.trim_end_matches('/');
    if trimmed.is_empty() {
        return if word.is_empty() { "." } else { "/" };
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Split a compound command on `&&`, `||`, `;`, and `|`, respecting single
/// and double quotes. Quote characters are preserved in the segment text;
/// operators are dropped. Empty segments are kept so callers can tell the
/// first segment from downstream ones by index.
pub fn split_compound(command: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut in_double = false;

    let chars: Vec<char> = command.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];

        if ch == '\'' && !in_double {
            in_single = !in_single;
            current.push(ch);
            i += 1;
            continue;
        }
        if ch == '"' && !in_single {
            in_double = !in_double;
            current.push(ch);
            i += 1;
            continue;
        }

        if in_single || in_double {
            current.push(ch);
            i += 1;
            continue;
        }

        match ch {
            '&' if chars.get(i + 1) == Some(&'&') => {
                segments.push(std::mem::take(&mut current));
                i += 2;
            }
            '|' if chars.get(i + 1) == Some(&'|') => {
                segments.push(std::mem::take(&mut current));
                i += 2;
            }
            '|' | ';' => {
                segments.push(std::mem::take(&mut current));
                i += 1;
            }
            _ => {
                current.push(ch);
                i += 1;
            }
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}
