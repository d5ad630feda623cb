//! Lexical path normalization and classification.
//!
//! Everything here is string-level: no filesystem access, no symlink
//! resolution. The classifier only needs to recognize obviously sensitive
//! locations, and a lexical view keeps the engine pure.

use std::path::PathBuf;

/// Filesystem roots whose contents must never be auto-approved for writes.
const SYSTEM_PREFIXES: &[&str] = &["/etc", "/usr", "/var", "/sys", "/proc", "/boot", "/sbin"];

/// Shell startup files in `$HOME` that are sensitive as exact paths.
const SENSITIVE_DOTFILES: &[&str] = &[".bashrc", ".bash_profile", ".zshrc", ".zprofile", ".profile"];

/// Directories in `$HOME` that are sensitive including all of their contents.
const SENSITIVE_HOME_DIRS: &[&str] = &[".ssh", ".gnupg", ".aws"];

/// Collapse `.` and `..` components and duplicate separators, preserving
/// whether the path is rooted. Purely lexical.
pub(crate) fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for comp in path.split('/') {
        match comp {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&"..") => parts.push(".."),
                Some(_) => {
                    parts.pop();
                }
                None if !rooted => parts.push(".."),
                None => {}
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return if rooted { "/".to_string() } else { ".".to_string() };
    }

    let joined = parts.join("/");
    if rooted {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Join a possibly-relative path onto a directory and clean the result.
pub(crate) fn join(dir: &str, path: &str) -> String {
    clean(&format!("{dir}/{path}"))
}

/// Resolve a target against the working directory: absolute paths are
/// cleaned, relative paths are joined first.
pub(crate) fn resolve(target: &str, working_dir: &str) -> String {
    if target.starts_with('/') {
        clean(target)
    } else {
        join(working_dir, target)
    }
}

/// Whether `path` equals `dir` or sits strictly within it.
///
/// Separator-aware: `/etcfoo` is not within `/etc`. An empty `dir` contains
/// nothing.
pub(crate) fn is_within_dir(path: &str, dir: &str) -> bool {
    if dir.is_empty() {
        return false;
    }
    let path = clean(path);
    let dir = clean(dir);
    path == dir || path.starts_with(&format!("{dir}/"))
}

/// Whether a path is a system path: under one of the protected roots, a
/// shell startup file in `$HOME`, or inside `$HOME/.ssh`, `.gnupg`, `.aws`.
///
/// The `$HOME`-based checks are skipped when `HOME` is unset.
pub(crate) fn is_system_path(path: &str) -> bool {
    let path = clean(path);

    for prefix in SYSTEM_PREFIXES {
        if path == *prefix || path.starts_with(&format!("{prefix}/")) {
            return true;
        }
    }

    let Some(home) = home_dir() else {
        return false;
    };

    for dotfile in SENSITIVE_DOTFILES {
        if path == format!("{home}/{dotfile}") {
            return true;
        }
    }

    for dir in SENSITIVE_HOME_DIRS {
        let full = format!("{home}/{dir}");
        if path == full || path.starts_with(&format!("{full}/")) {
            return true;
        }
    }

    false
}

/// `$HOME`, if set and non-empty.
pub(crate) fn home_dir() -> Option<String> {
    std::env::var("HOME").ok().filter(|h| !h.is_empty())
}

/// Per-user state directory: `$HOME/.config/almost-yolo-guard`.
pub(crate) fn config_dir() -> PathBuf {
    let home = home_dir().unwrap_or_default();
    PathBuf::from(home).join(".config").join("almost-yolo-guard")
}

pub(crate) fn socket_path() -> PathBuf {
    config_dir().join("daemon.sock")
}

pub(crate) fn pid_path() -> PathBuf {
    config_dir().join("daemon.pid")
}

pub(crate) fn log_path() -> PathBuf {
    config_dir().join("decisions.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- clean ----

    #[test]
    fn clean_absolute_unchanged() {
        assert_eq!(clean("/absolute/path"), "/absolute/path");
    }

    #[test]
    fn clean_collapses_dotdot() {
        assert_eq!(clean("/foo/bar/../baz"), "/foo/baz");
    }

    #[test]
    fn clean_collapses_nested_dotdot() {
        assert_eq!(clean("/foo/bar/../../baz"), "/baz");
    }

    #[test]
    fn clean_dotdot_above_root_stops_at_root() {
        assert_eq!(clean("/../etc"), "/etc");
    }

    #[test]
    fn clean_relative_keeps_leading_dotdot() {
        assert_eq!(clean("../other/file"), "../other/file");
    }

    #[test]
    fn clean_duplicate_slashes() {
        assert_eq!(clean("/foo//bar///baz"), "/foo/bar/baz");
    }

    #[test]
    fn clean_trailing_slash_removed() {
        assert_eq!(clean("/path/"), "/path");
    }

    #[test]
    fn clean_dot_components_removed() {
        assert_eq!(clean("./src/./main.rs"), "src/main.rs");
    }

    #[test]
    fn clean_empty_is_dot() {
        assert_eq!(clean(""), ".");
    }

    #[test]
    fn clean_root_is_root() {
        assert_eq!(clean("/"), "/");
    }

    // ---- join / resolve ----

    #[test]
    fn join_relative_onto_dir() {
        assert_eq!(join("/proj", "dist/"), "/proj/dist");
    }

    #[test]
    fn resolve_absolute_ignores_working_dir() {
        assert_eq!(resolve("/etc/hosts", "/proj"), "/etc/hosts");
    }

    #[test]
    fn resolve_relative_with_traversal() {
        assert_eq!(resolve("../secrets", "/proj/sub"), "/proj/secrets");
    }

    // ---- is_within_dir ----

    #[test]
    fn within_dir_exact_match() {
        assert!(is_within_dir("/proj", "/proj"));
    }

    #[test]
    fn within_dir_child() {
        assert!(is_within_dir("/proj/src/main.rs", "/proj"));
    }

    #[test]
    fn within_dir_prefix_without_separator_is_outside() {
        assert!(!is_within_dir("/projother", "/proj"));
    }

    #[test]
    fn within_dir_empty_dir_contains_nothing() {
        assert!(!is_within_dir("/anything", ""));
    }

    #[test]
    fn within_dir_sibling_is_outside() {
        assert!(!is_within_dir("/other/file", "/proj"));
    }

    // ---- is_system_path ----

    #[test]
    fn system_prefix_exact() {
        assert!(is_system_path("/etc"));
    }

    #[test]
    fn system_prefix_child() {
        assert!(is_system_path("/etc/hosts"));
        assert!(is_system_path("/usr/local/bin/x"));
        assert!(is_system_path("/proc/1/status"));
    }

    #[test]
    fn system_prefix_needs_separator() {
        assert!(!is_system_path("/etcfoo"));
        assert!(!is_system_path("/variable"));
    }

    #[test]
    fn uncleaned_traversal_into_system_path() {
        assert!(is_system_path("/tmp/../etc/hosts"));
    }

    #[test]
    fn plain_tmp_is_not_system() {
        assert!(!is_system_path("/tmp/out.txt"));
    }

    #[test]
    fn home_dotfiles_are_system() {
        let home = std::env::var("HOME").expect("HOME set in test env");
        assert!(is_system_path(&format!("{home}/.bashrc")));
        assert!(is_system_path(&format!("{home}/.zshrc")));
    }

    #[test]
    fn home_sensitive_dirs_include_contents() {
        let home = std::env::var("HOME").expect("HOME set in test env");
        assert!(is_system_path(&format!("{home}/.ssh")));
        assert!(is_system_path(&format!("{home}/.ssh/id_rsa")));
        assert!(is_system_path(&format!("{home}/.aws/credentials")));
    }

    #[test]
    fn home_regular_file_is_not_system() {
        let home = std::env::var("HOME").expect("HOME set in test env");
        assert!(!is_system_path(&format!("{home}/notes.txt")));
        // Only the listed dotfiles count, not every dotfile.
        assert!(!is_system_path(&format!("{home}/.gitconfig")));
    }
}
