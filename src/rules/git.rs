//! Git sub-policy.
//!
//! Branch-local operations are safe; `push` gets its own flag analysis so
//! that only force-pushes and deletions aimed at main/master require
//! confirmation.

use super::Ruling;

const SAFE_SUBCOMMANDS: &[&str] = &[
    "status", "diff", "log", "show", "branch", "fetch", "stash", "add", "commit", "pull",
    "clone", "checkout", "rebase", "merge", "cherry-pick", "tag", "remote", "reflog",
    "rev-parse", "ls-files", "config", "init", "worktree", "bisect", "blame", "shortlog",
    "describe", "clean", "reset", "switch", "restore",
];

pub(super) fn evaluate_git(args: &[String]) -> Ruling {
    let Some(sub) = args.first() else {
        return Ruling::allow("git (no subcommand)");
    };

    if SAFE_SUBCOMMANDS.contains(&sub.as_str()) {
        return Ruling::allow(format!("git {sub}"));
    }

    if sub == "push" {
        return evaluate_git_push(&args[1..]);
    }

    Ruling::uncertain(format!("git {sub}"))
}

/// Only force and delete pushes are interesting; everything else is a
/// routine branch update.
fn evaluate_git_push(args: &[String]) -> Ruling {
    let mut is_force = false;
    let mut is_delete = false;
    let mut positionals: Vec<&str> = Vec::new();

    for arg in args {
        match arg.as_str() {
            "--force" | "-f" | "--force-with-lease" => is_force = true,
            "--delete" | "-d" => is_delete = true,
            a if a.starts_with('-') => {}
            a => positionals.push(a),
        }
    }

    if !is_force && !is_delete {
        return Ruling::allow("git push (no force)");
    }

    // A positional naming main/master, either bare or as the remote side of
    // a refspec, makes the push destructive to a protected ref.
    for arg in &positionals {
        let lower = arg.to_lowercase();
        if lower == "main"
            || lower == "master"
            || lower.ends_with(":main")
            || lower.ends_with(":master")
        {
            if is_force {
                return Ruling::ask(format!("git push --force to {arg}"));
            }
            if is_delete {
                return Ruling::ask(format!("git push --delete {arg}"));
            }
        }
    }

    if positionals.len() >= 2 {
        return Ruling::allow("git push to non-main branch");
    }

    if is_force {
        return Ruling::uncertain("git push --force without explicit branch");
    }

    Ruling::uncertain("git push --delete without explicit target")
}
