//! Cloud CLI sub-policies: kubectl, gh, gcloud, bq, aws, helm.
//!
//! The common shape: read operations auto-approve, mutations of persistent
//! resources ask, anything unrecognized escalates.

use super::Ruling;

// ---- kubectl ----

const KUBECTL_SAFE: &[&str] = &[
    "get", "describe", "logs", "top", "explain", "api-resources", "api-versions", "config",
    "cluster-info", "version", "auth", "port-forward",
];

const KUBECTL_WRITE: &[&str] = &[
    "apply", "create", "replace", "patch", "edit", "scale", "rollout", "exec", "cp", "run",
    "expose", "set", "label", "annotate", "taint", "cordon", "uncordon", "drain",
];

pub(super) fn evaluate_kubectl(args: &[String]) -> Ruling {
    let Some(sub) = args.first() else {
        return Ruling::allow("kubectl (no subcommand)");
    };

    if KUBECTL_SAFE.contains(&sub.as_str()) {
        return Ruling::allow(format!("kubectl {sub}"));
    }

    if sub == "delete" {
        return evaluate_kubectl_delete(&args[1..]);
    }

    if KUBECTL_WRITE.contains(&sub.as_str()) {
        return Ruling::ask(format!("kubectl {sub}"));
    }

    Ruling::uncertain(format!("kubectl {sub}"))
}

/// Pods are ephemeral and routinely recycled; deleting anything else is a
/// real mutation.
fn evaluate_kubectl_delete(args: &[String]) -> Ruling {
    for arg in args {
        if arg == "pod" || arg == "pods" || arg == "po" {
            return Ruling::allow("kubectl delete pod");
        }
    }
    Ruling::ask("kubectl delete (non-pod resource)")
}

// ---- gh ----

const GH_PR_SAFE: &[&str] = &[
    "view", "list", "create", "checks", "diff", "ready", "comment", "checkout", "status",
];
const GH_ISSUE_SAFE: &[&str] = &["view", "list", "create", "comment", "status"];
const GH_RUN_SAFE: &[&str] = &["view", "list", "watch", "download"];
const GH_REPO_SAFE: &[&str] = &["view", "clone", "fork", "list"];

pub(super) fn evaluate_gh(args: &[String]) -> Ruling {
    let Some(group) = args.first() else {
        return Ruling::uncertain("gh (no subcommand)");
    };

    match group.as_str() {
        "pr" => evaluate_gh_group(group, &args[1..], GH_PR_SAFE),
        "issue" => evaluate_gh_group(group, &args[1..], GH_ISSUE_SAFE),
        "run" => evaluate_gh_group(group, &args[1..], GH_RUN_SAFE),
        "repo" => evaluate_gh_repo(&args[1..]),
        "api" | "auth" => Ruling::allow(format!("gh {group}")),
        other => Ruling::uncertain(format!("gh {other}")),
    }
}

fn evaluate_gh_group(group: &str, args: &[String], safe: &[&str]) -> Ruling {
    let Some(verb) = args.first() else {
        return Ruling::allow(format!("gh {group}"));
    };
    if safe.contains(&verb.as_str()) {
        return Ruling::allow(format!("gh {group} {verb}"));
    }
    Ruling::uncertain(format!("gh {group} {verb}"))
}

fn evaluate_gh_repo(args: &[String]) -> Ruling {
    let Some(verb) = args.first() else {
        return Ruling::allow("gh repo");
    };
    if GH_REPO_SAFE.contains(&verb.as_str()) {
        return Ruling::allow(format!("gh repo {verb}"));
    }
    if verb == "delete" {
        return Ruling::ask("gh repo delete");
    }
    Ruling::uncertain(format!("gh repo {verb}"))
}

// ---- gcloud ----

pub(super) fn evaluate_gcloud(args: &[String]) -> Ruling {
    let Some(first) = args.first() else {
        return Ruling::uncertain("gcloud (no args)");
    };

    if first == "config" {
        if matches!(args.get(1).map(String::as_str), Some("list") | Some("get-value")) {
            return Ruling::allow("gcloud config read");
        }
        return Ruling::uncertain("gcloud config");
    }

    // gcloud verbs float among resource groups; scan for the first known one.
    for arg in args {
        match arg.as_str() {
            "list" | "describe" | "info" | "get-iam-policy" => {
                return Ruling::allow("gcloud read operation");
            }
            "create" | "delete" | "update" | "deploy" | "ssh" | "set-iam-policy"
            | "add-iam-policy-binding" | "remove-iam-policy-binding" => {
                return Ruling::ask(format!("gcloud write operation: {arg}"));
            }
            _ => {}
        }
    }

    Ruling::uncertain("gcloud command")
}

// ---- bq ----

const BQ_WRITE_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "CREATE", "ALTER", "TRUNCATE",
];

pub(super) fn evaluate_bq(args: &[String]) -> Ruling {
    for arg in args {
        match arg.as_str() {
            "ls" | "show" | "head" => return Ruling::allow("bq read operation"),
            "query" => {
                let full = args.join(" ").to_uppercase();
                for kw in BQ_WRITE_KEYWORDS {
                    if full.contains(kw) {
                        return Ruling::ask(format!("bq write query: {kw}"));
                    }
                }
                return Ruling::allow("bq query (SELECT)");
            }
            _ => {}
        }
    }
    Ruling::uncertain("bq command")
}

// ---- aws ----

pub(super) fn evaluate_aws(args: &[String]) -> Ruling {
    for arg in args {
        if arg.starts_with("describe-") || arg.starts_with("list-") || arg.starts_with("get-") {
            return Ruling::allow("aws read operation");
        }
        if arg.starts_with("create-")
            || arg.starts_with("delete-")
            || arg.starts_with("update-")
            || arg.starts_with("put-")
            || arg.starts_with("run-")
        {
            return Ruling::ask(format!("aws write operation: {arg}"));
        }
    }
    Ruling::uncertain("aws command")
}

// ---- helm ----

const HELM_SAFE: &[&str] = &[
    "list", "ls", "get", "status", "show", "template", "lint", "version", "repo", "search",
    "history", "env", "dependency", "plugin", "verify", "pull", "package", "create",
];

const HELM_ASK: &[&str] = &["install", "upgrade", "uninstall", "delete", "rollback", "test"];

pub(super) fn evaluate_helm(args: &[String]) -> Ruling {
    let Some(sub) = args.first() else {
        return Ruling::allow("helm (no subcommand)");
    };

    if HELM_SAFE.contains(&sub.as_str()) {
        return Ruling::allow(format!("helm {sub}"));
    }
    if HELM_ASK.contains(&sub.as_str()) {
        return Ruling::ask(format!("helm {sub}"));
    }
    Ruling::uncertain(format!("helm {sub}"))
}
