//! Package manager, build tool, and container CLI sub-policies.

use super::Ruling;

// ---- npm / yarn / pnpm ----

const NODE_PKG_SAFE: &[&str] = &[
    "install", "i", "ci", "add", "remove", "uninstall", "rm", "test", "t", "run", "start",
    "build", "dev", "lint", "format", "update", "upgrade", "outdated", "list", "ls", "info",
    "view", "init", "create", "exec", "audit", "cache", "config", "pack", "version", "why",
    "dedupe", "prune", "rebuild", "link", "unlink",
];

pub(super) fn evaluate_node_pkg_mgr(cmd: &str, args: &[String]) -> Ruling {
    let Some(sub) = args.first() else {
        return Ruling::allow(format!("{cmd} (no subcommand)"));
    };

    if NODE_PKG_SAFE.contains(&sub.as_str()) {
        return Ruling::allow(format!("{cmd} {sub}"));
    }
    if sub == "publish" {
        return Ruling::ask(format!("{cmd} publish"));
    }
    Ruling::uncertain(format!("{cmd} {sub}"))
}

// ---- pip ----

const PIP_SAFE: &[&str] = &[
    "install", "uninstall", "list", "show", "freeze", "check", "config", "cache", "debug",
    "inspect", "download", "wheel", "hash", "search", "index",
];

pub(super) fn evaluate_pip(cmd: &str, args: &[String]) -> Ruling {
    let Some(sub) = args.first() else {
        return Ruling::allow(format!("{cmd} (no subcommand)"));
    };

    if PIP_SAFE.contains(&sub.as_str()) {
        return Ruling::allow(format!("{cmd} {sub}"));
    }
    Ruling::uncertain(format!("{cmd} {sub}"))
}

// ---- go ----

const GO_SAFE: &[&str] = &[
    "build", "test", "vet", "fmt", "mod", "generate", "install", "get", "clean", "env",
    "version", "doc", "tool", "work", "run", "fix", "list",
];

pub(super) fn evaluate_go(args: &[String]) -> Ruling {
    let Some(sub) = args.first() else {
        return Ruling::allow("go (no subcommand)");
    };

    if GO_SAFE.contains(&sub.as_str()) {
        return Ruling::allow(format!("go {sub}"));
    }
    Ruling::uncertain(format!("go {sub}"))
}

// ---- cargo ----

const CARGO_SAFE: &[&str] = &[
    "build", "test", "check", "clippy", "fmt", "doc", "clean", "update", "bench", "run",
    "new", "init", "add", "remove", "install", "search", "tree", "vendor", "fix", "fetch",
    "metadata", "verify-project",
];

pub(super) fn evaluate_cargo(args: &[String]) -> Ruling {
    let Some(sub) = args.first() else {
        return Ruling::allow("cargo (no subcommand)");
    };

    if CARGO_SAFE.contains(&sub.as_str()) {
        return Ruling::allow(format!("cargo {sub}"));
    }
    if sub == "publish" {
        return Ruling::ask("cargo publish");
    }
    Ruling::uncertain(format!("cargo {sub}"))
}

// ---- brew / apt / apt-get / yum / pacman ----

// remove/uninstall are deliberately absent: they escalate instead.
const SYSTEM_PKG_SAFE: &[&str] = &[
    "install", "add", "update", "upgrade", "search", "info", "show", "list", "outdated",
    "deps", "leaves", "uses", "doctor", "cleanup", "autoremove", "cache", "config", "tap",
    "untap",
];

pub(super) fn evaluate_package_manager(cmd: &str, args: &[String]) -> Ruling {
    let Some(sub) = args.first() else {
        return Ruling::allow(format!("{cmd} (no subcommand)"));
    };

    if SYSTEM_PKG_SAFE.contains(&sub.as_str()) {
        return Ruling::allow(format!("{cmd} {sub}"));
    }
    Ruling::uncertain(format!("{cmd} {sub}"))
}

// ---- docker / podman / docker-compose ----

const DOCKER_SAFE: &[&str] = &[
    "ps", "logs", "images", "inspect", "stats", "top", "history", "info", "version", "build",
    "pull", "tag", "login", "logout", "search", "events", "diff", "port", "wait", "cp",
    "create", "start",
];

const COMPOSE_SAFE: &[&str] = &[
    "up", "build", "pull", "start", "ps", "logs", "config", "images", "top", "version", "ls",
    "port", "create", "events",
];

pub(super) fn evaluate_docker(args: &[String]) -> Ruling {
    let Some(sub) = args.first() else {
        return Ruling::allow("docker (no subcommand)");
    };

    // `docker compose` is the plugin spelling of docker-compose.
    if sub == "compose" {
        return evaluate_docker_compose(&args[1..]);
    }

    if DOCKER_SAFE.contains(&sub.as_str()) {
        return Ruling::allow(format!("docker {sub}"));
    }
    Ruling::uncertain(format!("docker {sub}"))
}

pub(super) fn evaluate_docker_compose(args: &[String]) -> Ruling {
    let Some(sub) = args.first() else {
        return Ruling::allow("docker-compose (no subcommand)");
    };

    if COMPOSE_SAFE.contains(&sub.as_str()) {
        return Ruling::allow(format!("docker-compose {sub}"));
    }
    Ruling::uncertain(format!("docker-compose {sub}"))
}
