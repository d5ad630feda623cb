pub mod daemon;
pub mod hook;

use clap::Subcommand;

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run as a Claude Code PermissionRequest hook (reads stdin, writes stdout)
    Hook,
    /// Run or manage the background evaluation daemon
    Daemon {
        #[command(subcommand)]
        action: Option<DaemonAction>,
    },
}

/// Daemon control verbs; absent means "run the daemon in the foreground".
#[derive(Debug, Subcommand)]
pub enum DaemonAction {
    /// Print whether the daemon is running (exit 0 if up, 1 otherwise)
    Status,
    /// Signal the daemon to shut down
    Stop,
    /// Stop the daemon, then start a fresh one
    Restart,
}
