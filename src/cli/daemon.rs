//! Daemon subcommand: run the service in the foreground, or control a
//! running instance.

use tracing_subscriber::EnvFilter;

use super::DaemonAction;
use crate::daemon::{control, Daemon, DaemonConfig};
use crate::evaluator::ClaudeEvaluator;

pub fn run(action: Option<DaemonAction>) {
    match action {
        None => run_service(),
        Some(DaemonAction::Status) => std::process::exit(control::status()),
        Some(DaemonAction::Stop) => control::stop(),
        Some(DaemonAction::Restart) => std::process::exit(control::restart()),
    }
}

/// Run the companion service until a termination signal or idle expiry.
fn run_service() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let model = ClaudeEvaluator::model_from_env();
    let daemon = Daemon::new(ClaudeEvaluator::new(model), DaemonConfig::default());

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("daemon: failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(daemon.run()) {
        eprintln!("daemon: {e}");
        std::process::exit(1);
    }
}
