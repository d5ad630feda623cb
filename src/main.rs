use almost_yolo_guard::cli::Commands;
use clap::Parser;

/// Permission-gating hook for Claude Code tool calls.
#[derive(Debug, Parser)]
#[command(name = "almost-yolo-guard", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Hook => almost_yolo_guard::cli::hook::run(),
        Commands::Daemon { action } => almost_yolo_guard::cli::daemon::run(action),
    }
}
