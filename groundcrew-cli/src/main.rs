//! Groundcrew CLI - Command-line interface
//!
//! Replays recorded simulator sessions through the ground-service engine
//! and inspects the effective configuration.

mod commands;
mod error;
mod replay;

use clap::{Parser, Subcommand};

use commands::config::ConfigArgs;
use commands::replay::ReplayArgs;

#[derive(Parser)]
#[command(name = "groundcrew")]
#[command(version = groundcrew::VERSION)]
#[command(about = "Automated ground-service orchestration for flight simulators", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file through the engine and print its menu writes
    Replay(ReplayArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Replay(args) => commands::replay::run(args),
        Commands::Config(args) => commands::config::run(args),
    };

    if let Err(e) = result {
        e.exit();
    }
}
