//! glidertrack CLI - run the OGN to Telegram relay.
//!
//! ```text
//! glidertrack init            write ~/.glidertrack/config.ini
//! glidertrack run [--debug]   relay positions until Ctrl+C
//! glidertrack config path     show where the config file lives
//! ```

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::run::RunArgs;

#[derive(Parser)]
#[command(name = "glidertrack")]
#[command(version = glidertrack::VERSION)]
#[command(about = "Relay live OGN glider positions into a Telegram chat", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay until Ctrl+C
    Run {
        /// Config file to use instead of ~/.glidertrack/config.ini
        #[arg(long)]
        config: Option<PathBuf>,

        /// Enable debug logging (overridden by RUST_LOG)
        #[arg(long)]
        debug: bool,
    },

    /// Write the default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, debug } => commands::run::run(RunArgs { config, debug }),
        Commands::Init { force } => commands::init::run(force),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
