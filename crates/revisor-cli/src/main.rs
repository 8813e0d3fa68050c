//! Revisor CLI
//!
//! Command-line interface for revision tables: create them and read history

use clap::{Parser, Subcommand, ValueEnum};
use revisor_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "revisor")]
#[command(about = "Revisor - revision history for tracked entities", long_about = None)]
struct Cli {
    /// Emit logs on stderr
    #[arg(long, value_enum, global = true)]
    log: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the revision table described by a configuration
    Init(commands::init::InitArgs),
    /// Read an instance's revision history
    History(commands::history::HistoryArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.log {
        Some(LogFormat::Text) => init(Profile::Development),
        Some(LogFormat::Json) => init(Profile::Production),
        None => {}
    }

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args),
        Commands::History(args) => commands::history::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
