mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::process::ProcessDealArgs;

/// Broker-dealer deal commission calculations
#[derive(Parser)]
#[command(
    name = "commissions",
    version,
    about = "Broker-dealer deal commission calculations",
    long_about = "A CLI for running M&A broker-dealer deals through the commission \
                  engine with decimal precision. Computes the fee breakdown, the net \
                  payout and the successor contract state for a single deal."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a deal through the full commission pipeline
    ProcessDeal(ProcessDealArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::ProcessDeal(args) => commands::process::run_process_deal(args),
        Commands::Version => {
            println!("commissions {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
