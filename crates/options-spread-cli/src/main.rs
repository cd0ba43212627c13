mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::pricing::PriceArgs;
use commands::screen::ScreenArgs;

/// Options pricing and vertical-spread screening
#[derive(Parser)]
#[command(
    name = "osa",
    version,
    about = "Black-Scholes options pricing and vertical-spread screening",
    long_about = "Prices European-style options on non-dividend stocks with the \
                  closed-form Black-Scholes model and screens bull put / bull call \
                  spreads across a strike grid, ranked by expected result. \
                  Suggested parameter ranges: stock price 20-200, DTE 1-360, \
                  IV 10-150%, risk-free rate 1-4%."
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
    /// Price a European option and report its Greeks
    Price(PriceArgs),
    /// Screen vertical-spread strike pairs, ranked by expected result
    Screen(ScreenArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Price(args) => commands::pricing::run_price(args),
        Commands::Screen(args) => commands::screen::run_screen(args),
        Commands::Version => {
            println!("osa {}", env!("CARGO_PKG_VERSION"));
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
