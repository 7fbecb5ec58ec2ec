mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::categories::CategoriesArgs;
use commands::distribute::DistributeArgs;
use commands::roi::RoiArgs;

/// Investment economics for fractional real-estate
#[derive(Parser)]
#[command(
    name = "propshare",
    version,
    about = "Investment economics engine for fractional real-estate",
    long_about = "A CLI for the propshare investment economics engine: \
                  per-category yield and ROI projections, and exact pro-rata \
                  income distribution across investor positions, all with \
                  decimal precision."
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
    /// Project investor income, equity value and ROI over a horizon
    Roi(RoiArgs),
    /// Split a lump income amount across investor positions pro-rata
    Distribute(DistributeArgs),
    /// List the built-in property category yield profiles
    Categories(CategoriesArgs),
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
        Commands::Roi(args) => commands::roi::run(args),
        Commands::Distribute(args) => commands::distribute::run(args),
        Commands::Categories(args) => commands::categories::run(args),
        Commands::Version => {
            println!("propshare {}", env!("CARGO_PKG_VERSION"));
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
