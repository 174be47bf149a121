mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::LevelFilter;
use std::process;

use commands::deal::{AnalyzeArgs, DefaultsArgs, NapkinArgs, SensitivityArgs};
use commands::mortgage::MortgageArgs;
use commands::returns::IrrArgs;

/// Real estate investment analysis with decimal precision
#[derive(Parser)]
#[command(
    name = "proforma",
    version,
    about = "Real estate investment analysis with decimal precision",
    long_about = "A CLI for analysing rental property deals: mortgage amortisation, \
                  NOI, cap rate, cash-on-cash, multi-year pro forma projections, \
                  equity multiple, levered IRR, commercial DSCR and exit-cap / vacancy \
                  sensitivity grids."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly payment, amortisation schedule and remaining balance
    Mortgage(MortgageArgs),
    /// Internal rate of return for a periodic cash-flow series
    Irr(IrrArgs),
    /// Quick analysis from price, rent and interest rate
    Napkin(NapkinArgs),
    /// Full pro forma analysis (metrics, projection, equity, IRR, sensitivity)
    Analyze(AnalyzeArgs),
    /// Year-by-year cash-flow projection over the hold period
    CashFlow(AnalyzeArgs),
    /// Equity multiple, profit and equity build-up
    Equity(AnalyzeArgs),
    /// Commercial metrics (DSCR, CAPEX reserve, NNN)
    Commercial(AnalyzeArgs),
    /// Exit cap rate x vacancy sensitivity grid
    Sensitivity(SensitivityArgs),
    /// Print the default inputs as a starting template
    Defaults(DefaultsArgs),
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

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Mortgage(args) => commands::mortgage::run_mortgage(args),
        Commands::Irr(args) => commands::returns::run_irr(args),
        Commands::Napkin(args) => commands::deal::run_napkin(args),
        Commands::Analyze(args) => commands::deal::run_analyze(args),
        Commands::CashFlow(args) => commands::deal::run_cash_flow(args),
        Commands::Equity(args) => commands::deal::run_equity(args),
        Commands::Commercial(args) => commands::deal::run_commercial(args),
        Commands::Sensitivity(args) => commands::deal::run_sensitivity(args),
        Commands::Defaults(args) => commands::deal::run_defaults(args),
        Commands::Version => {
            println!("proforma {}", env!("CARGO_PKG_VERSION"));
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
