mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::annuity::{PaymentArgs, PeriodsArgs, SolveArgs, ValueArgs};

/// Ordinary and due annuity calculations
#[derive(Parser)]
#[command(
    name = "annuity",
    version,
    about = "Ordinary and due annuity calculations",
    long_about = "Solve for the missing variable of an ordinary (vencida) or due \
                  (anticipada) annuity: future value, present value, periodic \
                  payment, or number of periods. Values use decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    output: OutputFormat,

    /// Log calculation steps to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Future value (F) of a level payment stream
    FutureValue(ValueArgs),
    /// Present value (P) of a level payment stream
    PresentValue(ValueArgs),
    /// Periodic payment (R) from a present or future value
    Payment(PaymentArgs),
    /// Number of periods (n) from a present or future value
    Periods(PeriodsArgs),
    /// Solve a full annuity request from a JSON file or stdin
    Solve(SolveArgs),
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

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::FutureValue(args) => commands::annuity::run_future_value(args),
        Commands::PresentValue(args) => commands::annuity::run_present_value(args),
        Commands::Payment(args) => commands::annuity::run_payment(args),
        Commands::Periods(args) => commands::annuity::run_periods(args),
        Commands::Solve(args) => commands::annuity::run_solve(args),
        Commands::Version => {
            println!("annuity {}", env!("CARGO_PKG_VERSION"));
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
