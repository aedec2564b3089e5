mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::loan::{DisclosureArgs, PlanArgs};
use commands::time_value::{AprArgs, IrrArgs, NpvArgs, PmtArgs};

/// Consumer credit cost calculations
#[derive(Parser)]
#[command(
    name = "eir",
    version,
    about = "Consumer credit payment plans and effective interest rates",
    long_about = "A CLI for computing amortizing loan payment plans, their cash flows, \
                  the implied monthly IRR and the effective interest rate disclosed \
                  to consumers, with fixed-point decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter (e.g. "debug", "credit_cost_core=trace"); RUST_LOG takes precedence
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Effective interest rate, annuity, totals and daily interest of a loan
    Disclosure(DisclosureArgs),
    /// Full payment plan of a loan, one row per period
    Plan(PlanArgs),
    /// Monthly internal rate of return of a cash-flow series
    Irr(IrrArgs),
    /// Net present value of a cash-flow series
    Npv(NpvArgs),
    /// Level periodic payment (spreadsheet PMT)
    Pmt(PmtArgs),
    /// Annual percentage rate from a monthly IRR
    Apr(AprArgs),
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

fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Disclosure(args) => commands::loan::run_disclosure(args),
        Commands::Plan(args) => commands::loan::run_plan(args),
        Commands::Irr(args) => commands::time_value::run_irr(args),
        Commands::Npv(args) => commands::time_value::run_npv(args),
        Commands::Pmt(args) => commands::time_value::run_pmt(args),
        Commands::Apr(args) => commands::time_value::run_apr(args),
        Commands::Version => {
            println!("eir {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
