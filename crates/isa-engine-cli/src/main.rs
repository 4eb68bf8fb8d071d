mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::compare::CompareLoanArgs;
use commands::pricing::{ScheduleArgs, TermsArgs};
use commands::project::ProjectArgs;

/// Income-share-agreement financing calculations
#[derive(Parser)]
#[command(
    name = "isa",
    version,
    about = "Income-share-agreement financing calculations",
    long_about = "A CLI for pricing income-share agreements with decimal precision. \
                  Projects borrower income paths, solves repayment rates against a \
                  target investor return, builds cap-truncated repayment schedules, \
                  and produces fixed-rate loan comparison baselines."
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
    /// Project an annual income series from a base salary or a degree/school pair
    Project(ProjectArgs),
    /// Solve the repayment rate and build the year-by-year schedule
    Schedule(ScheduleArgs),
    /// Solve ISA terms (repayment rate and effective annual rate)
    Terms(TermsArgs),
    /// Fixed-rate loan comparison baseline (monthly payment, fee-adjusted APR)
    CompareLoan(CompareLoanArgs),
    /// List the degree-program reference catalog
    Degrees,
    /// List the school reference catalog
    Schools,
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
        Commands::Project(args) => commands::project::run_project(args),
        Commands::Schedule(args) => commands::pricing::run_schedule(args),
        Commands::Terms(args) => commands::pricing::run_terms(args),
        Commands::CompareLoan(args) => commands::compare::run_compare_loan(args),
        Commands::Degrees => commands::reference::run_degrees(),
        Commands::Schools => commands::reference::run_schools(),
        Commands::Version => {
            println!("isa {}", env!("CARGO_PKG_VERSION"));
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
