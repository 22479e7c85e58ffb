mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::analytics::{ProgressArgs, RebalanceArgs};
use commands::calendar::MonthsArgs;
use commands::ledger::{DashboardArgs, PortfolioArgs};
use commands::time_value::XirrArgs;

/// Dollar-cost-averaging ledger and return analytics
#[derive(Parser)]
#[command(
    name = "dca",
    version,
    about = "Dollar-cost-averaging ledger and return analytics",
    long_about = "A CLI for a two-sleeve (SWDA/AGGH) monthly accumulation plan with \
                  decimal precision. Builds the cumulative ledger and derives KPIs, \
                  scenario projections, plan progress, TWR/MWR returns, rebalancing \
                  advice and chart series."
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
    /// List the plan months from the start month to an end month
    Months(MonthsArgs),
    /// Build the monthly ledger from records and plan parameters
    Ledger(PortfolioArgs),
    /// Headline figures at the last valued month
    Kpi(PortfolioArgs),
    /// Compare the current value with one year of growth on the invested capital, at three rates
    Scenarios(PortfolioArgs),
    /// Month-by-month projected value under each scenario rate
    Trajectory(PortfolioArgs),
    /// Contribution progress against the plan target
    Progress(ProgressArgs),
    /// Time-weighted, money-weighted and annualized returns
    Metrics(PortfolioArgs),
    /// Solve XIRR for a set of dated cash flows
    Xirr(XirrArgs),
    /// Compare sleeve weights with the target allocation
    Rebalance(RebalanceArgs),
    /// Chart series for the dashboard
    Chart(PortfolioArgs),
    /// Run every analysis over one ledger
    Dashboard(DashboardArgs),
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

/// Log to stderr so stdout stays machine readable. `RUST_LOG` overrides the
/// default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Months(args) => commands::calendar::run_months(args),
        Commands::Ledger(args) => commands::ledger::run_ledger(args),
        Commands::Kpi(args) => commands::ledger::run_kpi(args),
        Commands::Scenarios(args) => commands::analytics::run_scenarios(args),
        Commands::Trajectory(args) => commands::analytics::run_trajectory(args),
        Commands::Progress(args) => commands::analytics::run_progress(args),
        Commands::Metrics(args) => commands::analytics::run_metrics(args),
        Commands::Xirr(args) => commands::time_value::run_xirr(args),
        Commands::Rebalance(args) => commands::analytics::run_rebalance(args),
        Commands::Chart(args) => commands::analytics::run_chart(args),
        Commands::Dashboard(args) => commands::ledger::run_dashboard(args),
        Commands::Version => {
            println!("dca {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            if let Err(e) = output::format_output(&cli.output, &value) {
                eprintln!("{}: failed to write output: {}", "error".red().bold(), e);
                process::exit(1);
            }
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
