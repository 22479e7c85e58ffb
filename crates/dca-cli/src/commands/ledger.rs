use chrono::NaiveDate;
use clap::Args;
use serde_json::Value;

use dca_core::analytics::kpi::compute_kpis;
use dca_core::dashboard::{analyze_portfolio, DcaInput};
use dca_core::ledger::build_ledger;

use crate::commands::as_of_or_today;
use crate::input;

/// Arguments shared by every command that reads records and parameters
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to a JSON/YAML file with `records` and `params`
    #[arg(long)]
    pub input: Option<String>,
}

impl PortfolioArgs {
    pub fn load(&self, command: &str) -> Result<DcaInput, Box<dyn std::error::Error>> {
        input::load(self.input.as_deref(), command)
    }
}

/// Arguments for the full dashboard run
#[derive(Args)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,

    /// Date to measure plan progress at (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

pub fn run_ledger(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = args.load("ledger")?;
    let rows = build_ledger(&data.records, &data.params);
    Ok(serde_json::to_value(rows)?)
}

pub fn run_kpi(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = args.load("kpi")?;
    let rows = build_ledger(&data.records, &data.params);
    let kpis = compute_kpis(&rows).ok_or("No valued month in the ledger yet")?;
    Ok(serde_json::to_value(kpis)?)
}

pub fn run_dashboard(args: DashboardArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = args.portfolio.load("dashboard")?;
    let output = analyze_portfolio(&data, as_of_or_today(args.as_of));
    Ok(serde_json::to_value(output)?)
}
