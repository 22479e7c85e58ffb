use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use dca_core::time_value::{xirr, XirrSolution, XIRR_GUESS};
use dca_core::CashFlow;

use crate::input;

/// Arguments for a standalone XIRR solve
#[derive(Args)]
pub struct XirrArgs {
    /// Path to a JSON/YAML file with dated cash flows (overrides --flows)
    #[arg(long)]
    pub input: Option<String>,

    /// Dated cash flows as DATE:AMOUNT, comma-separated
    /// (e.g. "2025-01-01:-1000,2026-01-01:1100")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub flows: Option<Vec<String>>,

    /// Starting rate for Newton-Raphson, as a fraction
    #[arg(long)]
    pub guess: Option<Decimal>,
}

/// Either a bare list of flows or `{ "cash_flows": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlowsInput {
    Wrapped {
        #[serde(alias = "cashFlows")]
        cash_flows: Vec<CashFlow>,
    },
    Bare(Vec<CashFlow>),
}

pub fn run_xirr(args: XirrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let flows = match args.flows {
        Some(ref pairs) if args.input.is_none() => pairs
            .iter()
            .map(|p| parse_flow(p))
            .collect::<Result<Vec<_>, _>>()?,
        _ => match input::load::<FlowsInput>(args.input.as_deref(), "xirr")? {
            FlowsInput::Wrapped { cash_flows } | FlowsInput::Bare(cash_flows) => cash_flows,
        },
    };

    let solution: XirrSolution = xirr(&flows, args.guess.unwrap_or(XIRR_GUESS))?;
    if !solution.converged {
        tracing::warn!(
            iterations = solution.iterations,
            "xirr did not converge; reporting last iterate"
        );
    }
    Ok(serde_json::to_value(solution)?)
}

fn parse_flow(pair: &str) -> Result<CashFlow, Box<dyn std::error::Error>> {
    let (date, amount) = pair
        .rsplit_once(':')
        .ok_or_else(|| format!("Cash flow '{pair}' must look like YYYY-MM-DD:AMOUNT"))?;
    let date: NaiveDate = date
        .trim()
        .parse()
        .map_err(|e| format!("Bad date in '{pair}': {e}"))?;
    let amount: Decimal = amount
        .trim()
        .parse()
        .map_err(|e| format!("Bad amount in '{pair}': {e}"))?;
    Ok(CashFlow::new(date, amount, "cli"))
}
