use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use dca_core::analytics::metrics::{compute_advanced_metrics, period_returns};
use dca_core::analytics::progress::compute_progress;
use dca_core::analytics::rebalancing::{advise_rebalancing_with, RebalancingPolicy};
use dca_core::analytics::scenarios::{project_scenarios, project_trajectory};
use dca_core::calendar::{MonthKey, START_MONTH};
use dca_core::charts::build_chart_data;
use dca_core::ledger::{build_ledger, AllocationParams, MonthlyRecord, ScenarioRates};

use crate::commands::as_of_or_today;
use crate::commands::ledger::PortfolioArgs;
use crate::input;

/// Arguments for plan progress
#[derive(Args)]
pub struct ProgressArgs {
    /// Path to a JSON/YAML file with `params` (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Last month of the plan, inclusive (YYYY-MM)
    #[arg(long)]
    pub end: Option<MonthKey>,

    /// Amount contributed every month
    #[arg(long)]
    pub monthly_contribution: Option<Decimal>,

    /// Date to measure progress at (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

/// Arguments for rebalancing advice
#[derive(Args)]
pub struct RebalanceArgs {
    /// Path to a JSON/YAML file with `records` and `params` (overrides value flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Current SWDA sleeve value
    #[arg(long)]
    pub swda_value: Option<Decimal>,

    /// Current AGGH sleeve value
    #[arg(long)]
    pub aggh_value: Option<Decimal>,

    /// Target SWDA weight in percent
    #[arg(long, default_value = "80")]
    pub target_swda: Decimal,

    /// Target AGGH weight in percent
    #[arg(long, default_value = "20")]
    pub target_aggh: Decimal,

    /// Allowed drift in percentage points
    #[arg(long, default_value = "5")]
    pub tolerance: Decimal,
}

#[derive(Debug, Serialize)]
struct TrajectoryPoint {
    month: MonthKey,
    invested: Decimal,
    conservative: Decimal,
    moderate: Decimal,
    optimistic: Decimal,
}

/// Progress input: either `{ "params": {...} }` or the bare params object.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProgressInput {
    Wrapped { params: AllocationParams },
    Bare(AllocationParams),
}

impl ProgressInput {
    fn into_params(self) -> AllocationParams {
        match self {
            ProgressInput::Wrapped { params } | ProgressInput::Bare(params) => params,
        }
    }
}

pub fn run_scenarios(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = args.load("scenarios")?;
    let rows = build_ledger(&data.records, &data.params);
    let scenarios = project_scenarios(&rows, &data.params.scenario_rates)
        .ok_or("No valued month in the ledger yet")?;
    Ok(serde_json::to_value(scenarios)?)
}

pub fn run_trajectory(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = args.load("trajectory")?;
    let params = &data.params;
    let rows = build_ledger(&data.records, params);
    let rates = &params.scenario_rates;
    let contribution = params.monthly_contribution;

    let conservative = project_trajectory(&rows, contribution, rates.conservative);
    let moderate = project_trajectory(&rows, contribution, rates.moderate);
    let optimistic = project_trajectory(&rows, contribution, rates.optimistic);

    let points: Vec<TrajectoryPoint> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| TrajectoryPoint {
            month: row.month,
            invested: row.invested_cum,
            conservative: conservative[i],
            moderate: moderate[i],
            optimistic: optimistic[i],
        })
        .collect();
    Ok(serde_json::to_value(points)?)
}

pub fn run_progress(args: ProgressArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = if args.input.is_some() {
        input::load::<ProgressInput>(args.input.as_deref(), "progress")?.into_params()
    } else {
        let end = args.end.ok_or("--end is required (or provide --input)")?;
        let contribution = args
            .monthly_contribution
            .ok_or("--monthly-contribution is required (or provide --input)")?;
        AllocationParams {
            end_ym: end,
            pct_swda: Decimal::ONE_HUNDRED,
            pct_aggh: Decimal::ZERO,
            monthly_contribution: contribution,
            scenario_rates: ScenarioRates::default(),
        }
    };

    let progress = compute_progress(&params, as_of_or_today(args.as_of));
    Ok(serde_json::to_value(progress)?)
}

pub fn run_metrics(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = args.load("metrics")?;
    let rows = build_ledger(&data.records, &data.params);
    let metrics =
        compute_advanced_metrics(&rows).ok_or("At least 2 valued months are required")?;

    let mut value = serde_json::to_value(metrics)?;
    value["period_returns"] = serde_json::to_value(period_returns(&rows))?;
    Ok(value)
}

pub fn run_rebalance(args: RebalanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let policy = RebalancingPolicy {
        target_swda: args.target_swda,
        target_aggh: args.target_aggh,
        tolerance: args.tolerance,
    };

    let rows = if args.input.is_some() {
        let data: dca_core::dashboard::DcaInput = input::load(args.input.as_deref(), "rebalance")?;
        build_ledger(&data.records, &data.params)
    } else {
        let swda = args
            .swda_value
            .ok_or("--swda-value is required (or provide --input)")?;
        let aggh = args
            .aggh_value
            .ok_or("--aggh-value is required (or provide --input)")?;
        let params = AllocationParams {
            end_ym: START_MONTH,
            pct_swda: policy.target_swda,
            pct_aggh: policy.target_aggh,
            monthly_contribution: Decimal::ZERO,
            scenario_rates: ScenarioRates::default(),
        };
        build_ledger(&[MonthlyRecord::valued(START_MONTH, swda, aggh)], &params)
    };

    let advice = advise_rebalancing_with(&rows, &policy).ok_or("Nothing to rebalance")?;
    Ok(serde_json::to_value(advice)?)
}

pub fn run_chart(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = args.load("chart")?;
    let rows = build_ledger(&data.records, &data.params);
    Ok(serde_json::to_value(build_chart_data(&rows, &data.params))?)
}
