use clap::Args;
use serde::Serialize;
use serde_json::Value;

use dca_core::calendar::{month_range, MonthKey, START_MONTH};

/// Arguments for listing the months of the plan
#[derive(Args)]
pub struct MonthsArgs {
    /// Last month of the plan, inclusive (YYYY-MM)
    #[arg(long)]
    pub end: MonthKey,

    /// First month (YYYY-MM); defaults to the plan start
    #[arg(long)]
    pub start: Option<MonthKey>,
}

#[derive(Debug, Serialize)]
struct MonthsOutput {
    start: MonthKey,
    end: MonthKey,
    count: usize,
    months: Vec<MonthKey>,
}

pub fn run_months(args: MonthsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = args.start.unwrap_or(START_MONTH);
    let months = month_range(start, args.end);
    let output = MonthsOutput {
        start,
        end: args.end,
        count: months.len(),
        months,
    };
    Ok(serde_json::to_value(output)?)
}
