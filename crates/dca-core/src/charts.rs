use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analytics::metrics::period_returns;
use crate::analytics::scenarios::project_trajectory;
use crate::ledger::{AllocationParams, LedgerRow};
use crate::types::{round_percent, Money, Percent};

/// Chart-ready series. Every array has one entry per ledger row, aligned
/// with `labels`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub invested: Vec<Money>,
    pub actual: Vec<Option<Money>>,
    pub conservative: Vec<Money>,
    pub moderate: Vec<Money>,
    pub optimistic: Vec<Money>,
    /// Return since the previous valued row, placed on the later row.
    pub monthly_return_pct: Vec<Option<Percent>>,
}

pub fn build_chart_data(rows: &[LedgerRow], params: &AllocationParams) -> ChartData {
    let rates = &params.scenario_rates;
    let contribution = params.monthly_contribution;

    let returns: BTreeMap<_, _> = period_returns(rows)
        .into_iter()
        .filter_map(|p| {
            let pct = p.period_return.checked_mul(Decimal::ONE_HUNDRED)?;
            Some((p.to, round_percent(pct)))
        })
        .collect();

    ChartData {
        labels: rows.iter().map(|r| r.month.to_string()).collect(),
        invested: rows.iter().map(|r| r.invested_cum).collect(),
        actual: rows
            .iter()
            .map(|r| r.is_filled().then(|| r.value()))
            .collect(),
        conservative: project_trajectory(rows, contribution, rates.conservative),
        moderate: project_trajectory(rows, contribution, rates.moderate),
        optimistic: project_trajectory(rows, contribution, rates.optimistic),
        monthly_return_pct: rows.iter().map(|r| returns.get(&r.month).copied()).collect(),
    }
}
