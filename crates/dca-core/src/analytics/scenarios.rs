use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calendar::MonthKey;
use crate::ledger::{last_filled_row, LedgerRow, ScenarioRates};
use crate::types::{round_money, Money, Percent, Rate};

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// What a constant annual growth rate would have produced on the capital
/// invested so far, compared with the actual value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub rate: Rate,
    pub rate_pct: Percent,
    pub value: Money,
    pub diff: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub conservative: ScenarioProjection,
    pub moderate: ScenarioProjection,
    pub optimistic: ScenarioProjection,
}

/// Point-in-time comparison at the last valued row: one period of growth on
/// the invested capital, `invested * (1 + rate)`.
///
/// `None` without a valued row, or when a projection is not representable.
pub fn project_scenarios(rows: &[LedgerRow], rates: &ScenarioRates) -> Option<ScenarioSet> {
    let row = last_filled_row(rows)?;
    let invested = row.invested_cum;
    let current_value = row.value();

    let project = |rate_pct: Percent| {
        let rate = rate_pct / Decimal::ONE_HUNDRED;
        let value = (Decimal::ONE + rate).checked_mul(invested).map(round_money)?;
        Some(ScenarioProjection {
            rate,
            rate_pct,
            value,
            diff: current_value.checked_sub(value)?,
        })
    };

    match (
        project(rates.conservative),
        project(rates.moderate),
        project(rates.optimistic),
    ) {
        (Some(conservative), Some(moderate), Some(optimistic)) => Some(ScenarioSet {
            conservative,
            moderate,
            optimistic,
        }),
        _ => {
            tracing::debug!(month = %row.month, "scenario projection overflows");
            None
        }
    }
}

/// A projected path plus the first month the growth stopped being
/// representable, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub path: Vec<Money>,
    pub saturated_from: Option<MonthKey>,
}

/// Month-by-month path of a portfolio growing at a constant annual rate,
/// one entry per ledger row:
/// `state = (state + contribution) * (1 + annual_rate / 12)`.
///
/// Independent of actual valuations. Once the next state would overflow the
/// path holds its last representable value for the remaining months.
pub fn trace_trajectory(
    rows: &[LedgerRow],
    monthly_contribution: Money,
    annual_rate_pct: Percent,
) -> Trajectory {
    let contribution = round_money(monthly_contribution);
    let growth = Decimal::ONE + annual_rate_pct / Decimal::ONE_HUNDRED / MONTHS_PER_YEAR;

    let mut path = Vec::with_capacity(rows.len());
    let mut saturated_from = None;
    let mut state = Decimal::ZERO;

    for row in rows {
        if saturated_from.is_none() {
            match state
                .checked_add(contribution)
                .and_then(|v| v.checked_mul(growth))
            {
                Some(next) => state = next,
                None => {
                    tracing::warn!(
                        month = %row.month,
                        rate = %annual_rate_pct,
                        "projected value overflows; holding the last representable value"
                    );
                    saturated_from = Some(row.month);
                }
            }
        }
        path.push(round_money(state));
    }

    Trajectory {
        path,
        saturated_from,
    }
}

/// The path alone, see [`trace_trajectory`].
pub fn project_trajectory(
    rows: &[LedgerRow],
    monthly_contribution: Money,
    annual_rate_pct: Percent,
) -> Vec<Money> {
    trace_trajectory(rows, monthly_contribution, annual_rate_pct).path
}
