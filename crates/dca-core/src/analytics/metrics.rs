use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calendar::MonthKey;
use crate::ledger::{filled_rows, LedgerRow};
use crate::time_value::{xirr, year_fraction, XIRR_GUESS};
use crate::types::{round_percent, CashFlow, Percent, Rate};

/// Period returns outside this band are treated as bad data.
const MIN_PERIOD_RETURN: Rate = dec!(-0.5);
const MAX_PERIOD_RETURN: Rate = dec!(1.0);

/// Plausible band for the annualised return, in percent.
const MIN_ANNUALIZED_PCT: Percent = dec!(-90);
const MAX_ANNUALIZED_PCT: Percent = dec!(500);

const MIN_MWR_FLOWS: usize = 3;

const FIRST_FLOW_DAY: u32 = 1;
const CONTRIBUTION_DAY: u32 = 15;
const VALUATION_DAY: u32 = 28;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedMetrics {
    pub time_weighted_return: Percent,
    pub money_weighted_return: Percent,
    pub annualized_return: Percent,
    /// Number of valued rows the metrics were computed from.
    pub filled_periods: usize,
    /// TWR periods dropped by the sanity band.
    pub discarded_periods: usize,
}

/// Return between two consecutive valued rows, net of the contributions made
/// in between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReturn {
    pub from: MonthKey,
    pub to: MonthKey,
    pub period_return: Rate,
}

/// `(value - net_contribution - prev_value) / prev_value`, or `None` when the
/// previous value is not positive or the return is not representable.
pub fn period_return(prev: &LedgerRow, current: &LedgerRow) -> Option<Rate> {
    let prev_value = prev.value();
    if prev_value <= Decimal::ZERO {
        return None;
    }
    let net_contribution = current.invested_cum.checked_sub(prev.invested_cum)?;
    let market_value_change = current.value().checked_sub(net_contribution)?;
    market_value_change
        .checked_sub(prev_value)?
        .checked_div(prev_value)
}

/// Period returns for every adjacent pair of valued rows. Unfiltered.
pub fn period_returns(rows: &[LedgerRow]) -> Vec<PeriodReturn> {
    filled_rows(rows)
        .windows(2)
        .filter_map(|pair| {
            period_return(pair[0], pair[1]).map(|r| PeriodReturn {
                from: pair[0].month,
                to: pair[1].month,
                period_return: r,
            })
        })
        .collect()
}

/// Time-weighted, money-weighted and annualised returns. `None` with fewer
/// than two valued rows.
pub fn compute_advanced_metrics(rows: &[LedgerRow]) -> Option<AdvancedMetrics> {
    let filled = filled_rows(rows);
    if filled.len() < 2 {
        return None;
    }

    let (time_weighted_return, discarded_periods) = time_weighted_return(&filled);

    Some(AdvancedMetrics {
        time_weighted_return,
        money_weighted_return: money_weighted_return(&filled),
        annualized_return: annualized_return(&filled),
        filled_periods: filled.len(),
        discarded_periods,
    })
}

/// Chain-linked TWR in percent, plus the number of discarded periods.
/// 0 when the chained growth is not representable.
pub fn time_weighted_return(filled: &[&LedgerRow]) -> (Percent, usize) {
    let mut cumulative = Decimal::ONE;
    let mut discarded = 0;

    for pair in filled.windows(2) {
        match period_return(pair[0], pair[1]) {
            Some(r) if (MIN_PERIOD_RETURN..=MAX_PERIOD_RETURN).contains(&r) => {
                let Some(next) = cumulative.checked_mul(Decimal::ONE + r) else {
                    tracing::debug!(month = %pair[1].month, "chained growth overflows");
                    return (Decimal::ZERO, discarded);
                };
                cumulative = next;
            }
            other => {
                tracing::debug!(
                    month = %pair[1].month,
                    period_return = ?other,
                    "discarding implausible period return"
                );
                discarded += 1;
            }
        }
    }

    let twr = (cumulative - Decimal::ONE)
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(round_percent)
        .unwrap_or(Decimal::ZERO);
    (twr, discarded)
}

/// Investor cash flows implied by the valued rows: the opening invested
/// capital, each later increase in invested capital, and the closing value.
pub fn mwr_cash_flows(filled: &[&LedgerRow]) -> Vec<CashFlow> {
    let (Some(first), Some(last)) = (filled.first(), filled.last()) else {
        return Vec::new();
    };

    let mut flows = Vec::with_capacity(filled.len() + 1);
    if let Some(date) = first.month.day(FIRST_FLOW_DAY) {
        flows.push(CashFlow::new(date, -first.invested_cum, "initial"));
    }

    for pair in filled.windows(2) {
        let added = pair[1].invested_cum - pair[0].invested_cum;
        if added.is_zero() {
            continue;
        }
        if let Some(date) = pair[1].month.day(CONTRIBUTION_DAY) {
            flows.push(CashFlow::new(date, -added, "contribution"));
        }
    }

    if let Some(date) = last.month.day(VALUATION_DAY) {
        flows.push(CashFlow::new(date, last.value(), "valuation"));
    }
    flows
}

/// XIRR of the implied cash flows, in percent. 0 when it cannot be solved.
pub fn money_weighted_return(filled: &[&LedgerRow]) -> Percent {
    let flows = mwr_cash_flows(filled);
    if flows.len() < MIN_MWR_FLOWS {
        return Decimal::ZERO;
    }

    match xirr(&flows, XIRR_GUESS) {
        Ok(solution) => round_percent(solution.rate * Decimal::ONE_HUNDRED),
        Err(e) => {
            tracing::debug!(error = %e, "money-weighted return unavailable");
            Decimal::ZERO
        }
    }
}

/// Compound annual growth from the first invested capital to the last
/// value, in percent. 0 when the inputs or the result are implausible.
pub fn annualized_return(filled: &[&LedgerRow]) -> Percent {
    let (Some(first), Some(last)) = (filled.first(), filled.last()) else {
        return Decimal::ZERO;
    };
    let first_invested = first.invested_cum;
    let last_value = last.value();
    if first_invested <= Decimal::ZERO || last_value <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let (Some(first_date), Some(last_date)) = (
        first.month.day(FIRST_FLOW_DAY),
        last.month.day(VALUATION_DAY),
    ) else {
        return Decimal::ZERO;
    };
    let years = year_fraction(first_date, last_date);
    if years <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    // last / first is 1 + total return; both are positive here
    let Some(growth) = last_value
        .checked_div(first_invested)
        .and_then(|ratio| ratio.checked_powd(Decimal::ONE / years))
    else {
        return Decimal::ZERO;
    };
    let Some(annualized) = (growth - Decimal::ONE).checked_mul(Decimal::ONE_HUNDRED) else {
        return Decimal::ZERO;
    };
    if !(MIN_ANNUALIZED_PCT..=MAX_ANNUALIZED_PCT).contains(&annualized) {
        return Decimal::ZERO;
    }
    round_percent(annualized)
}
