use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::calendar::{month_range, MonthKey, START_MONTH};
use crate::ledger::records::{AllocationParams, MonthlyRecord};
use crate::types::{percent_of, round_money, Money, Percent};

/// One month's contribution split across the two sleeves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionSplit {
    pub total: Money,
    pub swda: Money,
    pub aggh: Money,
}

/// A derived ledger line. Rebuilt from scratch on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub month: MonthKey,
    pub has_current: bool,
    pub invested_cum: Money,
    pub invested_cum_swda: Money,
    pub invested_cum_aggh: Money,
    pub total_now: Option<Money>,
    pub swda_now: Option<Money>,
    pub aggh_now: Option<Money>,
    pub cash_now: Option<Money>,
    pub res_total: Option<Money>,
    pub res_total_pct: Option<Percent>,
    pub res_swda: Option<Money>,
    pub res_swda_pct: Option<Percent>,
    pub res_aggh: Option<Money>,
    pub res_aggh_pct: Option<Percent>,
}

impl LedgerRow {
    /// A row carrying a usable, strictly positive valuation.
    pub fn is_filled(&self) -> bool {
        self.has_current && self.total_now.is_some_and(|v| v > Decimal::ZERO)
    }

    /// `total_now` of a filled row, zero otherwise.
    pub fn value(&self) -> Money {
        self.total_now.unwrap_or(Decimal::ZERO)
    }
}

/// Records keyed by month. A duplicated month keeps the record that came
/// last in input order.
#[derive(Debug, Default)]
pub struct RecordIndex<'a> {
    pub by_month: BTreeMap<MonthKey, &'a MonthlyRecord>,
    pub duplicates: Vec<MonthKey>,
}

pub fn index_records(records: &[MonthlyRecord]) -> RecordIndex<'_> {
    let mut index = RecordIndex::default();
    for record in records {
        if index.by_month.insert(record.month, record).is_some() {
            index.duplicates.push(record.month);
        }
    }
    index
}

/// Split a contribution by sleeve percentage, rounding each share to the
/// smallest currency unit. Any rounding remainder goes to the larger share
/// (SWDA on a tie), so `swda + aggh == total` always holds. `None` when a
/// share is not representable.
pub fn split_contribution(
    contribution: Money,
    pct_swda: Percent,
    pct_aggh: Percent,
) -> Option<ContributionSplit> {
    let share = |pct: Percent| {
        (pct / Decimal::ONE_HUNDRED)
            .checked_mul(contribution)
            .map(round_money)
    };
    let total = round_money(contribution);
    let mut swda = share(pct_swda)?;
    let mut aggh = share(pct_aggh)?;

    let remainder = total.checked_sub(swda.checked_add(aggh)?)?;
    if !remainder.is_zero() {
        if swda.abs() >= aggh.abs() {
            swda = swda.checked_add(remainder)?;
        } else {
            aggh = aggh.checked_add(remainder)?;
        }
    }

    Some(ContributionSplit { total, swda, aggh })
}

/// Build the cumulative ledger from `START_MONTH` through `params.end_ym`.
///
/// Every month on the axis contributes to the invested totals, whether or
/// not a record exists for it. Records outside the axis are ignored. The
/// ledger stops early if the invested totals stop being representable.
pub fn build_ledger(records: &[MonthlyRecord], params: &AllocationParams) -> Vec<LedgerRow> {
    let index = index_records(records);
    let axis = month_range(START_MONTH, params.end_ym);

    let ignored = index
        .by_month
        .keys()
        .filter(|m| **m < START_MONTH || **m > params.end_ym)
        .count();
    if ignored > 0 {
        tracing::debug!(ignored, end = %params.end_ym, "records outside the ledger horizon");
    }

    let Some(split) = split_contribution(
        params.monthly_contribution,
        params.pct_swda,
        params.pct_aggh,
    ) else {
        tracing::warn!(
            contribution = %params.monthly_contribution,
            "contribution split overflows; ledger is empty"
        );
        return Vec::new();
    };

    let mut rows = Vec::with_capacity(axis.len());
    let mut invested_cum = Decimal::ZERO;
    let mut invested_cum_swda = Decimal::ZERO;
    let mut invested_cum_aggh = Decimal::ZERO;

    for month in axis {
        let (Some(total), Some(swda), Some(aggh)) = (
            invested_cum.checked_add(split.total),
            invested_cum_swda.checked_add(split.swda),
            invested_cum_aggh.checked_add(split.aggh),
        ) else {
            tracing::warn!(%month, "invested totals overflow; ledger stops before this month");
            break;
        };
        invested_cum = total;
        invested_cum_swda = swda;
        invested_cum_aggh = aggh;

        let record = index.by_month.get(&month).copied();
        rows.push(value_row(
            month,
            record,
            invested_cum,
            invested_cum_swda,
            invested_cum_aggh,
        ));
    }
    rows
}

fn value_row(
    month: MonthKey,
    record: Option<&MonthlyRecord>,
    invested_cum: Money,
    invested_cum_swda: Money,
    invested_cum_aggh: Money,
) -> LedgerRow {
    let swda_now = record.and_then(|r| r.swda_value);
    let aggh_now = record.and_then(|r| r.aggh_value);
    let cash_now = record.and_then(|r| r.cash_interest);
    let has_current = swda_now.is_some() || aggh_now.is_some() || cash_now.is_some();

    // An unrepresentable sum leaves the row unvalued rather than wrong.
    let total_now = if has_current {
        [swda_now, aggh_now, cash_now]
            .into_iter()
            .flatten()
            .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
    } else {
        None
    };

    let res_total = total_now.and_then(|v| v.checked_sub(invested_cum));
    let res_swda = swda_now.and_then(|v| v.checked_sub(invested_cum_swda));
    let res_aggh = aggh_now.and_then(|v| v.checked_sub(invested_cum_aggh));

    LedgerRow {
        month,
        has_current,
        invested_cum,
        invested_cum_swda,
        invested_cum_aggh,
        total_now,
        swda_now,
        aggh_now,
        cash_now,
        res_total,
        res_total_pct: res_total.and_then(|r| percent_of(r, invested_cum)),
        res_swda,
        res_swda_pct: res_swda.and_then(|r| percent_of(r, invested_cum_swda)),
        res_aggh,
        res_aggh_pct: res_aggh.and_then(|r| percent_of(r, invested_cum_aggh)),
    }
}
