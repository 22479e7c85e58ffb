use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::{months_between_inclusive, MonthKey, START_MONTH};
use crate::ledger::AllocationParams;
use crate::types::{round_percent, Money, Percent};

/// Planned contributions made so far against the whole plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub invested: Money,
    pub total_target: Money,
    pub percentage: Percent,
    pub remaining: Money,
    pub total_months: u32,
    pub months_elapsed: u32,
    pub months_remaining: u32,
}

/// Contribution progress as of `as_of`, clamped to the plan's end month.
/// Money totals saturate at the decimal bounds.
pub fn compute_progress(params: &AllocationParams, as_of: NaiveDate) -> Progress {
    let contribution = params.monthly_contribution;
    let total_months = months_between_inclusive(START_MONTH, params.end_ym);
    let total_target = Decimal::from(total_months).saturating_mul(contribution);

    let as_of_month = MonthKey::from_date(as_of).min(params.end_ym);
    let months_elapsed = months_between_inclusive(START_MONTH, as_of_month);
    let invested = Decimal::from(months_elapsed).saturating_mul(contribution);

    let percentage = if total_target > Decimal::ZERO {
        round_percent((invested / total_target * Decimal::ONE_HUNDRED).min(Decimal::ONE_HUNDRED))
    } else {
        Decimal::ZERO
    };

    Progress {
        invested,
        total_target,
        percentage,
        remaining: total_target.saturating_sub(invested).max(Decimal::ZERO),
        total_months,
        months_elapsed,
        months_remaining: total_months.saturating_sub(months_elapsed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ScenarioRates;
    use rust_decimal_macros::dec;

    fn params(end: &str, contribution: Decimal) -> AllocationParams {
        AllocationParams {
            end_ym: end.parse().unwrap(),
            pct_swda: dec!(80),
            pct_aggh: dec!(20),
            monthly_contribution: contribution,
            scenario_rates: ScenarioRates::default(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_progress_midway() {
        let progress = compute_progress(&params("2025-12", dec!(150)), date(2025, 6, 17));
        assert_eq!(progress.total_months, 12);
        assert_eq!(progress.months_elapsed, 6);
        assert_eq!(progress.months_remaining, 6);
        assert_eq!(progress.total_target, dec!(1800));
        assert_eq!(progress.invested, dec!(900));
        assert_eq!(progress.percentage, dec!(50));
        assert_eq!(progress.remaining, dec!(900));
    }

    #[test]
    fn test_progress_clamped_after_end() {
        let progress = compute_progress(&params("2025-12", dec!(150)), date(2027, 3, 1));
        assert_eq!(progress.months_elapsed, 12);
        assert_eq!(progress.percentage, dec!(100));
        assert_eq!(progress.remaining, Decimal::ZERO);
    }

    #[test]
    fn test_progress_before_start() {
        let progress = compute_progress(&params("2025-12", dec!(150)), date(2024, 11, 30));
        assert_eq!(progress.months_elapsed, 0);
        assert_eq!(progress.invested, Decimal::ZERO);
        assert_eq!(progress.percentage, Decimal::ZERO);
        assert_eq!(progress.remaining, dec!(1800));
    }

    #[test]
    fn test_progress_zero_target() {
        let progress = compute_progress(&params("2025-12", Decimal::ZERO), date(2025, 6, 1));
        assert_eq!(progress.total_target, Decimal::ZERO);
        assert_eq!(progress.percentage, Decimal::ZERO);
        assert_eq!(progress.remaining, Decimal::ZERO);
    }

    #[test]
    fn test_progress_end_before_start() {
        let progress = compute_progress(&params("2024-06", dec!(100)), date(2025, 6, 1));
        assert_eq!(progress.total_months, 0);
        assert_eq!(progress.months_elapsed, 0);
        assert_eq!(progress.percentage, Decimal::ZERO);
    }
}
