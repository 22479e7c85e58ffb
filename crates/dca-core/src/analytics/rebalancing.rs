use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::ledger::{last_filled_row, LedgerRow};
use crate::types::{round_money, round_percent, Money, Percent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebalanceAction {
    Buy,
    Sell,
    Hold,
}

/// Target sleeve weights and the drift allowed before acting, in
/// percentage points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalancingPolicy {
    pub target_swda: Percent,
    pub target_aggh: Percent,
    pub tolerance: Percent,
}

impl Default for RebalancingPolicy {
    fn default() -> Self {
        Self {
            target_swda: dec!(80),
            target_aggh: dec!(20),
            tolerance: dec!(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationAdvice {
    pub asset: String,
    pub current: Percent,
    pub target: Percent,
    pub difference: Percent,
    pub action: RebalanceAction,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rebalancing {
    pub needs_rebalancing: bool,
    pub allocations: Vec<AllocationAdvice>,
    pub tolerance: Percent,
    pub total_value: Money,
}

/// Rebalancing advice against the default 80/20 policy.
pub fn advise_rebalancing(rows: &[LedgerRow]) -> Option<Rebalancing> {
    advise_rebalancing_with(rows, &RebalancingPolicy::default())
}

/// Compare sleeve weights at the last valued row with `policy`.
///
/// Weights are taken against the two sleeves only, so cash and interest do
/// not dilute them. `None` when there is no valued row, the sleeves hold
/// nothing, or a weight is not representable.
pub fn advise_rebalancing_with(
    rows: &[LedgerRow],
    policy: &RebalancingPolicy,
) -> Option<Rebalancing> {
    let row = last_filled_row(rows)?;
    let swda = row.swda_now.unwrap_or(Decimal::ZERO);
    let aggh = row.aggh_now.unwrap_or(Decimal::ZERO);
    let asset_total = swda.checked_add(aggh)?;
    if asset_total <= Decimal::ZERO {
        return None;
    }

    let allocations = vec![
        advise_sleeve("SWDA", swda, policy.target_swda, asset_total, policy.tolerance)?,
        advise_sleeve("AGGH", aggh, policy.target_aggh, asset_total, policy.tolerance)?,
    ];
    let needs_rebalancing = allocations
        .iter()
        .any(|a| a.action != RebalanceAction::Hold);

    Some(Rebalancing {
        needs_rebalancing,
        allocations,
        tolerance: policy.tolerance,
        total_value: asset_total,
    })
}

fn advise_sleeve(
    asset: &str,
    value: Money,
    target: Percent,
    asset_total: Money,
    tolerance: Percent,
) -> Option<AllocationAdvice> {
    let current = value
        .checked_div(asset_total)?
        .checked_mul(Decimal::ONE_HUNDRED)?;
    let difference = current.checked_sub(target)?;

    let (action, amount) = if difference.abs() > tolerance {
        let action = if difference > Decimal::ZERO {
            RebalanceAction::Sell
        } else {
            RebalanceAction::Buy
        };
        let amount = (difference.abs() / Decimal::ONE_HUNDRED).checked_mul(asset_total)?;
        (action, round_money(amount))
    } else {
        (RebalanceAction::Hold, Decimal::ZERO)
    };

    Some(AllocationAdvice {
        asset: asset.to_string(),
        current: round_percent(current),
        target,
        difference: round_percent(difference),
        action,
        amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{build_ledger, AllocationParams, MonthlyRecord, ScenarioRates};

    fn rows_with(swda: Decimal, aggh: Decimal, cash: Option<Decimal>) -> Vec<LedgerRow> {
        let params = AllocationParams {
            end_ym: "2025-04".parse().unwrap(),
            pct_swda: dec!(80),
            pct_aggh: dec!(20),
            monthly_contribution: dec!(150),
            scenario_rates: ScenarioRates::default(),
        };
        let record = MonthlyRecord {
            month: "2025-04".parse().unwrap(),
            swda_value: Some(swda),
            aggh_value: Some(aggh),
            cash_interest: cash,
        };
        build_ledger(&[record], &params)
    }

    #[test]
    fn test_on_target_holds() {
        let advice = advise_rebalancing(&rows_with(dec!(480), dec!(120), None)).unwrap();
        assert!(!advice.needs_rebalancing);
        assert!(advice
            .allocations
            .iter()
            .all(|a| a.action == RebalanceAction::Hold && a.amount.is_zero()));
        assert_eq!(advice.total_value, dec!(600));
        assert_eq!(advice.tolerance, dec!(5));
    }

    #[test]
    fn test_drift_beyond_tolerance_trades() {
        let advice = advise_rebalancing(&rows_with(dec!(540), dec!(60), None)).unwrap();
        assert!(advice.needs_rebalancing);

        let swda = &advice.allocations[0];
        assert_eq!(swda.asset, "SWDA");
        assert_eq!(swda.current, dec!(90));
        assert_eq!(swda.difference, dec!(10));
        assert_eq!(swda.action, RebalanceAction::Sell);
        assert_eq!(swda.amount, dec!(60));

        let aggh = &advice.allocations[1];
        assert_eq!(aggh.action, RebalanceAction::Buy);
        assert_eq!(aggh.amount, dec!(60));
    }

    #[test]
    fn test_drift_inside_tolerance_holds() {
        // 84/16 is a 4 point drift
        let advice = advise_rebalancing(&rows_with(dec!(504), dec!(96), None)).unwrap();
        assert!(!advice.needs_rebalancing);
    }

    #[test]
    fn test_cash_does_not_dilute_weights() {
        let advice =
            advise_rebalancing(&rows_with(dec!(480), dec!(120), Some(dec!(400)))).unwrap();
        assert_eq!(advice.total_value, dec!(600));
        assert_eq!(advice.allocations[0].current, dec!(80));
    }

    #[test]
    fn test_no_sleeve_value_is_none() {
        assert_eq!(
            advise_rebalancing(&rows_with(dec!(0), dec!(0), Some(dec!(10)))),
            None
        );
        assert_eq!(advise_rebalancing(&[]), None);
    }

    #[test]
    fn test_custom_policy() {
        let policy = RebalancingPolicy {
            target_swda: dec!(60),
            target_aggh: dec!(40),
            tolerance: dec!(2),
        };
        let advice =
            advise_rebalancing_with(&rows_with(dec!(480), dec!(120), None), &policy).unwrap();
        assert_eq!(advice.allocations[0].action, RebalanceAction::Sell);
        assert_eq!(advice.allocations[0].amount, dec!(120));
        assert_eq!(advice.allocations[1].action, RebalanceAction::Buy);
    }
}
