use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{last_filled_row, LedgerRow};
use crate::types::{percent_of, Money, Percent};

/// Headline figures as of the last valued month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_invested: Money,
    pub current_value: Money,
    pub result: Money,
    pub result_pct: Percent,
}

/// Summarise the ledger at its most recent valued row, or `None` if no row
/// has been valued yet or the result is not representable.
pub fn compute_kpis(rows: &[LedgerRow]) -> Option<Kpis> {
    let row = last_filled_row(rows)?;
    let total_invested = row.invested_cum;
    let current_value = row.value();
    let result = current_value.checked_sub(total_invested)?;

    Some(Kpis {
        total_invested,
        current_value,
        result,
        result_pct: percent_of(result, total_invested).unwrap_or(Decimal::ZERO),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{build_ledger, AllocationParams, MonthlyRecord, ScenarioRates};
    use rust_decimal_macros::dec;

    fn params(end: &str) -> AllocationParams {
        AllocationParams {
            end_ym: end.parse().unwrap(),
            pct_swda: dec!(80),
            pct_aggh: dec!(20),
            monthly_contribution: dec!(100),
            scenario_rates: ScenarioRates::default(),
        }
    }

    #[test]
    fn test_kpis_none_without_valuations() {
        let records = vec![
            MonthlyRecord::empty("2025-01".parse().unwrap()),
            MonthlyRecord::empty("2025-02".parse().unwrap()),
        ];
        let rows = build_ledger(&records, &params("2025-03"));
        assert!(rows.iter().all(|r| !r.has_current));
        assert_eq!(compute_kpis(&rows), None);
        assert_eq!(compute_kpis(&[]), None);
    }

    #[test]
    fn test_kpis_skip_trailing_unreported_months() {
        let records = vec![MonthlyRecord::valued(
            "2025-02".parse().unwrap(),
            dec!(180),
            dec!(40),
        )];
        let rows = build_ledger(&records, &params("2025-06"));
        let kpis = compute_kpis(&rows).unwrap();
        assert_eq!(kpis.total_invested, dec!(200));
        assert_eq!(kpis.current_value, dec!(220));
        assert_eq!(kpis.result, dec!(20));
        assert_eq!(kpis.result_pct, dec!(10));
    }

    #[test]
    fn test_kpis_ignore_zero_valuation() {
        let records = vec![
            MonthlyRecord::valued("2025-01".parse().unwrap(), dec!(90), dec!(20)),
            MonthlyRecord::valued("2025-02".parse().unwrap(), dec!(0), dec!(0)),
        ];
        let rows = build_ledger(&records, &params("2025-02"));
        let kpis = compute_kpis(&rows).unwrap();
        assert_eq!(kpis.current_value, dec!(110));
        assert_eq!(kpis.total_invested, dec!(100));
    }
}
