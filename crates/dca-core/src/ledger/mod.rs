pub mod builder;
pub mod records;

pub use builder::{build_ledger, index_records, split_contribution, ContributionSplit, LedgerRow};
pub use records::{AllocationParams, MonthlyRecord, ScenarioRates};

/// Rows with a strictly positive valuation, in ledger order.
pub fn filled_rows(rows: &[LedgerRow]) -> Vec<&LedgerRow> {
    rows.iter().filter(|r| r.is_filled()).collect()
}

/// The most recent row with a strictly positive valuation. Trailing
/// unreported months are skipped.
pub fn last_filled_row(rows: &[LedgerRow]) -> Option<&LedgerRow> {
    rows.iter().rev().find(|r| r.is_filled())
}
