use chrono::NaiveDate;
use dca_core::analytics::kpi::compute_kpis;
use dca_core::analytics::metrics::compute_advanced_metrics;
use dca_core::analytics::rebalancing::{advise_rebalancing, RebalanceAction};
use dca_core::dashboard::{analyze_portfolio, DcaInput};
use dca_core::ledger::{build_ledger, AllocationParams, MonthlyRecord, ScenarioRates};
use dca_core::time_value::{xirr, XIRR_GUESS};
use dca_core::types::CashFlow;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

fn params(end: &str) -> AllocationParams {
    AllocationParams {
        end_ym: end.parse().unwrap(),
        pct_swda: dec!(80),
        pct_aggh: dec!(20),
        monthly_contribution: dec!(150),
        scenario_rates: ScenarioRates {
            conservative: dec!(3),
            moderate: dec!(5),
            optimistic: dec!(7),
        },
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn flow(date: NaiveDate, amount: Decimal) -> CashFlow {
    CashFlow {
        date,
        amount,
        label: None,
    }
}

// ---------------------------------------------------------------------------
// XIRR
// ---------------------------------------------------------------------------

#[test]
fn test_xirr_matches_known_rate() {
    for rate in [dec!(0.05), dec!(0.12), dec!(-0.2)] {
        let start = date(2022, 3, 1);
        let end = date(2023, 3, 1);
        let years = Decimal::from((end - start).num_days()) / dec!(365.25);
        let payoff = dec!(1000) * (Decimal::ONE + rate).powd(years);
        let flows = vec![flow(start, dec!(-1000)), flow(end, payoff)];

        let solution = xirr(&flows, XIRR_GUESS).unwrap();
        assert!(
            (solution.rate - rate).abs() < dec!(0.0001),
            "expected {rate}, got {}",
            solution.rate
        );
    }
}

#[test]
fn test_xirr_single_sign_never_panics() {
    let flows = vec![
        flow(date(2025, 1, 1), dec!(-100)),
        flow(date(2025, 2, 15), dec!(-100)),
        flow(date(2025, 3, 28), dec!(-100)),
    ];
    assert!(xirr(&flows, XIRR_GUESS).is_err());
}

// ---------------------------------------------------------------------------
// Ledger-driven analytics
// ---------------------------------------------------------------------------

#[test]
fn test_unvalued_ledger_has_no_kpis() {
    let records: Vec<MonthlyRecord> = ["2025-01", "2025-02", "2025-03"]
        .iter()
        .map(|m| MonthlyRecord::empty(m.parse().unwrap()))
        .collect();
    let rows = build_ledger(&records, &params("2025-03"));
    assert_eq!(compute_kpis(&rows), None);
    assert_eq!(compute_advanced_metrics(&rows), None);
    assert_eq!(advise_rebalancing(&rows), None);
}

#[test]
fn test_rebalancing_boundary() {
    let on_target = build_ledger(
        &[MonthlyRecord::valued("2025-04".parse().unwrap(), dec!(480), dec!(120))],
        &params("2025-04"),
    );
    let advice = advise_rebalancing(&on_target).unwrap();
    assert!(!advice.needs_rebalancing);
    assert!(advice
        .allocations
        .iter()
        .all(|a| a.action == RebalanceAction::Hold));

    let drifted = build_ledger(
        &[MonthlyRecord::valued("2025-04".parse().unwrap(), dec!(540), dec!(60))],
        &params("2025-04"),
    );
    let advice = advise_rebalancing(&drifted).unwrap();
    assert!(advice.needs_rebalancing);
    assert_eq!(advice.allocations[0].action, RebalanceAction::Sell);
    assert_eq!(advice.allocations[1].action, RebalanceAction::Buy);
}

#[test]
fn test_mwr_degenerates_to_zero_without_contributions() {
    let mut p = params("2025-03");
    p.monthly_contribution = Decimal::ZERO;
    let records = vec![
        MonthlyRecord::valued("2025-01".parse().unwrap(), dec!(100), dec!(0)),
        MonthlyRecord::valued("2025-03".parse().unwrap(), dec!(110), dec!(0)),
    ];
    let rows = build_ledger(&records, &p);
    let metrics = compute_advanced_metrics(&rows).unwrap();
    // Nothing invested: no outflows, so no MWR and no annualised figure
    assert_eq!(metrics.money_weighted_return, Decimal::ZERO);
    assert_eq!(metrics.annualized_return, Decimal::ZERO);
}

#[test]
fn test_full_year_of_steady_growth() {
    // Value grows 1% a month on top of contributions
    let mut value = Decimal::ZERO;
    let mut records = Vec::new();
    let mut month = "2025-01".parse().unwrap();
    for _ in 0..12 {
        value = ((value + dec!(150)) * dec!(1.01)).round_dp(2);
        records.push(MonthlyRecord::valued(month, value * dec!(0.8), value * dec!(0.2)));
        month = dca_core::calendar::MonthKey::next(&month);
    }
    let rows = build_ledger(&records, &params("2025-12"));
    let metrics = compute_advanced_metrics(&rows).unwrap();

    assert_eq!(metrics.filled_periods, 12);
    assert_eq!(metrics.discarded_periods, 0);
    assert!(metrics.time_weighted_return > dec!(5));
    assert!(metrics.time_weighted_return < dec!(20));
    assert!(metrics.money_weighted_return > Decimal::ZERO);
}

#[test]
fn test_dashboard_serialises_envelope() {
    let input = DcaInput {
        records: vec![
            MonthlyRecord::valued("2025-02".parse().unwrap(), dec!(250), dec!(60)),
            MonthlyRecord::valued("2025-03".parse().unwrap(), dec!(380), dec!(90)),
        ],
        params: params("2025-12"),
    };
    let output = analyze_portfolio(&input, date(2025, 3, 31));
    let value = serde_json::to_value(&output).unwrap();

    assert!(value["result"]["kpis"].is_object());
    assert!(value["result"]["advanced_metrics"].is_object());
    assert_eq!(value["result"]["ledger"].as_array().unwrap().len(), 12);
    assert_eq!(value["result"]["progress"]["months_elapsed"], 3);
    assert_eq!(value["metadata"]["precision"], "rust_decimal_128bit");
}
