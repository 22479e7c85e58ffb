use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::analytics::kpi::{compute_kpis, Kpis};
use crate::analytics::metrics::{compute_advanced_metrics, AdvancedMetrics};
use crate::analytics::progress::{compute_progress, Progress};
use crate::analytics::rebalancing::{advise_rebalancing, Rebalancing};
use crate::analytics::scenarios::{project_scenarios, trace_trajectory, ScenarioSet};
use crate::calendar::{months_between_inclusive, START_MONTH};
use crate::charts::{build_chart_data, ChartData};
use crate::ledger::{build_ledger, index_records, AllocationParams, LedgerRow, MonthlyRecord};
use crate::types::{with_metadata, ComputationOutput};

/// Everything the engine needs for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcaInput {
    #[serde(default)]
    pub records: Vec<MonthlyRecord>,
    pub params: AllocationParams,
}

/// Every dashboard figure, derived from a single ledger snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub ledger: Vec<LedgerRow>,
    pub kpis: Option<Kpis>,
    pub scenarios: Option<ScenarioSet>,
    pub progress: Progress,
    pub advanced_metrics: Option<AdvancedMetrics>,
    pub rebalancing: Option<Rebalancing>,
    pub chart: ChartData,
}

/// Build the ledger once and run every analysis over it.
pub fn analyze_portfolio(input: &DcaInput, as_of: NaiveDate) -> ComputationOutput<Dashboard> {
    let start = Instant::now();
    let params = &input.params;
    let mut warnings = input_warnings(input);

    let ledger = build_ledger(&input.records, params);
    warnings.extend(ledger_warnings(&ledger, params));
    let dashboard = Dashboard {
        kpis: compute_kpis(&ledger),
        scenarios: project_scenarios(&ledger, &params.scenario_rates),
        progress: compute_progress(params, as_of),
        advanced_metrics: compute_advanced_metrics(&ledger),
        rebalancing: advise_rebalancing(&ledger),
        chart: build_chart_data(&ledger, params),
        ledger,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    tracing::debug!(
        rows = dashboard.ledger.len(),
        elapsed_us = elapsed,
        "portfolio analysed"
    );

    with_metadata(
        "DCA ledger with TWR (linked monthly returns), MWR (XIRR Newton-Raphson) and 80/20 rebalancing",
        params,
        warnings,
        elapsed,
        dashboard,
    )
}

/// Input problems the engine tolerates but the caller should know about.
pub fn input_warnings(input: &DcaInput) -> Vec<String> {
    let params = &input.params;
    let mut warnings = Vec::new();

    match params.pct_swda.checked_add(params.pct_aggh) {
        Some(sum) if sum == Decimal::ONE_HUNDRED => {}
        Some(sum) => warnings.push(format!("Sleeve percentages sum to {sum} instead of 100")),
        None => warnings.push("Sleeve percentages are too large to add up".to_string()),
    }
    if params.end_ym < START_MONTH {
        warnings.push(format!(
            "End month {} is before the plan start {}; the ledger is empty",
            params.end_ym, START_MONTH
        ));
    }
    if params.monthly_contribution < Decimal::ZERO {
        warnings.push("Monthly contribution is negative".to_string());
    }
    let rates = params.scenario_rates.named();
    if rates.windows(2).any(|pair| pair[0].1 > pair[1].1) {
        let listed: Vec<String> = rates.iter().map(|(name, pct)| format!("{name} {pct}%")).collect();
        warnings.push(format!(
            "Scenario rates are not ascending: {}",
            listed.join(", ")
        ));
    }

    let index = index_records(&input.records);
    for month in &index.duplicates {
        warnings.push(format!("Duplicate record for {month}; the last one was used"));
    }
    let outside: Vec<String> = index
        .by_month
        .keys()
        .filter(|m| **m < START_MONTH || **m > params.end_ym)
        .map(|m| m.to_string())
        .collect();
    if !outside.is_empty() {
        warnings.push(format!(
            "Ignored records outside {}..{}: {}",
            START_MONTH,
            params.end_ym,
            outside.join(", ")
        ));
    }

    warnings
}

/// Figures that stopped short because the amounts outgrew the decimal range.
pub fn ledger_warnings(ledger: &[LedgerRow], params: &AllocationParams) -> Vec<String> {
    let mut warnings = Vec::new();

    let planned = months_between_inclusive(START_MONTH, params.end_ym) as usize;
    if ledger.len() < planned {
        match ledger.last() {
            Some(row) => warnings.push(format!(
                "Invested totals overflow after {}; the ledger stops there",
                row.month
            )),
            None => warnings.push(
                "Monthly contribution cannot be split into representable amounts; the ledger is empty"
                    .to_string(),
            ),
        }
    }

    for (name, pct) in params.scenario_rates.named() {
        let trajectory = trace_trajectory(ledger, params.monthly_contribution, pct);
        if let Some(month) = trajectory.saturated_from {
            warnings.push(format!(
                "The {name} projection overflows at {month}; later months repeat the last value"
            ));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ScenarioRates;
    use rust_decimal_macros::dec;

    fn input(records: Vec<MonthlyRecord>, swda: Decimal, aggh: Decimal) -> DcaInput {
        DcaInput {
            records,
            params: AllocationParams {
                end_ym: "2025-06".parse().unwrap(),
                pct_swda: swda,
                pct_aggh: aggh,
                monthly_contribution: dec!(150),
                scenario_rates: ScenarioRates::default(),
            },
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 20).unwrap()
    }

    #[test]
    fn test_dashboard_end_to_end() {
        let records = vec![
            MonthlyRecord::valued("2025-02".parse().unwrap(), dec!(250), dec!(60)),
            MonthlyRecord::valued("2025-04".parse().unwrap(), dec!(500), dec!(100)),
        ];
        let output = analyze_portfolio(&input(records, dec!(80), dec!(20)), as_of());
        let dash = &output.result;

        assert!(output.warnings.is_empty());
        assert_eq!(dash.ledger.len(), 6);
        assert_eq!(dash.kpis.as_ref().unwrap().current_value, dec!(600));
        assert_eq!(dash.progress.months_elapsed, 4);
        assert!(dash.advanced_metrics.is_some());
        assert!(!dash.rebalancing.as_ref().unwrap().needs_rebalancing);
        assert_eq!(dash.chart.labels.len(), 6);
    }

    #[test]
    fn test_dashboard_without_valuations() {
        let output = analyze_portfolio(&input(Vec::new(), dec!(80), dec!(20)), as_of());
        let dash = &output.result;
        assert!(dash.kpis.is_none());
        assert!(dash.scenarios.is_none());
        assert!(dash.advanced_metrics.is_none());
        assert!(dash.rebalancing.is_none());
    }

    #[test]
    fn test_warnings() {
        let records = vec![
            MonthlyRecord::empty("2024-12".parse().unwrap()),
            MonthlyRecord::empty("2025-02".parse().unwrap()),
            MonthlyRecord::empty("2025-02".parse().unwrap()),
        ];
        let warnings = input_warnings(&input(records, dec!(70), dec!(20)));
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("90"));
        assert!(warnings[1].contains("2025-02"));
        assert!(warnings[2].contains("2024-12"));
    }

    #[test]
    fn test_warns_on_unordered_scenario_rates() {
        let mut data = input(Vec::new(), dec!(80), dec!(20));
        data.params.scenario_rates = ScenarioRates {
            conservative: dec!(9),
            moderate: dec!(6),
            optimistic: dec!(8),
        };
        let warnings = input_warnings(&data);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("conservative 9%"));
    }

    #[test]
    fn test_input_deserialises_from_store_shape() {
        let json = r#"{
            "records": [{"month": "2025-01", "swda_value": 120, "aggh_value": 30}],
            "params": {
                "endYM": {"y": 2025, "m": 3},
                "pctSWDA": 80,
                "pctAGGH": 20,
                "monthlyContribution": 150
            }
        }"#;
        let input: DcaInput = serde_json::from_str(json).unwrap();
        let output = analyze_portfolio(&input, as_of());
        assert_eq!(output.result.ledger.len(), 3);
        assert_eq!(output.result.ledger[0].total_now, Some(dec!(150)));
    }

    #[test]
    fn test_far_horizon_warns_instead_of_panicking() {
        let mut data = input(Vec::new(), dec!(80), dec!(20));
        data.params.end_ym = "3025-12".parse().unwrap();
        let output = analyze_portfolio(&data, as_of());

        assert_eq!(output.result.ledger.len(), 12 * 1001);
        assert_eq!(output.result.chart.optimistic.len(), 12 * 1001);
        let overflowed: Vec<&String> = output
            .warnings
            .iter()
            .filter(|w| w.contains("projection overflows"))
            .collect();
        assert_eq!(overflowed.len(), 2);
        assert!(overflowed[0].contains("moderate"));
        assert!(overflowed[1].contains("optimistic"));
    }

    #[test]
    fn test_warns_when_ledger_stops_early() {
        let mut data = input(Vec::new(), dec!(100), dec!(0));
        data.params.monthly_contribution = Decimal::MAX / dec!(3);
        let output = analyze_portfolio(&data, as_of());

        assert_eq!(output.result.ledger.len(), 3);
        assert!(output
            .warnings
            .iter()
            .any(|w| w.contains("overflow after 2025-03")));
    }
}
