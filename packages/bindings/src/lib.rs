use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use dca_core::analytics::rebalancing::RebalancingPolicy;
use dca_core::dashboard::DcaInput;
use dca_core::ledger::{build_ledger as build_rows, AllocationParams, LedgerRow};
use dca_core::time_value::XIRR_GUESS;
use dca_core::CashFlow;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: for<'de> Deserialize<'de>>(input_json: &str) -> NapiResult<T> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

fn to_json(value: &impl serde::Serialize) -> NapiResult<String> {
    serde_json::to_string(value).map_err(to_napi_error)
}

fn ledger_from(input_json: &str) -> NapiResult<(DcaInput, Vec<LedgerRow>)> {
    let input: DcaInput = parse(input_json)?;
    let rows = build_rows(&input.records, &input.params);
    Ok((input, rows))
}

fn missing(what: &str) -> napi::Error {
    napi::Error::from_reason(format!("{what}: no valued month in the ledger"))
}

#[derive(Deserialize)]
struct DatedInput {
    #[serde(flatten)]
    portfolio: DcaInput,
    #[serde(default, alias = "asOf")]
    as_of: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct ProgressInput {
    params: AllocationParams,
    #[serde(default, alias = "asOf")]
    as_of: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct RebalanceInput {
    #[serde(flatten)]
    portfolio: DcaInput,
    #[serde(default)]
    policy: Option<RebalancingPolicy>,
}

#[derive(Deserialize)]
struct XirrInput {
    #[serde(alias = "cashFlows")]
    cash_flows: Vec<CashFlow>,
    #[serde(default)]
    guess: Option<Decimal>,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[napi]
pub fn build_ledger(input_json: String) -> NapiResult<String> {
    let (_, rows) = ledger_from(&input_json)?;
    to_json(&rows)
}

#[napi]
pub fn compute_kpis(input_json: String) -> NapiResult<String> {
    let (_, rows) = ledger_from(&input_json)?;
    let kpis = dca_core::analytics::kpi::compute_kpis(&rows).ok_or_else(|| missing("kpis"))?;
    to_json(&kpis)
}

// ---------------------------------------------------------------------------
// Projections and progress
// ---------------------------------------------------------------------------

#[napi]
pub fn project_scenarios(input_json: String) -> NapiResult<String> {
    let (input, rows) = ledger_from(&input_json)?;
    let set =
        dca_core::analytics::scenarios::project_scenarios(&rows, &input.params.scenario_rates)
            .ok_or_else(|| missing("scenarios"))?;
    to_json(&set)
}

#[napi]
pub fn project_trajectory(input_json: String, annual_rate_pct: String) -> NapiResult<String> {
    let (input, rows) = ledger_from(&input_json)?;
    let rate: Decimal = annual_rate_pct.parse().map_err(to_napi_error)?;
    let path = dca_core::analytics::scenarios::project_trajectory(
        &rows,
        input.params.monthly_contribution,
        rate,
    );
    to_json(&path)
}

#[napi]
pub fn compute_progress(input_json: String) -> NapiResult<String> {
    let input: ProgressInput = parse(&input_json)?;
    let progress = dca_core::analytics::progress::compute_progress(
        &input.params,
        input.as_of.unwrap_or_else(today),
    );
    to_json(&progress)
}

// ---------------------------------------------------------------------------
// Returns and rebalancing
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_advanced_metrics(input_json: String) -> NapiResult<String> {
    let (_, rows) = ledger_from(&input_json)?;
    let metrics = dca_core::analytics::metrics::compute_advanced_metrics(&rows)
        .ok_or_else(|| napi::Error::from_reason("advanced metrics need at least 2 valued months"))?;
    to_json(&metrics)
}

#[napi]
pub fn advise_rebalancing(input_json: String) -> NapiResult<String> {
    let input: RebalanceInput = parse(&input_json)?;
    let rows = build_rows(&input.portfolio.records, &input.portfolio.params);
    let policy = input.policy.unwrap_or_default();
    let advice = dca_core::analytics::rebalancing::advise_rebalancing_with(&rows, &policy)
        .ok_or_else(|| missing("rebalancing"))?;
    to_json(&advice)
}

#[napi]
pub fn xirr(input_json: String) -> NapiResult<String> {
    let input: XirrInput = parse(&input_json)?;
    let solution =
        dca_core::time_value::xirr(&input.cash_flows, input.guess.unwrap_or(XIRR_GUESS))
            .map_err(to_napi_error)?;
    to_json(&solution)
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[napi]
pub fn build_chart_data(input_json: String) -> NapiResult<String> {
    let (input, rows) = ledger_from(&input_json)?;
    to_json(&dca_core::charts::build_chart_data(&rows, &input.params))
}

#[napi]
pub fn analyze_portfolio(input_json: String) -> NapiResult<String> {
    let input: DatedInput = parse(&input_json)?;
    let output = dca_core::dashboard::analyze_portfolio(
        &input.portfolio,
        input.as_of.unwrap_or_else(today),
    );
    to_json(&output)
}
