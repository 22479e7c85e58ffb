use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::calendar::MonthKey;
use crate::types::{Money, Percent};

/// One month of externally observed valuations. `None` means "not observed",
/// which is different from an observed zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    #[serde(alias = "ym", alias = "id", alias = "key")]
    pub month: MonthKey,
    #[serde(default, deserialize_with = "numeric_or_none")]
    pub swda_value: Option<Money>,
    #[serde(default, deserialize_with = "numeric_or_none")]
    pub aggh_value: Option<Money>,
    #[serde(default, deserialize_with = "numeric_or_none")]
    pub cash_interest: Option<Money>,
}

impl MonthlyRecord {
    /// A record with no valuations yet.
    pub fn empty(month: MonthKey) -> Self {
        Self {
            month,
            swda_value: None,
            aggh_value: None,
            cash_interest: None,
        }
    }

    pub fn valued(month: MonthKey, swda: Money, aggh: Money) -> Self {
        Self {
            month,
            swda_value: Some(swda),
            aggh_value: Some(aggh),
            cash_interest: None,
        }
    }

    pub fn has_valuation(&self) -> bool {
        self.swda_value.is_some() || self.aggh_value.is_some() || self.cash_interest.is_some()
    }
}

/// Annual growth rates, in percent, for the three what-if scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRates {
    #[serde(default, deserialize_with = "numeric_or_zero")]
    pub conservative: Percent,
    #[serde(default, deserialize_with = "numeric_or_zero")]
    pub moderate: Percent,
    #[serde(default, deserialize_with = "numeric_or_zero")]
    pub optimistic: Percent,
}

impl ScenarioRates {
    /// Scenario names paired with their annual percentage, in display order.
    pub fn named(&self) -> [(&'static str, Percent); 3] {
        [
            ("conservative", self.conservative),
            ("moderate", self.moderate),
            ("optimistic", self.optimistic),
        ]
    }
}

impl Default for ScenarioRates {
    fn default() -> Self {
        Self {
            conservative: Decimal::from(4),
            moderate: Decimal::from(6),
            optimistic: Decimal::from(8),
        }
    }
}

/// Plan parameters for one computation run.
///
/// `pct_swda + pct_aggh` is expected to equal 100; the engine does not
/// enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationParams {
    #[serde(alias = "endYM", alias = "end")]
    pub end_ym: MonthKey,
    #[serde(alias = "pctSWDA", default, deserialize_with = "numeric_or_zero")]
    pub pct_swda: Percent,
    #[serde(alias = "pctAGGH", default, deserialize_with = "numeric_or_zero")]
    pub pct_aggh: Percent,
    #[serde(
        alias = "monthlyContribution",
        default,
        deserialize_with = "numeric_or_zero"
    )]
    pub monthly_contribution: Money,
    #[serde(alias = "scenarioRates", default)]
    pub scenario_rates: ScenarioRates,
}

/// Coerce a loosely typed value into a Decimal. Numbers and numeric strings
/// convert; everything else is treated as absent.
pub fn coerce_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn numeric_or_none<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_decimal))
}

fn numeric_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(numeric_or_none(deserializer)?.unwrap_or(Decimal::ZERO))
}
