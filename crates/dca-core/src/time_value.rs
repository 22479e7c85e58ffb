use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DcaError;
use crate::types::{CashFlow, Money, Rate};
use crate::DcaResult;

/// Default starting point for the XIRR search.
pub const XIRR_GUESS: Rate = dec!(0.10);
const MAX_XIRR_ITERATIONS: u32 = 50;
const NPV_TOLERANCE: Decimal = dec!(0.000001);
const MIN_DERIVATIVE: Decimal = dec!(0.0000000001);
const MIN_RATE: Rate = dec!(-0.99);
const MAX_RATE: Rate = dec!(10);
const DAYS_PER_YEAR: Decimal = dec!(365.25);

/// Result of an XIRR search. `converged` is false when the iteration budget
/// ran out; `rate` is then the last clamped estimate and `npv` shows how far
/// it is from a root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XirrSolution {
    pub rate: Rate,
    pub iterations: u32,
    pub converged: bool,
    /// Net present value of the flows at `rate`.
    pub npv: Money,
}

/// Fraction of a year between two dates on a 365.25-day year.
pub fn year_fraction(from: NaiveDate, to: NaiveDate) -> Decimal {
    Decimal::from((to - from).num_days()) / DAYS_PER_YEAR
}

/// Net present value of dated flows, discounted to the first flow's date.
pub fn xnpv(rate: Rate, flows: &[CashFlow]) -> DcaResult<Money> {
    if rate <= dec!(-1) {
        return Err(DcaError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }
    let Some(first) = flows.first() else {
        return Ok(Decimal::ZERO);
    };
    npv_and_derivative(rate, flows, first.date)
        .map(|(npv, _)| npv)
        .ok_or_else(|| DcaError::ConvergenceFailure {
            function: "XNPV".into(),
            iterations: 0,
            last_delta: Decimal::ZERO,
        })
}

/// Extended IRR for irregular cash flow dates using Newton-Raphson.
///
/// Every estimate is clamped to [-99%, +1000%]. Fails when fewer than two
/// flows are given, when the flows never change sign, or when the slope of
/// the NPV curve vanishes.
pub fn xirr(flows: &[CashFlow], guess: Rate) -> DcaResult<XirrSolution> {
    if flows.len() < 2 {
        return Err(DcaError::InsufficientData(
            "XIRR requires at least 2 cash flows".into(),
        ));
    }

    let has_outflow = flows.iter().any(|cf| cf.amount < Decimal::ZERO);
    let has_inflow = flows.iter().any(|cf| cf.amount > Decimal::ZERO);
    if !has_outflow || !has_inflow {
        return Err(DcaError::FinancialImpossibility(
            "XIRR needs both negative and positive cash flows".into(),
        ));
    }

    let base_date = flows[0].date;
    let mut rate = clamp_rate(guess);

    for i in 0..MAX_XIRR_ITERATIONS {
        let (npv_val, dnpv) =
            npv_and_derivative(rate, flows, base_date).ok_or_else(|| {
                DcaError::ConvergenceFailure {
                    function: "XIRR".into(),
                    iterations: i,
                    last_delta: Decimal::ZERO,
                }
            })?;

        if npv_val.abs() < NPV_TOLERANCE {
            return Ok(XirrSolution {
                rate,
                iterations: i,
                converged: true,
                npv: npv_val,
            });
        }

        if dnpv.abs() < MIN_DERIVATIVE {
            return Err(DcaError::ConvergenceFailure {
                function: "XIRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        let next = npv_val
            .checked_div(dnpv)
            .and_then(|step| rate.checked_sub(step))
            .ok_or_else(|| DcaError::ConvergenceFailure {
                function: "XIRR".into(),
                iterations: i,
                last_delta: npv_val,
            })?;
        rate = clamp_rate(next);
    }

    let npv = xnpv(rate, flows)?;
    tracing::trace!(%rate, %npv, "XIRR iteration budget exhausted");
    Ok(XirrSolution {
        rate,
        iterations: MAX_XIRR_ITERATIONS,
        converged: false,
        npv,
    })
}

fn clamp_rate(rate: Rate) -> Rate {
    rate.clamp(MIN_RATE, MAX_RATE)
}

/// NPV and d(NPV)/d(rate). `None` if a discount factor or a running sum is
/// not representable.
fn npv_and_derivative(
    rate: Rate,
    flows: &[CashFlow],
    base_date: NaiveDate,
) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }

    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;

    for cf in flows {
        let years = year_fraction(base_date, cf.date);
        let discount = one_plus_r.checked_powd(years)?;
        if discount.is_zero() {
            return None;
        }
        npv_val = npv_val.checked_add(cf.amount.checked_div(discount)?)?;
        let slope = years
            .checked_mul(cf.amount)?
            .checked_div(one_plus_r.checked_mul(discount)?)?;
        dnpv = dnpv.checked_sub(slope)?;
    }

    Some((npv_val, dnpv))
}
