use log::debug;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::ProFormaError;
use crate::types::{Money, Percent, Rate};
use crate::ProFormaResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_IRR_ITERATIONS: u32 = 100;
const INITIAL_GUESS: Rate = dec!(0.10);
const LOWER_BOUND: Rate = dec!(-0.99);
const UPPER_BOUND: Rate = dec!(10.0);

/// `(1 + rate)^periods` for a decimal rate, saturating instead of panicking
/// on overflow.
pub fn compound(rate: Rate, periods: u32) -> Decimal {
    (Decimal::ONE + rate)
        .checked_powi(periods as i64)
        .unwrap_or(Decimal::MAX)
}

/// Growth factor for a percentage-point rate: `(1 + pct/100)^periods`.
pub fn growth_factor(pct: Percent, periods: u32) -> Decimal {
    compound(pct / dec!(100), periods)
}

/// Net Present Value of a series of cash flows, `cash_flows[0]` undiscounted.
///
/// Discount factors are built by repeated multiplication with `1/(1+r)` and
/// all accumulation saturates, so rates near -100% yield a huge value of the
/// right sign rather than a panic.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> Money {
    npv_and_derivative(rate, cash_flows).0
}

/// NPV(r) and dNPV/dr = sum -t * CF_t / (1+r)^(t+1).
fn npv_and_derivative(rate: Rate, cash_flows: &[Money]) -> (Money, Decimal) {
    let one_plus_r = Decimal::ONE + rate;
    let v = match Decimal::ONE.checked_div(one_plus_r) {
        Some(v) => v,
        None => return (Decimal::MAX, Decimal::ZERO),
    };

    let mut npv = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE; // (1+r)^-t

    for (t, cf) in cash_flows.iter().enumerate() {
        npv = npv.saturating_add(cf.saturating_mul(discount));
        let next = discount.saturating_mul(v);
        if t > 0 {
            let term = Decimal::from(t as u64).saturating_mul(*cf).saturating_mul(next);
            dnpv = dnpv.saturating_sub(term);
        }
        discount = next;
    }

    (npv, dnpv)
}

/// Sign-equivalent of NPV for bracketing. Below zero the flows are compounded
/// forward to the horizon, `sum CF_t * (1+r)^(N-t)`, which is NPV times the
/// positive factor `(1+r)^N` and cannot overflow for `1+r < 1`.
fn bracket_value(rate: Rate, cash_flows: &[Money]) -> Decimal {
    if rate >= Decimal::ZERO {
        return npv(rate, cash_flows);
    }
    let one_plus_r = Decimal::ONE + rate;
    cash_flows
        .iter()
        .fold(Decimal::ZERO, |acc, cf| acc.saturating_mul(one_plus_r).saturating_add(*cf))
}

/// Internal Rate of Return in percentage points.
///
/// Newton-Raphson from 10%, falling back to bisection on [-99%, 1000%] when
/// the derivative flattens or a step leaves the bracket. Fewer than two flows,
/// flows without a sign change, or an NPV that keeps one sign across the
/// whole bracket are `NotComputable`.
pub fn irr(cash_flows: &[Money]) -> ProFormaResult<Percent> {
    if cash_flows.len() < 2 {
        return Err(ProFormaError::NotComputable(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let has_negative = cash_flows.iter().any(|cf| *cf < Decimal::ZERO);
    let has_positive = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    if !has_negative || !has_positive {
        return Err(ProFormaError::NotComputable(
            "IRR requires at least one sign change in the cash flows".into(),
        ));
    }

    let mut rate = INITIAL_GUESS;

    for i in 0..MAX_IRR_ITERATIONS {
        let (npv_val, dnpv) = npv_and_derivative(rate, cash_flows);

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate * dec!(100));
        }

        if dnpv.abs() < CONVERGENCE_THRESHOLD {
            debug!("IRR: derivative vanished at iteration {i} (rate {rate}), bisecting");
            break;
        }

        let new_rate = match npv_val.checked_div(dnpv) {
            Some(step) => rate - step,
            None => break,
        };

        // Guard against divergence
        if new_rate < LOWER_BOUND || new_rate > UPPER_BOUND {
            debug!("IRR: Newton step left the bracket at iteration {i} ({new_rate}), bisecting");
            break;
        }

        rate = new_rate;
    }

    bisect(cash_flows).map(|rate| rate * dec!(100))
}

/// Bisection over the full bracket, keeping the half whose end matches the
/// sign at the low bound. The bounds must straddle a root.
fn bisect(cash_flows: &[Money]) -> ProFormaResult<Rate> {
    let mut low = LOWER_BOUND;
    let mut high = UPPER_BOUND;

    let low_value = bracket_value(low, cash_flows);
    let high_value = bracket_value(high, cash_flows);
    if low_value.is_zero() {
        return Ok(low);
    }
    if high_value.is_zero() {
        return Ok(high);
    }
    let mut low_positive = low_value > Decimal::ZERO;
    if low_positive == (high_value > Decimal::ZERO) {
        debug!("IRR: NPV keeps one sign over [{low}, {high}], no root to bisect");
        return Err(ProFormaError::NotComputable(
            "NPV does not change sign between -99% and 1000%".into(),
        ));
    }

    for _ in 0..MAX_IRR_ITERATIONS {
        let mid = (low + high) / dec!(2);

        if (high - low) / dec!(2) < CONVERGENCE_THRESHOLD
            || npv(mid, cash_flows).abs() < CONVERGENCE_THRESHOLD
        {
            return Ok(mid);
        }

        let mid_positive = bracket_value(mid, cash_flows) > Decimal::ZERO;
        if mid_positive == low_positive {
            low = mid;
            low_positive = mid_positive;
        } else {
            high = mid;
        }
    }

    debug!("IRR: bisection exhausted {MAX_IRR_ITERATIONS} iterations");
    Ok((low + high) / dec!(2))
}
