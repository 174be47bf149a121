use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::inputs::{check_count, check_non_negative, check_range};
use crate::time_value::compound;
use crate::types::{Money, Percent, Rate};
use crate::ProFormaResult;

/// Longest loan term accepted, in years.
pub const MAX_TERM_YEARS: u32 = 40;
/// Highest annual rate accepted, in percentage points.
pub const MAX_ANNUAL_RATE: Percent = dec!(50);

/// One month of a fixed-rate amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    pub month: u32,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    pub balance: Money,
}

/// Range-check standalone loan terms: principal >= 0, rate in [0, 50]%,
/// term 1 to 40 years. The payment functions assume these hold.
pub fn validate_loan_terms(
    principal: Money,
    annual_rate: Percent,
    term_years: u32,
) -> ProFormaResult<()> {
    check_non_negative("principal", principal)?;
    check_range("annual_rate", annual_rate, Decimal::ZERO, MAX_ANNUAL_RATE)?;
    check_count("term_years", term_years, 1, MAX_TERM_YEARS)
}

fn monthly_rate(annual_rate: Percent) -> Rate {
    annual_rate / dec!(100) / dec!(12)
}

/// Standard fixed-rate mortgage payment: P * r(1+r)^n / ((1+r)^n - 1)
///
/// `annual_rate` is in percentage points. Non-positive principal pays nothing;
/// a non-positive rate amortises straight-line.
pub fn monthly_payment(principal: Money, annual_rate: Percent, term_years: u32) -> Money {
    let num_payments = term_years * 12;
    if principal <= Decimal::ZERO || num_payments == 0 {
        return Decimal::ZERO;
    }
    if annual_rate <= Decimal::ZERO {
        // Interest-free: straight-line amortisation
        return principal / Decimal::from(num_payments);
    }

    let r = monthly_rate(annual_rate);
    let factor = compound(r, num_payments);
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return principal / Decimal::from(num_payments);
    }

    principal * (r * factor) / denominator
}

/// Full month-by-month schedule: exactly `term_years * 12` rows, or none when
/// the payment is zero.
pub fn amortization_schedule(
    principal: Money,
    annual_rate: Percent,
    term_years: u32,
) -> Vec<AmortizationEntry> {
    let payment = monthly_payment(principal, annual_rate, term_years);
    if payment <= Decimal::ZERO {
        return Vec::new();
    }

    let r = monthly_rate(annual_rate);
    let num_payments = term_years * 12;
    let mut schedule = Vec::with_capacity(num_payments as usize);
    let mut balance = principal;

    for month in 1..=num_payments {
        let interest = balance * r;
        let principal_portion = payment - interest;
        // Floor keeps rounding residue from pushing the final balance negative
        balance = (balance - principal_portion).max(Decimal::ZERO);

        schedule.push(AmortizationEntry {
            month,
            payment,
            principal: principal_portion,
            interest,
            balance,
        });
    }

    schedule
}

/// Outstanding balance after `month` payments, in closed form:
/// B_m = P(1+r)^m - M((1+r)^m - 1)/r
///
/// Month zero (or a non-positive principal) returns the principal unchanged;
/// from the final payment on the balance is zero.
pub fn balance_at_month(
    principal: Money,
    annual_rate: Percent,
    term_years: u32,
    month: u32,
) -> Money {
    if principal <= Decimal::ZERO || month == 0 {
        return principal;
    }
    let num_payments = term_years * 12;
    if num_payments == 0 {
        return principal;
    }
    if month >= num_payments {
        return Decimal::ZERO;
    }
    if annual_rate <= Decimal::ZERO {
        let payment = principal / Decimal::from(num_payments);
        return (principal - payment * Decimal::from(month)).max(Decimal::ZERO);
    }

    let r = monthly_rate(annual_rate);
    let payment = monthly_payment(principal, annual_rate, term_years);
    let balance_factor = compound(r, month);
    let balance = principal * balance_factor - payment * ((balance_factor - Decimal::ONE) / r);

    balance.max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProFormaError;
    use rust_decimal_macros::dec;

    #[test]
    fn test_loan_terms_validation() {
        assert!(validate_loan_terms(dec!(240000), dec!(7), 30).is_ok());
        assert!(validate_loan_terms(dec!(0), dec!(0), 1).is_ok());
        assert!(validate_loan_terms(dec!(100000), dec!(50), 40).is_ok());

        for (principal, rate, term) in [
            (dec!(-1), dec!(7), 30),
            (dec!(100000), dec!(1000), 30),
            (dec!(100000), dec!(-1), 30),
            (dec!(100000), dec!(7), 0),
            (dec!(100000), dec!(7), u32::MAX),
        ] {
            assert!(
                matches!(
                    validate_loan_terms(principal, rate, term),
                    Err(ProFormaError::InvalidInput { .. })
                ),
                "accepted {principal} at {rate}% over {term}y"
            );
        }
    }

    #[test]
    fn test_balance_far_past_term_is_zero() {
        assert_eq!(balance_at_month(dec!(100000), dec!(50), 40, u32::MAX), Decimal::ZERO);
        assert_eq!(balance_at_month(dec!(100000), dec!(7), 30, 360), Decimal::ZERO);
    }

    #[test]
    fn test_payment_known_answer() {
        // $240k at 7% over 30 years
        let pmt = monthly_payment(dec!(240000), dec!(7), 30);
        assert!((pmt - dec!(1596.73)).abs() < dec!(0.01), "got {pmt}");
    }

    #[test]
    fn test_payment_interest_free() {
        assert_eq!(monthly_payment(dec!(120000), dec!(0), 10), dec!(1000));
    }

    #[test]
    fn test_payment_non_positive_principal() {
        assert_eq!(monthly_payment(dec!(0), dec!(7), 30), Decimal::ZERO);
        assert_eq!(monthly_payment(dec!(-240000), dec!(7), 30), Decimal::ZERO);
    }

    #[test]
    fn test_schedule_length_and_payoff() {
        let schedule = amortization_schedule(dec!(240000), dec!(7), 30);
        assert_eq!(schedule.len(), 360);
        assert_eq!(schedule[0].month, 1);
        let last = schedule.last().unwrap();
        assert_eq!(last.month, 360);
        assert!(last.balance < dec!(0.01), "final balance {}", last.balance);
    }

    #[test]
    fn test_schedule_first_month_split() {
        let schedule = amortization_schedule(dec!(240000), dec!(7), 30);
        // 240000 * 0.07 / 12 = 1400 interest
        assert!((schedule[0].interest - dec!(1400)).abs() < dec!(0.000001));
        assert!((schedule[0].principal - dec!(196.73)).abs() < dec!(0.01));
    }

    #[test]
    fn test_schedule_empty_when_no_payment() {
        assert!(amortization_schedule(dec!(0), dec!(7), 30).is_empty());
    }

    #[test]
    fn test_balance_month_zero_returns_principal() {
        assert_eq!(balance_at_month(dec!(240000), dec!(7), 30, 0), dec!(240000));
    }

    #[test]
    fn test_balance_interest_free_straight_line() {
        let bal = balance_at_month(dec!(120000), dec!(0), 10, 60);
        assert_eq!(bal, dec!(60000));
    }
}
