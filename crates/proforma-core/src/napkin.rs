use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::inputs::{NapkinInputs, ProFormaInputs};

/// Insurance heuristic: 0.4% of purchase price per year.
const INSURANCE_PRICE_RATIO: Decimal = dec!(0.004);

/// Expand napkin math into a full pro forma on top of the standard defaults
/// (20% down, 30y, 3% closing, 5% vacancy, 1.2% tax, 1%/8% maintenance and
/// management, 3%/2% rent and expense growth, 5y hold, 6% exit cap, 6% selling,
/// 3% appreciation). Insurance is the one default that scales with price,
/// rounded to whole dollars.
///
/// One-directional: `ProFormaInputs::napkin_view` recovers only the three
/// overlapping fields.
pub fn napkin_to_pro_forma(napkin: &NapkinInputs) -> ProFormaInputs {
    let mut inputs = ProFormaInputs::default();

    inputs.purchase.purchase_price = napkin.purchase_price;
    inputs.purchase.interest_rate = napkin.interest_rate;
    inputs.income.monthly_rent = napkin.monthly_rent;
    inputs.expenses.insurance_annual = (napkin.purchase_price * INSURANCE_PRICE_RATIO)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    inputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::PropertyType;
    use rust_decimal_macros::dec;

    #[test]
    fn test_overlays_three_fields() {
        let napkin = NapkinInputs {
            purchase_price: dec!(400000),
            monthly_rent: dec!(2800),
            interest_rate: dec!(6.5),
        };
        let pf = napkin_to_pro_forma(&napkin);

        assert_eq!(pf.purchase.purchase_price, dec!(400000));
        assert_eq!(pf.purchase.interest_rate, dec!(6.5));
        assert_eq!(pf.income.monthly_rent, dec!(2800));
        assert_eq!(pf.property_type, PropertyType::Residential);
    }

    #[test]
    fn test_heuristic_defaults() {
        let pf = napkin_to_pro_forma(&NapkinInputs::default());

        assert_eq!(pf.purchase.down_payment_percent, dec!(20));
        assert_eq!(pf.purchase.loan_term_years, 30);
        assert_eq!(pf.purchase.closing_cost_percent, dec!(3));
        assert_eq!(pf.income.vacancy_rate, dec!(5));
        assert_eq!(pf.expenses.property_tax_rate, dec!(1.2));
        assert_eq!(pf.expenses.maintenance_percent, dec!(1));
        assert_eq!(pf.expenses.management_percent, dec!(8));
        assert_eq!(pf.expenses.hoa_monthly, dec!(0));
        assert_eq!(pf.exit.hold_period_years, 5);
        assert_eq!(pf.exit.exit_cap_rate, dec!(6));
    }

    #[test]
    fn test_insurance_scales_with_price() {
        let napkin = NapkinInputs {
            purchase_price: dec!(512345),
            ..NapkinInputs::default()
        };
        // 0.4% of 512,345 = 2049.38 -> 2049
        assert_eq!(napkin_to_pro_forma(&napkin).expenses.insurance_annual, dec!(2049));
        assert_eq!(
            napkin_to_pro_forma(&NapkinInputs::default()).expenses.insurance_annual,
            dec!(1200)
        );
    }

    #[test]
    fn test_round_trip_keeps_only_overlap() {
        let napkin = NapkinInputs {
            purchase_price: dec!(250000),
            monthly_rent: dec!(1900),
            interest_rate: dec!(6),
        };
        assert_eq!(napkin_to_pro_forma(&napkin).napkin_view(), napkin);
    }
}
