use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::inputs::ProFormaInputs;
use crate::metrics::loan_amount;
use crate::mortgage::{balance_at_month, monthly_payment};
use crate::time_value::growth_factor;
use crate::types::Money;

/// One row of the hold-period projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowYear {
    pub year: u32,
    pub gross_rent: Money,
    pub other_income: Money,
    pub vacancy_loss: Money,
    pub effective_gross_income: Money,
    pub operating_expenses: Money,
    pub noi: Money,
    pub debt_service: Money,
    pub cash_flow: Money,
    pub cumulative_cash_flow: Money,
    pub property_value: Money,
    pub loan_balance: Money,
    pub equity: Money,
}

/// Project income, expenses, debt and equity for every year of the hold.
///
/// Rent and expenses grow from year 2 (`^(y-1)`); property value reflects a
/// full year of appreciation already in year 1 (`^y`), i.e. value at the end of
/// the year against income earned during it. Management follows EGI rather
/// than expense inflation, and debt service is fixed.
pub fn generate_cash_flow_projection(inputs: &ProFormaInputs) -> Vec<CashFlowYear> {
    let purchase = &inputs.purchase;
    let income = &inputs.income;
    let expenses = &inputs.expenses;
    let exit = &inputs.exit;

    let loan_amount = loan_amount(purchase);
    let annual_debt_service =
        monthly_payment(loan_amount, purchase.interest_rate, purchase.loan_term_years) * dec!(12);

    let base_tax = purchase.purchase_price * (expenses.property_tax_rate / dec!(100));
    let base_maintenance = purchase.purchase_price * (expenses.maintenance_percent / dec!(100));

    let mut projection = Vec::with_capacity(exit.hold_period_years as usize);
    let mut cumulative_cash_flow = Money::ZERO;

    for year in 1..=exit.hold_period_years {
        let rent_growth = growth_factor(income.annual_rent_growth, year - 1);
        let expense_growth = growth_factor(expenses.annual_expense_growth, year - 1);
        let appreciation = growth_factor(exit.appreciation_rate, year);

        // --- Income ---
        let gross_rent = income.monthly_rent * dec!(12) * rent_growth;
        let other_income = income.other_monthly_income * dec!(12) * rent_growth;
        let vacancy_loss = (gross_rent + other_income) * (income.vacancy_rate / dec!(100));
        let effective_gross_income = gross_rent + other_income - vacancy_loss;

        // --- Expenses ---
        let property_tax = base_tax * expense_growth;
        let insurance = expenses.insurance_annual * expense_growth;
        let maintenance = base_maintenance * expense_growth;
        let management = effective_gross_income * (expenses.management_percent / dec!(100));
        let hoa = expenses.hoa_monthly * dec!(12) * expense_growth;
        let operating_expenses = property_tax + insurance + maintenance + management + hoa;

        let noi = effective_gross_income - operating_expenses;
        let cash_flow = noi - annual_debt_service;
        cumulative_cash_flow += cash_flow;

        // --- Balance sheet ---
        let property_value = purchase.purchase_price * appreciation;
        let loan_balance = balance_at_month(
            loan_amount,
            purchase.interest_rate,
            purchase.loan_term_years,
            year * 12,
        );

        projection.push(CashFlowYear {
            year,
            gross_rent,
            other_income,
            vacancy_loss,
            effective_gross_income,
            operating_expenses,
            noi,
            debt_service: annual_debt_service,
            cash_flow,
            cumulative_cash_flow,
            property_value,
            loan_balance,
            equity: property_value - loan_balance,
        });
    }

    projection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::compute_core_metrics;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_projection_length_matches_hold() {
        let mut input = ProFormaInputs::default();
        input.exit.hold_period_years = 10;
        let projection = generate_cash_flow_projection(&input);
        assert_eq!(projection.len(), 10);
        assert_eq!(projection[0].year, 1);
        assert_eq!(projection[9].year, 10);
    }

    #[test]
    fn test_year_one_matches_core_metrics() {
        let input = ProFormaInputs::default();
        let core = compute_core_metrics(&input);
        let year1 = &generate_cash_flow_projection(&input)[0];

        assert_eq!(year1.noi, core.noi);
        assert_eq!(year1.effective_gross_income, core.effective_gross_income);
        assert_eq!(year1.debt_service, core.annual_debt_service);
        assert_eq!(year1.cash_flow, core.annual_cash_flow);
    }

    #[test]
    fn test_appreciation_leads_rent_growth_by_one_year() {
        let input = ProFormaInputs::default();
        let projection = generate_cash_flow_projection(&input);

        // Year 1 rent is un-grown, year 1 value already appreciated 3%
        assert_eq!(projection[0].gross_rent, dec!(24000));
        assert_eq!(projection[0].property_value, dec!(309000));
        assert_eq!(projection[1].gross_rent, dec!(24720));
    }

    #[test]
    fn test_debt_service_constant() {
        let projection = generate_cash_flow_projection(&ProFormaInputs::default());
        let ds = projection[0].debt_service;
        assert!(projection.iter().all(|y| y.debt_service == ds));
    }

    #[test]
    fn test_no_loan_means_no_balance() {
        let mut input = ProFormaInputs::default();
        input.purchase.down_payment_percent = dec!(100);
        let projection = generate_cash_flow_projection(&input);
        for y in &projection {
            assert_eq!(y.loan_balance, Decimal::ZERO);
            assert_eq!(y.equity, y.property_value);
        }
    }
}
