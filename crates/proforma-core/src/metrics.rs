use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::inputs::{ProFormaInputs, PurchaseInputs};
use crate::mortgage::monthly_payment;
use crate::types::{Money, Multiple, Percent};

/// Year-one operating and return metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreMetrics {
    pub noi: Money,
    /// NOI / purchase price, in percent
    pub cap_rate: Percent,
    /// Annual cash flow / total cash invested, in percent
    pub cash_on_cash: Percent,
    /// Purchase price / gross annual rent
    pub grm: Multiple,
    pub monthly_payment: Money,
    pub annual_debt_service: Money,
    pub annual_cash_flow: Money,
    pub total_cash_invested: Money,
    pub effective_gross_income: Money,
    pub operating_expenses: Money,
    pub loan_amount: Money,
}

/// Net Operating Income = EGI - operating expenses
pub fn calc_noi(effective_gross_income: Money, operating_expenses: Money) -> Money {
    effective_gross_income - operating_expenses
}

/// Cap rate in percent; 0 when the price is not positive.
pub fn calc_cap_rate(noi: Money, purchase_price: Money) -> Percent {
    if purchase_price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    noi / purchase_price * dec!(100)
}

/// Cash-on-cash return in percent; 0 when nothing was invested.
pub fn calc_cash_on_cash(annual_cash_flow: Money, total_cash_invested: Money) -> Percent {
    if total_cash_invested <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    annual_cash_flow / total_cash_invested * dec!(100)
}

/// Gross rent multiplier; 0 without rent.
pub fn calc_grm(purchase_price: Money, gross_annual_rent: Money) -> Multiple {
    if gross_annual_rent <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    purchase_price / gross_annual_rent
}

/// Amount financed after the down payment.
pub fn loan_amount(purchase: &PurchaseInputs) -> Money {
    purchase.purchase_price * (Decimal::ONE - purchase.down_payment_percent / dec!(100))
}

/// Down payment + closing costs + renovation.
pub fn total_cash_invested(inputs: &ProFormaInputs) -> Money {
    let purchase = &inputs.purchase;
    let down_payment = purchase.purchase_price * (purchase.down_payment_percent / dec!(100));
    let closing_costs = purchase.purchase_price * (purchase.closing_cost_percent / dec!(100));
    down_payment + closing_costs + inputs.renovation.renovation_cost
}

/// Compute every year-one metric from a deal snapshot.
pub fn compute_core_metrics(inputs: &ProFormaInputs) -> CoreMetrics {
    let purchase = &inputs.purchase;
    let income = &inputs.income;
    let expenses = &inputs.expenses;

    // --- Financing ---
    let loan_amount = loan_amount(purchase);
    let monthly_payment =
        monthly_payment(loan_amount, purchase.interest_rate, purchase.loan_term_years);
    let annual_debt_service = monthly_payment * dec!(12);

    // --- Income ---
    let gross_annual_rent = income.monthly_rent * dec!(12);
    let gross_other_income = income.other_monthly_income * dec!(12);
    let vacancy_loss = (gross_annual_rent + gross_other_income) * (income.vacancy_rate / dec!(100));
    let effective_gross_income = gross_annual_rent + gross_other_income - vacancy_loss;

    // --- Expenses ---
    let property_tax = purchase.purchase_price * (expenses.property_tax_rate / dec!(100));
    let maintenance = purchase.purchase_price * (expenses.maintenance_percent / dec!(100));
    let management = effective_gross_income * (expenses.management_percent / dec!(100));
    let hoa = expenses.hoa_monthly * dec!(12);
    let operating_expenses =
        property_tax + expenses.insurance_annual + maintenance + management + hoa;

    // --- Returns ---
    let noi = calc_noi(effective_gross_income, operating_expenses);
    let cap_rate = calc_cap_rate(noi, purchase.purchase_price);
    let annual_cash_flow = noi - annual_debt_service;
    let total_cash_invested = total_cash_invested(inputs);
    let cash_on_cash = calc_cash_on_cash(annual_cash_flow, total_cash_invested);
    let grm = calc_grm(purchase.purchase_price, gross_annual_rent);

    CoreMetrics {
        noi,
        cap_rate,
        cash_on_cash,
        grm,
        monthly_payment,
        annual_debt_service,
        annual_cash_flow,
        total_cash_invested,
        effective_gross_income,
        operating_expenses,
        loan_amount,
    }
}
