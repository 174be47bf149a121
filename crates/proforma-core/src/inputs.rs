use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ProFormaError;
use crate::mortgage::{MAX_ANNUAL_RATE, MAX_TERM_YEARS};
use crate::types::{Money, Percent};
use crate::ProFormaResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Asset class of the deal. Commercial deals additionally get DSCR, CAPEX and
/// NNN treatment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    #[default]
    Residential,
    Commercial,
}

/// Which input shape the deal was entered with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculatorMode {
    #[default]
    Napkin,
    ProForma,
}

/// Reduced three-field deal description ("napkin math").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NapkinInputs {
    pub purchase_price: Money,
    pub monthly_rent: Money,
    /// Annual mortgage rate in percentage points
    pub interest_rate: Percent,
}

/// Acquisition and financing terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseInputs {
    pub purchase_price: Money,
    pub down_payment_percent: Percent,
    /// Annual mortgage rate in percentage points
    pub interest_rate: Percent,
    pub loan_term_years: u32,
    pub closing_cost_percent: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenovationInputs {
    pub renovation_cost: Money,
    pub after_repair_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeInputs {
    pub monthly_rent: Money,
    pub other_monthly_income: Money,
    pub annual_rent_growth: Percent,
    pub vacancy_rate: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseInputs {
    /// Property tax as a percentage of purchase price
    pub property_tax_rate: Percent,
    pub insurance_annual: Money,
    /// Maintenance as a percentage of purchase price
    pub maintenance_percent: Percent,
    /// Management fee as a percentage of effective gross income
    pub management_percent: Percent,
    pub hoa_monthly: Money,
    pub annual_expense_growth: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommercialInputs {
    /// Triple-net lease: tenant reimburses tax, insurance and maintenance
    pub is_nnn: bool,
    pub tenant_improvement_allowance: Money,
    /// CAPEX reserve as a percentage of NOI (used when no fixed reserve is set)
    pub capex_reserve_percent: Percent,
    pub leasing_commission_percent: Percent,
    /// Fixed annual CAPEX reserve; takes precedence when positive
    pub annual_capex_reserve: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitInputs {
    pub hold_period_years: u32,
    pub exit_cap_rate: Percent,
    pub selling_cost_percent: Percent,
    pub appreciation_rate: Percent,
}

/// Complete deal snapshot. Every downstream computation reads only this record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProFormaInputs {
    pub property_type: PropertyType,
    pub purchase: PurchaseInputs,
    pub renovation: RenovationInputs,
    pub income: IncomeInputs,
    pub expenses: ExpenseInputs,
    pub commercial: CommercialInputs,
    pub exit: ExitInputs,
}

/// External valuation supplied by an address lookup. Applied as ordinary input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyEstimate {
    pub estimated_value: Money,
    pub rent_estimate: Money,
    pub property_tax_rate: Percent,
    pub insurance_annual: Money,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for NapkinInputs {
    fn default() -> Self {
        Self {
            purchase_price: dec!(300000),
            monthly_rent: dec!(2000),
            interest_rate: dec!(7),
        }
    }
}

impl Default for PurchaseInputs {
    fn default() -> Self {
        Self {
            purchase_price: dec!(300000),
            down_payment_percent: dec!(20),
            interest_rate: dec!(7),
            loan_term_years: 30,
            closing_cost_percent: dec!(3),
        }
    }
}

impl Default for RenovationInputs {
    fn default() -> Self {
        Self {
            renovation_cost: Decimal::ZERO,
            after_repair_value: Decimal::ZERO,
        }
    }
}

impl Default for IncomeInputs {
    fn default() -> Self {
        Self {
            monthly_rent: dec!(2000),
            other_monthly_income: Decimal::ZERO,
            annual_rent_growth: dec!(3),
            vacancy_rate: dec!(5),
        }
    }
}

impl Default for ExpenseInputs {
    fn default() -> Self {
        Self {
            property_tax_rate: dec!(1.2),
            insurance_annual: dec!(1200),
            maintenance_percent: dec!(1),
            management_percent: dec!(8),
            hoa_monthly: Decimal::ZERO,
            annual_expense_growth: dec!(2),
        }
    }
}

impl Default for CommercialInputs {
    fn default() -> Self {
        Self {
            is_nnn: false,
            tenant_improvement_allowance: Decimal::ZERO,
            capex_reserve_percent: dec!(5),
            leasing_commission_percent: dec!(5),
            annual_capex_reserve: Decimal::ZERO,
        }
    }
}

impl Default for ExitInputs {
    fn default() -> Self {
        Self {
            hold_period_years: 5,
            exit_cap_rate: dec!(6),
            selling_cost_percent: dec!(6),
            appreciation_rate: dec!(3),
        }
    }
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

impl ProFormaInputs {
    /// Extract the napkin fields. Lossy: everything outside price, rent and
    /// rate is dropped, and converting back re-applies the napkin defaults.
    pub fn napkin_view(&self) -> NapkinInputs {
        NapkinInputs {
            purchase_price: self.purchase.purchase_price,
            monthly_rent: self.income.monthly_rent,
            interest_rate: self.purchase.interest_rate,
        }
    }

    /// Overlay an address-lookup estimate: price, rent, tax rate and insurance.
    pub fn with_estimate(&self, estimate: &PropertyEstimate) -> ProFormaInputs {
        let mut next = self.clone();
        next.purchase.purchase_price = estimate.estimated_value;
        next.income.monthly_rent = estimate.rent_estimate;
        next.expenses.property_tax_rate = estimate.property_tax_rate;
        next.expenses.insurance_annual = estimate.insurance_annual;
        next
    }

    /// Range checks on every field. Computations assume these hold and do not
    /// re-check them.
    pub fn validate(&self) -> ProFormaResult<()> {
        let p = &self.purchase;
        check_positive("purchase.purchase_price", p.purchase_price)?;
        check_percent("purchase.down_payment_percent", p.down_payment_percent)?;
        check_range("purchase.interest_rate", p.interest_rate, Decimal::ZERO, MAX_ANNUAL_RATE)?;
        check_count("purchase.loan_term_years", p.loan_term_years, 1, MAX_TERM_YEARS)?;
        check_percent("purchase.closing_cost_percent", p.closing_cost_percent)?;

        let r = &self.renovation;
        check_non_negative("renovation.renovation_cost", r.renovation_cost)?;
        check_non_negative("renovation.after_repair_value", r.after_repair_value)?;

        let i = &self.income;
        check_non_negative("income.monthly_rent", i.monthly_rent)?;
        check_non_negative("income.other_monthly_income", i.other_monthly_income)?;
        check_range("income.annual_rent_growth", i.annual_rent_growth, dec!(-10), dec!(20))?;
        check_percent("income.vacancy_rate", i.vacancy_rate)?;

        let e = &self.expenses;
        check_percent("expenses.property_tax_rate", e.property_tax_rate)?;
        check_non_negative("expenses.insurance_annual", e.insurance_annual)?;
        check_percent("expenses.maintenance_percent", e.maintenance_percent)?;
        check_percent("expenses.management_percent", e.management_percent)?;
        check_non_negative("expenses.hoa_monthly", e.hoa_monthly)?;
        check_range("expenses.annual_expense_growth", e.annual_expense_growth, dec!(-5), dec!(20))?;

        let c = &self.commercial;
        check_non_negative(
            "commercial.tenant_improvement_allowance",
            c.tenant_improvement_allowance,
        )?;
        check_percent("commercial.capex_reserve_percent", c.capex_reserve_percent)?;
        check_percent("commercial.leasing_commission_percent", c.leasing_commission_percent)?;
        check_non_negative("commercial.annual_capex_reserve", c.annual_capex_reserve)?;

        let x = &self.exit;
        check_count("exit.hold_period_years", x.hold_period_years, 1, 30)?;
        check_range("exit.exit_cap_rate", x.exit_cap_rate, Decimal::ZERO, dec!(50))?;
        check_percent("exit.selling_cost_percent", x.selling_cost_percent)?;
        check_range("exit.appreciation_rate", x.appreciation_rate, dec!(-10), dec!(20))?;

        Ok(())
    }
}

impl NapkinInputs {
    /// Overlay an address-lookup estimate. Only price and rent exist here.
    pub fn with_estimate(&self, estimate: &PropertyEstimate) -> NapkinInputs {
        NapkinInputs {
            purchase_price: estimate.estimated_value,
            monthly_rent: estimate.rent_estimate,
            interest_rate: self.interest_rate,
        }
    }

    pub fn validate(&self) -> ProFormaResult<()> {
        check_positive("purchase_price", self.purchase_price)?;
        check_non_negative("monthly_rent", self.monthly_rent)?;
        check_range("interest_rate", self.interest_rate, Decimal::ZERO, MAX_ANNUAL_RATE)
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

pub(crate) fn check_range(field: &str, value: Decimal, min: Decimal, max: Decimal) -> ProFormaResult<()> {
    if value < min || value > max {
        return Err(ProFormaError::InvalidInput {
            field: field.into(),
            reason: format!("must be between {min} and {max}, got {value}"),
        });
    }
    Ok(())
}

pub(crate) fn check_percent(field: &str, value: Decimal) -> ProFormaResult<()> {
    check_range(field, value, Decimal::ZERO, dec!(100))
}

pub(crate) fn check_non_negative(field: &str, value: Decimal) -> ProFormaResult<()> {
    if value < Decimal::ZERO {
        return Err(ProFormaError::InvalidInput {
            field: field.into(),
            reason: format!("must not be negative, got {value}"),
        });
    }
    Ok(())
}

pub(crate) fn check_positive(field: &str, value: Decimal) -> ProFormaResult<()> {
    if value <= Decimal::ZERO {
        return Err(ProFormaError::InvalidInput {
            field: field.into(),
            reason: format!("must be positive, got {value}"),
        });
    }
    Ok(())
}

pub(crate) fn check_count(field: &str, value: u32, min: u32, max: u32) -> ProFormaResult<()> {
    if value < min || value > max {
        return Err(ProFormaError::InvalidInput {
            field: field.into(),
            reason: format!("must be a whole number between {min} and {max}, got {value}"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
