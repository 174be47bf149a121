use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::inputs::ProFormaInputs;
use crate::metrics::{compute_core_metrics, CoreMetrics};
use crate::types::Money;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Debt service coverage ratio. `Infinite` (no debt, positive NOI) orders
/// above every finite ratio.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dscr {
    Finite(Decimal),
    Infinite,
}

/// Lender-style reading of a DSCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DscrHealth {
    /// At or above 1.25x
    Healthy,
    /// Covers debt service, below 1.25x
    Marginal,
    /// Cash flow does not cover debt service
    Insufficient,
}

impl Dscr {
    /// Finite ratio, `None` when coverage is unbounded.
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Dscr::Finite(v) => Some(*v),
            Dscr::Infinite => None,
        }
    }

    pub fn health(&self) -> DscrHealth {
        match self {
            Dscr::Infinite => DscrHealth::Healthy,
            Dscr::Finite(v) if *v >= dec!(1.25) => DscrHealth::Healthy,
            Dscr::Finite(v) if *v >= Decimal::ONE => DscrHealth::Marginal,
            Dscr::Finite(_) => DscrHealth::Insufficient,
        }
    }
}

/// Core metrics with the commercial adjustments applied. `core.noi` and
/// `core.annual_cash_flow` carry the NNN-adjusted figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommercialMetrics {
    #[serde(flatten)]
    pub core: CoreMetrics,
    pub dscr: Dscr,
    pub capex_reserve: Money,
    pub tenant_improvements: Money,
    pub noi_after_capex: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// DSCR = NOI / annual debt service. Without debt service: infinite for a
/// positive NOI, zero otherwise.
pub fn calc_dscr(noi: Money, annual_debt_service: Money) -> Dscr {
    if annual_debt_service <= Decimal::ZERO {
        return if noi > Decimal::ZERO {
            Dscr::Infinite
        } else {
            Dscr::Finite(Decimal::ZERO)
        };
    }
    Dscr::Finite(noi / annual_debt_service)
}

/// Layer CAPEX reserves, tenant improvements and NNN reimbursement on top of
/// the core metrics.
///
/// Under NNN the tenant reimburses tax, insurance and maintenance. Those were
/// subtracted once in operating expenses, so the reimbursement is added back
/// to NOI. The CAPEX reserve is sized on the unadjusted NOI.
pub fn compute_commercial_metrics(inputs: &ProFormaInputs) -> CommercialMetrics {
    let purchase = &inputs.purchase;
    let expenses = &inputs.expenses;
    let commercial = &inputs.commercial;

    let core = compute_core_metrics(inputs);

    let capex_reserve = if commercial.annual_capex_reserve > Decimal::ZERO {
        commercial.annual_capex_reserve
    } else {
        core.noi * (commercial.capex_reserve_percent / dec!(100))
    };

    let nnn_reimbursement = if commercial.is_nnn {
        let property_tax = purchase.purchase_price * (expenses.property_tax_rate / dec!(100));
        let maintenance = purchase.purchase_price * (expenses.maintenance_percent / dec!(100));
        property_tax + expenses.insurance_annual + maintenance
    } else {
        Decimal::ZERO
    };

    let adjusted_noi = core.noi + nnn_reimbursement;
    let dscr = calc_dscr(adjusted_noi, core.annual_debt_service);
    let noi_after_capex = adjusted_noi - capex_reserve;
    let annual_cash_flow = adjusted_noi - core.annual_debt_service;

    CommercialMetrics {
        core: CoreMetrics {
            noi: adjusted_noi,
            annual_cash_flow,
            ..core
        },
        dscr,
        capex_reserve,
        tenant_improvements: commercial.tenant_improvement_allowance,
        noi_after_capex,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::PropertyType;
    use rust_decimal_macros::dec;

    fn commercial_input() -> ProFormaInputs {
        let mut input = ProFormaInputs::default();
        input.property_type = PropertyType::Commercial;
        input
    }

    #[test]
    fn test_dscr_basic() {
        assert_eq!(calc_dscr(dec!(25000), dec!(20000)), Dscr::Finite(dec!(1.25)));
    }

    #[test]
    fn test_dscr_no_debt() {
        assert_eq!(calc_dscr(dec!(10000), dec!(0)), Dscr::Infinite);
        assert_eq!(calc_dscr(dec!(-10000), dec!(0)), Dscr::Finite(Decimal::ZERO));
        assert_eq!(calc_dscr(dec!(0), dec!(0)), Dscr::Finite(Decimal::ZERO));
    }

    #[test]
    fn test_dscr_ordering_and_health() {
        assert!(Dscr::Infinite > Dscr::Finite(dec!(1000)));
        assert!(Dscr::Finite(dec!(1.3)) > Dscr::Finite(dec!(1.2)));
        assert_eq!(Dscr::Finite(dec!(1.25)).health(), DscrHealth::Healthy);
        assert_eq!(Dscr::Finite(dec!(1.1)).health(), DscrHealth::Marginal);
        assert_eq!(Dscr::Finite(dec!(0.9)).health(), DscrHealth::Insufficient);
        assert_eq!(Dscr::Infinite.health(), DscrHealth::Healthy);
    }

    #[test]
    fn test_capex_percent_of_noi() {
        let m = compute_commercial_metrics(&commercial_input());
        // 5% of 13176
        assert_eq!(m.capex_reserve, dec!(658.8));
        assert_eq!(m.noi_after_capex, m.core.noi - dec!(658.8));
    }

    #[test]
    fn test_fixed_capex_takes_precedence() {
        let mut input = commercial_input();
        input.commercial.annual_capex_reserve = dec!(2500);
        let m = compute_commercial_metrics(&input);
        assert_eq!(m.capex_reserve, dec!(2500));
    }

    #[test]
    fn test_nnn_adds_back_reimbursed_costs() {
        let mut input = commercial_input();
        input.commercial.is_nnn = true;
        let m = compute_commercial_metrics(&input);
        // 13176 + 3600 tax + 1200 insurance + 3000 maintenance
        assert_eq!(m.core.noi, dec!(20976));
        assert_eq!(m.core.annual_cash_flow, dec!(20976) - m.core.annual_debt_service);
    }

    #[test]
    fn test_tenant_improvements_pass_through() {
        let mut input = commercial_input();
        input.commercial.tenant_improvement_allowance = dec!(15000);
        let m = compute_commercial_metrics(&input);
        assert_eq!(m.tenant_improvements, dec!(15000));
    }

    #[test]
    fn test_dscr_serializes_tagged() {
        let json = serde_json::to_value(Dscr::Infinite).unwrap();
        assert_eq!(json, serde_json::json!("infinite"));
    }
}
