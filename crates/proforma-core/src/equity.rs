use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::inputs::ProFormaInputs;
use crate::metrics::total_cash_invested;
use crate::projection::{generate_cash_flow_projection, CashFlowYear};
use crate::types::{Money, Multiple, Percent};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityYear {
    pub year: u32,
    pub equity: Money,
    pub property_value: Money,
    pub loan_balance: Money,
}

/// Hold-period equity returns, exiting at the appreciated property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityMetrics {
    /// Total distributions / total cash invested
    pub equity_multiple: Multiple,
    pub total_profit: Money,
    /// Operating cash flow over the hold plus net sale proceeds
    pub total_distributions: Money,
    pub net_sale_proceeds: Money,
    pub equity_by_year: Vec<EquityYear>,
}

/// Sale at exit priced off the final year's NOI and an exit cap rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitReversion {
    pub exit_noi: Money,
    pub exit_cap_rate: Percent,
    pub sale_price: Money,
    pub selling_costs: Money,
    pub loan_payoff: Money,
    pub net_sale_proceeds: Money,
}

impl EquityMetrics {
    fn zero() -> Self {
        Self {
            equity_multiple: Decimal::ZERO,
            total_profit: Decimal::ZERO,
            total_distributions: Decimal::ZERO,
            net_sale_proceeds: Decimal::ZERO,
            equity_by_year: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Equity multiple
// ---------------------------------------------------------------------------

/// Equity multiple and profit for the hold. Pass an existing projection to
/// avoid recomputing it; it must come from the same `inputs`.
///
/// With no cash invested the result is all zero with no yearly rows.
pub fn calc_equity_metrics(
    inputs: &ProFormaInputs,
    projection: Option<&[CashFlowYear]>,
) -> EquityMetrics {
    let owned;
    let projection = match projection {
        Some(p) => p,
        None => {
            owned = generate_cash_flow_projection(inputs);
            owned.as_slice()
        }
    };

    let total_cash_invested = total_cash_invested(inputs);
    if total_cash_invested <= Decimal::ZERO {
        return EquityMetrics::zero();
    }

    let total_cash_flow: Money = projection.iter().map(|y| y.cash_flow).sum();

    // --- Sale at appreciated value ---
    let last_year = projection.last();
    let sale_price = last_year
        .map(|y| y.property_value)
        .unwrap_or(inputs.purchase.purchase_price);
    let selling_costs = sale_price * (inputs.exit.selling_cost_percent / dec!(100));
    let loan_balance = last_year.map(|y| y.loan_balance).unwrap_or(Decimal::ZERO);
    let net_sale_proceeds = sale_price - selling_costs - loan_balance;

    let total_distributions = total_cash_flow + net_sale_proceeds;
    let total_profit = total_distributions - total_cash_invested;
    let equity_multiple = total_distributions / total_cash_invested;

    let equity_by_year = projection
        .iter()
        .map(|y| EquityYear {
            year: y.year,
            equity: y.equity,
            property_value: y.property_value,
            loan_balance: y.loan_balance,
        })
        .collect();

    EquityMetrics {
        equity_multiple,
        total_profit,
        total_distributions,
        net_sale_proceeds,
        equity_by_year,
    }
}

// ---------------------------------------------------------------------------
// Exit reversion (cap-rate based)
// ---------------------------------------------------------------------------

/// Price the exit as final-year NOI over `exit_cap_rate` (percent). Falls back
/// to `fallback_noi` and a zero payoff when the projection is empty; a zero cap
/// rate yields a zero sale price.
pub fn cap_rate_exit(
    inputs: &ProFormaInputs,
    projection: &[CashFlowYear],
    fallback_noi: Money,
    exit_cap_rate: Percent,
) -> ExitReversion {
    let last_year = projection.last();
    let exit_noi = last_year.map(|y| y.noi).unwrap_or(fallback_noi);
    let cap = exit_cap_rate / dec!(100);
    let sale_price = if cap > Decimal::ZERO {
        exit_noi / cap
    } else {
        Decimal::ZERO
    };
    let selling_costs = sale_price * (inputs.exit.selling_cost_percent / dec!(100));
    let loan_payoff = last_year.map(|y| y.loan_balance).unwrap_or(Decimal::ZERO);

    ExitReversion {
        exit_noi,
        exit_cap_rate,
        sale_price,
        selling_costs,
        loan_payoff,
        net_sale_proceeds: sale_price - selling_costs - loan_payoff,
    }
}

/// Equity cash-flow series for IRR: `[-invested, cf1, ..., cfN + proceeds]`.
pub fn equity_cash_flows(
    total_cash_invested: Money,
    projection: &[CashFlowYear],
    net_sale_proceeds: Money,
) -> Vec<Money> {
    let last = projection.len().saturating_sub(1);
    std::iter::once(-total_cash_invested)
        .chain(projection.iter().enumerate().map(|(idx, y)| {
            if idx == last {
                y.cash_flow + net_sale_proceeds
            } else {
                y.cash_flow
            }
        }))
        .collect()
}
