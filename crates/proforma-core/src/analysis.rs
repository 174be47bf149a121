use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::commercial::{compute_commercial_metrics, CommercialMetrics, DscrHealth};
use crate::equity::{calc_equity_metrics, cap_rate_exit, equity_cash_flows, EquityMetrics};
use crate::inputs::{CalculatorMode, NapkinInputs, ProFormaInputs, PropertyType};
use crate::metrics::{compute_core_metrics, CoreMetrics};
use crate::napkin::napkin_to_pro_forma;
use crate::projection::{generate_cash_flow_projection, CashFlowYear};
use crate::sensitivity::{default_sensitivity_matrix, SensitivityMatrix};
use crate::time_value::irr;
use crate::types::{with_metadata, ComputationOutput, Percent};
use crate::ProFormaResult;

/// Every derived metric for one input snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorResults {
    pub mode: CalculatorMode,
    pub property_type: PropertyType,
    pub inputs: ProFormaInputs,
    pub core_metrics: CoreMetrics,
    /// Present for commercial deals only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commercial_metrics: Option<CommercialMetrics>,
    pub cash_flow_projection: Vec<CashFlowYear>,
    pub equity_metrics: EquityMetrics,
    /// Levered IRR at the deal's exit cap rate; `None` when not computable
    pub irr: Option<Percent>,
    pub sensitivity_matrix: SensitivityMatrix,
}

// ---------------------------------------------------------------------------
// Pure recomputation
// ---------------------------------------------------------------------------

/// Recompute everything from a full pro forma snapshot.
pub fn compute_all(inputs: &ProFormaInputs) -> CalculatorResults {
    compute_with_mode(inputs.clone(), CalculatorMode::ProForma)
}

/// Expand napkin inputs with the standard heuristics, then recompute everything.
pub fn compute_all_napkin(napkin: &NapkinInputs) -> CalculatorResults {
    compute_with_mode(napkin_to_pro_forma(napkin), CalculatorMode::Napkin)
}

fn compute_with_mode(inputs: ProFormaInputs, mode: CalculatorMode) -> CalculatorResults {
    let core_metrics = compute_core_metrics(&inputs);
    let commercial_metrics = match inputs.property_type {
        PropertyType::Commercial => Some(compute_commercial_metrics(&inputs)),
        PropertyType::Residential => None,
    };
    let cash_flow_projection = generate_cash_flow_projection(&inputs);
    let equity_metrics = calc_equity_metrics(&inputs, Some(&cash_flow_projection));

    let exit = cap_rate_exit(
        &inputs,
        &cash_flow_projection,
        core_metrics.noi,
        inputs.exit.exit_cap_rate,
    );
    let flows = equity_cash_flows(
        core_metrics.total_cash_invested,
        &cash_flow_projection,
        exit.net_sale_proceeds,
    );
    let irr = irr(&flows).ok();

    let sensitivity_matrix = default_sensitivity_matrix(&inputs);

    debug!(
        "Analysed {:?} deal: NOI {}, cash-on-cash {}%, IRR {:?}",
        inputs.property_type, core_metrics.noi, core_metrics.cash_on_cash, irr
    );

    CalculatorResults {
        mode,
        property_type: inputs.property_type,
        inputs,
        core_metrics,
        commercial_metrics,
        cash_flow_projection,
        equity_metrics,
        irr,
        sensitivity_matrix,
    }
}

// ---------------------------------------------------------------------------
// Validated entry points
// ---------------------------------------------------------------------------

/// Validate a pro forma, recompute everything and attach deal warnings.
pub fn analyze_deal(
    inputs: &ProFormaInputs,
) -> ProFormaResult<ComputationOutput<CalculatorResults>> {
    let start = Instant::now();
    inputs.validate()?;

    let results = compute_all(inputs);
    let warnings = deal_warnings(&results);
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Real Estate Pro Forma (levered hold-period analysis)",
        inputs,
        warnings,
        elapsed,
        results,
    ))
}

/// Validate napkin inputs, expand them and analyse the resulting pro forma.
pub fn analyze_napkin(
    napkin: &NapkinInputs,
) -> ProFormaResult<ComputationOutput<CalculatorResults>> {
    let start = Instant::now();
    napkin.validate()?;

    let results = compute_all_napkin(napkin);
    let warnings = deal_warnings(&results);
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Real Estate Napkin Math (heuristic pro forma)",
        napkin,
        warnings,
        elapsed,
        results,
    ))
}

fn deal_warnings(results: &CalculatorResults) -> Vec<String> {
    let mut warnings = Vec::new();
    let inputs = &results.inputs;
    let core = &results.core_metrics;

    if inputs.income.vacancy_rate > dec!(15) {
        warnings.push(format!(
            "Vacancy rate {}% exceeds 15% — above typical market norms",
            inputs.income.vacancy_rate
        ));
    }

    let ltv = Decimal::ONE_HUNDRED - inputs.purchase.down_payment_percent;
    if ltv > dec!(80) {
        warnings.push(format!("LTV of {ltv}% exceeds 80% — high leverage"));
    }

    if core.total_cash_invested <= Decimal::ZERO {
        warnings.push("No cash invested — cash-on-cash and equity multiple are zero".into());
    }

    if core.annual_cash_flow < Decimal::ZERO {
        warnings.push(format!(
            "Year-1 cash flow is negative ({:.2}) — debt service exceeds NOI",
            core.annual_cash_flow
        ));
    }

    if let Some(commercial) = &results.commercial_metrics {
        if commercial.dscr.health() != DscrHealth::Healthy {
            let ratio = commercial.dscr.value().unwrap_or(Decimal::ZERO);
            warnings.push(format!(
                "DSCR of {ratio:.2} is below 1.25x — lender covenant risk"
            ));
        }
    }

    if results.irr.is_none() {
        warnings.push("IRR not computable — equity cash flows have no sign change".into());
    }

    warnings
}
