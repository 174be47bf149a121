use log::debug;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::equity::{cap_rate_exit, equity_cash_flows};
use crate::error::ProFormaError;
use crate::inputs::ProFormaInputs;
use crate::metrics::{calc_cash_on_cash, compute_core_metrics, total_cash_invested};
use crate::projection::generate_cash_flow_projection;
use crate::time_value::irr;
use crate::types::Percent;
use crate::ProFormaResult;

pub const DEFAULT_ROW_STEPS: usize = 7;
pub const DEFAULT_COL_STEPS: usize = 6;

const MIN_EXIT_CAP_RATE: Percent = dec!(0.5);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityCell {
    /// Exit cap rate for this row (percent)
    pub row_param: Percent,
    /// Vacancy rate for this column (percent)
    pub col_param: Percent,
    /// Levered IRR (percent); 0 where the IRR is not computable
    pub irr: Percent,
    /// Year-one cash-on-cash (percent)
    pub coc: Percent,
}

/// Exit cap rate (rows) x vacancy rate (columns) grid of IRR and cash-on-cash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityMatrix {
    pub row_label: String,
    pub col_label: String,
    pub row_values: Vec<Percent>,
    pub col_values: Vec<Percent>,
    pub cells: Vec<Vec<SensitivityCell>>,
    /// Row whose cap rate is nearest the deal's exit cap rate
    pub base_row_index: usize,
    /// Column whose vacancy is nearest the deal's vacancy rate
    pub base_col_index: usize,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// The standard 7 x 6 grid.
pub fn default_sensitivity_matrix(inputs: &ProFormaInputs) -> SensitivityMatrix {
    build_matrix(inputs, DEFAULT_ROW_STEPS, DEFAULT_COL_STEPS)
}

/// Re-run the deal across `row_steps` exit cap rates and `col_steps` vacancy
/// rates. Both axes need at least two steps.
pub fn generate_sensitivity_matrix(
    inputs: &ProFormaInputs,
    row_steps: usize,
    col_steps: usize,
) -> ProFormaResult<SensitivityMatrix> {
    if row_steps < 2 {
        return Err(ProFormaError::InvalidInput {
            field: "row_steps".into(),
            reason: "Sensitivity grid needs at least 2 rows".into(),
        });
    }
    if col_steps < 2 {
        return Err(ProFormaError::InvalidInput {
            field: "col_steps".into(),
            reason: "Sensitivity grid needs at least 2 columns".into(),
        });
    }
    Ok(build_matrix(inputs, row_steps, col_steps))
}

// ---------------------------------------------------------------------------
// Grid construction
// ---------------------------------------------------------------------------

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Cap rates centred on the base, spread `max(base - 1, 3)` either side,
/// floored at 0.5%.
fn exit_cap_axis(base: Percent, steps: usize) -> Vec<Percent> {
    let spread = (base - Decimal::ONE).max(dec!(3));
    let step = spread * dec!(2) / Decimal::from(steps - 1);
    (0..steps)
        .map(|i| {
            let value = (base - spread + Decimal::from(i) * step).max(MIN_EXIT_CAP_RATE);
            round2(value)
        })
        .collect()
}

/// Vacancy from 0 to `max(base + 10, 15)`.
fn vacancy_axis(base: Percent, steps: usize) -> Vec<Percent> {
    let max = (base + dec!(10)).max(dec!(15));
    let step = max / Decimal::from(steps - 1);
    (0..steps)
        .map(|i| round2(Decimal::from(i) * step))
        .collect()
}

/// Index of the value closest to `target`; the first one wins ties.
fn nearest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .fold(0, |closest, (idx, v)| {
            if (*v - target).abs() < (values[closest] - target).abs() {
                idx
            } else {
                closest
            }
        })
}

fn evaluate_cell(inputs: &ProFormaInputs, exit_cap_rate: Percent, vacancy_rate: Percent) -> SensitivityCell {
    let mut scenario = inputs.clone();
    scenario.income.vacancy_rate = vacancy_rate;
    scenario.exit.exit_cap_rate = exit_cap_rate;

    let metrics = compute_core_metrics(&scenario);
    let projection = generate_cash_flow_projection(&scenario);
    let invested = total_cash_invested(&scenario);

    let exit = cap_rate_exit(&scenario, &projection, metrics.noi, exit_cap_rate);
    let flows = equity_cash_flows(invested, &projection, exit.net_sale_proceeds);

    SensitivityCell {
        row_param: exit_cap_rate,
        col_param: vacancy_rate,
        irr: irr(&flows).unwrap_or(Decimal::ZERO),
        coc: calc_cash_on_cash(metrics.annual_cash_flow, invested),
    }
}

fn build_matrix(inputs: &ProFormaInputs, row_steps: usize, col_steps: usize) -> SensitivityMatrix {
    let base_exit_cap = inputs.exit.exit_cap_rate;
    let base_vacancy = inputs.income.vacancy_rate;

    let row_values = exit_cap_axis(base_exit_cap, row_steps);
    let col_values = vacancy_axis(base_vacancy, col_steps);
    debug!(
        "Sensitivity grid {row_steps}x{col_steps}: exit cap {:?}, vacancy {:?}",
        row_values, col_values
    );

    let cells = row_values
        .iter()
        .map(|&cap| {
            col_values
                .iter()
                .map(|&vacancy| evaluate_cell(inputs, cap, vacancy))
                .collect()
        })
        .collect();

    SensitivityMatrix {
        row_label: "Exit Cap Rate (%)".into(),
        col_label: "Vacancy Rate (%)".into(),
        base_row_index: nearest_index(&row_values, base_exit_cap),
        base_col_index: nearest_index(&col_values, base_vacancy),
        row_values,
        col_values,
        cells,
    }
}
