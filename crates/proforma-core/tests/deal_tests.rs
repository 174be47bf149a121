use proforma_core::analysis::{analyze_deal, analyze_napkin, compute_all};
use proforma_core::commercial::{compute_commercial_metrics, Dscr};
use proforma_core::sensitivity::{default_sensitivity_matrix, generate_sensitivity_matrix};
use proforma_core::{NapkinInputs, ProFormaInputs, PropertyType};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn commercial_deal() -> ProFormaInputs {
    let mut input = ProFormaInputs::default();
    input.property_type = PropertyType::Commercial;
    input.purchase.purchase_price = dec!(1200000);
    input.purchase.down_payment_percent = dec!(30);
    input.purchase.interest_rate = dec!(6.5);
    input.purchase.loan_term_years = 25;
    input.income.monthly_rent = dec!(11000);
    input.expenses.insurance_annual = dec!(6000);
    input
}

// ===========================================================================
// Commercial
// ===========================================================================

#[test]
fn test_nnn_raises_noi_and_dscr() {
    let gross = commercial_deal();
    let mut nnn = commercial_deal();
    nnn.commercial.is_nnn = true;

    let base = compute_commercial_metrics(&gross);
    let net = compute_commercial_metrics(&nnn);

    assert!(net.core.noi > base.core.noi);
    assert!(net.dscr > base.dscr);
    assert!(matches!(net.dscr, Dscr::Finite(_)));
}

#[test]
fn test_all_cash_commercial_has_infinite_coverage() {
    let mut input = commercial_deal();
    input.purchase.down_payment_percent = dec!(100);
    let m = compute_commercial_metrics(&input);
    assert_eq!(m.dscr, Dscr::Infinite);
    assert_eq!(m.core.annual_cash_flow, m.core.noi);
}

#[test]
fn test_commercial_serializes_flat() {
    let m = compute_commercial_metrics(&commercial_deal());
    let json = serde_json::to_value(&m).unwrap();
    assert!(json.get("noi").is_some());
    assert!(json.get("cap_rate").is_some());
    assert!(json.get("dscr").is_some());
    assert!(json.get("core").is_none());
}

// ===========================================================================
// Sensitivity
// ===========================================================================

#[test]
fn test_default_grid_shape_and_base_indices() {
    let input = ProFormaInputs::default();
    let matrix = default_sensitivity_matrix(&input);

    assert_eq!(matrix.row_values.len(), 7);
    assert_eq!(matrix.col_values.len(), 6);
    assert_eq!(matrix.cells.len(), 7);
    assert!(matrix.cells.iter().all(|row| row.len() == 6));

    assert!(matrix.base_row_index < 7);
    assert!(matrix.base_col_index < 6);
    assert_eq!(matrix.row_values[matrix.base_row_index], dec!(6));
    // 5% vacancy sits between the 3% and 6% columns; 6% is nearer
    assert_eq!(matrix.col_values[matrix.base_col_index], dec!(6));

    let nearest_row = matrix
        .row_values
        .iter()
        .map(|v| (*v - input.exit.exit_cap_rate).abs())
        .min()
        .unwrap();
    assert_eq!(
        (matrix.row_values[matrix.base_row_index] - input.exit.exit_cap_rate).abs(),
        nearest_row
    );
}

#[test]
fn test_lower_vacancy_gives_higher_cash_on_cash() {
    let matrix = default_sensitivity_matrix(&ProFormaInputs::default());
    let base_row = &matrix.cells[matrix.base_row_index];
    let first = base_row.first().unwrap();
    let last = base_row.last().unwrap();
    assert!(first.coc >= last.coc, "{} < {}", first.coc, last.coc);
}

#[test]
fn test_higher_exit_cap_lowers_irr() {
    let mut input = ProFormaInputs::default();
    input.income.monthly_rent = dec!(2600);
    let matrix = default_sensitivity_matrix(&input);
    let col = matrix.base_col_index;
    let low_cap = &matrix.cells[0][col];
    let high_cap = &matrix.cells[6][col];
    assert!(low_cap.irr > high_cap.irr, "{} <= {}", low_cap.irr, high_cap.irr);
}

#[test]
fn test_losing_cells_report_zero_not_bracket_bound() {
    // At an 11% exit cap the reversion is negative; those cells have no IRR
    let mut input = ProFormaInputs::default();
    input.income.monthly_rent = dec!(2600);
    let matrix = default_sensitivity_matrix(&input);
    for cell in matrix.cells.iter().flatten() {
        assert!(
            cell.irr < dec!(999),
            "cap {} vacancy {}: irr {}",
            cell.row_param,
            cell.col_param,
            cell.irr
        );
    }
    assert_eq!(matrix.cells[6][matrix.base_col_index].irr, Decimal::ZERO);
}

#[test]
fn test_custom_grid_dimensions() {
    let matrix = generate_sensitivity_matrix(&ProFormaInputs::default(), 5, 4).unwrap();
    assert_eq!(matrix.row_values.len(), 5);
    assert_eq!(matrix.col_values.len(), 4);
    assert_eq!(matrix.col_values[0], Decimal::ZERO);
    assert_eq!(matrix.col_values[3], dec!(15));
}

// ===========================================================================
// Aggregate analysis
// ===========================================================================

#[test]
fn test_analyze_deal_envelope() {
    let out = analyze_deal(&commercial_deal()).unwrap();
    assert!(out.result.commercial_metrics.is_some());
    assert_eq!(out.result.cash_flow_projection.len(), 5);
    assert!(!out.methodology.is_empty());
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
}

#[test]
fn test_analyze_napkin_expands_inputs() {
    let napkin = NapkinInputs {
        purchase_price: dec!(350000),
        monthly_rent: dec!(2600),
        interest_rate: dec!(6),
    };
    let out = analyze_napkin(&napkin).unwrap();
    assert_eq!(out.result.inputs.purchase.purchase_price, dec!(350000));
    assert_eq!(out.result.inputs.expenses.insurance_annual, dec!(1400));
    assert_eq!(out.result.inputs.exit.hold_period_years, 5);
}

#[test]
fn test_analyze_napkin_rejects_zero_price() {
    let napkin = NapkinInputs {
        purchase_price: Decimal::ZERO,
        ..NapkinInputs::default()
    };
    assert!(analyze_napkin(&napkin).is_err());
}

#[test]
fn test_results_round_trip_through_json() {
    let results = compute_all(&commercial_deal());
    let json = serde_json::to_string(&results).unwrap();
    let back: proforma_core::analysis::CalculatorResults = serde_json::from_str(&json).unwrap();
    assert_eq!(back.core_metrics, results.core_metrics);
    assert_eq!(back.irr, results.irr);
}
