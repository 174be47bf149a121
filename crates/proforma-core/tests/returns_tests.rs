use proforma_core::equity::calc_equity_metrics;
use proforma_core::metrics::compute_core_metrics;
use proforma_core::projection::generate_cash_flow_projection;
use proforma_core::time_value::irr;
use proforma_core::{ProFormaError, ProFormaInputs};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// IRR solver
// ===========================================================================

#[test]
fn test_irr_ten_percent_single_period() {
    let result = irr(&[dec!(-1000), dec!(1100)]).unwrap();
    assert!((result - dec!(10)).abs() < dec!(0.5), "got {}", result);
}

#[test]
fn test_irr_not_computable_cases() {
    for flows in [
        vec![dec!(-1000)],
        vec![dec!(-1000), dec!(-500)],
        vec![dec!(1000), dec!(500)],
        vec![Decimal::ZERO, Decimal::ZERO],
    ] {
        match irr(&flows) {
            Err(ProFormaError::NotComputable(_)) => {}
            other => panic!("Expected NotComputable for {:?}, got {:?}", flows, other),
        }
    }
}

#[test]
fn test_irr_ten_year_terminal_heavy() {
    // -100 then 10,000 after ten years: (100)^(1/10) - 1 = 58.49%
    let mut flows = vec![dec!(-100)];
    flows.extend(std::iter::repeat(Decimal::ZERO).take(9));
    flows.push(dec!(10000));
    let result = irr(&flows).unwrap();
    assert!((result - dec!(58.49)).abs() < dec!(0.5), "got {}", result);
}

#[test]
fn test_irr_typical_real_estate_shape() {
    // Equity in, modest yield, large reversion
    let flows = vec![
        dec!(-69000),
        dec!(2500),
        dec!(2700),
        dec!(2900),
        dec!(3100),
        dec!(95000),
    ];
    let result = irr(&flows).unwrap();
    assert!(result > dec!(8) && result < dec!(12), "got {}", result);
}

#[test]
fn test_irr_thirty_year_hold_with_losses() {
    // Negative carry every year, small positive exit: root well below zero
    let _ = env_logger::try_init();
    let mut flows = vec![dec!(-50000)];
    flows.extend(std::iter::repeat(dec!(-1000)).take(29));
    flows.push(dec!(20000));
    let result = irr(&flows).unwrap();
    assert!(result > dec!(-99) && result < dec!(0), "got {}", result);
}

// ===========================================================================
// Projection invariants
// ===========================================================================

#[test]
fn test_cumulative_cash_flow_is_running_sum() {
    let mut input = ProFormaInputs::default();
    input.exit.hold_period_years = 30;
    let projection = generate_cash_flow_projection(&input);

    let mut running = Decimal::ZERO;
    for year in &projection {
        running += year.cash_flow;
        assert_eq!(year.cumulative_cash_flow, running, "year {}", year.year);
    }
}

#[test]
fn test_equity_grows_with_appreciation_and_amortisation() {
    let mut input = ProFormaInputs::default();
    input.exit.hold_period_years = 30;
    input.exit.appreciation_rate = dec!(2);
    let projection = generate_cash_flow_projection(&input);

    for pair in projection.windows(2) {
        assert!(
            pair[1].equity > pair[0].equity,
            "equity fell from year {} to {}",
            pair[0].year,
            pair[1].year
        );
    }
}

#[test]
fn test_expense_growth_does_not_inflate_management() {
    let mut input = ProFormaInputs::default();
    input.income.annual_rent_growth = Decimal::ZERO;
    input.expenses.insurance_annual = Decimal::ZERO;
    input.expenses.property_tax_rate = Decimal::ZERO;
    input.expenses.maintenance_percent = Decimal::ZERO;
    input.expenses.annual_expense_growth = dec!(10);
    let projection = generate_cash_flow_projection(&input);

    // Only management remains, and it tracks flat EGI
    assert_eq!(projection[0].operating_expenses, projection[4].operating_expenses);
}

// ===========================================================================
// Equity metrics
// ===========================================================================

#[test]
fn test_total_cash_invested_scenario() {
    let core = compute_core_metrics(&ProFormaInputs::default());
    // 60,000 down + 9,000 closing
    assert_eq!(core.total_cash_invested, dec!(69000));
}

#[test]
fn test_equity_multiple_definition() {
    let input = ProFormaInputs::default();
    let eq = calc_equity_metrics(&input, None);
    assert_eq!(eq.equity_multiple, eq.total_distributions / dec!(69000));
    assert_eq!(eq.total_profit, eq.total_distributions - dec!(69000));
    assert_eq!(eq.equity_by_year.len(), 5);
    assert_eq!(eq.equity_by_year[0].year, 1);
}

#[test]
fn test_equity_metrics_reuse_projection() {
    let input = ProFormaInputs::default();
    let projection = generate_cash_flow_projection(&input);
    assert_eq!(
        calc_equity_metrics(&input, Some(&projection)),
        calc_equity_metrics(&input, None)
    );
}

#[test]
fn test_renovation_counts_as_invested_cash() {
    let mut input = ProFormaInputs::default();
    input.renovation.renovation_cost = dec!(31000);
    let core = compute_core_metrics(&input);
    assert_eq!(core.total_cash_invested, dec!(100000));
}
