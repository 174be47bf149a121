use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use proforma_core::sensitivity::{DEFAULT_COL_STEPS, DEFAULT_ROW_STEPS};
use proforma_core::{NapkinInputs, ProFormaError, ProFormaInputs, PropertyEstimate};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_deal(input_json: &str) -> NapiResult<ProFormaInputs> {
    let inputs: ProFormaInputs = serde_json::from_str(input_json).map_err(to_napi_error)?;
    inputs.validate().map_err(to_napi_error)?;
    Ok(inputs)
}

// ---------------------------------------------------------------------------
// Mortgage
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct LoanTerms {
    principal: Decimal,
    annual_rate: Decimal,
    term_years: u32,
}

fn parse_loan(input_json: &str) -> NapiResult<LoanTerms> {
    let loan: LoanTerms = serde_json::from_str(input_json).map_err(to_napi_error)?;
    proforma_core::mortgage::validate_loan_terms(loan.principal, loan.annual_rate, loan.term_years)
        .map_err(to_napi_error)?;
    Ok(loan)
}

#[napi]
pub fn monthly_payment(input_json: String) -> NapiResult<String> {
    let loan = parse_loan(&input_json)?;
    let payment =
        proforma_core::mortgage::monthly_payment(loan.principal, loan.annual_rate, loan.term_years);
    serde_json::to_string(&payment).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let loan = parse_loan(&input_json)?;
    let schedule = proforma_core::mortgage::amortization_schedule(
        loan.principal,
        loan.annual_rate,
        loan.term_years,
    );
    serde_json::to_string(&schedule).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Returns
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct IrrOutput {
    /// Percent; null when the series has no IRR
    irr: Option<Decimal>,
}

/// IRR of a JSON array of periodic cash flows. A series without a rate comes
/// back as `{"irr": null}` rather than an error.
#[napi]
pub fn calc_irr(cash_flows_json: String) -> NapiResult<String> {
    let flows: Vec<Decimal> = serde_json::from_str(&cash_flows_json).map_err(to_napi_error)?;
    let irr = match proforma_core::time_value::irr(&flows) {
        Ok(rate) => Some(rate),
        Err(ProFormaError::NotComputable(_)) => None,
        Err(e) => return Err(to_napi_error(e)),
    };
    serde_json::to_string(&IrrOutput { irr }).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Deal metrics
// ---------------------------------------------------------------------------

#[napi]
pub fn core_metrics(input_json: String) -> NapiResult<String> {
    let inputs = parse_deal(&input_json)?;
    let output = proforma_core::metrics::compute_core_metrics(&inputs);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn cash_flow_projection(input_json: String) -> NapiResult<String> {
    let inputs = parse_deal(&input_json)?;
    let output = proforma_core::projection::generate_cash_flow_projection(&inputs);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn equity_metrics(input_json: String) -> NapiResult<String> {
    let inputs = parse_deal(&input_json)?;
    let output = proforma_core::equity::calc_equity_metrics(&inputs, None);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn commercial_metrics(input_json: String) -> NapiResult<String> {
    let inputs = parse_deal(&input_json)?;
    let output = proforma_core::commercial::compute_commercial_metrics(&inputs);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct SensitivityRequest {
    #[serde(default)]
    inputs: ProFormaInputs,
    row_steps: Option<usize>,
    col_steps: Option<usize>,
}

#[napi]
pub fn sensitivity_matrix(input_json: String) -> NapiResult<String> {
    let request: SensitivityRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    request.inputs.validate().map_err(to_napi_error)?;
    let output = proforma_core::sensitivity::generate_sensitivity_matrix(
        &request.inputs,
        request.row_steps.unwrap_or(DEFAULT_ROW_STEPS),
        request.col_steps.unwrap_or(DEFAULT_COL_STEPS),
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Napkin / full analysis
// ---------------------------------------------------------------------------

#[napi]
pub fn napkin_to_pro_forma(input_json: String) -> NapiResult<String> {
    let napkin: NapkinInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = proforma_core::napkin::napkin_to_pro_forma(&napkin);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_deal(input_json: String) -> NapiResult<String> {
    let inputs: ProFormaInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = proforma_core::analysis::analyze_deal(&inputs).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_napkin(input_json: String) -> NapiResult<String> {
    let napkin: NapkinInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = proforma_core::analysis::analyze_napkin(&napkin).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct EstimateRequest {
    inputs: ProFormaInputs,
    estimate: PropertyEstimate,
}

/// Overlay an address-lookup estimate onto a pro forma snapshot.
#[napi]
pub fn apply_property_estimate(input_json: String) -> NapiResult<String> {
    let request: EstimateRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = request.inputs.with_estimate(&request.estimate);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Serialize)]
struct ValidationReport {
    valid: bool,
    error: Option<String>,
}

/// Range-check a pro forma without computing anything.
#[napi]
pub fn validate_inputs(input_json: String) -> NapiResult<String> {
    let inputs: ProFormaInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let report = match inputs.validate() {
        Ok(()) => ValidationReport {
            valid: true,
            error: None,
        },
        Err(e) => ValidationReport {
            valid: false,
            error: Some(e.to_string()),
        },
    };
    serde_json::to_string(&report).map_err(to_napi_error)
}
