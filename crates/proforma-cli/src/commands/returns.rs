use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use proforma_core::time_value;
use proforma_core::types::with_metadata;
use proforma_core::ProFormaError;

use crate::input;

/// Arguments for IRR calculation
#[derive(Args)]
pub struct IrrArgs {
    /// Path to a JSON/YAML file holding an array of cash flows
    #[arg(long)]
    pub input: Option<String>,

    /// Periodic cash flows, period 0 first (comma-separated, e.g. "-1000,300,300,600")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,
}

#[derive(Debug, Serialize)]
struct IrrResult {
    /// Percent; null when no rate exists
    irr: Option<Decimal>,
    periods: usize,
    total_inflows: Decimal,
    total_outflows: Decimal,
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();

    let cash_flows: Vec<Decimal> = match args.cash_flows {
        Some(flows) => flows,
        None => input::load::<Vec<Decimal>>(args.input.as_deref())?
            .ok_or("--cash-flows is required (or provide --input / stdin)")?,
    };

    let mut warnings = Vec::new();
    let irr = match time_value::irr(&cash_flows) {
        Ok(rate) => Some(rate),
        Err(ProFormaError::NotComputable(reason)) => {
            warnings.push(format!("IRR not computable: {reason}"));
            None
        }
        Err(e) => return Err(e.into()),
    };

    let result = IrrResult {
        irr,
        periods: cash_flows.len(),
        total_inflows: cash_flows.iter().filter(|cf| cf.is_sign_positive()).sum(),
        total_outflows: cash_flows.iter().filter(|cf| cf.is_sign_negative()).sum(),
    };

    let output = with_metadata(
        "IRR (Newton-Raphson with bisection fallback)",
        &cash_flows,
        warnings,
        start.elapsed().as_micros() as u64,
        result,
    );
    Ok(serde_json::to_value(output)?)
}
