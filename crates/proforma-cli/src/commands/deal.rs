use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use proforma_core::analysis;
use proforma_core::commercial::{self, DscrHealth};
use proforma_core::equity;
use proforma_core::projection;
use proforma_core::sensitivity::{self, DEFAULT_COL_STEPS, DEFAULT_ROW_STEPS};
use proforma_core::types::with_metadata;
use proforma_core::{NapkinInputs, ProFormaInputs, ProFormaResult, PropertyEstimate};

use crate::input;

/// Arguments shared by every pro forma command
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to a JSON/YAML pro forma file (missing fields take defaults)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a property estimate (value, rent, tax rate, insurance) to overlay
    #[arg(long)]
    pub estimate: Option<String>,
}

/// Arguments for napkin analysis
#[derive(Args)]
pub struct NapkinArgs {
    /// Path to a JSON/YAML napkin file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Monthly rent
    #[arg(long)]
    pub rent: Option<Decimal>,

    /// Annual mortgage rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Path to a property estimate to overlay (price and rent)
    #[arg(long)]
    pub estimate: Option<String>,
}

/// Arguments for the sensitivity grid
#[derive(Args)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub deal: AnalyzeArgs,

    /// Number of exit cap rate rows
    #[arg(long, default_value_t = DEFAULT_ROW_STEPS)]
    pub rows: usize,

    /// Number of vacancy rate columns
    #[arg(long, default_value_t = DEFAULT_COL_STEPS)]
    pub cols: usize,
}

/// Arguments for printing default inputs
#[derive(Args)]
pub struct DefaultsArgs {
    /// Print the napkin template instead of the full pro forma
    #[arg(long)]
    pub napkin: bool,
}

fn load_estimate(path: Option<&str>) -> Result<Option<PropertyEstimate>, Box<dyn std::error::Error>> {
    path.map(input::file::read_structured::<PropertyEstimate>).transpose()
}

/// `--input`, else stdin, else the default deal; then the optional estimate.
fn load_deal(args: &AnalyzeArgs) -> Result<ProFormaInputs, Box<dyn std::error::Error>> {
    let deal = input::load::<ProFormaInputs>(args.input.as_deref())?;
    let estimate = load_estimate(args.estimate.as_deref())?;
    Ok(resolve_deal(deal, estimate)?)
}

fn resolve_deal(
    deal: Option<ProFormaInputs>,
    estimate: Option<PropertyEstimate>,
) -> ProFormaResult<ProFormaInputs> {
    let deal = deal.unwrap_or_default();
    let deal = match estimate {
        Some(estimate) => deal.with_estimate(&estimate),
        None => deal,
    };
    deal.validate()?;
    Ok(deal)
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let deal = load_deal(&args)?;
    let output = analysis::analyze_deal(&deal)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_napkin(args: NapkinArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let napkin: NapkinInputs = if let Some(napkin) = input::load::<NapkinInputs>(args.input.as_deref())? {
        napkin
    } else {
        let defaults = NapkinInputs::default();
        NapkinInputs {
            purchase_price: args.price.ok_or("--price is required (or provide --input)")?,
            monthly_rent: args.rent.ok_or("--rent is required (or provide --input)")?,
            interest_rate: args.rate.unwrap_or(defaults.interest_rate),
        }
    };
    let napkin = match load_estimate(args.estimate.as_deref())? {
        Some(estimate) => napkin.with_estimate(&estimate),
        None => napkin,
    };

    let output = analysis::analyze_napkin(&napkin)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_cash_flow(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let deal = load_deal(&args)?;

    let years = projection::generate_cash_flow_projection(&deal);
    let mut warnings = Vec::new();
    if let Some(first_negative) = years.iter().find(|y| y.cash_flow < Decimal::ZERO) {
        warnings.push(format!(
            "Negative cash flow from year {} ({:.2})",
            first_negative.year, first_negative.cash_flow
        ));
    }

    let output = with_metadata(
        "Hold-period cash-flow projection",
        &deal,
        warnings,
        start.elapsed().as_micros() as u64,
        years,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_equity(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let deal = load_deal(&args)?;

    let metrics = equity::calc_equity_metrics(&deal, None);
    let mut warnings = Vec::new();
    if metrics.equity_multiple < Decimal::ONE {
        warnings.push(format!(
            "Equity multiple {:.2}x is below 1.0x — capital is not returned",
            metrics.equity_multiple
        ));
    }

    let output = with_metadata(
        "Equity multiple (exit at appreciated value)",
        &deal,
        warnings,
        start.elapsed().as_micros() as u64,
        metrics,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_commercial(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let deal = load_deal(&args)?;

    let metrics = commercial::compute_commercial_metrics(&deal);
    let mut warnings = Vec::new();
    match metrics.dscr.health() {
        DscrHealth::Healthy => {}
        DscrHealth::Marginal => warnings.push("DSCR below 1.25x — marginal coverage".into()),
        DscrHealth::Insufficient => {
            warnings.push("DSCR below 1.0x — NOI does not cover debt service".into())
        }
    }

    let output = with_metadata(
        "Commercial metrics (DSCR, CAPEX reserve, NNN)",
        &deal,
        warnings,
        start.elapsed().as_micros() as u64,
        metrics,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let deal = load_deal(&args.deal)?;

    let matrix = sensitivity::generate_sensitivity_matrix(&deal, args.rows, args.cols)?;

    let output = with_metadata(
        "Exit cap rate x vacancy sensitivity (levered IRR, cash-on-cash)",
        &deal,
        Vec::new(),
        start.elapsed().as_micros() as u64,
        matrix,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_defaults(args: DefaultsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.napkin {
        Ok(serde_json::to_value(NapkinInputs::default())?)
    } else {
        Ok(serde_json::to_value(ProFormaInputs::default())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_input_falls_back_to_defaults() {
        assert_eq!(resolve_deal(None, None).unwrap(), ProFormaInputs::default());
    }

    #[test]
    fn test_estimate_overlays_default_deal() {
        let estimate = PropertyEstimate {
            estimated_value: Decimal::from(450000),
            rent_estimate: Decimal::from(3100),
            property_tax_rate: Decimal::ONE,
            insurance_annual: Decimal::from(1800),
        };
        let deal = resolve_deal(None, Some(estimate)).unwrap();
        assert_eq!(deal.purchase.purchase_price, Decimal::from(450000));
        assert_eq!(deal.income.monthly_rent, Decimal::from(3100));
    }

    #[test]
    fn test_invalid_deal_is_rejected() {
        let mut deal = ProFormaInputs::default();
        deal.income.vacancy_rate = Decimal::from(150);
        assert!(resolve_deal(Some(deal), None).is_err());
    }
}
