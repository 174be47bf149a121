use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use proforma_core::mortgage::{self, AmortizationEntry};
use proforma_core::types::with_metadata;

/// Arguments for mortgage calculations
#[derive(Args)]
pub struct MortgageArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent (e.g. 7 for 7%)
    #[arg(long)]
    pub rate: Decimal,

    /// Loan term in years
    #[arg(long, default_value_t = 30)]
    pub term_years: u32,

    /// Include the full month-by-month amortisation schedule
    #[arg(long)]
    pub schedule: bool,

    /// Report the remaining balance after this many payments
    #[arg(long)]
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
struct MortgageSummary {
    monthly_payment: Decimal,
    annual_debt_service: Decimal,
    total_payments: Decimal,
    total_interest: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    balance_at_month: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<Vec<AmortizationEntry>>,
}

#[derive(Debug, Serialize)]
struct MortgageAssumptions {
    principal: Decimal,
    annual_rate: Decimal,
    term_years: u32,
}

pub fn run_mortgage(args: MortgageArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    mortgage::validate_loan_terms(args.principal, args.rate, args.term_years)?;

    let payment = mortgage::monthly_payment(args.principal, args.rate, args.term_years);
    let n = Decimal::from(args.term_years) * Decimal::from(12);
    let total_payments = payment * n;
    let total_interest = if payment.is_zero() {
        Decimal::ZERO
    } else {
        total_payments - args.principal
    };

    let balance_at_month = args.month.map(|m| {
        if m > args.term_years * 12 {
            warnings.push(format!("Month {m} is past the loan term; balance is zero"));
        }
        mortgage::balance_at_month(args.principal, args.rate, args.term_years, m)
    });

    let schedule = args
        .schedule
        .then(|| mortgage::amortization_schedule(args.principal, args.rate, args.term_years));

    let summary = MortgageSummary {
        monthly_payment: payment,
        annual_debt_service: payment * Decimal::from(12),
        total_payments,
        total_interest,
        balance_at_month,
        schedule,
    };
    let assumptions = MortgageAssumptions {
        principal: args.principal,
        annual_rate: args.rate,
        term_years: args.term_years,
    };

    let output = with_metadata(
        "Fixed-rate fully amortising mortgage",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        summary,
    );
    Ok(serde_json::to_value(output)?)
}
