use clap::Args;
use log::debug;
use rust_decimal::Decimal;
use serde_json::Value;

use annuity_core::{solve_annuity, AnnuityInput, KnownValue, PeriodRounding, Target, Timing};

use crate::input;

/// Arguments for the future and present value commands
#[derive(Args)]
pub struct ValueArgs {
    /// Periodic payment (R)
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Periodic interest rate as a decimal (e.g. 0.02 for 2%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Number of payment periods (n)
    #[arg(long)]
    pub periods: Option<u32>,

    /// Payment timing: ordinary (vencida) or due (anticipada)
    #[arg(long, default_value = "ordinary")]
    pub timing: Timing,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for solving the periodic payment
#[derive(Args)]
pub struct PaymentArgs {
    /// Periodic interest rate as a decimal (e.g. 0.02 for 2%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Number of payment periods (n)
    #[arg(long)]
    pub periods: Option<u32>,

    /// Known present value (P)
    #[arg(long, conflicts_with = "future_value")]
    pub present_value: Option<Decimal>,

    /// Known future value (F)
    #[arg(long)]
    pub future_value: Option<Decimal>,

    /// Payment timing: ordinary (vencida) or due (anticipada)
    #[arg(long, default_value = "ordinary")]
    pub timing: Timing,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for solving the number of periods
#[derive(Args)]
pub struct PeriodsArgs {
    /// Periodic payment (R)
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Periodic interest rate as a decimal (e.g. 0.02 for 2%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Known present value (P)
    #[arg(long, conflicts_with = "future_value")]
    pub present_value: Option<Decimal>,

    /// Known future value (F)
    #[arg(long)]
    pub future_value: Option<Decimal>,

    /// Payment timing: ordinary (vencida) or due (anticipada)
    #[arg(long, default_value = "ordinary")]
    pub timing: Timing,

    /// Rounding of the fractional period count: nearest or up
    #[arg(long, default_value = "nearest")]
    pub rounding: PeriodRounding,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a full annuity request
#[derive(Args)]
pub struct SolveArgs {
    /// Path to JSON input file with the annuity request
    #[arg(long)]
    pub input: Option<String>,
}

/// Read a request from `--input`, or from piped stdin when no flags were given.
fn load_request(
    path: Option<&str>,
    has_flags: bool,
) -> Result<Option<AnnuityInput>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        debug!("reading annuity request from {path}");
        return Ok(Some(input::file::read_json(path)?));
    }
    if has_flags {
        return Ok(None);
    }
    match input::stdin::read_stdin()? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}

fn expect_target(request: AnnuityInput, target: Target) -> Result<AnnuityInput, Box<dyn std::error::Error>> {
    if request.target != target {
        return Err(format!(
            "input requests {} but this command solves for {}",
            request.target, target
        )
        .into());
    }
    Ok(request)
}

fn solve(request: &AnnuityInput) -> Result<Value, Box<dyn std::error::Error>> {
    let result = solve_annuity(request)?;
    Ok(serde_json::to_value(result)?)
}

fn run_value(args: ValueArgs, target: Target) -> Result<Value, Box<dyn std::error::Error>> {
    let has_flags = args.payment.is_some() || args.rate.is_some() || args.periods.is_some();
    let request = match load_request(args.input.as_deref(), has_flags)? {
        Some(request) => expect_target(request, target)?,
        None => AnnuityInput {
            timing: args.timing,
            target,
            payment: Some(args.payment.ok_or("--payment is required (or provide --input)")?),
            rate: Some(args.rate.ok_or("--rate is required (or provide --input)")?),
            periods: Some(args.periods.ok_or("--periods is required (or provide --input)")?),
            present_value: None,
            future_value: None,
            known: None,
            period_rounding: PeriodRounding::default(),
        },
    };
    solve(&request)
}

pub fn run_future_value(args: ValueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    run_value(args, Target::FutureValue)
}

pub fn run_present_value(args: ValueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    run_value(args, Target::PresentValue)
}

fn known_from_flags(
    present_value: Option<Decimal>,
    future_value: Option<Decimal>,
) -> Result<KnownValue, Box<dyn std::error::Error>> {
    match (present_value, future_value) {
        (Some(_), None) => Ok(KnownValue::Present),
        (None, Some(_)) => Ok(KnownValue::Future),
        _ => Err("exactly one of --present-value or --future-value is required".into()),
    }
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let has_flags = args.rate.is_some()
        || args.periods.is_some()
        || args.present_value.is_some()
        || args.future_value.is_some();
    let request = match load_request(args.input.as_deref(), has_flags)? {
        Some(request) => expect_target(request, Target::Payment)?,
        None => AnnuityInput {
            timing: args.timing,
            target: Target::Payment,
            payment: None,
            rate: Some(args.rate.ok_or("--rate is required (or provide --input)")?),
            periods: Some(args.periods.ok_or("--periods is required (or provide --input)")?),
            present_value: args.present_value,
            future_value: args.future_value,
            known: Some(known_from_flags(args.present_value, args.future_value)?),
            period_rounding: PeriodRounding::default(),
        },
    };
    solve(&request)
}

pub fn run_periods(args: PeriodsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let has_flags = args.payment.is_some()
        || args.rate.is_some()
        || args.present_value.is_some()
        || args.future_value.is_some();
    let request = match load_request(args.input.as_deref(), has_flags)? {
        Some(request) => expect_target(request, Target::Periods)?,
        None => AnnuityInput {
            timing: args.timing,
            target: Target::Periods,
            payment: Some(args.payment.ok_or("--payment is required (or provide --input)")?),
            rate: Some(args.rate.ok_or("--rate is required (or provide --input)")?),
            periods: None,
            present_value: args.present_value,
            future_value: args.future_value,
            known: Some(known_from_flags(args.present_value, args.future_value)?),
            period_rounding: args.rounding,
        },
    };
    solve(&request)
}

pub fn run_solve(args: SolveArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = load_request(args.input.as_deref(), false)?
        .ok_or("--input <file.json> or stdin required for solve")?;
    solve(&request)
}
