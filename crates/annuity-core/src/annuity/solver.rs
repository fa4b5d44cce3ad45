use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::annuity::formulas;
use crate::annuity::{KnownValue, PeriodRounding, Target, Timing};
use crate::error::AnnuityError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::AnnuityResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single annuity calculation: the timing, the unknown to solve for, and
/// whichever of the other variables are known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnuityInput {
    #[serde(default)]
    pub timing: Timing,
    pub target: Target,
    /// Periodic payment (R).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Money>,
    /// Periodic interest rate as a decimal (i).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<Rate>,
    /// Number of payment periods (n).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periods: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub present_value: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub future_value: Option<Money>,
    /// Forces P or F as the known value when solving for R or n. Inferred
    /// from which of the two is supplied when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known: Option<KnownValue>,
    #[serde(default)]
    pub period_rounding: PeriodRounding,
}

/// Result of `solve_annuity`. Exactly one of `value` / `periods` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnuityOutput {
    pub timing: Timing,
    pub target: Target,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known: Option<KnownValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Money>,
    /// `value` rounded to cents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_rounded: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periods: Option<u32>,
    /// Period count before rounding to a whole number of payments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_periods: Option<Decimal>,
}

impl AnnuityOutput {
    fn value(input: &AnnuityInput, known: Option<KnownValue>, value: Money) -> Self {
        Self {
            timing: input.timing,
            target: input.target,
            known,
            value: Some(value),
            value_rounded: Some(value.round_dp(2)),
            periods: None,
            raw_periods: None,
        }
    }

    fn periods(input: &AnnuityInput, known: KnownValue, raw: Decimal, periods: u32) -> Self {
        Self {
            timing: input.timing,
            target: input.target,
            known: Some(known),
            value: None,
            value_rounded: None,
            periods: Some(periods),
            raw_periods: Some(raw),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn check_non_negative(field: &str, value: Option<Decimal>) -> AnnuityResult<()> {
    match value {
        Some(v) if v < Decimal::ZERO => Err(AnnuityError::InvalidInput {
            field: field.into(),
            reason: format!("must be >= 0, got {v}"),
        }),
        _ => Ok(()),
    }
}

fn validate_input(input: &AnnuityInput) -> AnnuityResult<()> {
    check_non_negative("payment", input.payment)?;
    check_non_negative("rate", input.rate)?;
    check_non_negative("present_value", input.present_value)?;
    check_non_negative("future_value", input.future_value)?;
    if input.periods == Some(0) {
        return Err(AnnuityError::InvalidInput {
            field: "periods".into(),
            reason: "number of periods must be > 0".into(),
        });
    }
    Ok(())
}

fn require<T>(field: &str, value: Option<T>, target: Target) -> AnnuityResult<T> {
    value.ok_or_else(|| AnnuityError::InvalidInput {
        field: field.into(),
        reason: format!("required to solve for {target}"),
    })
}

/// Which of P/F drives the calculation. Only meaningful for R and n.
fn resolve_known(input: &AnnuityInput) -> AnnuityResult<Option<KnownValue>> {
    if matches!(input.target, Target::FutureValue | Target::PresentValue) {
        return Ok(None);
    }
    if let Some(known) = input.known {
        return Ok(Some(known));
    }
    match (input.present_value, input.future_value) {
        (Some(_), None) => Ok(Some(KnownValue::Present)),
        (None, Some(_)) => Ok(Some(KnownValue::Future)),
        (Some(_), Some(_)) => Err(AnnuityError::InvalidSelection(format!(
            "supply only one of present_value or future_value to solve for {}",
            input.target
        ))),
        (None, None) => Err(AnnuityError::InvalidSelection(format!(
            "supply present_value or future_value to solve for {}",
            input.target
        ))),
    }
}

/// Supplied values the selected formula does not read.
fn unused_inputs(input: &AnnuityInput, known: Option<KnownValue>) -> Vec<String> {
    let mut unused = Vec::new();
    let target = input.target;

    if target == Target::Payment && input.payment.is_some() {
        unused.push("payment");
    }
    if target == Target::Periods && input.periods.is_some() {
        unused.push("periods");
    }
    if input.present_value.is_some() && known != Some(KnownValue::Present) {
        unused.push("present_value");
    }
    if input.future_value.is_some() && known != Some(KnownValue::Future) {
        unused.push("future_value");
    }

    unused
        .into_iter()
        .map(|field| format!("{field} is not used when solving for {target}; ignored"))
        .collect()
}

fn methodology(input: &AnnuityInput, known: Option<KnownValue>) -> String {
    let formula = match (input.target, known) {
        (Target::FutureValue, _) => "F = R·((1+i)^n − 1)/i",
        (Target::PresentValue, _) => "P = R·(1 − (1+i)^−n)/i",
        (Target::Payment, Some(KnownValue::Future)) => "R = F·i/((1+i)^n − 1)",
        (Target::Payment, _) => "R = P·i/(1 − (1+i)^−n)",
        (Target::Periods, Some(KnownValue::Future)) => "n = ln(1 + F·i/R)/ln(1+i)",
        (Target::Periods, _) => "n = −ln(1 − P·i/R)/ln(1+i)",
    };
    let adjustment = match (input.timing, input.target) {
        (Timing::Ordinary, _) => "",
        (Timing::Due, Target::FutureValue | Target::PresentValue) => ", scaled by (1+i)",
        (Timing::Due, Target::Payment) => ", divided by (1+i)",
        (Timing::Due, Target::Periods) => ", with R replaced by R·(1+i)",
    };
    format!("{} annuity {}: {}{}", input.timing, input.target, formula, adjustment)
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Validate an annuity request and solve for its target with the matching
/// closed-form formula.
pub fn solve_annuity(input: &AnnuityInput) -> AnnuityResult<ComputationOutput<AnnuityOutput>> {
    let start = Instant::now();

    validate_input(input)?;
    let known = resolve_known(input)?;
    let mut warnings = unused_inputs(input, known);

    let target = input.target;
    let timing = input.timing;
    let rate = require("rate", input.rate, target)?;

    if rate.is_zero() && target != Target::Periods {
        warnings.push(
            "Rate is zero: using the no-interest limit (payments summed without compounding)"
                .into(),
        );
    }

    debug!("solving {target} for {timing} annuity (known: {known:?})");

    let output = match (target, known) {
        (Target::FutureValue, _) => {
            let payment = require("payment", input.payment, target)?;
            let periods = require("periods", input.periods, target)?;
            let value = formulas::future_value(payment, rate, periods, timing)?;
            AnnuityOutput::value(input, None, value)
        }
        (Target::PresentValue, _) => {
            let payment = require("payment", input.payment, target)?;
            let periods = require("periods", input.periods, target)?;
            let value = formulas::present_value(payment, rate, periods, timing)?;
            AnnuityOutput::value(input, None, value)
        }
        (Target::Payment, Some(KnownValue::Future)) => {
            let future_value = require("future_value", input.future_value, target)?;
            let periods = require("periods", input.periods, target)?;
            let value = formulas::payment_from_future(future_value, rate, periods, timing)?;
            AnnuityOutput::value(input, known, value)
        }
        (Target::Payment, Some(KnownValue::Present)) => {
            let present_value = require("present_value", input.present_value, target)?;
            let periods = require("periods", input.periods, target)?;
            let value = formulas::payment_from_present(present_value, rate, periods, timing)?;
            AnnuityOutput::value(input, known, value)
        }
        (Target::Periods, Some(KnownValue::Future)) => {
            let future_value = require("future_value", input.future_value, target)?;
            let payment = require("payment", input.payment, target)?;
            let raw = formulas::raw_periods_from_future(future_value, payment, rate, timing)?;
            let periods = formulas::round_periods(raw, input.period_rounding)?;
            AnnuityOutput::periods(input, KnownValue::Future, raw, periods)
        }
        (Target::Periods, Some(KnownValue::Present)) => {
            let present_value = require("present_value", input.present_value, target)?;
            let payment = require("payment", input.payment, target)?;
            let raw = formulas::raw_periods_from_present(present_value, payment, rate, timing)?;
            let periods = formulas::round_periods(raw, input.period_rounding)?;
            AnnuityOutput::periods(input, KnownValue::Present, raw, periods)
        }
        (Target::Payment | Target::Periods, None) => {
            return Err(AnnuityError::InvalidSelection(format!(
                "solving for {target} needs a known present or future value"
            )));
        }
    };

    Ok(with_metadata(
        &methodology(input, known),
        input,
        warnings,
        start,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(target: Target) -> AnnuityInput {
        AnnuityInput {
            timing: Timing::Ordinary,
            target,
            payment: None,
            rate: Some(dec!(0.05)),
            periods: None,
            present_value: None,
            future_value: None,
            known: None,
            period_rounding: PeriodRounding::Nearest,
        }
    }

    #[test]
    fn test_future_value_request() {
        let input = AnnuityInput {
            payment: Some(dec!(1000)),
            periods: Some(10),
            ..request(Target::FutureValue)
        };
        let out = solve_annuity(&input).unwrap();
        assert_eq!(out.result.value_rounded, Some(dec!(12577.89)));
        assert!(out.result.periods.is_none());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_unused_present_value_is_a_warning() {
        let input = AnnuityInput {
            payment: Some(dec!(1000)),
            periods: Some(10),
            present_value: Some(dec!(5000)),
            ..request(Target::FutureValue)
        };
        let out = solve_annuity(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("present_value"));
    }

    #[test]
    fn test_payment_needs_exactly_one_known_value() {
        let both = AnnuityInput {
            periods: Some(10),
            present_value: Some(dec!(7721.73)),
            future_value: Some(dec!(12577.89)),
            ..request(Target::Payment)
        };
        assert!(matches!(solve_annuity(&both), Err(AnnuityError::InvalidSelection(_))));

        let neither = AnnuityInput {
            periods: Some(10),
            ..request(Target::Payment)
        };
        assert!(matches!(solve_annuity(&neither), Err(AnnuityError::InvalidSelection(_))));
    }

    #[test]
    fn test_explicit_known_overrides_inference() {
        let input = AnnuityInput {
            periods: Some(10),
            present_value: Some(dec!(7721.73)),
            future_value: Some(dec!(12577.89)),
            known: Some(KnownValue::Future),
            ..request(Target::Payment)
        };
        let out = solve_annuity(&input).unwrap();
        assert_eq!(out.result.known, Some(KnownValue::Future));
        assert_eq!(out.result.value_rounded, Some(dec!(1000.00)));
        assert!(out.warnings.iter().any(|w| w.contains("present_value")));
    }

    #[test]
    fn test_missing_required_value() {
        let input = AnnuityInput {
            payment: Some(dec!(1000)),
            ..request(Target::PresentValue)
        };
        match solve_annuity(&input) {
            Err(AnnuityError::InvalidInput { field, .. }) => assert_eq!(field, "periods"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_and_zero_inputs_rejected() {
        let negative = AnnuityInput {
            payment: Some(dec!(-1)),
            periods: Some(10),
            ..request(Target::FutureValue)
        };
        assert!(matches!(solve_annuity(&negative), Err(AnnuityError::InvalidInput { .. })));

        let zero_periods = AnnuityInput {
            payment: Some(dec!(100)),
            periods: Some(0),
            ..request(Target::FutureValue)
        };
        assert!(matches!(solve_annuity(&zero_periods), Err(AnnuityError::InvalidInput { .. })));
    }

    #[test]
    fn test_periods_request_reports_raw_count() {
        let input = AnnuityInput {
            payment: Some(dec!(1000)),
            future_value: Some(dec!(12000)),
            period_rounding: PeriodRounding::Up,
            ..request(Target::Periods)
        };
        let out = solve_annuity(&input).unwrap();
        let raw = out.result.raw_periods.unwrap();
        assert!(raw > dec!(9) && raw < dec!(10), "raw {raw}");
        assert_eq!(out.result.periods, Some(10));
    }

    #[test]
    fn test_zero_rate_value_warns() {
        let input = AnnuityInput {
            payment: Some(dec!(100)),
            periods: Some(12),
            rate: Some(Decimal::ZERO),
            ..request(Target::FutureValue)
        };
        let out = solve_annuity(&input).unwrap();
        assert_eq!(out.result.value, Some(dec!(1200)));
        assert!(out.warnings.iter().any(|w| w.contains("Rate is zero")));
    }

    #[test]
    fn test_methodology_mentions_due_adjustment() {
        let input = AnnuityInput {
            timing: Timing::Due,
            payment: Some(dec!(100)),
            periods: Some(12),
            ..request(Target::PresentValue)
        };
        let out = solve_annuity(&input).unwrap();
        assert!(out.methodology.starts_with("due annuity present value (P)"));
        assert!(out.methodology.ends_with("scaled by (1+i)"));
    }
}
