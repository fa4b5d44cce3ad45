use log::warn;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::annuity::{PeriodRounding, Timing};
use crate::error::AnnuityError;
use crate::types::{Money, Rate};
use crate::AnnuityResult;

/// Rates and payments smaller than this in magnitude cannot be solved for periods.
pub const EPSILON: Decimal = dec!(0.000001);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn multiply(a: Decimal, b: Decimal, context: &str) -> AnnuityResult<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| AnnuityError::ArithmeticOverflow {
            context: context.into(),
        })
}

fn divide(numerator: Decimal, denominator: Decimal, context: &str) -> AnnuityResult<Decimal> {
    if denominator.is_zero() {
        return Err(AnnuityError::DivisionByZero {
            context: context.into(),
        });
    }
    numerator
        .checked_div(denominator)
        .ok_or_else(|| AnnuityError::ArithmeticOverflow {
            context: context.into(),
        })
}

fn subtract(a: Decimal, b: Decimal, context: &str) -> AnnuityResult<Decimal> {
    a.checked_sub(b)
        .ok_or_else(|| AnnuityError::ArithmeticOverflow {
            context: context.into(),
        })
}

/// 1 + x
fn one_plus(x: Decimal, context: &str) -> AnnuityResult<Decimal> {
    Decimal::ONE
        .checked_add(x)
        .ok_or_else(|| AnnuityError::ArithmeticOverflow {
            context: context.into(),
        })
}

/// (1 + i)^n
fn growth(rate: Rate, periods: u32) -> AnnuityResult<Decimal> {
    one_plus(rate, "1 + i")?
        .checked_powu(u64::from(periods))
        .ok_or_else(|| AnnuityError::ArithmeticOverflow {
            context: format!("(1 + {rate})^{periods}"),
        })
}

/// (1 + i)^-n as a power of 1/(1 + i), so long horizons underflow to zero.
fn discount(rate: Rate, periods: u32) -> AnnuityResult<Decimal> {
    let base = divide(Decimal::ONE, one_plus(rate, "1 + i")?, "1/(1 + i)")?;
    match base.checked_powu(u64::from(periods)) {
        Some(value) => Ok(value),
        None if base < Decimal::ONE => Ok(Decimal::ZERO),
        None => Err(AnnuityError::ArithmeticOverflow {
            context: format!("(1 + {rate})^-{periods}"),
        }),
    }
}

/// Due annuities pay one period earlier, so every value grows by one extra period.
fn to_timing(ordinary: Money, rate: Rate, timing: Timing) -> AnnuityResult<Money> {
    match timing {
        Timing::Ordinary => Ok(ordinary),
        Timing::Due => multiply(ordinary, one_plus(rate, "1 + i")?, "due annuity scaling"),
    }
}

fn payment_to_timing(ordinary: Money, rate: Rate, timing: Timing) -> AnnuityResult<Money> {
    match timing {
        Timing::Ordinary => Ok(ordinary),
        Timing::Due => divide(ordinary, one_plus(rate, "1 + i")?, "due annuity payment (1 + i)"),
    }
}

/// (1+i)^n − 1, or `None` when it vanishes and the no-interest limit applies.
fn accumulated_interest(rate: Rate, periods: u32) -> AnnuityResult<Option<Decimal>> {
    if rate.is_zero() {
        return Ok(None);
    }
    let accumulated = subtract(growth(rate, periods)?, Decimal::ONE, "(1+i)^n − 1")?;
    Ok((!accumulated.is_zero()).then_some(accumulated))
}

/// 1 − (1+i)^-n, or `None` when it vanishes and the no-interest limit applies.
fn discounted_interest(rate: Rate, periods: u32) -> AnnuityResult<Option<Decimal>> {
    if rate.is_zero() {
        return Ok(None);
    }
    let discounted = subtract(Decimal::ONE, discount(rate, periods)?, "1 − (1+i)^-n")?;
    Ok((!discounted.is_zero()).then_some(discounted))
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// Future value of `periods` payments of `payment`.
///
/// Ordinary: `F = R·((1+i)^n − 1)/i`. Due: ordinary `F·(1+i)`.
/// At `i = 0`, or a rate too small to move `(1+i)^n` off one, this is the
/// undiscounted sum `R·n`.
pub fn future_value(payment: Money, rate: Rate, periods: u32, timing: Timing) -> AnnuityResult<Money> {
    let ordinary = match accumulated_interest(rate, periods)? {
        None => multiply(payment, Decimal::from(periods), "R·n")?,
        Some(accumulated) => {
            let factor = divide(accumulated, rate, "future value factor")?;
            multiply(payment, factor, "future value")?
        }
    };
    to_timing(ordinary, rate, timing)
}

/// Present value of `periods` payments of `payment`.
///
/// Ordinary: `P = R·(1 − (1+i)^−n)/i`. Due: ordinary `P·(1+i)`.
/// At `i = 0` this is the undiscounted sum `R·n`.
pub fn present_value(payment: Money, rate: Rate, periods: u32, timing: Timing) -> AnnuityResult<Money> {
    let ordinary = match discounted_interest(rate, periods)? {
        None => multiply(payment, Decimal::from(periods), "R·n")?,
        Some(discounted) => {
            let factor = divide(discounted, rate, "present value factor")?;
            multiply(payment, factor, "present value")?
        }
    };
    to_timing(ordinary, rate, timing)
}

/// Level payment that accumulates to `future_value` after `periods` periods.
///
/// Ordinary: `R = F·i/((1+i)^n − 1)`. Due: ordinary `R/(1+i)`.
pub fn payment_from_future(
    future_value: Money,
    rate: Rate,
    periods: u32,
    timing: Timing,
) -> AnnuityResult<Money> {
    let ordinary = match accumulated_interest(rate, periods)? {
        None => divide(future_value, Decimal::from(periods), "F/n")?,
        Some(accumulated) => {
            let numerator = multiply(future_value, rate, "F·i")?;
            divide(numerator, accumulated, "(1+i)^n − 1")?
        }
    };
    payment_to_timing(ordinary, rate, timing)
}

/// Level payment that amortises `present_value` over `periods` periods.
///
/// Ordinary: `R = P·i/(1 − (1+i)^−n)`. Due: ordinary `R/(1+i)`.
pub fn payment_from_present(
    present_value: Money,
    rate: Rate,
    periods: u32,
    timing: Timing,
) -> AnnuityResult<Money> {
    let ordinary = match discounted_interest(rate, periods)? {
        None => divide(present_value, Decimal::from(periods), "P/n")?,
        Some(discounted) => {
            let numerator = multiply(present_value, rate, "P·i")?;
            divide(numerator, discounted, "1 − (1+i)^-n")?
        }
    };
    payment_to_timing(ordinary, rate, timing)
}

// ---------------------------------------------------------------------------
// Periods
// ---------------------------------------------------------------------------

/// Due payments are converted to the ordinary payment `R·(1+i)` they are worth
/// at period end, then the ordinary logarithmic formulas apply.
fn equivalent_payment(payment: Money, rate: Rate, timing: Timing) -> AnnuityResult<Money> {
    to_timing(payment, rate, timing)
}

fn check_periods_inputs(payment: Money, rate: Rate) -> AnnuityResult<()> {
    if payment.abs() < EPSILON {
        warn!("cannot solve periods: payment {payment} is zero");
        return Err(AnnuityError::DivisionByZero {
            context: "periods: payment (R) is zero".into(),
        });
    }
    if rate.abs() < EPSILON {
        warn!("cannot solve periods: rate {rate} is zero");
        return Err(AnnuityError::DivisionByZero {
            context: "periods: rate (i) is zero".into(),
        });
    }
    Ok(())
}

fn checked_ln(argument: Decimal) -> AnnuityResult<Decimal> {
    if argument <= Decimal::ZERO {
        warn!("cannot solve periods: logarithm argument {argument} is not positive");
        return Err(AnnuityError::LogarithmDomainError { argument });
    }
    argument
        .checked_ln()
        .ok_or(AnnuityError::LogarithmDomainError { argument })
}

/// ln(argument) / ln(1 + i)
fn log_ratio(argument: Decimal, rate: Rate) -> AnnuityResult<Decimal> {
    let numerator = checked_ln(argument)?;
    let denominator = checked_ln(one_plus(rate, "1 + i")?)?;
    divide(numerator, denominator, "ln(1 + i)")
}

/// Unrounded period count from a future value: `ln(1 + F·i/R) / ln(1+i)`.
pub fn raw_periods_from_future(
    future_value: Money,
    payment: Money,
    rate: Rate,
    timing: Timing,
) -> AnnuityResult<Decimal> {
    let payment = equivalent_payment(payment, rate, timing)?;
    check_periods_inputs(payment, rate)?;
    let ratio = divide(multiply(future_value, rate, "F·i")?, payment, "F·i/R")?;
    log_ratio(one_plus(ratio, "1 + F·i/R")?, rate)
}

/// Unrounded period count from a present value: `−ln(1 − P·i/R) / ln(1+i)`.
pub fn raw_periods_from_present(
    present_value: Money,
    payment: Money,
    rate: Rate,
    timing: Timing,
) -> AnnuityResult<Decimal> {
    let payment = equivalent_payment(payment, rate, timing)?;
    check_periods_inputs(payment, rate)?;
    let ratio = divide(multiply(present_value, rate, "P·i")?, payment, "P·i/R")?;
    let argument = subtract(Decimal::ONE, ratio, "1 − P·i/R")?;
    Ok(-log_ratio(argument, rate)?)
}

/// Turn a raw period count into a whole number of payments.
///
/// `Up` ignores fractions below [`EPSILON`] so that a count which is whole up to
/// logarithm precision is not pushed to the next period.
pub fn round_periods(raw: Decimal, rounding: PeriodRounding) -> AnnuityResult<u32> {
    let rounded = match rounding {
        PeriodRounding::Nearest => raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        PeriodRounding::Up => (raw - EPSILON).ceil(),
    };
    if rounded <= Decimal::ZERO {
        return Err(AnnuityError::InvalidInput {
            field: "periods".into(),
            reason: format!("solved period count {raw} is not positive"),
        });
    }
    rounded.to_u32().ok_or_else(|| AnnuityError::InvalidInput {
        field: "periods".into(),
        reason: format!("solved period count {raw} exceeds u32"),
    })
}

/// Number of periods for `payment` to accumulate to `future_value`, rounded to nearest.
pub fn periods_from_future(
    future_value: Money,
    payment: Money,
    rate: Rate,
    timing: Timing,
) -> AnnuityResult<u32> {
    let raw = raw_periods_from_future(future_value, payment, rate, timing)?;
    round_periods(raw, PeriodRounding::Nearest)
}

/// Number of periods for `payment` to amortise `present_value`, rounded to nearest.
pub fn periods_from_present(
    present_value: Money,
    payment: Money,
    rate: Rate,
    timing: Timing,
) -> AnnuityResult<u32> {
    let raw = raw_periods_from_present(present_value, payment, rate, timing)?;
    round_periods(raw, PeriodRounding::Nearest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn close(a: Decimal, b: Decimal, tol: Decimal) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_future_value_ordinary() {
        let f = future_value(dec!(1000), dec!(0.05), 10, Timing::Ordinary).unwrap();
        // 1000 * (1.05^10 - 1) / 0.05 = 12577.8925...
        assert!(close(f, dec!(12577.89), dec!(0.01)), "got {f}");
    }

    #[test]
    fn test_present_value_ordinary() {
        let p = present_value(dec!(1000), dec!(0.05), 10, Timing::Ordinary).unwrap();
        assert!(close(p, dec!(7721.73), dec!(0.01)), "got {p}");
    }

    #[test]
    fn test_due_is_ordinary_times_one_plus_i() {
        let ord = future_value(dec!(250), dec!(0.02), 24, Timing::Ordinary).unwrap();
        let due = future_value(dec!(250), dec!(0.02), 24, Timing::Due).unwrap();
        assert!(close(due, ord * dec!(1.02), dec!(0.0000001)));

        let ord = present_value(dec!(250), dec!(0.02), 24, Timing::Ordinary).unwrap();
        let due = present_value(dec!(250), dec!(0.02), 24, Timing::Due).unwrap();
        assert!(close(due, ord * dec!(1.02), dec!(0.0000001)));
    }

    #[test]
    fn test_payment_from_future_example() {
        let r = payment_from_future(dec!(12577.89), dec!(0.05), 10, Timing::Ordinary).unwrap();
        assert!(close(r, dec!(1000.00), dec!(0.01)), "got {r}");
    }

    #[test]
    fn test_zero_rate_limits() {
        assert_eq!(future_value(dec!(100), Decimal::ZERO, 12, Timing::Ordinary).unwrap(), dec!(1200));
        assert_eq!(present_value(dec!(100), Decimal::ZERO, 12, Timing::Due).unwrap(), dec!(1200));
        assert_eq!(payment_from_present(dec!(1200), Decimal::ZERO, 12, Timing::Ordinary).unwrap(), dec!(100));
        assert_eq!(payment_from_future(dec!(1200), Decimal::ZERO, 12, Timing::Due).unwrap(), dec!(100));
    }

    #[test]
    fn test_zero_periods_payment_is_division_by_zero() {
        let err = payment_from_present(dec!(1000), dec!(0.05), 0, Timing::Ordinary).unwrap_err();
        assert!(matches!(err, AnnuityError::DivisionByZero { .. }));
    }

    #[test]
    fn test_huge_exponent_overflows_instead_of_panicking() {
        let err = future_value(dec!(1000), dec!(0.5), 100_000, Timing::Ordinary).unwrap_err();
        assert!(matches!(err, AnnuityError::ArithmeticOverflow { .. }));
    }

    #[test]
    fn test_long_horizon_present_value_approaches_perpetuity() {
        // (1.08)^1000 does not fit a Decimal, but its reciprocal vanishes: P -> R/i
        let p = present_value(dec!(1000), dec!(0.08), 1000, Timing::Ordinary).unwrap();
        assert!(close(p, dec!(12500), dec!(0.000001)), "got {p}");

        let r = payment_from_present(p, dec!(0.08), 1000, Timing::Ordinary).unwrap();
        assert!(close(r, dec!(1000), dec!(0.000001)), "got {r}");
    }

    #[test]
    fn test_extreme_rate_overflows_instead_of_panicking() {
        for timing in [Timing::Ordinary, Timing::Due] {
            let err = future_value(Decimal::ONE, Decimal::MAX, 1, timing).unwrap_err();
            assert!(matches!(err, AnnuityError::ArithmeticOverflow { .. }), "{timing}: {err}");
            let err = payment_from_present(Decimal::ONE, Decimal::MAX, 1, timing).unwrap_err();
            assert!(matches!(err, AnnuityError::ArithmeticOverflow { .. }), "{timing}: {err}");
        }
    }

    #[test]
    fn test_extreme_ratio_in_periods_overflows() {
        let err = periods_from_future(Decimal::MAX, Decimal::ONE, Decimal::ONE, Timing::Ordinary).unwrap_err();
        assert!(matches!(err, AnnuityError::ArithmeticOverflow { .. }), "{err}");

        let err = periods_from_present(Decimal::MIN, Decimal::ONE, Decimal::ONE, Timing::Ordinary).unwrap_err();
        assert!(matches!(err, AnnuityError::ArithmeticOverflow { .. }), "{err}");
    }

    #[test]
    fn test_smallest_rate_matches_no_interest_sum() {
        let tiny = Decimal::new(1, 28);
        let f = future_value(dec!(100), tiny, 12, Timing::Ordinary).unwrap();
        assert!(close(f, dec!(1200), dec!(0.000001)), "got {f}");
        let p = present_value(dec!(100), tiny, 12, Timing::Due).unwrap();
        assert!(close(p, dec!(1200), dec!(0.000001)), "got {p}");

        let r = payment_from_future(dec!(1200), tiny, 12, Timing::Ordinary).unwrap();
        assert!(close(r, dec!(100), dec!(0.000001)), "got {r}");
        let r = payment_from_present(dec!(1200), tiny, 12, Timing::Ordinary).unwrap();
        assert!(close(r, dec!(100), dec!(0.000001)), "got {r}");
    }

    #[test]
    fn test_periods_from_future_recovers_n() {
        let n = periods_from_future(dec!(12577.89), dec!(1000), dec!(0.05), Timing::Ordinary).unwrap();
        assert_eq!(n, 10);
    }

    #[test]
    fn test_periods_zero_payment_fails() {
        let err = periods_from_future(dec!(5000), Decimal::ZERO, dec!(0.05), Timing::Ordinary).unwrap_err();
        assert!(matches!(err, AnnuityError::DivisionByZero { .. }));
    }

    #[test]
    fn test_periods_zero_rate_fails() {
        let err = periods_from_present(dec!(5000), dec!(100), dec!(0.0000001), Timing::Due).unwrap_err();
        assert!(matches!(err, AnnuityError::DivisionByZero { .. }));
    }

    #[test]
    fn test_periods_from_present_log_domain() {
        // P·i/R = 20000 * 0.05 / 1000 = 1
        let err = periods_from_present(dec!(20000), dec!(1000), dec!(0.05), Timing::Ordinary).unwrap_err();
        assert!(matches!(err, AnnuityError::LogarithmDomainError { .. }));
    }

    #[test]
    fn test_round_periods_strategies() {
        assert_eq!(round_periods(dec!(9.5), PeriodRounding::Nearest).unwrap(), 10);
        assert_eq!(round_periods(dec!(9.49), PeriodRounding::Nearest).unwrap(), 9);
        assert_eq!(round_periods(dec!(9.2), PeriodRounding::Up).unwrap(), 10);
        assert_eq!(round_periods(dec!(10.00000000001), PeriodRounding::Up).unwrap(), 10);
        assert!(round_periods(dec!(0.3), PeriodRounding::Nearest).is_err());
        assert!(round_periods(dec!(-2), PeriodRounding::Up).is_err());
    }
}
