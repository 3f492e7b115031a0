//! Drift-free decimal arithmetic helpers.
//!
//! Binary floating point cannot represent most decimal fractions exactly
//! (`0.1 + 0.2 != 0.3`). Conversion coefficients and measured values are
//! decimal by nature, so multiplication goes through integer scaling.

/// Decimal digits beyond which operands are treated as non-decimal and
/// multiplied directly.
const MAX_DECIMAL_DIGITS: u32 = 12;

/// Multiply two decimal numbers without binary floating-point drift.
///
/// Both operands are scaled to integers by their decimal-digit count,
/// multiplied exactly, then scaled back.
pub fn multiply(a: f64, b: f64) -> f64 {
    let (Some(da), Some(db)) = (decimal_digits(a), decimal_digits(b)) else {
        return a * b;
    };
    if da == 0 && db == 0 {
        return a * b;
    }
    let scale_a = 10f64.powi(da as i32);
    let scale_b = 10f64.powi(db as i32);
    ((a * scale_a).round() * (b * scale_b).round()) / (scale_a * scale_b)
}

/// Round to the given precision step with round-half-up semantics,
/// via integer scaling.
pub fn round_to_precision(value: f64, precision: f64) -> f64 {
    let precision_coefficient = 1.0 / precision;
    (precision_coefficient * value).round() / precision_coefficient
}

/// Number of decimal digits in the shortest decimal rendering, or `None`
/// when the value is not a plain decimal (non-finite, exponent form, or
/// more digits than [`MAX_DECIMAL_DIGITS`]).
fn decimal_digits(value: f64) -> Option<u32> {
    if !value.is_finite() {
        return None;
    }
    let text = format!("{value}");
    if text.contains(['e', 'E']) {
        return None;
    }
    let digits = match text.split_once('.') {
        Some((_, fraction)) => fraction.len() as u32,
        None => 0,
    };
    (digits <= MAX_DECIMAL_DIGITS).then_some(digits)
}

/// Shortest decimal rendering of a number (`1.0` renders as `"1"`).
pub fn format_decimal(value: f64) -> String {
    format!("{value}")
}
