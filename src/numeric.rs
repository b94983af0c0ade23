// src/numeric.rs
//! Decimal rounding shared by the probability and rank computations.
//!
//! Every value that leaves the crate is rounded half-up at a fixed number of
//! decimal places so that outputs are reproducible digit for digit.

/// Default number of decimal places.
pub const DEFAULT_PRECISION: u32 = 5;

/// Largest precision for which `10^precision` and the scaled quotient stay exact.
pub const MAX_PRECISION: u32 = 15;

/// Divides two counts and rounds the quotient half-up at `precision` places.
///
/// Returns `None` when the denominator is zero. The rounding is done on the
/// exact integer quotient, so `ratio(1, 8, 2)` is `0.13`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ratio(numerator: u64, denominator: u64, precision: u32) -> Option<f64> {
    scaled_ratio(numerator, denominator, precision).map(|q| q as f64 / pow10(precision) as f64)
}

/// The quotient `numerator / denominator` scaled by `10^precision`, rounded half-up.
///
/// Two ratios compare equal at a precision iff their scaled quotients are equal.
#[must_use]
pub fn scaled_ratio(numerator: u64, denominator: u64, precision: u32) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let precision = precision.min(MAX_PRECISION);
    div_half_up(u128::from(numerator) * pow10(precision), u128::from(denominator))
}

/// `numerator / denominator` rounded half-up to an integer. `None` when the
/// denominator is zero.
#[must_use]
pub fn div_half_up(numerator: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    Some(if remainder >= denominator - remainder { quotient + 1 } else { quotient })
}

/// Exact decimal value of a non-negative float, as `(mantissa, 10^scale)`, read
/// from its shortest representation: `0.85` is `(85, 100)`.
///
/// `None` for negative or non-finite values and for scales past `10^38`.
#[must_use]
pub fn decimal_parts(value: f64) -> Option<(u128, u128)> {
    if !value.is_finite() || value.is_sign_negative() {
        return None;
    }
    let text = format!("{value}");
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let scale = 10u128.checked_pow(u32::try_from(frac_part.len()).ok()?)?;
    let mantissa = format!("{int_part}{frac_part}").parse().ok()?;
    Some((mantissa, scale))
}

/// `10^precision`, the number of units in 1 at that precision.
#[must_use]
pub fn unit_scale(precision: u32) -> u128 {
    pow10(precision.min(MAX_PRECISION))
}

/// Converts a count of `10^-precision` units back to a float.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn from_units(units: u64, precision: u32) -> f64 {
    units as f64 / unit_scale(precision) as f64
}

/// Rounds `value` half-up and expresses it in `10^-precision` units.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn to_units(value: f64, precision: u32) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    (round_half_up(value, precision) * unit_scale(precision) as f64).round() as u64
}

/// Rounds a float half-up (away from zero on a tie) at `precision` places.
///
/// The decision is taken on the shortest decimal representation of `value`
/// rather than its binary expansion, so `round_half_up(1.005, 2)` is `1.01`.
#[must_use]
pub fn round_half_up(value: f64, precision: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let precision = precision.min(MAX_PRECISION) as usize;
    let text = format!("{}", value.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    if frac_part.len() <= precision {
        return value;
    }

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(precision))
        .map(|b| b - b'0')
        .collect();
    let round_up = frac_part.as_bytes()[precision] >= b'5';
    if round_up {
        increment(&mut digits);
    }

    let split = digits.len() - precision;
    let mut rounded = String::with_capacity(digits.len() + 2);
    if value.is_sign_negative() {
        rounded.push('-');
    }
    rounded.extend(digits[..split].iter().map(|d| char::from(b'0' + d)));
    if precision > 0 {
        rounded.push('.');
        rounded.extend(digits[split..].iter().map(|d| char::from(b'0' + d)));
    }
    rounded.parse().unwrap_or(value)
}

/// Formats `value` rounded half-up with exactly `precision` decimal places.
#[must_use]
pub fn format_fixed(value: f64, precision: u32) -> String {
    let rounded = round_half_up(value, precision);
    if !rounded.is_finite() {
        return rounded.to_string();
    }
    let precision = precision.min(MAX_PRECISION) as usize;
    let mut text = rounded.to_string();
    let decimals = text.split_once('.').map_or(0, |(_, frac)| frac.len());
    if precision > 0 && decimals == 0 {
        text.push('.');
    }
    text.extend(std::iter::repeat('0').take(precision.saturating_sub(decimals)));
    text
}

fn increment(digits: &mut Vec<u8>) {
    for digit in digits.iter_mut().rev() {
        if *digit == 9 {
            *digit = 0;
        } else {
            *digit += 1;
            return;
        }
    }
    digits.insert(0, 1);
}

fn pow10(precision: u32) -> u128 {
    10u128.pow(precision)
}
