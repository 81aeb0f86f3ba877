//! Primitive conversions.
//!
//! Conversions that may run script code (objects with `toString`) live in
//! the evaluator; everything here is pure.

use crate::Value;

/// Truthiness of a value. Composites are always true.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Undefined | Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => !(n.is_nan() || *n == 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Object(_) | Value::Function(_) | Value::Type(_) => true,
    }
}

pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if n == 0.0 {
        return "0".to_owned();
    }
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{n}");
    }
    let formatted = format!("{n:e}");
    match formatted.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => formatted,
    }
}

/// Numeric value of a string: decimal, `0x` hex or `Infinity`, with
/// surrounding whitespace ignored. Empty text is `0`, anything else `NaN`.
pub fn string_to_number(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return digits_value(hex, 16).unwrap_or(f64::NAN);
    }
    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let numeric = text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !numeric {
        return f64::NAN;
    }
    text.parse().unwrap_or(f64::NAN)
}

/// Value of a digit string in `radix`, `None` if any character is not a
/// digit of that radix or the string is empty.
fn digits_value(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0, |acc, c| {
        c.to_digit(radix)
            .map(|d| acc * f64::from(radix) + f64::from(d))
    })
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is reduced modulo 2^32 first"
)]
pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

#[allow(clippy::cast_possible_wrap, reason = "two's complement reinterpretation")]
pub fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

/// `parseInt`: leading whitespace and sign, then the longest run of digits
/// valid in the radix.
///
/// Without a radix, `0x` selects 16 and a leading `0` selects 8. An explicit
/// radix outside `2..=36` gives `NaN`.
pub fn parse_int(text: &str, radix: Option<i32>) -> f64 {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let has_hex_prefix = rest.starts_with("0x") || rest.starts_with("0X");

    let (radix, digits) = match radix {
        Some(r) if r != 0 => {
            let Ok(r) = u32::try_from(r) else {
                return f64::NAN;
            };
            if !(2..=36).contains(&r) {
                return f64::NAN;
            }
            if r == 16 && has_hex_prefix {
                (16, &rest[2..])
            } else {
                (r, rest)
            }
        }
        _ if has_hex_prefix => (16, &rest[2..]),
        _ if rest.len() > 1 && rest.starts_with('0') => (8, &rest[1..]),
        _ => (10, rest),
    };

    let end = digits
        .char_indices()
        .find(|(_, c)| c.to_digit(radix).is_none())
        .map_or(digits.len(), |(i, _)| i);
    match digits_value(&digits[..end], radix) {
        Some(value) if negative => -value,
        Some(value) => value,
        // "0" alone followed by a non-octal digit still parses as zero.
        None if radix == 8 => 0.0,
        None => f64::NAN,
    }
}

/// `parseFloat`: the longest decimal literal prefix after leading
/// whitespace.
pub fn parse_float(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let unsigned = &text[end..];
    if unsigned.starts_with("Infinity") {
        return if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };
    let int_end = digits_from(end);
    let mut mantissa_end = int_end;
    if bytes.get(int_end) == Some(&b'.') {
        mantissa_end = digits_from(int_end + 1);
    }
    let has_digits = int_end > end || mantissa_end > int_end + 1;
    if !has_digits {
        return f64::NAN;
    }
    end = mantissa_end;

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    text[..end].parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests;
