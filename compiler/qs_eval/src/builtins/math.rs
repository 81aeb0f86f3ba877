//! `Math`: an abstract class holding numeric constants and static
//! functions.

use std::f64::consts;

use qs_object::{NativeContext, Thrown, Value};

use super::arg;

pub(super) const CONSTANTS: &[(&str, f64)] = &[
    ("E", consts::E),
    ("LN2", consts::LN_2),
    ("LN10", consts::LN_10),
    ("LOG2E", consts::LOG2_E),
    ("LOG10E", consts::LOG10_E),
    ("PI", consts::PI),
    ("SQRT1_2", consts::FRAC_1_SQRT_2),
    ("SQRT2", consts::SQRT_2),
];

macro_rules! unary {
    ($($name:ident => $op:expr),* $(,)?) => {
        $(
            pub(super) fn $name(
                cx: &mut dyn NativeContext,
                _this: &Value,
                args: &[Value],
            ) -> Result<Value, Thrown> {
                let x = cx.to_number(&arg(args, 0))?;
                Ok(Value::Number($op(x)))
            }
        )*
    };
}

unary! {
    abs => f64::abs,
    acos => f64::acos,
    asin => f64::asin,
    atan => f64::atan,
    ceil => f64::ceil,
    cos => f64::cos,
    exp => f64::exp,
    floor => f64::floor,
    log => f64::ln,
    round => round_half_up,
    sin => f64::sin,
    sqrt => f64::sqrt,
    tan => f64::tan,
}

/// Halves round towards positive infinity: `round(-2.5)` is `-2`.
fn round_half_up(x: f64) -> f64 {
    if x.is_finite() {
        (x + 0.5).floor()
    } else {
        x
    }
}

pub(super) fn atan2(cx: &mut dyn NativeContext, _this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let y = cx.to_number(&arg(args, 0))?;
    let x = cx.to_number(&arg(args, 1))?;
    Ok(Value::Number(y.atan2(x)))
}

pub(super) fn pow(cx: &mut dyn NativeContext, _this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let base = cx.to_number(&arg(args, 0))?;
    let exponent = cx.to_number(&arg(args, 1))?;
    Ok(Value::Number(base.powf(exponent)))
}

pub(super) fn max(cx: &mut dyn NativeContext, _this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    fold(cx, args, f64::NEG_INFINITY, f64::max)
}

pub(super) fn min(cx: &mut dyn NativeContext, _this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    fold(cx, args, f64::INFINITY, f64::min)
}

/// Any NaN argument makes the result NaN; `f64::max` alone would skip it.
fn fold(
    cx: &mut dyn NativeContext,
    args: &[Value],
    empty: f64,
    pick: fn(f64, f64) -> f64,
) -> Result<Value, Thrown> {
    let mut result = empty;
    for value in args {
        let n = cx.to_number(value)?;
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        result = pick(result, n);
    }
    Ok(Value::Number(result))
}

/// Uniform in `[0, 1)`.
pub(super) fn random(_cx: &mut dyn NativeContext, _this: &Value, _args: &[Value]) -> Result<Value, Thrown> {
    Ok(Value::Number(fastrand::f64()))
}
