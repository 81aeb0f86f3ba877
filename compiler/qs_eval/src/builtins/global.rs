//! Global functions.

use qs_object::convert::{parse_float as parse_float_text, parse_int as parse_int_text, to_int32};
use qs_object::{NativeContext, Thrown, Value};

use super::arg;

/// `eval(source)`: strings run in the caller's scope, anything else is
/// returned unchanged.
pub(super) fn eval(cx: &mut dyn NativeContext, _this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    match args.first() {
        Some(Value::String(source)) => cx.eval_source(source),
        Some(other) => Ok(other.clone()),
        None => Ok(Value::Undefined),
    }
}

pub(super) fn parse_int(cx: &mut dyn NativeContext, _this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let text = cx.to_string(&arg(args, 0))?;
    let radix = match args.get(1) {
        None | Some(Value::Undefined) => None,
        Some(radix) => Some(to_int32(cx.to_number(radix)?)),
    };
    Ok(Value::Number(parse_int_text(&text, radix)))
}

pub(super) fn parse_float(cx: &mut dyn NativeContext, _this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let text = cx.to_string(&arg(args, 0))?;
    Ok(Value::Number(parse_float_text(&text)))
}

pub(super) fn is_nan(cx: &mut dyn NativeContext, _this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let n = cx.to_number(&arg(args, 0))?;
    Ok(Value::Bool(n.is_nan()))
}

pub(super) fn is_finite(cx: &mut dyn NativeContext, _this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let n = cx.to_number(&arg(args, 0))?;
    Ok(Value::Bool(n.is_finite()))
}

/// `print(...)` and `debug(...)`: arguments joined by a space, one line.
pub(super) fn print(cx: &mut dyn NativeContext, _this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let mut parts = Vec::with_capacity(args.len());
    for value in args {
        parts.push(cx.to_string(value)?.to_string());
    }
    cx.print(&parts.join(" "));
    Ok(Value::Undefined)
}
