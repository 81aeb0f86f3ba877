//! `Number` constants and members.

use qs_object::convert::number_to_string;
use qs_object::{NativeContext, Thrown, Value};

pub(super) const CONSTANTS: &[(&str, f64)] = &[
    ("NaN", f64::NAN),
    ("NEGATIVE_INFINITY", f64::NEG_INFINITY),
    ("POSITIVE_INFINITY", f64::INFINITY),
    ("MAX_VALUE", f64::MAX),
    ("MIN_VALUE", f64::MIN_POSITIVE),
];

pub(super) fn to_string(cx: &mut dyn NativeContext, this: &Value, _args: &[Value]) -> Result<Value, Thrown> {
    let n = cx.to_number(this)?;
    Ok(Value::string(number_to_string(n)))
}

pub(super) fn value_of(cx: &mut dyn NativeContext, this: &Value, _args: &[Value]) -> Result<Value, Thrown> {
    Ok(Value::Number(cx.to_number(this)?))
}
