//! `Boolean` members.

use qs_object::convert::truthy;
use qs_object::{NativeContext, Thrown, Value};

pub(super) fn to_string(_cx: &mut dyn NativeContext, this: &Value, _args: &[Value]) -> Result<Value, Thrown> {
    Ok(Value::from(if truthy(this) { "true" } else { "false" }))
}

pub(super) fn value_of(_cx: &mut dyn NativeContext, this: &Value, _args: &[Value]) -> Result<Value, Thrown> {
    Ok(Value::Bool(truthy(this)))
}
