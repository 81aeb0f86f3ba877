//! `Array` members.

use qs_object::{ErrorKind, NativeContext, ObjectId, Thrown, Value};

use crate::errors;

/// The array a method was called on.
fn receiver(cx: &mut dyn NativeContext, this: &Value, method: &str) -> Result<ObjectId, Thrown> {
    match this {
        Value::Object(object) if cx.heap().array(*object).is_some() => Ok(*object),
        _ => Err(cx.error(
            ErrorKind::Type,
            format!("Array.prototype.{method} called on a non-array"),
        )),
    }
}

/// Append the arguments; returns the new length.
pub(super) fn push(cx: &mut dyn NativeContext, this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let array = receiver(cx, this, "push")?;
    let current = cx.heap().array(array).map_or(0, Vec::len);
    let limit = cx.max_array_length();
    if current + args.len() > limit {
        let (kind, message) = errors::array_too_long(current + args.len(), limit);
        return Err(cx.error(kind, message));
    }
    let len = match cx.heap().array_mut(array) {
        Some(items) => {
            items.extend_from_slice(args);
            items.len()
        }
        None => 0,
    };
    Ok(Value::Number(len as f64))
}

pub(super) fn pop(cx: &mut dyn NativeContext, this: &Value, _args: &[Value]) -> Result<Value, Thrown> {
    let array = receiver(cx, this, "pop")?;
    Ok(cx
        .heap()
        .array_mut(array)
        .and_then(Vec::pop)
        .unwrap_or_default())
}

/// Elements converted to strings and joined by the separator (`,` by
/// default). `undefined` and `null` elements become empty strings.
pub(super) fn join(cx: &mut dyn NativeContext, this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let array = receiver(cx, this, "join")?;
    let separator = match args.first() {
        None | Some(Value::Undefined) => ",".to_owned(),
        Some(separator) => cx.to_string(separator)?.to_string(),
    };
    join_elements(cx, array, &separator)
}

pub(super) fn to_string(cx: &mut dyn NativeContext, this: &Value, _args: &[Value]) -> Result<Value, Thrown> {
    let array = receiver(cx, this, "toString")?;
    join_elements(cx, array, ",")
}

fn join_elements(cx: &mut dyn NativeContext, array: ObjectId, separator: &str) -> Result<Value, Thrown> {
    let items = cx.heap().array(array).cloned().unwrap_or_default();
    let mut parts = Vec::with_capacity(items.len());
    for item in &items {
        parts.push(if item.is_nullish() {
            String::new()
        } else {
            cx.to_string(item)?.to_string()
        });
    }
    Ok(Value::string(parts.join(separator)))
}
