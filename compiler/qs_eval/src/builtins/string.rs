//! `String` members.
//!
//! Positions and lengths count UTF-16 code units, the same units `length`
//! and `s[i]` use.

use std::rc::Rc;

use qs_object::convert::to_uint32;
use qs_object::{NativeContext, Thrown, Value};

use super::arg;

fn units(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

fn from_units(units: &[u16]) -> Value {
    Value::string(String::from_utf16_lossy(units))
}

/// The receiver as text. Methods called on non-strings convert them.
fn receiver(cx: &mut dyn NativeContext, this: &Value) -> Result<Rc<str>, Thrown> {
    match this {
        Value::String(text) => Ok(Rc::clone(text)),
        other => cx.to_string(other),
    }
}

/// Argument `index` as an integer; missing and NaN read as `default`.
fn integer(cx: &mut dyn NativeContext, args: &[Value], index: usize, default: f64) -> Result<f64, Thrown> {
    match args.get(index) {
        None | Some(Value::Undefined) => Ok(default),
        Some(value) => {
            let n = cx.to_number(value)?;
            Ok(if n.is_nan() { default } else { n.trunc() })
        }
    }
}

/// `n` clamped to `[0, len]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "clamped first")]
fn clamp(n: f64, len: usize) -> usize {
    n.clamp(0.0, len as f64) as usize
}

/// First match of `needle` at or after `from`.
fn find_from(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

/// Last match of `needle` starting at or before `from`.
fn rfind_from(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    let last = haystack.len().checked_sub(needle.len())?;
    (0..=from.min(last))
        .rev()
        .find(|&i| haystack[i..i + needle.len()] == *needle)
}

fn position(found: Option<usize>) -> Value {
    Value::Number(found.map_or(-1.0, |i| i as f64))
}

pub(super) fn from_char_code(cx: &mut dyn NativeContext, _this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let mut code_units = Vec::with_capacity(args.len());
    for value in args {
        let n = cx.to_number(value)?;
        code_units.push((to_uint32(n) & 0xFFFF) as u16);
    }
    Ok(from_units(&code_units))
}

pub(super) fn value_of(cx: &mut dyn NativeContext, this: &Value, _args: &[Value]) -> Result<Value, Thrown> {
    Ok(Value::String(receiver(cx, this)?))
}

pub(super) fn char_at(cx: &mut dyn NativeContext, this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let text = units(&receiver(cx, this)?);
    let pos = integer(cx, args, 0, 0.0)?;
    if pos < 0.0 {
        return Ok(Value::from(""));
    }
    let unit = text.get(clamp(pos, text.len())).copied();
    Ok(unit.map_or_else(|| Value::from(""), |u| from_units(&[u])))
}

pub(super) fn char_code_at(cx: &mut dyn NativeContext, this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let text = units(&receiver(cx, this)?);
    let pos = integer(cx, args, 0, 0.0)?;
    if pos < 0.0 {
        return Ok(Value::Number(f64::NAN));
    }
    let unit = text.get(clamp(pos, text.len())).copied();
    Ok(Value::Number(unit.map_or(f64::NAN, f64::from)))
}

/// `indexOf(search, from)`, also installed as `find`.
pub(super) fn index_of(cx: &mut dyn NativeContext, this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let text = units(&receiver(cx, this)?);
    let needle = units(&cx.to_string(&arg(args, 0))?);
    let from = clamp(integer(cx, args, 1, 0.0)?, text.len());
    Ok(position(find_from(&text, &needle, from)))
}

/// `lastIndexOf(search, from)`, also installed as `findRev`.
pub(super) fn last_index_of(cx: &mut dyn NativeContext, this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let text = units(&receiver(cx, this)?);
    let needle = units(&cx.to_string(&arg(args, 0))?);
    let from = clamp(integer(cx, args, 1, f64::INFINITY)?, text.len());
    Ok(position(rfind_from(&text, &needle, from)))
}

/// Replace the first occurrence of the pattern text.
pub(super) fn replace(cx: &mut dyn NativeContext, this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let text = receiver(cx, this)?;
    let pattern = cx.to_string(&arg(args, 0))?;
    let replacement = cx.to_string(&arg(args, 1))?;
    Ok(Value::string(text.replacen(&*pattern, &replacement, 1)))
}

/// `split(separator, limit)`. An empty separator splits into code units;
/// a missing one yields the whole string.
pub(super) fn split(cx: &mut dyn NativeContext, this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let text = receiver(cx, this)?;
    let limit = match args.get(1) {
        None | Some(Value::Undefined) => usize::MAX,
        Some(value) => {
            let n = cx.to_number(value)?;
            to_uint32(n) as usize
        }
    };
    let parts: Vec<Value> = match args.first() {
        None | Some(Value::Undefined) => vec![Value::String(text)],
        Some(separator) => {
            let separator = cx.to_string(separator)?;
            if separator.is_empty() {
                units(&text).iter().map(|u| from_units(&[*u])).collect()
            } else {
                text.split(&*separator).map(Value::from).collect()
            }
        }
    };
    let parts = parts.into_iter().take(limit).collect();
    Ok(cx.new_array(parts))
}

/// `substring(start, end)`: both clamped, swapped when reversed.
pub(super) fn substring(cx: &mut dyn NativeContext, this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let text = units(&receiver(cx, this)?);
    let len = text.len();
    let start = clamp(integer(cx, args, 0, 0.0)?, len);
    let end = clamp(integer(cx, args, 1, len as f64)?, len);
    let (start, end) = if start > end { (end, start) } else { (start, end) };
    Ok(from_units(&text[start..end]))
}

/// `mid(start, length)`: `length` defaults to the rest of the string.
pub(super) fn mid(cx: &mut dyn NativeContext, this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let text = units(&receiver(cx, this)?);
    let start = clamp(integer(cx, args, 0, 0.0)?, text.len());
    let rest = text.len() - start;
    let count = clamp(integer(cx, args, 1, rest as f64)?, rest);
    Ok(from_units(&text[start..start + count]))
}

pub(super) fn left(cx: &mut dyn NativeContext, this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let text = units(&receiver(cx, this)?);
    let count = clamp(integer(cx, args, 0, 0.0)?, text.len());
    Ok(from_units(&text[..count]))
}

pub(super) fn right(cx: &mut dyn NativeContext, this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let text = units(&receiver(cx, this)?);
    let count = clamp(integer(cx, args, 0, 0.0)?, text.len());
    Ok(from_units(&text[text.len() - count..]))
}

pub(super) fn to_lower_case(cx: &mut dyn NativeContext, this: &Value, _args: &[Value]) -> Result<Value, Thrown> {
    Ok(Value::string(receiver(cx, this)?.to_lowercase()))
}

pub(super) fn to_upper_case(cx: &mut dyn NativeContext, this: &Value, _args: &[Value]) -> Result<Value, Thrown> {
    Ok(Value::string(receiver(cx, this)?.to_uppercase()))
}

pub(super) fn is_empty(cx: &mut dyn NativeContext, this: &Value, _args: &[Value]) -> Result<Value, Thrown> {
    Ok(Value::Bool(receiver(cx, this)?.is_empty()))
}

pub(super) fn starts_with(cx: &mut dyn NativeContext, this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let text = receiver(cx, this)?;
    let prefix = cx.to_string(&arg(args, 0))?;
    Ok(Value::Bool(text.starts_with(&*prefix)))
}

pub(super) fn ends_with(cx: &mut dyn NativeContext, this: &Value, args: &[Value]) -> Result<Value, Thrown> {
    let text = receiver(cx, this)?;
    let suffix = cx.to_string(&arg(args, 0))?;
    Ok(Value::Bool(text.ends_with(&*suffix)))
}
