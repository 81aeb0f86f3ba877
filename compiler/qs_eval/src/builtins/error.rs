//! `Error` members.

use qs_object::{NativeContext, Thrown, Value};

/// `name: message`, or just `name` when the message is empty.
pub(super) fn to_string(cx: &mut dyn NativeContext, this: &Value, _args: &[Value]) -> Result<Value, Thrown> {
    let Value::Object(object) = this else {
        return Ok(Value::from("Error"));
    };
    let (name_key, message_key) = {
        let interner = cx.interner();
        (interner.intern("name"), interner.intern("message"))
    };
    let name = cx.heap().property(*object, name_key).unwrap_or_else(|| Value::from("Error"));
    let message = cx.heap().property(*object, message_key).unwrap_or_default();
    let name = cx.to_string(&name)?;
    let message = if message.is_undefined() {
        "".into()
    } else {
        cx.to_string(&message)?
    };
    if message.is_empty() {
        Ok(Value::String(name))
    } else {
        Ok(Value::string(format!("{name}: {message}")))
    }
}
