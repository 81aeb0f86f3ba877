//! Conversions and operators.
//!
//! Primitive behavior is a plain match on the value tag; composite values
//! are first reduced to a primitive through their Type's `toString` member.

use std::rc::Rc;

use qs_ir::BinaryOp;
use qs_object::convert::{number_to_string, string_to_number, to_int32, to_uint32};
use qs_object::{FunctionBody, Thrown, TypeKind, Value};

use super::Interpreter;
use crate::errors;

impl Interpreter {
    pub(crate) fn to_string(&mut self, value: &Value) -> Result<Rc<str>, Thrown> {
        Ok(match value {
            Value::Undefined => Rc::from("undefined"),
            Value::Null => Rc::from("null"),
            Value::Bool(b) => Rc::from(if *b { "true" } else { "false" }),
            Value::Number(n) => Rc::from(number_to_string(*n)),
            Value::String(s) => Rc::clone(s),
            Value::Object(_) | Value::Function(_) | Value::Type(_) => {
                match self.to_primitive(value)? {
                    Value::String(s) => s,
                    primitive @ (Value::Undefined
                    | Value::Null
                    | Value::Bool(_)
                    | Value::Number(_)) => self.to_string(&primitive)?,
                    composite => Rc::from(self.describe(&composite)),
                }
            }
        })
    }

    pub(crate) fn to_number(&mut self, value: &Value) -> Result<f64, Thrown> {
        Ok(match value {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::Object(_) | Value::Function(_) | Value::Type(_) => {
                match self.to_primitive(value)? {
                    Value::Object(_) | Value::Function(_) | Value::Type(_) => f64::NAN,
                    primitive => self.to_number(&primitive)?,
                }
            }
        })
    }

    /// Reduce a composite to a primitive by calling its `toString` member.
    /// Values without one are described by their Type.
    pub(crate) fn to_primitive(&mut self, value: &Value) -> Result<Value, Thrown> {
        let Value::Object(object) = value else {
            return Ok(match value {
                Value::Function(_) | Value::Type(_) => Value::string(self.describe(value)),
                primitive => primitive.clone(),
            });
        };
        let to_string = self.names.to_string;
        let method = self.member_reference(value.clone(), to_string)?;
        match self.get_value(&method)? {
            Value::Function(function) => {
                let result = self.invoke(&function, Some(Value::Object(*object)), &[])?;
                match result {
                    Value::Object(_) | Value::Function(_) | Value::Type(_) => {
                        Ok(Value::string(self.describe(value)))
                    }
                    primitive => Ok(primitive),
                }
            }
            _ => Ok(Value::string(self.describe(value))),
        }
    }

    /// Text for a value that never runs script code.
    pub(crate) fn describe(&self, value: &Value) -> String {
        match value {
            Value::Object(object) => match self.heap.host(*object) {
                Some(host) => format!("[object {}]", host.class_name()),
                None => {
                    let ty = self.heap.type_of(value, &self.builtins);
                    format!("[object {}]", self.type_name(ty))
                }
            },
            Value::Function(function) => {
                let name = match &function.body {
                    FunctionBody::Native(native) => native.name().to_owned(),
                    FunctionBody::Script(_) => self.name(function.name).to_owned(),
                };
                format!("function {name}")
            }
            Value::Type(ty) => format!("[class {}]", self.type_name(*ty)),
            Value::Undefined => "undefined".to_owned(),
            Value::Null => "null".to_owned(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::String(s) => s.to_string(),
        }
    }

    /// `typeof` for a value.
    pub(crate) fn type_of_value(&self, value: &Value) -> &'static str {
        let ty = self.heap.type_of(value, &self.builtins);
        self.types.kind(ty).map_or("undefined", TypeKind::typeof_name)
    }

    pub(crate) fn binary(&mut self, op: BinaryOp, left: &Value, right: &Value) -> Result<Value, Thrown> {
        let value = match op {
            BinaryOp::Add => return self.add(left, right),
            BinaryOp::Sub => Value::Number(self.to_number(left)? - self.to_number(right)?),
            BinaryOp::Mul => Value::Number(self.to_number(left)? * self.to_number(right)?),
            BinaryOp::Div => Value::Number(self.to_number(left)? / self.to_number(right)?),
            BinaryOp::Mod => Value::Number(self.to_number(left)? % self.to_number(right)?),
            BinaryOp::Shl => {
                let (l, r) = (to_int32(self.to_number(left)?), to_uint32(self.to_number(right)?));
                Value::Number(f64::from(l.wrapping_shl(r & 31)))
            }
            BinaryOp::Shr => {
                let (l, r) = (to_int32(self.to_number(left)?), to_uint32(self.to_number(right)?));
                Value::Number(f64::from(l.wrapping_shr(r & 31)))
            }
            BinaryOp::UShr => {
                let (l, r) = (to_uint32(self.to_number(left)?), to_uint32(self.to_number(right)?));
                Value::Number(f64::from(l.wrapping_shr(r & 31)))
            }
            BinaryOp::BitAnd => self.bitwise(left, right, |a, b| a & b)?,
            BinaryOp::BitOr => self.bitwise(left, right, |a, b| a | b)?,
            BinaryOp::BitXor => self.bitwise(left, right, |a, b| a ^ b)?,
            BinaryOp::Eq => Value::Bool(self.loose_equals(left, right)?),
            BinaryOp::NotEq => Value::Bool(!self.loose_equals(left, right)?),
            BinaryOp::StrictEq => Value::Bool(strict_equals(left, right)),
            BinaryOp::StrictNotEq => Value::Bool(!strict_equals(left, right)),
            BinaryOp::Lt => Value::Bool(self.compare(left, right, Relation::Lt)?),
            BinaryOp::Gt => Value::Bool(self.compare(left, right, Relation::Gt)?),
            BinaryOp::LtEq => Value::Bool(self.compare(left, right, Relation::LtEq)?),
            BinaryOp::GtEq => Value::Bool(self.compare(left, right, Relation::GtEq)?),
            BinaryOp::InstanceOf => Value::Bool(self.instance_of(left, right, "instanceof", false)?),
            BinaryOp::Is => Value::Bool(self.instance_of(left, right, "is", true)?),
            BinaryOp::In => Value::Bool(self.has_member(left, right)?),
        };
        Ok(value)
    }

    fn add(&mut self, left: &Value, right: &Value) -> Result<Value, Thrown> {
        let left = self.to_primitive(left)?;
        let right = self.to_primitive(right)?;
        if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
            let mut text = self.to_string(&left)?.to_string();
            text.push_str(&self.to_string(&right)?);
            return Ok(Value::string(text));
        }
        Ok(Value::Number(self.to_number(&left)? + self.to_number(&right)?))
    }

    fn bitwise(
        &mut self,
        left: &Value,
        right: &Value,
        op: impl Fn(i32, i32) -> i32,
    ) -> Result<Value, Thrown> {
        let l = to_int32(self.to_number(left)?);
        let r = to_int32(self.to_number(right)?);
        Ok(Value::Number(f64::from(op(l, r))))
    }

    pub(crate) fn loose_equals(&mut self, left: &Value, right: &Value) -> Result<bool, Thrown> {
        Ok(match (left, right) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::String(b)) => *a == string_to_number(b),
            (Value::String(a), Value::Number(b)) => string_to_number(a) == *b,
            (Value::Bool(_), _) => {
                let left = Value::Number(self.to_number(left)?);
                self.loose_equals(&left, right)?
            }
            (_, Value::Bool(_)) => {
                let right = Value::Number(self.to_number(right)?);
                self.loose_equals(left, &right)?
            }
            (Value::Object(_) | Value::Function(_) | Value::Type(_), Value::Number(_) | Value::String(_)) => {
                let left = self.to_primitive(left)?;
                self.loose_equals(&left, right)?
            }
            (Value::Number(_) | Value::String(_), Value::Object(_) | Value::Function(_) | Value::Type(_)) => {
                let right = self.to_primitive(right)?;
                self.loose_equals(left, &right)?
            }
            _ => left.same_handle(right),
        })
    }

    fn compare(&mut self, left: &Value, right: &Value, relation: Relation) -> Result<bool, Thrown> {
        let left = self.to_primitive(left)?;
        let right = self.to_primitive(right)?;
        if let (Value::String(a), Value::String(b)) = (&left, &right) {
            // Code-unit order, so astral characters sort below U+E000..U+FFFF.
            return Ok(relation.holds(a.encode_utf16().cmp(b.encode_utf16())));
        }
        let a = self.to_number(&left)?;
        let b = self.to_number(&right)?;
        Ok(a.partial_cmp(&b).is_some_and(|ordering| relation.holds(ordering)))
    }

    /// `instanceof` (instances only) and `is` (any value, by governing Type).
    fn instance_of(
        &mut self,
        left: &Value,
        right: &Value,
        operator: &str,
        any_value: bool,
    ) -> Result<bool, Thrown> {
        let Value::Type(class) = right else {
            return Err(self.throw(errors::requires_type(operator)));
        };
        if !any_value && !matches!(left, Value::Object(_)) {
            return Ok(false);
        }
        let ty = self.heap.type_of(left, &self.builtins);
        Ok(self.types.derives_from(ty, *class))
    }

    /// `name in object`.
    fn has_member(&mut self, left: &Value, right: &Value) -> Result<bool, Thrown> {
        let key = self.to_string(left)?;
        match right {
            Value::Object(object) => {
                if let Some(host) = self.heap.host(*object) {
                    return Ok(host.get(&key).is_some());
                }
                if let Some(items) = self.heap.array(*object) {
                    if let Ok(index) = key.parse::<usize>() {
                        return Ok(index < items.len());
                    }
                }
                let name = self.interner.intern(&key);
                let ty = self.heap.type_of(right, &self.builtins);
                Ok(self.types.lookup(ty, name).is_some() || self.heap.has_property(*object, name))
            }
            Value::Type(ty) => {
                let name = self.interner.intern(&key);
                Ok(self.types.lookup(*ty, name).is_some())
            }
            _ => Err(self.throw(errors::in_requires_object())),
        }
    }
}

/// `===`: same tag and value; composites by identity; false on NaN.
pub(crate) fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        _ => left.same_handle(right),
    }
}

#[derive(Copy, Clone)]
enum Relation {
    Lt,
    Gt,
    LtEq,
    GtEq,
}

impl Relation {
    fn holds(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};
        match self {
            Relation::Lt => ordering == Less,
            Relation::Gt => ordering == Greater,
            Relation::LtEq => matches!(ordering, Less | Equal),
            Relation::GtEq => matches!(ordering, Greater | Equal),
        }
    }
}
