//! Expression evaluation.

use std::rc::Rc;

use qs_ir::{Expr, ExprKind, LogicalOp, Name, PropertyKey, UnaryOp};
use qs_object::convert::{number_to_string, to_int32, truthy};
use qs_object::{ErrorKind, FunctionValue, Payload, Thrown, TypeKind, Value};
use qs_stack::ensure_sufficient_stack;

use super::{Interpreter, Reference};
use crate::errors;

impl Interpreter {
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> Result<Value, Thrown> {
        self.line = expr.line;
        ensure_sufficient_stack(|| self.eval_expr_inner(expr))
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> Result<Value, Thrown> {
        match &expr.kind {
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::Str(s) => Ok(Value::String(Rc::clone(s))),
            ExprKind::This => Ok(self.this.clone()),
            ExprKind::Ident(ident) => self.read_ident(ident),
            ExprKind::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(match element {
                        Some(element) => self.eval_expr(element)?,
                        None => Value::Undefined,
                    });
                }
                Ok(self.new_array(items))
            }
            ExprKind::Object(properties) => {
                let object = self
                    .heap
                    .alloc(&self.types, self.builtins.object, Payload::None);
                for (key, value) in properties {
                    let name = match key {
                        PropertyKey::Name(name) => *name,
                        PropertyKey::Number(n) => self.interner.intern(&number_to_string(*n)),
                    };
                    let value = self.eval_expr(value)?;
                    self.heap.set_property(object, name, value);
                }
                Ok(Value::Object(object))
            }
            ExprKind::Function(decl) => {
                let name = decl.name.unwrap_or(Name::EMPTY);
                let function = FunctionValue::script(name, Rc::clone(decl))
                    .with_closure(self.chain.clone().into());
                Ok(Value::Function(Rc::new(function)))
            }
            ExprKind::Member { .. } | ExprKind::Index { .. } => {
                let reference = self.eval_reference(expr)?;
                self.get_value(&reference)
            }
            ExprKind::Call { callee, args } => self.eval_call(callee, args),
            ExprKind::New { callee, args } => {
                let target = self.eval_expr(callee)?;
                let args = self.eval_args(args)?;
                match target {
                    Value::Type(ty) => self.construct(ty, &args),
                    other => {
                        let message = errors::not_constructible(&self.describe(&other));
                        Err(self.throw(message))
                    }
                }
            }
            ExprKind::Unary { op, operand } => self.eval_unary(*op, operand),
            ExprKind::Update { op, prefix, target } => {
                let reference = self.eval_reference(target)?;
                let old = self.get_value(&reference)?;
                let old = self.to_number(&old)?;
                let new = old + op.delta();
                self.put_value(&reference, Value::Number(new))?;
                Ok(Value::Number(if *prefix { new } else { old }))
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                self.binary(*op, &left, &right)
            }
            ExprKind::Logical { op, left, right } => {
                let left = self.eval_expr(left)?;
                match (op, truthy(&left)) {
                    (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(left),
                    _ => self.eval_expr(right),
                }
            }
            ExprKind::Conditional {
                test,
                then,
                otherwise,
            } => {
                let test = self.eval_expr(test)?;
                if truthy(&test) {
                    self.eval_expr(then)
                } else {
                    self.eval_expr(otherwise)
                }
            }
            ExprKind::Assign { op, target, value } => {
                let reference = self.eval_reference(target)?;
                let value = match op {
                    None => self.eval_expr(value)?,
                    Some(op) => {
                        let old = self.get_value(&reference)?;
                        let right = self.eval_expr(value)?;
                        self.binary(*op, &old, &right)?
                    }
                };
                self.put_value(&reference, value.clone())?;
                Ok(value)
            }
            ExprKind::Sequence(items) => {
                let mut last = Value::Undefined;
                for item in items {
                    last = self.eval_expr(item)?;
                }
                Ok(last)
            }
        }
    }

    /// Evaluate `expr` as an lvalue.
    pub(crate) fn eval_reference(&mut self, expr: &Expr) -> Result<Reference, Thrown> {
        self.line = expr.line;
        match &expr.kind {
            ExprKind::Ident(ident) => Ok(self.ident_reference(ident)),
            ExprKind::Member { object, property } => {
                let base = self.eval_expr(object)?;
                self.member_reference(base, *property)
            }
            ExprKind::Index { object, index } => {
                let base = self.eval_expr(object)?;
                let index = self.eval_expr(index)?;
                self.element_reference(base, &index)
            }
            _ => Ok(Reference::Value(self.eval_expr(expr)?)),
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, Thrown> {
        args.iter().map(|arg| self.eval_expr(arg)).collect()
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Expr]) -> Result<Value, Thrown> {
        let reference = self.eval_reference(callee)?;
        let this = match &reference {
            Reference::Member {
                frame: Some(index), ..
            } if self.is_scope_frame(*index) => None,
            Reference::Member { base, .. } => Some(base.clone()),
            Reference::Property { object, .. } => Some(Value::Object(*object)),
            Reference::Element { array, .. } => Some(Value::Object(*array)),
            _ => None,
        };
        let args = self.eval_args(args)?;
        let line = callee.line;

        if let Reference::Host { host, name } = &reference {
            if let Some(result) = host.call(self.name(*name), &args) {
                self.line = line;
                return result.map_err(|message| self.throw((ErrorKind::Type, message)));
            }
        }
        let function = self.get_value(&reference)?;
        self.line = line;
        let what = match &callee.kind {
            ExprKind::Ident(ident) => self.name(ident.name).to_owned(),
            ExprKind::Member { property, .. } => self.name(*property).to_owned(),
            _ => self.describe(&function),
        };
        // Only instances act as receivers; a frame's Type or a primitive
        // base leaves `this` to the function's own binding.
        let this = this.filter(|base| matches!(base, Value::Object(_)));
        self.call_value(&function, this, &args, &what)
    }

    /// Activation, block, eval and global frames never act as receivers of
    /// an unqualified call.
    fn is_scope_frame(&self, index: usize) -> bool {
        self.chain.get(index).is_some_and(|frame| {
            matches!(
                self.types.kind(frame.view),
                Some(TypeKind::Function | TypeKind::Block | TypeKind::Eval | TypeKind::Global)
            )
        })
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr) -> Result<Value, Thrown> {
        match op {
            UnaryOp::TypeOf => {
                let reference = self.eval_reference(operand)?;
                if matches!(reference, Reference::Unresolved(_)) {
                    return Ok(Value::from("undefined"));
                }
                let value = self.get_value(&reference)?;
                Ok(Value::from(self.type_of_value(&value)))
            }
            UnaryOp::Delete => {
                let reference = self.eval_reference(operand)?;
                Ok(Value::Bool(self.delete_reference(&reference)))
            }
            UnaryOp::Void => {
                self.eval_expr(operand)?;
                Ok(Value::Undefined)
            }
            UnaryOp::Not => {
                let value = self.eval_expr(operand)?;
                Ok(Value::Bool(!truthy(&value)))
            }
            UnaryOp::Plus => {
                let value = self.eval_expr(operand)?;
                Ok(Value::Number(self.to_number(&value)?))
            }
            UnaryOp::Neg => {
                let value = self.eval_expr(operand)?;
                Ok(Value::Number(-self.to_number(&value)?))
            }
            UnaryOp::BitNot => {
                let value = self.eval_expr(operand)?;
                let n = to_int32(self.to_number(&value)?);
                Ok(Value::Number(f64::from(!n)))
            }
        }
    }
}
