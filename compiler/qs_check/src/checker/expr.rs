//! Expressions: identifier binding and nested function bodies.

use qs_ir::{Expr, ExprKind};
use qs_stack::ensure_sufficient_stack;

use super::Checker;

impl Checker<'_> {
    pub(super) fn expr(&mut self, expr: &Expr) {
        ensure_sufficient_stack(|| self.expr_inner(expr));
    }

    fn expr_inner(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Null
            | ExprKind::Bool(_)
            | ExprKind::Number(_)
            | ExprKind::Str(_)
            | ExprKind::This => {}
            ExprKind::Ident(ident) => self.ident(ident),
            ExprKind::Array(elements) => {
                for element in elements.iter().flatten() {
                    self.expr(element);
                }
            }
            ExprKind::Object(properties) => {
                for (_, value) in properties {
                    self.expr(value);
                }
            }
            ExprKind::Function(decl) => self.function_body(decl, false),
            ExprKind::Member { object, .. } => self.expr(object),
            ExprKind::Index { object, index } => {
                self.expr(object);
                self.expr(index);
            }
            ExprKind::Call { callee, args } | ExprKind::New { callee, args } => {
                self.expr(callee);
                for arg in args {
                    self.expr(arg);
                }
            }
            ExprKind::Unary { operand, .. } => self.expr(operand),
            ExprKind::Update { target, .. } => self.expr(target),
            ExprKind::Binary { left, right, .. }
            | ExprKind::Logical { left, right, .. }
            | ExprKind::Assign {
                target: left,
                value: right,
                ..
            } => {
                self.expr(left);
                self.expr(right);
            }
            ExprKind::Conditional {
                test,
                then,
                otherwise,
            } => {
                self.expr(test);
                self.expr(then);
                self.expr(otherwise);
            }
            ExprKind::Sequence(items) => {
                for item in items {
                    self.expr(item);
                }
            }
        }
    }
}
