//! Expression parsing, from comma sequences down to primaries.

use std::cell::Cell;
use std::rc::Rc;

use qs_ir::{
    BinaryOp, Expr, ExprKind, FunctionDecl, Ident, LogicalOp, Name, Param, PropertyKey, UnaryOp,
    UpdateOp,
};
use qs_lexer::TokenKind;
use qs_stack::ensure_sufficient_stack;
use tracing::trace;

use crate::{PResult, Parser};

/// Binary operator table entry.
#[derive(Copy, Clone)]
enum Infix {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

impl Parser<'_> {
    /// Comma expression.
    pub(crate) fn expression(&mut self) -> PResult<Expr> {
        let first = self.assignment()?;
        if !self.cursor.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let line = first.line;
        let mut items = vec![first];
        while self.cursor.eat(&TokenKind::Comma) {
            items.push(self.assignment()?);
        }
        Ok(Expr::new(ExprKind::Sequence(items), line))
    }

    pub(crate) fn assignment(&mut self) -> PResult<Expr> {
        ensure_sufficient_stack(|| self.assignment_inner())
    }

    fn assignment_inner(&mut self) -> PResult<Expr> {
        let target = self.conditional()?;
        let Some(op) = self.assign_op() else {
            return Ok(target);
        };
        self.cursor.advance();
        let value = self.assignment()?;
        let line = target.line;
        Ok(Expr::new(
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            line,
        ))
    }

    /// `Some(None)` for plain `=`, `Some(Some(op))` for compound assignment.
    fn assign_op(&self) -> Option<Option<BinaryOp>> {
        let op = match self.cursor.current_kind() {
            TokenKind::Assign => None,
            TokenKind::PlusAssign => Some(BinaryOp::Add),
            TokenKind::MinusAssign => Some(BinaryOp::Sub),
            TokenKind::StarAssign => Some(BinaryOp::Mul),
            TokenKind::SlashAssign => Some(BinaryOp::Div),
            TokenKind::PercentAssign => Some(BinaryOp::Mod),
            TokenKind::ShlAssign => Some(BinaryOp::Shl),
            TokenKind::ShrAssign => Some(BinaryOp::Shr),
            TokenKind::UShrAssign => Some(BinaryOp::UShr),
            TokenKind::AmpAssign => Some(BinaryOp::BitAnd),
            TokenKind::PipeAssign => Some(BinaryOp::BitOr),
            TokenKind::CaretAssign => Some(BinaryOp::BitXor),
            _ => return None,
        };
        Some(op)
    }

    fn conditional(&mut self) -> PResult<Expr> {
        let test = self.binary(1)?;
        if !self.cursor.eat(&TokenKind::Question) {
            return Ok(test);
        }
        let then = self.with_in(Self::assignment)?;
        if !self.cursor.eat(&TokenKind::Colon) {
            return Err(self.expected("':'"));
        }
        let otherwise = self.assignment()?;
        let line = test.line;
        Ok(Expr::new(
            ExprKind::Conditional {
                test: Box::new(test),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
            line,
        ))
    }

    /// Precedence climbing over the binary operator table. Higher binds
    /// tighter; every level is left associative.
    fn binary(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut left = self.unary()?;
        while let Some((op, prec)) = self.infix_op() {
            if prec < min_prec {
                break;
            }
            self.cursor.advance();
            let right = self.binary(prec + 1)?;
            let line = left.line;
            let (left_box, right_box) = (Box::new(left), Box::new(right));
            let kind = match op {
                Infix::Binary(op) => ExprKind::Binary {
                    op,
                    left: left_box,
                    right: right_box,
                },
                Infix::Logical(op) => ExprKind::Logical {
                    op,
                    left: left_box,
                    right: right_box,
                },
            };
            left = Expr::new(kind, line);
        }
        Ok(left)
    }

    fn infix_op(&self) -> Option<(Infix, u8)> {
        let entry = match self.cursor.current_kind() {
            TokenKind::PipePipe => (Infix::Logical(LogicalOp::Or), 1),
            TokenKind::AmpAmp => (Infix::Logical(LogicalOp::And), 2),
            TokenKind::Pipe => (Infix::Binary(BinaryOp::BitOr), 3),
            TokenKind::Caret => (Infix::Binary(BinaryOp::BitXor), 4),
            TokenKind::Amp => (Infix::Binary(BinaryOp::BitAnd), 5),
            TokenKind::EqEq => (Infix::Binary(BinaryOp::Eq), 6),
            TokenKind::NotEq => (Infix::Binary(BinaryOp::NotEq), 6),
            TokenKind::EqEqEq => (Infix::Binary(BinaryOp::StrictEq), 6),
            TokenKind::NotEqEq => (Infix::Binary(BinaryOp::StrictNotEq), 6),
            TokenKind::Lt => (Infix::Binary(BinaryOp::Lt), 7),
            TokenKind::Gt => (Infix::Binary(BinaryOp::Gt), 7),
            TokenKind::LtEq => (Infix::Binary(BinaryOp::LtEq), 7),
            TokenKind::GtEq => (Infix::Binary(BinaryOp::GtEq), 7),
            TokenKind::InstanceOf => (Infix::Binary(BinaryOp::InstanceOf), 7),
            TokenKind::Is => (Infix::Binary(BinaryOp::Is), 7),
            TokenKind::In if self.allow_in => (Infix::Binary(BinaryOp::In), 7),
            TokenKind::Shl => (Infix::Binary(BinaryOp::Shl), 8),
            TokenKind::Shr => (Infix::Binary(BinaryOp::Shr), 8),
            TokenKind::UShr => (Infix::Binary(BinaryOp::UShr), 8),
            TokenKind::Plus => (Infix::Binary(BinaryOp::Add), 9),
            TokenKind::Minus => (Infix::Binary(BinaryOp::Sub), 9),
            TokenKind::Star => (Infix::Binary(BinaryOp::Mul), 10),
            TokenKind::Slash => (Infix::Binary(BinaryOp::Div), 10),
            TokenKind::Percent => (Infix::Binary(BinaryOp::Mod), 10),
            _ => return None,
        };
        Some(entry)
    }

    fn unary(&mut self) -> PResult<Expr> {
        ensure_sufficient_stack(|| self.unary_inner())
    }

    fn unary_inner(&mut self) -> PResult<Expr> {
        let line = self.cursor.line();
        let op = match self.cursor.current_kind() {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            TokenKind::TypeOf => UnaryOp::TypeOf,
            TokenKind::Void => UnaryOp::Void,
            TokenKind::Delete => UnaryOp::Delete,
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if self.cursor.check(&TokenKind::PlusPlus) {
                    UpdateOp::Increment
                } else {
                    UpdateOp::Decrement
                };
                self.cursor.advance();
                let target = self.unary()?;
                return Ok(Expr::new(
                    ExprKind::Update {
                        op,
                        prefix: true,
                        target: Box::new(target),
                    },
                    line,
                ));
            }
            _ => return self.postfix(),
        };
        self.cursor.advance();
        let operand = self.unary()?;
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            line,
        ))
    }

    fn postfix(&mut self) -> PResult<Expr> {
        let expr = self.call_member()?;
        if self.cursor.current().newline_before {
            return Ok(expr);
        }
        let op = match self.cursor.current_kind() {
            TokenKind::PlusPlus => UpdateOp::Increment,
            TokenKind::MinusMinus => UpdateOp::Decrement,
            _ => return Ok(expr),
        };
        self.cursor.advance();
        let line = expr.line;
        Ok(Expr::new(
            ExprKind::Update {
                op,
                prefix: false,
                target: Box::new(expr),
            },
            line,
        ))
    }

    /// Member access, indexing and calls, left to right.
    fn call_member(&mut self) -> PResult<Expr> {
        let mut expr = if self.cursor.check(&TokenKind::New) {
            self.new_expr()?
        } else {
            self.primary()?
        };
        loop {
            expr = match self.cursor.current_kind() {
                TokenKind::Dot | TokenKind::LBracket => self.accessor(expr)?,
                TokenKind::LParen => {
                    let args = self.arguments()?;
                    let line = expr.line;
                    Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        line,
                    )
                }
                _ => return Ok(expr),
            };
        }
    }

    /// `new Callee[.member...][(args)]`. Arguments are optional.
    fn new_expr(&mut self) -> PResult<Expr> {
        let line = self.cursor.line();
        self.cursor.advance();
        let mut callee = if self.cursor.check(&TokenKind::New) {
            self.new_expr()?
        } else {
            self.primary()?
        };
        while matches!(
            self.cursor.current_kind(),
            TokenKind::Dot | TokenKind::LBracket
        ) {
            callee = self.accessor(callee)?;
        }
        let args = if self.cursor.check(&TokenKind::LParen) {
            self.arguments()?
        } else {
            Vec::new()
        };
        Ok(Expr::new(
            ExprKind::New {
                callee: Box::new(callee),
                args,
            },
            line,
        ))
    }

    /// One `.name` or `[index]` step.
    fn accessor(&mut self, object: Expr) -> PResult<Expr> {
        let line = object.line;
        if self.cursor.eat(&TokenKind::Dot) {
            let property = self.property_name()?;
            return Ok(Expr::new(
                ExprKind::Member {
                    object: Box::new(object),
                    property,
                },
                line,
            ));
        }
        self.cursor.advance();
        let index = self.with_in(Self::expression)?;
        if !self.cursor.eat(&TokenKind::RBracket) {
            return Err(self.expected("']'"));
        }
        Ok(Expr::new(
            ExprKind::Index {
                object: Box::new(object),
                index: Box::new(index),
            },
            line,
        ))
    }

    /// Identifier or reserved word after `.`.
    fn property_name(&mut self) -> PResult<Name> {
        let kind = self.cursor.current_kind();
        let name = match kind {
            TokenKind::Ident(name) => *name,
            kind if kind.is_keyword() => self.interner.intern(kind.display_name()),
            _ => return Err(self.expected("property name")),
        };
        self.cursor.advance();
        Ok(name)
    }

    fn arguments(&mut self) -> PResult<Vec<Expr>> {
        self.cursor.advance();
        let mut args = Vec::new();
        if self.cursor.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.with_in(Self::assignment)?);
            if self.cursor.eat(&TokenKind::RParen) {
                return Ok(args);
            }
            if !self.cursor.eat(&TokenKind::Comma) {
                return Err(self.expected("',' or ')'"));
            }
        }
    }

    fn primary(&mut self) -> PResult<Expr> {
        let line = self.cursor.line();
        trace!(line, kind = %self.cursor.current_kind(), "primary");
        let kind = match self.cursor.current_kind() {
            TokenKind::Number(n) => ExprKind::Number(*n),
            TokenKind::Str(s) => ExprKind::Str(Rc::clone(s)),
            TokenKind::Ident(name) => ExprKind::Ident(Ident::new(*name)),
            TokenKind::This => ExprKind::This,
            TokenKind::Null => ExprKind::Null,
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.with_in(Self::expression)?;
                if !self.cursor.eat(&TokenKind::RParen) {
                    return Err(self.expected("')'"));
                }
                return Ok(inner);
            }
            TokenKind::LBracket => return self.array_literal(),
            TokenKind::LBrace => return self.object_literal(),
            TokenKind::Function => {
                let decl = self.function(Vec::new(), false)?;
                return Ok(Expr::new(ExprKind::Function(Rc::new(decl)), line));
            }
            _ => return Err(self.unexpected()),
        };
        self.cursor.advance();
        Ok(Expr::new(kind, line))
    }

    fn array_literal(&mut self) -> PResult<Expr> {
        let line = self.cursor.line();
        self.cursor.advance();
        let mut elements = Vec::new();
        loop {
            if self.cursor.eat(&TokenKind::RBracket) {
                break;
            }
            if self.cursor.eat(&TokenKind::Comma) {
                elements.push(None);
                continue;
            }
            elements.push(Some(self.with_in(Self::assignment)?));
            if self.cursor.eat(&TokenKind::Comma) {
                continue;
            }
            if !self.cursor.eat(&TokenKind::RBracket) {
                return Err(self.expected("',' or ']'"));
            }
            break;
        }
        Ok(Expr::new(ExprKind::Array(elements), line))
    }

    fn object_literal(&mut self) -> PResult<Expr> {
        let line = self.cursor.line();
        self.cursor.advance();
        let mut properties = Vec::new();
        loop {
            if self.cursor.eat(&TokenKind::RBrace) {
                break;
            }
            let key = match self.cursor.current_kind() {
                TokenKind::Ident(name) => PropertyKey::Name(*name),
                TokenKind::Str(s) => PropertyKey::Name(self.interner.intern(s)),
                TokenKind::Number(n) => PropertyKey::Number(*n),
                kind if kind.is_keyword() => {
                    PropertyKey::Name(self.interner.intern(kind.display_name()))
                }
                _ => return Err(self.expected("property name")),
            };
            self.cursor.advance();
            if !self.cursor.eat(&TokenKind::Colon) {
                return Err(self.expected("':'"));
            }
            let value = self.with_in(Self::assignment)?;
            properties.push((key, value));
            if self.cursor.eat(&TokenKind::Comma) {
                continue;
            }
            if !self.cursor.eat(&TokenKind::RBrace) {
                return Err(self.expected("',' or '}'"));
            }
            break;
        }
        Ok(Expr::new(ExprKind::Object(properties), line))
    }

    /// `function [name](params) [: Type] { body }`.
    pub(crate) fn function(
        &mut self,
        attrs: Vec<qs_ir::Attribute>,
        require_name: bool,
    ) -> PResult<FunctionDecl> {
        let line = self.cursor.line();
        self.cursor.advance();
        let name = match self.cursor.current_kind() {
            TokenKind::Ident(name) => {
                let name = *name;
                self.cursor.advance();
                Some(name)
            }
            _ if require_name => return Err(self.expected("function name")),
            _ => None,
        };

        if !self.cursor.eat(&TokenKind::LParen) {
            return Err(self.expected("'('"));
        }
        let mut params = Vec::new();
        if !self.cursor.eat(&TokenKind::RParen) {
            loop {
                let line = self.cursor.line();
                let name = self.identifier("parameter name")?;
                let type_name = self.type_annotation()?;
                params.push(Param {
                    name,
                    type_name,
                    line,
                });
                if self.cursor.eat(&TokenKind::RParen) {
                    break;
                }
                if !self.cursor.eat(&TokenKind::Comma) {
                    return Err(self.expected("',' or ')'"));
                }
            }
        }
        let return_type = self.type_annotation()?;

        if !self.cursor.eat(&TokenKind::LBrace) {
            return Err(self.expected("'{'"));
        }
        let body = self.with_in(Self::statements_until_rbrace)?;

        Ok(FunctionDecl {
            name,
            attrs,
            params,
            return_type,
            body,
            line,
            scope: Cell::new(None),
        })
    }

    pub(crate) fn identifier(&mut self, what: &str) -> PResult<Name> {
        match self.cursor.current_kind() {
            TokenKind::Ident(name) => {
                let name = *name;
                self.cursor.advance();
                Ok(name)
            }
            _ => Err(self.expected(what)),
        }
    }

    /// Optional `: Type`. `void` is accepted as a type name.
    pub(crate) fn type_annotation(&mut self) -> PResult<Option<Name>> {
        if !self.cursor.eat(&TokenKind::Colon) {
            return Ok(None);
        }
        match self.cursor.current_kind() {
            TokenKind::Void => {
                self.cursor.advance();
                Ok(Some(self.interner.intern("void")))
            }
            _ => self.identifier("type name").map(Some),
        }
    }
}
