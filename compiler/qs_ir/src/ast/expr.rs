use std::cell::Cell;
use std::rc::Rc;

use super::{Address, FunctionDecl};
use crate::{BinaryOp, LogicalOp, Name, UnaryOp, UpdateOp};

/// Expression node.
#[derive(Debug)]
pub struct Expr {
    pub kind: ExprKind,
    /// 1-based source line.
    pub line: u32,
}

impl Expr {
    pub fn new(kind: ExprKind, line: u32) -> Self {
        Expr { kind, line }
    }

    /// Identifier node, if this is one.
    pub fn as_ident(&self) -> Option<&Ident> {
        match &self.kind {
            ExprKind::Ident(ident) => Some(ident),
            _ => None,
        }
    }
}

/// Identifier reference.
///
/// `address` is filled in by the binding resolver when the identifier can be
/// bound to a fixed `(depth, slot)` location.
#[derive(Debug)]
pub struct Ident {
    pub name: Name,
    pub address: Cell<Option<Address>>,
}

impl Ident {
    pub fn new(name: Name) -> Self {
        Ident {
            name,
            address: Cell::new(None),
        }
    }
}

/// Key of an object-literal property.
#[derive(Debug, Clone)]
pub enum PropertyKey {
    Name(Name),
    Number(f64),
}

#[derive(Debug)]
pub enum ExprKind {
    Null,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    This,
    Ident(Ident),
    /// `None` entries are elisions (`[1,,3]`).
    Array(Vec<Option<Expr>>),
    Object(Vec<(PropertyKey, Expr)>),
    Function(Rc<FunctionDecl>),
    Member {
        object: Box<Expr>,
        property: Name,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        target: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// `op` is `None` for plain `=`.
    Assign {
        op: Option<BinaryOp>,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Sequence(Vec<Expr>),
}
