//! Syntax tree produced by the parser.
//!
//! Statements and expressions are plain owned trees. Function and class
//! declarations are shared behind `Rc` because the runtime keeps them alive
//! in member tables after the program that declared them has finished.

mod expr;
mod stmt;

pub use expr::{Expr, ExprKind, Ident, PropertyKey};
pub use stmt::{
    Block, CatchClause, ClassDecl, ForInTarget, ForInit, FunctionDecl, Param, Stmt, StmtKind,
    SwitchCase, TryStmt, VarBinding, VarDecl,
};

use std::fmt;

/// A parsed compilation unit.
#[derive(Debug)]
pub struct Program {
    pub body: Vec<Stmt>,
}

/// Statically resolved location of a variable.
///
/// `depth` counts scope frames outward from the innermost one; `slot` indexes
/// the instance found there.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Address {
    pub depth: u32,
    pub slot: u32,
}

/// Declaration qualifiers written before `var`, `function` or `class`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Attribute {
    Abstract,
    Final,
    Private,
    Public,
    Static,
}

impl Attribute {
    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::Abstract => "abstract",
            Attribute::Final => "final",
            Attribute::Private => "private",
            Attribute::Public => "public",
            Attribute::Static => "static",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests;
