//! QScript IR - syntax tree and shared identifiers
//!
//! This crate contains the data structures shared by every phase of the
//! runtime:
//! - Names for interned identifiers
//! - `TypeId` handles into the runtime type arena
//! - AST nodes (statements, expressions, functions, classes)
//! - Resolver annotations attached to nodes after parsing
//!
//! # Annotations
//!
//! Nodes are immutable after parsing except for the `Cell`s the binding
//! resolver fills in: identifier addresses, activation/class/block types and
//! declaration slots. A program is checked once per environment; function
//! bodies are shared through `Rc` and executed many times.

pub mod ast;
mod interner;
mod name;
mod ops;
mod type_id;

pub use ast::{
    Address, Attribute, Block, CatchClause, ClassDecl, Expr, ExprKind, ForInTarget, ForInit,
    FunctionDecl, Ident, Param, Program, PropertyKey, Stmt, StmtKind, SwitchCase, TryStmt,
    VarBinding, VarDecl,
};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use ops::{BinaryOp, LogicalOp, UnaryOp, UpdateOp};
pub use type_id::TypeId;
