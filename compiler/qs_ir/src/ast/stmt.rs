use std::cell::Cell;
use std::rc::Rc;

use super::{Attribute, Expr};
use crate::{Name, TypeId};

/// Statement node.
#[derive(Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    /// 1-based source line.
    pub line: u32,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: u32) -> Self {
        Stmt { kind, line }
    }

    /// Declarations are hoisted into member tables and do nothing when a class
    /// body is run for its side effects.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self.kind,
            StmtKind::Var(_) | StmtKind::Function(_) | StmtKind::Class(_)
        )
    }
}

#[derive(Debug)]
pub enum StmtKind {
    Empty,
    Expr(Expr),
    Var(VarDecl),
    Function(Rc<FunctionDecl>),
    Class(Rc<ClassDecl>),
    Block(Block),
    If {
        test: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        test: Expr,
    },
    For {
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    ForIn {
        target: ForInTarget,
        object: Expr,
        body: Box<Stmt>,
    },
    Break(Option<Name>),
    Continue(Option<Name>),
    Return(Option<Expr>),
    With {
        object: Expr,
        body: Box<Stmt>,
    },
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
    },
    Throw(Expr),
    Try(TryStmt),
    Labeled {
        label: Name,
        body: Box<Stmt>,
    },
}

/// `{ ... }` with its own block scope.
#[derive(Debug)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    /// Block scope type, set by the resolver.
    pub scope: Cell<Option<TypeId>>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Block {
            stmts,
            scope: Cell::new(None),
        }
    }
}

/// `var` / `const` declaration list.
#[derive(Debug)]
pub struct VarDecl {
    pub attrs: Vec<Attribute>,
    pub constant: bool,
    pub bindings: Vec<VarBinding>,
}

/// One `name [: Type] [= init]` entry of a declaration list.
#[derive(Debug)]
pub struct VarBinding {
    pub name: Name,
    pub type_name: Option<Name>,
    /// Shared so class member initializers can outlive the program.
    pub init: Option<Rc<Expr>>,
    pub line: u32,
    /// Slot in the declaring scope. Stays `None` for class members, whose
    /// initializers run at construction instead.
    pub slot: Cell<Option<u32>>,
}

impl VarBinding {
    pub fn new(name: Name, type_name: Option<Name>, init: Option<Expr>, line: u32) -> Self {
        VarBinding {
            name,
            type_name,
            init: init.map(Rc::new),
            line,
            slot: Cell::new(None),
        }
    }
}

#[derive(Debug)]
pub enum ForInit {
    Var(VarDecl),
    Expr(Expr),
}

#[derive(Debug)]
pub enum ForInTarget {
    Var(VarBinding),
    Expr(Expr),
}

/// `case test:` or `default:` (when `test` is `None`).
#[derive(Debug)]
pub struct SwitchCase {
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
    pub line: u32,
}

#[derive(Debug)]
pub struct TryStmt {
    pub block: Block,
    pub catch: Option<CatchClause>,
    pub finally: Option<Block>,
}

#[derive(Debug)]
pub struct CatchClause {
    pub name: Name,
    pub body: Block,
    pub line: u32,
    /// Slot of the catch variable in the enclosing scope.
    pub slot: Cell<Option<u32>>,
}

#[derive(Debug)]
pub struct Param {
    pub name: Name,
    pub type_name: Option<Name>,
    pub line: u32,
}

/// Function declaration or function expression.
#[derive(Debug)]
pub struct FunctionDecl {
    /// `None` for anonymous function expressions.
    pub name: Option<Name>,
    pub attrs: Vec<Attribute>,
    pub params: Vec<Param>,
    pub return_type: Option<Name>,
    pub body: Vec<Stmt>,
    pub line: u32,
    /// Activation type, set by the resolver.
    pub scope: Cell<Option<TypeId>>,
}

/// Class declaration. `body` is `None` for a forward declaration.
#[derive(Debug)]
pub struct ClassDecl {
    pub name: Name,
    pub attrs: Vec<Attribute>,
    pub base: Option<Name>,
    pub body: Option<Vec<Stmt>>,
    pub line: u32,
    /// Class type, set by the resolver.
    pub ty: Cell<Option<TypeId>>,
}
