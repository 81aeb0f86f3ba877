//! Statement parsing.

use std::cell::Cell;
use std::rc::Rc;

use qs_ir::{
    Attribute, Block, CatchClause, ClassDecl, ForInTarget, ForInit, Stmt, StmtKind, SwitchCase,
    TryStmt, VarBinding, VarDecl,
};
use qs_lexer::TokenKind;
use qs_stack::ensure_sufficient_stack;
use tracing::trace;

use crate::{PResult, Parser};

impl Parser<'_> {
    pub(crate) fn statement(&mut self) -> PResult<Stmt> {
        ensure_sufficient_stack(|| self.statement_inner())
    }

    fn statement_inner(&mut self) -> PResult<Stmt> {
        let line = self.cursor.line();
        trace!(line, kind = %self.cursor.current_kind(), "statement");
        let kind = match self.cursor.current_kind() {
            TokenKind::Static
            | TokenKind::Public
            | TokenKind::Private
            | TokenKind::Final
            | TokenKind::Abstract => return self.attributed(),
            TokenKind::LBrace => StmtKind::Block(self.block()?),
            TokenKind::Var | TokenKind::Const => {
                let decl = self.var_decl(Vec::new())?;
                self.semicolon()?;
                StmtKind::Var(decl)
            }
            TokenKind::Function if matches!(self.cursor.peek_kind(1), TokenKind::Ident(_)) => {
                StmtKind::Function(Rc::new(self.function(Vec::new(), true)?))
            }
            TokenKind::Class => return self.class(Vec::new()),
            TokenKind::If => self.if_stmt()?,
            TokenKind::While => {
                self.cursor.advance();
                let test = self.paren_expression()?;
                let body = Box::new(self.statement()?);
                StmtKind::While { test, body }
            }
            TokenKind::Do => {
                self.cursor.advance();
                let body = Box::new(self.statement()?);
                if !self.cursor.eat(&TokenKind::While) {
                    return Err(self.expected("'while'"));
                }
                let test = self.paren_expression()?;
                self.cursor.eat(&TokenKind::Semicolon);
                StmtKind::DoWhile { body, test }
            }
            TokenKind::For => self.for_stmt()?,
            TokenKind::Break => {
                self.cursor.advance();
                let label = self.jump_label();
                self.semicolon()?;
                StmtKind::Break(label)
            }
            TokenKind::Continue => {
                self.cursor.advance();
                let label = self.jump_label();
                self.semicolon()?;
                StmtKind::Continue(label)
            }
            TokenKind::Return => {
                self.cursor.advance();
                let value = if self.at_statement_end() {
                    None
                } else {
                    Some(self.with_in(Self::expression)?)
                };
                self.semicolon()?;
                StmtKind::Return(value)
            }
            TokenKind::Throw => {
                self.cursor.advance();
                if self.cursor.current().newline_before {
                    return Err(self.expected("expression after 'throw'"));
                }
                let value = self.with_in(Self::expression)?;
                self.semicolon()?;
                StmtKind::Throw(value)
            }
            TokenKind::With => {
                self.cursor.advance();
                let object = self.paren_expression()?;
                let body = Box::new(self.statement()?);
                StmtKind::With { object, body }
            }
            TokenKind::Switch => self.switch_stmt()?,
            TokenKind::Try => self.try_stmt()?,
            TokenKind::Semicolon => {
                self.cursor.advance();
                StmtKind::Empty
            }
            TokenKind::Ident(label) if matches!(self.cursor.peek_kind(1), TokenKind::Colon) => {
                let label = *label;
                self.cursor.advance();
                self.cursor.advance();
                let body = Box::new(self.statement()?);
                StmtKind::Labeled { label, body }
            }
            _ => {
                let expr = self.with_in(Self::expression)?;
                self.semicolon()?;
                StmtKind::Expr(expr)
            }
        };
        Ok(Stmt::new(kind, line))
    }

    /// Statements up to and including the closing `}`.
    pub(crate) fn statements_until_rbrace(&mut self) -> PResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.cursor.eat(&TokenKind::RBrace) {
            if self.cursor.at_end() {
                return Err(self.expected("'}'"));
            }
            stmts.push(self.statement()?);
        }
        Ok(stmts)
    }

    fn block(&mut self) -> PResult<Block> {
        if !self.cursor.eat(&TokenKind::LBrace) {
            return Err(self.expected("'{'"));
        }
        Ok(Block::new(self.with_in(Self::statements_until_rbrace)?))
    }

    /// Explicit `;`, or an inserted one before `}`, end of input or a line
    /// break.
    fn semicolon(&mut self) -> PResult<()> {
        if self.cursor.eat(&TokenKind::Semicolon) || self.at_statement_end() {
            Ok(())
        } else {
            Err(self.expected("';'"))
        }
    }

    fn at_statement_end(&self) -> bool {
        let token = self.cursor.current();
        token.newline_before
            || matches!(
                token.kind,
                TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
            )
    }

    fn jump_label(&mut self) -> Option<qs_ir::Name> {
        if self.cursor.current().newline_before {
            return None;
        }
        match self.cursor.current_kind() {
            TokenKind::Ident(name) => {
                let name = *name;
                self.cursor.advance();
                Some(name)
            }
            _ => None,
        }
    }

    fn paren_expression(&mut self) -> PResult<qs_ir::Expr> {
        if !self.cursor.eat(&TokenKind::LParen) {
            return Err(self.expected("'('"));
        }
        let expr = self.with_in(Self::expression)?;
        if !self.cursor.eat(&TokenKind::RParen) {
            return Err(self.expected("')'"));
        }
        Ok(expr)
    }

    /// Attribute prefix followed by `var`, `const`, `function` or `class`.
    fn attributed(&mut self) -> PResult<Stmt> {
        let line = self.cursor.line();
        let mut attrs = Vec::new();
        loop {
            let attr = match self.cursor.current_kind() {
                TokenKind::Static => Attribute::Static,
                TokenKind::Public => Attribute::Public,
                TokenKind::Private => Attribute::Private,
                TokenKind::Final => Attribute::Final,
                TokenKind::Abstract => Attribute::Abstract,
                _ => break,
            };
            attrs.push(attr);
            self.cursor.advance();
        }

        let kind = match self.cursor.current_kind() {
            TokenKind::Var | TokenKind::Const => {
                let decl = self.var_decl(attrs)?;
                self.semicolon()?;
                StmtKind::Var(decl)
            }
            TokenKind::Function => StmtKind::Function(Rc::new(self.function(attrs, true)?)),
            TokenKind::Class => return self.class(attrs),
            _ => return Err(self.expected("declaration after attributes")),
        };
        Ok(Stmt::new(kind, line))
    }

    fn var_decl(&mut self, attrs: Vec<Attribute>) -> PResult<VarDecl> {
        let constant = matches!(self.cursor.advance().kind, TokenKind::Const);
        let mut bindings = Vec::new();
        loop {
            let line = self.cursor.line();
            let name = self.identifier("variable name")?;
            let type_name = self.type_annotation()?;
            let init = if self.cursor.eat(&TokenKind::Assign) {
                Some(self.assignment()?)
            } else {
                None
            };
            bindings.push(VarBinding::new(name, type_name, init, line));
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(VarDecl {
            attrs,
            constant,
            bindings,
        })
    }

    /// `class Name [extends Base] { body }` or the forward form `class Name;`.
    fn class(&mut self, attrs: Vec<Attribute>) -> PResult<Stmt> {
        let line = self.cursor.line();
        self.cursor.advance();
        let name = self.identifier("class name")?;
        let base = if self.cursor.eat(&TokenKind::Extends) {
            Some(self.identifier("base class name")?)
        } else {
            None
        };
        let body = if self.cursor.eat(&TokenKind::LBrace) {
            Some(self.with_in(Self::statements_until_rbrace)?)
        } else {
            self.semicolon()?;
            None
        };
        let decl = ClassDecl {
            name,
            attrs,
            base,
            body,
            line,
            ty: Cell::new(None),
        };
        Ok(Stmt::new(StmtKind::Class(Rc::new(decl)), line))
    }

    fn if_stmt(&mut self) -> PResult<StmtKind> {
        self.cursor.advance();
        let test = self.paren_expression()?;
        let then = Box::new(self.statement()?);
        let otherwise = if self.cursor.eat(&TokenKind::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(StmtKind::If {
            test,
            then,
            otherwise,
        })
    }

    fn for_stmt(&mut self) -> PResult<StmtKind> {
        self.cursor.advance();
        if !self.cursor.eat(&TokenKind::LParen) {
            return Err(self.expected("'('"));
        }

        let init = match self.cursor.current_kind() {
            TokenKind::Semicolon => None,
            TokenKind::Var | TokenKind::Const => {
                let mut decl = self.without_in(|p| p.var_decl(Vec::new()))?;
                let single = decl.bindings.len() == 1 && decl.bindings[0].init.is_none();
                if single && self.cursor.check(&TokenKind::In) {
                    if let Some(binding) = decl.bindings.pop() {
                        return self.for_in_rest(ForInTarget::Var(binding));
                    }
                }
                Some(ForInit::Var(decl))
            }
            _ => {
                let expr = self.without_in(Self::expression)?;
                if self.cursor.check(&TokenKind::In) {
                    return self.for_in_rest(ForInTarget::Expr(expr));
                }
                Some(ForInit::Expr(expr))
            }
        };

        if !self.cursor.eat(&TokenKind::Semicolon) {
            return Err(self.expected("';'"));
        }
        let test = if self.cursor.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.with_in(Self::expression)?)
        };
        if !self.cursor.eat(&TokenKind::Semicolon) {
            return Err(self.expected("';'"));
        }
        let update = if self.cursor.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.with_in(Self::expression)?)
        };
        if !self.cursor.eat(&TokenKind::RParen) {
            return Err(self.expected("')'"));
        }
        let body = Box::new(self.statement()?);
        Ok(StmtKind::For {
            init,
            test,
            update,
            body,
        })
    }

    /// Remainder of `for (target in object) body`, starting at `in`.
    fn for_in_rest(&mut self, target: ForInTarget) -> PResult<StmtKind> {
        self.cursor.advance();
        let object = self.with_in(Self::expression)?;
        if !self.cursor.eat(&TokenKind::RParen) {
            return Err(self.expected("')'"));
        }
        let body = Box::new(self.statement()?);
        Ok(StmtKind::ForIn {
            target,
            object,
            body,
        })
    }

    fn switch_stmt(&mut self) -> PResult<StmtKind> {
        self.cursor.advance();
        let discriminant = self.paren_expression()?;
        if !self.cursor.eat(&TokenKind::LBrace) {
            return Err(self.expected("'{'"));
        }

        let mut cases = Vec::new();
        while !self.cursor.eat(&TokenKind::RBrace) {
            let line = self.cursor.line();
            let test = match self.cursor.current_kind() {
                TokenKind::Case => {
                    self.cursor.advance();
                    Some(self.with_in(Self::expression)?)
                }
                TokenKind::Default => {
                    self.cursor.advance();
                    None
                }
                _ => return Err(self.expected("'case', 'default' or '}'")),
            };
            if !self.cursor.eat(&TokenKind::Colon) {
                return Err(self.expected("':'"));
            }
            let mut body = Vec::new();
            while !matches!(
                self.cursor.current_kind(),
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
            ) {
                body.push(self.statement()?);
            }
            cases.push(SwitchCase { test, body, line });
        }
        Ok(StmtKind::Switch {
            discriminant,
            cases,
        })
    }

    fn try_stmt(&mut self) -> PResult<StmtKind> {
        self.cursor.advance();
        let block = self.block()?;

        let catch = if self.cursor.check(&TokenKind::Catch) {
            let line = self.cursor.line();
            self.cursor.advance();
            if !self.cursor.eat(&TokenKind::LParen) {
                return Err(self.expected("'('"));
            }
            let name = self.identifier("catch variable")?;
            if !self.cursor.eat(&TokenKind::RParen) {
                return Err(self.expected("')'"));
            }
            let body = self.block()?;
            Some(CatchClause {
                name,
                body,
                line,
                slot: Cell::new(None),
            })
        } else {
            None
        };
        let finally = if self.cursor.eat(&TokenKind::Finally) {
            Some(self.block()?)
        } else {
            None
        };

        if catch.is_none() && finally.is_none() {
            return Err(self.expected("'catch' or 'finally'"));
        }
        Ok(StmtKind::Try(TryStmt {
            block,
            catch,
            finally,
        }))
    }
}
