//! Statements: control-flow legality, labels and block scopes.

use qs_diagnostic::ErrorCode;
use qs_ir::{Block, CatchClause, ForInTarget, ForInit, Name, Stmt, StmtKind, TryStmt};
use qs_object::{MemberAttrs, NewMember, Type, TypeKind};
use qs_stack::ensure_sufficient_stack;

use super::{Checker, Label};

impl Checker<'_> {
    pub(super) fn stmt(&mut self, stmt: &Stmt) {
        ensure_sufficient_stack(|| self.stmt_inner(stmt));
    }

    fn stmt_inner(&mut self, stmt: &Stmt) {
        self.global_statement(stmt);
        match &stmt.kind {
            StmtKind::Empty => {}
            StmtKind::Expr(expr) | StmtKind::Throw(expr) => self.expr(expr),
            StmtKind::Var(decl) => self.var_decl(decl, stmt.line),
            StmtKind::Function(decl) => self.function_decl(decl),
            StmtKind::Class(decl) => self.class_decl(decl),
            StmtKind::Block(block) => self.block(block, None),
            StmtKind::If {
                test,
                then,
                otherwise,
            } => {
                self.expr(test);
                self.stmt(then);
                if let Some(otherwise) = otherwise {
                    self.stmt(otherwise);
                }
            }
            StmtKind::While { test, body } | StmtKind::DoWhile { body, test } => {
                self.expr(test);
                self.loop_body(body);
            }
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                match init {
                    Some(ForInit::Var(decl)) => self.var_decl(decl, stmt.line),
                    Some(ForInit::Expr(expr)) => self.expr(expr),
                    None => {}
                }
                if let Some(test) = test {
                    self.expr(test);
                }
                if let Some(update) = update {
                    self.expr(update);
                }
                self.loop_body(body);
            }
            StmtKind::ForIn {
                target,
                object,
                body,
            } => {
                match target {
                    ForInTarget::Var(binding) => {
                        self.scope_variable(binding, MemberAttrs::VARIABLE);
                    }
                    ForInTarget::Expr(expr) => self.expr(expr),
                }
                self.expr(object);
                self.loop_body(body);
            }
            StmtKind::Break(label) => self.jump(*label, stmt.line, false),
            StmtKind::Continue(label) => self.jump(*label, stmt.line, true),
            StmtKind::Return(value) => {
                if self.function.is_none() && !self.options.allow_return {
                    self.error(
                        ErrorCode::E2005,
                        stmt.line,
                        "Can only return from inside a function".to_owned(),
                    );
                }
                if let Some(value) = value {
                    self.expr(value);
                }
            }
            StmtKind::With { object, body } => {
                self.expr(object);
                self.with_depth += 1;
                self.stmt(body);
                self.with_depth -= 1;
            }
            StmtKind::Switch {
                discriminant,
                cases,
            } => {
                self.expr(discriminant);
                self.switch_depth += 1;
                for case in cases {
                    if let Some(test) = &case.test {
                        self.expr(test);
                    }
                    for stmt in &case.body {
                        self.stmt(stmt);
                    }
                }
                self.switch_depth -= 1;
            }
            StmtKind::Try(try_stmt) => self.try_stmt(try_stmt),
            StmtKind::Labeled { label, body } => {
                if self.labels.iter().any(|l| l.name == *label) {
                    let message = format!("Duplicate label '{}'", self.name(*label));
                    self.error(ErrorCode::E2004, stmt.line, message);
                }
                self.labels.push(Label {
                    name: *label,
                    is_loop: labels_loop(body),
                });
                self.stmt(body);
                self.labels.pop();
            }
        }
    }

    /// Report the first non-declaration statement at global level when the
    /// policy forbids them.
    fn global_statement(&mut self, stmt: &Stmt) {
        if !self.options.forbid_global_statements || self.global_statement_reported {
            return;
        }
        let at_global = self.function.is_none() && self.top_kind() == Some(TypeKind::Global);
        if at_global && !stmt.is_declaration() && !matches!(stmt.kind, StmtKind::Empty) {
            self.global_statement_reported = true;
            self.error(
                ErrorCode::E2014,
                stmt.line,
                "Global statements detected".to_owned(),
            );
        }
    }

    fn loop_body(&mut self, body: &Stmt) {
        self.loop_depth += 1;
        self.stmt(body);
        self.loop_depth -= 1;
    }

    fn jump(&mut self, label: Option<Name>, line: u32, is_continue: bool) {
        if let Some(label) = label {
            match self.labels.iter().rev().find(|l| l.name == label) {
                None => {
                    let message = format!("Unknown label '{}'", self.name(label));
                    self.error(ErrorCode::E2003, line, message);
                }
                Some(target) if is_continue && !target.is_loop => {
                    let message = format!(
                        "'continue' label '{}' does not refer to an iteration statement",
                        self.name(label),
                    );
                    self.error(ErrorCode::E2001, line, message);
                }
                Some(_) => {}
            }
            return;
        }
        if is_continue && self.loop_depth == 0 {
            self.error(
                ErrorCode::E2001,
                line,
                "'continue' can only be used inside of iteration statements".to_owned(),
            );
        } else if !is_continue && self.loop_depth == 0 && self.switch_depth == 0 {
            self.error(
                ErrorCode::E2002,
                line,
                "'break' can only be used inside of iteration or switch statements".to_owned(),
            );
        }
    }

    fn try_stmt(&mut self, try_stmt: &TryStmt) {
        self.block(&try_stmt.block, None);
        if let Some(catch) = &try_stmt.catch {
            self.block(&catch.body, Some(catch));
        }
        if let Some(finally) = &try_stmt.finally {
            self.block(finally, None);
        }
    }

    /// Check a block, giving it a scope Type when it declares anything (or
    /// binds a catch variable).
    ///
    /// Block scopes share the enclosing scope's storage: own slots start
    /// after the enclosing scope's, and the enclosing scope reserves them.
    fn block(&mut self, block: &Block, catch: Option<&CatchClause>) {
        let declares = catch.is_some() || block.stmts.iter().any(Stmt::is_declaration);
        if !declares || self.with_depth > 0 {
            if let Some(catch) = catch {
                // Inside `with` the catch variable lives on as a dynamic
                // property of the global object.
                catch.slot.set(None);
            }
            for stmt in &block.stmts {
                self.stmt(stmt);
            }
            return;
        }

        let enclosing = self.top();
        let start = self.types.get(enclosing).map_or(0, Type::instance_slots);
        let scope = self.types.alloc(
            Type::new(Name::EMPTY, TypeKind::Block)
                .with_enclosing(Some(enclosing))
                .with_inherited_slots(start),
        );
        block.scope.set(Some(scope));

        self.with_scope(scope, |this| {
            if let Some(catch) = catch {
                let member =
                    this.types
                        .add_member(scope, catch.name, NewMember::Variable, MemberAttrs::VARIABLE);
                if let Some(qs_object::MemberKind::Variable { index }) = member.map(|m| m.kind) {
                    catch.slot.set(Some(index));
                }
            }
            for stmt in &block.stmts {
                this.stmt(stmt);
            }
        });

        let used = self.types.get(scope).map_or(start, Type::instance_slots);
        if self.types.kind(enclosing) != Some(TypeKind::Class) {
            if let Some(ty) = self.types.get_mut(enclosing) {
                ty.reserve_slots(used);
            }
        }
    }
}

/// Whether a labeled statement is a loop, looking through stacked labels.
fn labels_loop(body: &Stmt) -> bool {
    match &body.kind {
        StmtKind::While { .. }
        | StmtKind::DoWhile { .. }
        | StmtKind::For { .. }
        | StmtKind::ForIn { .. } => true,
        StmtKind::Labeled { body, .. } => labels_loop(body),
        _ => false,
    }
}
