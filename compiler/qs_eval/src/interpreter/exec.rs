//! Statement execution.

use qs_ir::{
    Block, CatchClause, ForInTarget, ForInit, Name, Stmt, StmtKind, SwitchCase, TryStmt,
    VarBinding,
};
use qs_object::convert::truthy;
use qs_object::{Frame, Payload, Thrown, TypeKind, Value};
use qs_stack::ensure_sufficient_stack;

use super::ops::strict_equals;
use super::Interpreter;
use crate::completion::{Completion, LoopStep};
use crate::errors;

impl Interpreter {
    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt) -> Completion {
        self.line = stmt.line;
        ensure_sufficient_stack(|| match self.exec_stmt_inner(stmt, &[]) {
            Ok(completion) => completion,
            Err(thrown) => thrown.into(),
        })
    }

    /// Run a statement list. The result is the value of the last statement
    /// that produced one; abrupt completions stop the list.
    pub(crate) fn exec_statements(&mut self, stmts: &[Stmt]) -> Completion {
        let mut last = Value::Undefined;
        for stmt in stmts {
            match self.exec_stmt(stmt) {
                Completion::Normal(value) => {
                    if !stmt.is_declaration() && !matches!(stmt.kind, StmtKind::Empty) {
                        last = value;
                    }
                }
                abrupt => return abrupt,
            }
        }
        Completion::Normal(last)
    }

    /// `labels` are the labels directly wrapping `stmt`; only loops use them.
    fn exec_stmt_inner(&mut self, stmt: &Stmt, labels: &[Name]) -> Result<Completion, Thrown> {
        Ok(match &stmt.kind {
            StmtKind::Empty | StmtKind::Function(_) => Completion::empty(),
            StmtKind::Expr(expr) => Completion::Normal(self.eval_expr(expr)?),
            StmtKind::Var(decl) => {
                for binding in &decl.bindings {
                    if let Some(init) = &binding.init {
                        let value = self.eval_expr(init)?;
                        self.assign_binding(binding, value)?;
                    }
                }
                Completion::empty()
            }
            StmtKind::Class(decl) => self.define_class(decl),
            StmtKind::Block(block) => self.exec_block(block, None),
            StmtKind::If {
                test,
                then,
                otherwise,
            } => {
                let test = self.eval_expr(test)?;
                if truthy(&test) {
                    self.exec_stmt(then)
                } else if let Some(otherwise) = otherwise {
                    self.exec_stmt(otherwise)
                } else {
                    Completion::empty()
                }
            }
            StmtKind::While { test, body } => self.exec_while(test, body, labels)?,
            StmtKind::DoWhile { body, test } => self.exec_do_while(body, test, labels)?,
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                match init {
                    Some(ForInit::Var(decl)) => {
                        for binding in &decl.bindings {
                            if let Some(init) = &binding.init {
                                let value = self.eval_expr(init)?;
                                self.assign_binding(binding, value)?;
                            }
                        }
                    }
                    Some(ForInit::Expr(expr)) => {
                        self.eval_expr(expr)?;
                    }
                    None => {}
                }
                self.exec_for(test.as_ref(), update.as_ref(), body, labels)?
            }
            StmtKind::ForIn {
                target,
                object,
                body,
            } => self.exec_for_in(target, object, body, labels)?,
            StmtKind::Break(label) => Completion::Break(*label),
            StmtKind::Continue(label) => Completion::Continue(*label),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Undefined,
                };
                Completion::Return(value)
            }
            StmtKind::With { object, body } => {
                let object = self.eval_expr(object)?;
                let view = match &object {
                    Value::Undefined | Value::Null => {
                        return Err(self.throw(errors::with_requires_object()));
                    }
                    Value::Type(ty) => *ty,
                    other => self.heap.type_of(other, &self.builtins),
                };
                self.with_frame(Frame::new(view, object), |this| this.exec_stmt(body))
            }
            StmtKind::Switch {
                discriminant,
                cases,
            } => self.exec_switch(discriminant, cases)?,
            StmtKind::Throw(expr) => {
                let value = self.eval_expr(expr)?;
                return Err(self.wrap_thrown(value)?);
            }
            StmtKind::Try(try_stmt) => self.exec_try(try_stmt),
            StmtKind::Labeled { .. } => self.exec_labeled(stmt)?,
        })
    }

    /// Store a declared variable: straight into its slot when the resolver
    /// assigned one, by name otherwise.
    fn assign_binding(&mut self, binding: &VarBinding, value: Value) -> Result<(), Thrown> {
        let in_class = self
            .chain
            .last()
            .is_some_and(|frame| self.types.kind(frame.view) == Some(TypeKind::Class));
        if in_class {
            return Ok(());
        }
        if let (Some(slot), Some(Value::Object(object))) = (binding.slot.get(), self.top_storage()) {
            let object = *object;
            self.heap.write_slot(&self.types, object, slot, value);
            return Ok(());
        }
        let reference = self.resolve(binding.name);
        self.put_value(&reference, value)
    }

    /// Run a block, binding `catch` first when given.
    ///
    /// A block with a scope Type shares the enclosing instance's storage; in
    /// a class body, where the enclosing storage is the class, it gets an
    /// instance of its own.
    fn exec_block(&mut self, block: &Block, catch: Option<(&CatchClause, Value)>) -> Completion {
        let Some(scope) = block.scope.get() else {
            if let Some((clause, exception)) = catch {
                let global = self.global;
                self.heap.set_property(global, clause.name, exception);
            }
            return self.exec_statements(&block.stmts);
        };

        let storage = match self.chain.last() {
            Some(Frame {
                view,
                value: Value::Object(object),
            }) if self.types.kind(*view) != Some(TypeKind::Class) => Value::Object(*object),
            _ => Value::Object(self.heap.alloc(&self.types, scope, Payload::None)),
        };
        if let (Some((clause, exception)), Value::Object(object)) = (catch, &storage) {
            if let Some(slot) = clause.slot.get() {
                self.heap.write_slot(&self.types, *object, slot, exception);
            }
        }
        self.with_frame(Frame::new(scope, storage), |this| {
            this.exec_statements(&block.stmts)
        })
    }

    fn exec_while(&mut self, test: &qs_ir::Expr, body: &Stmt, labels: &[Name]) -> Result<Completion, Thrown> {
        let mut last = Value::Undefined;
        loop {
            self.check_interrupt()?;
            let value = self.eval_expr(test)?;
            if !truthy(&value) {
                break;
            }
            match LoopStep::classify(self.exec_stmt(body), labels) {
                LoopStep::Next(value) => last = value.unwrap_or(last),
                LoopStep::Exit(completion) => return Ok(completion),
            }
        }
        Ok(Completion::Normal(last))
    }

    fn exec_do_while(&mut self, body: &Stmt, test: &qs_ir::Expr, labels: &[Name]) -> Result<Completion, Thrown> {
        let mut last = Value::Undefined;
        loop {
            self.check_interrupt()?;
            match LoopStep::classify(self.exec_stmt(body), labels) {
                LoopStep::Next(value) => last = value.unwrap_or(last),
                LoopStep::Exit(completion) => return Ok(completion),
            }
            let value = self.eval_expr(test)?;
            if !truthy(&value) {
                break;
            }
        }
        Ok(Completion::Normal(last))
    }

    fn exec_for(
        &mut self,
        test: Option<&qs_ir::Expr>,
        update: Option<&qs_ir::Expr>,
        body: &Stmt,
        labels: &[Name],
    ) -> Result<Completion, Thrown> {
        let mut last = Value::Undefined;
        loop {
            self.check_interrupt()?;
            if let Some(test) = test {
                let value = self.eval_expr(test)?;
                if !truthy(&value) {
                    break;
                }
            }
            match LoopStep::classify(self.exec_stmt(body), labels) {
                LoopStep::Next(value) => last = value.unwrap_or(last),
                LoopStep::Exit(completion) => return Ok(completion),
            }
            if let Some(update) = update {
                self.eval_expr(update)?;
            }
        }
        Ok(Completion::Normal(last))
    }

    fn exec_for_in(
        &mut self,
        target: &ForInTarget,
        object: &qs_ir::Expr,
        body: &Stmt,
        labels: &[Name],
    ) -> Result<Completion, Thrown> {
        let object = self.eval_expr(object)?;
        let keys = self.enumerate(&object);
        let mut last = Value::Undefined;
        for key in keys {
            self.check_interrupt()?;
            match target {
                ForInTarget::Var(binding) => self.assign_binding(binding, key)?,
                ForInTarget::Expr(expr) => {
                    let reference = self.eval_reference(expr)?;
                    self.put_value(&reference, key)?;
                }
            }
            match LoopStep::classify(self.exec_stmt(body), labels) {
                LoopStep::Next(value) => last = value.unwrap_or(last),
                LoopStep::Exit(completion) => return Ok(completion),
            }
        }
        Ok(Completion::Normal(last))
    }

    /// Snapshot of the names `for-in` visits: array indices, host keys,
    /// enumerable instance members base-first then dynamic properties, or
    /// the enumerable statics of a Type value.
    fn enumerate(&self, value: &Value) -> Vec<Value> {
        match value {
            Value::Object(object) => {
                if let Some(items) = self.heap.array(*object) {
                    return (0..items.len()).map(|i| Value::Number(i as f64)).collect();
                }
                if let Some(host) = self.heap.host(*object) {
                    return host.keys().into_iter().map(Value::string).collect();
                }
                let Some(ty) = self.heap.type_of_object(*object) else {
                    return Vec::new();
                };
                let mut keys: Vec<Value> = self
                    .types
                    .base_chain(ty)
                    .into_iter()
                    .rev()
                    .filter_map(|class| self.types.get(class))
                    .flat_map(|class| class.members())
                    .filter(|member| member.is_enumerable() && !member.is_static())
                    .map(|member| Value::from(self.name(member.name)))
                    .collect();
                keys.extend(
                    self.heap
                        .property_names(*object)
                        .into_iter()
                        .map(|name| Value::from(self.name(name))),
                );
                keys
            }
            Value::Type(ty) => self
                .types
                .get(*ty)
                .map(|class| {
                    class
                        .members()
                        .filter(|member| member.is_enumerable() && member.is_static())
                        .map(|member| Value::from(self.name(member.name)))
                        .collect()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn exec_switch(&mut self, discriminant: &qs_ir::Expr, cases: &[SwitchCase]) -> Result<Completion, Thrown> {
        let value = self.eval_expr(discriminant)?;
        let mut start = None;
        for (index, case) in cases.iter().enumerate() {
            if let Some(test) = &case.test {
                let candidate = self.eval_expr(test)?;
                if strict_equals(&value, &candidate) {
                    start = Some(index);
                    break;
                }
            }
        }
        let Some(start) = start.or_else(|| cases.iter().position(|case| case.test.is_none())) else {
            return Ok(Completion::empty());
        };

        let mut last = Value::Undefined;
        for case in &cases[start..] {
            match self.exec_statements(&case.body) {
                Completion::Normal(value) => last = value,
                Completion::Break(None) => break,
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Completion::Normal(last))
    }

    fn exec_try(&mut self, try_stmt: &TryStmt) -> Completion {
        let mut completion = self.exec_block(&try_stmt.block, None);
        if let (Completion::Throw(exception), Some(catch)) = (&completion, &try_stmt.catch) {
            let exception = exception.clone();
            completion = self.exec_block(&catch.body, Some((catch, exception)));
        }
        if let Some(finally) = &try_stmt.finally {
            let outcome = self.exec_block(finally, None);
            if !matches!(outcome, Completion::Normal(_)) {
                completion = outcome;
            }
        }
        completion
    }

    /// Labeled statement: labels directly wrapping a loop belong to that
    /// loop; a `break` aimed at any of them ends here.
    fn exec_labeled(&mut self, stmt: &Stmt) -> Result<Completion, Thrown> {
        let mut labels = Vec::new();
        let mut inner = stmt;
        while let StmtKind::Labeled { label, body } = &inner.kind {
            labels.push(*label);
            inner = body.as_ref();
        }
        let completion = match inner.kind {
            StmtKind::While { .. }
            | StmtKind::DoWhile { .. }
            | StmtKind::For { .. }
            | StmtKind::ForIn { .. } => {
                self.line = inner.line;
                self.exec_stmt_inner(inner, &labels)?
            }
            _ => self.exec_stmt(inner),
        };
        Ok(match completion {
            Completion::Break(Some(label)) if labels.contains(&label) => Completion::empty(),
            other => other,
        })
    }

    /// `throw value`: Error instances are thrown as they are, anything else
    /// is wrapped into an Error of kind Throw keeping the original in
    /// `value`.
    pub(super) fn wrap_thrown(&mut self, value: Value) -> Result<Thrown, Thrown> {
        if let Value::Object(object) = &value {
            if self.heap.error_kind(*object).is_some() {
                return Ok(Thrown(value));
            }
        }
        let message = self.to_string(&value)?;
        let error = self.make_error(qs_object::ErrorKind::Throw, &message);
        if let Value::Object(object) = &error {
            let name = self.names.value;
            self.heap.set_property(*object, name, value);
        }
        Ok(Thrown(error))
    }
}
