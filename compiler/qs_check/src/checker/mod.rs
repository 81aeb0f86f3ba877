//! Resolver state, scope guards and identifier binding.

mod decl;
mod expr;
mod stmt;

use qs_diagnostic::{Diagnostic, DiagnosticList, ErrorCode};
use qs_ir::{Address, Ident, Name, Program, StringInterner, TypeId};
use qs_object::{MemberKind, Type, TypeArena, TypeKind};
use tracing::trace;

/// Policy switches for one check.
#[derive(Copy, Clone, Debug, Default)]
pub struct CheckOptions {
    /// Report non-declaration statements at global level.
    pub forbid_global_statements: bool,
    /// Accept `return` outside of a function (dynamic eval code).
    pub allow_return: bool,
    /// Leave every identifier to the by-name walk. Set when the runtime
    /// chain does not follow the Types' enclosing links, as for `eval`
    /// under a `with` frame.
    pub resolve_by_name: bool,
}

/// Function whose body is being checked.
#[derive(Copy, Clone, Debug)]
struct FunctionContext {
    name: Name,
    is_static: bool,
}

/// An enclosing statement label, and whether `continue` may target it.
#[derive(Copy, Clone)]
struct Label {
    name: Name,
    is_loop: bool,
}

/// Control-flow context saved when entering a function or class body.
struct SavedBodyContext {
    function: Option<FunctionContext>,
    loop_depth: u32,
    switch_depth: u32,
    labels: Vec<Label>,
}

/// Binding resolver for one compilation unit.
pub struct Checker<'a> {
    types: &'a mut TypeArena,
    interner: &'a StringInterner,
    options: CheckOptions,
    diagnostics: DiagnosticList,
    /// Resolver stack; the last entry receives declarations.
    scopes: Vec<TypeId>,
    function: Option<FunctionContext>,
    loop_depth: u32,
    switch_depth: u32,
    labels: Vec<Label>,
    /// Inside a `with` body; every identifier stays dynamic.
    with_depth: u32,
    global_statement_reported: bool,
}

/// Resolve `program` against the resolver stack `scopes`.
///
/// Declarations land in the last Type of `scopes`. With an empty stack a
/// scratch global Type is created.
#[tracing::instrument(level = "debug", skip_all, fields(statements = program.body.len()))]
pub fn check(
    program: &Program,
    types: &mut TypeArena,
    interner: &StringInterner,
    scopes: &[TypeId],
    options: CheckOptions,
) -> DiagnosticList {
    let mut checker = Checker::new(types, interner, scopes, options);
    checker.check_program(program);
    checker.finish()
}

impl<'a> Checker<'a> {
    pub fn new(
        types: &'a mut TypeArena,
        interner: &'a StringInterner,
        scopes: &[TypeId],
        options: CheckOptions,
    ) -> Self {
        let mut scopes = scopes.to_vec();
        if scopes.is_empty() {
            scopes.push(types.alloc(Type::new(Name::EMPTY, TypeKind::Global)));
        }
        Checker {
            types,
            interner,
            options,
            diagnostics: DiagnosticList::new(),
            scopes,
            function: None,
            loop_depth: 0,
            switch_depth: 0,
            labels: Vec::new(),
            with_depth: 0,
            global_statement_reported: false,
        }
    }

    pub fn check_program(&mut self, program: &Program) {
        for stmt in &program.body {
            self.stmt(stmt);
        }
    }

    pub fn finish(self) -> DiagnosticList {
        self.diagnostics
    }

    /// Innermost scope; the stack is never empty.
    fn top(&self) -> TypeId {
        self.scopes[self.scopes.len() - 1]
    }

    fn top_kind(&self) -> Option<TypeKind> {
        self.types.kind(self.top())
    }

    fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    fn error(&mut self, code: ErrorCode, line: u32, message: String) {
        self.diagnostics
            .push(Diagnostic::error(code).with_message(message).at_line(line));
    }

    fn warning(&mut self, code: ErrorCode, line: u32, message: String) {
        self.diagnostics
            .push(Diagnostic::warning(code).with_message(message).at_line(line));
    }

    fn with_scope<T>(&mut self, scope: TypeId, f: impl FnOnce(&mut Self) -> T) -> T {
        self.scopes.push(scope);
        let result = f(self);
        self.scopes.pop();
        result
    }

    /// Enter a function or class body: loops, switches and labels of the
    /// outer code are not visible inside.
    fn with_body<T>(
        &mut self,
        function: Option<FunctionContext>,
        scope: TypeId,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = SavedBodyContext {
            function: std::mem::replace(&mut self.function, function),
            loop_depth: std::mem::take(&mut self.loop_depth),
            switch_depth: std::mem::take(&mut self.switch_depth),
            labels: std::mem::take(&mut self.labels),
        };

        let result = self.with_scope(scope, f);

        self.function = saved.function;
        self.loop_depth = saved.loop_depth;
        self.switch_depth = saved.switch_depth;
        self.labels = saved.labels;
        result
    }

    /// Bind `ident` to a fixed address when the name resolves, along the
    /// enclosing chain, to a writable instance variable whose container has
    /// no unresolved base.
    fn ident(&mut self, ident: &Ident) {
        if self.with_depth > 0 || self.options.resolve_by_name {
            return;
        }
        let in_static_function = self.function.is_some_and(|f| f.is_static);
        let mut depth = 0;
        let mut current = Some(self.top());
        while let Some(ty) = current {
            if let Some(member) = self.types.lookup(ty, ident.name) {
                if let MemberKind::Variable { index } = member.kind {
                    let container_is_class = self.types.kind(ty) == Some(TypeKind::Class);
                    let direct = member.is_writable()
                        && self.types.placeholder_base(ty).is_none()
                        && !(in_static_function && container_is_class);
                    if direct {
                        trace!(name = self.name(ident.name), depth, slot = index, "direct");
                        ident.address.set(Some(Address { depth, slot: index }));
                    }
                }
                return;
            }
            current = self.types.get(ty).and_then(|t| t.enclosing);
            depth += 1;
        }
    }
}
