//! Declarations: attributes, variables, functions and classes.

use std::rc::Rc;

use qs_diagnostic::ErrorCode;
use qs_ir::{
    Attribute, Block, ClassDecl, ForInTarget, ForInit, FunctionDecl, Name, Stmt, StmtKind, TypeId,
    VarBinding, VarDecl,
};
use qs_object::{
    Initializer, MemberAttrs, MemberKind, NewMember, Type, TypeKind, TypeQualifiers, Value,
};
use tracing::debug;

use super::{Checker, FunctionContext};

/// Validated attribute prefix of one declaration.
#[derive(Copy, Clone, Debug, Default)]
pub(super) struct DeclAttrs {
    is_static: bool,
    is_private: bool,
    is_public: bool,
    is_abstract: bool,
    is_final: bool,
}

impl DeclAttrs {
    fn member_attrs(self) -> MemberAttrs {
        let mut attrs = MemberAttrs::empty();
        attrs.set(MemberAttrs::STATIC, self.is_static);
        attrs.set(MemberAttrs::PRIVATE, self.is_private);
        attrs.set(MemberAttrs::PUBLIC, self.is_public);
        attrs
    }

    fn qualifiers(self) -> TypeQualifiers {
        let mut qualifiers = TypeQualifiers::empty();
        qualifiers.set(TypeQualifiers::STATIC, self.is_static);
        qualifiers.set(TypeQualifiers::PRIVATE, self.is_private);
        qualifiers.set(TypeQualifiers::PUBLIC, self.is_public);
        qualifiers.set(TypeQualifiers::ABSTRACT, self.is_abstract);
        qualifiers.set(TypeQualifiers::FINAL, self.is_final);
        qualifiers
    }
}

impl Checker<'_> {
    pub(super) fn attributes(&mut self, attrs: &[Attribute], line: u32) -> DeclAttrs {
        let mut decl = DeclAttrs::default();
        for &attr in attrs {
            let flag = match attr {
                Attribute::Static => &mut decl.is_static,
                Attribute::Private => &mut decl.is_private,
                Attribute::Public => &mut decl.is_public,
                Attribute::Abstract => &mut decl.is_abstract,
                Attribute::Final => &mut decl.is_final,
            };
            if *flag {
                self.warning(
                    ErrorCode::W2001,
                    line,
                    format!("Duplicate attribute '{attr}'"),
                );
            }
            *flag = true;
        }
        if (decl.is_public && decl.is_private) || (decl.is_abstract && decl.is_final) {
            self.error(ErrorCode::E2009, line, "Conflicting attributes".to_owned());
        }
        decl
    }

    fn in_class_body(&self) -> bool {
        self.top_kind() == Some(TypeKind::Class)
    }

    pub(super) fn var_decl(&mut self, decl: &VarDecl, line: u32) {
        let attrs = self.attributes(&decl.attrs, line);
        let in_class = self.in_class_body();
        if attrs.is_static && !in_class {
            self.error(
                ErrorCode::E2006,
                line,
                "Static variables cannot be declared outside a class".to_owned(),
            );
        }

        let mut member_attrs = if decl.constant {
            MemberAttrs::CONSTANT
        } else {
            MemberAttrs::VARIABLE
        } | attrs.member_attrs();
        if !in_class {
            member_attrs.remove(MemberAttrs::STATIC);
        }

        for binding in &decl.bindings {
            if let Some(init) = &binding.init {
                self.expr(init);
            }
            if in_class {
                self.class_variable(binding, member_attrs);
            } else {
                self.scope_variable(binding, member_attrs);
            }
        }
    }

    /// Declare a variable in the innermost non-class scope and record its
    /// slot on the binding.
    pub(super) fn scope_variable(&mut self, binding: &VarBinding, attrs: MemberAttrs) {
        if self.with_depth > 0 {
            self.error(
                ErrorCode::E2013,
                binding.line,
                "Variables cannot be declared inside a 'with' block".to_owned(),
            );
            return;
        }
        let top = self.top();
        let member = self
            .types
            .add_member(top, binding.name, NewMember::Variable, attrs);
        if let Some(MemberKind::Variable { index }) = member.map(|m| m.kind) {
            binding.slot.set(Some(index));
        }
    }

    fn class_variable(&mut self, binding: &VarBinding, attrs: MemberAttrs) {
        let class = self.top();
        let redeclared = self
            .types
            .get(class)
            .and_then(|t| t.member(binding.name))
            .is_some_and(|m| m.is_variable());
        if redeclared {
            let message = format!(
                "Variable '{}' has already been declared in class '{}'",
                self.name(binding.name),
                self.types.name_of(class, self.interner),
            );
            self.error(ErrorCode::E2010, binding.line, message);
            return;
        }

        self.types
            .add_member(class, binding.name, NewMember::Variable, attrs);
        if let (Some(init), Some(ty)) = (&binding.init, self.types.get_mut(class)) {
            let initializer = Initializer {
                name: binding.name,
                expr: Rc::clone(init),
            };
            if attrs.contains(MemberAttrs::STATIC) {
                ty.static_inits.push(initializer);
            } else {
                ty.member_inits.push(initializer);
            }
        }
    }

    pub(super) fn function_decl(&mut self, decl: &Rc<FunctionDecl>) {
        let attrs = self.attributes(&decl.attrs, decl.line);
        let in_class = self.in_class_body();
        if attrs.is_static && !in_class {
            let message = format!(
                "Function '{}' cannot be declared static outside a class",
                self.name(decl.name.unwrap_or(Name::EMPTY)),
            );
            self.error(ErrorCode::E2006, decl.line, message);
        }

        let mut member_attrs = MemberAttrs::FUNCTION | attrs.member_attrs();
        if !in_class {
            member_attrs.remove(MemberAttrs::STATIC);
        }
        if let Some(name) = decl.name {
            let top = self.top();
            self.types
                .add_member(top, name, NewMember::Script(Rc::clone(decl)), member_attrs);
        }
        self.function_body(decl, attrs.is_static && in_class);
    }

    /// Create the activation Type of `decl` and check its body.
    pub(super) fn function_body(&mut self, decl: &Rc<FunctionDecl>, is_static: bool) {
        let name = decl.name.unwrap_or(Name::EMPTY);
        let mut qualifiers = TypeQualifiers::EXECUTABLE;
        qualifiers.set(TypeQualifiers::STATIC, is_static);
        let mut activation = Type::new(name, TypeKind::Function)
            .with_enclosing(Some(self.top()))
            .with_qualifiers(qualifiers);
        activation.function_decl = Some(Rc::clone(decl));
        let activation = self.types.alloc(activation);
        decl.scope.set(Some(activation));

        let context = FunctionContext { name, is_static };
        self.with_body(Some(context), activation, |this| {
            let arguments = this.interner.intern("arguments");
            for (i, param) in decl.params.iter().enumerate() {
                if param.name == arguments {
                    let message = format!(
                        "Parameter 'arguments' is a predefined value in function '{}'",
                        this.name(name),
                    );
                    this.error(ErrorCode::E2011, param.line, message);
                    continue;
                }
                if decl.params[..i].iter().any(|p| p.name == param.name) {
                    let message = format!(
                        "Parameter '{}' already declared in function '{}'",
                        this.name(param.name),
                        this.name(name),
                    );
                    this.error(ErrorCode::E2012, param.line, message);
                    continue;
                }
                this.types.add_member(
                    activation,
                    param.name,
                    NewMember::Variable,
                    MemberAttrs::VARIABLE,
                );
            }
            this.types.add_member(
                activation,
                arguments,
                NewMember::Variable,
                MemberAttrs::VARIABLE,
            );

            if this.with_depth == 0 {
                this.hoist_vars(activation, &decl.body);
            }
            for stmt in &decl.body {
                this.stmt(stmt);
            }
        });
    }

    /// Declare up front every `var` the body stores in its activation, so a
    /// read ahead of the declaration sees the local rather than an outer
    /// binding. Declaring blocks, `with` bodies and nested functions keep
    /// their own scopes and are not entered.
    fn hoist_vars(&mut self, activation: TypeId, stmts: &[Stmt]) {
        for stmt in stmts {
            self.hoist_stmt(activation, stmt);
        }
    }

    fn hoist_stmt(&mut self, activation: TypeId, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Var(decl) => self.hoist_var_decl(activation, decl),
            StmtKind::If {
                then, otherwise, ..
            } => {
                self.hoist_stmt(activation, then);
                if let Some(otherwise) = otherwise {
                    self.hoist_stmt(activation, otherwise);
                }
            }
            StmtKind::While { body, .. }
            | StmtKind::DoWhile { body, .. }
            | StmtKind::Labeled { body, .. } => self.hoist_stmt(activation, body),
            StmtKind::For { init, body, .. } => {
                if let Some(ForInit::Var(decl)) = init {
                    self.hoist_var_decl(activation, decl);
                }
                self.hoist_stmt(activation, body);
            }
            StmtKind::ForIn { target, body, .. } => {
                if let ForInTarget::Var(binding) = target {
                    self.hoist_binding(activation, binding, MemberAttrs::VARIABLE);
                }
                self.hoist_stmt(activation, body);
            }
            StmtKind::Switch { cases, .. } => {
                for case in cases {
                    self.hoist_vars(activation, &case.body);
                }
            }
            StmtKind::Block(block) => self.hoist_block(activation, block),
            StmtKind::Try(try_stmt) => {
                self.hoist_block(activation, &try_stmt.block);
                if let Some(finally) = &try_stmt.finally {
                    self.hoist_block(activation, finally);
                }
            }
            _ => {}
        }
    }

    fn hoist_var_decl(&mut self, activation: TypeId, decl: &VarDecl) {
        let attrs = if decl.constant {
            MemberAttrs::CONSTANT
        } else {
            MemberAttrs::VARIABLE
        };
        for binding in &decl.bindings {
            self.hoist_binding(activation, binding, attrs);
        }
    }

    fn hoist_block(&mut self, activation: TypeId, block: &Block) {
        if !block.stmts.iter().any(Stmt::is_declaration) {
            self.hoist_vars(activation, &block.stmts);
        }
    }

    fn hoist_binding(&mut self, activation: TypeId, binding: &VarBinding, attrs: MemberAttrs) {
        let declared = self
            .types
            .get(activation)
            .is_some_and(|ty| ty.member(binding.name).is_some());
        if !declared {
            self.types
                .add_member(activation, binding.name, NewMember::Variable, attrs);
        }
    }

    pub(super) fn class_decl(&mut self, decl: &Rc<ClassDecl>) {
        let attrs = self.attributes(&decl.attrs, decl.line);
        let line = decl.line;
        let class_name = self.name(decl.name);

        if let Some(function) = self.function {
            let message = format!(
                "Class '{class_name}' cannot be declared inside function '{}'",
                self.name(function.name),
            );
            self.error(ErrorCode::E2007, line, message);
            return;
        }
        let top = self.top();
        let in_class = self.in_class_body();
        if in_class && !attrs.is_static {
            let message = format!(
                "Nested class '{class_name}' in class '{}' must be declared static",
                self.types.name_of(top, self.interner),
            );
            self.error(ErrorCode::E2007, line, message);
        } else if !in_class && attrs.is_static {
            let message = format!("Static class '{class_name}' cannot be declared outside a class");
            self.error(ErrorCode::E2007, line, message);
        }

        let Some(body) = &decl.body else {
            self.warning(
                ErrorCode::W2002,
                line,
                "Forward declarations are not supported".to_owned(),
            );
            let declared = self.types.get(top).is_some_and(|t| t.member(decl.name).is_some());
            if !declared {
                self.types
                    .add_member(top, decl.name, NewMember::Placeholder, MemberAttrs::empty());
            }
            return;
        };

        let base = decl.base.map(|base| self.class_base(base, line));
        let class = self.types.new_class(
            decl.name,
            base,
            Some(top),
            attrs.qualifiers(),
            Some(Rc::clone(decl)),
        );
        decl.ty.set(Some(class));
        self.bind_class_value(top, decl.name, class, attrs);

        self.with_body(None, class, |this| {
            for stmt in body {
                this.stmt(stmt);
            }
        });

        self.promote_constructor(class, decl.name);

        if let Some(stub) = self.types.placeholder(decl.name) {
            if !self.types.derives_from(class, stub) {
                self.types.resolve_forward_base(stub, class);
            }
        }
        debug!(class = class_name, "class checked");
    }

    /// Store the class value as a static executable member of `scope`.
    fn bind_class_value(&mut self, scope: TypeId, name: Name, class: TypeId, attrs: DeclAttrs) {
        let member_attrs = MemberAttrs::CLASS
            | MemberAttrs::STATIC
            | (attrs.member_attrs() & (MemberAttrs::PRIVATE | MemberAttrs::PUBLIC));
        let member = self
            .types
            .add_member(scope, name, NewMember::Variable, member_attrs);
        if let (Some(MemberKind::Static { index }), Some(ty)) =
            (member.map(|m| m.kind), self.types.get_mut(scope))
        {
            ty.set_static(index, Value::Type(class));
        }
    }

    /// Base class named `name`: a visible class, or the placeholder standing
    /// in for one that is not declared yet.
    fn class_base(&mut self, name: Name, line: u32) -> TypeId {
        let Some(base) = self.find_class(name) else {
            return self.types.placeholder_for(name);
        };
        if self.types.get(base).is_some_and(Type::is_final) {
            let message = format!("Base class '{}' has been declared final", self.name(name));
            self.error(ErrorCode::E2008, line, message);
        }
        base
    }

    fn find_class(&self, name: Name) -> Option<TypeId> {
        for &scope in self.scopes.iter().rev() {
            let Some(member) = self.types.lookup(scope, name) else {
                continue;
            };
            let MemberKind::Static { index } = member.kind else {
                return None;
            };
            let owner = self.types.get(member.owner)?;
            return match owner.static_value(index) {
                Some(Value::Type(ty)) if self.types.kind(*ty).is_some_and(TypeKind::is_constructible) => {
                    Some(*ty)
                }
                _ => None,
            };
        }
        None
    }

    /// Mark the same-named script function as the class constructor.
    fn promote_constructor(&mut self, class: TypeId, name: Name) {
        let activation = match self.types.get(class).and_then(|t| t.member(name)).map(|m| &m.kind) {
            Some(MemberKind::ScriptFunction(decl)) => decl.scope.get(),
            _ => None,
        };
        if let Some(ty) = activation.and_then(|a| self.types.get_mut(a)) {
            ty.qualifiers |= TypeQualifiers::CONSTRUCTOR;
        }
    }
}
