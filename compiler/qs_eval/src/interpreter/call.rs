//! Function invocation, construction and class definition.

use std::rc::Rc;

use qs_ir::{ClassDecl, FunctionDecl, Stmt, StmtKind, TypeId};
use qs_object::convert::truthy;
use qs_object::{
    Frame, FunctionBody, FunctionValue, Initializer, MemberKind, ObjectId, Payload, Thrown,
    TypeKind, TypeQualifiers, Value,
};
use qs_stack::ensure_sufficient_stack;
use tracing::debug;

use super::Interpreter;
use crate::completion::Completion;
use crate::errors;

impl Interpreter {
    /// Call `function`. `this` is the explicit receiver of a member call.
    ///
    /// The function's bound receiver wins over `this`, and the global object
    /// stands in when there is neither.
    pub(crate) fn invoke(
        &mut self,
        function: &Rc<FunctionValue>,
        this: Option<Value>,
        args: &[Value],
    ) -> Result<Value, Thrown> {
        self.check_interrupt()?;
        if let Err(exceeded) = self.depth.enter() {
            return Err(self.throw(errors::call_depth_exceeded(exceeded.limit)));
        }
        let result = ensure_sufficient_stack(|| {
            let receiver = function
                .receiver
                .clone()
                .or(this)
                .unwrap_or(Value::Object(self.global));
            match &function.body {
                FunctionBody::Native(native) => native.call(self, &receiver, args),
                FunctionBody::Script(decl) => self.call_script(function, decl, receiver, args),
            }
        });
        self.depth.leave();
        result
    }

    fn call_script(
        &mut self,
        function: &FunctionValue,
        decl: &Rc<FunctionDecl>,
        receiver: Value,
        args: &[Value],
    ) -> Result<Value, Thrown> {
        let Some(activation) = decl.scope.get() else {
            let message = errors::unchecked_function(self.name(function.name));
            return Err(self.throw(message));
        };
        let mut chain = match &function.closure {
            Some(captured) => captured.to_vec(),
            None => {
                let enclosing = self.types.get(activation).and_then(|t| t.enclosing);
                self.scope_chain_for(enclosing, &receiver)
            }
        };

        let record = self.heap.alloc(&self.types, activation, Payload::None);
        for (param, arg) in decl.params.iter().zip(args) {
            self.write_local(activation, record, param.name, arg.clone());
        }
        let arguments = self.new_array(args.to_vec());
        self.write_local(activation, record, self.names.arguments, arguments);

        chain.push(Frame::new(activation, Value::Object(record)));
        let completion = self.with_chain(chain, receiver, |this| this.exec_statements(&decl.body));
        match completion {
            Completion::Return(value) => Ok(value),
            Completion::Throw(value) => Err(Thrown(value)),
            Completion::Normal(_) | Completion::Break(_) | Completion::Continue(_) => {
                Ok(Value::Undefined)
            }
        }
    }

    /// Store `value` in the slot of variable `name` declared on `ty`.
    fn write_local(&mut self, ty: TypeId, object: ObjectId, name: qs_ir::Name, value: Value) {
        let slot = match self.types.get(ty).and_then(|t| t.member(name)).map(|m| &m.kind) {
            Some(MemberKind::Variable { index }) => *index,
            _ => return,
        };
        self.heap.write_slot(&self.types, object, slot, value);
    }

    /// Call any value. Type values construct, as `new` would.
    pub(crate) fn call_value(
        &mut self,
        callee: &Value,
        this: Option<Value>,
        args: &[Value],
        what: &str,
    ) -> Result<Value, Thrown> {
        match callee {
            Value::Function(function) => self.invoke(function, this, args),
            Value::Type(ty) => self.construct(*ty, args),
            _ => Err(self.throw(errors::not_a_function(what))),
        }
    }

    /// `new T(args)`.
    #[tracing::instrument(level = "debug", skip(self, args), fields(argc = args.len()))]
    pub(crate) fn construct(&mut self, ty: TypeId, args: &[Value]) -> Result<Value, Thrown> {
        self.check_interrupt()?;
        if let Some(kind) = self.builtins.error_kind_of(ty) {
            let message = match args.first() {
                Some(value) if !value.is_undefined() => self.to_string(value)?.to_string(),
                _ => String::new(),
            };
            return Ok(self.make_error(kind, &message));
        }
        match self.types.kind(ty) {
            Some(TypeKind::Object) => {
                let id = self.heap.alloc(&self.types, ty, Payload::None);
                Ok(Value::Object(id))
            }
            Some(TypeKind::Array) => {
                let elements = match args {
                    [Value::Number(n)] => {
                        let Some(len) = super::reference::array_index(*n) else {
                            return Err(self.throw(errors::invalid_array_length()));
                        };
                        self.check_array_length(len)?;
                        vec![Value::Undefined; len]
                    }
                    _ => args.to_vec(),
                };
                Ok(self.new_array(elements))
            }
            Some(TypeKind::Class) => self.construct_class(ty, args),
            // Boolean, Number and String convert to primitives, with or
            // without `new`.
            Some(TypeKind::Boolean) => Ok(Value::Bool(args.first().is_some_and(truthy))),
            Some(TypeKind::Number) => match args.first() {
                Some(value) => Ok(Value::Number(self.to_number(value)?)),
                None => Ok(Value::Number(0.0)),
            },
            Some(TypeKind::String) => match args.first() {
                Some(value) => Ok(Value::String(self.to_string(value)?)),
                None => Ok(Value::from("")),
            },
            _ => {
                let message = errors::not_constructible(self.type_name(ty));
                Err(self.throw(message))
            }
        }
    }

    fn construct_class(&mut self, class: TypeId, args: &[Value]) -> Result<Value, Thrown> {
        let class_name = self.type_name(class);
        if self.types.get(class).is_some_and(qs_object::Type::is_abstract) {
            return Err(self.throw(errors::abstract_instantiation(class_name)));
        }
        if let Some((stub, indirect)) = self.types.placeholder_base(class) {
            let message = errors::undefined_base(class_name, self.type_name(stub), indirect);
            return Err(self.throw(message));
        }

        let is_error = self.types.derives_from(class, self.builtins.error);
        let payload = if is_error {
            Payload::Error(qs_object::ErrorKind::General)
        } else {
            Payload::None
        };
        let object = self.heap.alloc(&self.types, class, payload);
        let instance = Value::Object(object);
        if is_error {
            self.init_error_properties(object, class_name, "");
        }

        // Base-first, each class under its own lexical chain.
        let lineage: Vec<TypeId> = self.types.base_chain(class).into_iter().rev().collect();
        for ty in &lineage {
            let inits = self
                .types
                .get(*ty)
                .map(|t| t.member_inits.clone())
                .unwrap_or_default();
            if inits.is_empty() {
                continue;
            }
            let chain = self.scope_chain_for(Some(*ty), &instance);
            self.with_chain(chain, instance.clone(), |this| {
                this.run_member_inits(*ty, object, &inits)
            })?;
        }

        // Only a constructor written in this class runs; bases are not
        // consulted.
        let constructor = self.types.get(class).and_then(|entry| {
            let MemberKind::ScriptFunction(decl) = &entry.member(entry.name)?.kind else {
                return None;
            };
            let activation = self.types.get(decl.scope.get()?)?;
            activation
                .qualifiers
                .contains(TypeQualifiers::CONSTRUCTOR)
                .then(|| (entry.name, Rc::clone(decl)))
        });
        if let Some((name, decl)) = constructor {
            let function = Rc::new(FunctionValue::script(name, decl).bound_to(instance.clone()));
            self.invoke(&function, None, args)?;
        }
        debug!(class = class_name, "constructed");
        Ok(instance)
    }

    /// Run `inits` of `ty` against `object`. The member is looked up by
    /// name each time, so slots shifted since checking are honored.
    fn run_member_inits(
        &mut self,
        ty: TypeId,
        object: ObjectId,
        inits: &[Initializer],
    ) -> Result<(), Thrown> {
        for init in inits {
            let value = self.eval_expr(&init.expr)?;
            self.write_local(ty, object, init.name, value);
        }
        Ok(())
    }

    /// Execute a class definition: static initializers, then the body's
    /// non-declaration statements, with the Type value pushed.
    pub(crate) fn define_class(&mut self, decl: &ClassDecl) -> Completion {
        let (Some(class), Some(body)) = (decl.ty.get(), &decl.body) else {
            return Completion::empty();
        };
        let class_value = Value::Type(class);
        let saved_this = std::mem::replace(&mut self.this, class_value.clone());
        let completion = self.with_frame(Frame::new(class, class_value), |this| {
            match this.run_static_inits(class) {
                Ok(()) => this.run_class_body(body),
                Err(thrown) => thrown.into(),
            }
        });
        self.this = saved_this;
        completion
    }

    fn run_static_inits(&mut self, class: TypeId) -> Result<(), Thrown> {
        let inits = self
            .types
            .get(class)
            .map(|t| t.static_inits.clone())
            .unwrap_or_default();
        for init in &inits {
            let value = self.eval_expr(&init.expr)?;
            let index = match self.types.get(class).and_then(|t| t.member(init.name)).map(|m| &m.kind) {
                Some(MemberKind::Static { index }) => *index,
                _ => continue,
            };
            if let Some(ty) = self.types.get_mut(class) {
                ty.set_static(index, value);
            }
        }
        Ok(())
    }

    fn run_class_body(&mut self, body: &[Stmt]) -> Completion {
        for stmt in body {
            let completion = match &stmt.kind {
                StmtKind::Var(_) | StmtKind::Function(_) => continue,
                StmtKind::Class(nested) => self.define_class(nested),
                _ => self.exec_stmt(stmt),
            };
            if !matches!(completion, Completion::Normal(_)) {
                return completion;
            }
        }
        Completion::empty()
    }
}
