#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;
use qs_diagnostic::{DiagnosticList, ErrorCode};
use qs_ir::{Address, ExprKind, Name, Program, StmtKind, StringInterner, TypeId};
use qs_object::{MemberKind, Type, TypeArena, TypeKind, TypeQualifiers, Value};

struct Fixture {
    interner: StringInterner,
    types: TypeArena,
    global: TypeId,
}

impl Fixture {
    fn new() -> Self {
        let interner = StringInterner::new();
        let mut types = TypeArena::new();
        let global = types.alloc(Type::new(interner.intern("Global"), TypeKind::Global));
        Fixture {
            interner,
            types,
            global,
        }
    }

    fn check_with(&mut self, source: &str, options: CheckOptions) -> (Program, DiagnosticList) {
        let program = qs_parse::parse(source, &self.interner).unwrap();
        let diagnostics = check(&program, &mut self.types, &self.interner, &[self.global], options);
        (program, diagnostics)
    }

    fn check(&mut self, source: &str) -> (Program, DiagnosticList) {
        self.check_with(source, CheckOptions::default())
    }

    fn codes(&mut self, source: &str) -> Vec<ErrorCode> {
        self.check(source).1.iter().map(|d| d.code).collect()
    }

    fn messages(&mut self, source: &str) -> Vec<String> {
        self.check(source).1.iter().map(|d| d.message.clone()).collect()
    }

    fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    fn class(&self, name: &str) -> TypeId {
        let member = self.types.get(self.global).unwrap().member(self.name(name)).unwrap();
        let MemberKind::Static { index } = member.kind else {
            panic!("{name} is not a class member");
        };
        match self.types.get(self.global).unwrap().static_value(index) {
            Some(Value::Type(ty)) => *ty,
            other => panic!("unexpected class value {other:?}"),
        }
    }

    fn slot(&self, ty: TypeId, name: &str) -> u32 {
        match self.types.lookup(ty, self.name(name)).unwrap().kind {
            MemberKind::Variable { index } => index,
            ref other => panic!("{name} is {other:?}"),
        }
    }
}

#[test]
fn test_outer_variable_gets_direct_address() {
    let mut f = Fixture::new();
    let (program, diagnostics) = f.check("var x = 1; function f() { return x + 1; } f();");
    assert!(diagnostics.is_empty());

    let StmtKind::Function(decl) = &program.body[1].kind else {
        panic!("expected function");
    };
    let StmtKind::Return(Some(value)) = &decl.body[0].kind else {
        panic!("expected return");
    };
    let ExprKind::Binary { left, .. } = &value.kind else {
        panic!("expected binary");
    };
    let ident = left.as_ident().unwrap();
    assert_eq!(ident.address.get(), Some(Address { depth: 1, slot: 0 }));

    let activation = decl.scope.get().unwrap();
    assert_eq!(f.types.get(activation).unwrap().enclosing, Some(f.global));
}

#[test]
fn test_function_vars_are_declared_before_the_body_runs() {
    let mut f = Fixture::new();
    let (program, diagnostics) =
        f.check("var x = 'global'; function f() { var r = x; var x = 'local'; return r; }");
    assert!(diagnostics.is_empty());

    let StmtKind::Function(decl) = &program.body[1].kind else {
        panic!("expected function");
    };
    let StmtKind::Var(first) = &decl.body[0].kind else {
        panic!("expected var");
    };
    let init = first.bindings[0].init.as_ref().unwrap();
    let activation = decl.scope.get().unwrap();
    let x = f.slot(activation, "x");
    assert_eq!(
        init.as_ident().unwrap().address.get(),
        Some(Address { depth: 0, slot: x })
    );
}

#[test]
fn test_loop_header_vars_are_declared_on_entry() {
    let mut f = Fixture::new();
    let (program, _) = f.check("function f(o) { i; for (var i = 0; i < 1; i++) {} for (var k in o) {} }");
    let StmtKind::Function(decl) = &program.body[0].kind else {
        panic!("expected function");
    };
    let activation = decl.scope.get().unwrap();
    // o=0 arguments=1, then the loop variables in source order.
    assert_eq!(f.slot(activation, "i"), 2);
    assert_eq!(f.slot(activation, "k"), 3);
    let StmtKind::Expr(expr) = &decl.body[0].kind else {
        panic!("expected expression");
    };
    assert_eq!(
        expr.as_ident().unwrap().address.get(),
        Some(Address { depth: 0, slot: 2 })
    );
}

#[test]
fn test_parameters_take_first_slots() {
    let mut f = Fixture::new();
    let (program, _) = f.check("function f(a, b) { var c; }");
    let StmtKind::Function(decl) = &program.body[0].kind else {
        panic!("expected function");
    };
    let activation = decl.scope.get().unwrap();

    assert_eq!(f.slot(activation, "a"), 0);
    assert_eq!(f.slot(activation, "b"), 1);
    assert_eq!(f.slot(activation, "arguments"), 2);
    assert_eq!(f.slot(activation, "c"), 3);
}

#[test]
fn test_unknown_names_stay_dynamic() {
    let mut f = Fixture::new();
    let (program, _) = f.check("y;");
    let StmtKind::Expr(expr) = &program.body[0].kind else {
        panic!("expected expression");
    };
    assert_eq!(expr.as_ident().unwrap().address.get(), None);
}

#[test]
fn test_with_disables_direct_lookup() {
    let mut f = Fixture::new();
    let (program, _) = f.check("var x; with (o) { x; }");
    let StmtKind::With { body, .. } = &program.body[1].kind else {
        panic!("expected with");
    };
    let StmtKind::Block(block) = &body.kind else {
        panic!("expected block");
    };
    let StmtKind::Expr(expr) = &block.stmts[0].kind else {
        panic!("expected expression");
    };
    assert_eq!(expr.as_ident().unwrap().address.get(), None);
}

#[test]
fn test_constants_stay_dynamic() {
    let mut f = Fixture::new();
    let (program, _) = f.check("const k = 1; k;");
    let StmtKind::Expr(expr) = &program.body[1].kind else {
        panic!("expected expression");
    };
    assert_eq!(expr.as_ident().unwrap().address.get(), None);
}

#[test]
fn test_block_scope_reserves_enclosing_slots() {
    let mut f = Fixture::new();
    let (program, _) = f.check("function f() { var a; { var b; var c; } var d; }");
    let StmtKind::Function(decl) = &program.body[0].kind else {
        panic!("expected function");
    };
    let activation = decl.scope.get().unwrap();
    let StmtKind::Block(block) = &decl.body[1].kind else {
        panic!("expected block");
    };
    let scope = block.scope.get().unwrap();

    // arguments=0 a=1 d=2 are declared on entry, then block b=3 c=4.
    assert_eq!(f.slot(activation, "a"), 1);
    assert_eq!(f.slot(activation, "d"), 2);
    assert_eq!(f.slot(scope, "b"), 3);
    assert_eq!(f.slot(scope, "c"), 4);
    let ty = f.types.get(activation).unwrap();
    assert_eq!(ty.instance_slots(), 5);
    assert_eq!(ty.reserved_slots(), 2);
}

#[test]
fn test_class_members_and_constructor() {
    let mut f = Fixture::new();
    let (_, diagnostics) = f.check(
        "class A { var v = 1; static var count = 0; function A(x) { v = x; } function get() { return v; } }",
    );
    assert!(diagnostics.is_empty());

    let a = f.class("A");
    let ty = f.types.get(a).unwrap();
    assert_eq!(ty.instance_slots(), 1);
    assert_eq!(ty.statics().len(), 1);
    assert_eq!(ty.member_inits.len(), 1);
    assert_eq!(ty.static_inits.len(), 1);

    let MemberKind::ScriptFunction(ctor) = &ty.member(f.name("A")).unwrap().kind else {
        panic!("constructor missing");
    };
    let activation = f.types.get(ctor.scope.get().unwrap()).unwrap();
    assert!(activation.qualifiers.contains(TypeQualifiers::CONSTRUCTOR));
}

#[test]
fn test_subclass_slots_follow_base() {
    let mut f = Fixture::new();
    f.check("class A { var v; } class B extends A { var w; }");
    let a = f.class("A");
    let b = f.class("B");

    assert_eq!(f.slot(b, "v"), 0);
    assert_eq!(f.slot(b, "w"), 1);
    assert_eq!(f.types.get(b).unwrap().base, Some(a));
}

#[test]
fn test_forward_base_is_resolved_after_declaration() {
    let mut f = Fixture::new();
    let (_, diagnostics) = f.check("class Foo extends Bar { var own; } class Bar { var a; var b; }");
    assert!(!diagnostics.has_errors());

    let foo = f.class("Foo");
    let bar = f.class("Bar");
    assert_eq!(f.types.get(foo).unwrap().base, Some(bar));
    assert_eq!(f.slot(foo, "a"), 0);
    assert_eq!(f.slot(foo, "own"), 2);
    assert_eq!(f.types.get(foo).unwrap().instance_slots(), 3);
    assert!(f.types.placeholder(f.name("Bar")).is_none());
}

#[test]
fn test_placeholder_base_disables_direct_lookup() {
    let mut f = Fixture::new();
    let (program, _) = f.check("class Foo extends Bar { var own; function get() { return own; } }");
    let StmtKind::Class(class) = &program.body[0].kind else {
        panic!("expected class");
    };
    let body = class.body.as_ref().unwrap();
    let StmtKind::Function(get) = &body[1].kind else {
        panic!("expected method");
    };
    let StmtKind::Return(Some(value)) = &get.body[0].kind else {
        panic!("expected return");
    };
    assert_eq!(value.as_ident().unwrap().address.get(), None);
}

#[test]
fn test_control_flow_errors() {
    let mut f = Fixture::new();
    assert_eq!(f.codes("continue;"), vec![ErrorCode::E2001]);
    assert_eq!(f.codes("break;"), vec![ErrorCode::E2002]);
    assert_eq!(f.codes("while (1) { break nowhere; }"), vec![ErrorCode::E2003]);
    assert_eq!(f.codes("a: a: while (1) {}"), vec![ErrorCode::E2004]);
    assert_eq!(f.codes("return 1;"), vec![ErrorCode::E2005]);
    assert!(f.codes("switch (1) { case 1: break; }").is_empty());
    assert!(f.codes("outer: for (;;) { for (;;) { continue outer; } }").is_empty());
    assert!(f.codes("a: b: while (1) { continue a; }").is_empty());
    assert!(f.codes("block: { break block; }").is_empty());
}

#[test]
fn test_continue_needs_a_loop_label() {
    let mut f = Fixture::new();
    assert_eq!(
        f.codes("block: { while (1) { continue block; } }"),
        vec![ErrorCode::E2001]
    );
    assert_eq!(
        f.messages("outer: if (1) { for (;;) { continue outer; } }"),
        vec!["'continue' label 'outer' does not refer to an iteration statement"]
    );
}

#[test]
fn test_loop_context_does_not_leak_into_functions() {
    let mut f = Fixture::new();
    let codes = f.codes("while (1) { function g() { break; } }");
    assert_eq!(codes, vec![ErrorCode::E2002]);
}

#[test]
fn test_declaration_messages() {
    let mut f = Fixture::new();
    assert_eq!(
        f.messages("static var s;"),
        vec!["Static variables cannot be declared outside a class"]
    );
    assert_eq!(
        f.messages("static function g() {}"),
        vec!["Function 'g' cannot be declared static outside a class"]
    );
    assert_eq!(
        f.messages("class C { class N {} }"),
        vec!["Nested class 'N' in class 'C' must be declared static"]
    );
    assert_eq!(
        f.messages("static class S {}"),
        vec!["Static class 'S' cannot be declared outside a class"]
    );
    assert_eq!(
        f.messages("function h() { class K {} }"),
        vec!["Class 'K' cannot be declared inside function 'h'"]
    );
    assert_eq!(
        f.messages("final class F {} class G extends F {}"),
        vec!["Base class 'F' has been declared final"]
    );
    assert_eq!(f.messages("public private var p;"), vec!["Conflicting attributes"]);
    assert_eq!(
        f.messages("class V { var v; var v; }"),
        vec!["Variable 'v' has already been declared in class 'V'"]
    );
    assert_eq!(
        f.messages("function p(arguments) {}"),
        vec!["Parameter 'arguments' is a predefined value in function 'p'"]
    );
    assert_eq!(
        f.messages("function q(a, a) {}"),
        vec!["Parameter 'a' already declared in function 'q'"]
    );
    assert_eq!(
        f.messages("with (o) { var w; }"),
        vec!["Variables cannot be declared inside a 'with' block"]
    );
}

#[test]
fn test_warnings_do_not_fail_the_unit() {
    let mut f = Fixture::new();
    let (_, diagnostics) = f.check("class Fwd; class Z { static static var s; }");
    let codes: Vec<ErrorCode> = diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::W2002, ErrorCode::W2001]);
    assert!(!diagnostics.has_errors());
    assert_eq!(
        f.types.get(f.global).unwrap().member(f.name("Fwd")).map(|m| matches!(m.kind, MemberKind::Placeholder)),
        Some(true)
    );
}

#[test]
fn test_forward_declaration_is_replaced_by_class() {
    let mut f = Fixture::new();
    f.check("class A; class A { var v; }");
    let a = f.class("A");
    assert_eq!(f.types.kind(a), Some(TypeKind::Class));
}

#[test]
fn test_global_statement_policy() {
    let mut f = Fixture::new();
    let options = CheckOptions {
        forbid_global_statements: true,
        ..CheckOptions::default()
    };
    let (_, diagnostics) = f.check_with("var a = 1; function g() { a = 2; } a = 3; a = 4;", options);
    let codes: Vec<ErrorCode> = diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E2014]);
}

#[test]
fn test_eval_code_may_return() {
    let mut f = Fixture::new();
    let options = CheckOptions {
        allow_return: true,
        ..CheckOptions::default()
    };
    let (_, diagnostics) = f.check_with("return 5;", options);
    assert!(diagnostics.is_empty());
}

#[test]
fn test_resolve_by_name_leaves_identifiers_dynamic() {
    let mut f = Fixture::new();
    let options = CheckOptions {
        resolve_by_name: true,
        ..CheckOptions::default()
    };
    let (program, diagnostics) = f.check_with("var g = 1; g;", options);
    assert!(diagnostics.is_empty());
    let StmtKind::Expr(expr) = &program.body[1].kind else {
        panic!("expected expression");
    };
    assert_eq!(expr.as_ident().unwrap().address.get(), None);
}

#[test]
fn test_redeclaration_is_idempotent_across_units() {
    let mut f = Fixture::new();
    f.check("var x = 1; class A { var v; }");
    f.check("var x = 2; class A { var v; var w; }");

    let global = f.types.get(f.global).unwrap();
    assert_eq!(global.instance_slots(), 1);
    let a = f.class("A");
    assert_eq!(f.types.get(a).unwrap().instance_slots(), 2);
}
