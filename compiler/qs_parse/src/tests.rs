#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;
use qs_ir::{Attribute, BinaryOp, ExprKind, ForInTarget, LogicalOp, StmtKind, UpdateOp};

fn parse_ok(source: &str) -> (Program, StringInterner) {
    let interner = StringInterner::new();
    let program = parse(source, &interner).unwrap();
    (program, interner)
}

fn parse_err(source: &str) -> Vec<Diagnostic> {
    let interner = StringInterner::new();
    match parse(source, &interner) {
        Ok(_) => panic!("expected parse failure for {source:?}"),
        Err(failure) => failure.diagnostics,
    }
}

fn expr_of(stmt: &qs_ir::Stmt) -> &qs_ir::Expr {
    match &stmt.kind {
        StmtKind::Expr(expr) => expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

#[test]
fn test_precedence() {
    let (program, _) = parse_ok("a + b * c || d;");
    let ExprKind::Logical { op, left, .. } = &expr_of(&program.body[0]).kind else {
        panic!("expected logical or");
    };
    assert_eq!(*op, LogicalOp::Or);
    let ExprKind::Binary { op, right, .. } = &left.kind else {
        panic!("expected addition");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(
        right.kind,
        ExprKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn test_assignment_is_right_associative() {
    let (program, _) = parse_ok("a = b += 1");
    let ExprKind::Assign { op: None, value, .. } = &expr_of(&program.body[0]).kind else {
        panic!("expected assignment");
    };
    assert!(matches!(
        value.kind,
        ExprKind::Assign {
            op: Some(BinaryOp::Add),
            ..
        }
    ));
}

#[test]
fn test_automatic_semicolons() {
    let (program, _) = parse_ok("var a = 1\nvar b = 2\na\n++b");
    assert_eq!(program.body.len(), 4);
    assert!(matches!(
        expr_of(&program.body[3]).kind,
        ExprKind::Update {
            op: UpdateOp::Increment,
            prefix: true,
            ..
        }
    ));
}

#[test]
fn test_return_before_line_break_has_no_value() {
    let (program, _) = parse_ok("function f() { return\n42; }");
    let StmtKind::Function(decl) = &program.body[0].kind else {
        panic!("expected function");
    };
    assert!(matches!(decl.body[0].kind, StmtKind::Return(None)));
    assert_eq!(decl.body.len(), 2);
}

#[test]
fn test_class_declarations() {
    let (program, interner) = parse_ok(
        "class A;\n\
         final class B extends A {\n\
             static var count = 0;\n\
             function B(x : Number) { this.x = x; }\n\
         }",
    );
    let StmtKind::Class(forward) = &program.body[0].kind else {
        panic!("expected class");
    };
    assert!(forward.body.is_none());

    let StmtKind::Class(class) = &program.body[1].kind else {
        panic!("expected class");
    };
    assert_eq!(class.attrs, vec![Attribute::Final]);
    assert_eq!(class.base, Some(interner.intern("A")));
    let body = class.body.as_ref().unwrap();
    assert_eq!(body.len(), 2);
    let StmtKind::Var(decl) = &body[0].kind else {
        panic!("expected var");
    };
    assert_eq!(decl.attrs, vec![Attribute::Static]);
    let StmtKind::Function(ctor) = &body[1].kind else {
        panic!("expected function");
    };
    assert_eq!(ctor.params[0].type_name, Some(interner.intern("Number")));
}

#[test]
fn test_for_in_forms() {
    let (program, _) = parse_ok("for (var k in o) ;\nfor (k in o) ;\nfor (var i = 0; i < 3; i++) ;");
    assert!(matches!(
        program.body[0].kind,
        StmtKind::ForIn {
            target: ForInTarget::Var(_),
            ..
        }
    ));
    assert!(matches!(
        program.body[1].kind,
        StmtKind::ForIn {
            target: ForInTarget::Expr(_),
            ..
        }
    ));
    assert!(matches!(program.body[2].kind, StmtKind::For { .. }));
}

#[test]
fn test_labels_and_jumps() {
    let (program, interner) = parse_ok("outer: while (true) { break outer; }");
    let StmtKind::Labeled { label, body } = &program.body[0].kind else {
        panic!("expected labeled statement");
    };
    assert_eq!(*label, interner.intern("outer"));
    assert!(matches!(body.kind, StmtKind::While { .. }));
}

#[test]
fn test_new_member_and_call_chain() {
    let (program, _) = parse_ok("new a.B(1).c();");
    let ExprKind::Call { callee, .. } = &expr_of(&program.body[0]).kind else {
        panic!("expected call");
    };
    let ExprKind::Member { object, .. } = &callee.kind else {
        panic!("expected member");
    };
    assert!(matches!(object.kind, ExprKind::New { .. }));
}

#[test]
fn test_literals() {
    let (program, interner) = parse_ok("x = [1,,3]; y = { a: 1, 'b': 2, default: 3 };");
    let ExprKind::Assign { value, .. } = &expr_of(&program.body[0]).kind else {
        panic!("expected assignment");
    };
    let ExprKind::Array(elements) = &value.kind else {
        panic!("expected array");
    };
    assert_eq!(elements.len(), 3);
    assert!(elements[1].is_none());

    let ExprKind::Assign { value, .. } = &expr_of(&program.body[1]).kind else {
        panic!("expected assignment");
    };
    let ExprKind::Object(props) = &value.kind else {
        panic!("expected object");
    };
    assert!(matches!(props[2].0, qs_ir::PropertyKey::Name(n) if n == interner.intern("default")));
}

#[test]
fn test_try_requires_handler() {
    let diags = parse_err("try { a(); }");
    assert_eq!(diags[0].code, ErrorCode::E1004);
}

#[test]
fn test_errors_are_collected_per_statement() {
    let diags = parse_err("var = 1;\nx = );\ny = 2;");
    assert_eq!(diags.len(), 2);
    assert_eq!(diags[0].line, 1);
    assert_eq!(diags[1].line, 2);
    assert_eq!(diags[1].code, ErrorCode::E1003);
}

#[test]
fn test_lexer_errors_fail_the_parse() {
    let diags = parse_err("var s = 'open");
    assert_eq!(diags[0].code, ErrorCode::E1002);
}

#[test]
fn test_switch_cases() {
    let (program, _) = parse_ok("switch (x) { case 1: a(); case 2: default: b(); }");
    let StmtKind::Switch { cases, .. } = &program.body[0].kind else {
        panic!("expected switch");
    };
    assert_eq!(cases.len(), 3);
    assert!(cases[1].body.is_empty());
    assert!(cases[2].test.is_none());
}
