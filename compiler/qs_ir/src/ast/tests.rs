use super::*;
use crate::{Name, StringInterner, TypeId};
use pretty_assertions::assert_eq;

#[test]
fn test_ident_starts_unresolved() {
    let ident = Ident::new(Name::from_raw(7));
    assert_eq!(ident.address.get(), None);

    ident.address.set(Some(Address { depth: 1, slot: 3 }));
    assert_eq!(ident.address.get(), Some(Address { depth: 1, slot: 3 }));
}

#[test]
fn test_declarations_are_recognized() {
    let interner = StringInterner::new();
    let x = interner.intern("x");
    let decl = Stmt::new(
        StmtKind::Var(VarDecl {
            attrs: Vec::new(),
            constant: false,
            bindings: vec![VarBinding::new(x, None, None, 1)],
        }),
        1,
    );
    let expr = Stmt::new(StmtKind::Expr(Expr::new(ExprKind::Null, 2)), 2);

    assert!(decl.is_declaration());
    assert!(!expr.is_declaration());
}

#[test]
fn test_block_scope_annotation() {
    let block = Block::new(Vec::new());
    assert_eq!(block.scope.get(), None);
    block.scope.set(Some(TypeId::new(4, 1)));
    assert_eq!(block.scope.get().map(TypeId::index), Some(4));
}

#[test]
fn test_attribute_display() {
    assert_eq!(Attribute::Static.to_string(), "static");
    assert_eq!(Attribute::Final.as_str(), "final");
}
