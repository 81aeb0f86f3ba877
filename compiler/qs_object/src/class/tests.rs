#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use qs_ir::StringInterner;

use crate::{Heap, Payload};

fn class(types: &mut TypeArena, interner: &StringInterner, name: &str) -> TypeId {
    types.new_class(interner.intern(name), None, None, TypeQualifiers::empty(), None)
}

fn native() -> NewMember {
    NewMember::Native(crate::NativeFunction::new("f", |_, _, _| Ok(Value::Undefined)))
}

fn slot_of(types: &TypeArena, ty: TypeId, name: Name) -> Option<u32> {
    match types.get(ty)?.member(name)?.kind {
        MemberKind::Variable { index } => Some(index),
        _ => None,
    }
}

fn static_of(types: &TypeArena, ty: TypeId, name: Name) -> Option<u32> {
    match types.get(ty)?.member(name)?.kind {
        MemberKind::Static { index } => Some(index),
        _ => None,
    }
}

/// Own live instance variables, slot count and free list agree.
fn assert_dense(ty: &Type) {
    let live: Vec<u32> = ty
        .members()
        .filter_map(|m| match m.kind {
            MemberKind::Variable { index } => Some(index),
            _ => None,
        })
        .collect();
    for index in &live {
        assert!(*index >= ty.inherited_slots() && *index < ty.instance_slots());
        assert!(!ty.free_slots().contains(*index));
    }
    let mut unique = live.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), live.len());
    assert_eq!(
        ty.occupied_slots() as usize,
        ty.inherited_slots() as usize + live.len() + ty.reserved_slots() as usize
    );
    assert_eq!(
        ty.instance_slots() as usize,
        ty.occupied_slots() as usize + ty.free_slots().len()
    );
    let statics = ty
        .members()
        .filter(|m| matches!(m.kind, MemberKind::Static { .. }))
        .count();
    assert_eq!(statics, ty.statics().len());
}

#[test]
fn test_redeclared_variable_keeps_slot() {
    let interner = StringInterner::new();
    let mut types = TypeArena::new();
    let a = class(&mut types, &interner, "A");
    let x = interner.intern("x");

    types.add_member(a, x, NewMember::Variable, MemberAttrs::VARIABLE);
    types.add_member(a, x, NewMember::Variable, MemberAttrs::VARIABLE);

    assert_eq!(slot_of(&types, a, x), Some(0));
    assert_eq!(types.get(a).unwrap().instance_slots(), 1);
}

#[test]
fn test_variable_replaced_by_function_frees_slot() {
    let interner = StringInterner::new();
    let mut types = TypeArena::new();
    let a = class(&mut types, &interner, "A");
    let x = interner.intern("x");
    let y = interner.intern("y");

    types.add_member(a, x, NewMember::Variable, MemberAttrs::VARIABLE);
    types.add_member(a, y, NewMember::Variable, MemberAttrs::VARIABLE);
    types.add_member(a, x, native(), MemberAttrs::FUNCTION);

    let ty = types.get(a).unwrap();
    assert!(ty.member(x).unwrap().is_function());
    assert!(ty.free_slots().contains(0));
    assert_dense(ty);

    // The freed slot is reused by the next variable.
    let z = interner.intern("z");
    types.add_member(a, z, NewMember::Variable, MemberAttrs::VARIABLE);
    assert_eq!(slot_of(&types, a, z), Some(0));
}

#[test]
fn test_static_replaced_by_instance_compacts_statics() {
    let interner = StringInterner::new();
    let mut types = TypeArena::new();
    let a = class(&mut types, &interner, "A");
    let s1 = interner.intern("s1");
    let s2 = interner.intern("s2");
    let statik = MemberAttrs::VARIABLE | MemberAttrs::STATIC;

    types.add_member(a, s1, NewMember::Variable, statik);
    types.add_member(a, s2, NewMember::Variable, statik);
    types.get_mut(a).unwrap().set_static(1, Value::Number(7.0));
    types.add_member(a, s1, NewMember::Variable, MemberAttrs::VARIABLE);

    assert_eq!(static_of(&types, a, s2), Some(0));
    assert_eq!(slot_of(&types, a, s1), Some(0));
    let ty = types.get(a).unwrap();
    assert_eq!(ty.static_value(0).and_then(Value::as_number), Some(7.0));
    assert_dense(ty);
}

#[test]
fn test_static_redeclaration_resets_value() {
    let interner = StringInterner::new();
    let mut types = TypeArena::new();
    let a = class(&mut types, &interner, "A");
    let s = interner.intern("s");
    let statik = MemberAttrs::VARIABLE | MemberAttrs::STATIC;

    types.add_member(a, s, NewMember::Variable, statik);
    types.get_mut(a).unwrap().set_static(0, Value::Number(1.0));
    types.add_member(a, s, NewMember::Variable, statik);

    let ty = types.get(a).unwrap();
    assert_eq!(static_of(&types, a, s), Some(0));
    assert!(ty.static_value(0).unwrap().is_undefined());
}

#[test]
fn test_delete_member_releases_storage() {
    let interner = StringInterner::new();
    let mut types = TypeArena::new();
    let a = class(&mut types, &interner, "A");
    let x = interner.intern("x");

    types.add_member(a, x, NewMember::Variable, MemberAttrs::VARIABLE);
    let removed = types.delete_member(a, x).unwrap();

    assert_eq!(removed.name, x);
    assert_eq!(types.get(a).unwrap().instance_slots(), 0);
    assert!(types.delete_member(a, x).is_none());
}

#[test]
fn test_reused_slot_is_cleared_in_live_instances() {
    let interner = StringInterner::new();
    let mut types = TypeArena::new();
    let mut heap = Heap::new();
    let a = class(&mut types, &interner, "A");
    let x = interner.intern("x");
    let y = interner.intern("y");

    types.add_member(a, x, NewMember::Variable, MemberAttrs::VARIABLE);
    let object = heap.alloc(&types, a, Payload::None);
    heap.write_slot(&types, object, 0, Value::Number(7.0));

    types.delete_member(a, x);
    types.add_member(a, y, NewMember::Variable, MemberAttrs::VARIABLE);
    assert_eq!(slot_of(&types, a, y), Some(0));
    assert_eq!(types.get(a).unwrap().recycled_slots(), &[0]);

    assert_eq!(heap.reset_recycled_slots(&mut types), 1);
    assert!(matches!(heap.read_slot(&types, object, 0), Value::Undefined));
    assert!(types.get(a).unwrap().recycled_slots().is_empty());
}

#[test]
fn test_forward_base_resolution_shifts_derived_slots() {
    let interner = StringInterner::new();
    let mut types = TypeArena::new();
    let bar = interner.intern("Bar");
    let foo_x = interner.intern("fx");
    let baz_y = interner.intern("by");

    let stub = types.placeholder_for(bar);
    let foo = types.new_class(interner.intern("Foo"), Some(stub), None, TypeQualifiers::empty(), None);
    types.add_member(foo, foo_x, NewMember::Variable, MemberAttrs::VARIABLE);
    let baz = types.new_class(interner.intern("Baz"), Some(foo), None, TypeQualifiers::empty(), None);
    types.add_member(baz, baz_y, NewMember::Variable, MemberAttrs::VARIABLE);

    let real = class(&mut types, &interner, "Bar");
    types.add_member(real, interner.intern("a"), NewMember::Variable, MemberAttrs::VARIABLE);
    types.add_member(real, interner.intern("b"), NewMember::Variable, MemberAttrs::VARIABLE);

    assert!(types.resolve_forward_base(stub, real));

    assert_eq!(types.get(foo).unwrap().base, Some(real));
    assert_eq!(types.get(baz).unwrap().base, Some(foo));
    assert_eq!(slot_of(&types, foo, foo_x), Some(2));
    assert_eq!(slot_of(&types, baz, baz_y), Some(3));
    assert_eq!(types.get(baz).unwrap().instance_slots(), 4);
    assert!(!types.contains(stub));
    assert!(types.placeholder(bar).is_none());
    assert_dense(types.get(foo).unwrap());
    assert_dense(types.get(baz).unwrap());
}

#[test]
fn test_resolve_rejects_non_placeholder() {
    let interner = StringInterner::new();
    let mut types = TypeArena::new();
    let a = class(&mut types, &interner, "A");
    let b = class(&mut types, &interner, "B");
    assert!(!types.resolve_forward_base(a, b));
}

#[derive(Clone, Debug)]
enum Op {
    Var { name: u8, is_static: bool },
    Function { name: u8 },
    Placeholder { name: u8 },
    Delete { name: u8 },
    Reserve { extra: u8 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6, any::<bool>()).prop_map(|(name, is_static)| Op::Var { name, is_static }),
        (0u8..6).prop_map(|name| Op::Function { name }),
        (0u8..6).prop_map(|name| Op::Placeholder { name }),
        (0u8..6).prop_map(|name| Op::Delete { name }),
        (0u8..3).prop_map(|extra| Op::Reserve { extra }),
    ]
}

proptest! {
    #[test]
    fn prop_member_table_stays_dense(ops in proptest::collection::vec(op(), 0..40)) {
        let interner = StringInterner::new();
        let mut types = TypeArena::new();
        let base = class(&mut types, &interner, "Base");
        types.add_member(base, interner.intern("inherited"), NewMember::Variable, MemberAttrs::VARIABLE);
        let ty = types.new_class(interner.intern("T"), Some(base), None, TypeQualifiers::empty(), None);
        let names: Vec<Name> = (0..6).map(|i| interner.intern(&format!("m{i}"))).collect();

        for op in ops {
            match op {
                Op::Var { name, is_static } => {
                    let attrs = if is_static {
                        MemberAttrs::VARIABLE | MemberAttrs::STATIC
                    } else {
                        MemberAttrs::VARIABLE
                    };
                    types.add_member(ty, names[name as usize], NewMember::Variable, attrs);
                }
                Op::Function { name } => {
                    types.add_member(ty, names[name as usize], native(), MemberAttrs::FUNCTION);
                }
                Op::Placeholder { name } => {
                    types.add_member(ty, names[name as usize], NewMember::Placeholder, MemberAttrs::empty());
                }
                Op::Delete { name } => {
                    types.delete_member(ty, names[name as usize]);
                }
                Op::Reserve { extra } => {
                    let t = types.get_mut(ty).unwrap();
                    let target = t.instance_slots() + u32::from(extra);
                    t.reserve_slots(target);
                }
            }
            assert_dense(types.get(ty).unwrap());
        }
    }
}

proptest! {
    #[test]
    fn prop_live_instance_never_sees_stale_slots(ops in proptest::collection::vec(op(), 0..40)) {
        let interner = StringInterner::new();
        let mut types = TypeArena::new();
        let mut heap = Heap::new();
        let base = class(&mut types, &interner, "Base");
        types.add_member(base, interner.intern("inherited"), NewMember::Variable, MemberAttrs::VARIABLE);
        let ty = types.new_class(interner.intern("T"), Some(base), None, TypeQualifiers::empty(), None);
        let names: Vec<Name> = (0..6).map(|i| interner.intern(&format!("m{i}"))).collect();
        let object = heap.alloc(&types, ty, Payload::None);
        heap.write_slot(&types, object, 0, Value::Number(-1.0));

        // Value last written through each live variable, by name.
        let mut written: Vec<Option<(u32, f64)>> = vec![None; names.len()];
        for (step, op) in ops.into_iter().enumerate() {
            match op {
                Op::Var { name, is_static } => {
                    let attrs = if is_static {
                        MemberAttrs::VARIABLE | MemberAttrs::STATIC
                    } else {
                        MemberAttrs::VARIABLE
                    };
                    types.add_member(ty, names[name as usize], NewMember::Variable, attrs);
                }
                Op::Function { name } => {
                    types.add_member(ty, names[name as usize], native(), MemberAttrs::FUNCTION);
                }
                Op::Placeholder { name } => {
                    types.add_member(ty, names[name as usize], NewMember::Placeholder, MemberAttrs::empty());
                }
                Op::Delete { name } => {
                    types.delete_member(ty, names[name as usize]);
                }
                Op::Reserve { extra } => {
                    let t = types.get_mut(ty).unwrap();
                    let target = t.instance_slots() + u32::from(extra);
                    t.reserve_slots(target);
                }
            }
            heap.reset_recycled_slots(&mut types);

            for (i, name) in names.iter().enumerate() {
                let slot = slot_of(&types, ty, *name);
                let seen = slot.map(|slot| heap.read_slot(&types, object, slot));
                match (slot, written[i]) {
                    (Some(slot), Some((old, value))) if slot == old => {
                        prop_assert_eq!(seen.and_then(|v| v.as_number()), Some(value));
                    }
                    (Some(_), _) => {
                        prop_assert!(matches!(seen, Some(Value::Undefined)));
                    }
                    (None, _) => {}
                }
                written[i] = slot.map(|slot| {
                    let value = f64::from(u32::try_from(step * names.len() + i).unwrap());
                    heap.write_slot(&types, object, slot, Value::Number(value));
                    (slot, value)
                });
            }
            prop_assert_eq!(heap.read_slot(&types, object, 0).as_number(), Some(-1.0));
        }
    }
}
