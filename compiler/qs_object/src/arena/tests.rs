use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_insert_and_get() {
    let mut arena: Arena<ObjectId, &str> = Arena::new();
    let a = arena.insert("a");
    let b = arena.insert("b");

    assert_eq!(arena.get(a), Some(&"a"));
    assert_eq!(arena.get(b), Some(&"b"));
    assert_eq!(arena.len(), 2);
}

#[test]
fn test_removed_handle_is_stale_after_reuse() {
    let mut arena: Arena<ObjectId, u32> = Arena::new();
    let first = arena.insert(1);
    assert_eq!(arena.remove(first), Some(1));

    let second = arena.insert(2);
    assert_eq!(second.index(), first.index());
    assert_eq!(arena.get(first), None);
    assert_eq!(arena.get(second), Some(&2));
    assert_eq!(arena.remove(first), None);
}

#[test]
fn test_ids_skip_free_slots() {
    let mut arena: Arena<TypeId, u32> = Arena::new();
    let a = arena.insert(1);
    let b = arena.insert(2);
    let c = arena.insert(3);
    arena.remove(b);

    assert_eq!(arena.ids(), vec![a, c]);
    assert_eq!(arena.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
}

#[test]
fn test_clear_invalidates_everything() {
    let mut arena: Arena<ObjectId, u32> = Arena::new();
    let a = arena.insert(1);
    arena.clear();

    assert!(arena.is_empty());
    assert!(!arena.contains(a));
}
