#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeSet;

#[test]
fn test_allocate_bumps_counter() {
    let mut free = SlotFreeList::new();
    let mut count = 2;
    assert_eq!(free.allocate(&mut count), 2);
    assert_eq!(free.allocate(&mut count), 3);
    assert_eq!(count, 4);
}

#[test]
fn test_release_middle_is_reused() {
    let mut free = SlotFreeList::new();
    let mut count = 3;
    free.release(1, &mut count);
    assert_eq!(count, 3);
    assert!(free.contains(1));
    assert_eq!(free.allocate(&mut count), 1);
    assert!(free.is_empty());
}

#[test]
fn test_release_top_shrinks_and_folds() {
    let mut free = SlotFreeList::new();
    let mut count = 4;
    free.release(2, &mut count);
    free.release(1, &mut count);
    free.release(3, &mut count);
    assert_eq!(count, 1);
    assert!(free.is_empty());
}

#[test]
fn test_shift_moves_free_indices() {
    let mut free = SlotFreeList::new();
    let mut count = 3;
    free.release(0, &mut count);
    free.shift(5);
    assert!(free.contains(5));
    assert!(!free.contains(0));
}

#[derive(Clone, Debug)]
enum Op {
    Allocate,
    Release(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Allocate), (0usize..32).prop_map(Op::Release)]
}

proptest! {
    #[test]
    fn free_list_never_hands_out_live_index(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut free = SlotFreeList::new();
        let mut count = 0u32;
        let mut live: BTreeSet<u32> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Allocate => {
                    let index = free.allocate(&mut count);
                    prop_assert!(live.insert(index), "index {} handed out twice", index);
                }
                Op::Release(pick) => {
                    if live.is_empty() {
                        continue;
                    }
                    let index = *live.iter().nth(pick % live.len()).unwrap();
                    live.remove(&index);
                    free.release(index, &mut count);
                }
            }

            prop_assert!(live.iter().all(|&i| i < count));
            prop_assert!(live.iter().all(|&i| !free.contains(i)));
            prop_assert_eq!(count as usize, live.len() + free.len());
        }
    }
}
