use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_deep_native_recursion() {
    fn nest(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { nest(n - 1) + 1 })
    }

    assert_eq!(nest(100_000), 100_000);
}

#[test]
fn test_passes_result_through() {
    let result: Result<i32, &str> = ensure_sufficient_stack(|| Err("boom"));
    assert_eq!(result, Err("boom"));
}

#[test]
fn test_depth_counter_limit() {
    let mut depth = DepthCounter::new(2);
    assert_eq!(depth.enter(), Ok(()));
    assert_eq!(depth.enter(), Ok(()));
    assert_eq!(depth.enter(), Err(DepthExceeded { limit: 2 }));
    assert_eq!(depth.depth(), 2);

    depth.leave();
    assert_eq!(depth.enter(), Ok(()));
}

#[test]
fn test_depth_counter_reset_and_saturation() {
    let mut depth = DepthCounter::new(10);
    depth.leave();
    assert_eq!(depth.depth(), 0);

    depth.enter().ok();
    depth.enter().ok();
    depth.reset();
    assert_eq!(depth.depth(), 0);
}
