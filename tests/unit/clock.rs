use super::*;

#[test]
fn manual_clock_is_shared_between_clones() {
    let a = ManualClock::new(1.5);
    let b = a.clone();
    a.advance(0.25);
    assert_eq!(b.now_secs(), 1.75);
    b.set(10.0);
    assert_eq!(a.now_secs(), 10.0);
    assert_eq!(ManualClock::default().now_secs(), 0.0);
}

#[test]
fn system_clock_is_monotonic() {
    let c = SystemClock::new();
    let t0 = c.now_secs();
    let t1 = c.now_secs();
    assert!(t1 >= t0);
    assert!(t0 >= 0.0);
}
