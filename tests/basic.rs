//! Basic integration tests for the fsync admission engine.

use fsync_control::{Decision, FlushPolicy, FsyncControl, StreakOnEnable};

fn decisions(control: &FsyncControl, n: usize) -> Vec<bool> {
    (0..n).map(|_| control.should_fsync()).collect()
}

#[test]
fn default_policy_forces_on_call_1002() {
    let control = FsyncControl::new();
    assert_eq!(control.policy(), FlushPolicy::default());

    // Calls 1..=1001 are skipped.
    assert!(decisions(&control, 1000).iter().all(|d| !d));
    assert!(!control.should_fsync());

    // Call 1002 is forced and the streak resets.
    assert!(control.should_fsync());
    assert_eq!(control.skip_streak(), 0);

    // Call 1003 is skipped again.
    assert!(!control.should_fsync());
}

#[test]
fn enabled_always_fsyncs() {
    let control = FsyncControl::builder().force_interval(3).build();
    let _ = decisions(&control, 4);
    control.set_enabled(true);

    // Regardless of the accumulated streak.
    assert!(decisions(&control, 500).iter().all(|d| *d));
}

#[test]
fn enabled_is_absorbing_for_every_streak() {
    let k = 6;
    for prior in 0..=(k + 2) {
        let control = FsyncControl::builder().force_interval(k).build();
        let _ = decisions(&control, prior as usize);
        control.set_enabled(true);
        assert!(control.should_fsync(), "prior streak {prior}");
    }
}

#[test]
fn zero_interval_never_forces() {
    let control = FsyncControl::new();
    control.set_force_interval(0);
    assert!(decisions(&control, 10_000).iter().all(|d| !d));
}

#[test]
fn any_window_of_interval_plus_two_has_an_fsync() {
    for k in [1_u32, 2, 5, 17, 64] {
        let control = FsyncControl::builder().force_interval(k).build();
        let window = k as usize + 2;
        let seq = decisions(&control, window * 5);
        for (start, w) in seq.windows(window).enumerate() {
            assert!(w.iter().any(|d| *d), "k={k} window starting at {start}");
        }
    }
}

#[test]
fn next_interval_calls_after_force_are_skipped() {
    let k = 10_u32;
    let control = FsyncControl::builder().force_interval(k).build();

    let first_forced = (0..)
        .map(|_| control.decide())
        .position(|d| d == Decision::Forced)
        .expect("forced fsync");
    assert_eq!(first_forced, k as usize + 1);
    assert_eq!(control.skip_streak(), 0);

    assert!(decisions(&control, k as usize).iter().all(|d| !d));
}

#[test]
fn interval_change_applies_to_next_call() {
    let control = FsyncControl::new();
    let _ = decisions(&control, 10);
    assert_eq!(control.skip_streak(), 10);

    // Lowering the interval below the streak forces immediately.
    control.set_force_interval(5);
    assert_eq!(control.decide(), Decision::Forced);
    assert_eq!(control.decide(), Decision::Skipped);
}

#[test]
fn streak_survives_enabled_period_by_default() {
    let control = FsyncControl::builder().force_interval(4).build();
    let _ = decisions(&control, 5);
    assert_eq!(control.skip_streak(), 5);

    control.set_enabled(true);
    let _ = decisions(&control, 100);
    control.set_enabled(false);

    // Streak 5 > 4: the first disabled call is forced.
    assert_eq!(control.decide(), Decision::Forced);
}

#[test]
fn streak_restarts_after_enable_when_configured() {
    let control = FsyncControl::builder()
        .force_interval(4)
        .streak_on_enable(StreakOnEnable::Reset)
        .build();
    let _ = decisions(&control, 5);

    control.set_enabled(true);
    control.set_enabled(false);

    // Fresh cycle: five skips before the force.
    assert!(decisions(&control, 5).iter().all(|d| !d));
    assert_eq!(control.decide(), Decision::Forced);
}

#[test]
fn independent_instances() {
    let a = FsyncControl::builder().force_interval(1).build();
    let b = FsyncControl::builder().force_interval(1).build();
    let _ = decisions(&a, 2);
    assert_eq!(a.skip_streak(), 2);
    assert_eq!(b.skip_streak(), 0);
    assert_eq!(a.decide(), Decision::Forced);
    assert_eq!(b.decide(), Decision::Skipped);
}

#[test]
fn preset_policies() {
    let all = FsyncControl::with_policy(FlushPolicy::honor_all());
    assert!(decisions(&all, 10).iter().all(|d| *d));

    let none = FsyncControl::with_policy(FlushPolicy::skip_all());
    assert!(!none.policy().forces());
    assert!(decisions(&none, 10).iter().all(|d| !d));
}
