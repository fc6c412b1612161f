use super::*;

#[test]
fn step_moves_by_factor() {
    assert_eq!(smooth_step(0.0, 1.0, 0.25), 0.25);
    assert_eq!(smooth_step(0.5, 0.5, 0.12), 0.5);
    assert_eq!(smooth_step(-1.0, 1.0, 1.0), 1.0);
}

#[test]
fn iteration_converges_to_target() {
    for factor in [0.01, 0.08, 0.12, 0.5, 1.0] {
        let mut v = -1.0;
        let mut steps = 0;
        while (v - 0.7f64).abs() > 1e-6 {
            v = smooth_axis(v, 0.7, factor);
            steps += 1;
            assert!(steps < 10_000, "no convergence for factor {factor}");
        }
    }
}

#[test]
fn snap_only_near_zero_on_both_sides() {
    // Target at rest, current close: snaps.
    assert_eq!(smooth_axis(0.0005, 0.0, 0.5), 0.0);
    // Target away from zero: never snaps even when current is tiny.
    let v = smooth_axis(0.0001, 0.5, 0.001);
    assert!(v != 0.0);
    // Current still far from zero: plain step.
    assert_eq!(smooth_axis(0.5, 0.0, 0.5), 0.25);
}

#[test]
fn decay_reaches_exact_zero() {
    let mut s = Smoothed2 {
        current: NormVec::new(0.8, -0.6),
        target: NormVec::ZERO,
    };
    let mut ticks = 0;
    while !s.is_settled() {
        s.advance(0.12);
        ticks += 1;
        assert!(ticks < 1_000);
    }
    assert_eq!(s.current, NormVec::ZERO);
    assert!(!s.advance(0.12));
}
