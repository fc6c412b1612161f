use super::*;

fn tracker() -> InputTracker {
    InputTracker::new(Rect::new(100.0, 50.0, 500.0, 250.0), Ease::InOutQuad)
}

#[test]
fn pointer_at_center_is_zero() {
    let mut t = tracker();
    let action = t.handle(
        &InputEvent::PointerMove {
            position: Point::new(300.0, 150.0),
        },
        false,
    );
    assert_eq!(
        action,
        InputAction::SetPointer {
            eased: NormVec::ZERO,
            raw: NormVec::ZERO
        }
    );
}

#[test]
fn pointer_is_eased_and_keeps_sign() {
    let mut t = tracker();
    // Halfway between center and left edge: raw x = -0.5, eased magnitude 0.5.
    // Three quarters down: raw y = 0.5.
    let action = t.handle(
        &InputEvent::PointerMove {
            position: Point::new(200.0, 200.0),
        },
        false,
    );
    let InputAction::SetPointer { eased: v, raw } = action else {
        panic!("expected pointer target");
    };
    assert!((v.x + 0.5).abs() < 1e-12);
    assert!((v.y - 0.5).abs() < 1e-12);
    assert_eq!(raw, NormVec::new(-0.5, 0.5));

    let action = t.handle(
        &InputEvent::PointerMove {
            position: Point::new(250.0, 100.0),
        },
        false,
    );
    let InputAction::SetPointer { eased: v, raw } = action else {
        panic!("expected pointer target");
    };
    // raw -0.25 -> eased -(2 * 0.0625)
    assert!((v.x + 0.125).abs() < 1e-12);
    assert!((v.y + 0.5).abs() < 1e-12);
    assert_eq!(raw, NormVec::new(-0.25, -0.5));
}

#[test]
fn touch_is_not_eased() {
    let mut t = tracker();
    assert_eq!(
        t.handle(
            &InputEvent::TouchStart {
                position: Point::new(250.0, 100.0)
            },
            false
        ),
        InputAction::Ignore
    );
    assert_eq!(t.touch_origin(), Some(Point::new(250.0, 100.0)));
    let action = t.handle(
        &InputEvent::TouchMove {
            position: Point::new(250.0, 100.0),
        },
        false,
    );
    assert_eq!(action, InputAction::SetTarget(NormVec::new(-0.25, -0.5)));
    assert_eq!(t.handle(&InputEvent::TouchEnd, false), InputAction::ResetTarget);
    assert_eq!(t.touch_origin(), None);
}

#[test]
fn leave_resets_target() {
    let mut t = tracker();
    assert_eq!(
        t.handle(&InputEvent::PointerLeave, false),
        InputAction::ResetTarget
    );
    assert_eq!(
        t.handle(&InputEvent::Key(KeyCommand::Reset), false),
        InputAction::ResetTarget
    );
}

#[test]
fn orientation_requires_gyro_flag() {
    let mut t = tracker();
    let ev = InputEvent::Orientation {
        beta: Some(112.5),
        gamma: Some(-22.5),
    };
    assert_eq!(t.handle(&ev, false), InputAction::Ignore);
    assert_eq!(
        t.handle(&ev, true),
        InputAction::SetTarget(NormVec::new(-0.5, 0.5))
    );

    let partial = InputEvent::Orientation {
        beta: None,
        gamma: Some(10.0),
    };
    assert_eq!(t.handle(&partial, true), InputAction::Ignore);
}

#[test]
fn orientation_vector_is_clamped() {
    assert_eq!(orientation_vector(0.0, 90.0), NormVec::new(1.0, -1.0));
    assert_eq!(orientation_vector(180.0, -90.0), NormVec::new(-1.0, 1.0));
    assert_eq!(orientation_vector(90.0, 0.0), NormVec::ZERO);
}

#[test]
fn keys_map_to_commands() {
    assert_eq!(KeyCommand::from_key("ArrowUp"), Some(KeyCommand::StrengthUp));
    assert_eq!(KeyCommand::from_key("ArrowDown"), Some(KeyCommand::StrengthDown));
    assert_eq!(KeyCommand::from_key("R"), Some(KeyCommand::Reset));
    assert_eq!(KeyCommand::from_key("x"), None);

    let mut t = tracker();
    assert_eq!(
        t.handle(&InputEvent::Key(KeyCommand::StrengthDown), false),
        InputAction::AdjustStrength(-1)
    );
    assert_eq!(
        t.handle(&InputEvent::Wheel { delta_y: 3.0 }, false),
        InputAction::Zoom { delta_y: 3.0 }
    );
}
