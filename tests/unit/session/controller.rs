use std::{cell::RefCell, rc::Rc};

use super::*;
use crate::{
    assets::decode::PreparedImage,
    foundation::core::Point,
    input::tracker::KeyCommand,
    layers::compositor::{Layer, LayerFrame},
    mesh::{compositor::MeshFrame, surface::Surface},
    provider::response::LayerPayload,
};

#[derive(Debug, Default)]
struct Calls {
    attached: u32,
    presented: u32,
    released: u32,
}

struct Recorder {
    mesh: bool,
    calls: Rc<RefCell<Calls>>,
}

impl Presenter for Recorder {
    fn supports_mesh(&self) -> bool {
        self.mesh
    }

    fn attach_layers(&mut self, _viewport: Canvas, _layers: &[Layer]) -> DepthliftResult<()> {
        self.calls.borrow_mut().attached += 1;
        Ok(())
    }

    fn attach_mesh(&mut self, _render_size: Canvas, _surface: &Surface) -> DepthliftResult<()> {
        self.calls.borrow_mut().attached += 1;
        Ok(())
    }

    fn resize(&mut self, _viewport: Canvas) -> DepthliftResult<()> {
        Ok(())
    }

    fn present_layers(&mut self, _layers: &[Layer], _frame: &LayerFrame) {
        self.calls.borrow_mut().presented += 1;
    }

    fn present_mesh(&mut self, _surface: &Surface, _frame: &MeshFrame) {
        self.calls.borrow_mut().presented += 1;
    }

    fn last_frame(&self) -> Option<&FrameRGBA> {
        None
    }

    fn release(&mut self) {
        self.calls.borrow_mut().released += 1;
    }
}

struct Solid;

impl ImageLoader for Solid {
    fn load(&self, _reference: &str) -> DepthliftResult<PreparedImage> {
        PreparedImage::from_premul(4, 2, vec![255; 32])
    }
}

fn controller(mesh: bool) -> (RenderSessionController, Rc<RefCell<Calls>>) {
    let calls = Rc::new(RefCell::new(Calls::default()));
    let presenter = Recorder {
        mesh,
        calls: Rc::clone(&calls),
    };
    let mut cfg = SessionConfig::default();
    cfg.mesh.segments = 4;
    let c = RenderSessionController::new(cfg, Box::new(presenter), Canvas::new(400, 200).unwrap());
    (c, calls)
}

fn layered(n: usize) -> ProviderResponse {
    ProviderResponse {
        success: true,
        width: 4,
        height: 2,
        layers: (0..n)
            .map(|i| LayerPayload {
                data: format!("layer_{i}.png"),
                depth: 0.5,
                name: String::new(),
                index: i as i64,
            })
            .collect(),
        ..ProviderResponse::default()
    }
}

fn meshy() -> ProviderResponse {
    ProviderResponse {
        success: true,
        image: Some("image.png".to_string()),
        depth_data: Some(vec![vec![0.0, 1.0], vec![0.0, 1.0]]),
        width: 4,
        height: 2,
        use_mesh: true,
        ..ProviderResponse::default()
    }
}

#[test]
fn starts_idle_and_does_not_tick() {
    let (mut c, calls) = controller(true);
    assert_eq!(c.state(), SessionState::Idle);
    assert_eq!(c.tick(), TickOutcome::Stopped);
    assert_eq!(calls.borrow().presented, 0);
}

#[test]
fn load_activates_and_starts_the_loop() {
    let (mut c, calls) = controller(true);
    assert_eq!(c.load(&layered(3), &Solid).unwrap(), StrategyKind::Layers);
    assert_eq!(c.state(), SessionState::Active(StrategyKind::Layers));
    assert!(c.is_running());
    assert_eq!(calls.borrow().attached, 1);

    assert!(matches!(c.tick(), TickOutcome::Presented { tick: 0, .. }));
    assert_eq!(calls.borrow().presented, 1);
}

#[test]
fn pointer_at_center_then_leave_decays_to_rest() {
    let (mut c, _) = controller(false);
    c.load(&layered(2), &Solid).unwrap();

    c.push_event(InputEvent::PointerMove {
        position: Point::new(200.0, 100.0),
    });
    c.tick();
    assert_eq!(c.input_state().target, NormVec::ZERO);
    assert_eq!(c.input_state().current, NormVec::ZERO);

    c.push_event(InputEvent::PointerMove {
        position: Point::new(300.0, 100.0),
    });
    c.tick();
    let s = c.input_state();
    assert!((s.target.x - 0.5).abs() < 1e-12);
    assert!((s.current.x - 0.06).abs() < 1e-12);

    c.push_event(InputEvent::PointerLeave);
    c.tick();
    let s = c.input_state();
    assert_eq!(s.target, NormVec::ZERO);
    assert!((s.current.x - 0.0528).abs() < 1e-12);

    let mut prev = s.current.x;
    for _ in 0..200 {
        c.tick();
        let x = c.input_state().current.x;
        assert!(x <= prev);
        prev = x;
    }
    assert_eq!(c.input_state().current, NormVec::ZERO);
    assert!(matches!(c.tick(), TickOutcome::Presented { moving: false, .. }));
}

#[test]
fn events_wait_for_the_next_tick() {
    let (mut c, _) = controller(false);
    c.load(&layered(1), &Solid).unwrap();
    c.push_event(InputEvent::TouchMove {
        position: Point::new(400.0, 200.0),
    });
    assert_eq!(c.input_state().target, NormVec::ZERO);
    c.tick();
    assert_eq!(c.input_state().target, NormVec::new(1.0, 1.0));
}

#[test]
fn keyboard_adjusts_strength_and_resets() {
    let (mut c, _) = controller(false);
    c.load(&layered(1), &Solid).unwrap();

    c.push_event(InputEvent::Key(KeyCommand::StrengthUp));
    c.tick();
    assert_eq!(c.config().parallax_strength, 35.0);

    for _ in 0..30 {
        c.push_event(InputEvent::Key(KeyCommand::StrengthUp));
    }
    c.tick();
    assert_eq!(c.config().parallax_strength, 100.0);

    c.push_event(InputEvent::PointerMove {
        position: Point::new(0.0, 0.0),
    });
    c.push_event(InputEvent::Key(KeyCommand::Reset));
    c.tick();
    assert_eq!(c.input_state().target, NormVec::ZERO);
}

#[test]
fn gyro_only_moves_target_when_enabled() {
    let (mut c, _) = controller(false);
    c.load(&layered(1), &Solid).unwrap();
    let tilt = InputEvent::Orientation {
        beta: Some(135.0),
        gamma: Some(-22.5),
    };

    c.push_event(tilt);
    c.tick();
    assert_eq!(c.input_state().target, NormVec::ZERO);

    c.config_mut().gyro_enabled = true;
    c.push_event(tilt);
    c.tick();
    assert_eq!(c.input_state().target, NormVec::new(-0.5, 1.0));
}

#[test]
fn wheel_zooms_the_mesh() {
    let (mut c, calls) = controller(true);
    assert_eq!(c.load(&meshy(), &Solid).unwrap(), StrategyKind::Mesh);
    c.push_event(InputEvent::Wheel { delta_y: 100.0 });
    c.tick();
    let Some(PreparedStrategy::Mesh(mesh)) = c.strategy() else {
        panic!("mesh strategy expected");
    };
    assert!((mesh.zoom() - 1.1).abs() < 1e-12);
    assert_eq!(calls.borrow().presented, 1);
}

#[test]
fn mesh_is_skipped_without_presenter_support() {
    let (mut c, _) = controller(false);
    let mut response = meshy();
    response.layers = layered(2).layers;
    assert_eq!(c.load(&response, &Solid).unwrap(), StrategyKind::Layers);
}

#[test]
fn malformed_grid_without_layers_leaves_controller_idle() {
    let (mut c, _) = controller(true);
    c.load(&layered(2), &Solid).unwrap();

    let mut response = meshy();
    response.depth_data = Some(Vec::new());
    let err = c.load(&response, &Solid).unwrap_err();
    assert!(matches!(err, DepthliftError::MalformedDepthData(_)));
    assert_eq!(c.state(), SessionState::Idle);
    assert!(c.strategy().is_none());
    assert!(c.last_error().unwrap().starts_with("malformed depth data"));
    assert_eq!(c.tick(), TickOutcome::Stopped);

    c.load(&layered(1), &Solid).unwrap();
    assert!(c.last_error().is_none());
}

#[test]
fn teardown_twice_is_harmless_and_stops_frames() {
    let (mut c, calls) = controller(true);
    c.load(&layered(2), &Solid).unwrap();
    c.tick();
    c.teardown();
    c.teardown();
    assert_eq!(c.state(), SessionState::Idle);
    assert_eq!(c.tick(), TickOutcome::Stopped);
    assert_eq!(calls.borrow().presented, 1);
    assert!(calls.borrow().released >= 2);
}

#[test]
fn stale_builds_are_discarded() {
    let (mut c, _) = controller(true);
    let first = c.begin_build();
    let second = c.begin_build();
    assert_eq!(c.state(), SessionState::Building);

    let built = prepare_strategy(
        &layered(2),
        &Solid,
        c.config(),
        true,
        Canvas::new(400, 200).unwrap(),
    );
    assert_eq!(
        c.complete_build(first, built).unwrap(),
        BuildOutcome::Discarded
    );
    assert_eq!(c.state(), SessionState::Building);

    let built = prepare_strategy(&meshy(), &Solid, c.config(), true, c.viewport());
    assert_eq!(
        c.complete_build(second, built).unwrap(),
        BuildOutcome::Active(StrategyKind::Mesh)
    );
    assert_eq!(c.strategy_kind(), Some(StrategyKind::Mesh));
}

#[test]
fn teardown_invalidates_a_build_in_flight() {
    let (mut c, _) = controller(true);
    let ticket = c.begin_build();
    c.teardown();
    let built = prepare_strategy(&layered(1), &Solid, c.config(), true, c.viewport());
    assert_eq!(
        c.complete_build(ticket, built).unwrap(),
        BuildOutcome::Discarded
    );
    assert_eq!(c.state(), SessionState::Idle);
}

#[test]
fn new_build_tears_down_the_previous_session() {
    let (mut c, calls) = controller(true);
    c.load(&meshy(), &Solid).unwrap();
    let released = calls.borrow().released;
    c.load(&layered(1), &Solid).unwrap();
    assert!(calls.borrow().released > released);
    assert_eq!(c.strategy_kind(), Some(StrategyKind::Layers));
}

#[test]
fn failed_provider_response_is_reported() {
    let (mut c, _) = controller(true);
    let response = ProviderResponse {
        success: false,
        error: Some("quota exceeded".to_string()),
        ..ProviderResponse::default()
    };
    let err = c.load(&response, &Solid).unwrap_err();
    assert!(matches!(err, DepthliftError::Provider(_)));
    assert_eq!(c.last_error(), Some("provider error: quota exceeded"));
}

#[test]
fn record_requires_an_active_session() {
    let (mut c, _) = controller(true);
    let mut sink = crate::encode::sink::InMemorySink::new();
    assert!(c.record(3, &mut sink, |_| Vec::new()).is_err());
}

#[test]
fn mesh_rotation_follows_the_uncurved_pointer() {
    let (mut c, _) = controller(true);
    c.config_mut().mesh.rotation_speed = 1.0;
    assert_eq!(c.load(&meshy(), &Solid).unwrap(), StrategyKind::Mesh);

    c.push_event(InputEvent::PointerMove {
        position: Point::new(250.0, 100.0),
    });
    c.tick();

    assert_eq!(c.mesh_target(), NormVec::new(0.25, 0.0));
    // The layer path still sees the curved value.
    assert!((c.input_state().target.x - 0.125).abs() < 1e-12);
    let Some(PreparedStrategy::Mesh(mesh)) = c.strategy() else {
        panic!("expected mesh strategy");
    };
    let max_rotation = c.config().mesh.max_rotation;
    assert_eq!(mesh.rotation().1, 0.25 * max_rotation);
    assert_eq!(mesh.rotation().0, 0.0);

    c.push_event(InputEvent::PointerLeave);
    c.tick();
    assert_eq!(c.mesh_target(), NormVec::ZERO);
}
