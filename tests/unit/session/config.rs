use super::*;

#[test]
fn defaults_match_viewer_behavior() {
    let cfg = SessionConfig::default();
    assert_eq!(cfg.parallax_strength, 30.0);
    assert_eq!(cfg.smoothness, 0.12);
    assert_eq!(cfg.depth_scale(), 50.0);
    assert_eq!(cfg.mesh.depth_scale, 60.0);
    assert_eq!(cfg.mesh.segments, 128);
    assert!(cfg.validate().is_ok());
}

#[test]
fn partial_json_fills_defaults() {
    let cfg: SessionConfig =
        serde_json::from_str(r#"{"smoothness": 0.5, "mesh": {"segments": 8}}"#).unwrap();
    assert_eq!(cfg.smoothness, 0.5);
    assert_eq!(cfg.mesh.segments, 8);
    assert_eq!(cfg.mesh.depth_scale, 60.0);
    assert_eq!(cfg.parallax_strength, 30.0);
}

#[test]
fn sanitize_applies_control_clamps() {
    let cfg = SessionConfig {
        parallax_strength: 250.0,
        smoothness: 0.0,
        depth_intensity: -1.0,
        max_layers: 0,
        ..SessionConfig::default()
    }
    .sanitized();
    assert_eq!(cfg.parallax_strength, 100.0);
    assert_eq!(cfg.smoothness, 0.01);
    assert_eq!(cfg.depth_intensity, 0.0);
    assert_eq!(cfg.max_layers, 1);
}

#[test]
fn strength_steps_are_clamped() {
    let mut cfg = SessionConfig {
        parallax_strength: 97.0,
        ..SessionConfig::default()
    };
    cfg.nudge_strength(1);
    assert_eq!(cfg.parallax_strength, 100.0);
    cfg.parallax_strength = 3.0;
    cfg.nudge_strength(-1);
    assert_eq!(cfg.parallax_strength, 0.0);
}

#[test]
fn validate_rejects_bad_numbers() {
    let mut cfg = SessionConfig::default();
    cfg.smoothness = f64::NAN;
    assert!(cfg.validate().is_err());

    let mut cfg = SessionConfig::default();
    cfg.mesh.zoom_min = 4.0;
    assert!(cfg.validate().is_err());
}
