use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    let c = Canvas::new(200, 100).unwrap();
    assert_eq!(c.aspect(), 2.0);
    assert_eq!(c.center(), Point::new(100.0, 50.0));
}

#[test]
fn norm_vec_clamps_each_axis() {
    let v = NormVec::new(1.5, -3.0).clamped();
    assert_eq!(v, NormVec::new(1.0, -1.0));
    assert_eq!(NormVec::new(0.5, -0.25).scale(2.0), NormVec::new(1.0, -0.5));
}
