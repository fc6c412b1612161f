use super::*;

#[test]
fn distance_fits_plane_with_margin() {
    let cam = CameraFit::for_plane(400.0, 300.0, 45.0, 1.5).unwrap();
    let expected = 150.0 / (22.5f32.to_radians()).tan() * 1.5;
    assert!((cam.distance - expected).abs() < 1e-3);
    assert!((cam.aspect - 4.0 / 3.0).abs() < 1e-6);
    assert!(cam.far >= 5000.0);
}

#[test]
fn large_planes_push_far_plane_out() {
    let cam = CameraFit::for_plane(6000.0, 4000.0, 45.0, 1.5).unwrap();
    assert!(cam.far > cam.distance * 2.0);
}

#[test]
fn margin_keeps_plane_inside_view() {
    let viewport = Canvas::new(400, 300).unwrap();
    let cam = CameraFit::for_plane(400.0, 300.0, 45.0, 1.5).unwrap();
    let vp = cam.view_proj();

    let center = project(vp, Vec3::ZERO, viewport).unwrap();
    assert!((center.x - 200.0).abs() < 1e-3);
    assert!((center.y - 150.0).abs() < 1e-3);

    let top_left = project(vp, Vec3::new(-200.0, 150.0, 0.0), viewport).unwrap();
    assert!(top_left.x > 0.0 && top_left.y > 0.0);
    // With margin 1.5 the plane covers two thirds of the view.
    assert!((top_left.y - 50.0).abs() < 0.5);
}

#[test]
fn nearer_points_have_smaller_depth() {
    let viewport = Canvas::new(100, 100).unwrap();
    let cam = CameraFit::for_plane(100.0, 100.0, 45.0, 1.5).unwrap();
    let a = project(cam.view_proj(), Vec3::new(0.0, 0.0, 0.0), viewport).unwrap();
    let b = project(cam.view_proj(), Vec3::new(0.0, 0.0, 20.0), viewport).unwrap();
    assert!(b.depth < a.depth);
}

#[test]
fn fit_keeps_aspect_inside_container() {
    let container = Canvas::new(800, 600).unwrap();
    assert_eq!(
        fit_render_size(container, 2.0),
        Canvas {
            width: 800,
            height: 400
        }
    );
    assert_eq!(
        fit_render_size(container, 0.5),
        Canvas {
            width: 300,
            height: 600
        }
    );
}

#[test]
fn rejects_degenerate_inputs() {
    assert!(CameraFit::for_plane(0.0, 10.0, 45.0, 1.5).is_err());
    assert!(CameraFit::for_plane(10.0, 10.0, 180.0, 1.5).is_err());
}
