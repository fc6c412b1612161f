use super::*;

fn frame(data: Vec<u8>, premultiplied: bool) -> FrameRGBA {
    FrameRGBA {
        width: (data.len() / 4) as u32,
        height: 1,
        data,
        premultiplied,
    }
}

#[test]
fn pixel_lookup_is_bounds_checked() {
    let f = frame(vec![1, 2, 3, 4, 5, 6, 7, 8], true);
    assert_eq!(f.pixel(1, 0), Some([5, 6, 7, 8]));
    assert_eq!(f.pixel(2, 0), None);
    assert_eq!(f.pixel(0, 1), None);
}

#[test]
fn straight_alpha_undoes_premultiplication() {
    let f = frame(vec![64, 32, 0, 128, 10, 20, 30, 255, 0, 0, 0, 0], true);
    let out = f.to_straight_rgba8();
    assert_eq!(&out[0..4], &[128, 64, 0, 128]);
    assert_eq!(&out[4..8], &[10, 20, 30, 255]);
    assert_eq!(&out[8..12], &[0, 0, 0, 0]);
}

#[test]
fn straight_frames_pass_through() {
    let f = frame(vec![200, 100, 50, 10], false);
    assert_eq!(f.to_straight_rgba8(), vec![200, 100, 50, 10]);
}

#[test]
fn cpu_backend_is_always_available() {
    let backend = create_backend(BackendKind::Cpu, &RenderSettings::default()).unwrap();
    assert!(backend.supports_mesh());
    assert!(backend.last_frame().is_none());
}
