use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_bytes(1, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn transparent_pixels_are_zeroed() {
    let prepared = decode_image(&png_bytes(2, 1, [255, 255, 255, 0])).unwrap();
    assert_eq!(prepared.rgba8_premul.as_slice(), &[0u8; 8]);
}

#[test]
fn garbage_is_a_decode_error() {
    let err = decode_image(b"definitely not a png").unwrap_err();
    assert!(matches!(err, DepthliftError::Decode(_)));
}

#[test]
fn from_premul_checks_length() {
    assert!(PreparedImage::from_premul(2, 2, vec![0; 16]).is_ok());
    assert!(PreparedImage::from_premul(2, 2, vec![0; 15]).is_err());
    assert!(PreparedImage::from_premul(0, 2, vec![]).is_err());
}
