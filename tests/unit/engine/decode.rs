use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, rgba: Vec<u8>) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(w, h, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_dimensions_and_premul() {
    let decoded = decode_image(&png_bytes(1, 1, vec![100, 50, 200, 128])).unwrap();
    assert_eq!((decoded.width, decoded.height), (1, 1));
    assert_eq!(
        decoded.rgba8_premul,
        vec![
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn garbage_and_empty_bytes_are_resource_errors() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, CanopyError::Resource(_)));

    let err = decode_image(&[]).unwrap_err();
    assert!(err.to_string().contains("empty image"));
}

#[test]
fn premultiply_zeroes_transparent_pixels() {
    let mut px = vec![255, 255, 255, 0, 255, 0, 0, 255];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0, 255, 0, 0, 255]);
}
