use super::*;

fn solid(width: u32, height: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: px.repeat((width * height) as usize),
        premultiplied: true,
    }
}

#[test]
fn flatten_premul_over_black_produces_expected_rgb() {
    // Premultiplied red @ 50% alpha => rgb is 128,0,0 when premul.
    let src = vec![128u8, 0u8, 0u8, 128u8];
    let mut dst = vec![0u8; 4];
    flatten_over_bg_to_opaque_rgba8(&mut dst, &src, true, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128u8, 0u8, 0u8, 255u8]);
}

#[test]
fn flatten_straight_over_black_produces_expected_rgb() {
    let src = vec![255u8, 0u8, 0u8, 128u8];
    let mut dst = vec![0u8; 4];
    flatten_over_bg_to_opaque_rgba8(&mut dst, &src, false, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128u8, 0u8, 0u8, 255u8]);
}

#[test]
fn flatten_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_over_bg_to_opaque_rgba8(&mut dst, &src, true, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_over_bg_to_opaque_rgba8(&mut dst, &[0u8; 4], true, [0, 0, 0, 255]).is_err());
}

#[test]
fn pixel_unpremultiplies() {
    let f = solid(2, 2, [64, 0, 0, 128]);
    let px = f.pixel(1, 1).unwrap();
    assert_eq!(px[3], 128);
    assert!((i32::from(px[0]) - 128).abs() <= 1);
    assert!(f.pixel(2, 0).is_none());
}

#[test]
fn png_and_jpeg_are_written_at_frame_size() {
    let dir = tempfile::tempdir().unwrap();
    let f = solid(8, 16, [10, 200, 30, 255]);

    let png = dir.path().join("f.png");
    f.write_png(&png).unwrap();
    let (canvas, rgba) = read_frame_rgba8(&png).unwrap();
    assert_eq!(canvas, f.canvas());
    assert_eq!(&rgba[..4], &[10, 200, 30, 255]);

    let jpg = dir.path().join("t.jpg");
    f.write_jpeg(&jpg, 90).unwrap();
    let decoded = image::open(&jpg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (8, 16));
    assert_eq!(
        image::ImageFormat::from_path(&jpg).unwrap(),
        image::ImageFormat::Jpeg
    );
}

#[test]
fn reading_a_missing_frame_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(read_frame_rgba8(&dir.path().join("nope.png")).is_err());
}
