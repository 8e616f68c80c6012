use super::*;
use crate::foundation::core::Canvas;
use crate::render::backend::read_frame_rgba8;
use crate::render::text::FontSource;

fn renderer() -> ThumbnailRenderer {
    let canvas = Canvas {
        width: 108,
        height: 192,
    };
    ThumbnailRenderer::new(FrameComposer::new(canvas, FontSource::layout_only()).unwrap())
}

fn product() -> Product {
    Product::new("p1", "Curso de Marketing Digital", 297.0, "Eduzz")
}

#[test]
fn play_button_is_centered() {
    let f = renderer().render(&product()).unwrap();
    // Disc above the triangle, design (540, 900).
    let disc = f.pixel(54, 90).unwrap();
    assert!(disc[0] > 230 && disc[1] > 230 && disc[2] > 230, "{disc:?}");
    // Triangle interior, design (535, 965).
    let glyph = f.pixel(53, 96).unwrap();
    assert!(glyph[0] < 0x60 && glyph[1] < 0x60 && glyph[2] < 0x60, "{glyph:?}");
}

#[test]
fn thumbnail_has_badge_but_no_overlay() {
    let f = renderer().render(&product()).unwrap();
    assert_eq!(&f.pixel(14, 13).unwrap()[..3], &[0x42, 0x85, 0xf4]);
    // The CTA box region keeps the plain background.
    let cta = f.pixel(20, 141).unwrap();
    assert!(cta[2] > cta[0], "{cta:?}");
    // No progress bar.
    let bar = f.pixel(10, 180).unwrap();
    assert_ne!(&bar[..3], &[255, 255, 255]);
}

#[test]
fn render_is_deterministic() {
    let r = renderer();
    assert_eq!(
        r.render(&product()).unwrap().data,
        r.render(&product()).unwrap().data
    );
}

#[test]
fn writes_jpeg_with_frame_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("thumb.jpg");
    renderer().render_to(&product(), &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], &[0xff, 0xd8]);
    let (canvas, _) = read_frame_rgba8(&path).unwrap();
    assert_eq!((canvas.width, canvas.height), (108, 192));
}

#[test]
fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope").join("thumb.jpg");
    assert!(renderer().render_to(&product(), &path).is_err());
}
