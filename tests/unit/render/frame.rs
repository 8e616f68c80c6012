use super::*;
use crate::foundation::core::Rgba8;
use crate::render::text::approx_text_width;

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Gradient,
    Rect(Rect, Rgba8),
    Text(String, Point, f32),
    Push(f32),
    Pop,
}

#[derive(Default)]
struct RecordingSurface {
    ops: Vec<Op>,
}

impl Surface for RecordingSurface {
    fn canvas(&self) -> Canvas {
        Canvas::PORTRAIT_HD
    }
    fn fill_gradient(&mut self, _rect: Rect, _top: Rgba8, _bottom: Rgba8) -> ReelResult<()> {
        self.ops.push(Op::Gradient);
        Ok(())
    }
    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.ops.push(Op::Rect(rect, color));
    }
    fn fill_circle(&mut self, _center: Point, _radius: f64, _color: Rgba8) {}
    fn fill_triangle(&mut self, _points: [Point; 3], _color: Rgba8) {}
    fn measure_text(&mut self, text: &str, size_px: f32) -> f32 {
        approx_text_width(text, size_px)
    }
    fn fill_text(&mut self, text: &str, anchor: Point, style: TextStyle) -> ReelResult<()> {
        self.ops
            .push(Op::Text(text.to_string(), anchor, style.size_px));
        Ok(())
    }
    fn push_opacity(&mut self, alpha: f32) {
        self.ops.push(Op::Push(alpha));
    }
    fn pop_opacity(&mut self) {
        self.ops.push(Op::Pop);
    }
    fn finish(&mut self) -> ReelResult<FrameRGBA> {
        Err(ReelError::render("recording surface has no pixels"))
    }
}

fn product() -> Product {
    Product::new("p1", "Curso de Marketing Digital", 297.0, "Hotmart")
}

fn small_composer() -> FrameComposer {
    let canvas = Canvas {
        width: 108,
        height: 192,
    };
    FrameComposer::new(canvas, FontSource::layout_only()).unwrap()
}

#[test]
fn progress_is_index_over_total() {
    for total in [1u64, 7, 300] {
        let mut prev = -1.0;
        for i in 0..total {
            let l = FrameLayout::at(i, total).unwrap();
            assert_eq!(l.progress, i as f64 / total as f64);
            assert!(l.progress >= prev);
            assert!(l.progress < 1.0);
            prev = l.progress;
        }
    }
}

#[test]
fn out_of_range_frames_are_rejected() {
    assert!(FrameLayout::at(0, 0).is_err());
    assert!(FrameLayout::at(5, 5).is_err());
}

#[test]
fn title_and_price_bob_a_quarter_turn_apart() {
    let start = FrameLayout::at(0, 4).unwrap();
    assert!((start.title_y - 300.0).abs() < 1e-9);
    assert!((start.price_y - 615.0).abs() < 1e-9);

    let quarter = FrameLayout::at(1, 4).unwrap();
    assert!((quarter.title_y - 320.0).abs() < 1e-9);
    assert!((quarter.price_y - 600.0).abs() < 1e-9);
}

#[test]
fn cta_hidden_until_final_third() {
    assert_eq!(cta_alpha(0.0), 0.0);
    assert_eq!(cta_alpha(0.5), 0.0);
    assert_eq!(cta_alpha(0.66), 0.0);
    assert!(cta_alpha(0.661) > 0.0);
    assert!((cta_alpha(1.0) - 1.0).abs() < 1e-12);

    let mut prev = 0.0;
    for k in 1..=34 {
        let a = cta_alpha(0.66 + f64::from(k) * 0.01);
        assert!(a > prev);
        prev = a;
    }
}

#[test]
fn progress_bar_is_monotone_and_full_on_last_frame() {
    let total = 90;
    let mut prev = 0.0;
    for i in 0..total {
        let w = FrameLayout::at(i, total).unwrap().progress_bar_width;
        assert!(w >= prev);
        assert!(w <= 1000.0);
        prev = w;
    }
    assert_eq!(prev, 1000.0);
    assert_eq!(FrameLayout::at(0, 1).unwrap().progress_bar_width, 1000.0);
}

#[test]
fn still_layout_has_no_overlay() {
    let s = FrameLayout::still();
    assert_eq!(s.cta_alpha, 0.0);
    assert_eq!(s.progress_bar_width, 0.0);
    assert!((s.title_y - 300.0).abs() < 1e-9);
    assert!((s.price_y - 585.0).abs() < 1e-9);
}

#[test]
fn early_frame_draws_card_without_cta() {
    let mut s = RecordingSurface::default();
    let layout = FrameLayout::at(0, 30).unwrap();
    compose_frame(&mut s, &product(), &layout).unwrap();

    assert_eq!(s.ops.first(), Some(&Op::Gradient));
    assert!(!s.ops.iter().any(|op| matches!(op, Op::Push(_))));
    assert!(
        s.ops
            .iter()
            .any(|op| matches!(op, Op::Text(t, _, _) if t == "R$ 297.00"))
    );
    assert!(s.ops.iter().any(|op| matches!(
        op,
        Op::Rect(r, c) if *r == Rect::new(40.0, 100.0, 240.0, 160.0) && c.to_hex() == "#ff6b35"
    )));
    assert!(
        s.ops
            .iter()
            .any(|op| matches!(op, Op::Text(t, p, _) if t == "Hotmart" && p.x == 140.0))
    );
}

#[test]
fn late_frame_wraps_cta_in_opacity_group() {
    let mut s = RecordingSurface::default();
    let layout = FrameLayout::at(29, 30).unwrap();
    compose_frame(&mut s, &product(), &layout).unwrap();

    let push = s
        .ops
        .iter()
        .position(|op| matches!(op, Op::Push(_)))
        .unwrap();
    let pop = s.ops.iter().position(|op| *op == Op::Pop).unwrap();
    assert!(push < pop);
    let inside = &s.ops[push + 1..pop];
    assert!(inside.iter().any(|op| matches!(op, Op::Text(t, _, _) if t == "CLIQUE NO LINK!")));
    assert!(
        inside
            .iter()
            .any(|op| matches!(op, Op::Rect(_, c) if c.to_hex() == "#ff4444"))
    );
    // Progress bar is drawn last, outside the group.
    assert!(matches!(s.ops.last(), Some(Op::Rect(r, _)) if r.x1 == 1040.0));
}

#[test]
fn long_titles_wrap_within_max_width() {
    let mut p = product();
    p.title = "Um curso completo de marketing digital para afiliados que querem vender todos os dias da semana sem parar"
        .to_string();
    let mut s = RecordingSurface::default();
    compose_frame(&mut s, &p, &FrameLayout::at(0, 10).unwrap()).unwrap();

    let title_lines: Vec<_> = s
        .ops
        .iter()
        .filter_map(|op| match op {
            Op::Text(t, pt, size) if *size == 48.0 => Some((t.clone(), pt.y)),
            _ => None,
        })
        .collect();
    assert!(title_lines.len() > 1);
    for (i, (line, y)) in title_lines.iter().enumerate() {
        assert!(approx_text_width(line, 48.0) <= 900.0);
        assert!((y - (300.0 + 60.0 * i as f64)).abs() < 1e-9);
    }
    let rejoined = title_lines
        .iter()
        .map(|(t, _)| t.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(rejoined, p.title);
}

#[test]
fn title_lines_past_canvas_are_dropped() {
    let mut p = product();
    p.title = vec!["palavra"; 2000].join(" ");
    let mut s = RecordingSurface::default();
    compose_frame(&mut s, &p, &FrameLayout::at(0, 10).unwrap()).unwrap();
    let ys: Vec<f64> = s
        .ops
        .iter()
        .filter_map(|op| match op {
            Op::Text(_, pt, size) if *size == 48.0 => Some(pt.y),
            _ => None,
        })
        .collect();
    assert!(!ys.is_empty());
    assert!(ys.iter().all(|y| *y <= 1920.0));
}

#[test]
fn rendered_frames_are_deterministic() {
    let c = small_composer();
    let a = c.render_frame(&product(), 12, 30).unwrap();
    let b = c.render_frame(&product(), 12, 30).unwrap();
    assert_eq!(a.data, b.data);
    assert_eq!((a.width, a.height), (108, 192));
}

#[test]
fn rendered_frame_shows_badge_and_bar() {
    let c = small_composer();
    let f = c.render_frame(&product(), 29, 30).unwrap();
    // Badge interior at design (140, 130).
    let badge = f.pixel(14, 13).unwrap();
    assert_eq!(&badge[..3], &[0xff, 0x6b, 0x35]);
    // Progress bar at design (1000, 1805) on the last frame.
    let bar = f.pixel(100, 180).unwrap();
    assert_eq!(&bar[..3], &[255, 255, 255]);
    // Background is opaque gradient everywhere.
    assert_eq!(f.pixel(0, 0).unwrap()[3], 255);
}

#[test]
fn first_frame_bar_covers_one_step() {
    let c = small_composer();
    let f = c.render_frame(&product(), 0, 30).unwrap();
    // Far end of the track is still background.
    let px = f.pixel(100, 180).unwrap();
    assert_ne!(&px[..3], &[255, 255, 255]);
}

#[test]
fn cta_tints_frame_only_at_the_end() {
    let c = small_composer();
    let p = product();
    let early = c.render_frame(&p, 10, 30).unwrap();
    let late = c.render_frame(&p, 29, 30).unwrap();
    // Inside the CTA box at design (200, 1410).
    let e = early.pixel(20, 141).unwrap();
    let l = late.pixel(20, 141).unwrap();
    assert!(l[0] > e[0]);
    assert!(l[2] < e[2]);
}

#[test]
fn reused_surface_matches_fresh_surface() {
    let c = small_composer();
    let p = product();
    let mut s = c.surface().unwrap();
    let _ = c.render_frame_on(&mut s, &p, 3, 30).unwrap();
    let reused = c.render_frame_on(&mut s, &p, 25, 30).unwrap();
    let fresh = c.render_frame(&p, 25, 30).unwrap();
    assert_eq!(reused.data, fresh.data);
}

fn count_pixels(
    f: &FrameRGBA,
    rows: std::ops::Range<u32>,
    want: fn([u8; 4]) -> bool,
) -> usize {
    rows.flat_map(|y| (0..f.width).map(move |x| (x, y)))
        .filter(|&(x, y)| f.pixel(x, y).is_some_and(want))
        .count()
}

fn yellow(px: [u8; 4]) -> bool {
    px[0] > 240 && px[1] > 240 && px[2] < 40
}

fn white(px: [u8; 4]) -> bool {
    px[0] > 240 && px[1] > 240 && px[2] > 240
}

#[test]
fn real_font_puts_title_and_price_ink_in_their_bands() {
    let Some(path) = crate::config::discover_font() else {
        return;
    };
    let canvas = Canvas {
        width: 360,
        height: 640,
    };
    let shaped = FrameComposer::new(canvas, FontSource::from_path(&path).unwrap()).unwrap();
    let bare = FrameComposer::new(canvas, FontSource::layout_only()).unwrap();

    // Design rows 240..330 hold the title, 520..630 the price.
    let (title_rows, price_rows) = (80..110, 173..210);

    let f = shaped.render_frame(&product(), 0, 30).unwrap();
    assert!(count_pixels(&f, title_rows.clone(), white) > 100);
    assert!(count_pixels(&f, price_rows.clone(), yellow) > 100);
    assert_eq!(count_pixels(&f, title_rows.clone(), yellow), 0);

    let f = bare.render_frame(&product(), 0, 30).unwrap();
    assert_eq!(count_pixels(&f, title_rows, white), 0);
    assert_eq!(count_pixels(&f, price_rows, yellow), 0);
}
