use std::collections::HashMap;
use std::sync::Arc;

use kurbo::{Point, Rect};

use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::premul_rgba8;
use crate::render::backend::FrameRGBA;
use crate::render::palette::DESIGN_WIDTH;
use crate::render::text::{FontBook, FontSource, TextBrushRgba8};

/// Font size and color of one text run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in design-space pixels.
    pub size_px: f32,
    /// Fill color.
    pub color: Rgba8,
}

impl TextStyle {
    /// Centered text.
    pub fn centered(size_px: f32, color: Rgba8) -> Self {
        Self { size_px, color }
    }
}

/// Minimal 2D drawing capability the composers are written against.
///
/// Coordinates are in the 1080x1920 design space; implementations scale to their canvas.
pub trait Surface {
    /// Output canvas in pixels.
    fn canvas(&self) -> Canvas;
    /// Fill `rect` with a vertical two-stop gradient.
    fn fill_gradient(&mut self, rect: Rect, top: Rgba8, bottom: Rgba8) -> ReelResult<()>;
    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Rgba8);
    /// Fill a circle.
    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8);
    /// Fill a triangle.
    fn fill_triangle(&mut self, points: [Point; 3], color: Rgba8);
    /// Width of `text` at `size_px`, in design-space pixels.
    fn measure_text(&mut self, text: &str, size_px: f32) -> f32;
    /// Draw one line of text centered on `anchor.x` with its baseline at `anchor.y`.
    fn fill_text(&mut self, text: &str, anchor: Point, style: TextStyle) -> ReelResult<()>;
    /// Multiply everything drawn until the matching [`Surface::pop_opacity`] by `alpha`.
    fn push_opacity(&mut self, alpha: f32);
    /// End the innermost opacity group.
    fn pop_opacity(&mut self);
    /// Rasterize everything drawn so far and reset the surface for the next image.
    fn finish(&mut self) -> ReelResult<FrameRGBA>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GradientKey {
    top: [u8; 4],
    bottom: [u8; 4],
    w: u32,
    h: u32,
}

/// [`Surface`] rasterized on the CPU with `vello_cpu`.
pub struct CpuSurface {
    canvas: Canvas,
    width_u16: u16,
    height_u16: u16,
    scale: f64,
    ctx: vello_cpu::RenderContext,
    fonts: FontBook,
    gradient_cache: HashMap<GradientKey, vello_cpu::Image>,
    opacity_depth: usize,
}

impl CpuSurface {
    /// Create a surface for `canvas` shaping text with `fonts`.
    pub fn new(canvas: Canvas, fonts: &FontSource) -> ReelResult<Self> {
        canvas.validate()?;
        let width_u16: u16 = canvas
            .width
            .try_into()
            .map_err(|_| ReelError::render("surface width exceeds u16"))?;
        let height_u16: u16 = canvas
            .height
            .try_into()
            .map_err(|_| ReelError::render("surface height exceeds u16"))?;
        Ok(Self {
            canvas,
            width_u16,
            height_u16,
            scale: f64::from(canvas.width) / DESIGN_WIDTH,
            ctx: vello_cpu::RenderContext::new(width_u16, height_u16),
            fonts: fonts.book()?,
            gradient_cache: HashMap::new(),
            opacity_depth: 0,
        })
    }

    fn design_transform(&self) -> vello_cpu::kurbo::Affine {
        vello_cpu::kurbo::Affine::scale(self.scale)
    }

    fn set_color(&mut self, color: Rgba8) {
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
    }

    fn fill_shape(&mut self, shape: &impl vello_cpu::kurbo::Shape, color: Rgba8) {
        let mut path = vello_cpu::kurbo::BezPath::new();
        for el in shape.path_elements(0.1) {
            path.push(el);
        }
        self.ctx.set_transform(self.design_transform());
        self.set_color(color);
        self.ctx.fill_path(&path);
    }

    fn gradient_paint(
        &mut self,
        top: Rgba8,
        bottom: Rgba8,
        w: u32,
        h: u32,
    ) -> ReelResult<vello_cpu::Image> {
        let key = GradientKey {
            top: [top.r, top.g, top.b, top.a],
            bottom: [bottom.r, bottom.g, bottom.b, bottom.a],
            w,
            h,
        };
        if let Some(img) = self.gradient_cache.get(&key).cloned() {
            return Ok(img);
        }
        let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
        let h1 = (h.max(1) - 1) as f32;
        for y in 0..h {
            let t = if h1 <= 0.0 { 0.0 } else { (y as f32) / h1 };
            let c = top.lerp(bottom, t);
            let px = premul_rgba8(c.r, c.g, c.b, c.a);
            let row = (y as usize) * (w as usize) * 4;
            for x in 0..w as usize {
                bytes[row + x * 4..row + x * 4 + 4].copy_from_slice(&px);
            }
        }
        let img = rgba_premul_to_image(&bytes, w, h)?;
        self.gradient_cache.insert(key, img.clone());
        Ok(img)
    }
}

impl Surface for CpuSurface {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn fill_gradient(&mut self, rect: Rect, top: Rgba8, bottom: Rgba8) -> ReelResult<()> {
        let px = rect.scale_from_origin(self.scale).round();
        let w = px.width().max(1.0) as u32;
        let h = px.height().max(1.0) as u32;
        let img = self.gradient_paint(top, bottom, w, h)?;

        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((px.x0, px.y0)));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(img);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w),
            f64::from(h),
        ));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        self.ctx.set_transform(self.design_transform());
        self.set_color(color);
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8) {
        let circle = vello_cpu::kurbo::Circle::new(point_to_cpu(center), radius);
        self.fill_shape(&circle, color);
    }

    fn fill_triangle(&mut self, points: [Point; 3], color: Rgba8) {
        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to(point_to_cpu(points[0]));
        path.line_to(point_to_cpu(points[1]));
        path.line_to(point_to_cpu(points[2]));
        path.close_path();
        self.fill_shape(&path, color);
    }

    fn measure_text(&mut self, text: &str, size_px: f32) -> f32 {
        self.fonts.measure(text, size_px)
    }

    fn fill_text(&mut self, text: &str, anchor: Point, style: TextStyle) -> ReelResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let Some(layout) = self
            .fonts
            .layout(text, style.size_px, TextBrushRgba8::from(style.color))
        else {
            return Ok(());
        };
        let font = self
            .fonts
            .font()
            .cloned()
            .ok_or_else(|| ReelError::render("text layout produced without a font"))?;

        let width = f64::from(layout.width());
        let left = anchor.x - width / 2.0;
        let first_baseline = layout
            .lines()
            .next()
            .map(|l| f64::from(l.metrics().baseline))
            .unwrap_or(f64::from(style.size_px));
        let top = anchor.y - first_baseline;

        self.ctx.set_transform(
            self.design_transform() * vello_cpu::kurbo::Affine::translate((left, top)),
        );
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn push_opacity(&mut self, alpha: f32) {
        self.ctx.push_opacity_layer(alpha.clamp(0.0, 1.0));
        self.opacity_depth += 1;
    }

    fn pop_opacity(&mut self) {
        if self.opacity_depth > 0 {
            self.ctx.pop_layer();
            self.opacity_depth -= 1;
        }
    }

    fn finish(&mut self) -> ReelResult<FrameRGBA> {
        while self.opacity_depth > 0 {
            self.pop_opacity();
        }
        let mut ctx = std::mem::replace(
            &mut self.ctx,
            vello_cpu::RenderContext::new(self.width_u16, self.height_u16),
        );
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(self.width_u16, self.height_u16);
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Image> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReelError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReelError::render("pixmap height exceeds u16"))?;
    if bytes_premul.len() != (width as usize) * (height as usize) * 4 {
        return Err(ReelError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes_premul
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
        .collect::<Vec<_>>();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
