use std::f64::consts::TAU;

use kurbo::{Point, Rect};

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::product::Product;
use crate::render::backend::FrameRGBA;
use crate::render::palette::{
    BADGE_RECT, BADGE_SIZE_PX, BADGE_TEXT_BASELINE, CENTER_X, CTA_LABEL, CTA_RECT, CTA_RED,
    CTA_SIZE_PX, CTA_START, CTA_TEXT_BASELINE, DESIGN_HEIGHT, DESIGN_WIDTH, GRADIENT_BOTTOM,
    GRADIENT_TOP, PRICE_AMPLITUDE, PRICE_BASE_Y, PRICE_SIZE_PX, PRICE_YELLOW,
    PROGRESS_TRACK_HEIGHT, PROGRESS_TRACK_WIDTH, PROGRESS_TRACK_X, PROGRESS_TRACK_Y,
    TITLE_AMPLITUDE, TITLE_BASE_Y, TITLE_LINE_HEIGHT, TITLE_MAX_WIDTH, TITLE_SIZE_PX, WHITE,
    platform_color,
};
use crate::render::surface::{CpuSurface, Surface, TextStyle};
use crate::render::text::{FontSource, wrap_words};

/// Animated positions for one frame, in design-space pixels.
///
/// Pure function of `(index, total)`; the composer draws exactly these values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameLayout {
    /// Normalized animation time `index / total`, in `[0, 1)`.
    pub progress: f64,
    /// Baseline of the first title line.
    pub title_y: f64,
    /// Baseline of the price label.
    pub price_y: f64,
    /// Opacity of the call-to-action overlay.
    pub cta_alpha: f64,
    /// Filled width of the progress bar.
    pub progress_bar_width: f64,
}

impl FrameLayout {
    /// Layout of frame `index` in a sequence of `total` frames.
    ///
    /// The progress bar counts the current frame as shown, so it is full on the last frame.
    pub fn at(index: u64, total: u64) -> ReelResult<Self> {
        if total == 0 {
            return Err(ReelError::render("total frame count must be > 0"));
        }
        if index >= total {
            return Err(ReelError::render(format!(
                "frame index {index} out of range for {total} frames"
            )));
        }
        let progress = index as f64 / total as f64;
        let shown = (index + 1) as f64 / total as f64;
        Ok(Self::from_parts(progress, shown))
    }

    /// The static layout used for thumbnails: halfway through the bob, no overlay, empty bar.
    pub fn still() -> Self {
        Self {
            cta_alpha: 0.0,
            progress_bar_width: 0.0,
            ..Self::from_parts(0.5, 0.0)
        }
    }

    fn from_parts(progress: f64, shown: f64) -> Self {
        let phase = progress * TAU;
        Self {
            progress,
            title_y: TITLE_BASE_Y + TITLE_AMPLITUDE * phase.sin(),
            price_y: PRICE_BASE_Y + PRICE_AMPLITUDE * phase.cos(),
            cta_alpha: cta_alpha(progress),
            progress_bar_width: PROGRESS_TRACK_WIDTH * shown.clamp(0.0, 1.0),
        }
    }
}

/// Call-to-action opacity: 0 up to the start of the final third, then a linear ramp to 1.
pub fn cta_alpha(progress: f64) -> f64 {
    if progress <= CTA_START {
        0.0
    } else {
        ((progress - CTA_START) / (1.0 - CTA_START)).clamp(0.0, 1.0)
    }
}

/// Draws the animated promo frames for a product.
#[derive(Clone, Debug)]
pub struct FrameComposer {
    canvas: Canvas,
    fonts: FontSource,
}

impl FrameComposer {
    /// Composer producing frames of `canvas` size.
    pub fn new(canvas: Canvas, fonts: FontSource) -> ReelResult<Self> {
        canvas.validate()?;
        if !fonts.has_font() {
            tracing::warn!("no usable font configured, text will be laid out but not drawn");
        }
        Ok(Self { canvas, fonts })
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Font bytes shared with the thumbnail renderer.
    pub fn fonts(&self) -> &FontSource {
        &self.fonts
    }

    /// Fresh drawing surface. Render workers create one each and reuse it across frames.
    pub fn surface(&self) -> ReelResult<CpuSurface> {
        CpuSurface::new(self.canvas, &self.fonts)
    }

    /// Render frame `index` of `total` on a throwaway surface.
    pub fn render_frame(&self, product: &Product, index: u64, total: u64) -> ReelResult<FrameRGBA> {
        let mut surface = self.surface()?;
        self.render_frame_on(&mut surface, product, index, total)
    }

    /// Render frame `index` of `total` on a reusable surface.
    pub fn render_frame_on(
        &self,
        surface: &mut impl Surface,
        product: &Product,
        index: u64,
        total: u64,
    ) -> ReelResult<FrameRGBA> {
        let layout = FrameLayout::at(index, total)?;
        compose_frame(surface, product, &layout)?;
        surface.finish()
    }
}

/// Draw every element of one animated frame.
pub fn compose_frame(
    surface: &mut impl Surface,
    product: &Product,
    layout: &FrameLayout,
) -> ReelResult<()> {
    draw_card(surface, product, layout)?;

    if layout.cta_alpha > 0.0 {
        surface.push_opacity(layout.cta_alpha as f32);
        let (x, y, w, h) = CTA_RECT;
        surface.fill_rect(Rect::new(x, y, x + w, y + h), CTA_RED);
        surface.fill_text(
            CTA_LABEL,
            Point::new(CENTER_X, CTA_TEXT_BASELINE),
            TextStyle::centered(CTA_SIZE_PX, WHITE),
        )?;
        surface.pop_opacity();
    }

    surface.fill_rect(
        Rect::new(
            PROGRESS_TRACK_X,
            PROGRESS_TRACK_Y,
            PROGRESS_TRACK_X + layout.progress_bar_width,
            PROGRESS_TRACK_Y + PROGRESS_TRACK_HEIGHT,
        ),
        WHITE,
    );
    Ok(())
}

/// Background, title, price, and platform badge. Shared by frames and thumbnails.
pub(crate) fn draw_card(
    surface: &mut impl Surface,
    product: &Product,
    layout: &FrameLayout,
) -> ReelResult<()> {
    surface.fill_gradient(
        Rect::new(0.0, 0.0, DESIGN_WIDTH, DESIGN_HEIGHT),
        GRADIENT_TOP,
        GRADIENT_BOTTOM,
    )?;

    let lines = wrap_words(&product.title, TITLE_MAX_WIDTH, |s| {
        surface.measure_text(s, TITLE_SIZE_PX)
    });
    let title_style = TextStyle::centered(TITLE_SIZE_PX, WHITE);
    for (i, line) in lines.iter().enumerate() {
        let baseline = layout.title_y + TITLE_LINE_HEIGHT * i as f64;
        if baseline > DESIGN_HEIGHT {
            tracing::debug!(dropped = lines.len() - i, "title truncated at canvas bottom");
            break;
        }
        surface.fill_text(line, Point::new(CENTER_X, baseline), title_style)?;
    }

    surface.fill_text(
        &product.price_label(),
        Point::new(CENTER_X, layout.price_y),
        TextStyle::centered(PRICE_SIZE_PX, PRICE_YELLOW),
    )?;

    let (x, y, w, h) = BADGE_RECT;
    surface.fill_rect(
        Rect::new(x, y, x + w, y + h),
        platform_color(&product.platform),
    );
    surface.fill_text(
        product.platform.name(),
        Point::new(x + w / 2.0, BADGE_TEXT_BASELINE),
        TextStyle::centered(BADGE_SIZE_PX, WHITE),
    )?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
