use std::path::Path;

use kurbo::Point;

use crate::foundation::error::ReelResult;
use crate::model::product::Product;
use crate::render::backend::FrameRGBA;
use crate::render::frame::{FrameComposer, FrameLayout, draw_card};
use crate::render::palette::{PLAY_CENTER, PLAY_DISC, PLAY_GLYPH, PLAY_RADIUS, PLAY_TRIANGLE};
use crate::render::surface::Surface;

/// JPEG quality of written thumbnails.
pub const THUMBNAIL_JPEG_QUALITY: u8 = 90;

/// Single still advertising a video: the frame card plus a play button.
#[derive(Clone, Debug)]
pub struct ThumbnailRenderer {
    composer: FrameComposer,
}

impl ThumbnailRenderer {
    /// Thumbnails share canvas and fonts with `composer`.
    pub fn new(composer: FrameComposer) -> Self {
        Self { composer }
    }

    /// Draw the thumbnail in memory.
    pub fn render(&self, product: &Product) -> ReelResult<FrameRGBA> {
        let mut surface = self.composer.surface()?;
        compose_thumbnail(&mut surface, product)?;
        surface.finish()
    }

    /// Draw the thumbnail and write it as JPEG to `path`.
    #[tracing::instrument(skip(self, product), fields(path = %path.display()))]
    pub fn render_to(&self, product: &Product, path: &Path) -> ReelResult<()> {
        let frame = self.render(product)?;
        frame.write_jpeg(path, THUMBNAIL_JPEG_QUALITY)?;
        tracing::debug!("thumbnail written");
        Ok(())
    }
}

fn compose_thumbnail(surface: &mut impl Surface, product: &Product) -> ReelResult<()> {
    draw_card(surface, product, &FrameLayout::still())?;

    let (cx, cy) = PLAY_CENTER;
    surface.fill_circle(Point::new(cx, cy), PLAY_RADIUS, PLAY_DISC);
    surface.fill_triangle(PLAY_TRIANGLE.map(|(x, y)| Point::new(x, y)), PLAY_GLYPH);
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/thumbnail.rs"]
mod tests;
