use std::path::Path;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;

/// A rendered frame as RGBA8 pixels.
///
/// Frames coming out of the rasterizer are **premultiplied alpha**; the flag makes this explicit
/// at API boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Canvas matching this frame's dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Straight RGBA8 pixel at `(x, y)`, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(idx..idx + 4)?;
        let mut out = [px[0], px[1], px[2], px[3]];
        if self.premultiplied && out[3] != 0 && out[3] != 255 {
            let a = u32::from(out[3]);
            for c in &mut out[..3] {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        Some(out)
    }

    /// Flatten alpha over `bg_rgba`, producing opaque straight RGBA8.
    pub fn to_opaque_rgba8(&self, bg_rgba: [u8; 4]) -> ReelResult<Vec<u8>> {
        let mut out = vec![0u8; self.data.len()];
        flatten_over_bg_to_opaque_rgba8(&mut out, &self.data, self.premultiplied, bg_rgba)?;
        Ok(out)
    }

    /// Write the frame as a PNG (flattened over black).
    pub fn write_png(&self, path: &Path) -> ReelResult<()> {
        let rgba = self.to_opaque_rgba8([0, 0, 0, 255])?;
        image::save_buffer_with_format(
            path,
            &rgba,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| ReelError::Io(format!("failed to write frame '{}': {e}", path.display())))
    }

    /// Write the frame as a JPEG (flattened over black) at `quality` (1..=100).
    pub fn write_jpeg(&self, path: &Path, quality: u8) -> ReelResult<()> {
        let rgba = self.to_opaque_rgba8([0, 0, 0, 255])?;
        let img = image::RgbaImage::from_raw(self.width, self.height, rgba)
            .ok_or_else(|| ReelError::render("frame buffer does not match its dimensions"))?;
        let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();

        let file = std::fs::File::create(path).map_err(|e| ReelError::io_at("create", path, e))?;
        let mut writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100))
            .encode_image(&rgb)
            .map_err(|e| ReelError::Io(format!("failed to encode jpeg '{}': {e}", path.display())))?;
        use std::io::Write as _;
        writer
            .flush()
            .map_err(|e| ReelError::io_at("flush", path, e))?;
        Ok(())
    }
}

/// Decode a frame file back into opaque straight RGBA8 bytes.
pub fn read_frame_rgba8(path: &Path) -> ReelResult<(Canvas, Vec<u8>)> {
    let img = image::open(path)
        .map_err(|e| ReelError::Io(format!("failed to read frame '{}': {e}", path.display())))?
        .into_rgba8();
    let canvas = Canvas {
        width: img.width(),
        height: img.height(),
    };
    Ok((canvas, img.into_raw()))
}

pub(crate) fn flatten_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> ReelResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::render(
            "flatten_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        let (r, g, b) = if src_is_premul {
            (
                s[0] as u16 + mul_div255_u16(bg_r, inv),
                s[1] as u16 + mul_div255_u16(bg_g, inv),
                s[2] as u16 + mul_div255_u16(bg_b, inv),
            )
        } else {
            (
                mul_div255_u16(s[0] as u16, a) + mul_div255_u16(bg_r, inv),
                mul_div255_u16(s[1] as u16, a) + mul_div255_u16(bg_g, inv),
                mul_div255_u16(s[2] as u16, a) + mul_div255_u16(bg_b, inv),
            )
        };

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
