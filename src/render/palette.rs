//! Colors and fixed layout of the promo frame, in the 1080x1920 design space.

use crate::foundation::core::Rgba8;
use crate::model::product::Platform;

/// Width of the design space all layout constants are expressed in.
pub const DESIGN_WIDTH: f64 = 1080.0;
/// Height of the design space.
pub const DESIGN_HEIGHT: f64 = 1920.0;

pub const GRADIENT_TOP: Rgba8 = Rgba8::rgb(0x66, 0x7e, 0xea);
pub const GRADIENT_BOTTOM: Rgba8 = Rgba8::rgb(0x76, 0x4b, 0xa2);
pub const WHITE: Rgba8 = Rgba8::rgb(0xff, 0xff, 0xff);
pub const PRICE_YELLOW: Rgba8 = Rgba8::rgb(0xff, 0xff, 0x00);
pub const CTA_RED: Rgba8 = Rgba8::rgb(0xff, 0x44, 0x44);
pub const PLAY_DISC: Rgba8 = Rgba8::rgba(0xff, 0xff, 0xff, 230);
pub const PLAY_GLYPH: Rgba8 = Rgba8::rgb(0x33, 0x33, 0x33);

pub const HOTMART_ORANGE: Rgba8 = Rgba8::rgb(0xff, 0x6b, 0x35);
pub const EDUZZ_BLUE: Rgba8 = Rgba8::rgb(0x42, 0x85, 0xf4);
pub const KIWIPAY_PURPLE: Rgba8 = Rgba8::rgb(0x9c, 0x27, 0xb0);
pub const NEUTRAL_GREY: Rgba8 = Rgba8::rgb(0x66, 0x66, 0x66);

/// Badge color for a platform. Total: unmapped platforms get [`NEUTRAL_GREY`].
pub fn platform_color(platform: &Platform) -> Rgba8 {
    match platform {
        Platform::Hotmart => HOTMART_ORANGE,
        Platform::Eduzz => EDUZZ_BLUE,
        Platform::KiwiPay => KIWIPAY_PURPLE,
        Platform::Other(_) => NEUTRAL_GREY,
    }
}

pub const CENTER_X: f64 = DESIGN_WIDTH / 2.0;

pub const TITLE_BASE_Y: f64 = 300.0;
pub const TITLE_AMPLITUDE: f64 = 20.0;
pub const TITLE_SIZE_PX: f32 = 48.0;
pub const TITLE_MAX_WIDTH: f32 = 900.0;
pub const TITLE_LINE_HEIGHT: f64 = 60.0;

pub const PRICE_BASE_Y: f64 = 600.0;
pub const PRICE_AMPLITUDE: f64 = 15.0;
pub const PRICE_SIZE_PX: f32 = 72.0;

/// Badge rectangle `(x, y, w, h)`.
pub const BADGE_RECT: (f64, f64, f64, f64) = (40.0, 100.0, 200.0, 60.0);
pub const BADGE_TEXT_BASELINE: f64 = 140.0;
pub const BADGE_SIZE_PX: f32 = 24.0;

/// Progress value after which the call to action starts fading in.
pub const CTA_START: f64 = 0.66;
pub const CTA_RECT: (f64, f64, f64, f64) = (140.0, 1400.0, 800.0, 120.0);
pub const CTA_TEXT_BASELINE: f64 = 1470.0;
pub const CTA_SIZE_PX: f32 = 36.0;
pub const CTA_LABEL: &str = "CLIQUE NO LINK!";

pub const PROGRESS_TRACK_X: f64 = 40.0;
pub const PROGRESS_TRACK_Y: f64 = 1800.0;
pub const PROGRESS_TRACK_WIDTH: f64 = 1000.0;
pub const PROGRESS_TRACK_HEIGHT: f64 = 10.0;

pub const PLAY_CENTER: (f64, f64) = (540.0, 960.0);
pub const PLAY_RADIUS: f64 = 80.0;
pub const PLAY_TRIANGLE: [(f64, f64); 3] = [(520.0, 930.0), (520.0, 990.0), (570.0, 960.0)];

#[cfg(test)]
#[path = "../../tests/unit/render/palette.rs"]
mod tests;
