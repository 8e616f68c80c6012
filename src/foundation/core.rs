use crate::foundation::error::{ReelError, ReelResult};

/// 0-based index of a frame within one rendered sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Integer frames-per-second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Fps(u32);

impl Fps {
    /// Highest accepted frame rate.
    pub const MAX: u32 = 120;

    /// Default short-video frame rate.
    pub const DEFAULT: Fps = Fps(30);

    /// Create a validated FPS value in `1..=Fps::MAX`.
    pub fn new(fps: u32) -> ReelResult<Self> {
        if fps == 0 {
            return Err(ReelError::validation("framerate must be > 0"));
        }
        if fps > Self::MAX {
            return Err(ReelError::validation(format!(
                "framerate must be <= {}, got {fps}",
                Self::MAX
            )));
        }
        Ok(Self(fps))
    }

    /// Frames per second as an integer.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        1.0 / f64::from(self.0)
    }

    /// Convert a frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) / f64::from(self.0)
    }

    /// Convert seconds to the nearest whole frame count.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * f64::from(self.0)).round().max(0.0) as u64
    }
}

impl TryFrom<u32> for Fps {
    type Error = ReelError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Fps> for u32 {
    fn from(value: Fps) -> Self {
        value.0
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// The production 9:16 portrait canvas.
    pub const PORTRAIT_HD: Canvas = Canvas {
        width: 1080,
        height: 1920,
    };

    /// Validate that the canvas is non-empty, 9:16, and even in both dimensions.
    pub fn validate(self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::validation("canvas width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // yuv420p output needs even dimensions.
            return Err(ReelError::validation(format!(
                "canvas {self} must have even width/height"
            )));
        }
        if u64::from(self.width) * 16 != u64::from(self.height) * 9 {
            return Err(ReelError::validation(format!(
                "canvas {self} is not 9:16"
            )));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(ReelError::validation(format!("canvas {self} is too large")));
        }
        Ok(())
    }

    /// Resolution string as reported on artifacts (`"1080x1920"`).
    pub fn resolution(self) -> String {
        self.to_string()
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::PORTRAIT_HD
    }
}

impl std::fmt::Display for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Canvas {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| ReelError::validation(format!("resolution '{s}' is not WxH")))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|e| ReelError::validation(format!("resolution '{s}': {e}")))
        };
        Ok(Self {
            width: parse(w)?,
            height: parse(h)?,
        })
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> ReelResult<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.is_ascii() || (digits.len() != 6 && digits.len() != 8) {
            return Err(ReelError::validation(format!("invalid hex color '{hex}'")));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ReelError::validation(format!("invalid hex color '{hex}'")))
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if digits.len() == 8 { channel(6)? } else { 255 },
        })
    }

    /// `#rrggbb` representation (alpha dropped).
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear interpolation between two colors, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            let af = f32::from(a);
            let bf = f32::from(b);
            (af + (bf - af) * t).round().clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

/// Fresh identifier of one `generate` run.
///
/// Embedded in every temporary and output file name so concurrent runs never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    /// Generate a new random run id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
