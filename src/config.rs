use std::path::{Path, PathBuf};

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};

/// Inclusive range used to pick a video duration when the caller does not set one.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DurationBounds {
    /// Shortest video, in seconds.
    pub min_secs: f64,
    /// Longest video, in seconds.
    pub max_secs: f64,
}

impl DurationBounds {
    /// Validate `0 < min <= max`.
    pub fn validate(&self) -> ReelResult<()> {
        if !self.min_secs.is_finite() || !self.max_secs.is_finite() || self.min_secs <= 0.0 {
            return Err(ReelError::validation(
                "duration bounds must be finite and positive",
            ));
        }
        if self.min_secs > self.max_secs {
            return Err(ReelError::validation(format!(
                "duration bounds inverted: min {} > max {}",
                self.min_secs, self.max_secs
            )));
        }
        Ok(())
    }
}

impl Default for DurationBounds {
    fn default() -> Self {
        Self {
            min_secs: 15.0,
            max_secs: 60.0,
        }
    }
}

/// Encoder parameters passed through to `ffmpeg`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CodecParams {
    /// Video codec (`-c:v`).
    pub video_codec: String,
    /// Output pixel format (`-pix_fmt`).
    pub pixel_format: String,
    /// Audio codec (`-c:a`).
    pub audio_codec: String,
    /// Audio bitrate (`-b:a`).
    pub audio_bitrate: String,
    /// Speed/size trade-off (`-preset`).
    pub preset: String,
    /// Constant rate factor (`-crf`), 0..=51.
    pub crf: u8,
}

impl Default for CodecParams {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            pixel_format: "yuv420p".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
            preset: "fast".to_string(),
            crf: 23,
        }
    }
}

/// Read-only configuration shared by every pipeline run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeneratorConfig {
    /// Persistent root for finished videos and thumbnails.
    pub output_root: PathBuf,
    /// Scratch root for per-run frames and audio.
    pub scratch_root: PathBuf,
    /// Frame dimensions; always 9:16.
    pub canvas: Canvas,
    /// Framerate used when a call does not override it.
    pub default_fps: Fps,
    /// Range for the computed duration.
    pub duration_bounds: DurationBounds,
    /// Longest duration a caller may request explicitly, in seconds.
    pub max_duration_secs: f64,
    /// Encoder parameters.
    pub codec: CodecParams,
    /// Narration sample rate in Hz.
    pub audio_sample_rate: u32,
    /// Narration channel count.
    pub audio_channels: u16,
    /// Frame rendering worker count (`None` = rayon default).
    pub render_threads: Option<usize>,
    /// Kill the encoder after this many seconds.
    pub encode_timeout_secs: Option<u64>,
    /// Font used for all text; `None` renders layout-only text.
    pub font_path: Option<PathBuf>,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("./output/videos"),
            scratch_root: PathBuf::from("./temp"),
            canvas: Canvas::PORTRAIT_HD,
            default_fps: Fps::DEFAULT,
            duration_bounds: DurationBounds::default(),
            max_duration_secs: 600.0,
            codec: CodecParams::default(),
            audio_sample_rate: 44_100,
            audio_channels: 2,
            render_threads: None,
            encode_timeout_secs: Some(600),
            font_path: discover_font(),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Defaults rooted under `root` (`root/output`, `root/temp`).
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            output_root: root.join("output"),
            scratch_root: root.join("temp"),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default            |
    /// |---------------------------------|--------------------|
    /// | `PROMOREEL_OUTPUT_DIR`          | `./output/videos`  |
    /// | `PROMOREEL_TEMP_DIR`            | `./temp`           |
    /// | `PROMOREEL_RESOLUTION`          | `1080x1920`        |
    /// | `PROMOREEL_FRAMERATE`           | `30`               |
    /// | `PROMOREEL_DURATION_MIN`        | `15`               |
    /// | `PROMOREEL_DURATION_MAX`        | `60`               |
    /// | `PROMOREEL_DURATION_LIMIT`      | `600`              |
    /// | `PROMOREEL_PRESET`              | `fast`             |
    /// | `PROMOREEL_CRF`                 | `23`               |
    /// | `PROMOREEL_RENDER_THREADS`      | rayon default      |
    /// | `PROMOREEL_ENCODE_TIMEOUT_SECS` | `600` (`0` = none) |
    /// | `PROMOREEL_FONT`                | well-known fonts   |
    /// | `PROMOREEL_SEED`                | fresh per run      |
    pub fn from_env() -> ReelResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GeneratorConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ReelResult<Self> {
        let mut cfg = Self::default();

        if let Some(v) = lookup("PROMOREEL_OUTPUT_DIR") {
            cfg.output_root = PathBuf::from(v);
        }
        if let Some(v) = lookup("PROMOREEL_TEMP_DIR") {
            cfg.scratch_root = PathBuf::from(v);
        }
        if let Some(v) = lookup("PROMOREEL_RESOLUTION") {
            cfg.canvas = v.parse()?;
        }
        if let Some(v) = lookup("PROMOREEL_FRAMERATE") {
            cfg.default_fps = Fps::new(parse_var("PROMOREEL_FRAMERATE", &v)?)?;
        }
        if let Some(v) = lookup("PROMOREEL_DURATION_MIN") {
            cfg.duration_bounds.min_secs = parse_var("PROMOREEL_DURATION_MIN", &v)?;
        }
        if let Some(v) = lookup("PROMOREEL_DURATION_MAX") {
            cfg.duration_bounds.max_secs = parse_var("PROMOREEL_DURATION_MAX", &v)?;
        }
        if let Some(v) = lookup("PROMOREEL_DURATION_LIMIT") {
            cfg.max_duration_secs = parse_var("PROMOREEL_DURATION_LIMIT", &v)?;
        }
        if let Some(v) = lookup("PROMOREEL_PRESET") {
            cfg.codec.preset = v;
        }
        if let Some(v) = lookup("PROMOREEL_CRF") {
            cfg.codec.crf = parse_var("PROMOREEL_CRF", &v)?;
        }
        if let Some(v) = lookup("PROMOREEL_RENDER_THREADS") {
            cfg.render_threads = Some(parse_var("PROMOREEL_RENDER_THREADS", &v)?);
        }
        if let Some(v) = lookup("PROMOREEL_ENCODE_TIMEOUT_SECS") {
            let secs: u64 = parse_var("PROMOREEL_ENCODE_TIMEOUT_SECS", &v)?;
            cfg.encode_timeout_secs = (secs > 0).then_some(secs);
        }
        if let Some(v) = lookup("PROMOREEL_FONT") {
            cfg.font_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("PROMOREEL_SEED") {
            cfg.seed = Some(parse_var("PROMOREEL_SEED", &v)?);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> ReelResult<()> {
        self.canvas.validate()?;
        self.duration_bounds.validate()?;
        if !self.max_duration_secs.is_finite()
            || self.max_duration_secs < self.duration_bounds.max_secs
        {
            return Err(ReelError::validation(format!(
                "duration limit {} must be finite and at least the drawn maximum {}",
                self.max_duration_secs, self.duration_bounds.max_secs
            )));
        }
        if self.codec.crf > 51 {
            return Err(ReelError::validation(format!(
                "crf must be within 0..=51, got {}",
                self.codec.crf
            )));
        }
        if self.codec.preset.trim().is_empty() {
            return Err(ReelError::validation("encoder preset must be non-empty"));
        }
        if self.audio_sample_rate == 0 || self.audio_channels == 0 {
            return Err(ReelError::validation(
                "audio sample rate and channel count must be non-zero",
            ));
        }
        if self.render_threads == Some(0) {
            return Err(ReelError::validation(
                "render_threads must be >= 1 when set",
            ));
        }
        Ok(())
    }

    /// Directory holding one run's frame files.
    pub fn frames_dir(&self, run: &str) -> PathBuf {
        self.scratch_root.join("frames").join(run)
    }

    /// Directory holding one run's audio files.
    pub fn audio_dir(&self, run: &str) -> PathBuf {
        self.scratch_root.join("audio").join(run)
    }
}

fn parse_var<T>(key: &str, value: &str) -> ReelResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ReelError::validation(format!("{key}='{value}' is invalid: {e}")))
}

const WELL_KNOWN_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// First well-known bold sans-serif font present on this machine.
pub fn discover_font() -> Option<PathBuf> {
    WELL_KNOWN_FONTS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
