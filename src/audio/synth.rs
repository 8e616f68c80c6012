use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};
use crate::narration::script::NarrationScript;

/// Raw interleaved `f32` PCM file produced for one run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioTrack {
    /// Location of the little-endian `f32` samples.
    pub path: PathBuf,
    /// Playback length in seconds.
    pub duration_secs: f64,
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
}

impl AudioTrack {
    /// Fail unless the track and `total_frames` at `fps` agree within one frame period.
    pub fn check_covers(&self, total_frames: u64, fps: Fps) -> ReelResult<()> {
        let video_secs = fps.frames_to_secs(total_frames);
        let drift = (self.duration_secs - video_secs).abs();
        if drift > fps.frame_duration_secs() + 1e-9 {
            return Err(ReelError::synthesis(format!(
                "audio lasts {:.3}s but {total_frames} frames at {} fps last {video_secs:.3}s",
                self.duration_secs,
                fps.get()
            )));
        }
        Ok(())
    }
}

/// Turns a narration script into an audio track of a requested length.
///
/// Implementations write to `out_path`; a real TTS backend plugs in here.
pub trait AudioSynthesizer: Send + Sync {
    /// Produce `target_duration_secs` of audio for `script` at `out_path`.
    fn synthesize(
        &self,
        script: &NarrationScript,
        target_duration_secs: f64,
        out_path: &Path,
    ) -> ReelResult<AudioTrack>;
}

/// Writes silence of the requested length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SilentSynthesizer {
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
}

impl Default for SilentSynthesizer {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 2,
        }
    }
}

impl SilentSynthesizer {
    /// Silence at `sample_rate` with `channels` channels.
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }
}

impl AudioSynthesizer for SilentSynthesizer {
    fn synthesize(
        &self,
        script: &NarrationScript,
        target_duration_secs: f64,
        out_path: &Path,
    ) -> ReelResult<AudioTrack> {
        if !target_duration_secs.is_finite() || target_duration_secs <= 0.0 {
            return Err(ReelError::synthesis(format!(
                "target duration must be positive, got {target_duration_secs}"
            )));
        }
        if self.sample_rate == 0 || self.channels == 0 {
            return Err(ReelError::synthesis(
                "sample rate and channel count must be non-zero",
            ));
        }

        let frames = (target_duration_secs * f64::from(self.sample_rate)).round() as u64;
        let samples = frames.saturating_mul(u64::from(self.channels));
        write_silence_f32le(out_path, samples)?;
        tracing::debug!(
            path = %out_path.display(),
            secs = target_duration_secs,
            chars = script.text.chars().count(),
            "silent narration written"
        );

        Ok(AudioTrack {
            path: out_path.to_path_buf(),
            duration_secs: frames as f64 / f64::from(self.sample_rate),
            sample_rate: self.sample_rate,
            channels: self.channels,
        })
    }
}

/// Write `samples` zero-valued `f32le` samples, creating the parent directory.
fn write_silence_f32le(out_path: &Path, samples: u64) -> ReelResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ReelError::io_at("create audio directory", parent, e))?;
    }
    let file =
        std::fs::File::create(out_path).map_err(|e| ReelError::io_at("create", out_path, e))?;
    let mut writer = std::io::BufWriter::new(file);

    const CHUNK: u64 = 16 * 1024;
    let zeros = [0u8; (CHUNK * 4) as usize];
    let mut left = samples;
    while left > 0 {
        let n = left.min(CHUNK);
        writer
            .write_all(&zeros[..(n * 4) as usize])
            .map_err(|e| ReelError::io_at("write", out_path, e))?;
        left -= n;
    }
    writer
        .flush()
        .map_err(|e| ReelError::io_at("flush", out_path, e))
}

#[cfg(test)]
#[path = "../../tests/unit/audio/synth.rs"]
mod tests;
