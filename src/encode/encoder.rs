use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::audio::synth::AudioTrack;
use crate::config::CodecParams;
use crate::encode::progress::{CancelToken, ProgressObserver};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};

/// One rendered frame on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameFile {
    /// Position in the sequence.
    pub index: FrameIndex,
    /// Image file.
    pub path: PathBuf,
}

/// Fixed output parameters of one encode.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeOptions {
    /// Output frame rate.
    pub fps: Fps,
    /// Output dimensions; every frame must match.
    pub canvas: Canvas,
    /// Codec settings.
    pub codec: CodecParams,
    /// Abort after this long.
    pub timeout: Option<Duration>,
}

/// Everything an [`Encoder`] needs for one run.
#[derive(Clone, Copy)]
pub struct EncodeRequest<'a> {
    /// Frames in strict index order, starting at 0.
    pub frames: &'a [FrameFile],
    /// Narration track to mux.
    pub audio: &'a AudioTrack,
    /// Destination video file.
    pub output: &'a Path,
    /// Output parameters.
    pub options: &'a EncodeOptions,
    /// Optional progress observer.
    pub observer: Option<&'a dyn ProgressObserver>,
    /// Cancellation flag, polled while encoding.
    pub cancel: &'a CancelToken,
}

impl std::fmt::Debug for EncodeRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodeRequest")
            .field("frames", &self.frames.len())
            .field("audio", &self.audio.path)
            .field("output", &self.output)
            .field("options", self.options)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Muxes an ordered frame sequence and one audio track into a video file.
pub trait Encoder: Send + Sync {
    /// Encode `request` and return the written video path.
    fn encode(&self, request: EncodeRequest<'_>) -> ReelResult<PathBuf>;
}

/// Frames must be non-empty and numbered `0, 1, 2, ...` with no gaps or repeats.
pub fn check_frame_sequence(frames: &[FrameFile]) -> ReelResult<()> {
    if frames.is_empty() {
        return Err(ReelError::encoding("no frames to encode"));
    }
    for (expected, frame) in frames.iter().enumerate() {
        if frame.index.0 != expected as u64 {
            return Err(ReelError::encoding(format!(
                "frame sequence broken at position {expected}: got index {}",
                frame.index.0
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/encoder.rs"]
mod tests;
