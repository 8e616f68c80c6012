use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use crate::encode::encoder::{EncodeRequest, Encoder, check_frame_sequence};
use crate::encode::ffmpeg::ensure_parent_dir;
use crate::encode::progress::ProgressReporter;
use crate::foundation::error::{ReelError, ReelResult};

/// What a [`RecordingEncoder`] saw during one encode.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EncodeRecord {
    /// Destination path.
    pub output: PathBuf,
    /// Frame indices in the order they were consumed.
    pub frame_indices: Vec<u64>,
    /// Frame files in the order they were consumed.
    pub frame_paths: Vec<PathBuf>,
    /// Audio file handed to the encoder.
    pub audio_path: PathBuf,
    /// Audio length in seconds.
    pub audio_secs: f64,
    /// Output frame rate.
    pub fps: u32,
}

/// Encoder double that records frame order instead of producing media.
///
/// On success it writes a JSON manifest of the [`EncodeRecord`] at the output path.
#[derive(Debug, Default)]
pub struct RecordingEncoder {
    records: Mutex<Vec<EncodeRecord>>,
    fail_with: Option<String>,
    cancel_at: Option<u64>,
    frame_delay: Option<Duration>,
}

impl RecordingEncoder {
    /// Encoder that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an encoder process exiting nonzero with `stderr`, after leaving a partial file.
    pub fn failing(stderr: impl Into<String>) -> Self {
        Self {
            fail_with: Some(stderr.into()),
            ..Self::default()
        }
    }

    /// Trip the request's cancel token when frame `index` is reached.
    pub fn cancelling_at(index: u64) -> Self {
        Self {
            cancel_at: Some(index),
            ..Self::default()
        }
    }

    /// Sleep this long per frame, to keep encodes in flight.
    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = Some(delay);
        self
    }

    /// Every encode seen so far, in call order.
    pub fn records(&self) -> Vec<EncodeRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Encoder for RecordingEncoder {
    fn encode(&self, request: EncodeRequest<'_>) -> ReelResult<PathBuf> {
        check_frame_sequence(request.frames)?;
        request.cancel.check("encoding")?;
        ensure_parent_dir(request.output)?;

        let mut progress = ProgressReporter::new(request.observer);
        let total = request.frames.len() as u64;
        let mut record = EncodeRecord {
            output: request.output.to_path_buf(),
            frame_indices: Vec::with_capacity(request.frames.len()),
            frame_paths: Vec::with_capacity(request.frames.len()),
            audio_path: request.audio.path.clone(),
            audio_secs: request.audio.duration_secs,
            fps: request.options.fps.get(),
        };

        for frame in request.frames {
            if self.cancel_at == Some(frame.index.0) {
                request.cancel.cancel();
            }
            request.cancel.check("encoding")?;
            if !frame.path.is_file() {
                return Err(ReelError::encoding(format!(
                    "frame file '{}' is missing",
                    frame.path.display()
                )));
            }
            if let Some(delay) = self.frame_delay {
                std::thread::sleep(delay);
            }
            record.frame_indices.push(frame.index.0);
            record.frame_paths.push(frame.path.clone());
            progress.step(frame.index.0 + 1, total);
        }
        if !request.audio.path.is_file() {
            return Err(ReelError::encoding(format!(
                "audio file '{}' is missing",
                request.audio.path.display()
            )));
        }

        let manifest = serde_json::to_vec_pretty(&record)?;
        std::fs::write(request.output, &manifest)
            .map_err(|e| ReelError::io_at("write", request.output, e))?;

        match self.records.lock() {
            Ok(mut records) => records.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }

        if let Some(stderr) = &self.fail_with {
            return Err(ReelError::encoding(format!(
                "ffmpeg exited with status exit status: 1: {stderr}"
            )));
        }
        progress.complete();
        Ok(request.output.to_path_buf())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/recording.rs"]
mod tests;
