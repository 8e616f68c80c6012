//! Encoding sinks.
//!
//! An [`encoder::Encoder`] consumes rendered frame files in strict index order plus one audio
//! track and produces a single muxed video.

pub(crate) mod encoder;
pub(crate) mod ffmpeg;
pub(crate) mod progress;
pub(crate) mod recording;
