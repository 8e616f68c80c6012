//! Promoreel turns an affiliate [`Product`] into a short vertical promo video.
//!
//! One [`VideoGenerator::generate`] call runs the whole pipeline:
//!
//! - Render every frame on the CPU with [`FrameComposer`]
//! - Write a narration script and its audio track
//! - Mux frames and audio into an MP4 through an [`Encoder`] (`ffmpeg` by default)
//! - Render a JPEG thumbnail, then remove the run's scratch files
//!
//! The result is a [`VideoArtifact`] whose status is `ready`, or a [`GenerateError`] carrying the
//! `failed` record.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod audio;
mod config;
mod encode;
mod foundation;
mod janitor;
mod model;
mod narration;
mod pipeline;
mod render;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Rgba8, RunId};
pub use crate::foundation::error::{ErrorKind, ReelError, ReelResult};

pub use crate::config::{CodecParams, DurationBounds, GeneratorConfig, discover_font};
pub use crate::model::artifact::{ArtifactMetadata, GenerateOptions, VideoArtifact, VideoStatus};
pub use crate::model::product::{Platform, Product, format_brl};

pub use crate::render::backend::{FrameRGBA, read_frame_rgba8};
pub use crate::render::frame::{FrameComposer, FrameLayout, compose_frame, cta_alpha};
pub use crate::render::palette::platform_color;
pub use crate::render::surface::{CpuSurface, Surface, TextStyle};
pub use crate::render::text::{
    FontBook, FontSource, TextBrushRgba8, approx_text_width, wrap_words,
};
pub use crate::render::thumbnail::{THUMBNAIL_JPEG_QUALITY, ThumbnailRenderer};

pub use crate::audio::synth::{AudioSynthesizer, AudioTrack, SilentSynthesizer};
pub use crate::narration::script::{NarrationScript, NarrationScriptGenerator, NarrationTemplate};

pub use crate::encode::encoder::{
    EncodeOptions, EncodeRequest, Encoder, FrameFile, check_frame_sequence,
};
pub use crate::encode::ffmpeg::{
    FfmpegEncoder, ensure_parent_dir, ffmpeg_args, is_ffmpeg_on_path,
};
pub use crate::encode::progress::{CancelToken, ProgressObserver};
pub use crate::encode::recording::{EncodeRecord, RecordingEncoder};

pub use crate::janitor::{CleanupReport, ResourceJanitor};
pub use crate::pipeline::catalog::{VideoListing, list_videos};
pub use crate::pipeline::orchestrator::{
    GenerateError, RunControls, VideoGenerator, VideoGeneratorBuilder,
};
pub use crate::pipeline::state::{PipelineState, ReadyChecks, RunStateMachine};
