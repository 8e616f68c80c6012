use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};
use rayon::prelude::*;

use crate::audio::synth::{AudioSynthesizer, AudioTrack, SilentSynthesizer};
use crate::config::GeneratorConfig;
use crate::encode::encoder::{EncodeOptions, EncodeRequest, Encoder, FrameFile};
use crate::encode::ffmpeg::FfmpegEncoder;
use crate::encode::progress::{CancelToken, ProgressObserver};
use crate::foundation::core::{Fps, FrameIndex, RunId};
use crate::foundation::error::{ErrorKind, ReelError, ReelResult};
use crate::janitor::{ResourceJanitor, RunScratch};
use crate::model::artifact::{GenerateOptions, VideoArtifact, VideoStatus};
use crate::model::product::Product;
use crate::narration::script::{NarrationScript, NarrationScriptGenerator};
use crate::pipeline::state::{PipelineState, ReadyChecks, RunStateMachine};
use crate::render::frame::FrameComposer;
use crate::render::text::FontSource;
use crate::render::thumbnail::ThumbnailRenderer;

/// A failed `generate` call.
///
/// `artifact` carries the terminal [`VideoStatus::Failed`] record, or `None` when the input was
/// rejected before a run started.
#[derive(Debug, thiserror::Error)]
#[error("video generation failed")]
pub struct GenerateError {
    /// The failed run's record, if a run was started.
    pub artifact: Option<Box<VideoArtifact>>,
    /// The original error.
    pub source: ReelError,
}

impl GenerateError {
    fn rejected(source: ReelError) -> Self {
        Self {
            artifact: None,
            source,
        }
    }

    /// Kind of the underlying error.
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

/// Per-call observation and cancellation hooks.
#[derive(Clone, Default)]
pub struct RunControls<'a> {
    /// Receives encoding progress.
    pub observer: Option<&'a dyn ProgressObserver>,
    /// Stops the run; an in-flight encoder process is terminated.
    pub cancel: CancelToken,
}

impl<'a> RunControls<'a> {
    /// Controls reporting progress to `observer`.
    pub fn with_observer(observer: &'a dyn ProgressObserver) -> Self {
        Self {
            observer: Some(observer),
            cancel: CancelToken::new(),
        }
    }
}

/// Builder for [`VideoGenerator`] with swappable collaborators.
pub struct VideoGeneratorBuilder {
    config: GeneratorConfig,
    encoder: Option<Arc<dyn Encoder>>,
    synthesizer: Option<Arc<dyn AudioSynthesizer>>,
    fonts: Option<FontSource>,
}

impl VideoGeneratorBuilder {
    /// Replace the production `ffmpeg` encoder.
    pub fn encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Replace the silent narration synthesizer.
    pub fn synthesizer(mut self, synthesizer: Arc<dyn AudioSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Use these font bytes instead of loading `config.font_path`.
    pub fn fonts(mut self, fonts: FontSource) -> Self {
        self.fonts = Some(fonts);
        self
    }

    /// Validate the configuration and wire the generator.
    pub fn build(self) -> ReelResult<VideoGenerator> {
        let config = self.config;
        config.validate()?;

        let fonts = match self.fonts {
            Some(fonts) => fonts,
            None => load_fonts(config.font_path.as_deref()),
        };
        let composer = FrameComposer::new(config.canvas, fonts)?;

        let mut pool =
            rayon::ThreadPoolBuilder::new().thread_name(|i| format!("promoreel-render-{i}"));
        if let Some(n) = config.render_threads {
            pool = pool.num_threads(n);
        }
        let pool = pool
            .build()
            .map_err(|e| ReelError::render(format!("failed to build rayon thread pool: {e}")))?;

        Ok(VideoGenerator {
            thumbnails: ThumbnailRenderer::new(composer.clone()),
            composer,
            narration: NarrationScriptGenerator,
            synthesizer: self.synthesizer.unwrap_or_else(|| {
                Arc::new(SilentSynthesizer::new(
                    config.audio_sample_rate,
                    config.audio_channels,
                ))
            }),
            encoder: self
                .encoder
                .unwrap_or_else(|| Arc::new(FfmpegEncoder::new())),
            janitor: ResourceJanitor,
            pool,
            config,
        })
    }
}

fn load_fonts(path: Option<&Path>) -> FontSource {
    let Some(path) = path else {
        return FontSource::layout_only();
    };
    match FontSource::from_path(path).and_then(|fonts| fonts.book().map(|_| fonts)) {
        Ok(fonts) => fonts,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "font unusable, drawing without text");
            FontSource::layout_only()
        }
    }
}

/// End-to-end `Product -> VideoArtifact` pipeline.
///
/// Shares only read-only configuration between runs, so one generator can serve concurrent
/// `generate` calls; each run works in directories named after its own [`RunId`].
pub struct VideoGenerator {
    config: GeneratorConfig,
    composer: FrameComposer,
    thumbnails: ThumbnailRenderer,
    narration: NarrationScriptGenerator,
    synthesizer: Arc<dyn AudioSynthesizer>,
    encoder: Arc<dyn Encoder>,
    janitor: ResourceJanitor,
    pool: rayon::ThreadPool,
}

/// Fixed facts about one run, decided before any work starts.
struct RunPlan {
    id: RunId,
    fps: Fps,
    total_frames: u64,
    video_path: PathBuf,
    thumbnail_path: PathBuf,
    frames_dir: PathBuf,
    audio_dir: PathBuf,
    script: NarrationScript,
}

impl VideoGenerator {
    /// Generator with the production encoder and synthesizer.
    pub fn new(config: GeneratorConfig) -> ReelResult<Self> {
        Self::builder(config).build()
    }

    /// Start configuring a generator.
    pub fn builder(config: GeneratorConfig) -> VideoGeneratorBuilder {
        VideoGeneratorBuilder {
            config,
            encoder: None,
            synthesizer: None,
            fonts: None,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Frame composer, for rendering single frames outside a run.
    pub fn composer(&self) -> &FrameComposer {
        &self.composer
    }

    /// Thumbnail renderer, for rendering thumbnails outside a run.
    pub fn thumbnails(&self) -> &ThumbnailRenderer {
        &self.thumbnails
    }

    /// Generate a video for `product`.
    pub fn generate(
        &self,
        product: &Product,
        options: GenerateOptions,
    ) -> Result<VideoArtifact, GenerateError> {
        self.generate_with(product, options, RunControls::default())
    }

    /// Generate a video for `product` with progress reporting and cancellation.
    #[tracing::instrument(
        skip_all,
        fields(product = %product.id, run_id = tracing::field::Empty)
    )]
    pub fn generate_with(
        &self,
        product: &Product,
        options: GenerateOptions,
        controls: RunControls<'_>,
    ) -> Result<VideoArtifact, GenerateError> {
        let plan = self.plan(product, options).map_err(|e| {
            tracing::warn!(error = %e, "generate rejected");
            GenerateError::rejected(e)
        })?;
        tracing::Span::current().record("run_id", tracing::field::display(&plan.id));

        let mut artifact = VideoArtifact::generating(
            plan.id,
            product,
            plan.video_path.clone(),
            plan.fps.frames_to_secs(plan.total_frames),
            self.config.canvas,
        );
        artifact.metadata.script = Some(plan.script.text.clone());
        tracing::info!(
            frames = plan.total_frames,
            fps = plan.fps.get(),
            duration = artifact.duration,
            "run started"
        );

        let mut machine = RunStateMachine::new();
        let scratch = RunScratch::new(
            self.janitor,
            (0..plan.total_frames)
                .map(|i| frame_path(&plan.frames_dir, &plan.id, i))
                .collect(),
            plan.audio_dir.join(format!("{}_narration.f32le", plan.id)),
        );

        let outcome = self.run(product, &plan, &scratch, &controls, &mut machine);
        scratch.release();

        match outcome {
            Ok(()) => {
                artifact.thumbnail_path = Some(plan.thumbnail_path);
                artifact.status = VideoStatus::Ready;
                tracing::info!(path = %artifact.file_path.display(), "run ready");
                Ok(artifact)
            }
            Err(source) => {
                machine.fail();
                remove_partial(&plan.video_path);
                remove_partial(&plan.thumbnail_path);
                artifact.status = VideoStatus::Failed;
                tracing::error!(error = %source, kind = ?source.kind(), "run failed");
                Err(GenerateError {
                    artifact: Some(Box::new(artifact)),
                    source,
                })
            }
        }
    }

    fn plan(&self, product: &Product, options: GenerateOptions) -> ReelResult<RunPlan> {
        product.validate()?;
        options.validate_duration()?;
        let fps = options.resolve_fps(self.config.default_fps)?;

        let id = RunId::new();
        let mut rng = StdRng::seed_from_u64(self.config.seed.unwrap_or_else(rand::random));
        let duration = match options.duration {
            Some(d) => d,
            None => {
                let b = self.config.duration_bounds;
                rng.random_range(b.min_secs..=b.max_secs)
            }
        };
        if duration > self.config.max_duration_secs {
            return Err(ReelError::validation(format!(
                "duration {duration}s exceeds the {}s limit",
                self.config.max_duration_secs
            )));
        }
        let total_frames = fps.secs_to_frames_round(duration);
        if total_frames == 0 {
            return Err(ReelError::validation(format!(
                "duration {duration}s is shorter than one frame at {} fps",
                fps.get()
            )));
        }

        let run = id.to_string();
        Ok(RunPlan {
            fps,
            total_frames,
            video_path: self.config.output_root.join(format!("{run}.mp4")),
            thumbnail_path: self.config.output_root.join(format!("{run}_thumbnail.jpg")),
            frames_dir: self.config.frames_dir(&run),
            audio_dir: self.config.audio_dir(&run),
            script: self.narration.generate(product, &mut rng),
            id,
        })
    }

    fn run(
        &self,
        product: &Product,
        plan: &RunPlan,
        scratch: &RunScratch,
        controls: &RunControls<'_>,
        machine: &mut RunStateMachine,
    ) -> ReelResult<()> {
        for dir in [&self.config.output_root, &plan.frames_dir, &plan.audio_dir] {
            std::fs::create_dir_all(dir)
                .map_err(|e| ReelError::io_at("create directory", dir, e))?;
        }
        let audio_path = scratch
            .audio_path()
            .ok_or_else(|| ReelError::synthesis("run has no audio path"))?;

        machine.advance(PipelineState::RenderingFrames)?;
        let video_secs = plan.fps.frames_to_secs(plan.total_frames);
        let (frames, audio) = self.pool.install(|| {
            rayon::join(
                || self.render_frames(product, plan, scratch.frame_paths(), &controls.cancel),
                || {
                    self.synthesizer
                        .synthesize(&plan.script, video_secs, audio_path)
                },
            )
        });
        let frames = frames?;
        tracing::info!(frames = frames.len(), "frames rendered");

        machine.advance(PipelineState::SynthesizingAudio)?;
        let audio: AudioTrack = audio?;
        audio.check_covers(plan.total_frames, plan.fps)?;
        controls.cancel.check("audio synthesis")?;

        machine.advance(PipelineState::Encoding)?;
        let options = EncodeOptions {
            fps: plan.fps,
            canvas: self.config.canvas,
            codec: self.config.codec.clone(),
            timeout: self.config.encode_timeout_secs.map(Duration::from_secs),
        };
        let written = self.encoder.encode(EncodeRequest {
            frames: &frames,
            audio: &audio,
            output: &plan.video_path,
            options: &options,
            observer: controls.observer,
            cancel: &controls.cancel,
        })?;
        if !written.is_file() {
            return Err(ReelError::encoding(format!(
                "encoder reported success but '{}' does not exist",
                written.display()
            )));
        }
        tracing::info!(path = %written.display(), "video encoded");

        self.thumbnails.render_to(product, &plan.thumbnail_path)?;

        machine.finish(ReadyChecks {
            frames: frames.len() as u64,
            audio: audio.duration_secs > 0.0 && audio.path.is_file(),
            encoded: written.is_file(),
        })
    }

    fn render_frames(
        &self,
        product: &Product,
        plan: &RunPlan,
        paths: &[PathBuf],
        cancel: &CancelToken,
    ) -> ReelResult<Vec<FrameFile>> {
        let composer = &self.composer;
        let total = plan.total_frames;
        let log_every = u64::from(plan.fps.get());
        let done = AtomicU64::new(0);

        let rendered: Vec<ReelResult<FrameFile>> = paths
            .par_iter()
            .enumerate()
            .map_init(
                || composer.surface(),
                |surface, (i, path)| {
                    cancel.check("frame rendering")?;
                    let surface = surface
                        .as_mut()
                        .map_err(|e| ReelError::render(format!("surface unavailable: {e}")))?;
                    let index = i as u64;
                    let frame = composer.render_frame_on(surface, product, index, total)?;
                    frame.write_png(path)?;

                    let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if n % log_every == 0 || n == total {
                        tracing::info!(rendered = n, total, "rendering frames");
                    }
                    tracing::debug!(path = %path.display(), "frame written");
                    Ok(FrameFile {
                        index: FrameIndex(index),
                        path: path.clone(),
                    })
                },
            )
            .collect();

        rendered.into_iter().collect()
    }
}

/// Scratch path of frame `index` for run `id`.
pub(crate) fn frame_path(frames_dir: &Path, id: &RunId, index: u64) -> PathBuf {
    frames_dir.join(format!("{id}_frame_{index:05}.png"))
}

fn remove_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial output")
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;
