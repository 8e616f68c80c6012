use std::ffi::OsString;
use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::encode::encoder::{EncodeRequest, Encoder, check_frame_sequence};
use crate::encode::progress::ProgressReporter;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::read_frame_rgba8;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Production [`Encoder`] driving the system `ffmpeg` binary.
///
/// Frames are decoded in order and streamed to `ffmpeg` stdin as raw RGBA from a writer thread
/// while the calling thread watches the child for exit, cancellation, and the timeout. The
/// narration is read from its `f32le` file. Output is H.264 (yuv420p) + AAC in an MP4 with the
/// moov atom up front.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder {
    program: PathBuf,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
        }
    }
}

impl FfmpegEncoder {
    /// Encoder using `ffmpeg` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder using a specific `ffmpeg` executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn spawn(&self, request: &EncodeRequest<'_>) -> ReelResult<Child> {
        Command::new(&self.program)
            .args(ffmpeg_args(request))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ReelError::encoding(format!(
                    "failed to spawn '{}' (is it installed and on PATH?): {e}",
                    self.program.display()
                ))
            })
    }
}

impl Encoder for FfmpegEncoder {
    #[tracing::instrument(skip_all, fields(output = %request.output.display(), frames = request.frames.len()))]
    fn encode(&self, request: EncodeRequest<'_>) -> ReelResult<PathBuf> {
        check_frame_sequence(request.frames)?;
        request.options.canvas.validate()?;
        request.cancel.check("encoding")?;
        if !is_program_available(&self.program) {
            return Err(ReelError::encoding(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }
        ensure_parent_dir(request.output)?;

        let mut child = self.spawn(&request)?;
        let stdin = child.stdin.take();
        let stderr_drain = child.stderr.take().map(|mut stderr| {
            std::thread::spawn(move || {
                let mut bytes = Vec::new();
                stderr.read_to_end(&mut bytes)?;
                Ok::<_, std::io::Error>(bytes)
            })
        });
        let deadline = request.options.timeout.map(|t| Instant::now() + t);
        let mut progress = ProgressReporter::new(request.observer);
        let writer_failed = AtomicBool::new(false);

        // The writer may block in `write_all` on a stalled child; killing the child unblocks it.
        let (streamed, status) = std::thread::scope(|scope| {
            let req = &request;
            let progress = &mut progress;
            let failed = &writer_failed;
            let writer = scope.spawn(move || {
                let streamed = stream_frames(req, stdin, progress);
                if streamed.is_err() {
                    failed.store(true, Ordering::SeqCst);
                }
                streamed
            });
            let status = supervise(&mut child, req, deadline, failed);
            let streamed = writer
                .join()
                .unwrap_or_else(|_| Err(ReelError::encoding("ffmpeg frame writer panicked")));
            (streamed, status)
        });
        let stderr = stderr_drain
            .and_then(|h| h.join().ok())
            .and_then(Result::ok)
            .map(|b| String::from_utf8_lossy(&b).trim().to_string())
            .unwrap_or_default();

        // Errors from the child take precedence over a broken pipe in the writer.
        let status = status?;
        if let Some(status) = status
            && !status.success()
        {
            return Err(ReelError::encoding(format!(
                "ffmpeg exited with status {status}: {stderr}"
            )));
        }
        streamed.map_err(|e| attach_stderr(e, &stderr))?;
        match status {
            Some(_) => {
                progress.complete();
                tracing::info!("ffmpeg finished");
                Ok(request.output.to_path_buf())
            }
            None => Err(ReelError::encoding("ffmpeg was terminated")),
        }
    }
}

fn stream_frames(
    request: &EncodeRequest<'_>,
    stdin: Option<std::process::ChildStdin>,
    progress: &mut ProgressReporter<'_>,
) -> ReelResult<()> {
    let mut stdin = stdin.ok_or_else(|| ReelError::encoding("failed to open ffmpeg stdin"))?;
    let expected = request.options.canvas;
    let total = request.frames.len() as u64;

    for frame in request.frames {
        request.cancel.check("encoding")?;

        let (canvas, rgba) = read_frame_rgba8(&frame.path)?;
        if canvas != expected {
            return Err(ReelError::encoding(format!(
                "frame {} is {canvas}, expected {expected}",
                frame.index.0
            )));
        }
        stdin.write_all(&rgba).map_err(|e| {
            ReelError::encoding(format!(
                "failed to write frame {} to ffmpeg stdin: {e}",
                frame.index.0
            ))
        })?;
        progress.step(frame.index.0 + 1, total);
    }
    drop(stdin);
    Ok(())
}

/// Poll the child until it exits, killing it on cancel, timeout, or a failed writer.
///
/// `Ok(None)` means the child was still running when the writer gave up and was killed.
fn supervise(
    child: &mut Child,
    request: &EncodeRequest<'_>,
    deadline: Option<Instant>,
    writer_failed: &AtomicBool,
) -> ReelResult<Option<ExitStatus>> {
    loop {
        if let Err(e) = request
            .cancel
            .check("encoding")
            .and_then(|()| check_deadline(deadline, request))
        {
            tracing::warn!(error = %e, "stopping ffmpeg");
            kill(child);
            return Err(e);
        }
        if writer_failed.load(Ordering::SeqCst) {
            if let Ok(Some(status)) = child.try_wait() {
                return Ok(Some(status));
            }
            kill(child);
            return Ok(None);
        }
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {}
            Err(e) => {
                kill(child);
                return Err(ReelError::encoding(format!("failed to wait for ffmpeg: {e}")));
            }
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn check_deadline(deadline: Option<Instant>, request: &EncodeRequest<'_>) -> ReelResult<()> {
    match (deadline, request.options.timeout) {
        (Some(deadline), Some(timeout)) if Instant::now() >= deadline => Err(ReelError::encoding(
            format!("ffmpeg timed out after {}s", timeout.as_secs_f64()),
        )),
        _ => Ok(()),
    }
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "ffmpeg already exited");
    }
    let _ = child.wait();
}

fn attach_stderr(err: ReelError, stderr: &str) -> ReelError {
    match err {
        ReelError::Encoding(msg) if !stderr.is_empty() => {
            ReelError::Encoding(format!("{msg}: {stderr}"))
        }
        other => other,
    }
}

/// Command line for one encode, excluding the program name.
pub fn ffmpeg_args(request: &EncodeRequest<'_>) -> Vec<OsString> {
    let opts = request.options;
    let audio = request.audio;
    let codec = &opts.codec;
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |s: &str| args.push(OsString::from(s));

    for a in ["-y", "-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgba", "-s"] {
        push(a);
    }
    push(&opts.canvas.to_string());
    push("-r");
    push(&opts.fps.get().to_string());
    for a in ["-i", "pipe:0", "-f", "f32le", "-ar"] {
        push(a);
    }
    push(&audio.sample_rate.to_string());
    push("-ac");
    push(&audio.channels.to_string());
    push("-i");
    args.push(audio.path.clone().into_os_string());

    let crf = codec.crf.to_string();
    let output_args: [&str; 18] = [
        "-c:v",
        &codec.video_codec,
        "-preset",
        &codec.preset,
        "-crf",
        &crf,
        "-pix_fmt",
        &codec.pixel_format,
        "-aspect",
        "9:16",
        "-c:a",
        &codec.audio_codec,
        "-b:a",
        &codec.audio_bitrate,
        "-shortest",
        "-movflags",
        "+faststart",
        "-f",
    ];
    args.extend(output_args.iter().map(OsString::from));
    args.push(OsString::from("mp4"));
    args.push(request.output.as_os_str().to_os_string());
    args
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| ReelError::io_at("create output directory", parent, e))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_program_available(Path::new("ffmpeg"))
}

fn is_program_available(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
