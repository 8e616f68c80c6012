use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

/// Outcome of one cleanup pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Files deleted by this pass.
    pub removed: usize,
    /// Files that were already gone.
    pub missing: usize,
    /// Files that could not be deleted, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl CleanupReport {
    /// Whether every listed file is gone.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Best-effort deletion of per-run scratch files.
///
/// Never fails: problems are logged and reported, and the remaining files are still attempted.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResourceJanitor;

impl ResourceJanitor {
    /// Delete `frames` and `audio`, then prune their directories if left empty. Idempotent.
    pub fn cleanup(&self, frames: &[PathBuf], audio: Option<&Path>) -> CleanupReport {
        let mut report = CleanupReport::default();
        let mut dirs: Vec<&Path> = Vec::new();

        for path in frames.iter().map(PathBuf::as_path).chain(audio) {
            match std::fs::remove_file(path) {
                Ok(()) => report.removed += 1,
                Err(e) if e.kind() == IoErrorKind::NotFound => report.missing += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to delete scratch file");
                    report.failed.push((path.to_path_buf(), e.to_string()));
                }
            }
            if let Some(parent) = path.parent()
                && !dirs.contains(&parent)
            {
                dirs.push(parent);
            }
        }

        for dir in dirs {
            if dir.as_os_str().is_empty() {
                continue;
            }
            // Fails harmlessly when the directory still has entries or is already gone.
            if std::fs::remove_dir(dir).is_ok() {
                tracing::debug!(dir = %dir.display(), "pruned scratch directory");
            }
        }

        tracing::info!(
            removed = report.removed,
            missing = report.missing,
            failed = report.failed.len(),
            "scratch cleanup finished"
        );
        report
    }
}

/// Scratch files owned by one run, cleaned up on release or drop.
#[derive(Debug)]
pub(crate) struct RunScratch {
    janitor: ResourceJanitor,
    frames: Vec<PathBuf>,
    audio: Option<PathBuf>,
    released: bool,
}

impl RunScratch {
    pub(crate) fn new(janitor: ResourceJanitor, frames: Vec<PathBuf>, audio: PathBuf) -> Self {
        Self {
            janitor,
            frames,
            audio: Some(audio),
            released: false,
        }
    }

    pub(crate) fn frame_paths(&self) -> &[PathBuf] {
        &self.frames
    }

    pub(crate) fn audio_path(&self) -> Option<&Path> {
        self.audio.as_deref()
    }

    /// Clean up now and return the report.
    pub(crate) fn release(mut self) -> CleanupReport {
        self.released = true;
        self.janitor.cleanup(&self.frames, self.audio.as_deref())
    }
}

impl Drop for RunScratch {
    fn drop(&mut self) {
        if !self.released {
            self.janitor.cleanup(&self.frames, self.audio.as_deref());
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/janitor.rs"]
mod tests;
