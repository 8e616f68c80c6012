use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::foundation::error::{ReelError, ReelResult};

/// One finished video found in the output root.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListing {
    /// File stem, which is the run id for videos produced here.
    pub id: String,
    /// File name including extension.
    pub filename: String,
    /// Full path.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Creation time, or modification time where the filesystem lacks one.
    pub created_at: DateTime<Utc>,
}

/// Every `.mp4` directly under `output_root`, newest first.
///
/// A missing output root is an empty catalog.
pub fn list_videos(output_root: &Path) -> ReelResult<Vec<VideoListing>> {
    let entries = match std::fs::read_dir(output_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ReelError::io_at("list", output_root, e)),
    };

    let mut videos = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ReelError::io_at("list", output_root, e))?;
        let path = entry.path();
        let is_mp4 = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mp4"));
        if !is_mp4 {
            continue;
        }
        let meta = entry
            .metadata()
            .map_err(|e| ReelError::io_at("stat", &path, e))?;
        if !meta.is_file() {
            continue;
        }
        let created = meta
            .created()
            .or_else(|_| meta.modified())
            .map_err(|e| ReelError::io_at("stat", &path, e))?;

        videos.push(VideoListing {
            id: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            filename: entry.file_name().to_string_lossy().into_owned(),
            size: meta.len(),
            created_at: DateTime::<Utc>::from(created),
            path,
        });
    }

    videos.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.filename.cmp(&b.filename))
    });
    Ok(videos)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/catalog.rs"]
mod tests;
