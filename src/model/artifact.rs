use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::foundation::core::{Canvas, Fps, RunId};
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::product::{Platform, Product};

/// Lifecycle status of a [`VideoArtifact`] as owned by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    /// The run is in progress.
    Generating,
    /// Encoding finished and the video + thumbnail exist.
    Ready,
    /// The run ended with an error.
    Failed,
}

/// Snapshot of the product fields a video was generated from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ArtifactMetadata {
    /// Product title.
    pub product: String,
    /// Product platform.
    pub platform: Platform,
    /// Product price.
    pub price: f64,
    /// Narration script chosen for this run, once selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

/// Record describing one `generate` call.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoArtifact {
    /// Run id, also the stem of the output files.
    pub id: RunId,
    /// Catalog id of the source product.
    pub product_id: String,
    /// Finished video path.
    pub file_path: PathBuf,
    /// Thumbnail path; set only once the thumbnail exists.
    pub thumbnail_path: Option<PathBuf>,
    /// Video duration in seconds.
    pub duration: f64,
    /// Frame dimensions, `"WxH"`.
    pub resolution: String,
    /// Current status.
    pub status: VideoStatus,
    /// Creation timestamp (UTC).
    pub created_at: DateTime<Utc>,
    /// Product snapshot.
    pub metadata: ArtifactMetadata,
}

impl VideoArtifact {
    /// Start a new artifact in [`VideoStatus::Generating`].
    pub fn generating(
        id: RunId,
        product: &Product,
        file_path: PathBuf,
        duration: f64,
        canvas: Canvas,
    ) -> Self {
        Self {
            id,
            product_id: product.id.clone(),
            file_path,
            thumbnail_path: None,
            duration,
            resolution: canvas.resolution(),
            status: VideoStatus::Generating,
            created_at: Utc::now(),
            metadata: ArtifactMetadata {
                product: product.title.clone(),
                platform: product.platform.clone(),
                price: product.price,
                script: None,
            },
        }
    }

    /// Serialize as pretty JSON for callers (CLI, HTTP layer).
    pub fn to_json_pretty(&self) -> ReelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Per-call overrides recognised by `generate`.
///
/// Unrecognised keys in the loose options map are ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenerateOptions {
    /// Video duration in seconds; overrides the computed duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Frames per second; overrides the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framerate: Option<u32>,
}

impl GenerateOptions {
    /// Options with an explicit duration and framerate.
    pub fn new(duration: f64, framerate: u32) -> Self {
        Self {
            duration: Some(duration),
            framerate: Some(framerate),
        }
    }

    /// Read recognised keys from a loose JSON options map.
    pub fn from_json_map(map: &serde_json::Map<String, serde_json::Value>) -> ReelResult<Self> {
        let duration = match map.get("duration") {
            None | Some(serde_json::Value::Null) => None,
            Some(v) => Some(v.as_f64().ok_or_else(|| {
                ReelError::validation(format!("option 'duration' must be a number, got {v}"))
            })?),
        };
        let framerate = match map.get("framerate") {
            None | Some(serde_json::Value::Null) => None,
            Some(v) => {
                let n = v.as_u64().ok_or_else(|| {
                    ReelError::validation(format!(
                        "option 'framerate' must be a positive integer, got {v}"
                    ))
                })?;
                Some(u32::try_from(n).map_err(|_| {
                    ReelError::validation(format!("option 'framerate' out of range: {n}"))
                })?)
            }
        };
        Ok(Self {
            duration,
            framerate,
        })
    }

    /// Resolve the framerate against the configured default.
    pub fn resolve_fps(&self, default_fps: Fps) -> ReelResult<Fps> {
        match self.framerate {
            Some(n) => Fps::new(n),
            None => Ok(default_fps),
        }
    }

    /// Validate an explicit duration, if any.
    pub fn validate_duration(&self) -> ReelResult<()> {
        if let Some(d) = self.duration
            && (!d.is_finite() || d <= 0.0)
        {
            return Err(ReelError::validation(format!(
                "option 'duration' must be a positive number of seconds, got {d}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/artifact.rs"]
mod tests;
