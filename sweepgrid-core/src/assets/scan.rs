use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{SweepError, SweepResult};

/// Digit count of the batch timestamps used as clip stems and folder prefixes.
pub const TIMESTAMP_DIGITS: usize = 14;

/// Index of a clip within its batch, in discovery order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ClipId(
    /// Position in [`scan_batch`] output.
    pub usize,
);

/// One discovered clip and the folder it came from.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ClipRecord {
    /// The chosen `.mp4` file.
    pub path: PathBuf,
    /// Name of the run folder; the extractor input.
    pub folder_name: String,
}

impl ClipRecord {
    /// Record for `path` found in `folder_name`.
    pub fn new(path: impl Into<PathBuf>, folder_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            folder_name: folder_name.into(),
        }
    }
}

/// Collect one clip per immediate subdirectory of `batch_dir` that holds an `.mp4` file.
///
/// Subdirectories are visited in name order. Within a folder the clip whose stem equals the
/// folder name wins, then a clip whose stem is a bare timestamp, then the first clip by name.
/// Unreadable subfolders are skipped with a warning.
#[tracing::instrument]
pub fn scan_batch(batch_dir: &Path) -> SweepResult<Vec<ClipRecord>> {
    if !batch_dir.is_dir() {
        return Err(SweepError::input(format!(
            "batch directory '{}' does not exist",
            batch_dir.display()
        )));
    }

    let mut folders = Vec::new();
    for entry in std::fs::read_dir(batch_dir)
        .with_context(|| format!("read batch directory '{}'", batch_dir.display()))?
    {
        let entry =
            entry.with_context(|| format!("read batch directory '{}'", batch_dir.display()))?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            folders.push(entry.path());
        }
    }
    folders.sort();

    let mut clips = Vec::new();
    for folder in folders {
        let Some(folder_name) = folder.file_name().and_then(|n| n.to_str()) else {
            tracing::warn!(folder = %folder.display(), "skipping folder with non-UTF-8 name");
            continue;
        };
        match pick_clip(&folder, folder_name) {
            Ok(Some(path)) => clips.push(ClipRecord::new(path, folder_name)),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(folder = %folder.display(), error = %e, "skipping unreadable folder")
            }
        }
    }

    if clips.is_empty() {
        return Err(SweepError::input(format!(
            "no video files found in batch subdirectories of '{}'",
            batch_dir.display()
        )));
    }
    tracing::info!(clips = clips.len(), "scanned batch");
    Ok(clips)
}

fn pick_clip(folder: &Path, folder_name: &str) -> std::io::Result<Option<PathBuf>> {
    let mut videos = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        if path.is_file() && is_mp4(&path) {
            videos.push(path);
        }
    }
    videos.sort();

    let stem = |p: &PathBuf| {
        p.file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or_default()
    };
    if let Some(renamed) = videos.iter().find(|p| stem(p) == folder_name) {
        return Ok(Some(renamed.clone()));
    }
    if let Some(stamped) = videos.iter().find(|p| is_timestamp(&stem(p))) {
        return Ok(Some(stamped.clone()));
    }
    Ok(videos.into_iter().next())
}

fn is_mp4(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mp4"))
}

/// `true` for a bare batch timestamp such as `20250610233650`.
pub fn is_timestamp(s: &str) -> bool {
    s.len() == TIMESTAMP_DIGITS && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/scan.rs"]
mod tests;
