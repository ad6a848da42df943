//! Discovery of the `ffmpeg`/`ffprobe` pair.
//!
//! Search order: explicit override, `PATH`, per-OS install locations, then a
//! `stable-diffusion-webui` install next to (or above) the working directory. Every candidate
//! must answer `-version` before it is accepted.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::encode::process::run_with_timeout;
use crate::foundation::error::{SweepError, SweepResult};

/// How many directory levels above the working directory the webui search climbs.
const ADJACENT_SEARCH_LEVELS: usize = 5;
const WEBUI_DIR: &str = "stable-diffusion-webui";

/// A verified engine executable and its companion probe tool.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct EngineTools {
    /// Answered `-version`.
    pub ffmpeg: PathBuf,
    /// Derived from `ffmpeg`; not verified separately.
    pub ffprobe: PathBuf,
}

impl EngineTools {
    /// Pair `ffmpeg` with the `ffprobe` that sits next to it.
    pub fn from_ffmpeg(ffmpeg: impl Into<PathBuf>) -> Self {
        let ffmpeg = ffmpeg.into();
        let ffprobe = derive_ffprobe(&ffmpeg);
        Self { ffmpeg, ffprobe }
    }
}

/// Locate a working engine.
///
/// An explicit `override_path` that fails verification is an error; it does not fall through to
/// the remaining search layers.
#[tracing::instrument(skip(version_timeout))]
pub fn locate_engine(
    override_path: Option<&Path>,
    version_timeout: Duration,
) -> SweepResult<EngineTools> {
    if let Some(path) = override_path {
        if responds_to_version(path, version_timeout) {
            tracing::info!(ffmpeg = %path.display(), "using ffmpeg override");
            return Ok(EngineTools::from_ffmpeg(path));
        }
        return Err(SweepError::config(format!(
            "ffmpeg override '{}' is not a working ffmpeg executable",
            path.display()
        )));
    }

    let on_path = Path::new(exe_name());
    if responds_to_version(on_path, version_timeout) {
        tracing::info!("using ffmpeg from PATH");
        return Ok(EngineTools::from_ffmpeg(on_path));
    }

    let cwd = std::env::current_dir().ok();
    let candidates = common_install_paths(home_dir().as_deref())
        .into_iter()
        .chain(cwd.as_deref().map(adjacent_candidates).unwrap_or_default());
    for candidate in candidates {
        tracing::debug!(candidate = %candidate.display(), "checking ffmpeg candidate");
        if candidate.is_file() && responds_to_version(&candidate, version_timeout) {
            tracing::info!(ffmpeg = %candidate.display(), "found ffmpeg");
            return Ok(EngineTools::from_ffmpeg(candidate));
        }
    }

    Err(SweepError::config(
        "ffmpeg not found; install it or pass --ffmpeg-path",
    ))
}

/// `true` when `exe -version` exits successfully within `timeout`.
pub fn responds_to_version(exe: &Path, timeout: Duration) -> bool {
    let mut cmd = Command::new(exe);
    cmd.arg("-version");
    match run_with_timeout(&mut cmd, timeout) {
        Ok(out) => out.success(),
        Err(e) => {
            tracing::debug!(exe = %exe.display(), error = %e, "version check failed");
            false
        }
    }
}

/// Companion `ffprobe` for an `ffmpeg` path: `ffmpeg` in the file name becomes `ffprobe`,
/// falling back to a plain `ffprobe` sibling when the name has no such part.
pub fn derive_ffprobe(ffmpeg: &Path) -> PathBuf {
    let Some(name) = ffmpeg.file_name().and_then(|n| n.to_str()) else {
        return ffmpeg.with_file_name(probe_name());
    };
    if name.contains("ffmpeg") {
        ffmpeg.with_file_name(name.replacen("ffmpeg", "ffprobe", 1))
    } else {
        ffmpeg.with_file_name(probe_name())
    }
}

/// Well-known install locations for the current OS.
pub fn common_install_paths(home: Option<&Path>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    if cfg!(windows) {
        for root in ["C:", "D:", "E:"] {
            paths.push(PathBuf::from(format!("{root}/{WEBUI_DIR}/ffmpeg.exe")));
        }
        paths.extend(
            [
                "C:/ffmpeg/bin/ffmpeg.exe",
                "C:/Program Files/ffmpeg/bin/ffmpeg.exe",
                "C:/Program Files (x86)/ffmpeg/bin/ffmpeg.exe",
                "D:/ffmpeg/bin/ffmpeg.exe",
            ]
            .map(PathBuf::from),
        );
        if let Some(home) = home {
            paths.push(home.join("ffmpeg").join("bin").join("ffmpeg.exe"));
        }
    } else if cfg!(target_os = "macos") {
        paths.extend(
            ["/usr/local/bin/ffmpeg", "/opt/homebrew/bin/ffmpeg", "/usr/bin/ffmpeg"]
                .map(PathBuf::from),
        );
        if let Some(home) = home {
            paths.push(home.join("bin").join("ffmpeg"));
        }
    } else {
        paths.extend(
            ["/usr/bin/ffmpeg", "/usr/local/bin/ffmpeg", "/snap/bin/ffmpeg"].map(PathBuf::from),
        );
        if let Some(home) = home {
            paths.push(home.join("bin").join("ffmpeg"));
            paths.push(home.join(".local").join("bin").join("ffmpeg"));
        }
    }
    paths
}

/// Engine paths inside a webui install found at `cwd` or up to five levels above it.
pub fn adjacent_candidates(cwd: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for dir in cwd.ancestors().take(ADJACENT_SEARCH_LEVELS + 1) {
        out.push(dir.join(WEBUI_DIR).join(exe_name()));
        if dir.file_name().is_some_and(|n| n == WEBUI_DIR) {
            out.push(dir.join(exe_name()));
        }
    }
    out
}

fn exe_name() -> &'static str {
    if cfg!(windows) { "ffmpeg.exe" } else { "ffmpeg" }
}

fn probe_name() -> &'static str {
    if cfg!(windows) { "ffprobe.exe" } else { "ffprobe" }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/locate.rs"]
mod tests;
