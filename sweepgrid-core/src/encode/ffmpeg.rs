use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Context as _;
use regex::Regex;

use crate::compile::plan::{CompositionPlan, LabelAnchor, LabelPlacement, PlaceholderSpec};
use crate::encode::locate::{EngineTools, locate_engine};
use crate::encode::process::{ProcessOutput, run_with_timeout};
use crate::foundation::error::{SweepError, SweepResult};
use crate::render::backend::{RenderBackend, ResizeRequest};

/// Timeouts, retry policy, threading and label styling for [`FfmpegBackend`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BackendOpts {
    /// Per-clip duration probe.
    pub probe_timeout_secs: u64,
    /// Placeholder clip generation.
    pub placeholder_timeout_secs: u64,
    /// Per resize attempt.
    pub resize_timeout_secs: u64,
    /// Final composition and encode.
    pub compose_timeout_secs: u64,
    /// Budget for each `-version` check during engine discovery.
    pub version_timeout_secs: u64,
    /// Total tries per clip before its cell falls back to the placeholder.
    pub resize_attempts: u32,
    /// Probe and resize clips on a rayon pool.
    pub parallel: bool,
    /// Worker count for the pool; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Font for labels; ffmpeg's default font lookup is used when unset.
    pub font_file: Option<PathBuf>,
    /// drawtext `fontcolor`.
    pub text_color: String,
    /// drawtext `boxcolor` behind every label.
    pub box_color: String,
}

impl Default for BackendOpts {
    fn default() -> Self {
        Self {
            probe_timeout_secs: 10,
            placeholder_timeout_secs: 30,
            resize_timeout_secs: 60,
            compose_timeout_secs: 300,
            version_timeout_secs: 5,
            resize_attempts: 2,
            parallel: true,
            threads: None,
            font_file: None,
            text_color: "white".to_string(),
            box_color: "black@0.7".to_string(),
        }
    }
}

impl BackendOpts {
    /// Reject zero timeouts, attempts and thread counts.
    pub fn validate(&self) -> SweepResult<()> {
        for (name, secs) in [
            ("probe_timeout_secs", self.probe_timeout_secs),
            ("placeholder_timeout_secs", self.placeholder_timeout_secs),
            ("resize_timeout_secs", self.resize_timeout_secs),
            ("compose_timeout_secs", self.compose_timeout_secs),
            ("version_timeout_secs", self.version_timeout_secs),
        ] {
            if secs == 0 {
                return Err(SweepError::validation(format!("{name} must be > 0")));
            }
        }
        if self.resize_attempts == 0 {
            return Err(SweepError::validation("resize_attempts must be >= 1"));
        }
        if self.threads == Some(0) {
            return Err(SweepError::validation("threads must be >= 1 when set"));
        }
        Ok(())
    }

    /// [`Self::version_timeout_secs`] as a [`Duration`].
    pub fn version_timeout(&self) -> Duration {
        Duration::from_secs(self.version_timeout_secs)
    }
}

/// [`RenderBackend`] driving the system `ffmpeg`/`ffprobe` executables.
#[derive(Clone, Debug)]
pub struct FfmpegBackend {
    tools: EngineTools,
    opts: BackendOpts,
}

impl FfmpegBackend {
    /// Backend over already located `tools`.
    pub fn new(tools: EngineTools, opts: BackendOpts) -> SweepResult<Self> {
        opts.validate()?;
        Ok(Self { tools, opts })
    }

    /// Discover the engine (see [`locate_engine`]) and wrap it.
    pub fn locate(override_path: Option<&Path>, opts: BackendOpts) -> SweepResult<Self> {
        opts.validate()?;
        let tools = locate_engine(override_path, opts.version_timeout())?;
        Self::new(tools, opts)
    }

    fn ffmpeg(&self, args: Vec<OsString>, timeout_secs: u64) -> Result<ProcessOutput, String> {
        let mut cmd = Command::new(&self.tools.ffmpeg);
        cmd.args(args);
        run_with_timeout(&mut cmd, Duration::from_secs(timeout_secs)).map_err(|e| e.to_string())
    }
}

impl RenderBackend for FfmpegBackend {
    #[tracing::instrument(skip(self))]
    fn probe_duration(&self, clip: &Path) -> SweepResult<f64> {
        let timeout = Duration::from_secs(self.opts.probe_timeout_secs);

        let mut cmd = Command::new(&self.tools.ffprobe);
        cmd.args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(clip);
        match run_with_timeout(&mut cmd, timeout) {
            Ok(out) if out.success() => {
                if let Some(d) = parse_ffprobe_duration(&out.stdout_text()) {
                    return Ok(d);
                }
                tracing::debug!("ffprobe reported no duration; trying ffmpeg");
            }
            Ok(out) => tracing::debug!(status = %out.status, "ffprobe failed; trying ffmpeg"),
            Err(e) => tracing::debug!(error = %e, "ffprobe unavailable; trying ffmpeg"),
        }

        // `ffmpeg -i` without an output exits non-zero but still prints the input header.
        let out = self
            .ffmpeg(
                vec!["-hide_banner".into(), "-i".into(), clip.into()],
                self.opts.probe_timeout_secs,
            )
            .map_err(SweepError::probe)?;
        parse_ffmpeg_duration(&String::from_utf8_lossy(&out.stderr)).ok_or_else(|| {
            SweepError::probe(format!("no duration reported for '{}'", clip.display()))
        })
    }

    #[tracing::instrument(skip(self, spec))]
    fn make_placeholder(&self, spec: &PlaceholderSpec, output: &Path) -> SweepResult<PathBuf> {
        let out = self
            .ffmpeg(placeholder_args(spec, output), self.opts.placeholder_timeout_secs)
            .map_err(|e| SweepError::resize(format!("placeholder: {e}")))?;
        if !out.success() || !output.is_file() {
            return Err(SweepError::resize(format!(
                "placeholder: ffmpeg exited with status {}: {}",
                out.status,
                out.stderr_text()
            )));
        }
        Ok(output.to_path_buf())
    }

    #[tracing::instrument(skip(self, req), fields(input = %req.input.display()))]
    fn resize(&self, req: &ResizeRequest<'_>) -> SweepResult<PathBuf> {
        let out = self
            .ffmpeg(resize_args(req), self.opts.resize_timeout_secs)
            .map_err(SweepError::resize)?;
        if !out.success() || !req.output.is_file() {
            return Err(SweepError::resize(format!(
                "ffmpeg exited with status {}: {}",
                out.status,
                out.stderr_text()
            )));
        }
        Ok(req.output.to_path_buf())
    }

    #[tracing::instrument(skip(self, plan, inputs), fields(cells = inputs.len()))]
    fn compose(
        &self,
        plan: &CompositionPlan,
        inputs: &[PathBuf],
        output: &Path,
    ) -> SweepResult<PathBuf> {
        ensure_parent_dir(output)?;
        // Encode next to the target and rename at the end so a failed run never leaves a
        // truncated file under the final name.
        let partial = partial_path(output);
        let args = compose_args(plan, inputs, &partial, &self.opts)?;
        tracing::debug!(
            width = plan.canvas.even().width,
            height = plan.canvas.even().height,
            "composing grid"
        );

        match self.ffmpeg(args, self.opts.compose_timeout_secs) {
            Ok(out) if out.success() => {}
            Ok(out) => {
                let _ = std::fs::remove_file(&partial);
                return Err(SweepError::compose(format!(
                    "ffmpeg exited with status {}: {}",
                    out.status,
                    out.stderr_text()
                )));
            }
            Err(e) => {
                let _ = std::fs::remove_file(&partial);
                return Err(SweepError::compose(e));
            }
        }

        std::fs::rename(&partial, output).with_context(|| {
            format!(
                "failed to move '{}' to '{}'",
                partial.display(),
                output.display()
            )
        })?;
        Ok(output.to_path_buf())
    }

    fn describe(&self) -> String {
        format!("ffmpeg at '{}'", self.tools.ffmpeg.display())
    }
}

/// `format.duration` from `ffprobe -print_format json -show_format` output.
pub fn parse_ffprobe_duration(json: &str) -> Option<f64> {
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    let duration = &value["format"]["duration"];
    let secs = match duration {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        serde_json::Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    (secs.is_finite() && secs > 0.0).then_some(secs)
}

static DURATION_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"Duration: (\d{2}):(\d{2}):(\d{2}\.?\d*)").ok());

/// First `Duration: HH:MM:SS.ss` line of an ffmpeg input header.
pub fn parse_ffmpeg_duration(stderr: &str) -> Option<f64> {
    let caps = DURATION_LINE.as_ref()?.captures(stderr)?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    let secs = hours * 3600.0 + minutes * 60.0 + seconds;
    (secs > 0.0).then_some(secs)
}

/// Escape free text for use as a drawtext option value inside a filtergraph.
///
/// Two parsing levels apply: the filter's option list (`\ ' :`) and the filtergraph
/// itself (`\ ' [ ] , ;`).
pub fn escape_drawtext(text: &str) -> String {
    let option_level = escape_chars(text, &['\\', '\'', ':']);
    escape_chars(&option_level, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn secs(d: f64) -> String {
    format!("{d:.3}")
}

fn common_args() -> Vec<OsString> {
    ["-hide_banner", "-loglevel", "error", "-y"]
        .map(OsString::from)
        .to_vec()
}

fn encode_args(args: &mut Vec<OsString>) {
    args.extend(["-c:v", "libx264", "-pix_fmt", "yuv420p"].map(OsString::from));
}

/// `ffmpeg` arguments for a black clip matching `spec`.
pub fn placeholder_args(spec: &PlaceholderSpec, output: &Path) -> Vec<OsString> {
    let mut args = common_args();
    args.extend(["-f", "lavfi", "-i"].map(OsString::from));
    args.push(
        format!(
            "color=black:size={0}x{0}:duration={1}:rate={2}",
            spec.size,
            secs(spec.duration_secs),
            spec.fps.to_ffmpeg_rate()
        )
        .into(),
    );
    encode_args(&mut args);
    args.push(output.into());
    args
}

/// `ffmpeg` arguments that fit `req.input` into a square cell.
pub fn resize_args(req: &ResizeRequest<'_>) -> Vec<OsString> {
    let s = req.size;
    let mut args = common_args();
    args.push("-i".into());
    args.push(req.input.into());
    args.push("-vf".into());
    args.push(
        format!(
            "scale={s}:{s}:force_original_aspect_ratio=decrease,\
             pad={s}:{s}:(ow-iw)/2:(oh-ih)/2:black,setsar=1"
        )
        .into(),
    );
    args.extend([
        OsString::from("-t"),
        secs(req.duration_secs).into(),
        "-r".into(),
        req.fps.to_ffmpeg_rate().into(),
        "-an".into(),
    ]);
    encode_args(&mut args);
    args.push(req.output.into());
    args
}

/// Full `-filter_complex` graph: canvas, one overlay per cell, then every label.
pub fn filter_graph(plan: &CompositionPlan, opts: &BackendOpts) -> String {
    let canvas = plan.canvas.even();
    let mut parts = vec![format!(
        "color=black:size={}x{}:duration={}:rate={}[canvas]",
        canvas.width,
        canvas.height,
        secs(plan.common_duration_secs),
        plan.fps.to_ffmpeg_rate()
    )];

    let mut current = "canvas".to_string();
    for (idx, cell) in plan.cells.iter().enumerate() {
        let next = format!("v{idx}");
        parts.push(format!(
            "[{current}][{idx}:v]overlay={}:{}[{next}]",
            cell.rect.x, cell.rect.y
        ));
        current = next;
    }

    let text: Vec<String> = plan.labels.iter().map(|l| drawtext(l, opts)).collect();
    let tail = if text.is_empty() {
        "null".to_string()
    } else {
        text.join(",")
    };
    parts.push(format!("[{current}]{tail}[out]"));
    parts.join(";")
}

fn drawtext(label: &LabelPlacement, opts: &BackendOpts) -> String {
    let (x, y) = match label.anchor {
        LabelAnchor::TopLeft => (label.x.to_string(), label.y.to_string()),
        LabelAnchor::TopCenter => (format!("{}-text_w/2", label.x), label.y.to_string()),
        LabelAnchor::MiddleLeft => (label.x.to_string(), format!("{}-text_h/2", label.y)),
    };
    let mut filter = format!(
        "drawtext=expansion=none:text={}:fontsize={}:fontcolor={}:box=1:boxcolor={}:x={x}:y={y}",
        escape_drawtext(&label.text),
        label.font_size,
        escape_drawtext(&opts.text_color),
        escape_drawtext(&opts.box_color),
    );
    if let Some(font) = &opts.font_file {
        filter.push_str(":fontfile=");
        filter.push_str(&escape_drawtext(&font.to_string_lossy()));
    }
    filter
}

/// `ffmpeg` arguments for the final composition; `inputs` follow `plan.cells`.
pub fn compose_args(
    plan: &CompositionPlan,
    inputs: &[PathBuf],
    output: &Path,
    opts: &BackendOpts,
) -> SweepResult<Vec<OsString>> {
    if inputs.len() != plan.cells.len() {
        return Err(SweepError::validation(format!(
            "compose needs one input per cell: got {} inputs for {} cells",
            inputs.len(),
            plan.cells.len()
        )));
    }

    let mut args = common_args();
    for input in inputs {
        args.push("-i".into());
        args.push(input.into());
    }
    args.push("-filter_complex".into());
    args.push(filter_graph(plan, opts).into());
    args.extend([
        OsString::from("-map"),
        "[out]".into(),
        "-t".into(),
        secs(plan.common_duration_secs).into(),
        "-r".into(),
        plan.fps.to_ffmpeg_rate().into(),
        "-an".into(),
    ]);
    encode_args(&mut args);
    args.extend(["-movflags", "+faststart"].map(OsString::from));
    args.push(output.into());
    Ok(args)
}

fn partial_path(output: &Path) -> PathBuf {
    output.with_extension("partial.mp4")
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> SweepResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
