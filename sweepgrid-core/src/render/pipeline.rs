use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::{
    assets::scan::{ClipId, ClipRecord, scan_batch},
    compile::plan::{CellPlacement, CellSource, CompositionPlan, DurationSource, plan_composition},
    foundation::config::SweepConfig,
    foundation::error::{SweepError, SweepResult},
    layout::grid::{GridLayout, LayoutKind, build_layout},
    params::extract::Extractor,
    params::map::ParameterMap,
    params::space::ParameterSpace,
    render::backend::{RenderBackend, ResizeRequest},
};

/// One grid video to produce from a batch directory.
#[derive(Clone, Debug)]
pub struct GridJob {
    /// Directory holding one folder per run.
    pub batch_dir: PathBuf,
    /// Target file; defaults to [`default_output_path`].
    pub output: Option<PathBuf>,
    /// Heuristics, geometry and backend options.
    pub config: SweepConfig,
}

/// Everything known about a batch before any engine call.
#[derive(Clone, Debug)]
pub struct Discovery {
    /// Scanned clips; `ClipId(i)` is `clips[i]`.
    pub clips: Vec<ClipRecord>,
    /// `maps[i]` belongs to `clips[i]`.
    pub maps: Vec<ParameterMap>,
    /// Aggregate over `maps`.
    pub space: ParameterSpace,
    /// Logical grid built from `space`.
    pub layout: GridLayout,
}

/// Outcome of a finished render.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GridReport {
    /// Written video.
    pub output: PathBuf,
    /// Layout shape family.
    pub kind: LayoutKind,
    /// Grid rows.
    pub rows: usize,
    /// Grid columns.
    pub cols: usize,
    /// Column parameter, if any.
    pub x_param: Option<String>,
    /// Row parameter, if any.
    pub y_param: Option<String>,
    /// Clips found by the scan.
    pub clips: usize,
    /// Clips that got a cell.
    pub placed: usize,
    /// Clips left out of the grid.
    pub dropped: usize,
    /// Cells whose clip was overwritten.
    pub collisions: usize,
    /// Cells filled with the placeholder, including failed resizes.
    pub placeholders: usize,
    /// Clips whose every resize attempt failed.
    pub failed_resizes: usize,
    /// Common clip length.
    pub duration_secs: f64,
    /// Whether `duration_secs` was probed.
    pub duration_source: DurationSource,
}

/// One discovered clip as shown by the `plan` command.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ClipSummary {
    /// Position in discovery order.
    pub id: ClipId,
    /// Run folder name.
    pub folder_name: String,
    /// Chosen video file.
    pub path: PathBuf,
    /// Parameters decoded from `folder_name`.
    pub params: ParameterMap,
}

/// Layout and composition plan of a batch, without rendering.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PlanSummary {
    /// Scanned directory.
    pub batch_dir: PathBuf,
    /// Where `render` would write.
    pub output: PathBuf,
    /// Every scanned clip, in discovery order.
    pub clips: Vec<ClipSummary>,
    /// Parameters that vary, first-seen order.
    pub valid_params: Vec<String>,
    /// Logical grid.
    pub layout: GridLayout,
    /// Pixel plan.
    pub plan: CompositionPlan,
}

impl GridJob {
    /// Job writing to the default output path.
    pub fn new(batch_dir: impl Into<PathBuf>, config: SweepConfig) -> Self {
        Self {
            batch_dir: batch_dir.into(),
            output: None,
            config,
        }
    }

    /// Write to `output` instead of the default.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Resolved target file.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.batch_dir))
    }

    /// Scan, extract, analyze and lay out the batch. No engine is involved.
    #[tracing::instrument(skip(self), fields(batch = %self.batch_dir.display()))]
    pub fn discover(&self) -> SweepResult<Discovery> {
        self.config.validate()?;
        let clips = scan_batch(&self.batch_dir)?;

        let extractor = Extractor::new(&self.config.extractor)?;
        let maps: Vec<ParameterMap> = clips
            .iter()
            .map(|clip| {
                let map = extractor.extract(&clip.folder_name);
                if map.is_empty() {
                    tracing::warn!(folder = %clip.folder_name, "no parameters recognised in folder name");
                }
                map
            })
            .collect();

        let space = ParameterSpace::analyze(&maps);
        tracing::info!(
            params = space.params().len(),
            varying = space.valid().count(),
            "analyzed parameters"
        );
        let layout = build_layout(&maps, &space, &self.config.axes)?;
        Ok(Discovery {
            clips,
            maps,
            space,
            layout,
        })
    }

    /// Duration of every placed clip the backend could probe. Failures are logged and skipped.
    pub fn probe_durations(
        &self,
        discovery: &Discovery,
        backend: &dyn RenderBackend,
    ) -> SweepResult<BTreeMap<ClipId, f64>> {
        let ids: Vec<ClipId> = discovery.layout.placed().map(|(_, _, id)| id).collect();
        let clips = &discovery.clips;
        let probe_one = |id: &ClipId| -> Option<(ClipId, f64)> {
            let clip = clips.get(id.0)?;
            match backend.probe_duration(&clip.path) {
                Ok(d) => Some((*id, d)),
                Err(e) => {
                    tracing::warn!(clip = %clip.path.display(), error = %e, "duration unknown");
                    None
                }
            }
        };

        let durations = match self.thread_pool()? {
            Some(pool) => pool.install(|| ids.par_iter().filter_map(probe_one).collect()),
            None => ids.iter().filter_map(probe_one).collect(),
        };
        Ok(durations)
    }

    /// Composition plan; durations are probed only when a backend is given.
    pub fn plan(
        &self,
        discovery: &Discovery,
        backend: Option<&dyn RenderBackend>,
    ) -> SweepResult<CompositionPlan> {
        let durations = match backend {
            Some(backend) => self.probe_durations(discovery, backend)?,
            None => BTreeMap::new(),
        };
        plan_composition(
            &discovery.layout,
            &discovery.clips,
            &durations,
            &self.config.grid,
        )
    }

    /// Discovery and plan bundled for display.
    pub fn plan_summary(&self, backend: Option<&dyn RenderBackend>) -> SweepResult<PlanSummary> {
        let discovery = self.discover()?;
        let plan = self.plan(&discovery, backend)?;
        let clips = discovery
            .clips
            .iter()
            .zip(&discovery.maps)
            .enumerate()
            .map(|(idx, (clip, map))| ClipSummary {
                id: ClipId(idx),
                folder_name: clip.folder_name.clone(),
                path: clip.path.clone(),
                params: map.clone(),
            })
            .collect();
        Ok(PlanSummary {
            batch_dir: self.batch_dir.clone(),
            output: self.output_path(),
            clips,
            valid_params: discovery.space.valid().map(|p| p.name.clone()).collect(),
            layout: discovery.layout,
            plan,
        })
    }

    /// Run the whole pipeline and write the grid video.
    #[tracing::instrument(skip(self, backend), fields(batch = %self.batch_dir.display()))]
    pub fn render(&self, backend: &dyn RenderBackend) -> SweepResult<GridReport> {
        let discovery = self.discover()?;
        let plan = self.plan(&discovery, Some(backend))?;
        if plan.duration_source == DurationSource::Fallback {
            tracing::warn!(
                secs = plan.common_duration_secs,
                "no clip duration could be probed; using fallback"
            );
        }
        tracing::info!(
            engine = %backend.describe(),
            width = plan.canvas.width,
            height = plan.canvas.height,
            duration = plan.common_duration_secs,
            "rendering grid"
        );

        let scratch = ScratchDir::create()?;
        let resized = self.resize_cells(&plan, backend, scratch.path())?;
        let failed_resizes = resized
            .iter()
            .zip(&plan.cells)
            .filter(|(r, c)| r.is_none() && matches!(c.source, CellSource::Clip { .. }))
            .count();

        let placeholder = if resized.iter().any(Option::is_none) {
            let target = scratch.path().join("placeholder.mp4");
            Some(backend.make_placeholder(&plan.placeholder, &target)?)
        } else {
            None
        };
        let inputs: Vec<PathBuf> = resized
            .into_iter()
            .map(|r| r.or_else(|| placeholder.clone()))
            .collect::<Option<_>>()
            .ok_or_else(|| SweepError::compose("a grid cell has no input clip"))?;

        let output = self.output_path();
        backend.compose(&plan, &inputs, &output)?;

        let layout = &discovery.layout;
        let report = GridReport {
            output,
            kind: layout.kind,
            rows: layout.rows(),
            cols: layout.cols(),
            x_param: layout.x.param.clone(),
            y_param: layout.y.param.clone(),
            clips: discovery.clips.len(),
            placed: layout.placed_count(),
            dropped: layout.dropped.len(),
            collisions: layout.collisions.len(),
            placeholders: plan.placeholder_count() + failed_resizes,
            failed_resizes,
            duration_secs: plan.common_duration_secs,
            duration_source: plan.duration_source,
        };
        tracing::info!(output = %report.output.display(), "grid written");
        Ok(report)
    }

    /// Resized path per plan cell; `None` for empty cells and for clips whose every attempt failed.
    fn resize_cells(
        &self,
        plan: &CompositionPlan,
        backend: &dyn RenderBackend,
        scratch: &Path,
    ) -> SweepResult<Vec<Option<PathBuf>>> {
        let attempts = self.config.backend.resize_attempts.max(1);
        let resize_one = |cell: &CellPlacement| -> Option<PathBuf> {
            let CellSource::Clip { path, .. } = &cell.source else {
                return None;
            };
            let output = scratch.join(format!("cell_{}_{}.mp4", cell.row, cell.col));
            let req = ResizeRequest {
                input: path,
                output: &output,
                size: plan.cell_size,
                duration_secs: plan.common_duration_secs,
                fps: plan.fps,
            };
            resize_with_retries(backend, &req, attempts)
        };

        let resized = match self.thread_pool()? {
            Some(pool) => pool.install(|| plan.cells.par_iter().map(resize_one).collect()),
            None => plan.cells.iter().map(resize_one).collect(),
        };
        Ok(resized)
    }

    fn thread_pool(&self) -> SweepResult<Option<rayon::ThreadPool>> {
        if !self.config.backend.parallel {
            return Ok(None);
        }
        build_thread_pool(self.config.backend.threads).map(Some)
    }
}

fn resize_with_retries(
    backend: &dyn RenderBackend,
    req: &ResizeRequest<'_>,
    attempts: u32,
) -> Option<PathBuf> {
    for attempt in 1..=attempts {
        match backend.resize(req) {
            Ok(path) => return Some(path),
            Err(e) => tracing::warn!(
                clip = %req.input.display(),
                attempt,
                attempts,
                error = %e,
                "resize failed"
            ),
        }
    }
    tracing::warn!(clip = %req.input.display(), "using placeholder for clip");
    None
}

/// `<batch_dir>/<batch name>_grid.mp4`.
pub fn default_output_path(batch_dir: &Path) -> PathBuf {
    let name = batch_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            std::fs::canonicalize(batch_dir)
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| "batch".to_string());
    batch_dir.join(format!("{name}_grid.mp4"))
}

fn build_thread_pool(threads: Option<usize>) -> SweepResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SweepError::validation("'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SweepError::validation(format!("failed to build rayon thread pool: {e}")))
}

static SCRATCH_SEQ: AtomicU64 = AtomicU64::new(0);

/// Per-run directory for intermediate clips, removed on drop.
struct ScratchDir(PathBuf);

impl ScratchDir {
    fn create() -> SweepResult<Self> {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!(
            "sweepgrid-{}-{nanos}-{}",
            std::process::id(),
            SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create scratch directory '{}'", dir.display()))?;
        tracing::debug!(dir = %dir.display(), "scratch directory");
        Ok(Self(dir))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
