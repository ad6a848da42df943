use std::path::{Path, PathBuf};

use crate::{
    compile::plan::{CompositionPlan, PlaceholderSpec},
    foundation::core::Fps,
    foundation::error::SweepResult,
};

/// One clip rescaled into a square cell.
#[derive(Clone, Debug, PartialEq)]
pub struct ResizeRequest<'a> {
    /// Source clip.
    pub input: &'a Path,
    /// Scratch file to write.
    pub output: &'a Path,
    /// Target cell side in pixels.
    pub size: u32,
    /// The clip is trimmed (never stretched) to this length.
    pub duration_secs: f64,
    /// Output frame rate.
    pub fps: Fps,
}

/// Media operations the pipeline delegates to an external engine.
///
/// Implementations must be shareable across worker threads; the pipeline may call
/// [`RenderBackend::probe_duration`] and [`RenderBackend::resize`] for different clips
/// concurrently.
pub trait RenderBackend: Sync {
    /// Clip length in seconds.
    fn probe_duration(&self, clip: &Path) -> SweepResult<f64>;

    /// Write a blank clip described by `spec` to `output`.
    fn make_placeholder(&self, spec: &PlaceholderSpec, output: &Path) -> SweepResult<PathBuf>;

    /// Fit `req.input` into a square cell and write it to `req.output`.
    fn resize(&self, req: &ResizeRequest<'_>) -> SweepResult<PathBuf>;

    /// Render the final grid. `inputs[i]` fills `plan.cells[i]`.
    fn compose(
        &self,
        plan: &CompositionPlan,
        inputs: &[PathBuf],
        output: &Path,
    ) -> SweepResult<PathBuf>;

    /// Human-readable engine description for logs and reports.
    fn describe(&self) -> String {
        "render backend".to_string()
    }
}
