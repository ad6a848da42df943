//! sweepgrid arranges the clips of a parameter-sweep batch into a labeled video grid.
//!
//! A batch is a directory with one subfolder per run; each folder name encodes the parameter
//! values of that run (for example `20250610233650_A_strength_schedule_0.4_cfg_scale_schedule_7`).
//!
//! # Pipeline overview
//!
//! 1. **Scan**: batch directory -> [`ClipRecord`]s, one per subfolder holding an `.mp4`
//! 2. **Extract**: folder name -> [`ParameterMap`] via an ordered list of [`Strategy`]s
//! 3. **Analyze**: maps -> [`ParameterSpace`] (which parameters actually vary)
//! 4. **Lay out**: space -> [`GridLayout`] (X/Y axes, clip per cell)
//! 5. **Plan**: layout + durations -> [`CompositionPlan`] (pixel geometry, labels, timing)
//! 6. **Render**: a [`RenderBackend`] probes, resizes and composes the final video
//!
//! Steps 1-5 never touch an engine and are deterministic for a given directory listing.
//! [`GridJob`] drives the whole sequence; [`FfmpegBackend`] is the bundled backend.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod assets;
mod compile;
mod encode;
mod foundation;
mod layout;
mod params;
mod render;

pub use assets::scan::{ClipId, ClipRecord, TIMESTAMP_DIGITS, is_timestamp, scan_batch};
pub use compile::plan::{
    CellPlacement, CellSource, CompositionPlan, DurationSource, GridOpts, LabelAnchor,
    LabelPlacement, LabelRole, PlaceholderSpec, common_duration, plan_composition,
};
pub use encode::ffmpeg::{BackendOpts, FfmpegBackend, escape_drawtext};
pub use encode::locate::{EngineTools, locate_engine};
pub use encode::process::{ProcessError, ProcessOutput, run_with_timeout};
pub use foundation::config::SweepConfig;
pub use foundation::core::{Canvas, Fps, PixelRect};
pub use foundation::error::{SweepError, SweepResult};
pub use layout::grid::{
    Axis, AxisChoice, AxisHints, Collision, GridLayout, LayoutKind, build_layout, select_axes,
};
pub use params::extract::{Extractor, ExtractorConfig, MergePolicy, Strategy};
pub use params::map::ParameterMap;
pub use params::space::{ParameterSpace, ParameterStats};
pub use params::value::{ParameterValue, is_numeric_token};
pub use render::backend::{RenderBackend, ResizeRequest};
pub use render::pipeline::{
    ClipSummary, Discovery, GridJob, GridReport, PlanSummary, default_output_path,
};
