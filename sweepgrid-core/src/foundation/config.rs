use std::path::Path;

use anyhow::Context as _;

use crate::{
    compile::plan::GridOpts,
    encode::ffmpeg::BackendOpts,
    foundation::error::{SweepError, SweepResult},
    layout::grid::AxisHints,
    params::extract::ExtractorConfig,
};

/// Every tunable of a run, loadable from a JSON file.
///
/// All sections and fields are optional; missing values take their defaults.
///
/// ```json
/// { "grid": { "cell_size": 200 }, "backend": { "parallel": false } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// Folder-name heuristics.
    pub extractor: ExtractorConfig,
    /// Parameter names pinned to the X and Y axes.
    pub axes: AxisHints,
    /// Canvas geometry and timing.
    pub grid: GridOpts,
    /// Engine timeouts, retries, threading and label style.
    pub backend: BackendOpts,
}

impl SweepConfig {
    /// Parse a JSON document; unknown fields are rejected.
    pub fn from_json(json: &str) -> SweepResult<Self> {
        serde_json::from_str(json).map_err(|e| SweepError::serde(e.to_string()))
    }

    /// Read and parse a JSON config file.
    #[tracing::instrument]
    pub fn from_path(path: &Path) -> SweepResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        Self::from_json(&text).map_err(|e| match e {
            SweepError::Serde(msg) => SweepError::serde(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Validate every section.
    pub fn validate(&self) -> SweepResult<()> {
        self.extractor.validate()?;
        self.grid.validate()?;
        self.backend.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
