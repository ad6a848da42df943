/// Convenience result type used across sweepgrid.
pub type SweepResult<T> = Result<T, SweepError>;

/// Top-level error taxonomy used by planner and backend APIs.
///
/// Per-clip problems (an unparsable folder name, a failed probe or resize) are not
/// represented here: they are logged and degraded by the caller instead of aborting a run.
#[derive(thiserror::Error, Debug)]
pub enum SweepError {
    /// Invalid user-provided options or configuration values.
    #[error("validation error: {0}")]
    Validation(String),

    /// No usable media engine could be found.
    #[error("configuration error: {0}")]
    Config(String),

    /// Missing, unreadable or empty batch directory.
    #[error("input error: {0}")]
    Input(String),

    /// Duration probe failed for a clip.
    #[error("probe error: {0}")]
    Probe(String),

    /// Rescaling a clip (or synthesizing a placeholder) failed.
    #[error("resize error: {0}")]
    Resize(String),

    /// Final compositing/encoding failed.
    #[error("compose error: {0}")]
    Compose(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SweepError {
    /// Build a [`SweepError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SweepError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`SweepError::Input`] value.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build a [`SweepError::Probe`] value.
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Build a [`SweepError::Resize`] value.
    pub fn resize(msg: impl Into<String>) -> Self {
        Self::Resize(msg.into())
    }

    /// Build a [`SweepError::Compose`] value.
    pub fn compose(msg: impl Into<String>) -> Self {
        Self::Compose(msg.into())
    }

    /// Build a [`SweepError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
