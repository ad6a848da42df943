//! Rendering backend seam and the end-to-end pipeline driver.

/// Media operations delegated to an external engine.
pub(crate) mod backend;
/// Scan-to-compose driver.
pub(crate) mod pipeline;
