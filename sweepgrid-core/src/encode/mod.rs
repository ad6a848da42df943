//! `ffmpeg`-based rendering backend.
//!
//! Every engine call is a child process with a hard timeout.

/// [`crate::RenderBackend`] implementation over the system `ffmpeg`.
pub(crate) mod ffmpeg;
/// Engine discovery.
pub(crate) mod locate;
/// Child processes with timeouts and captured output.
pub(crate) mod process;
