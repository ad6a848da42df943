//! Batch directory discovery.

pub(crate) mod scan;
