//! Layout to pixel geometry.

pub(crate) mod plan;
