//! Axis selection and logical grid placement.

pub(crate) mod grid;
