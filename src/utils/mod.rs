//! Utility modules for the asset pipeline.

pub mod fsx;
pub mod svg;
