//! Rendering on top of plotters' SVG backend.
//!
//! `canvas` owns the output file, `chart` holds the statistical plot
//! primitives the figures share, and `surface` paints cortical maps.

pub mod canvas;
pub mod chart;
pub mod surface;

pub use canvas::{Artifact, Canvas};
