//! Cortexfig - reproduce the figures of a bimanual motor-learning
//! manifold study from its published data tables.
//!
//! Each figure is a [`Figure`] unit that reads one workbook (and, for the
//! brain maps, surface assets), derives its statistics and writes SVG files.
//! The [`runner`] drives a batch of units against one [`FigureContext`].

pub mod config;
pub mod data;
pub mod epochs;
pub mod error;
pub mod figures;
pub mod render;
pub mod runner;
pub mod stats;
pub mod style;
pub mod surface_map;

pub use config::FigureConfig;
pub use error::{FigureError, Result};
pub use figures::{Figure, FigureContext, FigureOutput};
pub use runner::{run_batch, FailureMode, RunReport};
pub use style::Style;
