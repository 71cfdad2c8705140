//! Error types shared by every figure unit.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FigureError>;

#[derive(Debug, Error)]
pub enum FigureError {
    /// An input file the unit depends on is not on disk.
    #[error("missing input file: {}", path.display())]
    MissingInput { path: PathBuf },

    /// A table does not have the sheets, columns or cell types a unit expects.
    #[error("malformed table '{table}': {reason}")]
    Schema { table: String, reason: String },

    /// A surface-mapping key does not name any atlas region.
    #[error("region '{region}' is not defined in atlas '{atlas}'")]
    UnknownRegion { region: String, atlas: String },

    /// A style lookup used a name the style table does not define.
    #[error("unknown {kind} style '{name}'")]
    UnknownStyle { kind: &'static str, name: String },

    #[error("failed to read spreadsheet {}: {reason}", path.display())]
    Spreadsheet { path: PathBuf, reason: String },

    #[error("failed to read surface asset {}: {reason}", path.display())]
    Asset { path: PathBuf, reason: String },

    #[error("render failed: {0}")]
    Render(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("unknown figure id '{0}'")]
    UnknownFigure(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl FigureError {
    pub fn schema(table: impl Into<String>, reason: impl Into<String>) -> Self {
        FigureError::Schema {
            table: table.into(),
            reason: reason.into(),
        }
    }
}

impl<E> From<plotters::drawing::DrawingAreaErrorKind<E>> for FigureError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        FigureError::Render(err.to_string())
    }
}
