use crate::error::Result;
use crate::style::{FigureSize, Style, PAPER};
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// A written figure file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub path: PathBuf,
    pub bytes: u64,
    /// Hex SHA-256 of the file contents.
    pub sha256: String,
}

impl Artifact {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read(path)?;
        let digest = Sha256::digest(&contents);
        let sha256 = digest.iter().map(|b| format!("{:02x}", b)).collect();
        Ok(Self {
            path: path.to_path_buf(),
            bytes: contents.len() as u64,
            sha256,
        })
    }
}

/// A blank white figure backed by an SVG file.
pub struct Canvas<'a> {
    root: Area<'a>,
    path: &'a Path,
}

impl<'a> Canvas<'a> {
    pub fn new(path: &'a Path, size: FigureSize, style: &Style) -> Result<Self> {
        let root = SVGBackend::new(path, size.pixels(style.px_per_inch())).into_drawing_area();
        root.fill(&PAPER)?;
        Ok(Self { root, path })
    }

    pub fn root(&self) -> &Area<'a> {
        &self.root
    }

    /// Flush the drawing to disk and describe the written file.
    pub fn finish(self) -> Result<Artifact> {
        self.root.present()?;
        drop(self.root);
        let artifact = Artifact::from_file(self.path)?;
        info!(
            file = %artifact.path.display(),
            bytes = artifact.bytes,
            sha256 = %artifact.sha256,
            "wrote figure"
        );
        Ok(artifact)
    }
}
