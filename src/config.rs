//! Configuration loading for cortexfig.
//!
//! Configuration is loaded from TOML files with environment variable overrides.

use crate::error::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "config.default.toml";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FigureConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub surface: SurfaceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_figures_dir")]
    pub figures_dir: PathBuf,

    /// Surface and atlas assets. Falls back to `<data_dir>/resources`.
    #[serde(default)]
    pub resources_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            figures_dir: default_figures_dir(),
            resources_dir: None,
        }
    }
}

impl PathsConfig {
    pub fn resources_dir(&self) -> PathBuf {
        self.resources_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("resources"))
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_figures_dir() -> PathBuf {
    PathBuf::from("figures")
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Pixels per figure inch. Figure sizes in the style table are in inches.
    #[serde(default = "default_px_per_inch")]
    pub px_per_inch: u32,

    /// Also write each unit's derived statistics as JSON.
    #[serde(default)]
    pub save_stats: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            px_per_inch: default_px_per_inch(),
            save_stats: false,
        }
    }
}

fn default_px_per_inch() -> u32 {
    100
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RunConfig {
    /// Stop the batch at the first failing unit.
    #[serde(default)]
    pub fail_fast: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SurfaceConfig {
    /// Surface geometry, e.g. `inflated` reads `lh.inflated` / `rh.inflated`.
    #[serde(default = "default_surface_style")]
    pub style: String,

    /// Annotation name, read from `lh.<atlas>.annot` / `rh.<atlas>.annot`.
    #[serde(default = "default_atlas")]
    pub atlas: String,

    /// Underlay curvature, read from `lh.<sulc>` / `rh.<sulc>`.
    #[serde(default = "default_sulc")]
    pub sulc: String,

    /// Draw a colorbar beside the four-view t-map rows.
    #[serde(default)]
    pub colorbar: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            style: default_surface_style(),
            atlas: default_atlas(),
            sulc: default_sulc(),
            colorbar: false,
        }
    }
}

fn default_surface_style() -> String {
    "inflated".to_string()
}

fn default_atlas() -> String {
    "Schaefer2018_400Parcels_17Networks_order".to_string()
}

fn default_sulc() -> String {
    "sulc".to_string()
}

impl FigureConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false))
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("CORTEXFIG").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FigureError;

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = FigureConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.paths.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.paths.resources_dir(), PathBuf::from("data/resources"));
        assert_eq!(cfg.output.px_per_inch, 100);
        assert!(!cfg.run.fail_fast);
        assert_eq!(cfg.surface.style, "inflated");
        assert!(!cfg.surface.colorbar);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figs.toml");
        std::fs::write(
            &path,
            "[paths]\ndata_dir = \"in\"\nresources_dir = \"assets\"\n\n[output]\nsave_stats = true\n",
        )
        .unwrap();

        let cfg = FigureConfig::load(&path).unwrap();
        assert_eq!(cfg.paths.data_dir, PathBuf::from("in"));
        assert_eq!(cfg.paths.resources_dir(), PathBuf::from("assets"));
        assert!(cfg.output.save_stats);
        assert_eq!(cfg.paths.figures_dir, PathBuf::from("figures"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[output]\npx_per_inch = \"lots\"\n").unwrap();
        let err = FigureConfig::load(&path).unwrap_err();
        assert!(matches!(err, FigureError::Config(_)));
        assert!(err.to_string().starts_with("invalid configuration"));
    }

    #[test]
    fn surface_colorbar_is_opt_in() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figs.toml");
        std::fs::write(&path, "[surface]\ncolorbar = true\n").unwrap();
        let cfg = FigureConfig::load(&path).unwrap();
        assert!(cfg.surface.colorbar);
        assert_eq!(cfg.surface.atlas, "Schaefer2018_400Parcels_17Networks_order");
    }
}
