//! Figure units - each reproduces one paper figure from its workbook.

pub mod fig_1b;
pub mod fig_3e;
pub mod fig_4e;
pub mod fig_6bd;
pub mod fig_8;
pub mod fig_9b;
pub mod fig_s3;
pub mod fig_s4;
pub mod fig_s7be;

use crate::config::{FigureConfig, SurfaceConfig};
use crate::data::table::{MeasurementTable, Workbook};
use crate::epochs::Epoch;
use crate::error::{FigureError, Result};
use crate::render::canvas::Area;
use crate::render::chart::{self, AxesSpec, Axis, Chart, Jitter};
use crate::render::Artifact;
use crate::stats;
use crate::style::Style;
use plotters::style::RGBColor;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Named scalars a unit computed on the way to its plots.
pub type DerivedStats = BTreeMap<String, f64>;

/// Trait for all figure units.
pub trait Figure {
    /// Figure id as printed in the paper, e.g. `S4`.
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Workbook files read from the data directory.
    fn inputs(&self) -> &'static [&'static str];

    /// Load, derive and write every image of this figure.
    fn render(&self, ctx: &FigureContext) -> Result<FigureOutput>;
}

/// Read-only inputs shared by every unit of a run.
#[derive(Debug, Clone)]
pub struct FigureContext {
    pub data_dir: PathBuf,
    pub resources_dir: PathBuf,
    pub figures_dir: PathBuf,
    pub style: Style,
    pub surface: SurfaceConfig,
    pub save_stats: bool,
}

impl FigureContext {
    pub fn from_config(config: &FigureConfig) -> Self {
        Self {
            data_dir: config.paths.data_dir.clone(),
            resources_dir: config.paths.resources_dir(),
            figures_dir: config.paths.figures_dir.clone(),
            style: Style::new(config.output.px_per_inch),
            surface: config.surface.clone(),
            save_stats: config.output.save_stats,
        }
    }

    pub fn workbook(&self, file: &str) -> Result<Workbook> {
        Workbook::open(&self.data_dir.join(file))
    }

    pub fn output_path(&self, file: &str) -> PathBuf {
        self.figures_dir.join(file)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FigureOutput {
    pub artifacts: Vec<Artifact>,
    pub stats: DerivedStats,
}

impl FigureOutput {
    pub fn record(&mut self, key: impl Into<String>, value: f64) {
        self.stats.insert(key.into(), value);
    }

    /// Write `<id>_stats.json` next to the figures.
    pub fn save_stats(&self, dir: &Path, id: &str) -> Result<PathBuf> {
        let path = dir.join(format!("{id}_stats.json"));
        let json = serde_json::to_string_pretty(&self.stats)?;
        fs::write(&path, json)?;
        info!(file = %path.display(), entries = self.stats.len(), "wrote stats");
        Ok(path)
    }
}

/// Every unit, in run order.
pub fn registry() -> Vec<Box<dyn Figure>> {
    vec![
        Box::new(fig_1b::Fig1B),
        Box::new(fig_3e::Fig3E),
        Box::new(fig_4e::Fig4E),
        Box::new(fig_6bd::Fig6BD),
        Box::new(fig_8::Fig8),
        Box::new(fig_9b::Fig9B),
        Box::new(fig_s3::FigS3),
        Box::new(fig_s4::FigS4),
        Box::new(fig_s7be::FigS7BE),
    ]
}

/// Look up a unit by id, ignoring case.
pub fn find(id: &str) -> Result<Box<dyn Figure>> {
    registry()
        .into_iter()
        .find(|f| f.id().eq_ignore_ascii_case(id.trim()))
        .ok_or_else(|| FigureError::UnknownFigure(id.to_string()))
}

/// The requested units in registry order; every id must exist.
pub fn select(ids: &[String]) -> Result<Vec<Box<dyn Figure>>> {
    for id in ids {
        find(id)?;
    }
    Ok(registry()
        .into_iter()
        .filter(|f| ids.iter().any(|id| f.id().eq_ignore_ascii_case(id.trim())))
        .collect())
}

/// Values of `value` placed on the chronological epoch axis, sorted by epoch.
pub(crate) fn epoch_points(table: &MeasurementTable, value: &str) -> Result<Vec<(usize, f64)>> {
    table.require(&["epoch", value])?;
    let epochs = table.text("epoch")?;
    let values = table.numeric(value)?;
    let mut points = epochs
        .iter()
        .zip(values)
        .map(|(e, v)| -> Result<(usize, f64)> { Ok((e.parse::<Epoch>()?.index(), v)) })
        .collect::<Result<Vec<_>>>()?;
    points.sort_by_key(|(i, _)| *i);
    Ok(points)
}

/// Like [`epoch_points`], after averaging rows per subject and epoch.
pub(crate) fn subject_epoch_points(table: &MeasurementTable, subject: &str, value: &str) -> Result<Vec<(usize, f64)>> {
    table.require(&[subject, "epoch", value])?;
    let mut points = table
        .group_mean(&[subject, "epoch"], value)?
        .into_iter()
        .map(|(key, mean)| -> Result<(usize, f64)> { Ok((key[1].parse::<Epoch>()?.index(), mean)) })
        .collect::<Result<Vec<_>>>()?;
    points.sort_by_key(|(i, _)| *i);
    Ok(points)
}

/// Per-category mean of the finite values; `NaN` for empty categories.
pub(crate) fn category_means(points: &[(usize, f64)], n: usize) -> Vec<f64> {
    (0..n)
        .map(|c| {
            let values: Vec<f64> = points
                .iter()
                .filter(|(i, v)| *i == c && v.is_finite())
                .map(|(_, v)| *v)
                .collect();
            stats::mean(&values)
        })
        .collect()
}

pub(crate) fn epoch_labels() -> Vec<&'static str> {
    Epoch::ALL.iter().map(|e| e.label()).collect()
}

/// Epoch colors in chronological order, taken from the hand that performed
/// each epoch.
pub(crate) fn epoch_colors(style: &Style) -> Result<Vec<RGBColor>> {
    let palette = style.palette("hand")?;
    Ok(Epoch::ALL.iter().map(|e| palette.color(e.hand().index())).collect())
}

/// Record `<prefix><epoch>.mean` for every epoch that has data.
pub(crate) fn record_epoch_means(out: &mut FigureOutput, prefix: &str, means: &[f64]) {
    for (epoch, mean) in Epoch::ALL.iter().zip(means) {
        if mean.is_finite() {
            out.record(format!("{prefix}{}.mean", epoch.key()), *mean);
        }
    }
}

/// Strip-plot settings for [`mean_strip_panel`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Strip {
    pub jitter: f64,
    pub point_pt: f64,
    pub marker_pt: f64,
    pub alpha: f64,
}

/// Jittered points per category under a black line through the category
/// means. Returns the chart for further annotation and the means.
pub(crate) fn mean_strip_panel<'a, 'b>(
    area: &'a Area<'b>,
    style: &Style,
    spec: &AxesSpec,
    points: &[(usize, f64)],
    colors: &[RGBColor],
    strip: Strip,
    jitter: &mut Jitter,
) -> Result<(Chart<'a, 'b>, Vec<f64>)> {
    let mut chart = chart::build_axes(area, style, spec)?;
    let n = spec.x.ticks.len();
    let colored: Vec<(f64, f64, RGBColor)> = points
        .iter()
        .map(|(i, v)| (*i as f64, *v, colors[*i % colors.len().max(1)]))
        .collect();
    chart::strip(&mut chart, style, &colored, jitter, strip.jitter, strip.point_pt, strip.alpha)?;
    let means = category_means(points, n);
    let line: Vec<(f64, f64)> = means.iter().enumerate().map(|(i, m)| (i as f64, *m)).collect();
    chart::mean_line(&mut chart, style, &line, strip.marker_pt)?;
    Ok((chart, means))
}

/// Epoch-axis panel spec with rotated labels.
pub(crate) fn epoch_axes(y: Axis) -> AxesSpec {
    AxesSpec::new(Axis::categorical(&epoch_labels()), y).rotated()
}

pub(crate) fn values(points: &[(usize, f64)]) -> Vec<f64> {
    points.iter().map(|(_, v)| *v).collect()
}
