//! Figure 3E: representational similarity model comparison.

use super::{Figure, FigureContext, FigureOutput};
use crate::data::table::MeasurementTable;
use crate::error::{FigureError, Result};
use crate::render::chart::{self, AxesSpec, Axis, MarkerShape};
use crate::render::Canvas;
use crate::stats;
use crate::style::{LIGHT_GRAY, PAPER};

const OUTPUT: &str = "3E_rsa_models_comparison.svg";
const ALPHA: f64 = 0.05;
/// Vertical spacing of stacked pairwise brackets below the noise ceiling.
const BRACKET_STEP: f64 = 0.06;

pub struct Fig3E;

/// Bootstrap evaluations summarised per model, in column order.
#[derive(Debug, Clone, PartialEq)]
struct ModelSummary {
    name: String,
    mean: f64,
    std: f64,
    p_zero: f64,
    p_noise_ceiling: f64,
}

fn summarize(evaluations: &MeasurementTable, summary: &MeasurementTable) -> Result<Vec<ModelSummary>> {
    summary.require(&["p_0", "p_NC"])?;
    let p_zero = summary.numeric("p_0")?;
    let p_nc = summary.numeric("p_NC")?;
    let names = evaluations.column_names();
    if names.len() != p_zero.len() {
        return Err(FigureError::schema(
            summary.name(),
            format!("{} model rows for {} evaluated models", p_zero.len(), names.len()),
        ));
    }
    names
        .iter()
        .enumerate()
        .map(|(i, name)| -> Result<ModelSummary> {
            let boot: Vec<f64> = evaluations
                .numeric(name)?
                .into_iter()
                .filter(|v| v.is_finite())
                .collect();
            Ok(ModelSummary {
                name: name.clone(),
                mean: stats::mean(&boot),
                std: stats::std_dev(&boot),
                p_zero: p_zero[i],
                p_noise_ceiling: p_nc[i],
            })
        })
        .collect()
}

/// Model pairs (i < j) whose FDR-corrected q-value passes, row by row.
fn significant_pairs(comparison: &MeasurementTable, n_models: usize) -> Result<Vec<(usize, usize)>> {
    // first column holds the row labels
    let q = comparison.trailing_numeric_columns(comparison.column_names().len().saturating_sub(1))?;
    if q.len() < n_models || q.iter().any(|row| row.len() < n_models) {
        return Err(FigureError::schema(
            comparison.name(),
            format!("expected a {n_models}x{n_models} q-value matrix"),
        ));
    }
    let mut pairs = Vec::new();
    for i in 0..n_models {
        for j in i + 1..n_models {
            if q[i][j] < ALPHA {
                pairs.push((i, j));
            }
        }
    }
    Ok(pairs)
}

impl Figure for Fig3E {
    fn id(&self) -> &'static str {
        "3E"
    }

    fn description(&self) -> &'static str {
        "RSA model comparison"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &["3E_data.xlsx"]
    }

    fn render(&self, ctx: &FigureContext) -> Result<FigureOutput> {
        let workbook = ctx.workbook(self.inputs()[0])?;
        let models = summarize(workbook.sheet("evaluations")?, workbook.sheet("models_summary")?)?;
        let pairs = significant_pairs(workbook.sheet("models_comparison_fdr")?, models.len())?;
        let style = &ctx.style;
        let palette = style.palette("rsa-models")?;

        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        let mut extent: Vec<f64> = models.iter().flat_map(|m| [m.mean + m.std, m.mean - m.std]).collect();
        extent.extend([0.0, 1.05]);
        let spec = AxesSpec::new(Axis::categorical(&names), Axis::fit(&extent, 6).label("Cosine Similarity"))
            .fonts("axis-label-plain", "tick");

        let path = ctx.output_path(OUTPUT);
        let canvas = Canvas::new(&path, style.figure_size("model-comparison")?, style)?;
        let mut chart = chart::build_axes(canvas.root(), style, &spec)?;
        let bars: Vec<_> = models
            .iter()
            .enumerate()
            .map(|(i, m)| (i as f64, m.mean, Some(m.std), palette.color(i)))
            .collect();
        chart::bars(&mut chart, style, &bars, 0.8)?;

        let above_zero: Vec<(f64, f64)> = models
            .iter()
            .enumerate()
            .filter(|(_, m)| m.p_zero < ALPHA)
            .map(|(i, _)| (i as f64, 0.0))
            .collect();
        chart::markers(&mut chart, style, &above_zero, MarkerShape::Circle, 8.0, PAPER)?;
        let below_ceiling: Vec<(f64, f64)> = models
            .iter()
            .enumerate()
            .filter(|(_, m)| m.p_noise_ceiling < ALPHA)
            .map(|(i, _)| (i as f64, 1.0))
            .collect();
        chart::markers(&mut chart, style, &below_ceiling, MarkerShape::TriangleDown, 8.0, LIGHT_GRAY)?;

        for (k, (i, j)) in pairs.iter().enumerate() {
            let y = 1.0 - BRACKET_STEP * (k + 1) as f64;
            chart::significance_bracket(&mut chart, style, *i as f64, *j as f64, y, "**", "tick-category")?;
        }
        drop(chart);

        let mut out = FigureOutput::default();
        for m in &models {
            out.record(format!("{}.mean", m.name), m.mean);
            out.record(format!("{}.std", m.name), m.std);
        }
        out.record("pairwise_significant", pairs.len() as f64);
        out.artifacts.push(canvas.finish()?);
        Ok(out)
    }
}
