//! Figure 1B: binned learning curves per task block, and the change in early
//! error from right-hand learning to left-hand transfer.

use super::{Figure, FigureContext, FigureOutput};
use crate::data::table::MeasurementTable;
use crate::epochs::Epoch;
use crate::error::{FigureError, Result};
use crate::render::chart::{self, arange, format_tick, AxesSpec, Axis};
use crate::render::{Artifact, Canvas};
use crate::stats;
use crate::style::{GREEN, INK, ORANGE};
use plotters::prelude::{Color, LineSeries, RGBColor};
use std::collections::BTreeMap;
use tracing::info;

const BINNED_OUTPUT: &str = "1B_task_plot_binned.svg";
const EARLY_ERROR_OUTPUT: &str = "1B_task_RH-LH_early_error.svg";

/// Block shaded as the report phase.
const REPORT_BLOCK: i64 = 5;
/// Block whose panel carries the x axis description.
const LABELLED_BLOCK: i64 = 3;

const EARLY_EPOCHS: [Epoch; 2] = [Epoch::RightLearningEarly, Epoch::LeftTransferEarly];

pub struct Fig1B;

fn block_title(block: i64) -> &'static str {
    match block {
        1 => "LH Baseline",
        2 => "RH Baseline",
        3 => "RH Learning",
        5 => "Report",
        6 => "LH Learning",
        _ => "",
    }
}

/// Left-hand blocks are orange, right-hand blocks green.
fn block_color(block: i64) -> RGBColor {
    if block == 1 || block == 6 {
        ORANGE
    } else {
        GREEN
    }
}

fn as_block(table: &MeasurementTable, value: f64) -> Result<i64> {
    if value.is_finite() && value.fract() == 0.0 {
        Ok(value as i64)
    } else {
        Err(FigureError::schema(table.name(), format!("'{value}' is not a block number")))
    }
}

/// Mean and 95% CI of the error at each trial bin of one block.
#[derive(Debug, Clone, PartialEq)]
struct BlockCurve {
    block: i64,
    /// Rows of the first subject in this block, which sets the panel width.
    trials: usize,
    bins: Vec<(f64, f64, f64)>,
}

fn block_curves(table: &MeasurementTable) -> Result<Vec<BlockCurve>> {
    table.require(&["SubNo", "BlockNo", "TrialBlock", "AngularError"])?;
    let subjects = table.text("SubNo")?;
    let blocks = table.numeric("BlockNo")?;
    let bins = table.numeric("TrialBlock")?;
    let errors = table.numeric("AngularError")?;
    let first_subject = subjects
        .first()
        .ok_or_else(|| FigureError::schema(table.name(), "no rows"))?;

    let mut by_block: BTreeMap<i64, (usize, BTreeMap<i64, Vec<f64>>)> = BTreeMap::new();
    for row in 0..table.len() {
        let block = as_block(table, blocks[row])?;
        let entry = by_block.entry(block).or_default();
        if subjects[row] == *first_subject {
            entry.0 += 1;
        }
        if errors[row].is_finite() {
            let bin = as_block(table, bins[row])?;
            entry.1.entry(bin).or_default().push(errors[row]);
        }
    }

    Ok(by_block
        .into_iter()
        .map(|(block, (trials, bins))| BlockCurve {
            block,
            trials,
            bins: bins
                .into_iter()
                .map(|(bin, errs)| (bin as f64, stats::mean(&errs), stats::ci95(&errs)))
                .collect(),
        })
        .collect())
}

fn render_binned(ctx: &FigureContext, table: &MeasurementTable) -> Result<(Artifact, usize)> {
    let curves = block_curves(table)?;
    let style = &ctx.style;
    let ticks = arange(-15.0, 60.0, 15.0);
    let all_errors: Vec<f64> = curves
        .iter()
        .flat_map(|c| c.bins.iter().flat_map(|(_, m, ci)| [m - ci, m + ci]))
        .filter(|v| v.is_finite())
        .collect();
    let y_range = Axis::fit_with_ticks(&all_errors, &ticks).range;

    let path = ctx.output_path(BINNED_OUTPUT);
    let canvas = Canvas::new(&path, style.figure_size("learning-curve-strip")?, style)?;
    let (width, _) = canvas.root().dim_in_pixel();
    let total: usize = curves.iter().map(|c| c.trials.max(1)).sum();
    let mut breaks = Vec::new();
    let mut acc = 0;
    for curve in curves.iter().take(curves.len().saturating_sub(1)) {
        acc += curve.trials.max(1);
        breaks.push((width as usize * acc / total.max(1)) as i32);
    }
    let no_rows: [i32; 0] = [];
    let areas = canvas.root().split_by_breakpoints(breaks, no_rows);

    for (i, (curve, area)) in curves.iter().zip(&areas).enumerate() {
        let first_bin = curve.bins.first().map(|b| b.0).unwrap_or(0.0);
        let last_bin = curve.bins.last().map(|b| b.0).unwrap_or(1.0);
        let pad = ((last_bin - first_bin) * 0.05).max(0.5);
        let x = Axis {
            range: first_bin - pad..last_bin + pad,
            ticks: vec![(last_bin, format_tick(last_bin))],
            label: if curve.block == LABELLED_BLOCK {
                "Trial Block".to_string()
            } else {
                String::new()
            },
        };
        let y = Axis::numeric(y_range.clone(), &ticks);
        let mut spec = AxesSpec::new(x, y).title(block_title(curve.block));
        if i == 0 {
            spec.y.label = "Angular error (°)".to_string();
        } else {
            spec = spec.hide_y_axis();
        }

        let mut chart = chart::build_axes(area, style, &spec)?;
        if curve.block == REPORT_BLOCK {
            chart::vspan(&mut chart, &spec, first_bin, last_bin)?;
        }
        let color = block_color(curve.block);
        let lower: Vec<(f64, f64)> = curve.bins.iter().map(|(x, m, ci)| (*x, m - ci)).collect();
        let upper: Vec<(f64, f64)> = curve.bins.iter().map(|(x, m, ci)| (*x, m + ci)).collect();
        chart::band(&mut chart, &lower, &upper, color, 0.25)?;
        let means: Vec<(f64, f64)> = curve
            .bins
            .iter()
            .filter(|(_, m, _)| m.is_finite())
            .map(|(x, m, _)| (*x, *m))
            .collect();
        chart.draw_series(LineSeries::new(means, color.stroke_width(style.pt(1.5))))?;
        chart::dashed_hline(&mut chart, style, 0.0, spec.x.range.clone(), INK)?;
    }

    drop(areas);
    Ok((canvas.finish()?, curves.len()))
}

/// Early error per subject for each of the two epochs, matched by subject.
fn early_error_pairs(table: &MeasurementTable) -> Result<[Vec<f64>; 2]> {
    table.require(&["SubNo", "Epoch", "AngularError"])?;
    let means = table.group_mean(&["SubNo", "Epoch"], "AngularError")?;
    let mut by_subject: BTreeMap<String, [Option<f64>; 2]> = BTreeMap::new();
    let mut order = Vec::new();
    for (key, mean) in means {
        let Some(slot) = EARLY_EPOCHS.iter().position(|e| e.key() == key[1]) else {
            continue;
        };
        if !by_subject.contains_key(&key[0]) {
            order.push(key[0].clone());
        }
        by_subject.entry(key[0].clone()).or_default()[slot] = Some(mean);
    }
    let mut pairs = [Vec::new(), Vec::new()];
    for subject in order {
        if let Some([Some(a), Some(b)]) = by_subject.get(&subject) {
            pairs[0].push(*a);
            pairs[1].push(*b);
        }
    }
    Ok(pairs)
}

/// Every row of each early epoch, in table order.
fn early_error_rows(table: &MeasurementTable) -> Result<[Vec<f64>; 2]> {
    table.require(&["Epoch", "AngularError"])?;
    let epochs = table.text("Epoch")?;
    let errors = table.numeric("AngularError")?;
    let mut rows = [Vec::new(), Vec::new()];
    for (epoch, error) in epochs.iter().zip(errors) {
        let slot = EARLY_EPOCHS.iter().position(|e| e.key() == epoch);
        if let (Some(slot), true) = (slot, error.is_finite()) {
            rows[slot].push(error);
        }
    }
    Ok(rows)
}

fn render_early_error(ctx: &FigureContext, table: &MeasurementTable, out: &mut FigureOutput) -> Result<Artifact> {
    let style = &ctx.style;
    let palette = style.palette("early-error")?;
    let pairs = early_error_pairs(table)?;
    let test = stats::paired_t_test(&pairs[0], &pairs[1]);
    let stars = test.map(|t| stats::significance_stars(t.p)).unwrap_or("n.s.");

    // bars summarise every row; only the t-test needs complete subjects
    let rows = early_error_rows(table)?;
    let mut bars = Vec::new();
    for (i, (epoch, values)) in EARLY_EPOCHS.iter().zip(&rows).enumerate() {
        let mean = stats::mean(values);
        out.record(format!("early_error.{}.mean", epoch.key()), mean);
        bars.push((i as f64, mean, Some(stats::ci95(values)), palette.color(i)));
    }
    if let Some(t) = test {
        out.record("early_error.t", t.t);
        out.record("early_error.p", t.p);
        info!(t = t.t, p = t.p, subjects = pairs[0].len(), "paired early error test");
    }

    const BRACKET_Y: f64 = 35.0;
    let mut extent: Vec<f64> = bars
        .iter()
        .flat_map(|(_, m, e, _)| [m + e.unwrap_or(0.0), 0.0])
        .collect();
    extent.push(BRACKET_Y + 5.0);
    let labels: Vec<&str> = EARLY_EPOCHS.iter().map(|e| e.label()).collect();
    let spec = AxesSpec::new(
        Axis::categorical(&labels),
        Axis::fit_with_ticks(&extent, &arange(0.0, 50.0, 10.0)).label("Angular error (°)"),
    )
    .rotated()
    .fonts("axis-label", "axis-label");

    let path = ctx.output_path(EARLY_ERROR_OUTPUT);
    let canvas = Canvas::new(&path, style.figure_size("bar-pair-tall")?, style)?;
    let mut chart = chart::build_axes(canvas.root(), style, &spec)?;
    chart::bars(&mut chart, style, &bars, 0.7)?;
    chart::significance_bracket(&mut chart, style, 0.0, 1.0, BRACKET_Y, stars, "significance")?;
    drop(chart);
    canvas.finish()
}

impl Figure for Fig1B {
    fn id(&self) -> &'static str {
        "1B"
    }

    fn description(&self) -> &'static str {
        "Learning curves and early error change"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &["1B_data.xlsx"]
    }

    fn render(&self, ctx: &FigureContext) -> Result<FigureOutput> {
        let workbook = ctx.workbook(self.inputs()[0])?;
        let mut out = FigureOutput::default();

        let (binned, blocks) = render_binned(ctx, workbook.sheet("binned_learning_curve")?)?;
        out.record("binned.blocks", blocks as f64);
        out.artifacts.push(binned);

        let early = render_early_error(ctx, workbook.sheet("rh_vs_lh_early_error")?, &mut out)?;
        out.artifacts.push(early);
        Ok(out)
    }
}
