//! Figures 6B and 6D: re-expression of learning-related eccentricity changes
//! in later epochs, for the task-epoch and hand effects.

use super::{mean_strip_panel, values, Figure, FigureContext, FigureOutput, Strip};
use crate::data::table::MeasurementTable;
use crate::epochs::Epoch;
use crate::error::{FigureError, Result};
use crate::render::chart::{self, data_offset, AxesSpec, Axis, Jitter};
use crate::render::Canvas;
use crate::stats;

const OUTPUT: &str = "6BD_task_epoch_hand_reexpression.svg";

const EPOCHS: [Epoch; 3] = [
    Epoch::RightLearningLate,
    Epoch::LeftTransferEarly,
    Epoch::LeftTransferLate,
];

/// (eccentricity sheet, post-hoc sheet, title, stats prefix)
const PANELS: [(&str, &str, &str, &str); 2] = [
    (
        "epoch_sig_regions_eccentricity",
        "epoch_re_expression",
        "Task Epoch",
        "epoch.",
    ),
    ("hand_sig_regions_eccentricity", "hand_re_expression", "Hand", "hand."),
];

const ALPHA: f64 = 0.05;

pub struct Fig6BD;

/// Points on the three-epoch axis; rows from other epochs are left out.
fn reexpression_points(table: &MeasurementTable) -> Result<Vec<(usize, f64)>> {
    table.require(&["epoch", "distance"])?;
    let epochs = table.text("epoch")?;
    let distance = table.numeric("distance")?;
    Ok(epochs
        .iter()
        .zip(distance)
        .filter_map(|(e, d)| EPOCHS.iter().position(|x| x.key() == e.trim()).map(|i| (i, d)))
        .collect())
}

/// Bracket heights stacked above the highest distance in the sheet, one
/// tenth of its span apart.
fn bracket_heights(all_distances: &[f64], n_pairs: usize) -> (Vec<f64>, f64) {
    let (y_min, y_max) = stats::quartiles(all_distances)
        .map(|q| (q.min, q.max))
        .unwrap_or((0.0, 1.0));
    let step = 0.1 * (y_max - y_min + 1e-6);
    ((1..=n_pairs).map(|i| y_max + i as f64 * step).collect(), step)
}

/// Significant post-hoc pairs as axis positions, in table order.
fn significant_pairs(posthoc: &MeasurementTable) -> Result<Vec<(usize, usize)>> {
    posthoc.require(&["A", "B", "p-unc"])?;
    let a = posthoc.text("A")?;
    let b = posthoc.text("B")?;
    let p = posthoc.numeric("p-unc")?;
    let position = |name: &str| {
        EPOCHS
            .iter()
            .position(|e| e.key() == name.trim())
            .ok_or_else(|| FigureError::schema(posthoc.name(), format!("epoch '{name}' is not on the re-expression axis")))
    };
    let mut pairs = Vec::new();
    for row in 0..posthoc.len() {
        if p[row] < ALPHA {
            pairs.push((position(&a[row])?, position(&b[row])?));
        }
    }
    Ok(pairs)
}

impl Figure for Fig6BD {
    fn id(&self) -> &'static str {
        "6BD"
    }

    fn description(&self) -> &'static str {
        "Re-expression of eccentricity for task epoch and hand"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &["6BD_data.xlsx"]
    }

    fn render(&self, ctx: &FigureContext) -> Result<FigureOutput> {
        let workbook = ctx.workbook(self.inputs()[0])?;
        let style = &ctx.style;
        let colors = style.palette("categorical")?.colors().to_vec();
        let labels: Vec<&str> = EPOCHS.iter().map(|e| e.label()).collect();

        let path = ctx.output_path(OUTPUT);
        let canvas = Canvas::new(&path, style.figure_size("reexpression-pair")?, style)?;
        let areas = canvas.root().split_evenly((1, PANELS.len()));
        let mut out = FigureOutput::default();
        let mut jitter = Jitter::new(1);

        for ((ecc_sheet, posthoc_sheet, title, prefix), area) in PANELS.iter().zip(&areas) {
            let ecc = workbook.sheet(ecc_sheet)?;
            let points = reexpression_points(ecc)?;
            let pairs = significant_pairs(workbook.sheet(posthoc_sheet)?)?;
            let (bracket_y, offset) = bracket_heights(&ecc.numeric("distance")?, pairs.len());

            let mut extent = values(&points);
            extent.extend(bracket_y.iter().map(|y| y + offset));
            let y = Axis::fit(&extent, 5).label("Correlation (r)");
            let spec = AxesSpec::new(Axis::categorical(&labels), y.clone())
                .rotated()
                .fonts("label-large", "label-large")
                .title(*title);
            let strip = Strip {
                jitter: 0.05,
                point_pt: 8.0,
                marker_pt: 8.0,
                alpha: 1.0,
            };
            let (mut chart, means) = mean_strip_panel(area, style, &spec, &points, &colors, strip, &mut jitter)?;
            for ((x1, x2), y_pos) in pairs.iter().zip(&bracket_y) {
                chart::significance_bracket_at(
                    &mut chart,
                    style,
                    (*x1 as f64, *x2 as f64),
                    *y_pos,
                    *y_pos - data_offset(&y, 0.01),
                    "*",
                    "significance-large",
                )?;
            }

            for (epoch, mean) in EPOCHS.iter().zip(&means) {
                if mean.is_finite() {
                    out.record(format!("{prefix}{}.mean", epoch.key()), *mean);
                }
            }
            out.record(format!("{prefix}significant_pairs"), pairs.len() as f64);
        }

        drop(areas);
        out.artifacts.push(canvas.finish()?);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posthoc_pairs_outside_the_axis_are_rejected() {
        let posthoc = MeasurementTable::from_rows(
            "posthoc",
            vec!["A".into(), "B".into(), "p-unc".into()],
            vec![
                vec!["lefttransfer-early".into(), "rightlearning-late".into(), 0.01.into()],
                vec!["lefttransfer-late".into(), "rightlearning-late".into(), 0.2.into()],
            ],
        )
        .unwrap();
        assert_eq!(significant_pairs(&posthoc).unwrap(), vec![(1, 0)]);

        let bad = MeasurementTable::from_rows(
            "posthoc",
            vec!["A".into(), "B".into(), "p-unc".into()],
            vec![vec!["rest".into(), "rightlearning-late".into(), 0.01.into()]],
        )
        .unwrap();
        assert!(significant_pairs(&bad).is_err());
    }

    #[test]
    fn brackets_stack_above_every_row_of_the_sheet() {
        // 10 is the maximum only when the excluded baseline rows count
        let all = [1.0, 2.0, 10.0, 0.0];
        let (heights, step) = bracket_heights(&all, 2);
        assert!((step - 1.0).abs() < 1e-6);
        assert!((heights[0] - 11.0).abs() < 1e-5);
        assert!((heights[1] - 12.0).abs() < 1e-5);
        assert!(bracket_heights(&all, 0).0.is_empty());
    }
}
