//! Figure 8: eccentricity of each seed region across all epochs.

use super::{
    epoch_axes, epoch_colors, epoch_labels, epoch_points, mean_strip_panel, record_epoch_means, values, Figure,
    FigureContext, FigureOutput, Strip,
};
use crate::error::Result;
use crate::render::chart::{Axis, Jitter};
use crate::render::Canvas;

const OUTPUT: &str = "8_seeds_eccentricity.svg";

/// Facet order, row by row. Each seed is one sheet of the workbook.
const SEEDS: [&str; 4] = ["Left M1", "Right M1", "Left mPFC", "Right mPFC"];

pub struct Fig8;

impl Figure for Fig8 {
    fn id(&self) -> &'static str {
        "8"
    }

    fn description(&self) -> &'static str {
        "Seed region eccentricity across epochs"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &["8_data.xlsx"]
    }

    fn render(&self, ctx: &FigureContext) -> Result<FigureOutput> {
        let workbook = ctx.workbook(self.inputs()[0])?;
        let style = &ctx.style;
        let colors = epoch_colors(style)?;

        let path = ctx.output_path(OUTPUT);
        let canvas = Canvas::new(&path, style.figure_size("facet-grid-2x2")?, style)?;
        let areas = canvas.root().split_evenly((2, 2));
        let mut out = FigureOutput::default();
        let mut jitter = Jitter::new(1);

        for (i, (seed, area)) in SEEDS.iter().zip(&areas).enumerate() {
            let points = epoch_points(workbook.sheet(seed)?, "distance")?;
            let mut y = Axis::fit(&values(&points), 5);
            if i % 2 == 0 {
                y = y.label("Eccentricity");
            }
            let mut spec = epoch_axes(y).fonts("axis-label-plain", "tick").title(*seed);
            if i < 2 {
                // shared x axis: only the bottom row carries epoch labels
                let blank = vec![""; epoch_labels().len()];
                spec.x = Axis::categorical(&blank);
            }
            let strip = Strip {
                jitter: 0.1,
                point_pt: 4.0,
                marker_pt: 6.0,
                alpha: 0.5,
            };
            let (_, means) = mean_strip_panel(area, style, &spec, &points, &colors, strip, &mut jitter)?;
            record_epoch_means(&mut out, &format!("{seed}."), &means);
        }

        drop(areas);
        out.artifacts.push(canvas.finish()?);
        Ok(out)
    }
}
