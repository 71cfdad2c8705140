//! Figure S4: mean BOLD across significant regions, for the main effects of
//! hand and of task epoch.

use super::{
    epoch_axes, epoch_colors, epoch_points, mean_strip_panel, record_epoch_means, values, Figure, FigureContext,
    FigureOutput, Strip,
};
use crate::error::Result;
use crate::render::chart::{arange, Axis, Jitter};
use crate::render::Canvas;

const OUTPUT: &str = "S4_average_bold_across_significant_regions.svg";

/// (sheet, panel title, stats prefix)
const PANELS: [(&str, &str, &str); 2] = [
    ("hand_sig_regions_bold", "Main Effect of Hand", "hand."),
    ("task_epoch_sig_regions_bold", "Main Effect of Task Epoch", "task_epoch."),
];

pub struct FigS4;

impl Figure for FigS4 {
    fn id(&self) -> &'static str {
        "S4"
    }

    fn description(&self) -> &'static str {
        "Average BOLD z-score across significant regions"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &["S4_data.xlsx"]
    }

    fn render(&self, ctx: &FigureContext) -> Result<FigureOutput> {
        let workbook = ctx.workbook(self.inputs()[0])?;
        let style = &ctx.style;
        let colors = epoch_colors(style)?;
        let ticks = arange(-0.4, 0.5, 0.2);

        let path = ctx.output_path(OUTPUT);
        let canvas = Canvas::new(&path, style.figure_size("panel-pair")?, style)?;
        let areas = canvas.root().split_evenly((1, PANELS.len()));
        let mut out = FigureOutput::default();
        let mut jitter = Jitter::new(1);

        for ((sheet, title, prefix), area) in PANELS.iter().zip(&areas) {
            let points = epoch_points(workbook.sheet(sheet)?, "tmean")?;
            let y = Axis::fit_with_ticks(&values(&points), &ticks).label("z-score");
            let spec = epoch_axes(y)
                .fonts("axis-label-plain", "tick-category")
                .title(*title);
            let strip = Strip {
                jitter: 0.1,
                point_pt: 5.0,
                marker_pt: 6.0,
                alpha: 0.5,
            };
            let (_, means) = mean_strip_panel(area, style, &spec, &points, &colors, strip, &mut jitter)?;
            record_epoch_means(&mut out, prefix, &means);
        }

        drop(areas);
        out.artifacts.push(canvas.finish()?);
        Ok(out)
    }
}
