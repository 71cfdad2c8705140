//! Figure S3: eccentricity of regions with a task epoch x hand effect.

use super::{
    epoch_axes, epoch_colors, mean_strip_panel, record_epoch_means, subject_epoch_points, values, Figure,
    FigureContext, FigureOutput, Strip,
};
use crate::error::Result;
use crate::render::chart::{Axis, Jitter};
use crate::render::Canvas;
use tracing::info;

const OUTPUT: &str = "S3_task_epoch-hand_effect_sig_regions_ecc.svg";

pub struct FigS3;

impl Figure for FigS3 {
    fn id(&self) -> &'static str {
        "S3"
    }

    fn description(&self) -> &'static str {
        "Significant-region eccentricity across task epochs"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &["S3_data.xlsx"]
    }

    fn render(&self, ctx: &FigureContext) -> Result<FigureOutput> {
        let workbook = ctx.workbook(self.inputs()[0])?;
        let table = workbook.first_sheet()?;
        let points = subject_epoch_points(table, "sub", "distance")?;
        info!(figure = self.id(), subjects_by_epoch = points.len(), "derived subject means");

        let style = &ctx.style;
        let path = ctx.output_path(OUTPUT);
        let canvas = Canvas::new(&path, style.figure_size("single-panel")?, style)?;
        let y = Axis::fit_with_ticks(&values(&points), &[1.0, 2.0, 3.0]).label("Eccentricity");
        let spec = epoch_axes(y).fonts("axis-label-large", "label-large");
        let strip = Strip {
            jitter: 0.1,
            point_pt: 5.0,
            marker_pt: 6.0,
            alpha: 0.5,
        };
        let (_, means) = mean_strip_panel(
            canvas.root(),
            style,
            &spec,
            &points,
            &epoch_colors(style)?,
            strip,
            &mut Jitter::new(1),
        )?;

        let mut out = FigureOutput::default();
        record_epoch_means(&mut out, "", &means);
        out.artifacts.push(canvas.finish()?);
        Ok(out)
    }
}
