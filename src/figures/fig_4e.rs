//! Figure 4E: hand-effect t-maps on the inflated cortex, plus the
//! eccentricity of the significant regions per hemisphere.

use super::{
    epoch_axes, epoch_colors, mean_strip_panel, record_epoch_means, subject_epoch_points, values, Figure,
    FigureContext, FigureOutput, Strip,
};
use crate::data::surface::BrainAssets;
use crate::data::table::MeasurementTable;
use crate::error::Result;
use crate::render::chart::{Axis, Jitter};
use crate::render::surface::{render_surface, Layout, SurfaceFigure, View};
use crate::render::{Artifact, Canvas};
use crate::style::{ColorRange, Style};
use crate::surface_map::{map_indices, pairwise_contrasts};
use std::path::Path;
use tracing::info;

/// Color limit of the t-maps, shared by every view.
const T_MAX: f64 = 6.11;
const ECC_OUTPUT: &str = "4E_hand_effect_sig-regions_ecc.svg";
const HEMISPHERES: [(&str, &str); 2] = [("LH", "Left Hemisphere"), ("RH", "Right Hemisphere")];

pub struct Fig4E;

fn render_eccentricity(path: &Path, style: &Style, table: &MeasurementTable, out: &mut FigureOutput) -> Result<Artifact> {
    table.require(&["hemi", "sub", "epoch", "distance"])?;
    let canvas = Canvas::new(path, style.figure_size("hemisphere-pair")?, style)?;
    let areas = canvas.root().split_evenly((1, HEMISPHERES.len()));
    let colors = epoch_colors(style)?;
    let strip = Strip {
        jitter: 0.1,
        point_pt: 5.0,
        marker_pt: 6.0,
        alpha: 0.5,
    };
    let mut jitter = Jitter::new(1);

    for (i, ((hemi, title), area)) in HEMISPHERES.iter().zip(&areas).enumerate() {
        let points = subject_epoch_points(&table.filter_eq("hemi", hemi)?, "sub", "distance")?;
        let mut y = Axis::fit_with_ticks(&values(&points), &[1.0, 2.0, 3.0]);
        if i == 0 {
            y = y.label("Eccentricity");
        }
        let spec = epoch_axes(y)
            .fonts("axis-label-large", "label-large")
            .title_font("title")
            .title(*title);
        let (_, means) = mean_strip_panel(area, style, &spec, &points, &colors, strip, &mut jitter)?;
        record_epoch_means(out, &format!("ecc.{hemi}."), &means);
    }

    drop(areas);
    canvas.finish()
}

impl Figure for Fig4E {
    fn id(&self) -> &'static str {
        "4E"
    }

    fn description(&self) -> &'static str {
        "Hand-effect t-maps and significant-region eccentricity"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &["4E_data.xlsx"]
    }

    fn render(&self, ctx: &FigureContext) -> Result<FigureOutput> {
        let workbook = ctx.workbook(self.inputs()[0])?;
        let contrasts = pairwise_contrasts(workbook.sheet("hand_effect_right_vs_left")?, true)?;
        let assets = BrainAssets::load(&ctx.resources_dir, &ctx.surface)?;
        let style = &ctx.style;
        let colormap = style.colormap("tstat-diverging")?;
        let mut out = FigureOutput::default();

        for contrast in &contrasts {
            let field = map_indices(&assets.atlas, &contrast.values)?;
            info!(
                figure = self.id(),
                contrast = %contrast.name,
                regions = contrast.values.len(),
                "mapped contrast"
            );
            let views = [
                (format!("4E_{}.svg", contrast.name), Layout::Row, "surface-row", ctx.surface.colorbar),
                (
                    format!("4E_{}_dorsal.svg", contrast.name),
                    Layout::Single(View::Dorsal),
                    "surface-view",
                    false,
                ),
                (
                    format!("4E_{}_posterior.svg", contrast.name),
                    Layout::Single(View::Posterior),
                    "surface-view",
                    false,
                ),
            ];
            for (file, layout, size, colorbar) in views {
                let fig = SurfaceFigure {
                    assets: &assets,
                    field: &field,
                    colormap,
                    range: ColorRange::symmetric(T_MAX),
                    layout,
                    colorbar,
                };
                let artifact = render_surface(&ctx.output_path(&file), style.figure_size(size)?, style, &fig)?;
                out.artifacts.push(artifact);
            }
            out.record(format!("{}.mapped_regions", contrast.name), contrast.values.len() as f64);
        }

        let table = workbook.sheet("right_vs_left_eccentricity")?;
        let artifact = render_eccentricity(&ctx.output_path(ECC_OUTPUT), style, table, &mut out)?;
        out.artifacts.push(artifact);
        Ok(out)
    }
}
