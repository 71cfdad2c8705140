//! Figures S7B and S7E: spin-permutation nulls of the correlation between
//! network eccentricity change and early error.

use super::{Figure, FigureContext, FigureOutput};
use crate::data::table::MeasurementTable;
use crate::error::{FigureError, Result};
use crate::render::chart::{self, arange, AxesSpec, Axis, Whiskers};
use crate::render::{Artifact, Canvas};
use crate::stats;
use crate::style::{Style, BLUE, GRAY, LIGHT_BLUE, RED};
use plotters::prelude::{Circle, Color};
use std::path::Path;

/// Trailing columns of each sheet holding the permutation null.
const N_PERM: usize = 1000;
const P_THRESH: f64 = 0.05;
const Y_LIMIT: f64 = 0.45;
const HEMISPHERES: [(&str, &str); 2] = [("LH", "Left Hemisphere"), ("RH", "Right Hemisphere")];

/// (sheet, output file, stats prefix)
const FIGURES: [(&str, &str, &str); 2] = [
    (
        "rightlearning-early_error_spins",
        "S7B_RH_Learning_permutations.svg",
        "S7B.",
    ),
    (
        "lefttransfer-early_error_spins",
        "S7E_LH_transfer_permutations.svg",
        "S7E.",
    ),
];

pub struct FigS7BE;

/// One network's observed correlation and its null distribution.
#[derive(Debug, Clone, PartialEq)]
struct NetworkNull {
    network: String,
    r: f64,
    p_spin_fdr: f64,
    null: Vec<f64>,
}

impl NetworkNull {
    fn significant(&self) -> bool {
        self.p_spin_fdr <= P_THRESH
    }
}

fn hemisphere_nulls(table: &MeasurementTable, hemi: &str, n_perm: usize) -> Result<Vec<NetworkNull>> {
    table.require(&["hemi", "network", "r", "pspin_fdr"])?;
    if table.column_names().len() < n_perm + 4 {
        return Err(FigureError::schema(
            table.name(),
            format!("expected {n_perm} permutation columns after the summary columns"),
        ));
    }
    let rows = table.filter_eq("hemi", hemi)?;
    let networks = rows.text("network")?;
    let r = rows.numeric("r")?;
    let p = rows.numeric("pspin_fdr")?;
    let nulls = rows.trailing_numeric_columns(n_perm)?;
    Ok(networks
        .into_iter()
        .zip(nulls)
        .enumerate()
        .map(|(i, (network, null))| NetworkNull {
            network,
            r: r[i],
            p_spin_fdr: p[i],
            null,
        })
        .collect())
}

fn render_permutations(
    path: &Path,
    style: &Style,
    table: &MeasurementTable,
    prefix: &str,
    out: &mut FigureOutput,
) -> Result<Artifact> {
    let canvas = Canvas::new(path, style.figure_size("permutation-pair")?, style)?;
    let areas = canvas.root().split_evenly((1, HEMISPHERES.len()));

    for (i, ((hemi, title), area)) in HEMISPHERES.iter().zip(&areas).enumerate() {
        let networks = hemisphere_nulls(table, hemi, N_PERM)?;
        let names: Vec<&str> = networks.iter().map(|n| n.network.as_str()).collect();
        let y = Axis::numeric(-Y_LIMIT..Y_LIMIT, &arange(-0.4, 0.5, 0.2));
        let mut spec = AxesSpec::new(Axis::categorical(&names), y)
            .rotated()
            .fonts("label-large", "tick-category")
            .title(*title);
        if i == 0 {
            spec.y.label = "Spatial Correlation".to_string();
        }
        let mut chart = chart::build_axes(area, style, &spec)?;

        for (x, network) in networks.iter().enumerate() {
            chart::dashed_vline(&mut chart, x as f64, spec.y.range.clone(), GRAY.mix(0.5))?;
            if let Some(q) = stats::quartiles(&network.null) {
                chart::box_plot(&mut chart, style, x as f64, &network.null, &q, Whiskers::MinMax, 0.5, LIGHT_BLUE)?;
            }
        }
        chart::dashed_hline(&mut chart, style, 0.0, spec.x.range.clone(), BLUE)?;
        let radius = style.pt(3.0);
        chart.draw_series(networks.iter().enumerate().filter(|(_, n)| n.r.is_finite()).map(|(x, n)| {
            let color = if n.significant() { RED } else { BLUE };
            Circle::new((x as f64, n.r), radius, color.filled())
        }))?;

        let significant = networks.iter().filter(|n| n.significant()).count();
        out.record(format!("{prefix}{hemi}.significant_networks"), significant as f64);
    }

    drop(areas);
    canvas.finish()
}

impl Figure for FigS7BE {
    fn id(&self) -> &'static str {
        "S7BE"
    }

    fn description(&self) -> &'static str {
        "Spin permutation nulls for eccentricity-error correlations"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &["S7BE_data.xlsx"]
    }

    fn render(&self, ctx: &FigureContext) -> Result<FigureOutput> {
        let workbook = ctx.workbook(self.inputs()[0])?;
        let mut out = FigureOutput::default();
        for (sheet, file, prefix) in FIGURES {
            let artifact = render_permutations(&ctx.output_path(file), &ctx.style, workbook.sheet(sheet)?, prefix, &mut out)?;
            out.artifacts.push(artifact);
        }
        Ok(out)
    }
}
