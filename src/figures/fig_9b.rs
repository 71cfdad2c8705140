//! Figure 9B: distributions of early error and transfer per subject.

use super::{Figure, FigureContext, FigureOutput};
use crate::error::{FigureError, Result};
use crate::render::chart::{self, arange, AxesSpec, Axis, Jitter, Whiskers};
use crate::render::Canvas;
use crate::stats;
use crate::style::{INK, SILVER};

const OUTPUT: &str = "9B_behaviour_distributions.svg";

/// (column, panel title, y label)
const MEASURES: [(&str, &str, &str); 3] = [
    ("RH Early", "RH", "Early Error (°)"),
    ("LH Early", "LH", "Early Error (°)"),
    ("Transfer", "", "Transfer (°)"),
];

pub struct Fig9B;

impl Figure for Fig9B {
    fn id(&self) -> &'static str {
        "9B"
    }

    fn description(&self) -> &'static str {
        "Behavioural error distributions"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &["9B_data.xlsx"]
    }

    fn render(&self, ctx: &FigureContext) -> Result<FigureOutput> {
        let workbook = ctx.workbook(self.inputs()[0])?;
        let table = workbook.first_sheet()?;
        table.require(&["sub", "RH Early", "LH Early", "Transfer"])?;
        let style = &ctx.style;
        let ticks = arange(-15.0, 60.0, 15.0);

        let path = ctx.output_path(OUTPUT);
        let canvas = Canvas::new(&path, style.figure_size("distribution-triple")?, style)?;
        let areas = canvas.root().split_evenly((1, MEASURES.len()));
        let mut out = FigureOutput::default();

        for ((column, title, y_label), area) in MEASURES.iter().zip(&areas) {
            let data = table.numeric(column)?;
            let q = stats::quartiles(&data)
                .ok_or_else(|| FigureError::schema(table.name(), format!("column '{column}' has no values")))?;

            // box at 0, subjects scattered to its right
            let x = Axis::numeric(-0.5..1.5, &[]);
            let y = Axis::fit_with_ticks(&data, &ticks).label(*y_label);
            let spec = AxesSpec::new(x, y)
                .hide_x_axis()
                .fonts("label-xl", "tick")
                .title_font("title-large")
                .title(*title);
            let mut chart = chart::build_axes(area, style, &spec)?;
            chart::box_plot(&mut chart, style, 0.0, &data, &q, Whiskers::Tukey, 0.5, SILVER)?;

            // same seed in every panel so subjects line up across panels
            let mut jitter = Jitter::new(1);
            let points: Vec<(f64, f64, _)> = data
                .iter()
                .map(|v| (1.0 + jitter.between(0.01, 0.4), *v, INK))
                .collect();
            chart::strip(&mut chart, style, &points, &mut Jitter::new(0), 0.0, 3.0, 1.0)?;
            chart::dashed_hline(&mut chart, style, 0.0, spec.x.range.clone(), INK)?;

            out.record(format!("{column}.median"), q.median);
        }

        let (early, transfer): (Vec<f64>, Vec<f64>) = table
            .numeric("RH Early")?
            .into_iter()
            .zip(table.numeric("Transfer")?)
            .filter(|(e, t)| e.is_finite() && t.is_finite())
            .unzip();
        if let Some(r) = stats::pearson(&early, &transfer) {
            out.record("RH Early.Transfer.pearson_r", r);
        }

        drop(areas);
        out.artifacts.push(canvas.finish()?);
        Ok(out)
    }
}
