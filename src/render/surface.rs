//! Cortical surface maps.
//!
//! Each hemisphere mesh is projected orthographically for a view and
//! rasterized with a depth buffer at output resolution. Three layers are
//! composited per face: the sulcal gray underlay, the data overlay (where at
//! least two of the three corners carry a value) and region outlines.

use crate::data::surface::{BrainAssets, Hemisphere, Mesh};
use crate::error::{FigureError, Result};
use crate::render::canvas::{Area, Artifact, Canvas};
use crate::style::{ColorRange, Colormap, FigureSize, Style, INK};
use crate::surface_map::VertexField;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Lateral,
    Medial,
    Dorsal,
    Posterior,
}

/// Panel arrangement of a surface figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// lh lateral, lh medial, rh medial, rh lateral.
    Row,
    /// Both hemispheres side by side in one view.
    Single(View),
}

impl Layout {
    fn panels(&self) -> Vec<Vec<(Hemisphere, View)>> {
        match *self {
            Layout::Row => vec![
                vec![(Hemisphere::Left, View::Lateral)],
                vec![(Hemisphere::Left, View::Medial)],
                vec![(Hemisphere::Right, View::Medial)],
                vec![(Hemisphere::Right, View::Lateral)],
            ],
            Layout::Single(view) => vec![vec![(Hemisphere::Left, view), (Hemisphere::Right, view)]],
        }
    }
}

/// Camera basis: screen right, screen up and the direction towards the viewer.
#[derive(Debug, Clone, Copy)]
struct Camera {
    right: [f64; 3],
    up: [f64; 3],
    toward: [f64; 3],
}

impl Camera {
    fn new(hemi: Hemisphere, view: View) -> Self {
        const UP: [f64; 3] = [0.0, 0.0, 1.0];
        let (right, up, toward) = match (view, hemi) {
            (View::Lateral, Hemisphere::Left) | (View::Medial, Hemisphere::Right) => {
                ([0.0, -1.0, 0.0], UP, [-1.0, 0.0, 0.0])
            }
            (View::Lateral, Hemisphere::Right) | (View::Medial, Hemisphere::Left) => {
                ([0.0, 1.0, 0.0], UP, [1.0, 0.0, 0.0])
            }
            (View::Dorsal, _) => ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], UP),
            (View::Posterior, _) => ([1.0, 0.0, 0.0], UP, [0.0, -1.0, 0.0]),
        };
        Self { right, up, toward }
    }

    /// Screen position and depth; larger depth is closer to the viewer.
    fn project(&self, p: [f32; 3]) -> (f64, f64, f64) {
        let p = [p[0] as f64, p[1] as f64, p[2] as f64];
        (dot(p, self.right), dot(p, self.up), dot(p, self.toward))
    }
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn face_normal(mesh: &Mesh, face: [usize; 3]) -> [f64; 3] {
    let v = |i: usize| {
        let p = mesh.vertices()[face[i]];
        [p[0] as f64, p[1] as f64, p[2] as f64]
    };
    let (a, b, c) = (v(0), v(1), v(2));
    let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        e1[1] * e2[2] - e1[2] * e2[1],
        e1[2] * e2[0] - e1[0] * e2[2],
        e1[0] * e2[1] - e1[1] * e2[0],
    ];
    let len = dot(n, n).sqrt();
    if len > 0.0 {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0; 3]
    }
}

/// Depth-buffered pixel grid.
struct Raster {
    width: usize,
    height: usize,
    depth: Vec<f64>,
    color: Vec<Option<RGBColor>>,
}

impl Raster {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            depth: vec![f64::NEG_INFINITY; width * height],
            color: vec![None; width * height],
        }
    }

    /// Fill the pixels whose centres fall inside the triangle.
    fn fill_triangle(&mut self, pts: [(f64, f64); 3], depth: f64, color: RGBColor) {
        let edge = |a: (f64, f64), b: (f64, f64), p: (f64, f64)| {
            (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
        };
        let area = edge(pts[0], pts[1], pts[2]);
        if area == 0.0 || !area.is_finite() {
            return;
        }
        let min_x = pts.iter().map(|p| p.0).fold(f64::INFINITY, f64::min).floor().max(0.0) as usize;
        let min_y = pts.iter().map(|p| p.1).fold(f64::INFINITY, f64::min).floor().max(0.0) as usize;
        let max_x = pts.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max).ceil();
        let max_y = pts.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max).ceil();
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let max_x = (max_x as usize).min(self.width);
        let max_y = (max_y as usize).min(self.height);
        for y in min_y..max_y {
            for x in min_x..max_x {
                let p = (x as f64 + 0.5, y as f64 + 0.5);
                let w0 = edge(pts[1], pts[2], p) * area.signum();
                let w1 = edge(pts[2], pts[0], p) * area.signum();
                let w2 = edge(pts[0], pts[1], p) * area.signum();
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let i = y * self.width + x;
                if depth > self.depth[i] {
                    self.depth[i] = depth;
                    self.color[i] = Some(color);
                }
            }
        }
    }

    /// Draw runs of equal color as one rectangle each.
    fn draw_on(&self, area: &Area, offset: (i32, i32)) -> Result<()> {
        for y in 0..self.height {
            let row = &self.color[y * self.width..(y + 1) * self.width];
            let mut x = 0;
            while x < self.width {
                let start = x;
                let current = row[x];
                while x < self.width && row[x] == current {
                    x += 1;
                }
                if let Some(color) = current {
                    let (ox, oy) = offset;
                    area.draw(&Rectangle::new(
                        [
                            (ox + start as i32, oy + y as i32),
                            (ox + x as i32, oy + y as i32 + 1),
                        ],
                        color.filled(),
                    ))?;
                }
            }
        }
        Ok(())
    }
}

/// Everything that goes into one surface figure.
pub struct SurfaceFigure<'a> {
    pub assets: &'a BrainAssets,
    pub field: &'a VertexField,
    pub colormap: &'a Colormap,
    pub range: ColorRange,
    pub layout: Layout,
    pub colorbar: bool,
}

struct Layers<'a> {
    underlay: &'a Colormap,
    sulc_range: ColorRange,
    outline: RGBColor,
}

fn shade(color: RGBColor, lambert: f64) -> RGBColor {
    // quantized so neighbouring faces merge into longer runs
    let k = ((0.55 + 0.45 * lambert.abs().min(1.0)) * 16.0).round() / 16.0;
    let s = |c: u8| (c as f64 * k).round() as u8;
    RGBColor(s(color.0), s(color.1), s(color.2))
}

fn face_color(
    fig: &SurfaceFigure,
    layers: &Layers,
    hemi: Hemisphere,
    mask: &[f64],
    face: [usize; 3],
) -> RGBColor {
    let marks: Vec<f64> = face.iter().map(|&v| mask[v]).collect();
    if marks.iter().any(|m| *m > 0.0) && marks.iter().any(|m| *m == 0.0) {
        return layers.outline;
    }
    let values = fig.field.get(hemi);
    let finite: Vec<f64> = face.iter().map(|&v| values[v]).filter(|v| v.is_finite()).collect();
    if finite.len() >= 2 {
        let mean = finite.iter().sum::<f64>() / finite.len() as f64;
        if let Some(color) = fig.colormap.map(mean, fig.range) {
            return color;
        }
    }
    let sulc = fig.assets.sulc.get(hemi);
    let depth = face.iter().map(|&v| sulc[v]).sum::<f64>() / 3.0;
    layers.underlay.sample(layers.sulc_range.normalize(depth))
}

fn sulc_range(assets: &BrainAssets) -> ColorRange {
    let (min, max) = Hemisphere::BOTH
        .iter()
        .flat_map(|h| assets.sulc.get(*h).iter().copied())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min.is_finite() {
        ColorRange { min, max }
    } else {
        ColorRange { min: 0.0, max: 1.0 }
    }
}

struct Projected {
    hemi: Hemisphere,
    camera: Camera,
    points: Vec<(f64, f64, f64)>,
    bounds: (f64, f64, f64, f64),
}

fn project_mesh(mesh: &Mesh, hemi: Hemisphere, view: View) -> Projected {
    let camera = Camera::new(hemi, view);
    let points: Vec<(f64, f64, f64)> = mesh.vertices().iter().map(|p| camera.project(*p)).collect();
    let bounds = points.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(x0, x1, y0, y1), (u, v, _)| (x0.min(*u), x1.max(*u), y0.min(*v), y1.max(*v)),
    );
    Projected {
        hemi,
        camera,
        points,
        bounds,
    }
}

fn slot_scale(p: &Projected, width: f64, height: f64) -> f64 {
    let (x0, x1, y0, y1) = p.bounds;
    let (du, dv) = ((x1 - x0).max(f64::EPSILON), (y1 - y0).max(f64::EPSILON));
    (width * 0.92 / du).min(height * 0.92 / dv)
}

/// Render `fig` to an SVG file at `path`.
pub fn render_surface(path: &Path, size: FigureSize, style: &Style, fig: &SurfaceFigure) -> Result<Artifact> {
    for hemi in Hemisphere::BOTH {
        let (n_values, n_vertices) = (fig.field.get(hemi).len(), fig.assets.meshes.get(hemi).num_vertices());
        if n_values != n_vertices {
            return Err(FigureError::Render(format!(
                "{hemi} field has {n_values} values for a {n_vertices}-vertex mesh"
            )));
        }
    }

    let layers = Layers {
        underlay: style.colormap("sulc")?,
        sulc_range: sulc_range(fig.assets),
        outline: style.colormap("outline")?.sample(1.0),
    };
    let mask = fig.field.outline_mask();

    let canvas = Canvas::new(path, size, style)?;
    let root = canvas.root();
    let (width, _) = root.dim_in_pixel();
    let (maps, bar) = if fig.colorbar {
        let (left, right) = root.split_horizontally(width.saturating_sub(width / 10).max(1));
        (left, Some(right))
    } else {
        (root.clone(), None)
    };

    let panels = fig.layout.panels();
    let areas = maps.split_evenly((1, panels.len()));

    // one scale for the whole figure so hemispheres keep their relative size
    let mut projected = Vec::new();
    let mut scale = f64::INFINITY;
    for (panel, area) in panels.iter().zip(&areas) {
        let (w, h) = area.dim_in_pixel();
        let slot_w = w as f64 / panel.len() as f64;
        let mut row = Vec::new();
        for &(hemi, view) in panel {
            let p = project_mesh(fig.assets.meshes.get(hemi), hemi, view);
            scale = scale.min(slot_scale(&p, slot_w, h as f64));
            row.push(p);
        }
        projected.push(row);
    }
    if !scale.is_finite() {
        scale = 1.0;
    }

    for (row, area) in projected.iter().zip(&areas) {
        let (w, h) = area.dim_in_pixel();
        let slot_w = w as usize / row.len().max(1);
        for (slot, p) in row.iter().enumerate() {
            let mesh = fig.assets.meshes.get(p.hemi);
            let (x0, x1, y0, y1) = p.bounds;
            let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
            let to_px = |u: f64, v: f64| {
                (
                    slot_w as f64 / 2.0 + (u - cx) * scale,
                    h as f64 / 2.0 - (v - cy) * scale,
                )
            };

            let mut raster = Raster::new(slot_w, h as usize);
            let hemi_mask = mask.get(p.hemi);
            for &face in mesh.faces() {
                let corners = face.map(|v| p.points[v]);
                let pts = corners.map(|(u, v, _)| to_px(u, v));
                let depth = corners.iter().map(|c| c.2).sum::<f64>() / 3.0;
                let base = face_color(fig, &layers, p.hemi, hemi_mask, face);
                let lambert = dot(face_normal(mesh, face), p.camera.toward);
                raster.fill_triangle(pts, depth, shade(base, lambert));
            }
            raster.draw_on(area, ((slot * slot_w) as i32, 0))?;
        }
    }

    if let Some(bar) = bar {
        draw_colorbar(&bar, style, fig.colormap, fig.range)?;
    }
    debug!(
        file = %path.display(),
        mapped = fig.field.mapped_count(),
        layout = ?fig.layout,
        "rendered surface"
    );
    canvas.finish()
}

fn draw_colorbar(area: &Area, style: &Style, cmap: &Colormap, range: ColorRange) -> Result<()> {
    const STEPS: i32 = 64;
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);
    let bar_w = (w / 4).max(2);
    let (top, bottom) = (h / 8, h - h / 8);
    let step = (bottom - top) as f64 / STEPS as f64;
    for i in 0..STEPS {
        let t = 1.0 - (i as f64 + 0.5) / STEPS as f64;
        let y0 = top + (i as f64 * step).round() as i32;
        let y1 = top + ((i + 1) as f64 * step).round() as i32;
        area.draw(&Rectangle::new([(0, y0), (bar_w, y1)], cmap.sample(t).filled()))?;
    }
    area.draw(&Rectangle::new([(0, top), (bar_w, bottom)], INK.stroke_width(1)))?;

    let font = TextStyle::from(style.font("tick")?).pos(Pos::new(HPos::Left, VPos::Center));
    for value in [range.min, 0.0, range.max] {
        let t = range.normalize(value);
        if !(0.0..=1.0).contains(&t) {
            continue;
        }
        let y = bottom - ((bottom - top) as f64 * t).round() as i32;
        area.draw(&PathElement::new(vec![(bar_w, y), (bar_w + 3, y)], INK.stroke_width(1)))?;
        area.draw(&Text::new(format!("{value:.2}"), (bar_w + 5, y), font.clone()))?;
    }
    Ok(())
}
