//! Broadcast per-region values onto atlas vertices.
//!
//! Mapping is pure: the same atlas and values always produce the same field.
//! Vertices of regions without a value get [`NO_DATA`].

use crate::data::surface::{Atlas, Hemisphere, PerHemisphere};
use crate::data::table::MeasurementTable;
use crate::epochs::contrast_rank;
use crate::error::{FigureError, Result};
use std::collections::BTreeMap;

/// Sentinel for vertices with no mapped value.
pub const NO_DATA: f64 = f64::NAN;

/// A scalar per mesh vertex, per hemisphere.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexField {
    pub values: PerHemisphere<Vec<f64>>,
}

impl VertexField {
    pub fn get(&self, hemi: Hemisphere) -> &[f64] {
        self.values.get(hemi)
    }

    /// 1.0 where a real non-zero value was mapped, else 0.0.
    pub fn outline_mask(&self) -> PerHemisphere<Vec<f64>> {
        self.values.map(|_, vals| {
            vals.iter()
                .map(|v| if v.is_finite() && *v != 0.0 { 1.0 } else { 0.0 })
                .collect()
        })
    }

    /// Number of vertices holding a real value.
    pub fn mapped_count(&self) -> usize {
        Hemisphere::BOTH
            .iter()
            .map(|h| self.get(*h).iter().filter(|v| v.is_finite()).count())
            .sum()
    }
}

fn broadcast(atlas: &Atlas, by_index: &BTreeMap<u32, f64>) -> VertexField {
    let values = PerHemisphere {
        left: atlas.labels(Hemisphere::Left),
        right: atlas.labels(Hemisphere::Right),
    }
    .map(|_, labels| {
        labels
            .iter()
            .map(|label| by_index.get(label).copied().unwrap_or(NO_DATA))
            .collect()
    });
    VertexField { values }
}

/// Map values keyed by region name. Every key must name an atlas region.
pub fn map_regions(atlas: &Atlas, values: &BTreeMap<String, f64>) -> Result<VertexField> {
    let mut by_index = BTreeMap::new();
    for (name, value) in values {
        let region = atlas
            .region_by_name(name)
            .ok_or_else(|| FigureError::UnknownRegion {
                region: name.clone(),
                atlas: atlas.name().to_string(),
            })?;
        by_index.insert(region.index, *value);
    }
    Ok(broadcast(atlas, &by_index))
}

/// Map values keyed by numeric atlas label, as `roi_ix` columns store them.
pub fn map_indices(atlas: &Atlas, values: &[(u32, f64)]) -> Result<VertexField> {
    let mut by_index = BTreeMap::new();
    for &(index, value) in values {
        if atlas.region(index).is_none() {
            return Err(FigureError::UnknownRegion {
                region: index.to_string(),
                atlas: atlas.name().to_string(),
            });
        }
        by_index.insert(index, value);
    }
    Ok(broadcast(atlas, &by_index))
}

/// One signed contrast from a pairwise-comparison table.
#[derive(Debug, Clone, PartialEq)]
pub struct Contrast {
    /// Later condition first, e.g. `right_vs_left`.
    pub name: String,
    /// Statistic per region index, signed so the later condition is positive.
    pub values: Vec<(u32, f64)>,
}

/// Split a pairwise table (`A`, `B`, `T`, `roi_ix`, `sig_corrected`) into
/// contrasts, ordered by first appearance of each (A, B) pair.
///
/// With `thresholded`, only rows flagged as significant are kept.
pub fn pairwise_contrasts(table: &MeasurementTable, thresholded: bool) -> Result<Vec<Contrast>> {
    table.require(&["A", "B", "T", "roi_ix"])?;
    let a = table.text("A")?;
    let b = table.text("B")?;
    let t = table.numeric("T")?;
    let roi = table.numeric("roi_ix")?;
    let sig = if thresholded {
        table.numeric("sig_corrected")?
    } else {
        vec![1.0; table.len()]
    };

    let mut contrasts: Vec<((String, String), Contrast, f64)> = Vec::new();
    for row in 0..table.len() {
        let pair = (a[row].clone(), b[row].clone());
        let slot = match contrasts.iter().position(|(p, _, _)| *p == pair) {
            Some(pos) => pos,
            None => {
                let (first, second) = (&pair.0, &pair.1);
                let (name, sign) = if contrast_rank(first)? > contrast_rank(second)? {
                    (format!("{first}_vs_{second}"), 1.0)
                } else {
                    (format!("{second}_vs_{first}"), -1.0)
                };
                contrasts.push((
                    pair,
                    Contrast {
                        name,
                        values: Vec::new(),
                    },
                    sign,
                ));
                contrasts.len() - 1
            }
        };
        if !(sig[row].is_finite() && sig[row] != 0.0) {
            continue;
        }
        let ix = roi[row];
        if !(ix.is_finite() && ix >= 1.0 && ix.fract() == 0.0) {
            return Err(FigureError::schema(
                table.name(),
                format!("roi_ix row {}: '{ix}' is not a region label", row + 2),
            ));
        }
        let (_, contrast, sign) = &mut contrasts[slot];
        contrast.values.push((ix as u32, *sign * t[row]));
    }
    Ok(contrasts.into_iter().map(|(_, c, _)| c).collect())
}
