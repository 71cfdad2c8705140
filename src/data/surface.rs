//! Brain surface meshes and region atlases.
//!
//! Assets are read from FreeSurfer-format files and shared read-only by every
//! unit that draws brain maps.

use crate::config::SurfaceConfig;
use crate::error::{FigureError, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hemisphere {
    Left,
    Right,
}

impl Hemisphere {
    pub const BOTH: [Hemisphere; 2] = [Hemisphere::Left, Hemisphere::Right];

    /// FreeSurfer file prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            Hemisphere::Left => "lh",
            Hemisphere::Right => "rh",
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// One value per hemisphere.
#[derive(Debug, Clone, PartialEq)]
pub struct PerHemisphere<T> {
    pub left: T,
    pub right: T,
}

impl<T> PerHemisphere<T> {
    pub fn get(&self, hemi: Hemisphere) -> &T {
        match hemi {
            Hemisphere::Left => &self.left,
            Hemisphere::Right => &self.right,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Hemisphere, &T) -> U) -> PerHemisphere<U> {
        PerHemisphere {
            left: f(Hemisphere::Left, &self.left),
            right: f(Hemisphere::Right, &self.right),
        }
    }

    pub fn try_map<U>(
        &self,
        mut f: impl FnMut(Hemisphere, &T) -> Result<U>,
    ) -> Result<PerHemisphere<U>> {
        Ok(PerHemisphere {
            left: f(Hemisphere::Left, &self.left)?,
            right: f(Hemisphere::Right, &self.right)?,
        })
    }
}

/// Triangle mesh of one hemisphere.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<[f32; 3]>,
    faces: Vec<[usize; 3]>,
}

impl Mesh {
    pub fn new(vertices: Vec<[f32; 3]>, faces: Vec<[usize; 3]>) -> Result<Self> {
        let n = vertices.len();
        if let Some(bad) = faces.iter().flatten().find(|&&v| v >= n) {
            return Err(FigureError::Asset {
                path: PathBuf::from("<mesh>"),
                reason: format!("face references vertex {bad} but mesh has {n} vertices"),
            });
        }
        Ok(Self { vertices, faces })
    }

    pub fn from_surf(path: &Path) -> Result<Self> {
        let surf = neuroformats::read_surf(path).map_err(|e| asset_err(path, e))?;
        let vertices = surf
            .mesh
            .vertices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        let faces = surf
            .mesh
            .faces
            .chunks_exact(3)
            .map(|c| [c[0] as usize, c[1] as usize, c[2] as usize])
            .collect();
        Self::new(vertices, faces).map_err(|e| match e {
            FigureError::Asset { reason, .. } => FigureError::Asset {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// 1-based label, unique across both hemispheres.
    pub index: u32,
    pub name: String,
    pub hemisphere: Hemisphere,
}

/// Partition of mesh vertices into named regions.
///
/// Per-vertex labels hold a region index; 0 marks unassigned vertices such as
/// the medial wall.
#[derive(Debug, Clone, PartialEq)]
pub struct Atlas {
    name: String,
    regions: Vec<Region>,
    labels: PerHemisphere<Vec<u32>>,
}

impl Atlas {
    pub fn new(
        name: impl Into<String>,
        regions: Vec<Region>,
        labels: PerHemisphere<Vec<u32>>,
    ) -> Result<Self> {
        let name = name.into();
        let invalid = |reason: String| FigureError::Asset {
            path: PathBuf::from(&name),
            reason,
        };
        let mut seen = HashMap::new();
        for region in &regions {
            if region.index == 0 {
                return Err(invalid(format!("region '{}' uses reserved index 0", region.name)));
            }
            if seen.insert(region.index, region.hemisphere).is_some() {
                return Err(invalid(format!("duplicate region index {}", region.index)));
            }
        }
        for hemi in Hemisphere::BOTH {
            for &label in labels.get(hemi) {
                if label == 0 {
                    continue;
                }
                match seen.get(&label) {
                    Some(h) if *h == hemi => {}
                    Some(_) => {
                        return Err(invalid(format!(
                            "{hemi} vertex labelled with region {label} of the other hemisphere"
                        )))
                    }
                    None => return Err(invalid(format!("{hemi} vertex uses undefined region {label}"))),
                }
            }
        }
        Ok(Self {
            name,
            regions,
            labels,
        })
    }

    /// Read a pair of FreeSurfer annotations. Regions are numbered left
    /// hemisphere first, each in colortable order, skipping the unknown and
    /// medial-wall entries.
    pub fn from_annot(name: impl Into<String>, left: &Path, right: &Path) -> Result<Self> {
        let mut regions = Vec::new();
        let mut next_index = 1u32;
        let mut read = |hemi: Hemisphere, path: &Path| -> Result<Vec<u32>> {
            let annot = neuroformats::read_annot(path).map_err(|e| asset_err(path, e))?;
            let mut by_code: HashMap<i32, u32> = HashMap::new();
            for entry in &annot.colortable.regions {
                if is_background(&entry.name) {
                    continue;
                }
                by_code.insert(entry.label, next_index);
                regions.push(Region {
                    index: next_index,
                    name: entry.name.clone(),
                    hemisphere: hemi,
                });
                next_index += 1;
            }
            Ok(annot
                .vertex_labels
                .iter()
                .map(|code| by_code.get(code).copied().unwrap_or(0))
                .collect())
        };
        let left_labels = read(Hemisphere::Left, left)?;
        let right_labels = read(Hemisphere::Right, right)?;
        Self::new(
            name,
            regions,
            PerHemisphere {
                left: left_labels,
                right: right_labels,
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, index: u32) -> Option<&Region> {
        self.regions.iter().find(|r| r.index == index)
    }

    pub fn region_by_name(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn labels(&self, hemi: Hemisphere) -> &[u32] {
        self.labels.get(hemi)
    }
}

fn is_background(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower == "unknown" || lower == "???" || lower.contains("medial_wall")
}

fn asset_err(path: &Path, err: impl fmt::Display) -> FigureError {
    FigureError::Asset {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Everything needed to draw statistic maps on the cortex.
#[derive(Debug, Clone)]
pub struct BrainAssets {
    pub meshes: PerHemisphere<Mesh>,
    /// Sulcal depth, drawn as the gray underlay.
    pub sulc: PerHemisphere<Vec<f64>>,
    pub atlas: Atlas,
}

impl BrainAssets {
    pub fn load(resources_dir: &Path, cfg: &SurfaceConfig) -> Result<Self> {
        let file = |hemi: Hemisphere, suffix: &str| -> Result<PathBuf> {
            let path = resources_dir.join(format!("{}.{suffix}", hemi.prefix()));
            if path.is_file() {
                Ok(path)
            } else {
                Err(FigureError::MissingInput { path })
            }
        };

        let meshes = PerHemisphere {
            left: Mesh::from_surf(&file(Hemisphere::Left, &cfg.style)?)?,
            right: Mesh::from_surf(&file(Hemisphere::Right, &cfg.style)?)?,
        };

        let sulc = meshes.try_map(|hemi, mesh| {
            let path = file(hemi, &cfg.sulc)?;
            let curv = neuroformats::read_curv(&path).map_err(|e| asset_err(&path, e))?;
            if curv.data.len() != mesh.num_vertices() {
                return Err(asset_err(
                    &path,
                    format!(
                        "{} values for a {}-vertex mesh",
                        curv.data.len(),
                        mesh.num_vertices()
                    ),
                ));
            }
            Ok(curv.data.iter().map(|&v| v as f64).collect::<Vec<f64>>())
        })?;

        let annot = format!("{}.annot", cfg.atlas);
        let atlas = Atlas::from_annot(
            cfg.atlas.clone(),
            &file(Hemisphere::Left, &annot)?,
            &file(Hemisphere::Right, &annot)?,
        )?;
        for hemi in Hemisphere::BOTH {
            let (labels, verts) = (atlas.labels(hemi).len(), meshes.get(hemi).num_vertices());
            if labels != verts {
                return Err(FigureError::Asset {
                    path: resources_dir.join(format!("{}.{annot}", hemi.prefix())),
                    reason: format!("{labels} labels for a {verts}-vertex mesh"),
                });
            }
        }

        debug!(
            atlas = %atlas.name(),
            regions = atlas.regions().len(),
            lh_vertices = meshes.left.num_vertices(),
            rh_vertices = meshes.right.num_vertices(),
            "loaded brain assets"
        );
        Ok(Self {
            meshes,
            sulc,
            atlas,
        })
    }
}
