//! Viewer session state
//!
//! Holds what a viewer needs between user actions: the selected file for
//! each hemisphere, its cached mask and the mesh currently shown. Showing a
//! structure only re-runs extraction on the cached mask.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{PipelineConfig, Rgb};
use crate::error::{PipelineError, PipelineResult};
use crate::loader::load;
use crate::preprocess::preprocess_with;
use crate::surface::{extract_with, Mesh};
use crate::volume::BinaryVolume;

/// Which structure slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Hemisphere {
    Left,
    Right,
}

impl std::fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Hemisphere::Left => write!(f, "Structure L"),
            Hemisphere::Right => write!(f, "Structure R"),
        }
    }
}

/// A loaded structure
#[derive(Debug)]
pub struct Structure {
    path: PathBuf,
    mask: BinaryVolume,
    mesh: Option<Mesh>,
}

impl Structure {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mask(&self) -> &BinaryVolume {
        &self.mask
    }

    /// Mesh currently shown, `None` when hidden
    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.mesh.is_some()
    }
}

/// Load and binarize one file
fn load_mask(path: &Path, config: &PipelineConfig) -> PipelineResult<BinaryVolume> {
    let image = load(path)?;
    preprocess_with(&image, &config.preprocess)
}

/// Explicit viewer state
#[derive(Debug, Default)]
pub struct Session {
    config: PipelineConfig,
    structures: BTreeMap<Hemisphere, Structure>,
}

impl Session {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            structures: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn color(&self) -> Rgb {
        self.config.color
    }

    pub fn structure(&self, side: Hemisphere) -> Option<&Structure> {
        self.structures.get(&side)
    }

    /// Load `path` into `side`, replacing (and hiding) any previous structure
    ///
    /// On error the slot keeps its previous contents.
    pub fn load_structure<P: AsRef<Path>>(&mut self, side: Hemisphere, path: P) -> PipelineResult<()> {
        let path = path.as_ref();
        let mask = load_mask(path, &self.config)?;
        self.insert(side, path.to_path_buf(), mask);
        Ok(())
    }

    /// Load both hemispheres concurrently
    ///
    /// Nothing is stored unless both files load.
    pub fn load_pair<P, Q>(&mut self, left: P, right: Q) -> PipelineResult<()>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let (left, right) = (left.as_ref(), right.as_ref());
        let config = &self.config;
        let (left_mask, right_mask) = std::thread::scope(|s| {
            let handle = s.spawn(|| load_mask(right, config));
            let left_mask = load_mask(left, config);
            let right_mask = handle.join().unwrap_or_else(|_| {
                Err(PipelineError::Format(format!(
                    "Loader thread panicked for '{}'",
                    right.display()
                )))
            });
            (left_mask, right_mask)
        });
        let (left_mask, right_mask) = (left_mask?, right_mask?);

        self.insert(Hemisphere::Left, left.to_path_buf(), left_mask);
        self.insert(Hemisphere::Right, right.to_path_buf(), right_mask);
        Ok(())
    }

    fn insert(&mut self, side: Hemisphere, path: PathBuf, mask: BinaryVolume) {
        info!(
            %side,
            path = %path.display(),
            dims = ?mask.dims(),
            foreground = mask.count_foreground(),
            "structure loaded"
        );
        self.structures.insert(side, Structure { path, mask, mesh: None });
    }

    /// Show or hide a structure, returning the mesh when shown
    ///
    /// # Errors
    /// `Value` if nothing is loaded for `side`; extraction errors otherwise.
    pub fn set_visible(&mut self, side: Hemisphere, visible: bool) -> PipelineResult<Option<&Mesh>> {
        let params = self.config.extract.clone();
        let structure = self
            .structures
            .get_mut(&side)
            .ok_or_else(|| PipelineError::Value(format!("No file loaded for {}", side)))?;

        if visible {
            let mesh = extract_with(&structure.mask, &params)?;
            info!(%side, faces = mesh.num_faces(), "structure shown");
            structure.mesh = Some(mesh);
        } else {
            structure.mesh = None;
        }
        Ok(structure.mesh.as_ref())
    }

    /// Change the display color and rebuild every visible mesh
    ///
    /// On error neither the color nor any mesh changes.
    pub fn set_color(&mut self, color: Rgb) -> PipelineResult<()> {
        let params = &self.config.extract;
        let rebuilt = self
            .structures
            .iter()
            .filter(|(_, s)| s.mesh.is_some())
            .map(|(&side, s)| extract_with(&s.mask, params).map(|mesh| (side, mesh)))
            .collect::<PipelineResult<Vec<_>>>()?;

        self.config.color = color;
        for (side, mesh) in rebuilt {
            if let Some(structure) = self.structures.get_mut(&side) {
                structure.mesh = Some(mesh);
            }
        }
        Ok(())
    }

    /// Meshes to draw, with the current color
    pub fn visible_meshes(&self) -> impl Iterator<Item = (Hemisphere, &Mesh, Rgb)> + '_ {
        let color = self.config.color;
        self.structures
            .iter()
            .filter_map(move |(&side, s)| s.mesh.as_ref().map(|m| (side, m, color)))
    }
}
