//! Boundary to the collaborators the interpreter drives but does not own:
//! the folding engine, the camera, and the export encoders.

pub mod color;
pub mod geometry;
pub mod ledger;

use std::any::Any;
use std::fmt;
use std::path::Path;

use glam::{DVec2, DVec3};
use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::ScriptError;

pub use color::PaperColor;

/// Index of a connected surface region (polygon) of the folded model.
pub type RegionId = usize;

// ── Paper presets ──────────────────────────────────────────────

/// Named paper shapes the model can build without a corner list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperPreset {
    Square,
    A4,
    Hexagon,
    Dollar,
    Forint,
}

impl PaperPreset {
    /// Script tag accepted by `paper [...]`.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::A4 => "a4",
            Self::Hexagon => "hexagon",
            Self::Dollar => "usd",
            Self::Forint => "huf",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.tag() == tag)
    }

    pub fn all() -> &'static [PaperPreset] {
        &[Self::Square, Self::A4, Self::Hexagon, Self::Dollar, Self::Forint]
    }
}

// ── Folding model ──────────────────────────────────────────────

/// The geometric folding engine. Every mutating call is expected to be
/// atomic on failure and to push exactly one entry on the native undo stack
/// on success.
pub trait FoldingModel: Send {
    fn crease(&mut self, point: DVec3, normal: DVec3) -> Result<(), ScriptError>;

    fn rotation_fold(
        &mut self,
        point: DVec3,
        normal: DVec3,
        angle: i32,
        region: Option<RegionId>,
    ) -> Result<(), ScriptError>;

    fn reflection_fold(
        &mut self,
        point: DVec3,
        normal: DVec3,
        region: Option<RegionId>,
    ) -> Result<(), ScriptError>;

    fn cut(
        &mut self,
        point: DVec3,
        normal: DVec3,
        region: Option<RegionId>,
    ) -> Result<(), ScriptError>;

    fn region_containing(&self, point: DVec2) -> Result<RegionId, ScriptError>;

    /// Current 3-D image of a point given in flat paper coordinates.
    fn map_planar_point(&self, point: DVec2) -> DVec3;

    fn undo(&mut self) -> Result<(), ScriptError>;

    fn redo(&mut self) -> Result<(), ScriptError>;

    /// Number of operations the native undo stack can still revert.
    fn undo_depth(&self) -> usize;

    // Read-only introspection, used by `diagnostics`.

    fn planar_vertices(&self) -> Vec<DVec2>;

    fn regions(&self) -> Vec<Vec<usize>>;

    fn corners(&self) -> Vec<DVec2>;

    /// Lets a backend recognize its own concrete model type behind the trait
    /// object, e.g. when serializing it natively.
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
}

// ── Camera ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraBasis {
    pub direction: DVec3,
    pub x_axis: DVec3,
    pub y_axis: DVec3,
}

impl Default for CameraBasis {
    fn default() -> Self {
        Self {
            direction: DVec3::Z,
            x_axis: DVec3::X,
            y_axis: DVec3::Y,
        }
    }
}

pub trait Camera: Send {
    fn set_direction(&mut self, direction: DVec3);
    fn set_x_axis(&mut self, axis: DVec3);
    fn set_y_axis(&mut self, axis: DVec3);
    fn basis(&self) -> CameraBasis;
}

/// Camera that only stores its basis; enough for headless export.
#[derive(Debug, Clone, Default)]
pub struct BasisCamera {
    basis: CameraBasis,
}

impl Camera for BasisCamera {
    fn set_direction(&mut self, direction: DVec3) {
        self.basis.direction = direction;
    }

    fn set_x_axis(&mut self, axis: DVec3) {
        self.basis.x_axis = axis;
    }

    fn set_y_axis(&mut self, axis: DVec3) {
        self.basis.y_axis = axis;
    }

    fn basis(&self) -> CameraBasis {
        self.basis
    }
}

// ── Export ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    /// Textured 3-D mesh.
    Ctm,
    /// Vector document with folding instructions.
    AutoPdf,
    /// Looping animation of the folding sequence.
    Gif,
    /// Animation revolving around the finished model.
    RevolvingGif,
    /// Portable archive bundling a viewer.
    Jar,
    /// Flat bitmap.
    Png,
    /// Native archive that replays the folding sequence.
    Ori,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ctm => "ctm",
            Self::AutoPdf => "pdf",
            Self::Gif => "gif",
            Self::RevolvingGif => "revolving gif",
            Self::Jar => "jar",
            Self::Png => "png",
            Self::Ori => "ori",
        })
    }
}

/// Everything an encoder may need. Fields a format does not use are `None`.
pub struct ExportJob<'a> {
    pub format: ExportFormat,
    pub model: &'a dyn FoldingModel,
    pub camera: &'a dyn Camera,
    pub path: &'a Path,
    pub color: Option<PaperColor>,
    pub texture: Option<&'a RgbImage>,
    pub title: Option<&'a str>,
    /// Frame side length in pixels for animated formats.
    pub frame_size: u32,
}

/// A model read back from a native file, with the paper color it stored.
pub struct NativeDocument {
    pub model: Box<dyn FoldingModel>,
    pub color: Option<PaperColor>,
}

// ── Backend ────────────────────────────────────────────────────

/// Factory and encoder bundle a session is built on.
pub trait Backend: Send + Sync {
    fn model_from_corners(&self, corners: &[DVec2]) -> Result<Box<dyn FoldingModel>, ScriptError>;

    fn model_from_preset(&self, preset: PaperPreset) -> Box<dyn FoldingModel>;

    fn open_native(&self, path: &Path) -> Result<NativeDocument, ScriptError>;

    fn new_camera(&self) -> Box<dyn Camera> {
        Box::new(BasisCamera::default())
    }

    fn export(&self, job: &ExportJob<'_>) -> Result<(), ScriptError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_tags_round_trip() {
        for preset in PaperPreset::all() {
            assert_eq!(PaperPreset::from_tag(preset.tag()), Some(*preset));
        }
        assert_eq!(PaperPreset::from_tag("huf"), Some(PaperPreset::Forint));
        assert_eq!(PaperPreset::from_tag("forint"), None);
    }

    #[test]
    fn camera_stores_basis() {
        let mut cam = BasisCamera::default();
        cam.set_direction(DVec3::new(1.0, 1.0, 0.0));
        cam.set_y_axis(DVec3::Z);
        let basis = cam.basis();
        assert_eq!(basis.direction, DVec3::new(1.0, 1.0, 0.0));
        assert_eq!(basis.x_axis, DVec3::X);
        assert_eq!(basis.y_axis, DVec3::Z);
    }
}
