//! Journaling backend used for headless validation of scripts.
//!
//! The ledger does no crease geometry. It keeps the sheet outline (convex
//! hull of the construction corners), treats the whole sheet as region 0,
//! and records every operation on a journal that doubles as the native undo
//! stack. Native documents are the journal serialized as JSON; PNG export
//! rasterizes the flat outline. Other encoders are not available here.

use std::any::Any;
use std::fs;
use std::path::Path;

use glam::{DVec2, DVec3};
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use super::{
    Backend, ExportFormat, ExportJob, FoldingModel, NativeDocument, PaperColor, PaperPreset,
    RegionId,
};
use crate::error::ScriptError;

const LEDGER_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FoldOp {
    Crease,
    Rotate { angle: i32 },
    Reflect,
    Cut,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoldRecord {
    #[serde(flatten)]
    pub op: FoldOp,
    pub point: DVec3,
    pub normal: DVec3,
    pub region: Option<RegionId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerModel {
    outline: Vec<DVec2>,
    journal: Vec<FoldRecord>,
    #[serde(skip)]
    redo: Vec<FoldRecord>,
}

impl LedgerModel {
    pub fn from_corners(corners: &[DVec2]) -> Result<Self, ScriptError> {
        let outline = convex_hull(corners);
        if outline.len() < 3 || polygon_area(&outline) == 0.0 {
            return Err(ScriptError::ModelConstructionFailure {
                reason: format!("{} corner(s) enclose no area", corners.len()),
            });
        }
        Ok(Self {
            outline,
            journal: Vec::new(),
            redo: Vec::new(),
        })
    }

    pub fn from_preset(preset: PaperPreset) -> Self {
        let outline = preset_outline(preset);
        Self {
            outline,
            journal: Vec::new(),
            redo: Vec::new(),
        }
    }

    pub fn journal(&self) -> &[FoldRecord] {
        &self.journal
    }

    pub fn outline(&self) -> &[DVec2] {
        &self.outline
    }

    fn record(
        &mut self,
        op: FoldOp,
        point: DVec3,
        normal: DVec3,
        region: Option<RegionId>,
    ) -> Result<(), ScriptError> {
        if normal.length() == 0.0 {
            return Err(ScriptError::model("plane normal has zero length"));
        }
        if let Some(id) = region {
            if id != 0 {
                return Err(ScriptError::model(format!("no region {id}")));
            }
        }
        self.journal.push(FoldRecord {
            op,
            point,
            normal,
            region,
        });
        self.redo.clear();
        Ok(())
    }
}

impl FoldingModel for LedgerModel {
    fn crease(&mut self, point: DVec3, normal: DVec3) -> Result<(), ScriptError> {
        self.record(FoldOp::Crease, point, normal, None)
    }

    fn rotation_fold(
        &mut self,
        point: DVec3,
        normal: DVec3,
        angle: i32,
        region: Option<RegionId>,
    ) -> Result<(), ScriptError> {
        self.record(FoldOp::Rotate { angle }, point, normal, region)
    }

    fn reflection_fold(
        &mut self,
        point: DVec3,
        normal: DVec3,
        region: Option<RegionId>,
    ) -> Result<(), ScriptError> {
        self.record(FoldOp::Reflect, point, normal, region)
    }

    fn cut(
        &mut self,
        point: DVec3,
        normal: DVec3,
        region: Option<RegionId>,
    ) -> Result<(), ScriptError> {
        self.record(FoldOp::Cut, point, normal, region)
    }

    fn region_containing(&self, point: DVec2) -> Result<RegionId, ScriptError> {
        if outline_contains(&self.outline, point) {
            Ok(0)
        } else {
            Err(ScriptError::model(format!(
                "no region contains [{} {}]",
                point.x, point.y
            )))
        }
    }

    fn map_planar_point(&self, point: DVec2) -> DVec3 {
        point.extend(0.0)
    }

    fn undo(&mut self) -> Result<(), ScriptError> {
        let last = self
            .journal
            .pop()
            .ok_or_else(|| ScriptError::model("nothing to undo"))?;
        self.redo.push(last);
        Ok(())
    }

    fn redo(&mut self) -> Result<(), ScriptError> {
        let next = self
            .redo
            .pop()
            .ok_or_else(|| ScriptError::model("nothing to redo"))?;
        self.journal.push(next);
        Ok(())
    }

    fn undo_depth(&self) -> usize {
        self.journal.len()
    }

    fn planar_vertices(&self) -> Vec<DVec2> {
        self.outline.clone()
    }

    fn regions(&self) -> Vec<Vec<usize>> {
        vec![(0..self.outline.len()).collect()]
    }

    fn corners(&self) -> Vec<DVec2> {
        self.outline.clone()
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

// ── Backend ────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct LedgerDocument {
    version: u32,
    color: Option<PaperColor>,
    model: LedgerModel,
}

#[derive(Debug, Clone, Default)]
pub struct LedgerBackend;

impl Backend for LedgerBackend {
    fn model_from_corners(&self, corners: &[DVec2]) -> Result<Box<dyn FoldingModel>, ScriptError> {
        Ok(Box::new(LedgerModel::from_corners(corners)?))
    }

    fn model_from_preset(&self, preset: PaperPreset) -> Box<dyn FoldingModel> {
        Box::new(LedgerModel::from_preset(preset))
    }

    fn open_native(&self, path: &Path) -> Result<NativeDocument, ScriptError> {
        let text = fs::read_to_string(path)?;
        let doc: LedgerDocument =
            serde_json::from_str(&text).map_err(|e| ScriptError::model(e.to_string()))?;
        if doc.version != LEDGER_FORMAT_VERSION {
            return Err(ScriptError::model(format!(
                "unsupported ledger version {}",
                doc.version
            )));
        }
        Ok(NativeDocument {
            model: Box::new(doc.model),
            color: doc.color,
        })
    }

    fn export(&self, job: &ExportJob<'_>) -> Result<(), ScriptError> {
        let fail = |message: String| ScriptError::Export {
            format: job.format.to_string(),
            message,
        };
        match job.format {
            ExportFormat::Ori => {
                let model = job
                    .model
                    .as_any()
                    .and_then(|m| m.downcast_ref::<LedgerModel>())
                    .ok_or_else(|| fail("only ledger models can be archived".to_string()))?;
                let doc = LedgerDocument {
                    version: LEDGER_FORMAT_VERSION,
                    color: job.color,
                    model: model.clone(),
                };
                let json = serde_json::to_string_pretty(&doc).map_err(|e| fail(e.to_string()))?;
                fs::write(job.path, json)?;
                Ok(())
            }
            ExportFormat::Png => {
                let color = job.color.unwrap_or(PaperColor::NAVY);
                rasterize_outline(&job.model.corners(), color, job.frame_size)
                    .save(job.path)
                    .map_err(|e| fail(e.to_string()))
            }
            other => Err(fail(format!("the ledger backend has no {other} encoder"))),
        }
    }
}

// ── Outline helpers ────────────────────────────────────────────

/// Point-in-polygon for a counter-clockwise convex outline: an interior
/// point lies left of (or on) every edge.
fn outline_contains(outline: &[DVec2], p: DVec2) -> bool {
    let n = outline.len();
    (0..n).all(|i| match (outline.get(i), outline.get((i + 1) % n)) {
        (Some(a), Some(b)) => (*b - *a).perp_dot(p - *a) >= 0.0,
        _ => false,
    })
}

fn preset_outline(preset: PaperPreset) -> Vec<DVec2> {
    let rect = |w: f64, h: f64| {
        vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(w, 0.0),
            DVec2::new(w, h),
            DVec2::new(0.0, h),
        ]
    };
    match preset {
        PaperPreset::Square => rect(400.0, 400.0),
        PaperPreset::A4 => rect(424.26, 300.0),
        PaperPreset::Dollar => rect(400.0, 170.0),
        PaperPreset::Forint => rect(400.0, 181.82),
        PaperPreset::Hexagon => (0..6)
            .map(|k| {
                let t = f64::from(k) * std::f64::consts::FRAC_PI_3;
                DVec2::new(200.0 + 200.0 * t.cos(), 200.0 + 200.0 * t.sin())
            })
            .collect(),
    }
}

/// Andrew's monotone chain; counter-clockwise, collinear points dropped.
fn convex_hull(points: &[DVec2]) -> Vec<DVec2> {
    let mut pts: Vec<DVec2> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let turn = |o: DVec2, a: DVec2, b: DVec2| (a - o).perp_dot(b - o);
    let mut lower: Vec<DVec2> = Vec::new();
    for &p in &pts {
        while let [.., o, a] = lower.as_slice() {
            if turn(*o, *a, p) > 0.0 {
                break;
            }
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<DVec2> = Vec::new();
    for &p in pts.iter().rev() {
        while let [.., o, a] = upper.as_slice() {
            if turn(*o, *a, p) > 0.0 {
                break;
            }
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn polygon_area(outline: &[DVec2]) -> f64 {
    let n = outline.len();
    let twice: f64 = (0..n)
        .filter_map(|i| Some(outline.get(i)?.perp_dot(*outline.get((i + 1) % n)?)))
        .sum();
    twice.abs() / 2.0
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn rasterize_outline(outline: &[DVec2], color: PaperColor, side: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(side, side, Rgb([255, 255, 255]));
    let (min, max) = outline.iter().fold(
        (DVec2::splat(f64::MAX), DVec2::splat(f64::MIN)),
        |(lo, hi), p| (lo.min(*p), hi.max(*p)),
    );
    let extent = (max - min).max_element();
    if outline.len() < 3 || extent <= 0.0 {
        return img;
    }
    let scale = f64::from(side) / extent;
    let fill = Rgb(color.channels());
    for (x, y, px) in img.enumerate_pixels_mut() {
        let p = min + DVec2::new(f64::from(x) + 0.5, f64::from(y) + 0.5) / scale;
        if outline_contains(outline, p) {
            *px = fill;
        }
    }
    img
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::BasisCamera;

    #[test]
    fn hull_orders_corners_counter_clockwise() {
        let hull = convex_hull(&[
            DVec2::new(0.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.5, 0.5),
        ]);
        assert_eq!(
            hull,
            vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(1.0, 1.0),
                DVec2::new(0.0, 1.0),
            ]
        );
    }

    #[test]
    fn collinear_corners_cannot_build_paper() {
        let err = LedgerModel::from_corners(&[
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(2.0, 2.0),
        ])
        .unwrap_err();
        assert!(matches!(err, ScriptError::ModelConstructionFailure { .. }));
    }

    #[test]
    fn undo_and_redo_move_records_between_stacks() {
        let mut m = LedgerModel::from_preset(PaperPreset::Square);
        m.reflection_fold(DVec3::ZERO, DVec3::X, None).unwrap();
        m.cut(DVec3::ZERO, DVec3::Y, Some(0)).unwrap();
        assert_eq!(m.undo_depth(), 2);

        m.undo().unwrap();
        assert_eq!(m.undo_depth(), 1);
        m.redo().unwrap();
        assert_eq!(m.journal()[1].op, FoldOp::Cut);
        assert!(m.redo().is_err());
    }

    #[test]
    fn new_operation_discards_redo() {
        let mut m = LedgerModel::from_preset(PaperPreset::Square);
        m.crease(DVec3::ZERO, DVec3::X).unwrap();
        m.undo().unwrap();
        m.crease(DVec3::ZERO, DVec3::Y).unwrap();
        assert!(m.redo().is_err());
    }

    #[test]
    fn zero_normal_is_refused_without_mutation() {
        let mut m = LedgerModel::from_preset(PaperPreset::A4);
        assert!(m.reflection_fold(DVec3::ZERO, DVec3::ZERO, None).is_err());
        assert_eq!(m.undo_depth(), 0);
    }

    #[test]
    fn region_lookup_respects_outline() {
        let m = LedgerModel::from_preset(PaperPreset::Square);
        assert_eq!(m.region_containing(DVec2::new(10.0, 10.0)).unwrap(), 0);
        assert!(m.region_containing(DVec2::new(-10.0, 10.0)).is_err());
    }

    #[test]
    fn hexagon_preset_has_six_corners() {
        assert_eq!(LedgerModel::from_preset(PaperPreset::Hexagon).corners().len(), 6);
    }

    #[test]
    fn native_document_round_trips_through_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.ori");
        let backend = LedgerBackend;
        let mut model = LedgerModel::from_preset(PaperPreset::Square);
        model.reflection_fold(DVec3::ZERO, DVec3::X, None).unwrap();
        let camera = BasisCamera::default();

        backend
            .export(&ExportJob {
                format: ExportFormat::Ori,
                model: &model,
                camera: &camera,
                path: &path,
                color: Some(PaperColor::rgb(1, 2, 3)),
                texture: None,
                title: None,
                frame_size: 250,
            })
            .unwrap();

        let doc = backend.open_native(&path).unwrap();
        assert_eq!(doc.color, Some(PaperColor::rgb(1, 2, 3)));
        assert_eq!(doc.model.undo_depth(), 1);
        assert_eq!(doc.model.corners(), model.corners());
    }

    #[test]
    fn png_export_paints_the_outline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.png");
        let model = LedgerModel::from_preset(PaperPreset::Square);
        let camera = BasisCamera::default();
        LedgerBackend
            .export(&ExportJob {
                format: ExportFormat::Png,
                model: &model,
                camera: &camera,
                path: &path,
                color: Some(PaperColor::rgb(200, 0, 0)),
                texture: None,
                title: None,
                frame_size: 16,
            })
            .unwrap();
        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(8, 8), &Rgb([200, 0, 0]));
    }

    #[test]
    fn unsupported_encoders_report_export_errors() {
        let dir = tempfile::tempdir().unwrap();
        let model = LedgerModel::from_preset(PaperPreset::Square);
        let camera = BasisCamera::default();
        let err = LedgerBackend
            .export(&ExportJob {
                format: ExportFormat::Gif,
                model: &model,
                camera: &camera,
                path: &dir.path().join("anim.gif"),
                color: None,
                texture: None,
                title: None,
                frame_size: 250,
            })
            .unwrap_err();
        assert!(matches!(err, ScriptError::Export { .. }));
    }
}
