use glam::{DVec2, DVec3};

use crate::error::ScriptError;
use crate::model::geometry::Plane;
use crate::model::PaperPreset;

/// Parameters staged by parameter keywords and consumed by the next
/// structural command. Each field is either absent or fully specified; the
/// setters validate shape before anything lands here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterStage {
    pub point: Option<DVec3>,
    pub normal: Option<DVec3>,
    /// Planar point selecting the region a fold or cut is restricted to.
    pub tracker: Option<DVec2>,
    pub angle: Option<i32>,
    pub corners: Vec<DVec2>,
    pub preset: Option<PaperPreset>,
    pub title: Option<String>,
}

impl ParameterStage {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn set_plane(&mut self, plane: Plane) {
        self.point = Some(plane.point);
        self.normal = Some(plane.normal);
    }

    /// Point and normal, or MissingPrecondition naming the command.
    pub fn plane(&self, command: &str) -> Result<Plane, ScriptError> {
        match (self.point, self.normal) {
            (Some(point), Some(normal)) => Ok(Plane { point, normal }),
            _ => Err(ScriptError::missing(format!(
                "`{command}` needs a plane point and normal"
            ))),
        }
    }

    pub fn fold_angle(&self) -> Result<i32, ScriptError> {
        self.angle
            .ok_or_else(|| ScriptError::missing("`rotate` needs an angle"))
    }

    /// Whether `new` has anything to build from. A corner list is only
    /// checked for validity by the backend.
    pub fn has_paper(&self) -> bool {
        self.preset.is_some() || !self.corners.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn plane_needs_both_halves() {
        let mut stage = ParameterStage {
            point: Some(DVec3::ZERO),
            ..ParameterStage::default()
        };
        assert!(matches!(
            stage.plane("cut"),
            Err(ScriptError::MissingPrecondition { .. })
        ));
        stage.normal = Some(DVec3::Z);
        assert_eq!(stage.plane("cut").unwrap().normal, DVec3::Z);
    }

    #[test]
    fn clear_resets_everything() {
        let mut stage = ParameterStage {
            angle: Some(90),
            corners: vec![DVec2::ONE],
            title: Some("crane".into()),
            ..ParameterStage::default()
        };
        stage.clear();
        assert_eq!(stage, ParameterStage::default());
        assert!(!stage.has_paper());
    }

    #[test]
    fn any_corner_counts_as_paper() {
        let stage = ParameterStage {
            corners: vec![DVec2::ZERO],
            ..ParameterStage::default()
        };
        assert!(stage.has_paper());
    }
}
