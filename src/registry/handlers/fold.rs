use crate::error::ScriptError;
use crate::model::geometry::Plane;
use crate::model::RegionId;
use crate::session::Session;

/// Build fresh paper from the staged preset, or else the staged corners.
/// The history is rebased onto a statement that rebuilds this paper.
pub fn new_paper(session: &mut Session) -> Result<(), ScriptError> {
    if !session.stage.has_paper() {
        return Err(ScriptError::ModelConstructionFailure {
            reason: "no paper preset or corners staged".to_string(),
        });
    }
    let (model, construction) = match session.stage.preset {
        Some(preset) => (
            session.backend.model_from_preset(preset),
            format!("paper [{}] new", preset.tag()),
        ),
        None => {
            let corners = &session.stage.corners;
            let model = session
                .backend
                .model_from_corners(corners)
                .map_err(|e| match e {
                    ScriptError::ModelConstructionFailure { .. } => e,
                    other => ScriptError::ModelConstructionFailure {
                        reason: other.to_string(),
                    },
                })?;
            let mut construction: String = corners
                .iter()
                .map(|c| format!("corner [{} {}] ", c.x, c.y))
                .collect();
            construction.push_str("new");
            (model, construction)
        }
    };
    log::info!("new paper: {construction}");
    session.replace_model(Some(model));
    session.rebase_history(&construction);
    session.stage.clear();
    Ok(())
}

/// With a target staged, crease along the plane first and return the region
/// containing the target; the fold is then restricted to it.
fn restriction(session: &mut Session, plane: Plane) -> Result<Option<RegionId>, ScriptError> {
    let Some(tracker) = session.stage.tracker else {
        return Ok(None);
    };
    let model = session.model_mut()?;
    model.crease(plane.point, plane.normal)?;
    model.region_containing(tracker).map(Some)
}

pub fn rotate(session: &mut Session) -> Result<(), ScriptError> {
    let plane = session.stage.plane("rotate")?;
    let angle = session.stage.fold_angle()?;
    let region = restriction(session, plane)?;
    session
        .model_mut()?
        .rotation_fold(plane.point, plane.normal, angle, region)?;
    session.stage.clear();
    Ok(())
}

pub fn reflect(session: &mut Session) -> Result<(), ScriptError> {
    let plane = session.stage.plane("reflect")?;
    let region = restriction(session, plane)?;
    session
        .model_mut()?
        .reflection_fold(plane.point, plane.normal, region)?;
    session.stage.clear();
    Ok(())
}

pub fn cut(session: &mut Session) -> Result<(), ScriptError> {
    let plane = session.stage.plane("cut")?;
    let region = restriction(session, plane)?;
    session.model_mut()?.cut(plane.point, plane.normal, region)?;
    session.stage.clear();
    Ok(())
}

/// Native undo while the model still has one; otherwise drop the previous
/// statement from the history and replay what is left.
pub fn undo(session: &mut Session) -> Result<(), ScriptError> {
    let model = session.model_mut()?;
    if model.undo_depth() > 0 {
        model.undo()?;
    } else if session.is_recording() {
        session.replay_undo(1)?;
    } else {
        return Err(ScriptError::missing("nothing left to undo"));
    }
    session.stage.clear();
    Ok(())
}

pub fn redo(session: &mut Session) -> Result<(), ScriptError> {
    session.model_mut()?.redo()?;
    session.stage.clear();
    Ok(())
}
