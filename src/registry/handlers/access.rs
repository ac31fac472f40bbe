use crate::access::AccessLevel;
use crate::error::ScriptError;
use crate::prompt::Confirmation;
use crate::session::Session;

/// Ask the operator before raising the access level. Holding the prompt
/// guard keeps the supervisor from offering cancellation meanwhile.
fn elevate(
    session: &mut Session,
    level: AccessLevel,
    confirmation: Confirmation,
) -> Result<(), ScriptError> {
    if session.access() >= level {
        return Ok(());
    }
    let granted = {
        let _prompt = session.prompts.open();
        session.prompter.confirm(confirmation)
    };
    if granted {
        log::info!("access raised to {level}");
        session.access = level;
    } else {
        log::info!("{level} access declined");
    }
    Ok(())
}

pub fn root(session: &mut Session) -> Result<(), ScriptError> {
    elevate(session, AccessLevel::Root, Confirmation::EnterRoot)
}

pub fn debug(session: &mut Session) -> Result<(), ScriptError> {
    elevate(session, AccessLevel::Dev, Confirmation::EnterDebug)
}

pub fn diagnostics(session: &mut Session) -> Result<(), ScriptError> {
    let Some(model) = session.model() else {
        return Err(ScriptError::missing("`diagnostics` needs paper"));
    };
    let vertices = model.planar_vertices();
    let regions = model.regions();
    let corners = model.corners();

    let mut lines = Vec::with_capacity(vertices.len() + regions.len() + corners.len() + 3);
    lines.push(format!("vertices: {}", vertices.len()));
    lines.push(format!("polygons: {}", regions.len()));
    for (i, v) in vertices.iter().enumerate() {
        lines.push(format!("planar vertex {i}: {} {}", v.x, v.y));
    }
    for (i, polygon) in regions.iter().enumerate() {
        let indices: Vec<String> = polygon.iter().map(ToString::to_string).collect();
        lines.push(format!("polygon {i}: {}", indices.join(" ")));
    }
    lines.push("corners:".to_string());
    for c in &corners {
        lines.push(format!("{} {}", c.x, c.y));
    }
    session.transcript.extend(lines);
    Ok(())
}
