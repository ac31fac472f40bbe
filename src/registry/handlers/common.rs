use std::path::PathBuf;

use glam::DVec3;

use crate::access::AccessLevel;
use crate::dsl::args::{self, PointArg};
use crate::error::ScriptError;
use crate::session::Session;

/// Parse a point argument, mapping planar paper coordinates through the
/// current model.
pub fn resolve_point(session: &Session, keyword: &str, text: &str) -> Result<DVec3, ScriptError> {
    match args::point(keyword, text)? {
        PointArg::Spatial(p) => Ok(p),
        PointArg::Planar(p) => {
            let model = session.model().ok_or_else(|| {
                ScriptError::missing(format!(
                    "`{keyword}` with paper coordinates needs paper to map them onto"
                ))
            })?;
            Ok(model.map_planar_point(p))
        }
    }
}

/// The session filename, or MissingPrecondition naming the command.
pub fn required_filename(session: &Session, command: &str) -> Result<PathBuf, ScriptError> {
    session
        .filename
        .clone()
        .ok_or_else(|| ScriptError::missing(format!("`{command}` needs a filename")))
}

/// Destination of an export. Overwriting an existing file takes ROOT.
pub fn export_target(session: &Session, command: &str) -> Result<PathBuf, ScriptError> {
    let path = required_filename(session, command)?;
    if path.exists() && session.access() < AccessLevel::Root {
        return Err(ScriptError::InsufficientAccess {
            required: AccessLevel::Root,
            current: session.access(),
        });
    }
    Ok(path)
}
