use std::sync::Arc;

use crate::access::AccessLevel;
use crate::dsl::canonicalize;
use crate::error::ScriptError;
use crate::session::{Scope, Session};

use super::common::required_filename;

/// Run the named script in a throwaway USER session built on the same
/// backend. Only its transcript comes back.
pub fn compile(session: &mut Session) -> Result<(), ScriptError> {
    let path = required_filename(session, "compile")?;
    let source = std::fs::read_to_string(&path)?;
    log::info!("compiling {}", path.display());

    let mut sandbox = session.sandbox();
    let result = sandbox.execute(&source);
    session.transcript.append(&mut sandbox.drain_transcript());
    result?;

    session.stage.clear();
    Ok(())
}

/// Run the named script in place of the current paper. The body runs under
/// USER access and is not recorded; the history becomes one `load` statement.
pub fn load(session: &mut Session) -> Result<(), ScriptError> {
    let path = required_filename(session, "load")?;
    let source = std::fs::read_to_string(&path)?;
    log::info!("loading {}", path.display());

    let body = canonicalize(&source);
    session.scoped(Scope::nested(AccessLevel::User), |s| s.dispatch(&body))?;

    session.rebase_history(&format!("filename [{}] load", path.display()));
    session.stage.clear();
    Ok(())
}

/// Replace the paper from a native file. A file without a stored color gets
/// the reset color.
pub fn open(session: &mut Session) -> Result<(), ScriptError> {
    let path = required_filename(session, "open")?;
    let document = session.backend.open_native(&path)?;
    log::info!("opened {}", path.display());

    session.color = document
        .color
        .unwrap_or(session.settings.reset_paper_color);
    session.replace_model(Some(document.model));
    session.rebase_history(&format!("filename [{}] open", path.display()));
    Ok(())
}

pub fn load_texture(session: &mut Session) -> Result<(), ScriptError> {
    let path = required_filename(session, "load-texture")?;
    let image = image::open(&path).map_err(|e| ScriptError::Io {
        message: format!("{}: {e}", path.display()),
    })?;
    if image.color().has_alpha() {
        return Err(ScriptError::UnsupportedTexture {
            path: path.display().to_string(),
        });
    }
    log::info!(
        "texture {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    session.texture = Some(Arc::new(image.to_rgb8()));
    Ok(())
}

pub fn unload_texture(session: &mut Session) -> Result<(), ScriptError> {
    session.texture = None;
    Ok(())
}
