use crate::error::ScriptError;
use crate::model::{ExportFormat, ExportJob};
use crate::session::Session;

use super::common::export_target;

fn export(session: &mut Session, format: ExportFormat, command: &str) -> Result<(), ScriptError> {
    let path = export_target(session, command)?;
    if format == ExportFormat::AutoPdf && session.stage.title.is_none() {
        return Err(ScriptError::missing(format!("`{command}` needs a title")));
    }
    // Archives store no color when the paper still has the default one.
    let color = match format {
        ExportFormat::Jar | ExportFormat::Ori
            if session.color == session.settings.reset_paper_color =>
        {
            None
        }
        _ => Some(session.color),
    };
    let model = session
        .model()
        .ok_or_else(|| ScriptError::missing(format!("`{command}` needs paper")))?;

    let job = ExportJob {
        format,
        model,
        camera: &*session.camera,
        path: &path,
        color,
        texture: session.texture.as_deref(),
        title: session.stage.title.as_deref(),
        frame_size: session.settings.export_size,
    };
    session.backend.export(&job)?;
    log::info!("exported {format} to {}", path.display());

    session.stage.clear();
    Ok(())
}

pub fn ctm(session: &mut Session) -> Result<(), ScriptError> {
    export(session, ExportFormat::Ctm, "export-ctm")
}

pub fn auto_pdf(session: &mut Session) -> Result<(), ScriptError> {
    export(session, ExportFormat::AutoPdf, "export-autopdf")
}

pub fn gif(session: &mut Session) -> Result<(), ScriptError> {
    export(session, ExportFormat::Gif, "export-gif")
}

pub fn revolving_gif(session: &mut Session) -> Result<(), ScriptError> {
    export(session, ExportFormat::RevolvingGif, "export-revolving-gif")
}

pub fn jar(session: &mut Session) -> Result<(), ScriptError> {
    export(session, ExportFormat::Jar, "export-jar")
}

pub fn png(session: &mut Session) -> Result<(), ScriptError> {
    export(session, ExportFormat::Png, "export-png")
}

pub fn ori(session: &mut Session) -> Result<(), ScriptError> {
    export(session, ExportFormat::Ori, "export-ori")
}
