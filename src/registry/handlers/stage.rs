//! Parameter setters. Each one validates every argument before it touches
//! the stage, so a malformed parameter never leaves half a value behind.

use std::path::PathBuf;

use glam::DVec2;

use super::common::resolve_point;
use crate::dsl::args::{self, exactly};
use crate::error::ScriptError;
use crate::model::geometry;
use crate::model::{PaperColor, PaperPreset};
use crate::session::{Locale, Session};

pub fn plane(session: &mut Session, keyword: &str, argv: &[String]) -> Result<(), ScriptError> {
    let [point, normal] = exactly::<2>(keyword, argv)?;
    let point = resolve_point(session, keyword, point)?;
    let normal = args::vec3(keyword, normal)?;
    session.stage.point = Some(point);
    session.stage.normal = Some(normal);
    Ok(())
}

pub fn plane_through(
    session: &mut Session,
    keyword: &str,
    argv: &[String],
) -> Result<(), ScriptError> {
    let [a, b, c] = exactly::<3>(keyword, argv)?;
    let plane = geometry::plane_through(
        resolve_point(session, keyword, a)?,
        resolve_point(session, keyword, b)?,
        resolve_point(session, keyword, c)?,
    )?;
    session.stage.set_plane(plane);
    Ok(())
}

pub fn angle_bisector(
    session: &mut Session,
    keyword: &str,
    argv: &[String],
) -> Result<(), ScriptError> {
    let [a, vertex, b] = exactly::<3>(keyword, argv)?;
    let plane = geometry::angle_bisector(
        resolve_point(session, keyword, a)?,
        resolve_point(session, keyword, vertex)?,
        resolve_point(session, keyword, b)?,
    )?;
    session.stage.set_plane(plane);
    Ok(())
}

pub fn plane_point(session: &mut Session, keyword: &str, argv: &[String]) -> Result<(), ScriptError> {
    let [point] = exactly::<1>(keyword, argv)?;
    let point = resolve_point(session, keyword, point)?;
    session.stage.point = Some(point);
    Ok(())
}

pub fn plane_normal(session: &mut Session, keyword: &str, argv: &[String]) -> Result<(), ScriptError> {
    let [normal] = exactly::<1>(keyword, argv)?;
    session.stage.normal = Some(args::vec3(keyword, normal)?);
    Ok(())
}

pub fn target(session: &mut Session, keyword: &str, argv: &[String]) -> Result<(), ScriptError> {
    let [point] = exactly::<1>(keyword, argv)?;
    session.stage.tracker = Some(args::vec2(keyword, point)?);
    Ok(())
}

pub fn angle(session: &mut Session, keyword: &str, argv: &[String]) -> Result<(), ScriptError> {
    let [degrees] = exactly::<1>(keyword, argv)?;
    session.stage.angle = Some(args::single_int(keyword, degrees)?);
    Ok(())
}

/// `[x0 y0 x1 y1]` stages the rectangle with those opposite corners; a single
/// word names a preset.
pub fn paper(session: &mut Session, keyword: &str, argv: &[String]) -> Result<(), ScriptError> {
    let [spec] = exactly::<1>(keyword, argv)?;
    match spec.split_whitespace().count() {
        4 => {
            let n = args::numbers(keyword, spec)?;
            let [x0, y0, x1, y1] =
                <[f64; 4]>::try_from(n).map_err(|_| ScriptError::malformed(keyword))?;
            session.stage.corners = vec![
                DVec2::new(x0, y0),
                DVec2::new(x1, y0),
                DVec2::new(x1, y1),
                DVec2::new(x0, y1),
            ];
            session.stage.preset = None;
        }
        1 => {
            let preset = PaperPreset::from_tag(spec).ok_or_else(|| ScriptError::UnknownPreset {
                tag: spec.to_string(),
            })?;
            session.stage.preset = Some(preset);
        }
        _ => return Err(ScriptError::malformed(keyword)),
    }
    Ok(())
}

pub fn corner(session: &mut Session, keyword: &str, argv: &[String]) -> Result<(), ScriptError> {
    let [point] = exactly::<1>(keyword, argv)?;
    let corner = args::vec2(keyword, point)?;
    session.stage.corners.push(corner);
    Ok(())
}

pub fn locale(session: &mut Session, keyword: &str, argv: &[String]) -> Result<(), ScriptError> {
    let [spec] = exactly::<1>(keyword, argv)?;
    let [language, country] = <[&str; 2]>::try_from(spec.split_whitespace().collect::<Vec<_>>())
        .map_err(|_| ScriptError::malformed(keyword))?;
    session.locale = Some(Locale {
        language: language.to_string(),
        country: country.to_string(),
    });
    Ok(())
}

pub fn filename(session: &mut Session, keyword: &str, argv: &[String]) -> Result<(), ScriptError> {
    let [path] = exactly::<1>(keyword, argv)?;
    if path.is_empty() {
        return Err(ScriptError::malformed(keyword));
    }
    session.filename = Some(PathBuf::from(path));
    Ok(())
}

pub fn title(session: &mut Session, keyword: &str, argv: &[String]) -> Result<(), ScriptError> {
    let [text] = exactly::<1>(keyword, argv)?;
    session.stage.title = Some(text.to_string());
    Ok(())
}

pub fn camera(session: &mut Session, keyword: &str, argv: &[String]) -> Result<(), ScriptError> {
    let [direction, x_axis, y_axis] = exactly::<3>(keyword, argv)?;
    let direction = args::vec3(keyword, direction)?;
    let x_axis = args::vec3(keyword, x_axis)?;
    let y_axis = args::vec3(keyword, y_axis)?;
    session.camera.set_direction(direction);
    session.camera.set_x_axis(x_axis);
    session.camera.set_y_axis(y_axis);
    Ok(())
}

pub fn color(session: &mut Session, keyword: &str, argv: &[String]) -> Result<(), ScriptError> {
    let [spec] = exactly::<1>(keyword, argv)?;
    session.color = match args::integers(keyword, spec)?.as_slice() {
        [packed] => PaperColor::from_packed(*packed),
        [r, g, b] => PaperColor::from_channels(*r, *g, *b),
        _ => return Err(ScriptError::malformed(keyword)),
    };
    Ok(())
}

pub fn uncolor(session: &mut Session, keyword: &str, argv: &[String]) -> Result<(), ScriptError> {
    if !argv.is_empty() {
        return Err(ScriptError::malformed(keyword));
    }
    session.color = session.settings.reset_paper_color;
    Ok(())
}
