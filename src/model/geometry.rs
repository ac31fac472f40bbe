use glam::DVec3;

use crate::error::ScriptError;

/// Length the bisector rays are normalized to before subtracting them.
const RAY_LENGTH: f64 = 100.0;

/// A cutting or folding plane in point-normal form. The normal is not
/// normalized; the model only cares about its direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: DVec3,
    pub normal: DVec3,
}

/// Plane containing three points. Fails when they are collinear.
pub fn plane_through(p1: DVec3, p2: DVec3, p3: DVec3) -> Result<Plane, ScriptError> {
    let normal = (p2 - p1).cross(p3 - p1);
    if normal.length() == 0.0 {
        return Err(ScriptError::degenerate("the three points are collinear"));
    }
    Ok(Plane { point: p1, normal })
}

/// Plane bisecting the angle `a`-`vertex`-`b`. Its normal is the difference
/// of the two rays scaled to equal length, which vanishes when the rays
/// coincide.
pub fn angle_bisector(a: DVec3, vertex: DVec3, b: DVec3) -> Result<Plane, ScriptError> {
    let ray_a = scaled_to(a - vertex, RAY_LENGTH)?;
    let ray_b = scaled_to(b - vertex, RAY_LENGTH)?;
    let normal = ray_a - ray_b;
    if normal.length() == 0.0 {
        return Err(ScriptError::degenerate("the angle has no bisector"));
    }
    Ok(Plane {
        point: vertex,
        normal,
    })
}

fn scaled_to(v: DVec3, length: f64) -> Result<DVec3, ScriptError> {
    let current = v.length();
    if current == 0.0 {
        return Err(ScriptError::degenerate("an angle ray has zero length"));
    }
    Ok(v * (length / current))
}
