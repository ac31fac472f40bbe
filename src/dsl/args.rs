use glam::{DVec2, DVec3};

use crate::error::ScriptError;

/// A point argument as written: either full 3-space coordinates or planar
/// paper coordinates that still need mapping through the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointArg {
    Spatial(DVec3),
    Planar(DVec2),
}

/// Parse every whitespace-separated number in `text`.
pub fn numbers(keyword: &str, text: &str) -> Result<Vec<f64>, ScriptError> {
    text.split_whitespace()
        .map(|n| n.parse::<f64>().map_err(|_| ScriptError::malformed(keyword)))
        .collect()
}

pub fn vec3(keyword: &str, text: &str) -> Result<DVec3, ScriptError> {
    match numbers(keyword, text)?.as_slice() {
        [x, y, z] => Ok(DVec3::new(*x, *y, *z)),
        _ => Err(ScriptError::malformed(keyword)),
    }
}

pub fn vec2(keyword: &str, text: &str) -> Result<DVec2, ScriptError> {
    match numbers(keyword, text)?.as_slice() {
        [x, y] => Ok(DVec2::new(*x, *y)),
        _ => Err(ScriptError::malformed(keyword)),
    }
}

pub fn point(keyword: &str, text: &str) -> Result<PointArg, ScriptError> {
    match numbers(keyword, text)?.as_slice() {
        [x, y, z] => Ok(PointArg::Spatial(DVec3::new(*x, *y, *z))),
        [x, y] => Ok(PointArg::Planar(DVec2::new(*x, *y))),
        _ => Err(ScriptError::malformed(keyword)),
    }
}

/// Whole numbers as 64-bit so packed colors and masked channels can be
/// parsed before truncation.
pub fn integers(keyword: &str, text: &str) -> Result<Vec<i64>, ScriptError> {
    text.split_whitespace()
        .map(|n| n.parse::<i64>().map_err(|_| ScriptError::malformed(keyword)))
        .collect()
}

pub fn single_int(keyword: &str, text: &str) -> Result<i32, ScriptError> {
    match text.split_whitespace().collect::<Vec<_>>().as_slice() {
        [n] => n.parse::<i32>().map_err(|_| ScriptError::malformed(keyword)),
        _ => Err(ScriptError::malformed(keyword)),
    }
}

/// Require exactly `N` arguments, returned as an array.
pub fn exactly<'a, const N: usize>(
    keyword: &str,
    args: &'a [String],
) -> Result<[&'a str; N], ScriptError> {
    let refs: Vec<&'a str> = args.iter().map(String::as_str).collect();
    <[&'a str; N]>::try_from(refs).map_err(|_| ScriptError::malformed(keyword))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn three_numbers_make_a_spatial_point() {
        assert_eq!(
            point("plane", "1 2.5 -3").unwrap(),
            PointArg::Spatial(DVec3::new(1.0, 2.5, -3.0))
        );
    }

    #[test]
    fn two_numbers_make_a_planar_point() {
        assert_eq!(
            point("plane", "4 5").unwrap(),
            PointArg::Planar(DVec2::new(4.0, 5.0))
        );
    }

    #[test]
    fn wrong_count_or_garbage_is_malformed() {
        let err = ScriptError::malformed("plane");
        assert_eq!(point("plane", "1").unwrap_err(), err);
        assert_eq!(point("plane", "1 2 3 4").unwrap_err(), err);
        assert_eq!(vec3("plane", "1 x 3").unwrap_err(), err);
    }

    #[test]
    fn single_int_rejects_fractions() {
        assert_eq!(single_int("angle", "90").unwrap(), 90);
        assert!(single_int("angle", "90.5").is_err());
        assert!(single_int("angle", "90 10").is_err());
    }

    #[test]
    fn exactly_checks_arity() {
        let args = vec!["a".to_string(), "b".to_string()];
        assert_eq!(exactly::<2>("k", &args).unwrap(), ["a", "b"]);
        assert!(exactly::<3>("k", &args).is_err());
    }
}
