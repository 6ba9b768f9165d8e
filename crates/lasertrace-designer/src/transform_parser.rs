//! Transform attribute parsing
//!
//! Parses the SVG `transform` grammar: a whitespace or comma separated list of
//! `matrix`, `translate`, `scale`, `rotate`, `skewX` and `skewY` functions.
//! Arguments use the same compact number syntax as path data.
//! Functions are applied right to left, so `translate(10) scale(2)` scales
//! first and translates second.

use crate::lexer::Lexer;
use lasertrace_core::{ParseError, Transform, Vector};
use regex::Regex;
use std::sync::OnceLock;

fn function_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([A-Za-z]+)\s*\(([^)]*)\)").expect("invalid transform function regex")
    })
}

/// Parses a transform attribute into a single composed transform.
pub fn parse_transform(value: &str) -> Result<Transform, ParseError> {
    let mut running = Transform::identity();
    let mut last_end = 0;

    for caps in function_regex().captures_iter(value) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        check_gap(value, last_end, whole.start())?;
        last_end = whole.end();

        let name = caps.get(1).map_or("", |m| m.as_str());
        let args_match = caps.get(2);
        let args_position = args_match.map_or(whole.start(), |m| m.start());
        let args = parse_arguments(args_match.map_or("", |m| m.as_str()), args_position)?;

        let function = build_function(name, &args).map_err(|reason| ParseError::InvalidTransform {
            token: whole.as_str().to_string(),
            position: whole.start(),
            reason,
        })?;
        running = function.then(&running);
    }

    check_gap(value, last_end, value.len())?;
    Ok(running)
}

/// Only separators may appear between two transform functions.
fn check_gap(value: &str, from: usize, to: usize) -> Result<(), ParseError> {
    let gap = &value[from..to];
    match gap.find(|c: char| !c.is_whitespace() && c != ',') {
        Some(offset) => Err(ParseError::InvalidTransform {
            token: gap.trim().to_string(),
            position: from + offset,
            reason: "expected a transform function".to_string(),
        }),
        None => Ok(()),
    }
}

fn parse_arguments(args: &str, position: usize) -> Result<Vec<f64>, ParseError> {
    Lexer::with_offset(args, position).numbers()
}

fn build_function(name: &str, args: &[f64]) -> Result<Transform, String> {
    match (name, args) {
        ("matrix", [a, b, c, d, e, f]) => Ok(Transform::new(*a, *b, *c, *d, *e, *f)),
        ("translate", [tx]) => Ok(Transform::translation(*tx, 0.0)),
        ("translate", [tx, ty]) => Ok(Transform::translation(*tx, *ty)),
        ("scale", [s]) => Ok(Transform::scale(*s, *s)),
        ("scale", [sx, sy]) => Ok(Transform::scale(*sx, *sy)),
        ("rotate", [angle]) => Ok(Transform::rotation(*angle)),
        ("rotate", [angle, cx, cy]) => Ok(Transform::rotation_about(*angle, Vector::new(*cx, *cy))),
        ("skewX", [angle]) => Ok(Transform::skew_x(*angle)),
        ("skewY", [angle]) => Ok(Transform::skew_y(*angle)),
        ("matrix" | "translate" | "scale" | "rotate" | "skewX" | "skewY", _) => Err(format!(
            "{name} does not accept {} argument(s)",
            args.len()
        )),
        _ => Err(format!("unknown transform function '{name}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn apply(t: &Transform, x: f64, y: f64) -> Vector {
        t.apply(Vector::new(x, y))
    }

    #[test]
    fn test_rotate_90() {
        let t = parse_transform("rotate(90)").unwrap();
        assert!(apply(&t, 1.0, 0.0).approx_eq(&Vector::new(0.0, 1.0), EPS));
    }

    #[test]
    fn test_rotate_about_center() {
        let t = parse_transform("rotate(180 5 5)").unwrap();
        assert!(apply(&t, 0.0, 0.0).approx_eq(&Vector::new(10.0, 10.0), EPS));
    }

    #[test]
    fn test_list_applies_rightmost_first() {
        let t = parse_transform("translate(10, 0) scale(2)").unwrap();
        assert!(apply(&t, 1.0, 1.0).approx_eq(&Vector::new(12.0, 2.0), EPS));

        let t = parse_transform("scale(2),translate(10 0)").unwrap();
        assert!(apply(&t, 1.0, 1.0).approx_eq(&Vector::new(22.0, 2.0), EPS));
    }

    #[test]
    fn test_matrix_and_defaults() {
        let t = parse_transform("matrix(1 0 0 1 3 4)").unwrap();
        assert_eq!(t, Transform::translation(3.0, 4.0));
        let t = parse_transform("translate(7)").unwrap();
        assert_eq!(t, Transform::translation(7.0, 0.0));
        assert!(parse_transform("").unwrap().is_identity());
    }

    #[test]
    fn test_rejects_unknown_function() {
        let err = parse_transform("shear(3)").unwrap_err();
        assert!(matches!(err, ParseError::InvalidTransform { position: 0, .. }));
    }

    #[test]
    fn test_rejects_wrong_arity() {
        let err = parse_transform("matrix(1 2 3)").unwrap_err();
        assert!(matches!(err, ParseError::InvalidTransform { .. }));
    }

    #[test]
    fn test_rejects_garbage_between_functions() {
        let err = parse_transform("scale(2) oops translate(1)").unwrap_err();
        assert!(matches!(err, ParseError::InvalidTransform { position: 9, .. }));
    }

    #[test]
    fn test_rejects_bad_number() {
        let err = parse_transform("scale(abc)").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { .. }));
    }

    #[test]
    fn test_compact_arguments() {
        let t = parse_transform("translate(10-5)").unwrap();
        assert_eq!(t, Transform::translation(10.0, -5.0));
        let t = parse_transform("scale(.5.5)").unwrap();
        assert_eq!(t, Transform::scale(0.5, 0.5));
        let t = parse_transform("matrix(1,0,0,1,-3-4)").unwrap();
        assert_eq!(t, Transform::translation(-3.0, -4.0));
    }

    #[test]
    fn test_bad_number_position_is_absolute() {
        let err = parse_transform("scale(2) translate(1 x)").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                token: "x".to_string(),
                position: 21
            }
        );
    }
}
