//! Integration tests for path interpretation and flattening together

use lasertrace_core::{ParseError, Transform, Vector};
use lasertrace_designer::{parse_path, Curve, Flattener, PathInterpreter};

#[test]
fn test_square_path_is_closed_with_four_lines() {
    let path = parse_path("M10 10 H20 V20 H10 Z", None, false).unwrap();
    assert_eq!(path.len(), 4);
    assert!(path.closed);
    assert!(path.curves.iter().all(|c| matches!(c, Curve::Line(_))));
    assert_eq!(path.end(), Some(Vector::new(10.0, 10.0)));
}

#[test]
fn test_multiple_subpaths() {
    let path = parse_path("M0 0 L5 0 Z M10 10 l5 0 z", None, false).unwrap();
    assert_eq!(path.len(), 4);
    assert_eq!(path.curves[2].start(), Vector::new(10.0, 10.0));
    assert_eq!(path.curves[3].end(), Vector::new(10.0, 10.0));
    assert!(path.closed);
}

#[test]
fn test_relative_move_after_close_starts_from_subpath_start() {
    let path = parse_path("M5 5 l10 0 z m1 1 l1 0", None, false).unwrap();
    assert_eq!(path.curves[2].start(), Vector::new(6.0, 6.0));
}

#[test]
fn test_repeated_curve_operands() {
    let path = parse_path("M0 0 q5 5 10 0 5 -5 10 0", None, false).unwrap();
    assert_eq!(path.len(), 2);
    assert_eq!(path.curves[1].start(), Vector::new(10.0, 0.0));
    assert_eq!(path.curves[1].end(), Vector::new(20.0, 0.0));
}

#[test]
fn test_interpreter_tags_every_curve() {
    let interpreter = PathInterpreter::new(Transform::rotation(90.0), true);
    let path = interpreter.interpret("M1 0 C1 1 2 1 2 0 A1 1 0 0 1 4 0").unwrap();
    assert!(path.curves.iter().all(Curve::cut));
    assert!(path.curves[0].start().approx_eq(&Vector::new(0.0, 1.0), 1e-9));
}

#[test]
fn test_error_reports_position() {
    let err = parse_path("M0 0 L1 1 ? 2", None, false).unwrap_err();
    assert_eq!(
        err,
        ParseError::UnknownCommand {
            token: "?".to_string(),
            position: 10
        }
    );
}

#[test]
fn test_flattened_path_chains_connect() {
    let path = parse_path(
        "M0 0 C10 20 30 20 40 0 S70 -20 80 0 Q90 10 100 0 T120 0 A10 10 0 0 0 140 0 Z",
        None,
        false,
    )
    .unwrap();
    let chains = Flattener::new(0.01).flatten_path(&path);
    assert_eq!(chains.len(), path.len());
    for pair in chains.windows(2) {
        assert_eq!(pair[0].end(), pair[1].start());
    }
    for (chain, curve) in chains.iter().zip(&path.curves) {
        assert!(chain.is_contiguous(0.0));
        assert_eq!(chain.start(), Some(curve.start()));
        assert_eq!(chain.end(), Some(curve.end()));
    }
}
