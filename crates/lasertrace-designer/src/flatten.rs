//! # Curve Flattening
//!
//! Converts curves into [`LineSegmentChain`]s whose deviation from the true
//! curve never exceeds the configured tolerance.
//!
//! - Lines are copied as a single segment.
//! - Bezier curves are split at `t = 0.5` (de Casteljau) until the control
//!   points lie within tolerance of the chord, or the depth ceiling is hit.
//! - Arcs are converted to cubic Bezier pieces spanning at most
//!   `max_arc_sweep` degrees each, then flattened like any other cubic.
//!
//! The result only depends on the curve and the flattener settings, so the same
//! input always produces the same chain.

use crate::curve::{Arc, CubicBezier, Curve, Line, LineSegmentChain, Path};
use lasertrace_core::constants::{
    APPROXIMATION_TOLERANCE, MAX_ARC_SWEEP_DEGREES, MAX_SUBDIVISION_DEPTH,
};
use lasertrace_core::{Transform, Vector};
use lyon::geom::{
    point, vector, Angle, ArcFlags, CubicBezierSegment, Point, QuadraticBezierSegment, SvgArc,
};

/// Upper bound on Bezier pieces generated for a single arc
const MAX_ARC_PIECES: usize = 1024;

fn to_point(v: Vector) -> Point<f64> {
    point(v.x, v.y)
}

fn from_point(p: Point<f64>) -> Vector {
    Vector::new(p.x, p.y)
}

/// Tolerance-bounded curve linearizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flattener {
    /// Maximum distance between the curve and its chain
    pub tolerance: f64,
    /// Recursion ceiling for Bezier subdivision
    pub max_depth: u32,
    /// Largest arc sweep covered by one Bezier piece, in degrees
    pub max_arc_sweep: f64,
}

impl Default for Flattener {
    fn default() -> Self {
        Self {
            tolerance: APPROXIMATION_TOLERANCE,
            max_depth: MAX_SUBDIVISION_DEPTH,
            max_arc_sweep: MAX_ARC_SWEEP_DEGREES,
        }
    }
}

impl Flattener {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_arc_sweep(mut self, degrees: f64) -> Self {
        self.max_arc_sweep = degrees;
        self
    }

    /// Flattens every curve of a path, one chain per curve.
    pub fn flatten_path(&self, path: &Path) -> Vec<LineSegmentChain> {
        path.curves.iter().map(|curve| self.flatten(curve)).collect()
    }

    /// Flattens a single curve.
    pub fn flatten(&self, curve: &Curve) -> LineSegmentChain {
        match curve {
            Curve::Line(line) => LineSegmentChain::from_segments(vec![*line]),
            Curve::QuadraticBezier(q) => {
                let mut points = Vec::new();
                self.subdivide_quadratic(
                    QuadraticBezierSegment {
                        from: to_point(q.start),
                        ctrl: to_point(q.control),
                        to: to_point(q.end),
                    },
                    self.tolerance,
                    0,
                    &mut points,
                );
                chain_through(q.start, q.end, &points, q.cut)
            }
            Curve::CubicBezier(c) => {
                let mut points = Vec::new();
                self.subdivide_cubic(cubic_segment(c), self.tolerance, 0, &mut points);
                chain_through(c.start, c.end, &points, c.cut)
            }
            Curve::Arc(arc) => {
                let pieces = self.arc_to_cubics(arc);
                if pieces.is_empty() {
                    return LineSegmentChain::from_segments(vec![Line::new(
                        arc.start, arc.end, arc.cut,
                    )]);
                }
                // Half the budget goes to the arc approximation, half to flattening
                let tolerance = self.tolerance / 2.0;
                let mut points = Vec::new();
                for piece in &pieces {
                    self.subdivide_cubic(cubic_segment(piece), tolerance, 0, &mut points);
                }
                chain_through(arc.start, arc.end, &points, arc.cut)
            }
        }
    }

    /// Converts an arc into cubic Bezier pieces in output space.
    ///
    /// Returns an empty list when the arc degenerates to a straight line
    /// (zero radius or coincident endpoints).
    pub fn arc_to_cubics(&self, arc: &Arc) -> Vec<CubicBezier> {
        let svg_arc = SvgArc {
            from: to_point(arc.local_start),
            to: to_point(arc.local_end),
            radii: vector(arc.radii.x, arc.radii.y),
            x_rotation: Angle::degrees(arc.x_rotation),
            flags: ArcFlags {
                large_arc: arc.large_arc,
                sweep: arc.sweep,
            },
        };
        if svg_arc.is_straight_line() {
            return Vec::new();
        }

        let ellipse = svg_arc.to_arc();
        let center = from_point(ellipse.center);
        let (rx, ry) = (ellipse.radii.x, ellipse.radii.y);
        let (sin_rot, cos_rot) = ellipse.x_rotation.radians.sin_cos();
        let rotate = |x: f64, y: f64| Vector::new(x * cos_rot - y * sin_rot, x * sin_rot + y * cos_rot);

        let start_angle = ellipse.start_angle.radians;
        let sweep = ellipse.sweep_angle.radians;
        let radius = rx.abs().max(ry.abs()) * scale_bound(&arc.transform);
        let count = self.arc_piece_count(sweep, radius);
        let step = sweep / count as f64;
        let k = 4.0 / 3.0 * (step / 4.0).tan();

        let angles: Vec<f64> = (0..=count).map(|i| start_angle + step * i as f64).collect();
        let mut positions: Vec<Vector> = angles
            .iter()
            .map(|theta| {
                let (sin, cos) = theta.sin_cos();
                center + rotate(rx * cos, ry * sin)
            })
            .collect();
        positions[0] = arc.local_start;
        positions[count] = arc.local_end;
        let tangents: Vec<Vector> = angles
            .iter()
            .map(|theta| {
                let (sin, cos) = theta.sin_cos();
                rotate(-rx * sin, ry * cos)
            })
            .collect();

        let t = &arc.transform;
        let mut pieces: Vec<CubicBezier> = (0..count)
            .map(|i| CubicBezier {
                start: t.apply(positions[i]),
                control1: t.apply(positions[i] + tangents[i] * k),
                control2: t.apply(positions[i + 1] - tangents[i + 1] * k),
                end: t.apply(positions[i + 1]),
                cut: arc.cut,
            })
            .collect();

        if let Some(first) = pieces.first_mut() {
            first.start = arc.start;
        }
        if let Some(last) = pieces.last_mut() {
            last.end = arc.end;
        }
        pieces
    }

    /// Number of pieces so that each spans at most `max_arc_sweep` and its
    /// radial error stays within half the tolerance.
    fn arc_piece_count(&self, sweep: f64, radius: f64) -> usize {
        let max_sweep = if self.max_arc_sweep > 0.0 {
            self.max_arc_sweep.to_radians()
        } else {
            MAX_ARC_SWEEP_DEGREES.to_radians()
        };
        let sweep = sweep.abs();
        let mut count = ((sweep / max_sweep).ceil() as usize).clamp(1, MAX_ARC_PIECES);
        while count < MAX_ARC_PIECES
            && arc_approximation_error(radius, sweep / count as f64) > self.tolerance / 2.0
        {
            count += 1;
        }
        count
    }

    fn subdivide_quadratic(
        &self,
        segment: QuadraticBezierSegment<f64>,
        tolerance: f64,
        depth: u32,
        out: &mut Vec<Vector>,
    ) {
        let from = from_point(segment.from);
        let to = from_point(segment.to);
        let flatness = from_point(segment.ctrl).distance_to_segment(&from, &to);
        if flatness <= tolerance || depth >= self.max_depth {
            out.push(to);
            return;
        }
        let (first, second) = segment.split(0.5);
        self.subdivide_quadratic(first, tolerance, depth + 1, out);
        self.subdivide_quadratic(second, tolerance, depth + 1, out);
    }

    fn subdivide_cubic(
        &self,
        segment: CubicBezierSegment<f64>,
        tolerance: f64,
        depth: u32,
        out: &mut Vec<Vector>,
    ) {
        let from = from_point(segment.from);
        let to = from_point(segment.to);
        let flatness = from_point(segment.ctrl1)
            .distance_to_segment(&from, &to)
            .max(from_point(segment.ctrl2).distance_to_segment(&from, &to));
        if flatness <= tolerance || depth >= self.max_depth {
            out.push(to);
            return;
        }
        let (first, second) = segment.split(0.5);
        self.subdivide_cubic(first, tolerance, depth + 1, out);
        self.subdivide_cubic(second, tolerance, depth + 1, out);
    }
}

fn cubic_segment(c: &CubicBezier) -> CubicBezierSegment<f64> {
    CubicBezierSegment {
        from: to_point(c.start),
        ctrl1: to_point(c.control1),
        ctrl2: to_point(c.control2),
        to: to_point(c.end),
    }
}

/// Builds a chain from `start` through `points`, pinning the final point to `end`.
fn chain_through(start: Vector, end: Vector, points: &[Vector], cut: bool) -> LineSegmentChain {
    let mut chain = LineSegmentChain::new();
    let mut previous = start;
    let last = points.len().saturating_sub(1);
    for (i, point) in points.iter().enumerate() {
        let to = if i == last { end } else { *point };
        chain.push(Line::new(previous, to, cut));
        previous = to;
    }
    chain
}

/// Upper bound of the radial error of the standard cubic approximation of a
/// circular arc of the given sweep.
fn arc_approximation_error(radius: f64, sweep: f64) -> f64 {
    let quarter = sweep / 4.0;
    radius * 4.0 / 27.0 * quarter.sin().powi(6) / quarter.cos().powi(2)
}

/// Frobenius norm of the linear part, never smaller than its largest stretch.
fn scale_bound(t: &Transform) -> f64 {
    (t.a * t.a + t.b * t.b + t.c * t.c + t.d * t.d).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::QuadraticBezier;
    use crate::path_parser::parse_path;

    fn v(x: f64, y: f64) -> Vector {
        Vector::new(x, y)
    }

    #[test]
    fn test_line_is_copied() {
        let line = Line::new(v(0.0, 0.0), v(3.0, 4.0), true);
        let chain = Flattener::default().flatten(&line.into());
        assert_eq!(chain.segments(), &[line]);
    }

    #[test]
    fn test_straight_cubic_is_single_segment() {
        let curve: Curve = CubicBezier {
            start: v(0.0, 0.0),
            control1: v(1.0, 0.0),
            control2: v(2.0, 0.0),
            end: v(3.0, 0.0),
            cut: false,
        }
        .into();
        let chain = Flattener::default().flatten(&curve);
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_quadratic_endpoints_and_contiguity() {
        let curve: Curve = QuadraticBezier {
            start: v(0.0, 0.0),
            control: v(5.0, 10.0),
            end: v(10.0, 0.0),
            cut: false,
        }
        .into();
        let chain = Flattener::new(0.01).flatten(&curve);
        assert!(chain.len() > 4);
        assert_eq!(chain.start(), Some(v(0.0, 0.0)));
        assert_eq!(chain.end(), Some(v(10.0, 0.0)));
        assert!(chain.is_contiguous(0.0));
    }

    #[test]
    fn test_degenerate_cubic_terminates() {
        let p = v(2.0, 2.0);
        let curve: Curve = CubicBezier {
            start: p,
            control1: p,
            control2: p,
            end: p,
            cut: false,
        }
        .into();
        let chain = Flattener::default().flatten(&curve);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.segments()[0].length(), 0.0);
    }

    #[test]
    fn test_depth_ceiling_bounds_output() {
        let curve: Curve = CubicBezier {
            start: v(0.0, 0.0),
            control1: v(0.0, 1000.0),
            control2: v(1000.0, 1000.0),
            end: v(1000.0, 0.0),
            cut: false,
        }
        .into();
        let chain = Flattener::new(0.0).with_max_depth(3).flatten(&curve);
        assert_eq!(chain.len(), 8);
    }

    #[test]
    fn test_half_circle_stays_on_radius() {
        let path = parse_path("M0 0 A5 5 0 0 1 10 0", None, false).unwrap();
        let flattener = Flattener::new(0.01);
        let chain = flattener.flatten(&path.curves[0]);
        assert!(chain.is_contiguous(0.0));
        assert_eq!(chain.start(), Some(v(0.0, 0.0)));
        assert_eq!(chain.end(), Some(v(10.0, 0.0)));
        let center = v(5.0, 0.0);
        for segment in &chain {
            let r = segment.end.distance_to(&center);
            assert!((r - 5.0).abs() <= 0.01, "radius {r}");
        }
    }

    #[test]
    fn test_arc_pieces_respect_max_sweep() {
        let path = parse_path("M0 0 A5 5 0 0 1 10 0", None, false).unwrap();
        let Curve::Arc(arc) = path.curves[0] else {
            panic!("expected arc");
        };
        assert_eq!(Flattener::default().arc_to_cubics(&arc).len(), 2);
        let pieces = Flattener::default().with_max_arc_sweep(30.0).arc_to_cubics(&arc);
        assert_eq!(pieces.len(), 6);
        for pair in pieces.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_zero_radius_arc_is_a_line() {
        let path = parse_path("M0 0 A0 0 0 0 1 10 0", None, true).unwrap();
        let chain = Flattener::default().flatten(&path.curves[0]);
        assert_eq!(chain.len(), 1);
        assert!(chain.segments()[0].cut);
    }

    #[test]
    fn test_flattening_is_deterministic() {
        let path = parse_path("M0 0 C3 9 7 -9 10 0 A4 2 30 1 0 20 5", None, false).unwrap();
        let flattener = Flattener::new(0.005);
        assert_eq!(flattener.flatten_path(&path), flattener.flatten_path(&path));
    }
}
