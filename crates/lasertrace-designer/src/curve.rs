//! # Curve Model
//!
//! Exact parametric curves produced by the path interpreter. Every endpoint and
//! control point is stored in output space: transforms are resolved when the
//! curve is constructed, never deferred.
//!
//! Arcs are the one exception that also keep their untransformed endpoints and
//! the transform itself, because an elliptical arc under a skew cannot be
//! described by a new set of arc parameters.

use lasertrace_core::{Transform, Vector};

/// Straight segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Vector,
    pub end: Vector,
    pub cut: bool,
}

impl Line {
    pub fn new(start: Vector, end: Vector, cut: bool) -> Self {
        Self { start, end, cut }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }
}

/// Quadratic Bezier curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticBezier {
    pub start: Vector,
    pub control: Vector,
    pub end: Vector,
    pub cut: bool,
}

/// Cubic Bezier curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub start: Vector,
    pub control1: Vector,
    pub control2: Vector,
    pub end: Vector,
    pub cut: bool,
}

/// Elliptical arc
///
/// `start`/`end` are in output space. `local_start`, `local_end`, `radii` and
/// `x_rotation` describe the arc before `transform` is applied; the flattener
/// samples in that local frame and maps the result through `transform`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub start: Vector,
    pub end: Vector,
    pub local_start: Vector,
    pub local_end: Vector,
    pub radii: Vector,
    /// Rotation of the ellipse x-axis, in degrees
    pub x_rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
    pub transform: Transform,
    pub cut: bool,
}

/// Closed set of curve variants
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Line(Line),
    QuadraticBezier(QuadraticBezier),
    CubicBezier(CubicBezier),
    Arc(Arc),
}

impl Curve {
    pub fn start(&self) -> Vector {
        match self {
            Curve::Line(c) => c.start,
            Curve::QuadraticBezier(c) => c.start,
            Curve::CubicBezier(c) => c.start,
            Curve::Arc(c) => c.start,
        }
    }

    pub fn end(&self) -> Vector {
        match self {
            Curve::Line(c) => c.end,
            Curve::QuadraticBezier(c) => c.end,
            Curve::CubicBezier(c) => c.end,
            Curve::Arc(c) => c.end,
        }
    }

    /// `true` for a full-power cutting pass, `false` for a drawing pass
    pub fn cut(&self) -> bool {
        match self {
            Curve::Line(c) => c.cut,
            Curve::QuadraticBezier(c) => c.cut,
            Curve::CubicBezier(c) => c.cut,
            Curve::Arc(c) => c.cut,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Curve::Line(_) => "line",
            Curve::QuadraticBezier(_) => "quadratic",
            Curve::CubicBezier(_) => "cubic",
            Curve::Arc(_) => "arc",
        }
    }
}

impl From<Line> for Curve {
    fn from(line: Line) -> Self {
        Curve::Line(line)
    }
}

impl From<QuadraticBezier> for Curve {
    fn from(curve: QuadraticBezier) -> Self {
        Curve::QuadraticBezier(curve)
    }
}

impl From<CubicBezier> for Curve {
    fn from(curve: CubicBezier) -> Self {
        Curve::CubicBezier(curve)
    }
}

impl From<Arc> for Curve {
    fn from(arc: Arc) -> Self {
        Curve::Arc(arc)
    }
}

/// Curves produced from one path description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub curves: Vec<Curve>,
    /// Ends with a close command, or its last point meets its first
    pub closed: bool,
}

impl Path {
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn start(&self) -> Option<Vector> {
        self.curves.first().map(Curve::start)
    }

    pub fn end(&self) -> Option<Vector> {
        self.curves.last().map(Curve::end)
    }
}

/// Ordered run of straight segments approximating one curve
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineSegmentChain {
    segments: Vec<Line>,
}

impl LineSegmentChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<Line>) -> Self {
        Self { segments }
    }

    pub fn push(&mut self, segment: Line) {
        self.segments.push(segment);
    }

    pub fn extend(&mut self, other: LineSegmentChain) {
        self.segments.extend(other.segments);
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Line> {
        self.segments.iter()
    }

    pub fn segments(&self) -> &[Line] {
        &self.segments
    }

    pub fn start(&self) -> Option<Vector> {
        self.segments.first().map(|s| s.start)
    }

    pub fn end(&self) -> Option<Vector> {
        self.segments.last().map(|s| s.end)
    }

    /// Checks that each segment starts where the previous one ended.
    pub fn is_contiguous(&self, tolerance: f64) -> bool {
        self.segments
            .windows(2)
            .all(|pair| pair[0].end.approx_eq(&pair[1].start, tolerance))
    }
}

impl<'a> IntoIterator for &'a LineSegmentChain {
    type Item = &'a Line;
    type IntoIter = std::slice::Iter<'a, Line>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Closed, filled outline used for hatching
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub path: Path,
    /// Fill colour as written in the document
    pub color: String,
}
