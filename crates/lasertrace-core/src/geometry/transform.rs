//! Affine transforms
//!
//! Coefficients follow the SVG `matrix(a, b, c, d, e, f)` layout:
//!
//! ```text
//! | a c e |   | x |
//! | b d f | * | y |
//! | 0 0 1 |   | 1 |
//! ```
//!
//! Composition is expressed in application order: `first.then(&second)` maps a
//! point through `first` and then through `second`, i.e. the matrix product
//! `second * first`.

use super::Vector;
use serde::{Deserialize, Serialize};

/// A 2-D affine map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Creates a transform from explicit matrix coefficients.
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation about the origin, counter-clockwise in a y-up frame.
    pub fn rotation(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Rotation about `center`: translate(center) ∘ rotate ∘ translate(-center).
    pub fn rotation_about(degrees: f64, center: Vector) -> Self {
        Self::translation(-center.x, -center.y)
            .then(&Self::rotation(degrees))
            .then(&Self::translation(center.x, center.y))
    }

    pub fn skew_x(degrees: f64) -> Self {
        Self::new(1.0, 0.0, degrees.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    pub fn skew_y(degrees: f64) -> Self {
        Self::new(1.0, degrees.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    /// Returns the transform that applies `self` first and `next` second.
    pub fn then(&self, next: &Transform) -> Transform {
        Transform::new(
            next.a * self.a + next.c * self.b,
            next.b * self.a + next.d * self.b,
            next.a * self.c + next.c * self.d,
            next.b * self.c + next.d * self.d,
            next.a * self.e + next.c * self.f + next.e,
            next.b * self.e + next.d * self.f + next.f,
        )
    }

    /// Maps a point through the transform.
    pub fn apply(&self, point: Vector) -> Vector {
        Vector::new(
            self.a * point.x + self.c * point.y + self.e,
            self.b * point.x + self.d * point.y + self.f,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}
