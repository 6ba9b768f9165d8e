use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A point or displacement in the plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    /// The origin
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Vector) -> f64 {
        (*other - *self).length()
    }

    pub fn dot(&self, other: &Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3-D cross product
    pub fn cross(&self, other: &Vector) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Linear interpolation; `t = 0` yields `self`, `t = 1` yields `other`
    pub fn lerp(&self, other: &Vector, t: f64) -> Vector {
        Vector::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Component-wise comparison within `tolerance`
    pub fn approx_eq(&self, other: &Vector, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }

    /// Shortest distance from this point to the segment `a`-`b`
    pub fn distance_to_segment(&self, a: &Vector, b: &Vector) -> f64 {
        let ab = *b - *a;
        let len_sq = ab.dot(&ab);
        if len_sq == 0.0 {
            return self.distance_to(a);
        }
        let t = ((*self - *a).dot(&ab) / len_sq).clamp(0.0, 1.0);
        self.distance_to(&a.lerp(b, t))
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        Vector::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Vector {
    fn from((x, y): (f64, f64)) -> Self {
        Vector::new(x, y)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtraction_magnitude() {
        let a = Vector::new(0.0, 0.0);
        let b = Vector::new(3.0, 4.0);
        assert_eq!((b - a).length(), 5.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn test_approx_eq() {
        let a = Vector::new(1.0, 1.0);
        assert!(a.approx_eq(&Vector::new(1.0005, 0.9995), 1e-3));
        assert!(!a.approx_eq(&Vector::new(1.01, 1.0), 1e-3));
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Vector::new(0.0, 0.0);
        let b = Vector::new(10.0, 0.0);
        assert_eq!(Vector::new(5.0, 2.0).distance_to_segment(&a, &b), 2.0);
        // Beyond the end the distance is measured to the endpoint
        assert_eq!(Vector::new(13.0, 4.0).distance_to_segment(&a, &b), 5.0);
        // Degenerate segment
        assert_eq!(Vector::new(3.0, 4.0).distance_to_segment(&a, &a), 5.0);
    }
}
