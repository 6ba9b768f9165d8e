//! 2-D geometry primitives.
//!
//! - [`Vector`]: an immutable point / displacement in the plane
//! - [`Transform`]: a 2-D affine map stored as six coefficients

pub mod transform;
pub mod vector;

pub use transform::Transform;
pub use vector::Vector;
