//! Tolerance constants shared across the pipeline.

/// Maximum deviation between a curve and its line approximation
pub const APPROXIMATION_TOLERANCE: f64 = 1e-2;

/// Distance under which two input points are considered the same point
pub const INPUT_TOLERANCE: f64 = 1e-3;

/// Distance under which the tool is considered to already be at a position
pub const OPERATION_TOLERANCE: f64 = 1e-6;

/// Default recursion ceiling for curve subdivision
pub const MAX_SUBDIVISION_DEPTH: u32 = 16;

/// Default largest arc sweep converted into a single Bezier segment, in degrees
pub const MAX_ARC_SWEEP_DEGREES: f64 = 90.0;
