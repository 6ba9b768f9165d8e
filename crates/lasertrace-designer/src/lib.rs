//! # LaserTrace Designer
//!
//! Turns SVG documents into exact parametric curves and flattens those curves
//! into tolerance-bounded line chains.
//!
//! ## Pipeline
//!
//! ```text
//! document (SVG tree walk, visibility + transform inheritance)
//!   └── path_parser (path data -> Path of Curves, transforms resolved)
//!         └── flatten (Curve -> LineSegmentChain)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lasertrace_designer::{parse_path, Flattener};
//!
//! let path = parse_path("M0,0 Q5,10 10,0", None, false)?;
//! let flattener = Flattener::default();
//! for curve in &path.curves {
//!     let chain = flattener.flatten(curve);
//! }
//! ```

pub mod curve;
pub mod document;
pub mod flatten;
mod lexer;
pub mod path_parser;
pub mod style;
pub mod transform_parser;

pub use curve::{Arc, Area, CubicBezier, Curve, Line, LineSegmentChain, Path, QuadraticBezier};
pub use document::{parse_file, parse_string, DocumentOptions, ParsedDocument, RenderContext};
pub use flatten::Flattener;
pub use path_parser::{parse_path, PathInterpreter};
pub use style::Color;
pub use transform_parser::parse_transform;
