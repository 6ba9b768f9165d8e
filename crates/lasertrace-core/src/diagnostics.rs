//! Non-fatal conditions reported to the caller.
//!
//! Every skipped element, empty chain or empty program is recorded as a
//! [`Warning`] so that nothing is dropped silently.

use std::fmt;

/// A non-fatal condition encountered while converting a document
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A line chain without segments was appended to the compiler
    EmptyLineChain,
    /// The program was compiled without any draw or cut instructions
    EmptyBody,
    /// A filled area produced no outline to hatch
    EmptyOutline {
        /// Index of the area in the order it was appended.
        area: usize,
    },
    /// A document element was skipped because it could not be interpreted
    SkippedElement {
        /// Element identifier (its `id` attribute or tag name).
        element: String,
        /// Why it was skipped.
        reason: String,
    },
    /// A filled area was skipped during hatch generation
    SkippedArea {
        /// Index of the area in the order it was appended.
        area: usize,
        /// Why it was skipped.
        reason: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::EmptyLineChain => write!(f, "Attempted to append an empty line chain"),
            Warning::EmptyBody => {
                write!(f, "Compiled with an empty body (no curves). Is this intentional?")
            }
            Warning::EmptyOutline { area } => write!(f, "Area {area} has an empty outline"),
            Warning::SkippedElement { element, reason } => {
                write!(f, "Skipped element '{element}': {reason}")
            }
            Warning::SkippedArea { area, reason } => write!(f, "Skipped area {area}: {reason}"),
        }
    }
}
