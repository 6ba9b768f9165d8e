//! # LaserTrace CAM Tools
//!
//! Turns flattened line chains into a laser cutter program.
//!
//! - **Toolpath Compiler**: tracks machine state, separates drawing and
//!   cutting bodies, repeats the cutting body per pass with z stepping
//! - **Instruction Interface**: abstract machine instructions and the G-code
//!   encoder
//! - **Hatch Filler**: density-modulated hatching of filled outlines

pub mod compiler;
pub mod hatch;
pub mod interface;

pub use compiler::{
    Body, CoordinateMode, MachineParameters, MachineState, PassProfile, Program, ToolpathCompiler,
    TravelProfile,
};
pub use hatch::{HatchFiller, HatchOrientation};
pub use interface::{GcodeEncoder, Instruction, InstructionEncoder};
