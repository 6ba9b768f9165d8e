//! # Toolpath Compiler
//!
//! Accumulates line chains into a drawing body and a cutting body, then
//! assembles them into a complete program:
//!
//! ```text
//! header           absolute mode, movement speed, custom header, unit, drawing z
//! ; Start drawing  draw body, emitted once
//! ; Start cutting  laser off, cutting z, then the cut body once per pass with a
//!                  laser-off and a relative z step between passes
//! footer           custom footer
//! ```
//!
//! Each body starts without a known tool position, so the first chain of a
//! body (and therefore of every cutting pass) always begins with a laser-off
//! travel move.

use crate::hatch::HatchFiller;
use crate::interface::{Instruction, InstructionEncoder};
use lasertrace_core::constants::OPERATION_TOLERANCE;
use lasertrace_core::{ConfigurationError, Result, Unit, Vector, Warning};
use lasertrace_designer::{Area, Curve, Flattener, LineSegmentChain};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Machine parameters fixed for one compilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineParameters {
    /// Feed rate for laser-off travel
    pub movement_speed: f64,
    pub cutting_speed: f64,
    pub drawing_speed: f64,
    /// Laser power for cutting, in `[0, 1]`
    pub cutting_power: f64,
    /// Laser power for drawing, in `[0, 1]`
    pub drawing_power: f64,
    pub initial_z: f64,
    pub drawing_z: f64,
    pub cutting_z: f64,
    pub cutting_passes: u32,
    /// Z step between cutting passes; the sign is ignored
    pub pass_depth: f64,
    /// Pause before each travel move, in milliseconds
    pub dwell_time: u64,
    /// `mm`, `in` or absent
    pub unit: Option<String>,
    /// Defaults to a single laser-off
    pub custom_header: Option<Vec<Instruction>>,
    /// Defaults to a single laser-off
    pub custom_footer: Option<Vec<Instruction>>,
}

impl Default for MachineParameters {
    fn default() -> Self {
        Self {
            movement_speed: 1000.0,
            cutting_speed: 500.0,
            drawing_speed: 900.0,
            cutting_power: 1.0,
            drawing_power: 0.45,
            initial_z: 0.0,
            drawing_z: 7.0,
            cutting_z: 5.0,
            cutting_passes: 1,
            pass_depth: 0.0,
            dwell_time: 0,
            unit: None,
            custom_header: None,
            custom_footer: None,
        }
    }
}

impl MachineParameters {
    /// Checks the parameters without building a compiler.
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        for (name, value) in [
            ("movement_speed", self.movement_speed),
            ("cutting_speed", self.cutting_speed),
            ("drawing_speed", self.drawing_speed),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigurationError::InvalidValue {
                    name: name.to_string(),
                    reason: format!("speed must be positive, got {value}"),
                });
            }
        }

        for (name, value) in [
            ("cutting_power", self.cutting_power),
            ("drawing_power", self.drawing_power),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigurationError::PowerOutOfRange {
                    name: name.to_string(),
                    value,
                });
            }
        }

        for (name, value) in [
            ("initial_z", self.initial_z),
            ("drawing_z", self.drawing_z),
            ("cutting_z", self.cutting_z),
            ("pass_depth", self.pass_depth),
        ] {
            if !value.is_finite() {
                return Err(ConfigurationError::InvalidValue {
                    name: name.to_string(),
                    reason: format!("must be a finite number, got {value}"),
                });
            }
        }

        if self.cutting_passes == 0 {
            return Err(ConfigurationError::InvalidValue {
                name: "cutting_passes".to_string(),
                reason: "at least one pass is required".to_string(),
            });
        }

        let pass_depth = self.pass_depth.abs();
        if f64::from(self.cutting_passes) * pass_depth > self.cutting_z {
            return Err(ConfigurationError::TooManyPasses {
                passes: self.cutting_passes,
                pass_depth,
                cutting_z: self.cutting_z,
            });
        }

        Unit::parse_setting(self.unit.as_deref())?;
        Ok(())
    }
}

/// Absolute or relative coordinate interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateMode {
    #[default]
    Absolute,
    Relative,
}

/// Tool state as implied by the instructions emitted so far
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MachineState {
    /// Unset until the first planar move
    pub position: Option<Vector>,
    pub feed: Option<f64>,
    /// `None` while the laser is off
    pub power: Option<f64>,
    pub mode: CoordinateMode,
    pub z: Option<f64>,
}

impl MachineState {
    /// Advances the state past one instruction.
    pub fn apply(&mut self, instruction: &Instruction) {
        match instruction {
            Instruction::SetAbsolute => self.mode = CoordinateMode::Absolute,
            Instruction::SetRelative => self.mode = CoordinateMode::Relative,
            Instruction::SetMovementSpeed(speed) => self.feed = Some(*speed),
            Instruction::SetLaserPower(power) => self.power = Some(*power),
            Instruction::LaserOff => self.power = None,
            Instruction::LinearMove { x, y, z } => {
                let relative = self.mode == CoordinateMode::Relative;
                let resolve = |current: Option<f64>, value: f64| match (relative, current) {
                    (true, Some(current)) => current + value,
                    _ => value,
                };
                if x.is_some() || y.is_some() {
                    let current = self.position;
                    let new_x = x.map_or(current.map_or(0.0, |p| p.x), |x| {
                        resolve(current.map(|p| p.x), x)
                    });
                    let new_y = y.map_or(current.map_or(0.0, |p| p.y), |y| {
                        resolve(current.map(|p| p.y), y)
                    });
                    self.position = Some(Vector::new(new_x, new_y));
                }
                if let Some(z) = z {
                    self.z = Some(resolve(self.z, *z));
                }
            }
            Instruction::SetUnit(_) | Instruction::Dwell(_) | Instruction::Comment(_) => {}
        }
    }

    /// Whether the tool is already at `point`.
    pub fn is_at(&self, point: &Vector) -> bool {
        self.position
            .is_some_and(|p| p.distance_to(point) <= OPERATION_TOLERANCE)
    }
}

/// Feed and power used while the laser is working on a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassProfile {
    pub speed: f64,
    pub power: f64,
}

/// Travel settings shared by both bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelProfile {
    pub speed: f64,
    pub dwell_time: u64,
}

/// Instructions of one body together with the state they leave behind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    instructions: Vec<Instruction>,
    state: MachineState,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    fn push(&mut self, instruction: Instruction) {
        self.state.apply(&instruction);
        self.instructions.push(instruction);
    }

    /// Returns this body extended with `chain`.
    ///
    /// A travel sequence is inserted unless the tool already sits on the
    /// chain's start point.
    pub fn with_chain(
        mut self,
        chain: &LineSegmentChain,
        profile: PassProfile,
        travel: TravelProfile,
    ) -> Body {
        let Some(start) = chain.start() else {
            return self;
        };

        if !self.state.is_at(&start) {
            if travel.dwell_time > 0 {
                self.push(Instruction::Dwell(travel.dwell_time));
            }
            self.push(Instruction::LaserOff);
            self.push(Instruction::SetMovementSpeed(travel.speed));
            self.push(Instruction::move_to(start.x, start.y));
            self.push(Instruction::SetMovementSpeed(profile.speed));
            self.push(Instruction::SetLaserPower(profile.power));
        }

        for segment in chain {
            self.push(Instruction::move_to(segment.end.x, segment.end.y));
        }
        self
    }
}

/// An assembled program
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    /// Machine state after the last instruction
    pub state: MachineState,
}

impl Program {
    fn push(&mut self, instruction: Instruction) {
        self.state.apply(&instruction);
        self.instructions.push(instruction);
    }

    fn extend(&mut self, instructions: &[Instruction]) {
        for instruction in instructions {
            self.push(instruction.clone());
        }
    }

    /// Encodes the program, one non-empty line per instruction.
    pub fn encode(&self, encoder: &mut dyn InstructionEncoder) -> String {
        self.instructions
            .iter()
            .map(|instruction| encoder.encode(instruction))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Compiles line chains into a machine program
#[derive(Debug, Clone)]
pub struct ToolpathCompiler {
    params: MachineParameters,
    unit: Option<Unit>,
    pass_depth: f64,
    header: Vec<Instruction>,
    footer: Vec<Instruction>,
    draw: Body,
    cut: Body,
    warnings: Vec<Warning>,
}

impl ToolpathCompiler {
    /// Validates `params` and creates an empty compiler.
    pub fn new(params: MachineParameters) -> std::result::Result<Self, ConfigurationError> {
        params.validate()?;
        let unit = Unit::parse_setting(params.unit.as_deref())?;

        let header = params
            .custom_header
            .clone()
            .unwrap_or_else(|| vec![Instruction::LaserOff]);
        let footer = params
            .custom_footer
            .clone()
            .unwrap_or_else(|| vec![Instruction::LaserOff]);

        Ok(Self {
            pass_depth: params.pass_depth.abs(),
            params,
            unit,
            header,
            footer,
            draw: Body::new(),
            cut: Body::new(),
            warnings: Vec::new(),
        })
    }

    pub fn params(&self) -> &MachineParameters {
        &self.params
    }

    /// Warnings raised so far
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn draw_body(&self) -> &Body {
        &self.draw
    }

    pub fn cut_body(&self) -> &Body {
        &self.cut
    }

    fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn travel(&self) -> TravelProfile {
        TravelProfile {
            speed: self.params.movement_speed,
            dwell_time: self.params.dwell_time,
        }
    }

    /// Appends one chain to the cutting or drawing body.
    pub fn append_line_chain(&mut self, chain: &LineSegmentChain, cut: bool) {
        if chain.is_empty() {
            self.warn(Warning::EmptyLineChain);
            return;
        }

        let travel = self.travel();
        if cut {
            let profile = PassProfile {
                speed: self.params.cutting_speed,
                power: self.params.cutting_power,
            };
            self.cut = std::mem::take(&mut self.cut).with_chain(chain, profile, travel);
        } else {
            let profile = PassProfile {
                speed: self.params.drawing_speed,
                power: self.params.drawing_power,
            };
            self.draw = std::mem::take(&mut self.draw).with_chain(chain, profile, travel);
        }
    }

    /// Flattens and appends curves, each to the body matching its tag.
    pub fn append_curves(&mut self, curves: &[Curve], flattener: &Flattener) {
        info!("Transforming {} curves to line segments", curves.len());
        for curve in curves {
            let chain = flattener.flatten(curve);
            self.append_line_chain(&chain, curve.cut());
        }
    }

    /// Hatches filled areas and appends the hatch lines as cutting chains.
    ///
    /// A failing area is skipped with a warning; the others still get hatched.
    pub fn append_areas(&mut self, areas: &[Area], filler: &HatchFiller, flattener: &Flattener) {
        info!("Hatching {} filled areas", areas.len());
        for (index, area) in areas.iter().enumerate() {
            if area.path.is_empty() {
                self.warn(Warning::EmptyOutline { area: index });
                continue;
            }
            match filler.hatch(area, flattener) {
                Ok(chains) => {
                    debug!(area = index, lines = chains.len(), "Hatched area");
                    for chain in &chains {
                        self.append_line_chain(chain, true);
                    }
                }
                Err(e) => self.warn(Warning::SkippedArea {
                    area: index,
                    reason: e.to_string(),
                }),
            }
        }
    }

    /// Assembles header, bodies, passes and footer.
    pub fn compile(&mut self) -> Program {
        if self.draw.is_empty() && self.cut.is_empty() {
            self.warn(Warning::EmptyBody);
        }

        let mut program = Program::default();
        program.push(Instruction::SetAbsolute);
        program.push(Instruction::SetMovementSpeed(self.params.movement_speed));
        program.extend(&self.header);
        if let Some(unit) = self.unit {
            program.push(Instruction::SetUnit(unit));
        }
        program.push(Instruction::move_z(
            self.params.drawing_z - self.params.initial_z,
        ));

        if !self.draw.is_empty() {
            program.push(Instruction::comment("Start drawing"));
            program.extend(self.draw.instructions());
        }

        if !self.cut.is_empty() {
            program.push(Instruction::comment("Start cutting"));
            program.push(Instruction::LaserOff);
            program.push(Instruction::move_z(self.params.cutting_z));

            let passes = self.params.cutting_passes;
            for pass in 1..=passes {
                program.push(Instruction::comment(format!("Pass {pass}/{passes}")));
                program.extend(self.cut.instructions());

                if pass < passes {
                    program.push(Instruction::LaserOff);
                    if self.pass_depth > 0.0 {
                        program.push(Instruction::SetRelative);
                        program.push(Instruction::move_z(-self.pass_depth));
                        program.push(Instruction::SetAbsolute);
                    }
                }
            }
        }

        program.extend(&self.footer);
        info!(
            instructions = program.instructions.len(),
            "Assembled program"
        );
        program
    }

    /// Compiles and encodes the program.
    pub fn compile_to_string(&mut self, encoder: &mut dyn InstructionEncoder) -> String {
        self.compile().encode(encoder)
    }

    /// Compiles, encodes and writes the program in one write.
    pub fn compile_to_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        encoder: &mut dyn InstructionEncoder,
    ) -> Result<()> {
        let path = path.as_ref();
        let text = self.compile_to_string(encoder);
        std::fs::write(path, text)?;
        info!("Wrote program to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lasertrace_designer::Line;

    fn chain(points: &[(f64, f64)]) -> LineSegmentChain {
        LineSegmentChain::from_segments(
            points
                .windows(2)
                .map(|w| Line::new(w[0].into(), w[1].into(), false))
                .collect(),
        )
    }

    const DRAW: PassProfile = PassProfile {
        speed: 900.0,
        power: 0.45,
    };
    const TRAVEL: TravelProfile = TravelProfile {
        speed: 1000.0,
        dwell_time: 0,
    };

    #[test]
    fn test_body_step_inserts_travel_for_first_chain() {
        let body = Body::new().with_chain(&chain(&[(1.0, 1.0), (2.0, 1.0)]), DRAW, TRAVEL);
        assert_eq!(
            body.instructions(),
            &[
                Instruction::LaserOff,
                Instruction::SetMovementSpeed(1000.0),
                Instruction::move_to(1.0, 1.0),
                Instruction::SetMovementSpeed(900.0),
                Instruction::SetLaserPower(0.45),
                Instruction::move_to(2.0, 1.0),
            ]
        );
        assert_eq!(body.state().position, Some(Vector::new(2.0, 1.0)));
        assert_eq!(body.state().power, Some(0.45));
    }

    #[test]
    fn test_body_step_dwells_before_travel() {
        let travel = TravelProfile {
            speed: 1000.0,
            dwell_time: 40,
        };
        let body = Body::new().with_chain(&chain(&[(0.0, 0.0), (1.0, 0.0)]), DRAW, travel);
        assert_eq!(body.instructions()[0], Instruction::Dwell(40));
    }

    #[test]
    fn test_machine_state_relative_moves() {
        let mut state = MachineState::default();
        state.apply(&Instruction::move_z(5.0));
        state.apply(&Instruction::SetRelative);
        state.apply(&Instruction::move_z(-2.0));
        assert_eq!(state.z, Some(3.0));
        assert_eq!(state.mode, CoordinateMode::Relative);
    }

    #[test]
    fn test_validation() {
        let params = MachineParameters {
            cutting_passes: 3,
            pass_depth: 2.0,
            cutting_z: 5.0,
            ..Default::default()
        };
        assert!(matches!(
            ToolpathCompiler::new(params),
            Err(ConfigurationError::TooManyPasses { passes: 3, .. })
        ));

        let params = MachineParameters {
            cutting_passes: 2,
            pass_depth: -2.0,
            cutting_z: 5.0,
            ..Default::default()
        };
        assert!(ToolpathCompiler::new(params).is_ok());

        let params = MachineParameters {
            drawing_power: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            ToolpathCompiler::new(params),
            Err(ConfigurationError::PowerOutOfRange { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_non_finite_heights() {
        let params = MachineParameters {
            cutting_passes: 3,
            pass_depth: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            ToolpathCompiler::new(params),
            Err(ConfigurationError::InvalidValue { ref name, .. }) if name == "pass_depth"
        ));

        for params in [
            MachineParameters {
                cutting_z: f64::INFINITY,
                ..Default::default()
            },
            MachineParameters {
                drawing_z: f64::NEG_INFINITY,
                ..Default::default()
            },
            MachineParameters {
                initial_z: f64::NAN,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                ToolpathCompiler::new(params),
                Err(ConfigurationError::InvalidValue { .. })
            ));
        }
    }

    #[test]
    fn test_laser_is_off_before_moving_to_cutting_z() {
        let mut compiler = ToolpathCompiler::new(MachineParameters::default()).unwrap();
        compiler.append_line_chain(&chain(&[(0.0, 0.0), (1.0, 0.0)]), false);
        compiler.append_line_chain(&chain(&[(1.0, 0.0), (2.0, 0.0)]), true);
        let program = compiler.compile();

        let mut state = MachineState::default();
        for instruction in &program.instructions {
            if let Instruction::LinearMove { z: Some(_), .. } = instruction {
                assert_eq!(state.power, None, "z move with the laser on");
            }
            state.apply(instruction);
        }
    }
}
