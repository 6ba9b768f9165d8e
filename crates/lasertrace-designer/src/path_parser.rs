//! # Path Interpreter
//!
//! Parses SVG path data (`d` attribute) into a [`Path`] of exact curves.
//!
//! Supported commands: `M m L l H h V v C c S s Q q T t A a Z z`, with the
//! usual shorthand:
//! - implicit repetition of operand groups (`L 1 2 3 4` draws two lines,
//!   extra pairs after a move are line-tos)
//! - compact numbers (`10-5`, `.5.5`, `1e-3`)
//! - compact arc flags (`a1 1 0 00 1 1`)
//!
//! The cursor starts at the origin. Points are interpreted in the element's
//! local space and mapped through the supplied transform before storage.

use crate::curve::{Arc, CubicBezier, Curve, Line, Path, QuadraticBezier};
use crate::lexer::Lexer;
use lasertrace_core::constants::INPUT_TOLERANCE;
use lasertrace_core::{ParseError, Transform, Vector};
use tracing::debug;

/// Curve family used to decide whether a smooth command can mirror the
/// previous control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Quadratic,
    Cubic,
}

/// Interpreter for one element's path data
#[derive(Debug, Clone, Copy)]
pub struct PathInterpreter {
    /// Effective transform of the element
    pub transform: Transform,
    /// Tag applied to every emitted curve
    pub cut: bool,
}

impl Default for PathInterpreter {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            cut: false,
        }
    }
}

/// Parses `data` with an optional transform, tagging curves with `cut`.
pub fn parse_path(
    data: &str,
    transform: Option<&Transform>,
    cut: bool,
) -> Result<Path, ParseError> {
    PathInterpreter::new(transform.copied().unwrap_or_default(), cut).interpret(data)
}

impl PathInterpreter {
    pub fn new(transform: Transform, cut: bool) -> Self {
        Self { transform, cut }
    }

    /// Interprets a full path description.
    pub fn interpret(&self, data: &str) -> Result<Path, ParseError> {
        let mut lexer = Lexer::new(data);
        let mut state = CursorState::default();
        let mut curves = Vec::new();
        let mut ends_with_close = false;

        loop {
            lexer.skip_separators();
            let Some(byte) = lexer.peek() else {
                break;
            };
            let position = lexer.pos;

            if byte.is_ascii_alphabetic() {
                lexer.pos += 1;
                let command = byte as char;
                if !is_command(command) {
                    return Err(ParseError::UnknownCommand {
                        token: command.to_string(),
                        position,
                    });
                }

                if command.eq_ignore_ascii_case(&'z') {
                    curves.push(self.close(&mut state));
                    ends_with_close = true;
                    continue;
                }
                ends_with_close = false;

                self.segment(command, &mut lexer, &mut state, &mut curves)?;
                let repeated = match command {
                    'M' => 'L',
                    'm' => 'l',
                    other => other,
                };
                while lexer.at_number() {
                    self.segment(repeated, &mut lexer, &mut state, &mut curves)?;
                }
            } else if lexer.at_number() {
                return Err(ParseError::MissingCommand {
                    token: lexer.token_at(position).to_string(),
                    position,
                });
            } else {
                return Err(ParseError::UnknownCommand {
                    token: lexer.token_at(position).to_string(),
                    position,
                });
            }
        }

        let closed = ends_with_close
            || match (curves.first(), curves.last()) {
                (Some(first), Some(last)) => {
                    last.end().approx_eq(&first.start(), INPUT_TOLERANCE)
                }
                _ => false,
            };

        debug!(curves = curves.len(), closed, "Interpreted path data");
        Ok(Path { curves, closed })
    }

    /// Consumes one operand group for `command` and emits its curve, if any.
    fn segment(
        &self,
        command: char,
        lexer: &mut Lexer<'_>,
        state: &mut CursorState,
        curves: &mut Vec<Curve>,
    ) -> Result<(), ParseError> {
        let relative = command.is_ascii_lowercase();
        let origin = if relative { state.cursor } else { Vector::ZERO };

        match command.to_ascii_uppercase() {
            'M' => {
                let to = origin + lexer.point(command)?;
                state.cursor = to;
                state.subpath_start = to;
                state.last_control = None;
            }
            'L' => {
                let to = origin + lexer.point(command)?;
                curves.push(self.line(state.cursor, to));
                state.advance(to, None);
            }
            'H' => {
                let x = lexer.number(command)?;
                let to = Vector::new(if relative { state.cursor.x + x } else { x }, state.cursor.y);
                curves.push(self.line(state.cursor, to));
                state.advance(to, None);
            }
            'V' => {
                let y = lexer.number(command)?;
                let to = Vector::new(state.cursor.x, if relative { state.cursor.y + y } else { y });
                curves.push(self.line(state.cursor, to));
                state.advance(to, None);
            }
            'C' => {
                let control1 = origin + lexer.point(command)?;
                let control2 = origin + lexer.point(command)?;
                let to = origin + lexer.point(command)?;
                curves.push(self.cubic(state.cursor, control1, control2, to));
                state.advance(to, Some((Family::Cubic, control2)));
            }
            'S' => {
                let control1 = state.reflected_control(Family::Cubic);
                let control2 = origin + lexer.point(command)?;
                let to = origin + lexer.point(command)?;
                curves.push(self.cubic(state.cursor, control1, control2, to));
                state.advance(to, Some((Family::Cubic, control2)));
            }
            'Q' => {
                let control = origin + lexer.point(command)?;
                let to = origin + lexer.point(command)?;
                curves.push(self.quadratic(state.cursor, control, to));
                state.advance(to, Some((Family::Quadratic, control)));
            }
            'T' => {
                let control = state.reflected_control(Family::Quadratic);
                let to = origin + lexer.point(command)?;
                curves.push(self.quadratic(state.cursor, control, to));
                state.advance(to, Some((Family::Quadratic, control)));
            }
            'A' => {
                let rx = lexer.number(command)?;
                let ry = lexer.number(command)?;
                let x_rotation = lexer.number(command)?;
                let large_arc = lexer.flag(command)?;
                let sweep = lexer.flag(command)?;
                let to = origin + lexer.point(command)?;
                curves.push(self.arc(
                    state.cursor,
                    to,
                    Vector::new(rx.abs(), ry.abs()),
                    x_rotation,
                    large_arc,
                    sweep,
                ));
                state.advance(to, None);
            }
            _ => {
                return Err(ParseError::UnknownCommand {
                    token: command.to_string(),
                    position: lexer.pos.saturating_sub(1),
                })
            }
        }
        Ok(())
    }

    fn close(&self, state: &mut CursorState) -> Curve {
        let line = self.line(state.cursor, state.subpath_start);
        state.advance(state.subpath_start, None);
        line
    }

    fn line(&self, from: Vector, to: Vector) -> Curve {
        Line::new(self.transform.apply(from), self.transform.apply(to), self.cut).into()
    }

    fn quadratic(&self, from: Vector, control: Vector, to: Vector) -> Curve {
        QuadraticBezier {
            start: self.transform.apply(from),
            control: self.transform.apply(control),
            end: self.transform.apply(to),
            cut: self.cut,
        }
        .into()
    }

    fn cubic(&self, from: Vector, control1: Vector, control2: Vector, to: Vector) -> Curve {
        CubicBezier {
            start: self.transform.apply(from),
            control1: self.transform.apply(control1),
            control2: self.transform.apply(control2),
            end: self.transform.apply(to),
            cut: self.cut,
        }
        .into()
    }

    fn arc(
        &self,
        from: Vector,
        to: Vector,
        radii: Vector,
        x_rotation: f64,
        large_arc: bool,
        sweep: bool,
    ) -> Curve {
        Arc {
            start: self.transform.apply(from),
            end: self.transform.apply(to),
            local_start: from,
            local_end: to,
            radii,
            x_rotation,
            large_arc,
            sweep,
            transform: self.transform,
            cut: self.cut,
        }
        .into()
    }
}

/// Local-space cursor bookkeeping
#[derive(Debug, Default)]
struct CursorState {
    cursor: Vector,
    subpath_start: Vector,
    last_control: Option<(Family, Vector)>,
}

impl CursorState {
    fn advance(&mut self, to: Vector, control: Option<(Family, Vector)>) {
        self.cursor = to;
        self.last_control = control;
    }

    /// Mirror of the previous control point through the cursor when the
    /// previous curve belongs to `family`, the cursor itself otherwise.
    fn reflected_control(&self, family: Family) -> Vector {
        match self.last_control {
            Some((previous, control)) if previous == family => self.cursor * 2.0 - control,
            _ => self.cursor,
        }
    }
}

fn is_command(c: char) -> bool {
    matches!(
        c.to_ascii_uppercase(),
        'M' | 'L' | 'H' | 'V' | 'C' | 'S' | 'Q' | 'T' | 'A' | 'Z'
    )
}
