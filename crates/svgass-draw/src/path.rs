//! Path data interpreter.
//!
//! One left-to-right pass over the `d` attribute. Every command letter
//! takes a fixed argument tuple and repeats for as long as further tuples
//! follow. Quadratic segments are raised to cubics and arcs are flattened
//! into lines, so only moves, lines and cubics come out.

use crate::arc::ArcParams;
use crate::error::{DrawError, DrawResult};
use crate::number::Lexer;
use crate::shapes::{Outline, Tolerance};
use svgass_geom::Vector;
use tracing::trace;

/// Control point left behind by the previous segment.
///
/// Only the matching curve family may reflect it; any other command resets
/// it to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LastControl {
    #[default]
    None,
    /// Second control point of a cubic segment.
    Cubic(Vector),
    /// Control point of a quadratic segment.
    Quad(Vector),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Move,
    Line,
    Horizontal,
    Vertical,
    Cubic,
    SmoothCubic,
    Quad,
    SmoothQuad,
    Arc,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Command {
    verb: Verb,
    relative: bool,
}

impl Command {
    fn from_letter(letter: u8) -> Option<Self> {
        let verb = match letter.to_ascii_uppercase() {
            b'M' => Verb::Move,
            b'L' => Verb::Line,
            b'H' => Verb::Horizontal,
            b'V' => Verb::Vertical,
            b'C' => Verb::Cubic,
            b'S' => Verb::SmoothCubic,
            b'Q' => Verb::Quad,
            b'T' => Verb::SmoothQuad,
            b'A' => Verb::Arc,
            b'Z' => Verb::Close,
            _ => return None,
        };
        Some(Self {
            verb,
            relative: letter.is_ascii_lowercase(),
        })
    }
}

/// Arguments of one command tuple, as written.
#[derive(Debug, Clone, Copy)]
enum Args {
    Point(Vector),
    Coord(f64),
    Cubic(Vector, Vector, Vector),
    Smooth(Vector, Vector),
    Arc {
        radii: Vector,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: Vector,
    },
}

fn point(lexer: &mut Lexer<'_>) -> Option<Vector> {
    Some(Vector::new(lexer.number()?, lexer.number()?))
}

fn read_args(lexer: &mut Lexer<'_>, verb: Verb) -> Option<Args> {
    let args = match verb {
        Verb::Move | Verb::Line | Verb::SmoothQuad => Args::Point(point(lexer)?),
        Verb::Horizontal | Verb::Vertical => Args::Coord(lexer.number()?),
        Verb::Cubic => Args::Cubic(point(lexer)?, point(lexer)?, point(lexer)?),
        Verb::SmoothCubic | Verb::Quad => Args::Smooth(point(lexer)?, point(lexer)?),
        Verb::Arc => Args::Arc {
            radii: point(lexer)?,
            rotation: lexer.number()?,
            large_arc: lexer.flag()?,
            sweep: lexer.flag()?,
            to: point(lexer)?,
        },
        Verb::Close => return None,
    };
    Some(args)
}

/// Pen state while interpreting one path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathCursor {
    pub current: Vector,
    pub subpath_start: Vector,
    pub last_control: LastControl,
    /// A move to `current` is owed before the next drawn segment.
    needs_move: bool,
}

impl Default for PathCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl PathCursor {
    pub fn new() -> Self {
        Self {
            current: Vector::ZERO,
            subpath_start: Vector::ZERO,
            last_control: LastControl::None,
            needs_move: true,
        }
    }

    fn resolve(&self, v: Vector, relative: bool) -> Vector {
        if relative {
            self.current + v
        } else {
            v
        }
    }

    fn pen_down(&mut self, out: &mut Outline) -> DrawResult<()> {
        if self.needs_move {
            out.move_to(self.current)?;
            self.needs_move = false;
        }
        Ok(())
    }

    fn line(&mut self, out: &mut Outline, to: Vector) -> DrawResult<()> {
        self.pen_down(out)?;
        out.line_to(to)?;
        self.current = to;
        self.last_control = LastControl::None;
        Ok(())
    }

    fn cubic(&mut self, out: &mut Outline, c1: Vector, c2: Vector, to: Vector) -> DrawResult<()> {
        self.pen_down(out)?;
        out.cubic_to(c1, c2, to)?;
        self.current = to;
        self.last_control = LastControl::Cubic(c2);
        Ok(())
    }

    fn quad(&mut self, out: &mut Outline, q: Vector, to: Vector) -> DrawResult<()> {
        let from = self.current;
        let c1 = from + (q - from) * (2.0 / 3.0);
        let c2 = to + (q - to) * (2.0 / 3.0);
        self.pen_down(out)?;
        out.cubic_to(c1, c2, to)?;
        self.current = to;
        self.last_control = LastControl::Quad(q);
        Ok(())
    }

    /// Close the subpath. Nothing is drawn; output shapes close themselves.
    fn close(&mut self) {
        self.current = self.subpath_start;
        self.last_control = LastControl::None;
        self.needs_move = true;
    }

    fn execute(
        &mut self,
        command: Command,
        args: Args,
        out: &mut Outline,
        tol: &Tolerance,
    ) -> DrawResult<()> {
        let rel = command.relative;
        match (command.verb, args) {
            (Verb::Move, Args::Point(p)) => {
                self.current = self.resolve(p, rel);
                self.subpath_start = self.current;
                self.last_control = LastControl::None;
                self.needs_move = true;
            }
            (Verb::Line, Args::Point(p)) => {
                let to = self.resolve(p, rel);
                self.line(out, to)?;
            }
            (Verb::Horizontal, Args::Coord(x)) => {
                let x = if rel { self.current.x + x } else { x };
                self.line(out, Vector::new(x, self.current.y))?;
            }
            (Verb::Vertical, Args::Coord(y)) => {
                let y = if rel { self.current.y + y } else { y };
                self.line(out, Vector::new(self.current.x, y))?;
            }
            (Verb::Cubic, Args::Cubic(c1, c2, p)) => {
                let (c1, c2, to) = (self.resolve(c1, rel), self.resolve(c2, rel), self.resolve(p, rel));
                self.cubic(out, c1, c2, to)?;
            }
            (Verb::SmoothCubic, Args::Smooth(c2, p)) => {
                let c1 = match self.last_control {
                    LastControl::Cubic(c) => c.reflect_through(self.current),
                    _ => self.current,
                };
                let (c2, to) = (self.resolve(c2, rel), self.resolve(p, rel));
                self.cubic(out, c1, c2, to)?;
            }
            (Verb::Quad, Args::Smooth(q, p)) => {
                let (q, to) = (self.resolve(q, rel), self.resolve(p, rel));
                self.quad(out, q, to)?;
            }
            (Verb::SmoothQuad, Args::Point(p)) => {
                let q = match self.last_control {
                    LastControl::Quad(q) => q.reflect_through(self.current),
                    _ => self.current,
                };
                let to = self.resolve(p, rel);
                self.quad(out, q, to)?;
            }
            (
                Verb::Arc,
                Args::Arc {
                    radii,
                    rotation,
                    large_arc,
                    sweep,
                    to,
                },
            ) => {
                let to = self.resolve(to, rel);
                self.arc(out, radii, rotation, large_arc, sweep, to, tol)?;
            }
            // read_args pairs every verb with its own tuple shape
            _ => {}
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn arc(
        &mut self,
        out: &mut Outline,
        radii: Vector,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: Vector,
        tol: &Tolerance,
    ) -> DrawResult<()> {
        let from = self.current;
        if from == to {
            trace!("arc: coincident endpoints dropped");
            self.last_control = LastControl::None;
            return Ok(());
        }
        if radii.x.abs() < tol.epsilon || radii.y.abs() < tol.epsilon || from.distance(to) < tol.epsilon {
            return self.line(out, to);
        }

        let params = ArcParams::from_path_values(from, radii, rotation, large_arc, sweep, to);
        self.pen_down(out)?;
        for p in params.flatten(tol.arc_step, tol.max_arc_segments) {
            out.line_to(p)?;
        }
        self.current = to;
        self.last_control = LastControl::None;
        Ok(())
    }
}

/// Interpret path data into `out`.
///
/// On a syntax error the segments before the offending command stay in
/// `out` and [`DrawError::PathSyntax`] reports where parsing stopped.
pub fn interpret_path(data: &str, out: &mut Outline, tol: &Tolerance) -> DrawResult<PathCursor> {
    let mut lexer = Lexer::new(data);
    let mut cursor = PathCursor::new();

    while let Some(letter) = lexer.peek() {
        let offset = lexer.offset();
        let Some(mut command) = Command::from_letter(letter) else {
            return Err(DrawError::path_syntax(data, offset));
        };
        lexer.bump();

        if command.verb == Verb::Close {
            cursor.close();
            continue;
        }

        let mut first = true;
        while first || lexer.at_number() {
            let at = lexer.offset();
            let args = read_args(&mut lexer, command.verb)
                .ok_or_else(|| DrawError::path_syntax(data, if first { offset } else { at }))?;
            cursor.execute(command, args, out, tol)?;
            if command.verb == Verb::Move {
                // further pairs after a move are lines
                command.verb = Verb::Line;
            }
            first = false;
        }
    }

    Ok(cursor)
}
