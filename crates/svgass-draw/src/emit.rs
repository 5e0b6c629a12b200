//! Emission boundary.
//!
//! Points handed to an [`Emitter`] are already in output space: origin
//! added, cumulative transform applied, output scale applied.

use crate::context::Paint;
use crate::error::DrawResult;
use serde::{Deserialize, Serialize};
use svgass_geom::Vector;

/// One drawing primitive in output space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Primitive {
    MoveTo { to: Vector },
    LineTo { to: Vector },
    CubicTo { c1: Vector, c2: Vector, to: Vector },
}

impl Primitive {
    /// End point of the primitive.
    pub fn end(&self) -> Vector {
        match *self {
            Primitive::MoveTo { to } | Primitive::LineTo { to } | Primitive::CubicTo { to, .. } => to,
        }
    }
}

/// Receiver of converted geometry.
///
/// `begin_shape`/`end_shape` always bracket at least one primitive, and
/// every shape's first primitive is a move.
pub trait Emitter {
    fn begin_document(&mut self) -> DrawResult<()> {
        Ok(())
    }

    fn begin_shape(&mut self, paint: &Paint) -> DrawResult<()>;

    fn move_to(&mut self, to: Vector) -> DrawResult<()>;

    fn line_to(&mut self, to: Vector) -> DrawResult<()>;

    fn cubic_to(&mut self, c1: Vector, c2: Vector, to: Vector) -> DrawResult<()>;

    fn end_shape(&mut self) -> DrawResult<()> {
        Ok(())
    }

    fn end_document(&mut self) -> DrawResult<()> {
        Ok(())
    }

    /// Replay one recorded primitive.
    fn primitive(&mut self, primitive: &Primitive) -> DrawResult<()> {
        match *primitive {
            Primitive::MoveTo { to } => self.move_to(to),
            Primitive::LineTo { to } => self.line_to(to),
            Primitive::CubicTo { c1, c2, to } => self.cubic_to(c1, c2, to),
        }
    }
}

/// A painted outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub paint: Paint,
    pub primitives: Vec<Primitive>,
}

/// Emitter that keeps everything in memory.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    pub shapes: Vec<Shape>,
    pub documents: usize,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every primitive of every shape, in emission order.
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.shapes.iter().flat_map(|shape| shape.primitives.iter())
    }

    fn open_shape(&mut self) -> &mut Shape {
        if self.shapes.is_empty() {
            self.shapes.push(Shape {
                paint: Paint::default(),
                primitives: Vec::new(),
            });
        }
        let last = self.shapes.len() - 1;
        &mut self.shapes[last]
    }
}

impl Emitter for RecordingEmitter {
    fn begin_document(&mut self) -> DrawResult<()> {
        self.documents += 1;
        Ok(())
    }

    fn begin_shape(&mut self, paint: &Paint) -> DrawResult<()> {
        self.shapes.push(Shape {
            paint: *paint,
            primitives: Vec::new(),
        });
        Ok(())
    }

    fn move_to(&mut self, to: Vector) -> DrawResult<()> {
        self.open_shape().primitives.push(Primitive::MoveTo { to });
        Ok(())
    }

    fn line_to(&mut self, to: Vector) -> DrawResult<()> {
        self.open_shape().primitives.push(Primitive::LineTo { to });
        Ok(())
    }

    fn cubic_to(&mut self, c1: Vector, c2: Vector, to: Vector) -> DrawResult<()> {
        self.open_shape()
            .primitives
            .push(Primitive::CubicTo { c1, c2, to });
        Ok(())
    }
}
