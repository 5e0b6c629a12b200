//! Basic shape geometry.
//!
//! Every shape is described in local units and written into an
//! [`Outline`], which maps each point into output space as it arrives.

use crate::context::RenderContext;
use crate::emit::Primitive;
use crate::error::{DrawError, DrawResult};
use crate::number::number_list;
use svgass_common::ConvertConfig;
use svgass_geom::{Transform2D, Vector};

/// Cubic Bézier control distance for a quarter circle of radius 1.
pub const BEZIER_CIRCLE: f64 = 0.551915024494;

/// Numerical thresholds for degenerate geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub epsilon: f64,
    pub arc_step: f64,
    pub max_arc_segments: usize,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::from(&ConvertConfig::default())
    }
}

impl From<&ConvertConfig> for Tolerance {
    fn from(config: &ConvertConfig) -> Self {
        Self {
            epsilon: config.epsilon,
            arc_step: config.arc_step,
            max_arc_segments: config.max_arc_segments,
        }
    }
}

/// Output-space primitives of one element.
#[derive(Debug, Clone)]
pub struct Outline {
    origin: Vector,
    transform: Transform2D,
    scale: f64,
    primitives: Vec<Primitive>,
}

impl Outline {
    pub fn new(origin: Vector, transform: Transform2D, scale: f64) -> Self {
        Self {
            origin,
            transform,
            scale,
            primitives: Vec::new(),
        }
    }

    pub fn for_context(ctx: &RenderContext, scale: f64) -> Self {
        Self::new(ctx.origin, ctx.transform, scale)
    }

    fn map(&self, local: Vector) -> Vector {
        self.transform.apply(local + self.origin) * self.scale
    }

    fn push(&mut self, primitive: Primitive) -> DrawResult<()> {
        self.primitives
            .try_reserve(1)
            .map_err(|_| DrawError::ResourceExhausted { what: "outline" })?;
        self.primitives.push(primitive);
        Ok(())
    }

    pub fn move_to(&mut self, to: Vector) -> DrawResult<()> {
        let to = self.map(to);
        self.push(Primitive::MoveTo { to })
    }

    pub fn line_to(&mut self, to: Vector) -> DrawResult<()> {
        let to = self.map(to);
        self.push(Primitive::LineTo { to })
    }

    pub fn cubic_to(&mut self, c1: Vector, c2: Vector, to: Vector) -> DrawResult<()> {
        let (c1, c2, to) = (self.map(c1), self.map(c2), self.map(to));
        self.push(Primitive::CubicTo { c1, c2, to })
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn into_primitives(self) -> Vec<Primitive> {
        self.primitives
    }
}

/// `<line>`: a two-point mark.
pub fn line(out: &mut Outline, from: Vector, to: Vector) -> DrawResult<()> {
    out.move_to(from)?;
    out.line_to(to)
}

/// `<rect>` with optional corner radii.
///
/// A missing radius takes the value of the other one; negative radii count
/// as missing. Radii are clamped to half the matching side.
pub fn rect(
    out: &mut Outline,
    origin: Vector,
    size: Vector,
    rx: Option<f64>,
    ry: Option<f64>,
    tol: &Tolerance,
) -> DrawResult<()> {
    let (w, h) = (size.x, size.y);
    if w < 0.0 || h < 0.0 || !w.is_finite() || !h.is_finite() {
        return Ok(());
    }

    if w < tol.epsilon || h < tol.epsilon {
        // too small to have an interior
        return line(out, origin, origin + size);
    }

    let rx = rx.filter(|r| *r >= 0.0);
    let ry = ry.filter(|r| *r >= 0.0);
    let (rx, ry) = match (rx, ry) {
        (Some(rx), Some(ry)) => (rx, ry),
        (Some(r), None) | (None, Some(r)) => (r, r),
        (None, None) => (0.0, 0.0),
    };
    let radii = Vector::new(rx.min(w / 2.0), ry.min(h / 2.0));

    if radii.x < tol.epsilon || radii.y < tol.epsilon {
        out.move_to(origin)?;
        out.line_to(Vector::new(origin.x + w, origin.y))?;
        out.line_to(origin + size)?;
        return out.line_to(Vector::new(origin.x, origin.y + h));
    }

    rounded_rect(out, origin, size, radii, tol)
}

/// `<ellipse>`/`<circle>`: a maximally rounded rectangle.
pub fn ellipse(out: &mut Outline, center: Vector, radii: Vector, tol: &Tolerance) -> DrawResult<()> {
    if !(radii.x > 0.0 && radii.y > 0.0) {
        return Ok(());
    }
    rounded_rect(out, center - radii, radii * 2.0, radii, tol)
}

/// Rounded rectangle as four quarter-ellipse cubics joined by edges.
///
/// Starts just after the top-left corner and runs clockwise (in y-down
/// space). Edges shorter than `tol.epsilon` are left out, so radii of half
/// the extent yield exactly the four curves of an ellipse.
pub fn rounded_rect(
    out: &mut Outline,
    origin: Vector,
    size: Vector,
    radii: Vector,
    tol: &Tolerance,
) -> DrawResult<()> {
    const UP: Vector = Vector::new(0.0, -1.0);
    const RIGHT: Vector = Vector::new(1.0, 0.0);
    const DOWN: Vector = Vector::new(0.0, 1.0);
    const LEFT: Vector = Vector::new(-1.0, 0.0);

    let (x, y, w, h) = (origin.x, origin.y, size.x, size.y);
    let (rx, ry) = (radii.x, radii.y);
    // corner center, direction at arc start, direction at arc end
    let corners = [
        (Vector::new(x + w - rx, y + ry), UP, RIGHT),
        (Vector::new(x + w - rx, y + h - ry), RIGHT, DOWN),
        (Vector::new(x + rx, y + h - ry), DOWN, LEFT),
        (Vector::new(x + rx, y + ry), LEFT, UP),
    ];
    let on_ellipse = |center: Vector, dir: Vector| Vector::new(center.x + dir.x * rx, center.y + dir.y * ry);
    let handle = |dir: Vector| Vector::new(dir.x * rx * BEZIER_CIRCLE, dir.y * ry * BEZIER_CIRCLE);

    let mut current = Vector::new(x + rx, y);
    out.move_to(current)?;
    for (center, from, to) in corners {
        let start = on_ellipse(center, from);
        let end = on_ellipse(center, to);
        if current.distance(start) >= tol.epsilon {
            out.line_to(start)?;
        }
        out.cubic_to(start + handle(to), end + handle(from), end)?;
        current = end;
    }
    Ok(())
}

/// Rewrite a `points` list as path data: `M x,y L x,y ...`, plus ` Z` for
/// polygons. An odd trailing coordinate is dropped; an empty list gives an
/// empty string.
pub fn points_to_path(points: &str, close: bool) -> String {
    let coords = number_list(points);
    let mut d = String::with_capacity(coords.len() * 8);
    for (i, pair) in coords.chunks_exact(2).enumerate() {
        let command = match i {
            0 => "M",
            1 => " L",
            _ => "",
        };
        d.push_str(&format!("{} {},{}", command, pair[0], pair[1]));
    }
    if close && !d.is_empty() {
        d.push_str(" Z");
    }
    d
}
