//! Rendering context and its cascade.

use crate::color::Color;
use crate::error::{DrawError, DrawResult};
use serde::{Deserialize, Serialize};
use svgass_geom::{Transform2D, Vector};

/// One paint channel (fill or stroke).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaintChannel {
    /// `None` means the channel is painted with `none`.
    pub color: Option<Color>,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

impl PaintChannel {
    pub const fn solid(color: Color) -> Self {
        Self {
            color: Some(color),
            opacity: 1.0,
        }
    }

    pub const fn none() -> Self {
        Self {
            color: None,
            opacity: 1.0,
        }
    }

    /// Color to emit; black when the channel is `none`.
    pub fn color_or_black(&self) -> Color {
        self.color.unwrap_or(Color::BLACK)
    }

    /// Transparency on the inverted 0 (opaque) ..= 255 (invisible) scale.
    pub fn alpha(&self) -> u8 {
        if self.color.is_none() {
            return 255;
        }
        let opacity = if self.opacity.is_nan() {
            1.0
        } else {
            self.opacity.clamp(0.0, 1.0)
        };
        (255.0 - opacity * 255.0).round() as u8
    }
}

/// Fill and stroke state of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    pub fill: PaintChannel,
    pub stroke: PaintChannel,
    pub stroke_width: f64,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            fill: PaintChannel::solid(Color::BLACK),
            stroke: PaintChannel::none(),
            stroke_width: 1.0,
        }
    }
}

/// Inherited state of the innermost open element.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    pub origin: Vector,
    pub transform: Transform2D,
    pub paint: Paint,
    /// Cleared inside subtrees that never render (`defs`, `display="none"`, ...).
    pub rendered: bool,
}

impl RenderContext {
    pub fn new(origin: Vector) -> Self {
        Self {
            origin,
            transform: Transform2D::identity(),
            paint: Paint::default(),
            rendered: true,
        }
    }

    /// Map a local point into output space.
    pub fn map(&self, local: Vector, scale: f64) -> Vector {
        self.transform.apply(local + self.origin) * scale
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(Vector::ZERO)
    }
}

/// Stack of saved contexts with the live one kept on top.
///
/// Growth is geometric and unbounded; an allocation failure surfaces as
/// [`DrawError::ResourceExhausted`] instead of aborting.
#[derive(Debug)]
pub struct ContextStack {
    current: RenderContext,
    saved: Vec<RenderContext>,
}

impl ContextStack {
    pub fn new(root: RenderContext) -> Self {
        Self {
            current: root,
            saved: Vec::new(),
        }
    }

    pub fn current(&self) -> &RenderContext {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut RenderContext {
        &mut self.current
    }

    /// Number of saved contexts.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Save a copy of the current context; the child starts from it.
    pub fn push(&mut self) -> DrawResult<()> {
        self.saved
            .try_reserve(1)
            .map_err(|_| DrawError::ResourceExhausted {
                what: "context stack",
            })?;
        self.saved.push(self.current.clone());
        Ok(())
    }

    /// Restore the most recently saved context.
    ///
    /// An empty stack leaves the current context untouched and reports
    /// [`DrawError::ContextUnderflow`].
    pub fn pop(&mut self) -> DrawResult<RenderContext> {
        let restored = self.saved.pop().ok_or(DrawError::ContextUnderflow)?;
        Ok(std::mem::replace(&mut self.current, restored))
    }

    /// Restore the context saved at `depth`, discarding everything pushed
    /// after it. Returns how many contexts were discarded.
    pub fn unwind_to(&mut self, depth: usize) -> usize {
        if depth >= self.saved.len() {
            return 0;
        }
        let discarded = self.saved.len() - depth;
        self.saved.truncate(depth + 1);
        if let Some(restored) = self.saved.pop() {
            self.current = restored;
        }
        discarded
    }
}
