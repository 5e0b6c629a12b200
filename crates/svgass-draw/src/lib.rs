//! # svgass draw
//!
//! Turns scanner events into drawing primitives.
//!
//! ## Pipeline
//!
//! ```text
//! svgass_markup::scan ──▶ Converter ──▶ Emitter
//!                           │
//!                           ├── ContextStack   (origin, transform, paint)
//!                           ├── style / transform attribute interpreters
//!                           └── shapes / path  ──▶ arc flattening
//! ```
//!
//! Everything handed to an [`Emitter`] is already in output space, and only
//! moves, lines and cubic curves are ever produced: quadratic segments are
//! degree-elevated and arcs are flattened into lines.
//!
//! ## Errors
//!
//! Malformed path data, excess closing tags and the like are recovered,
//! logged with `tracing::warn!` and counted in [`ConvertReport`]. Only
//! [`DrawError::ResourceExhausted`] and [`DrawError::Io`] stop a document.

pub mod arc;
pub mod color;
pub mod context;
pub mod convert;
pub mod emit;
pub mod error;
mod number;
pub mod path;
pub mod shapes;
pub mod style;
pub mod transform;

pub use arc::{ArcParams, CenterArc};
pub use color::{color_of, parse_color, Color};
pub use context::{ContextStack, Paint, PaintChannel, RenderContext};
pub use convert::{convert, ConvertReport, Converter};
pub use emit::{Emitter, Primitive, RecordingEmitter, Shape};
pub use error::{DrawError, DrawResult};
pub use path::{interpret_path, LastControl, PathCursor};
pub use shapes::{Outline, Tolerance, BEZIER_CIRCLE};
pub use transform::parse_transform;
