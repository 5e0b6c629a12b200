//! # svgass geometry
//!
//! Plain 2D value types used by every stage of the converter.
//!
//! ## Types
//!
//! - [`Vector`]: an `(x, y)` pair of `f64`, combined with `+`, `-` and `*`
//! - [`Transform2D`]: a 2×3 affine matrix, composed in document order
//!
//! Nothing in here allocates or checks for degenerate input: a zero-scale
//! matrix is a valid value that simply collapses geometry.

mod transform;
mod vector;

pub use transform::Transform2D;
pub use vector::Vector;

/// Compare two floats within an absolute tolerance.
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}
