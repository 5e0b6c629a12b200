//! 2D affine transform.

use crate::Vector;
use serde::{Deserialize, Serialize};

/// 2D affine transform matrix.
///
/// ```text
/// [a c e]      x' = a·x + c·y + e
/// [b d f]      y' = b·x + d·y + f
/// [0 0 1]
/// ```
///
/// The builder methods (`translate`, `scale`, ...) right-compose: the new
/// operation is applied to local points *before* everything already in
/// `self`, which is how nested transform lists accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Transform2D {
    /// Create identity transform.
    pub const fn identity() -> Self {
        Self {
            a: 1.0, b: 0.0,
            c: 0.0, d: 1.0,
            e: 0.0, f: 0.0,
        }
    }

    /// Build a matrix from the six `matrix(a,b,c,d,e,f)` coefficients.
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Compose a translation.
    pub fn translate(self, tx: f64, ty: f64) -> Self {
        self.multiply(&Transform2D {
            a: 1.0, b: 0.0,
            c: 0.0, d: 1.0,
            e: tx, f: ty,
        })
    }

    /// Compose a scale.
    pub fn scale(self, sx: f64, sy: f64) -> Self {
        self.multiply(&Transform2D {
            a: sx, b: 0.0,
            c: 0.0, d: sy,
            e: 0.0, f: 0.0,
        })
    }

    /// Compose a rotation (radians).
    pub fn rotate(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        self.multiply(&Transform2D {
            a: cos, b: sin,
            c: -sin, d: cos,
            e: 0.0, f: 0.0,
        })
    }

    /// Compose a rotation (radians) around `(cx, cy)`.
    pub fn rotate_around(self, angle: f64, cx: f64, cy: f64) -> Self {
        self.translate(cx, cy).rotate(angle).translate(-cx, -cy)
    }

    /// Compose a skew along the x axis (radians).
    pub fn skew_x(self, angle: f64) -> Self {
        self.multiply(&Transform2D {
            a: 1.0, b: 0.0,
            c: angle.tan(), d: 1.0,
            e: 0.0, f: 0.0,
        })
    }

    /// Compose a skew along the y axis (radians).
    pub fn skew_y(self, angle: f64) -> Self {
        self.multiply(&Transform2D {
            a: 1.0, b: angle.tan(),
            c: 0.0, d: 1.0,
            e: 0.0, f: 0.0,
        })
    }

    /// Matrix product `self · other`.
    pub fn multiply(&self, other: &Transform2D) -> Self {
        Transform2D {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// Transform a point.
    #[inline]
    pub fn apply(&self, v: Vector) -> Vector {
        Vector::new(
            self.a * v.x + self.c * v.y + self.e,
            self.b * v.x + self.d * v.y + self.f,
        )
    }

    /// Determinant of the linear part.
    #[inline]
    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Coefficient-wise comparison within `epsilon`.
    pub fn approx_eq(&self, other: &Transform2D, epsilon: f64) -> bool {
        [
            (self.a, other.a),
            (self.b, other.b),
            (self.c, other.c),
            (self.d, other.d),
            (self.e, other.e),
            (self.f, other.f),
        ]
        .iter()
        .all(|&(l, r)| crate::approx_eq(l, r, epsilon))
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}
