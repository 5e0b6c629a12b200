//! Elliptical arc conversion.
//!
//! Converts the endpoint parameterization used by path data into center
//! form, then flattens it into line segments.

use std::f64::consts::TAU;
use svgass_geom::Vector;

/// An arc as written in path data, in local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParams {
    pub radii: Vector,
    /// Rotation of the ellipse x axis, in radians.
    pub x_axis_rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
    pub start: Vector,
    pub end: Vector,
}

/// Center parameterization of an arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterArc {
    pub center: Vector,
    /// Radii after scaling up to reach both endpoints.
    pub radii: Vector,
    pub x_axis_rotation: f64,
    pub start_angle: f64,
    /// Signed; positive sweeps toward increasing angles.
    pub sweep_angle: f64,
}

impl ArcParams {
    /// Build from path-data values, with the rotation in degrees.
    pub fn from_path_values(
        start: Vector,
        radii: Vector,
        rotation_degrees: f64,
        large_arc: bool,
        sweep: bool,
        end: Vector,
    ) -> Self {
        Self {
            radii: Vector::new(radii.x.abs(), radii.y.abs()),
            x_axis_rotation: rotation_degrees.rem_euclid(360.0).to_radians(),
            large_arc,
            sweep,
            start,
            end,
        }
    }

    /// Endpoint-to-center conversion.
    ///
    /// Returns `None` when there is no ellipse: a zero radius, coincident
    /// endpoints, or radii so large next to the chord that the arc cannot be
    /// told apart from a straight line. Radii too small to span the
    /// endpoints are scaled up uniformly until they do.
    pub fn to_center(&self) -> Option<CenterArc> {
        let (mut rx, mut ry) = (self.radii.x.abs(), self.radii.y.abs());
        if rx == 0.0 || ry == 0.0 || self.start == self.end {
            return None;
        }

        let (sin_phi, cos_phi) = self.x_axis_rotation.sin_cos();
        let half = (self.start - self.end) * 0.5;
        let x1p = cos_phi * half.x + sin_phi * half.y;
        let y1p = -sin_phi * half.x + cos_phi * half.y;

        let mut lambda = (x1p / rx).powi(2) + (y1p / ry).powi(2);
        if lambda.is_nan() || lambda < f64::EPSILON {
            return None;
        }
        if lambda > 1.0 {
            let grow = lambda.sqrt();
            rx *= grow;
            ry *= grow;
            lambda = 1.0;
        }

        // squared products of the radii overflow for large arcs, so the
        // coefficient is taken in the form normalized by rx*ry
        let sign = if self.large_arc != self.sweep { 1.0 } else { -1.0 };
        let coeff = sign * (1.0 / lambda - 1.0).max(0.0).sqrt();
        let cxp = coeff * (rx / ry) * y1p;
        let cyp = -coeff * (ry / rx) * x1p;

        let mid = (self.start + self.end) * 0.5;
        let center = Vector::new(
            cos_phi * cxp - sin_phi * cyp + mid.x,
            sin_phi * cxp + cos_phi * cyp + mid.y,
        );

        let u = Vector::new((x1p - cxp) / rx, (y1p - cyp) / ry);
        let v = Vector::new((-x1p - cxp) / rx, (-y1p - cyp) / ry);
        let start_angle = Vector::new(1.0, 0.0).angle_to(u);
        let mut sweep_angle = u.angle_to(v);
        if self.sweep && sweep_angle < 0.0 {
            sweep_angle += TAU;
        } else if !self.sweep && sweep_angle > 0.0 {
            sweep_angle -= TAU;
        }

        Some(CenterArc {
            center,
            radii: Vector::new(rx, ry),
            x_axis_rotation: self.x_axis_rotation,
            start_angle,
            sweep_angle,
        })
    }

    /// Points of the flattened arc after `start`, ending exactly on `end`.
    ///
    /// The angular step is `arc_step` divided by the mean radius, capped so
    /// that no more than `max_segments` segments are produced. An arc with
    /// no ellipse flattens to its end point alone.
    pub fn flatten(&self, arc_step: f64, max_segments: usize) -> Vec<Vector> {
        let Some(arc) = self.to_center() else {
            return vec![self.end];
        };

        let max_segments = max_segments.max(1);
        let span = arc.sweep_angle.abs();
        let mean_radius = (arc.radii.x + arc.radii.y) / 2.0;
        let mut step = arc_step / mean_radius;
        let needed = span / step;
        if !(needed.is_finite() && needed <= max_segments as f64) {
            step = span / max_segments as f64;
        }
        let direction = arc.sweep_angle.signum();

        let mut points = Vec::new();
        let mut i = 1usize;
        while i < max_segments && (i as f64) * step < span {
            points.push(arc.point_at(arc.start_angle + direction * step * i as f64));
            i += 1;
        }
        points.push(self.end);
        points
    }
}

impl CenterArc {
    /// Point on the ellipse at parametric angle `theta`.
    pub fn point_at(&self, theta: f64) -> Vector {
        let (sin_t, cos_t) = theta.sin_cos();
        let (sin_phi, cos_phi) = self.x_axis_rotation.sin_cos();
        let (rx, ry) = (self.radii.x, self.radii.y);
        Vector::new(
            self.center.x + rx * cos_t * cos_phi - ry * sin_t * sin_phi,
            self.center.y + rx * cos_t * sin_phi + ry * sin_t * cos_phi,
        )
    }
}
