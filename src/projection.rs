//! Point projection.

use super::{
    graphics::{CoordAxis, GraphicsState},
    math,
};
use font_types::{F26Dot6, Point};

/// 1.0 in 2.14 fixed point.
const ONE: i32 = 0x4000;

/// Classifies a unit vector by whether it sits exactly on a coordinate
/// axis, which lets the projection below skip the dot product.
fn unit_axis(vector: Point<i32>) -> CoordAxis {
    if vector.x == ONE {
        CoordAxis::X
    } else if vector.y == ONE {
        CoordAxis::Y
    } else {
        CoordAxis::Both
    }
}

/// Projects the delta `(dx, dy)` onto `vector`, with the axis aligned
/// cases reduced to picking a component.
#[inline(always)]
fn project_onto(axis: CoordAxis, vector: Point<i32>, dx: i32, dy: i32) -> i32 {
    match axis {
        CoordAxis::X => dx,
        CoordAxis::Y => dy,
        CoordAxis::Both => math::dot14(dx, dy, vector.x, vector.y),
    }
}

impl GraphicsState<'_> {
    /// Recomputes the cached axis classifications and the freedom/projection
    /// dot product. Must be called after any instruction that changes a
    /// vector.
    pub fn update_projection_state(&mut self) {
        self.proj_axis = unit_axis(self.proj_vector);
        self.dual_proj_axis = unit_axis(self.dual_proj_vector);
        self.fdotp = match unit_axis(self.freedom_vector) {
            CoordAxis::X => self.proj_vector.x,
            CoordAxis::Y => self.proj_vector.y,
            CoordAxis::Both => {
                (self.proj_vector.x * self.freedom_vector.x
                    + self.proj_vector.y * self.freedom_vector.y)
                    >> 14
            }
        };
        self.freedom_axis = if self.fdotp == ONE {
            unit_axis(self.freedom_vector)
        } else {
            CoordAxis::Both
        };
        // A near perpendicular freedom vector makes the movement divisor
        // tiny, producing huge spikes; clamp it to identity.
        if self.fdotp.abs() < 0x400 {
            self.fdotp = ONE;
        }
    }

    /// Returns the signed length of `v1 - v2` along the projection vector.
    #[inline(always)]
    pub fn project(&self, v1: Point<F26Dot6>, v2: Point<F26Dot6>) -> F26Dot6 {
        F26Dot6::from_bits(project_onto(
            self.proj_axis,
            self.proj_vector,
            (v1.x - v2.x).to_bits(),
            (v1.y - v2.y).to_bits(),
        ))
    }

    /// Returns the signed length of `v1 - v2` along the dual projection
    /// vector, used when measuring the original outline.
    #[inline(always)]
    pub fn dual_project(&self, v1: Point<F26Dot6>, v2: Point<F26Dot6>) -> F26Dot6 {
        F26Dot6::from_bits(project_onto(
            self.dual_proj_axis,
            self.dual_proj_vector,
            (v1.x - v2.x).to_bits(),
            (v1.y - v2.y).to_bits(),
        ))
    }

    /// Dual projection over unscaled font unit points.
    #[inline(always)]
    pub fn dual_project_unscaled(&self, v1: Point<i32>, v2: Point<i32>) -> i32 {
        project_onto(
            self.dual_proj_axis,
            self.dual_proj_vector,
            v1.x - v2.x,
            v1.y - v2.y,
        )
    }
}
