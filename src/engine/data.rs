//! Coordinate and distance measurement instructions.

use super::{
    super::{error::HintErrorKind, math, zone::ZonePointer},
    Engine, OpResult, F26Dot6,
};

impl<'a> Engine<'a> {
    /// GC[a] (0x46..=0x47): push the projected coordinate of point p, read
    /// from the fitted outline (bit 0 clear) or the original outline (bit 0
    /// set).
    ///
    /// in: p (point in the zp2 zone); out: coordinate (26.6)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#get-coordinate-projected-onto-the-projection-vector>
    pub(super) fn op_gc(&mut self, opcode: u8) -> OpResult {
        let p = self.value_stack.pop_usize()?;
        let gs = &self.graphics;
        let maybe_value = if (opcode & 1) != 0 {
            gs.zp2()
                .original(p)
                .map(|point| gs.dual_project(point, Default::default()))
        } else {
            gs.zp2()
                .point(p)
                .map(|point| gs.project(point, Default::default()))
        };
        let value = if gs.is_pedantic {
            maybe_value?
        } else {
            maybe_value.unwrap_or_default()
        };
        self.value_stack.push(value.to_bits())
    }

    /// SCFS[] (0x48): move point p along the freedom vector until its
    /// projected coordinate equals the popped 26.6 value.
    ///
    /// in: value (26.6), p (point in the zp2 zone)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#sets-coordinate-from-the-stack-using-projection-vector-and-freedom-vector>
    pub(super) fn op_scfs(&mut self) -> OpResult {
        let value = self.value_stack.pop_f26dot6()?;
        let p = self.value_stack.pop_usize()?;
        if !self.graphics.in_bounds([(self.graphics.zp2, p)]) {
            return if self.graphics.is_pedantic {
                Err(HintErrorKind::InvalidPointIndex(p))
            } else {
                Ok(())
            };
        }
        let projection = self
            .graphics
            .project(self.graphics.zp2().point(p)?, Default::default());
        self.graphics
            .move_point(self.graphics.zp2, p, value.wrapping_sub(projection))?;
        if self.graphics.zp2.is_twilight() {
            // Simulate the effect of moving the original position in the
            // twilight zone.
            let point = self.graphics.zp2().point(p)?;
            *self.graphics.zp2_mut().original_mut(p)? = point;
        }
        Ok(())
    }

    /// MD[a] (0x49..=0x4A): push the projected distance between two
    /// points.
    ///
    /// a: 0: measure distance in the grid-fitted outline
    ///    1: measure distance in the original outline
    ///
    /// in: p1 (zp0 zone), p2 (zp1 zone); out: distance (26.6)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#measure-distance>
    pub(super) fn op_md(&mut self, opcode: u8) -> OpResult {
        let p2 = self.value_stack.pop_usize()?;
        let p1 = self.value_stack.pop_usize()?;
        let gs = &self.graphics;
        let maybe_distance = if (opcode & 1) != 0 {
            gs.zp0()
                .point(p1)
                .and_then(|point1| Ok(gs.project(point1, gs.zp1().point(p2)?)))
        } else if gs.zp0.is_twilight() || gs.zp1.is_twilight() {
            gs.zp0()
                .original(p1)
                .and_then(|point1| Ok(gs.dual_project(point1, gs.zp1().original(p2)?)))
        } else {
            // Measure in the unscaled outline and convert to pixels.
            let distance = gs.dual_project_unscaled(gs.zp0().unscaled(p1), gs.zp1().unscaled(p2));
            Ok(F26Dot6::from_bits(math::mul(
                distance,
                gs.unscaled_to_pixels(),
            )))
        };
        let distance = if gs.is_pedantic {
            maybe_distance?
        } else {
            maybe_distance.unwrap_or_default()
        };
        self.value_stack.push(distance.to_bits())
    }

    /// MPPEM[] (0x4B): push the pixels-per-em the glyph is being rendered
    /// at.
    ///
    /// out: ppem
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#measure-pixels-per-em>
    pub(super) fn op_mppem(&mut self) -> OpResult {
        self.value_stack.push(self.graphics.ppem)
    }

    /// MPS[] (0x4C): push the nominal point size. No device resolution is
    /// known here, so ppem stands in for it (they coincide at 72 dpi).
    ///
    /// out: point size
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#measure-point-size>
    pub(super) fn op_mps(&mut self) -> OpResult {
        // A 26.6 value matching FreeType in its default configuration.
        self.value_stack.push(self.graphics.ppem * 64)
    }
}
