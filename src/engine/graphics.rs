//! Instructions that write the graphics state.

use super::{
    super::{bytecode::Program, error::HintErrorKind, math, zone::ZonePointer},
    Engine, OpResult, F26Dot6, Point,
};

impl<'a> Engine<'a> {
    /// SVTCA[a] (0x00..=0x01), SPVTCA[a] (0x02..=0x03),
    /// SFVTCA[a] (0x04..=0x05): aim the vectors at a coordinate axis.
    ///
    /// The low opcode bit picks the axis (0 = y, 1 = x); SVTCA updates both
    /// vectors, SPVTCA the projection side only, SFVTCA the freedom side
    /// only.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-freedom-and-projection-vectors-to-coordinate-axis>
    pub(super) fn op_svtca(&mut self, opcode: u8) -> OpResult {
        let x = ((opcode & 1) as i32) << 14;
        let y = x ^ 0x4000;
        let vector = Point::new(x, y);
        if opcode < 4 {
            self.graphics.proj_vector = vector;
            self.graphics.dual_proj_vector = vector;
        }
        if opcode & 2 == 0 {
            self.graphics.freedom_vector = vector;
        }
        self.graphics.update_projection_state();
        Ok(())
    }

    /// SPVTL[a] (0x06..=0x07), SFVTL[a] (0x08..=0x09): aim the projection
    /// or freedom vector along (bit 0 clear) or perpendicular to (bit 0
    /// set) the line through two points.
    ///
    /// in: p1 (point in the zp2 zone), p2 (point in the zp1 zone)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-projection-vector-to-line>
    pub(super) fn op_svtl(&mut self, opcode: u8) -> OpResult {
        let index1 = self.value_stack.pop_usize()?;
        let index2 = self.value_stack.pop_usize()?;
        let gs = &mut self.graphics;
        if !gs.in_bounds([(gs.zp1, index2), (gs.zp2, index1)]) {
            return if gs.is_pedantic {
                Err(HintErrorKind::InvalidPointIndex(index1.max(index2)))
            } else {
                Ok(())
            };
        }
        let p1 = gs.zp1().point(index2)?;
        let p2 = gs.zp2().point(index1)?;
        let vector = line_vector(p1, p2, opcode & 1 == 0);
        if opcode < 8 {
            gs.proj_vector = vector;
            gs.dual_proj_vector = vector;
        } else {
            gs.freedom_vector = vector;
        }
        gs.update_projection_state();
        Ok(())
    }

    /// SDPVTL[a] (0x86..=0x87): derive the dual projection vector from a
    /// line in the original outline and the projection vector from the
    /// same line in the fitted outline. Bit 0 selects perpendicular.
    ///
    /// in: p1 (point in the zp2 zone), p2 (point in the zp1 zone)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-dual-projection-vector-to-line>
    pub(super) fn op_sdpvtl(&mut self, opcode: u8) -> OpResult {
        let index1 = self.value_stack.pop_usize()?;
        let index2 = self.value_stack.pop_usize()?;
        let gs = &mut self.graphics;
        if !gs.in_bounds([(gs.zp1, index2), (gs.zp2, index1)]) {
            return if gs.is_pedantic {
                Err(HintErrorKind::InvalidPointIndex(index1.max(index2)))
            } else {
                Ok(())
            };
        }
        let is_parallel = opcode & 1 == 0;
        let origin1 = gs.zp1().original(index2)?;
        let origin2 = gs.zp2().original(index1)?;
        gs.dual_proj_vector = line_vector(origin1, origin2, is_parallel);
        let p1 = gs.zp1().point(index2)?;
        let p2 = gs.zp2().point(index1)?;
        gs.proj_vector = line_vector(p1, p2, is_parallel);
        gs.update_projection_state();
        Ok(())
    }

    /// SPVFS[] (0x0A): load the projection vector with 2.14 components
    /// taken from the stack, normalizing the result.
    ///
    /// in: y, x (2.14)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-projection-vector-from-stack>
    pub(super) fn op_spvfs(&mut self) -> OpResult {
        let y = self.value_stack.pop()? as i16 as i32;
        let x = self.value_stack.pop()? as i16 as i32;
        if x != 0 || y != 0 {
            let vector = math::normalize14(x, y);
            self.graphics.proj_vector = vector;
            self.graphics.dual_proj_vector = vector;
        }
        self.graphics.update_projection_state();
        Ok(())
    }

    /// SFVFS[] (0x0B): load the freedom vector with 2.14 components taken
    /// from the stack, normalizing the result.
    ///
    /// in: y, x (2.14)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-freedom-vector-from-stack>
    pub(super) fn op_sfvfs(&mut self) -> OpResult {
        let y = self.value_stack.pop()? as i16 as i32;
        let x = self.value_stack.pop()? as i16 as i32;
        if x != 0 || y != 0 {
            self.graphics.freedom_vector = math::normalize14(x, y);
        }
        self.graphics.update_projection_state();
        Ok(())
    }

    /// GPV[] (0x0C): push the projection vector components.
    ///
    /// out: x, y (2.14)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#get-projection-vector>
    pub(super) fn op_gpv(&mut self) -> OpResult {
        let vector = self.graphics.proj_vector;
        self.value_stack.push(vector.x)?;
        self.value_stack.push(vector.y)
    }

    /// GFV[] (0x0D): push the freedom vector components.
    ///
    /// out: x, y (2.14)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#get-freedom-vector>
    pub(super) fn op_gfv(&mut self) -> OpResult {
        let vector = self.graphics.freedom_vector;
        self.value_stack.push(vector.x)?;
        self.value_stack.push(vector.y)
    }

    /// SFVTPV[] (0x0E): copy the projection vector into the freedom
    /// vector.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-freedom-vector-to-projection-vector>
    pub(super) fn op_sfvtpv(&mut self) -> OpResult {
        self.graphics.freedom_vector = self.graphics.proj_vector;
        self.graphics.update_projection_state();
        Ok(())
    }

    /// SRP0[] (0x10): pop a point number into reference point 0.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-reference-point-0>
    pub(super) fn op_srp0(&mut self) -> OpResult {
        self.graphics.rp0 = self.value_stack.pop_usize()?;
        Ok(())
    }

    /// SRP1[] (0x11): pop a point number into reference point 1.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-reference-point-1>
    pub(super) fn op_srp1(&mut self) -> OpResult {
        self.graphics.rp1 = self.value_stack.pop_usize()?;
        Ok(())
    }

    /// SRP2[] (0x12): pop a point number into reference point 2.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-reference-point-2>
    pub(super) fn op_srp2(&mut self) -> OpResult {
        self.graphics.rp2 = self.value_stack.pop_usize()?;
        Ok(())
    }

    /// SZP0[] (0x13): pop a zone number into zone pointer 0.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-zone-pointer-0>
    pub(super) fn op_szp0(&mut self) -> OpResult {
        self.graphics.zp0 = ZonePointer::try_from(self.value_stack.pop()?)?;
        Ok(())
    }

    /// SZP1[] (0x14): pop a zone number into zone pointer 1.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-zone-pointer-1>
    pub(super) fn op_szp1(&mut self) -> OpResult {
        self.graphics.zp1 = ZonePointer::try_from(self.value_stack.pop()?)?;
        Ok(())
    }

    /// SZP2[] (0x15): pop a zone number into zone pointer 2.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-zone-pointer-2>
    pub(super) fn op_szp2(&mut self) -> OpResult {
        self.graphics.zp2 = ZonePointer::try_from(self.value_stack.pop()?)?;
        Ok(())
    }

    /// SZPS[] (0x16): pop a zone number into all three zone pointers.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-zone-pointers>
    pub(super) fn op_szps(&mut self) -> OpResult {
        let zone = ZonePointer::try_from(self.value_stack.pop()?)?;
        self.graphics.zp0 = zone;
        self.graphics.zp1 = zone;
        self.graphics.zp2 = zone;
        Ok(())
    }

    /// SLOOP[] (0x17): pop a repeat count for the looped instructions,
    /// clamped to 0xFFFF. A negative count is an error.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-loop-variable>
    pub(super) fn op_sloop(&mut self) -> OpResult {
        let count = self.value_stack.pop()?;
        if count < 0 {
            return Err(HintErrorKind::NegativeLoopCounter);
        }
        self.graphics.loop_counter = (count as u32).min(0xFFFF);
        Ok(())
    }

    /// SMD[] (0x1A): pop the minimum distance (26.6 pixels).
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-minimum-distance>
    pub(super) fn op_smd(&mut self) -> OpResult {
        self.graphics.min_distance = self.value_stack.pop_f26dot6()?;
        Ok(())
    }

    /// SCVTCI[] (0x1D): pop the control value cut-in (26.6 pixels).
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-control-value-table-cut-in>
    pub(super) fn op_scvtci(&mut self) -> OpResult {
        self.graphics.control_value_cutin = self.value_stack.pop_f26dot6()?;
        Ok(())
    }

    /// SSWCI[] (0x1E): pop the single width cut-in (26.6 pixels).
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-single-width-cut-in>
    pub(super) fn op_sswci(&mut self) -> OpResult {
        self.graphics.single_width_cutin = self.value_stack.pop_f26dot6()?;
        Ok(())
    }

    /// SSW[] (0x1F): pop the single width in font units and store it
    /// scaled to pixels.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-single-width>
    pub(super) fn op_ssw(&mut self) -> OpResult {
        let n = self.value_stack.pop()?;
        self.graphics.single_width =
            F26Dot6::from_bits(math::mul(n, self.graphics.scale));
        Ok(())
    }

    /// FLIPON[] (0x4D): enable auto flip.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-the-auto-flip-boolean-to-on>
    pub(super) fn op_flipon(&mut self) -> OpResult {
        self.graphics.auto_flip = true;
        Ok(())
    }

    /// FLIPOFF[] (0x4E): disable auto flip.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-the-auto-flip-boolean-to-off>
    pub(super) fn op_flipoff(&mut self) -> OpResult {
        self.graphics.auto_flip = false;
        Ok(())
    }

    /// SDB[] (0x5E): pop the base ppem for DELTA exceptions.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-delta_base-in-the-graphics-state>
    pub(super) fn op_sdb(&mut self) -> OpResult {
        self.graphics.delta_base = self.value_stack.pop()? as u16;
        Ok(())
    }

    /// SDS[] (0x5F): pop the shift exponent for DELTA exceptions. Values
    /// above 6 are rejected.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-delta_shift-in-the-graphics-state>
    pub(super) fn op_sds(&mut self) -> OpResult {
        let n = self.value_stack.pop()?;
        if !(0..=6).contains(&n) {
            Err(HintErrorKind::InvalidStackValue(n))
        } else {
            self.graphics.delta_shift = n as u16;
            Ok(())
        }
    }

    /// SCANCTRL[] (0x85): pop a flag word controlling dropout mode. The
    /// low byte is a ppem threshold; higher bits switch dropout control on
    /// or off depending on ppem, rotation and stretching.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#scan-conversion-control>
    pub(super) fn op_scanctrl(&mut self) -> OpResult {
        let flags = self.value_stack.pop()?;
        let thresh = flags & 0xFF;
        let gs = &mut self.graphics;
        if thresh == 0xFF {
            gs.scan_control = true;
        } else if thresh == 0 {
            gs.scan_control = false;
        } else {
            if flags & 0x100 != 0 && gs.ppem <= thresh {
                gs.scan_control = true;
            }
            if flags & 0x200 != 0 && gs.is_rotated {
                gs.scan_control = true;
            }
            if flags & 0x400 != 0 && gs.is_stretched {
                gs.scan_control = true;
            }
            if flags & 0x800 != 0 && gs.ppem > thresh {
                gs.scan_control = false;
            }
            if flags & 0x1000 != 0 && !gs.is_rotated {
                gs.scan_control = false;
            }
            if flags & 0x2000 != 0 && !gs.is_stretched {
                gs.scan_control = false;
            }
        }
        Ok(())
    }

    /// SCANTYPE[] (0x8D): pop the scan converter rule number.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#scantype>
    pub(super) fn op_scantype(&mut self) -> OpResult {
        self.graphics.scan_type = self.value_stack.pop()? & 0xFFFF;
        Ok(())
    }

    /// INSTCTRL[] (0x8E): pop a selector (1..=3) and a value, updating the
    /// instruction control bits. Only has an effect while the control
    /// value program is running.
    ///
    /// in: s (selector), value
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#instruction-execution-control>
    pub(super) fn op_instctrl(&mut self) -> OpResult {
        let selector = self.value_stack.pop()?;
        let value = self.value_stack.pop()?;
        if !(1..=3).contains(&selector) {
            return if self.graphics.is_pedantic {
                Err(HintErrorKind::InvalidStackValue(selector))
            } else {
                Ok(())
            };
        }
        let mask = 1 << (selector - 1);
        if value != 0 && value != mask {
            return if self.graphics.is_pedantic {
                Err(HintErrorKind::InvalidStackValue(value))
            } else {
                Ok(())
            };
        }
        if self.program.current == Program::ControlValue {
            let control = &mut self.graphics.instruct_control;
            *control &= !(mask as u8);
            *control |= value as u8;
        }
        Ok(())
    }
}

/// Computes a 2.14 unit vector for the line between the given points.
///
/// If the points are coincident, returns a vector aligned with the x axis.
fn line_vector(p1: Point<F26Dot6>, p2: Point<F26Dot6>, is_parallel: bool) -> Point<i32> {
    let mut a = (p1.x - p2.x).to_bits();
    let mut b = (p1.y - p2.y).to_bits();
    if a == 0 && b == 0 {
        a = 0x4000;
    } else if !is_parallel {
        // Perpendicular: rotate 90 degrees counter clockwise.
        let c = b;
        b = a;
        a = -c;
    }
    math::normalize14(a, b)
}
