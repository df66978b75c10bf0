//! Delta exceptions.

use super::{
    super::{bytecode::opcodes as op, error::HintErrorKind},
    Engine, F26Dot6, OpResult,
};

impl<'a> Engine<'a> {
    /// DELTAP1[] (0x5D), DELTAP2[] (0x71), DELTAP3[] (0x72): pop a pair
    /// count, then that many (argument, point) pairs. Each argument packs
    /// a ppem offset in its high nibble and a signed step count in its low
    /// nibble; a pair fires only when the encoded size (delta base plus
    /// the per-variant bias of 0/16/32) equals the current ppem, moving
    /// the point along the freedom vector.
    ///
    /// in: n, then p1, arg1 .. pn, argn
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#delta-exception-p1>
    pub(super) fn op_deltap(&mut self, opcode: u8) -> OpResult {
        let n = self.value_stack.pop_count_checked()?;
        // Each exception is a pair of stack entries.
        let n = n.min(self.value_stack.len() / 2);
        let bias = match opcode {
            op::DELTAP2 => 16,
            op::DELTAP3 => 32,
            _ => 0,
        } + self.graphics.delta_base as i32;
        let is_pedantic = self.graphics.is_pedantic;
        for _ in 0..n {
            let point_ix = self.value_stack.pop_usize()?;
            let b = self.value_stack.pop()?;
            let gs = &mut self.graphics;
            if !gs.in_bounds([(gs.zp0, point_ix)]) {
                if is_pedantic {
                    return Err(HintErrorKind::InvalidPointIndex(point_ix));
                }
                continue;
            }
            let size = ((b as u32 & 0xF0) >> 4) as i32 + bias;
            if gs.ppem == size {
                gs.move_point(gs.zp0, point_ix, delta_amount(b, gs.delta_shift))?;
            }
        }
        Ok(())
    }

    /// DELTAC1[] (0x73), DELTAC2[] (0x74), DELTAC3[] (0x75): the CVT
    /// counterpart of DELTAP. Pairs that match the current ppem add their
    /// decoded amount to the named CVT entry.
    ///
    /// in: n, then c1, arg1 .. cn, argn
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#delta-exception-c1>
    pub(super) fn op_deltac(&mut self, opcode: u8) -> OpResult {
        let n = self.value_stack.pop_count_checked()?;
        let n = n.min(self.value_stack.len() / 2);
        let bias = match opcode {
            op::DELTAC2 => 16,
            op::DELTAC3 => 32,
            _ => 0,
        } + self.graphics.delta_base as i32;
        let is_pedantic = self.graphics.is_pedantic;
        for _ in 0..n {
            let cvt_ix = self.value_stack.pop_usize()?;
            let b = self.value_stack.pop()?;
            let size = ((b as u32 & 0xF0) >> 4) as i32 + bias;
            if self.graphics.ppem == size {
                let maybe_value = self.cvt.get(cvt_ix);
                let value = if is_pedantic {
                    maybe_value?
                } else {
                    maybe_value.unwrap_or_default()
                };
                let amount = delta_amount(b, self.graphics.delta_shift);
                let result = self.cvt.set(cvt_ix, value.wrapping_add(amount));
                if is_pedantic {
                    result?;
                }
            }
        }
        Ok(())
    }
}

/// Converts the magnitude selector in the low nibble of an exception
/// argument into a distance in 26.6 pixels.
///
/// The selector is a value in 0..=15 mapping to steps -8..=8 with zero
/// excluded.
fn delta_amount(arg: i32, delta_shift: u16) -> F26Dot6 {
    let mut steps = (arg & 0xF) - 8;
    if steps >= 0 {
        steps += 1;
    }
    F26Dot6::from_bits(steps * (1 << (6 - delta_shift as i32)))
}

#[cfg(test)]
mod tests {
    use super::{super::MockEngine, F26Dot6};

    #[test]
    fn deltap_moves_point_at_matching_ppem() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        // delta base is 9 so a relative size nibble of 3 selects ppem 12.
        engine.graphics.ppem = 12;
        // selector 0xF is +8 steps; delta shift of 3 makes each step
        // 8/64ths of a pixel, so the exception moves the point one pixel.
        engine.value_stack.push(0x3F).unwrap();
        engine.value_stack.push(4).unwrap();
        engine.value_stack.push(1).unwrap();
        engine.op_deltap(0x5D).unwrap();
        let point = engine.graphics.zp0().point(4).unwrap();
        assert_eq!(point.x, F26Dot6::from_bits(64));
    }

    #[test]
    fn deltap_ignores_other_ppem_sizes() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.graphics.ppem = 13;
        engine.value_stack.push(0x3F).unwrap();
        engine.value_stack.push(4).unwrap();
        engine.value_stack.push(1).unwrap();
        engine.op_deltap(0x5D).unwrap();
        let point = engine.graphics.zp0().point(4).unwrap();
        assert_eq!(point.x, F26Dot6::ZERO);
    }

    #[test]
    fn deltap_bias_by_opcode() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        // DELTAP2 adds 16 to the base of 9, so nibble 2 selects ppem 27.
        engine.graphics.ppem = 27;
        // selector 0 is -8 steps: one pixel in the other direction.
        engine.value_stack.push(0x20).unwrap();
        engine.value_stack.push(4).unwrap();
        engine.value_stack.push(1).unwrap();
        engine.op_deltap(0x71).unwrap();
        let point = engine.graphics.zp0().point(4).unwrap();
        assert_eq!(point.x, F26Dot6::from_bits(-64));
    }

    #[test]
    fn deltac_adjusts_cvt_entry() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.graphics.ppem = 12;
        engine.cvt.set(5, F26Dot6::from_bits(100)).unwrap();
        engine.value_stack.push(0x3F).unwrap();
        engine.value_stack.push(5).unwrap();
        engine.value_stack.push(1).unwrap();
        engine.op_deltac(0x73).unwrap();
        assert_eq!(engine.cvt.get(5).unwrap(), F26Dot6::from_bits(164));
    }

    #[test]
    fn pair_count_clamped_to_stack_depth() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.graphics.ppem = 12;
        engine.value_stack.push(0x3F).unwrap();
        engine.value_stack.push(4).unwrap();
        // claims more pairs than the stack holds
        engine.value_stack.push(1000).unwrap();
        engine.op_deltap(0x5D).unwrap();
        assert!(engine.value_stack.values().is_empty());
    }
}
