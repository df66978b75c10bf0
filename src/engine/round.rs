//! Round state selection and the ROUND instruction.

use super::{super::round::RoundMode, Engine, OpResult, F26Dot6};

impl<'a> Engine<'a> {
    /// RTHG[] (0x19): select half grid rounding, snapping distances to the
    /// nearest midpoint between grid lines.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#round-to-half-grid>
    pub(super) fn op_rthg(&mut self) -> OpResult {
        self.graphics.round_state.mode = RoundMode::HalfGrid;
        Ok(())
    }

    /// RTG[] (0x18): select grid rounding, snapping distances to the
    /// nearest grid line.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#round-to-grid>
    pub(super) fn op_rtg(&mut self) -> OpResult {
        self.graphics.round_state.mode = RoundMode::Grid;
        Ok(())
    }

    /// RTDG[] (0x3D): select double grid rounding, snapping distances to
    /// the nearest half pixel.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#round-to-double-grid>
    pub(super) fn op_rtdg(&mut self) -> OpResult {
        self.graphics.round_state.mode = RoundMode::DoubleGrid;
        Ok(())
    }

    /// RDTG[] (0x7D): select down-to-grid rounding, truncating distances
    /// toward zero.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#round-down-to-grid>
    pub(super) fn op_rdtg(&mut self) -> OpResult {
        self.graphics.round_state.mode = RoundMode::DownToGrid;
        Ok(())
    }

    /// RUTG[] (0x7C): select up-to-grid rounding, pushing distances away
    /// from zero to a whole pixel.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#round-up-to-grid>
    pub(super) fn op_rutg(&mut self) -> OpResult {
        self.graphics.round_state.mode = RoundMode::UpToGrid;
        Ok(())
    }

    /// ROFF[] (0x7A): disable rounding.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#round-off>
    pub(super) fn op_roff(&mut self) -> OpResult {
        self.graphics.round_state.mode = RoundMode::Off;
        Ok(())
    }

    /// SROUND[] (0x76): pop a selector and program the round state with an
    /// explicit period, phase and threshold on a one pixel grid.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#super-round>
    pub(super) fn op_sround(&mut self) -> OpResult {
        let selector = self.value_stack.pop()?;
        self.super_round(0x4000, selector);
        self.graphics.round_state.mode = RoundMode::Super;
        Ok(())
    }

    /// S45ROUND[] (0x77): like SROUND but on a sqrt(2)/2 pixel grid, for
    /// measurements along a 45 degree diagonal.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#super-round-45-degrees>
    pub(super) fn op_s45round(&mut self) -> OpResult {
        let selector = self.value_stack.pop()?;
        self.super_round(0x2D41, selector);
        self.graphics.round_state.mode = RoundMode::Super45;
        Ok(())
    }

    /// ROUND[ab] (0x68..=0x6B): pop a 26.6 value and push it rounded per
    /// the current round state. The flag bits select an engine
    /// compensation class, which is identically zero here.
    ///
    /// in: n1 (26.6); out: round(n1) (26.6)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#round-value>
    pub(super) fn op_round(&mut self) -> OpResult {
        let round_state = self.graphics.round_state;
        self.value_stack
            .apply_unary(|n1| Ok(round_state.round(F26Dot6::from_bits(n1)).to_bits()))
    }

    /// NROUND[ab] (0x6C..=0x6F): push the operand back unchanged. The only
    /// effect this instruction ever had was engine compensation, which is
    /// zero here.
    ///
    /// in: n1 (26.6); out: n1 (26.6)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#no-round-value>
    pub(super) fn op_nround(&mut self) -> OpResult {
        self.value_stack.apply_unary(Ok)
    }

    /// Shared SROUND/S45ROUND selector decoding.
    fn super_round(&mut self, grid_period: i32, selector: i32) {
        let period = match selector & 0xC0 {
            0 => grid_period / 2,
            0x40 => grid_period,
            0x80 => grid_period * 2,
            _ => grid_period,
        };
        let phase = match selector & 0x30 {
            0 => 0,
            0x10 => period / 4,
            0x20 => period / 2,
            _ => period * 3 / 4,
        };
        let threshold = if selector & 0xF == 0 {
            period - 1
        } else {
            ((selector & 0xF) - 4) * period / 8
        };
        let round_state = &mut self.graphics.round_state;
        round_state.period = period >> 8;
        round_state.phase = phase >> 8;
        round_state.threshold = threshold >> 8;
    }
}

#[cfg(test)]
mod tests {
    use super::{super::MockEngine, RoundMode};

    #[test]
    fn set_round_modes() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.op_rthg().unwrap();
        assert_eq!(engine.graphics.round_state.mode, RoundMode::HalfGrid);
        engine.op_rtg().unwrap();
        assert_eq!(engine.graphics.round_state.mode, RoundMode::Grid);
        engine.op_rtdg().unwrap();
        assert_eq!(engine.graphics.round_state.mode, RoundMode::DoubleGrid);
        engine.op_rdtg().unwrap();
        assert_eq!(engine.graphics.round_state.mode, RoundMode::DownToGrid);
        engine.op_rutg().unwrap();
        assert_eq!(engine.graphics.round_state.mode, RoundMode::UpToGrid);
        engine.op_roff().unwrap();
        assert_eq!(engine.graphics.round_state.mode, RoundMode::Off);
    }

    #[test]
    fn sround() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        // period = grid, phase = period / 2, threshold = period - 1
        engine.value_stack.push(0x60).unwrap();
        engine.op_sround().unwrap();
        let round_state = engine.graphics.round_state;
        assert_eq!(round_state.mode, RoundMode::Super);
        assert_eq!(round_state.period, 64);
        assert_eq!(round_state.phase, 32);
        assert_eq!(round_state.threshold, 63);
    }

    #[test]
    fn round_value() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        // default round state is round to grid
        engine.test_exec(&[32], 64, |engine| engine.op_round().unwrap());
        engine.test_exec(&[96], 128, |engine| engine.op_round().unwrap());
        engine.test_exec(&[96], 96, |engine| engine.op_nround().unwrap());
    }
}
