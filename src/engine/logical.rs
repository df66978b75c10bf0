//! Comparison, parity and boolean instructions.

use super::{Engine, OpResult, F26Dot6};

impl<'a> Engine<'a> {
    /// LT[] (0x50): push 1 when e1 < e2, otherwise 0.
    ///
    /// in: e1, e2; out: boolean
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#less-than>
    pub(super) fn op_lt(&mut self) -> OpResult {
        self.value_stack.apply_binary(|e1, e2| Ok((e1 < e2) as i32))
    }

    /// LTEQ[] (0x51): push 1 when e1 <= e2, otherwise 0.
    ///
    /// in: e1, e2; out: boolean
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#less-than-or-equal>
    pub(super) fn op_lteq(&mut self) -> OpResult {
        self.value_stack.apply_binary(|e1, e2| Ok((e1 <= e2) as i32))
    }

    /// GT[] (0x52): push 1 when e1 > e2, otherwise 0.
    ///
    /// in: e1, e2; out: boolean
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#greater-than>
    pub(super) fn op_gt(&mut self) -> OpResult {
        self.value_stack.apply_binary(|e1, e2| Ok((e1 > e2) as i32))
    }

    /// GTEQ[] (0x53): push 1 when e1 >= e2, otherwise 0.
    ///
    /// in: e1, e2; out: boolean
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#greater-than-or-equal>
    pub(super) fn op_gteq(&mut self) -> OpResult {
        self.value_stack.apply_binary(|e1, e2| Ok((e1 >= e2) as i32))
    }

    /// EQ[] (0x54): push 1 when the operands are equal, otherwise 0.
    ///
    /// in: e1, e2; out: boolean
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#equal>
    pub(super) fn op_eq(&mut self) -> OpResult {
        self.value_stack.apply_binary(|e1, e2| Ok((e1 == e2) as i32))
    }

    /// NEQ[] (0x55): push 1 when the operands differ, otherwise 0.
    ///
    /// in: e1, e2; out: boolean
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#not-equal>
    pub(super) fn op_neq(&mut self) -> OpResult {
        self.value_stack.apply_binary(|e1, e2| Ok((e1 != e2) as i32))
    }

    /// ODD[] (0x56): round e1 with the current round state, then push 1
    /// when the resulting integer is odd.
    ///
    /// in: e1 (26.6); out: boolean
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#odd>
    pub(super) fn op_odd(&mut self) -> OpResult {
        let round_state = self.graphics.round_state;
        self.value_stack.apply_unary(|e1| {
            Ok((round_state.round(F26Dot6::from_bits(e1)).to_bits() & 127 == 64) as i32)
        })
    }

    /// EVEN[] (0x57): round e1 with the current round state, then push 1
    /// when the resulting integer is even.
    ///
    /// in: e1 (26.6); out: boolean
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#even>
    pub(super) fn op_even(&mut self) -> OpResult {
        let round_state = self.graphics.round_state;
        self.value_stack.apply_unary(|e1| {
            Ok((round_state.round(F26Dot6::from_bits(e1)).to_bits() & 127 == 0) as i32)
        })
    }

    /// AND[] (0x5A): push 1 when both operands are nonzero.
    ///
    /// in: e1, e2; out: boolean
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#logical-and>
    pub(super) fn op_and(&mut self) -> OpResult {
        self.value_stack
            .apply_binary(|e1, e2| Ok((e1 != 0 && e2 != 0) as i32))
    }

    /// OR[] (0x5B): push 1 when either operand is nonzero.
    ///
    /// in: e1, e2; out: boolean
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#logical-or>
    pub(super) fn op_or(&mut self) -> OpResult {
        self.value_stack
            .apply_binary(|e1, e2| Ok((e1 != 0 || e2 != 0) as i32))
    }

    /// NOT[] (0x5C): push 1 when e is zero, otherwise 0.
    ///
    /// in: e; out: boolean
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#logical-not>
    pub(super) fn op_not(&mut self) -> OpResult {
        self.value_stack.apply_unary(|e| Ok((e == 0) as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::super::MockEngine;

    #[test]
    fn compare_ops() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.test_exec(&[1, 2], true, |engine| engine.op_lt().unwrap());
        engine.test_exec(&[2, 1], false, |engine| engine.op_lt().unwrap());
        engine.test_exec(&[2, 2], true, |engine| engine.op_lteq().unwrap());
        engine.test_exec(&[3, 2], false, |engine| engine.op_lteq().unwrap());
        engine.test_exec(&[3, 2], true, |engine| engine.op_gt().unwrap());
        engine.test_exec(&[2, 2], false, |engine| engine.op_gt().unwrap());
        engine.test_exec(&[2, 2], true, |engine| engine.op_gteq().unwrap());
        engine.test_exec(&[1, 2], false, |engine| engine.op_gteq().unwrap());
        engine.test_exec(&[-42, -42], true, |engine| engine.op_eq().unwrap());
        engine.test_exec(&[-42, 42], false, |engine| engine.op_eq().unwrap());
        engine.test_exec(&[-42, 42], true, |engine| engine.op_neq().unwrap());
        engine.test_exec(&[-42, -42], false, |engine| engine.op_neq().unwrap());
    }

    #[test]
    fn parity_ops() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        // With default round state (round to grid), 96 rounds to 128
        // which is 2.0 in 26.6, so even.
        engine.test_exec(&[96], false, |engine| engine.op_odd().unwrap());
        engine.test_exec(&[96], true, |engine| engine.op_even().unwrap());
        // and 32 rounds to 64, odd.
        engine.test_exec(&[32], true, |engine| engine.op_odd().unwrap());
        engine.test_exec(&[32], false, |engine| engine.op_even().unwrap());
    }

    #[test]
    fn bool_ops() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.test_exec(&[7, 2], true, |engine| engine.op_and().unwrap());
        engine.test_exec(&[7, 0], false, |engine| engine.op_and().unwrap());
        engine.test_exec(&[0, 2], true, |engine| engine.op_or().unwrap());
        engine.test_exec(&[0, 0], false, |engine| engine.op_or().unwrap());
        engine.test_exec(&[0], true, |engine| engine.op_not().unwrap());
        engine.test_exec(&[123], false, |engine| engine.op_not().unwrap());
    }
}
