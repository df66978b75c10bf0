//! Arithmetic and math instructions.

use super::{
    super::{error::HintErrorKind, math},
    Engine, OpResult,
};

impl<'a> Engine<'a> {
    /// ADD[] (0x60): push n1 + n2.
    ///
    /// in: n1, n2 (26.6); out: their sum (26.6)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#add>
    pub(super) fn op_add(&mut self) -> OpResult {
        self.value_stack.apply_binary(|a, b| Ok(a.wrapping_add(b)))
    }

    /// SUB[] (0x61): push n2 - n1.
    ///
    /// in: n1, n2 (26.6); out: their difference (26.6)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#subtract>
    pub(super) fn op_sub(&mut self) -> OpResult {
        self.value_stack.apply_binary(|a, b| Ok(a.wrapping_sub(b)))
    }

    /// DIV[] (0x62): push n2 / n1, failing on a zero divisor.
    ///
    /// in: n1, n2 (26.6); out: their quotient (26.6)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#divide>
    pub(super) fn op_div(&mut self) -> OpResult {
        self.value_stack.apply_binary(|a, b| {
            if b == 0 {
                Err(HintErrorKind::DivideByZero)
            } else {
                Ok(math::mul_div_no_round(a, 64, b))
            }
        })
    }

    /// MUL[] (0x63): push n2 * n1.
    ///
    /// in: n1, n2 (26.6); out: their product (26.6)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#multiply>
    pub(super) fn op_mul(&mut self) -> OpResult {
        self.value_stack.apply_binary(|a, b| Ok(math::mul_div(a, b, 64)))
    }

    /// ABS[] (0x64): push the magnitude of n.
    ///
    /// in: n (26.6); out: |n| (26.6)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#absolute-value>
    pub(super) fn op_abs(&mut self) -> OpResult {
        self.value_stack.apply_unary(|n| Ok(n.wrapping_abs()))
    }

    /// NEG[] (0x65): push n with its sign flipped.
    ///
    /// in: n (26.6); out: -n (26.6)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#negate>
    pub(super) fn op_neg(&mut self) -> OpResult {
        self.value_stack.apply_unary(|n| Ok(n.wrapping_neg()))
    }

    /// FLOOR[] (0x66): push the largest integral 26.6 value not above n.
    ///
    /// in: n (26.6); out: floor(n) (26.6)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#floor>
    pub(super) fn op_floor(&mut self) -> OpResult {
        self.value_stack.apply_unary(|n| Ok(math::floor(n)))
    }

    /// CEILING[] (0x67): push the smallest integral 26.6 value not below n.
    ///
    /// in: n (26.6); out: ceil(n) (26.6)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#ceiling>
    pub(super) fn op_ceiling(&mut self) -> OpResult {
        self.value_stack.apply_unary(|n| Ok(math::ceil(n)))
    }

    /// MAX[] (0x8B): push the larger of the two operands.
    ///
    /// in: e1, e2; out: max(e1, e2)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#maximum-of-top-two-stack-elements>
    pub(super) fn op_max(&mut self) -> OpResult {
        self.value_stack.apply_binary(|a, b| Ok(a.max(b)))
    }

    /// MIN[] (0x8C): push the smaller of the two operands.
    ///
    /// in: e1, e2; out: min(e1, e2)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#minimum-of-top-two-stack-elements>
    pub(super) fn op_min(&mut self) -> OpResult {
        self.value_stack.apply_binary(|a, b| Ok(a.min(b)))
    }
}

#[cfg(test)]
mod tests {
    use super::super::{HintErrorKind, MockEngine};

    #[test]
    fn add() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.test_exec(&[100, -50], 50, |engine| {
            engine.op_add().unwrap();
        });
    }

    #[test]
    fn sub() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.test_exec(&[100, -50], 150, |engine| {
            engine.op_sub().unwrap();
        });
    }

    #[test]
    fn div() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        // 26.6: 1.0 / 2.0 = 0.5
        engine.test_exec(&[64, 128], 32, |engine| {
            engine.op_div().unwrap();
        });
    }

    #[test]
    fn div_by_zero() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.value_stack.push(64).unwrap();
        engine.value_stack.push(0).unwrap();
        assert_eq!(engine.op_div(), Err(HintErrorKind::DivideByZero));
    }

    #[test]
    fn mul() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        // 26.6: 1.5 * 2.0 = 3.0
        engine.test_exec(&[96, 128], 192, |engine| {
            engine.op_mul().unwrap();
        });
    }

    #[test]
    fn abs() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        for (input, expected) in [(-42, 42), (42, 42)] {
            engine.test_exec(&[input], expected, |engine| {
                engine.op_abs().unwrap();
            });
        }
    }

    #[test]
    fn neg() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        for (input, expected) in [(-42, 42), (42, -42)] {
            engine.test_exec(&[input], expected, |engine| {
                engine.op_neg().unwrap();
            });
        }
    }

    #[test]
    fn floor() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        for (input, expected) in [(100, 64), (-100, -128)] {
            engine.test_exec(&[input], expected, |engine| {
                engine.op_floor().unwrap();
            });
        }
    }

    #[test]
    fn ceiling() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        for (input, expected) in [(100, 128), (-100, -64)] {
            engine.test_exec(&[input], expected, |engine| {
                engine.op_ceiling().unwrap();
            });
        }
    }

    #[test]
    fn max() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.test_exec(&[-100, 100], 100, |engine| {
            engine.op_max().unwrap();
        });
    }

    #[test]
    fn min() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.test_exec(&[-100, 100], -100, |engine| {
            engine.op_min().unwrap();
        });
    }
}
