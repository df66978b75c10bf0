//! DEBUG, GETINFO and the retired angle instructions.

use super::{super::error::HintErrorKind, Engine, OpResult};

impl<'a> Engine<'a> {
    /// DEBUG[] (0x4F): only meaningful inside a debugger, so executing it
    /// here is an error.
    ///
    /// in: n
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#debug-call>
    pub(super) fn op_debug(&mut self) -> OpResult {
        Err(HintErrorKind::DebugOpcode)
    }

    /// GETINFO[] (0x88): pop a selector bit set and push the requested
    /// facts about the scaler: version number in the low byte, plus
    /// rotation and stretch flags.
    ///
    /// in: selector; out: result
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#get-information>
    pub(super) fn op_getinfo(&mut self) -> OpResult {
        const VERSION: i32 = 35;
        const VERSION_SELECTOR_BIT: i32 = 1 << 0;
        const GLYPH_ROTATED_SELECTOR_BIT: i32 = 1 << 1;
        const GLYPH_ROTATED_BIT: i32 = 1 << 8;
        const GLYPH_STRETCHED_SELECTOR_BIT: i32 = 1 << 2;
        const GLYPH_STRETCHED_BIT: i32 = 1 << 9;
        let selector = self.value_stack.pop()?;
        let mut result = 0;
        // Interpreter version (selector bit: 0, result bits: 0-7)
        if (selector & VERSION_SELECTOR_BIT) != 0 {
            result = VERSION;
        }
        // Glyph rotated (selector bit: 1, result bit: 8)
        if (selector & GLYPH_ROTATED_SELECTOR_BIT) != 0 && self.graphics.is_rotated {
            result |= GLYPH_ROTATED_BIT;
        }
        // Glyph stretched (selector bit: 2, result bit: 9)
        if (selector & GLYPH_STRETCHED_SELECTOR_BIT) != 0 && self.graphics.is_stretched {
            result |= GLYPH_STRETCHED_BIT;
        }
        self.value_stack.push(result)
    }

    /// SANGW[] (0x7E): discard the popped angle weight. Nothing consumes
    /// it since AA was retired.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-angle-weight>
    pub(super) fn op_sangw(&mut self) -> OpResult {
        self.value_stack.pop().map(|_| ())
    }

    /// AA[] (0x7F): retired instruction; the operand is popped and
    /// dropped.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#adjust-angle>
    pub(super) fn op_aa(&mut self) -> OpResult {
        self.value_stack.pop().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::{super::MockEngine, HintErrorKind};

    #[test]
    fn debug_fails() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        assert_eq!(engine.op_debug(), Err(HintErrorKind::DebugOpcode));
    }

    #[test]
    fn getinfo() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        // version
        engine.test_exec(&[1], 35, |engine| engine.op_getinfo().unwrap());
        // rotated and stretched both unset
        engine.test_exec(&[6], 0, |engine| engine.op_getinfo().unwrap());
        engine.graphics.is_rotated = true;
        engine.test_exec(&[2], 1 << 8, |engine| engine.op_getinfo().unwrap());
        engine.graphics.is_stretched = true;
        engine.test_exec(&[4], 1 << 9, |engine| engine.op_getinfo().unwrap());
        // everything at once
        engine.test_exec(&[7], 35 | 1 << 8 | 1 << 9, |engine| {
            engine.op_getinfo().unwrap()
        });
        // unsupported selector bits yield zero
        engine.test_exec(&[1 << 5], 0, |engine| engine.op_getinfo().unwrap());
    }
}
