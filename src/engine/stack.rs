//! Stack manipulation and the push family.

use super::{super::bytecode::InlineOperands, Engine, OpResult};

impl<'a> Engine<'a> {
    /// DUP[] (0x20): copy the top stack element in place.
    ///
    /// in: e; out: e, e
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#duplicate-top-stack-element>
    pub(super) fn op_dup(&mut self) -> OpResult {
        self.value_stack.dup()
    }

    /// POP[] (0x21): discard the top stack element.
    ///
    /// in: e
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#pop-top-stack-element>
    pub(super) fn op_pop(&mut self) -> OpResult {
        self.value_stack.pop()?;
        Ok(())
    }

    /// CLEAR[] (0x22): discard every stack element.
    ///
    /// in: everything currently on the stack
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#clear-the-entire-stack>
    pub(super) fn op_clear(&mut self) -> OpResult {
        self.value_stack.clear();
        Ok(())
    }

    /// SWAP[] (0x23): exchange the two topmost stack elements.
    ///
    /// in: e1, e2; out: e2, e1
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#swap-the-top-two-elements-on-the-stack>
    pub(super) fn op_swap(&mut self) -> OpResult {
        self.value_stack.swap()
    }

    /// DEPTH[] (0x24): push the current element count.
    ///
    /// out: n, the number of elements on the stack before the push
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#returns-the-depth-of-the-stack>
    pub(super) fn op_depth(&mut self) -> OpResult {
        let n = self.value_stack.len();
        self.value_stack.push(n as i32)
    }

    /// CINDEX[] (0x25): push a copy of the element k slots below the top.
    ///
    /// in: k; out: the kth element, counted from the top
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#copy-the-indexed-element-to-the-top-of-the-stack>
    pub(super) fn op_cindex(&mut self) -> OpResult {
        self.value_stack.copy_index()
    }

    /// MINDEX[] (0x26): pull the element k slots below the top up to the
    /// top, closing the gap it leaves.
    ///
    /// in: k; out: the kth element, counted from the top
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#move-the-indexed-element-to-the-top-of-the-stack>
    pub(super) fn op_mindex(&mut self) -> OpResult {
        self.value_stack.move_index()
    }

    /// ROLL[] (0x8A): rotate the three topmost elements so the third one
    /// becomes the top.
    ///
    /// in: a, b, c; out: b, a, c (c on top)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#roll-the-top-three-stack-elements>
    pub(super) fn op_roll(&mut self) -> OpResult {
        self.value_stack.roll()
    }

    /// NPUSHB[] (0x40), NPUSHW[] (0x41), PUSHB[abc] (0xB0..=0xB7),
    /// PUSHW[abc] (0xB8..=0xBF): push inline operands.
    ///
    /// out: the bytes or sign extended words encoded after the opcode
    ///
    /// The decoder gathers the immediate data for every push variant, so a
    /// single handler serves all of them.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#push-n-bytes>
    pub(super) fn op_push(&mut self, operands: &InlineOperands) -> OpResult {
        self.value_stack.push_inline_operands(operands)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{super::bytecode::MockInlineOperands, MockEngine};

    #[test]
    fn stack_ops() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        let byte_args = MockInlineOperands::from_bytes(&[2, 4, 6, 8]);
        let word_args = MockInlineOperands::from_words(&[-2000, 4000, -6000, 8000]);
        // Push some bytes and words.
        engine.op_push(&byte_args.operands()).unwrap();
        engine.op_push(&word_args.operands()).unwrap();
        assert_eq!(
            engine.value_stack.values(),
            &[2, 4, 6, 8, -2000, 4000, -6000, 8000]
        );
        // DEPTH
        engine.op_depth().unwrap();
        assert_eq!(engine.value_stack.pop().unwrap(), 8);
        // POP
        engine.op_pop().unwrap();
        engine.op_pop().unwrap();
        assert_eq!(engine.value_stack.values(), &[2, 4, 6, 8, -2000, 4000]);
        // SWAP
        engine.op_swap().unwrap();
        assert_eq!(engine.value_stack.values(), &[2, 4, 6, 8, 4000, -2000]);
        // DUP
        engine.op_dup().unwrap();
        assert_eq!(
            engine.value_stack.values(),
            &[2, 4, 6, 8, 4000, -2000, -2000]
        );
        // CINDEX
        engine.value_stack.push(5).unwrap();
        engine.op_cindex().unwrap();
        assert_eq!(
            engine.value_stack.values(),
            &[2, 4, 6, 8, 4000, -2000, -2000, 6]
        );
        // MINDEX
        engine.value_stack.push(4).unwrap();
        engine.op_mindex().unwrap();
        assert_eq!(
            engine.value_stack.values(),
            &[2, 4, 6, 8, -2000, -2000, 6, 4000]
        );
        // ROLL
        engine.op_roll().unwrap();
        assert_eq!(
            engine.value_stack.values(),
            &[2, 4, 6, 8, -2000, 6, 4000, -2000]
        );
        // CLEAR
        engine.op_clear().unwrap();
        assert!(engine.value_stack.values().is_empty());
    }
}
