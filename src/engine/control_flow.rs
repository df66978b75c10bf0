//! Branching and jump instructions.

use super::{
    super::{bytecode::opcodes as op, error::HintErrorKind},
    Engine, OpResult,
};

impl<'a> Engine<'a> {
    /// IF[] (0x58): pop a condition. When it is zero, scan forward past
    /// nested IF/EIF pairs to this block's ELSE (taking the false branch)
    /// or its EIF (skipping the block entirely).
    ///
    /// in: e (condition)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#if-test>
    pub(super) fn op_if(&mut self) -> OpResult {
        if self.value_stack.pop()? != 0 {
            return Ok(());
        }
        // The condition is false: skip to the next ELSE at our nesting
        // level or the EIF that closes this IF.
        let mut nest_depth = 1u32;
        loop {
            let ins = self.program.decoder.next()?;
            match ins.opcode {
                op::IF => nest_depth += 1,
                op::ELSE => {
                    if nest_depth == 1 {
                        break;
                    }
                }
                op::EIF => {
                    nest_depth -= 1;
                    if nest_depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// ELSE[] (0x1B): reached only after a true branch has run, so scan
    /// forward to the matching EIF.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#else>
    pub(super) fn op_else(&mut self) -> OpResult {
        let mut nest_depth = 1u32;
        while nest_depth > 0 {
            let ins = self.program.decoder.next()?;
            match ins.opcode {
                op::IF => nest_depth += 1,
                op::EIF => nest_depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    /// EIF[] (0x59): closes an IF block. Executing it directly has no
    /// effect.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#end-if>
    pub(super) fn op_eif(&mut self) -> OpResult {
        Ok(())
    }

    /// JROT[] (0x78): jump by the popped byte offset when the popped
    /// condition is nonzero. The offset is relative to the jump opcode.
    ///
    /// in: e (condition), offset
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#jump-relative-on-true>
    pub(super) fn op_jrot(&mut self) -> OpResult {
        let e = self.value_stack.pop()?;
        self.do_jump(e != 0)
    }

    /// JMPR[] (0x1C): unconditional jump by the popped byte offset,
    /// measured from the jump opcode itself (+1 lands on the next
    /// instruction).
    ///
    /// in: offset
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#jump>
    pub(super) fn op_jmpr(&mut self) -> OpResult {
        self.do_jump(true)
    }

    /// JROF[] (0x79): jump by the popped byte offset when the popped
    /// condition is zero. The offset is relative to the jump opcode.
    ///
    /// in: e (condition), offset
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#jump-relative-on-false>
    pub(super) fn op_jrof(&mut self) -> OpResult {
        let e = self.value_stack.pop()?;
        self.do_jump(e == 0)
    }

    fn do_jump(&mut self, test: bool) -> OpResult {
        // The decoder has already consumed the single byte jump
        // instruction, so adjust the offset accordingly.
        let jump_offset = self.value_stack.pop()?.wrapping_sub(1);
        if !test {
            return Ok(());
        }
        if jump_offset == -1 {
            // An offset of zero jumps to the jump itself.
            return Err(HintErrorKind::InvalidJump);
        }
        let new_pc = self
            .program
            .decoder
            .pc
            .checked_add_signed(jump_offset as isize)
            .ok_or(HintErrorKind::InvalidJump)?;
        match self.program.call_stack.peek() {
            // Jumps cannot escape an active function or instruction
            // definition.
            Some(record) => {
                if !record.definition.code_range().contains(&new_pc) {
                    return Err(HintErrorKind::InvalidJump);
                }
            }
            // At the top level the target must stay within the program;
            // landing exactly on the end is a normal exit.
            None => {
                if new_pc > self.program.decoder.bytecode.len() {
                    return Err(HintErrorKind::InvalidJump);
                }
            }
        }
        self.program.decoder.pc = new_pc;
        Ok(())
    }
}
