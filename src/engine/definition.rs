//! FDEF/IDEF recording and the CALL family.

use super::{
    super::{
        bytecode::{opcodes as op, Program},
        definition::Definition,
        error::HintErrorKind,
    },
    Engine, OpResult,
};

/// Maximum size in bytes of a single function or instruction definition.
pub const MAX_DEFINITION_SIZE: usize = u16::MAX as usize;

impl<'a> Engine<'a> {
    /// FDEF[] (0x2C): start recording a function body, keyed by the popped
    /// identifier. Only legal in the font and control value programs.
    ///
    /// in: f (function number)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#function-definition>
    pub(super) fn op_fdef(&mut self) -> OpResult {
        self.do_def(true)
    }

    /// IDEF[] (0x89): start recording an instruction body for the popped
    /// opcode, which takes effect whenever that opcode has no native
    /// handler.
    ///
    /// in: opcode
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#instruction-definition>
    pub(super) fn op_idef(&mut self) -> OpResult {
        self.do_def(false)
    }

    /// ENDF[] (0x2D): close the body being defined, or return from the
    /// active CALL/LOOPCALL/IDEF invocation.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#end-function-definition>
    pub(super) fn op_endf(&mut self) -> OpResult {
        self.program.leave()
    }

    /// CALL[] (0x2B): invoke the function with the popped identifier once.
    ///
    /// in: f (function number)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#call-function>
    pub(super) fn op_call(&mut self) -> OpResult {
        let key = self.value_stack.pop()?;
        self.do_call(key, 1)
    }

    /// LOOPCALL[] (0x2A): invoke function f the popped number of times. A
    /// count of zero or less invokes nothing.
    ///
    /// in: f (function number), count
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#loop-and-call-function>
    pub(super) fn op_loopcall(&mut self) -> OpResult {
        let key = self.value_stack.pop()?;
        let count = self.value_stack.pop()?;
        if count > 0 {
            self.do_call(key, count as u32)
        } else {
            Ok(())
        }
    }

    /// Dispatch fallback for opcodes with no native handler: runs the
    /// matching IDEF body when one is active.
    pub(super) fn op_unknown(&mut self, opcode: u8) -> OpResult {
        let def = *self
            .definitions
            .instructions
            .get(opcode as i32)
            .map_err(|_| HintErrorKind::UnhandledOpcode(opcode))?;
        self.program.enter(def, 1)
    }

    fn do_call(&mut self, key: i32, count: u32) -> OpResult {
        if count == 0 {
            return Ok(());
        }
        let def = *self.definitions.functions.get(key)?;
        self.program.enter(def, count)
    }

    fn do_def(&mut self, is_function: bool) -> OpResult {
        if self.program.current == Program::Glyph {
            return Err(HintErrorKind::DefinitionInGlyphProgram);
        }
        let key = self.value_stack.pop()?;
        let definitions = if is_function {
            &mut self.definitions.functions
        } else {
            &mut self.definitions.instructions
        };
        let def = definitions.allocate(key)?;
        let start = self.program.decoder.pc;
        while let Some(next_ins) = self.program.decoder.maybe_next() {
            let next_ins = next_ins?;
            match next_ins.opcode {
                op::FDEF | op::IDEF => return Err(HintErrorKind::NestedDefinition),
                op::ENDF => {
                    let end = next_ins.pc + 1;
                    if self.graphics.is_pedantic && end - start > MAX_DEFINITION_SIZE {
                        *def = Definition::default();
                        return Err(HintErrorKind::DefinitionTooLarge);
                    }
                    *def = Definition::new(self.program.current, start..end, key);
                    return Ok(());
                }
                _ => {}
            }
        }
        // Ran out of bytecode before finding ENDF.
        Err(HintErrorKind::UnexpectedEndOfBytecode)
    }
}
