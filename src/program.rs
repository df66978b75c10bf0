//! Active program state for the interpreter.

use super::{
    bytecode::{Decoder, Program},
    call_stack::{CallRecord, CallStack},
    definition::Definition,
    error::HintErrorKind,
};

/// Tracks which program is executing and where.
///
/// Holds the bytecode of all three programs so CALL can transfer control
/// into a function defined by `fpgm` regardless of which program invoked
/// it.
pub struct ProgramState<'a> {
    /// Bytecode of the three programs, indexed by `Program`.
    pub bytecode: [&'a [u8]; 3],
    /// Program this run started in.
    pub initial: Program,
    /// Program currently executing.
    pub current: Program,
    /// Decoder positioned at the next instruction.
    pub decoder: Decoder<'a>,
    /// Nested function and instruction invocations.
    pub call_stack: CallStack,
}

impl<'a> ProgramState<'a> {
    pub fn new(
        font_code: &'a [u8],
        cv_code: &'a [u8],
        glyph_code: &'a [u8],
        initial_program: Program,
    ) -> Self {
        let bytecode = [font_code, cv_code, glyph_code];
        Self {
            bytecode,
            initial: initial_program,
            current: initial_program,
            decoder: Decoder::new(initial_program, bytecode[initial_program as usize], 0),
            call_stack: CallStack::default(),
        }
    }

    /// Rewinds to the start of the given program, dropping any active
    /// calls.
    pub fn reset(&mut self, program: Program) {
        self.initial = program;
        self.current = program;
        self.decoder = Decoder::new(program, self.bytecode[program as usize], 0);
        self.call_stack.clear();
    }

    fn activate(&mut self, program: Program, pc: usize) {
        self.current = program;
        self.decoder.bytecode = self.bytecode[program as usize];
        self.decoder.pc = pc;
    }

    /// Transfers control into a function or instruction definition,
    /// recording where to come back to.
    ///
    /// `count` is the number of iterations for LOOPCALL; plain CALL and
    /// user defined instructions pass one.
    pub fn enter(&mut self, definition: Definition, count: u32) -> Result<(), HintErrorKind> {
        self.call_stack.push(CallRecord {
            caller_program: self.current,
            return_pc: self.decoder.pc,
            current_count: count,
            definition,
        })?;
        self.activate(definition.program(), definition.code_range().start);
        Ok(())
    }

    /// Handles ENDF: rewinds to the start of the definition while loop
    /// iterations remain, otherwise returns control to the caller.
    pub fn leave(&mut self) -> Result<(), HintErrorKind> {
        let mut record = self.call_stack.pop()?;
        if record.current_count > 1 {
            record.current_count -= 1;
            self.decoder.pc = record.definition.code_range().start;
            self.call_stack.push(record)?;
        } else {
            self.activate(record.caller_program, record.return_pc);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Definition, Program, ProgramState};

    #[test]
    fn call_record_accounting() {
        let font_code = [0u8; 64];
        let cv_code = [0u8; 16];
        let glyph_code = [0u8; 8];
        let mut state = ProgramState::new(&font_code, &cv_code, &glyph_code, Program::Glyph);
        let def = Definition::new(Program::Font, 10..20, 0);
        state.decoder.pc = 4;
        state.enter(def, 1).unwrap();
        assert_eq!(state.current, Program::Font);
        assert_eq!(state.decoder.pc, 10);
        assert_eq!(state.call_stack.len(), 1);
        state.leave().unwrap();
        assert_eq!(state.current, Program::Glyph);
        assert_eq!(state.decoder.pc, 4);
        assert!(state.call_stack.is_empty());
    }

    #[test]
    fn loop_call() {
        let font_code = [0u8; 64];
        let mut state = ProgramState::new(&font_code, &[], &[], Program::Font);
        let def = Definition::new(Program::Font, 30..40, 7);
        state.decoder.pc = 2;
        state.enter(def, 3).unwrap();
        // Each leave before the final one loops back to the start of the
        // definition.
        for _ in 0..2 {
            state.decoder.pc = 35;
            state.leave().unwrap();
            assert_eq!(state.decoder.pc, 30);
            assert_eq!(state.call_stack.len(), 1);
        }
        state.leave().unwrap();
        assert_eq!(state.decoder.pc, 2);
        assert!(state.call_stack.is_empty());
    }
}
