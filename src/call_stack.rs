//! Tracking function call state.

use super::{bytecode::Program, definition::Definition, error::HintErrorKind};

// Matches the call stack depth of production TrueType engines.
const MAX_CALL_DEPTH: usize = 32;

/// One active CALL, LOOPCALL or instruction definition invocation.
#[derive(Copy, Clone, Default)]
pub struct CallRecord {
    pub caller_program: Program,
    pub return_pc: usize,
    pub current_count: u32,
    pub definition: Definition,
}

/// Fixed capacity stack of active call records.
#[derive(Default)]
pub struct CallStack {
    records: [CallRecord; MAX_CALL_DEPTH],
    len: usize,
}

impl CallStack {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, record: CallRecord) -> Result<(), HintErrorKind> {
        if self.len == MAX_CALL_DEPTH {
            return Err(HintErrorKind::CallStackOverflow);
        }
        self.records[self.len] = record;
        self.len += 1;
        Ok(())
    }

    pub fn peek(&self) -> Option<&CallRecord> {
        self.len.checked_sub(1).and_then(|ix| self.records.get(ix))
    }

    pub fn pop(&mut self) -> Result<CallRecord, HintErrorKind> {
        let record = *self.peek().ok_or(HintErrorKind::CallStackUnderflow)?;
        self.len -= 1;
        Ok(record)
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}
