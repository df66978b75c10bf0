//! Error types for hinting program execution.

use super::bytecode::{opcode_name, Opcode, Program};
use core::fmt;

/// Errors that may occur while executing hinting instructions.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum HintErrorKind {
    UnexpectedEndOfBytecode,
    UnhandledOpcode(Opcode),
    DefinitionInGlyphProgram,
    NestedDefinition,
    DefinitionTooLarge,
    TooManyDefinitions,
    InvalidDefinition(usize),
    ValueStackOverflow,
    ValueStackUnderflow,
    CallStackOverflow,
    CallStackUnderflow,
    InvalidStackValue(i32),
    InvalidPointIndex(usize),
    InvalidPointRange(usize, usize),
    InvalidContourIndex(usize),
    InvalidCvtIndex(usize),
    InvalidStorageIndex(usize),
    DivideByZero,
    InvalidZoneIndex(i32),
    NegativeLoopCounter,
    InvalidJump,
    ExceededExecutionBudget,
    DebugOpcode,
}

impl fmt::Display for HintErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use HintErrorKind::*;
        match self {
            UnexpectedEndOfBytecode => write!(f, "bytecode ended in the middle of an instruction"),
            UnhandledOpcode(opcode) => {
                write!(f, "no handler or IDEF for opcode {}", opcode_name(*opcode))
            }
            DefinitionInGlyphProgram => {
                write!(f, "FDEF/IDEF is not allowed in a glyph program")
            }
            NestedDefinition => {
                write!(f, "FDEF/IDEF cannot appear inside another definition")
            }
            DefinitionTooLarge => write!(f, "FDEF/IDEF body is larger than the engine supports"),
            TooManyDefinitions => write!(f, "no free slot for a new function or instruction"),
            InvalidDefinition(key) => {
                write!(f, "no function or instruction defined for key {key}")
            }
            ValueStackOverflow => write!(f, "value stack is full"),
            ValueStackUnderflow => write!(f, "value stack is empty"),
            CallStackOverflow => write!(f, "call stack is full"),
            CallStackUnderflow => write!(f, "RETURN/ENDF without an active call"),
            InvalidStackValue(value) => {
                write!(f, "stack value {value} is out of range for this instruction")
            }
            InvalidPointIndex(index) => write!(f, "no point with index {index}"),
            InvalidPointRange(start, end) => {
                write!(f, "point range {start}..{end} exceeds the outline")
            }
            InvalidContourIndex(index) => write!(f, "no contour with index {index}"),
            InvalidCvtIndex(index) => write!(f, "no cvt entry with index {index}"),
            InvalidStorageIndex(index) => write!(f, "no storage slot with index {index}"),
            DivideByZero => write!(f, "division by zero"),
            InvalidZoneIndex(index) => {
                write!(f, "zone must be 0 (twilight) or 1 (glyph), got {index}")
            }
            NegativeLoopCounter => write!(f, "loop counter cannot be negative"),
            InvalidJump => write!(f, "jump target is outside the current program"),
            ExceededExecutionBudget => write!(f, "instruction budget exhausted"),
            DebugOpcode => write!(f, "DEBUG instruction is not supported"),
        }
    }
}

impl std::error::Error for HintErrorKind {}

/// A fatal error during execution of a hinting program.
///
/// Captures the program, optional glyph identifier, program counter and
/// opcode at the failure site along with the underlying error kind.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct HintError {
    pub program: Program,
    pub glyph_id: Option<u16>,
    pub pc: usize,
    pub opcode: Option<Opcode>,
    pub kind: HintErrorKind,
}

impl fmt::Display for HintError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.program {
            Program::Font => write!(f, "fpgm")?,
            Program::ControlValue => write!(f, "prep")?,
            Program::Glyph => match self.glyph_id {
                Some(glyph_id) => write!(f, "glyf[{glyph_id}]")?,
                None => write!(f, "glyf")?,
            },
        }
        match self.opcode {
            Some(opcode) => write!(f, "@{}:{}: {}", self.pc, opcode_name(opcode), self.kind),
            None => write!(f, "@{}: {}", self.pc, self.kind),
        }
    }
}

impl std::error::Error for HintError {}
