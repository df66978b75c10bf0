//! Decoding and classification of TrueType bytecode.

use super::error::HintErrorKind;

/// Type alias for a raw TrueType opcode byte.
pub type Opcode = u8;

/// Describes the source of a bytecode program.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[repr(u8)]
pub enum Program {
    /// Establishes the function and instruction definitions; stored
    /// in the `fpgm` table.
    #[default]
    Font = 0,
    /// Prepares the CVT and storage area for the selected size; stored in
    /// the `prep` table.
    ControlValue = 1,
    /// Per-glyph instructions embedded in the `glyf` table.
    Glyph = 2,
}

/// Returns the mnemonic for the given opcode.
pub(crate) fn opcode_name(opcode: Opcode) -> &'static str {
    NAME_TABLE[opcode as usize]
}

/// Returns the `(pop, push)` stack arity declared for the given opcode.
///
/// Instructions with data-dependent arity (NPUSHB, DELTAP, ...) declare
/// only the fixed portion here; the remainder goes through the value
/// stack's own policy.
pub(crate) fn stack_arity(opcode: Opcode) -> (usize, usize) {
    let (pop, push) = POP_PUSH_TABLE[opcode as usize];
    (pop as usize, push as usize)
}

/// Returns the encoded length of an instruction in bytes, counting the
/// opcode itself.
///
/// NPUSHB and NPUSHW encode their length in the byte after the opcode;
/// for those this returns the negated size of a single operand instead.
fn instruction_len(opcode: Opcode) -> i32 {
    use opcodes::*;
    match opcode {
        NPUSHB => -1,
        NPUSHW => -2,
        PUSHB000..=PUSHB111 => 2 + (opcode - PUSHB000) as i32,
        PUSHW000..=PUSHW111 => 3 + 2 * (opcode - PUSHW000) as i32,
        _ => 1,
    }
}

/// A single decoded instruction plus any inline push data.
#[derive(Copy, Clone, Debug)]
pub struct Instruction<'a> {
    /// Program the instruction was decoded from.
    pub program: Program,
    /// Raw opcode value.
    pub opcode: Opcode,
    /// Immediate operands encoded directly in the instruction stream.
    pub inline_operands: InlineOperands<'a>,
    /// Offset into the bytecode where this instruction was decoded.
    pub pc: usize,
}

impl Instruction<'_> {
    /// Mnemonic for this instruction's opcode.
    pub fn name(&self) -> &'static str {
        opcode_name(self.opcode)
    }
}

/// Sequence of immediate operands for a push instruction.
#[derive(Copy, Clone, Default, Debug)]
pub struct InlineOperands<'a> {
    raw: &'a [u8],
    is_words: bool,
    count: u8,
}

impl<'a> InlineOperands<'a> {
    /// Returns the number of operands.
    pub fn len(&self) -> usize {
        self.count as usize
    }

    /// Returns true if there are no operands.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns an iterator over the operand values, sign extending words.
    pub fn values(&self) -> impl Iterator<Item = i32> + 'a + Clone {
        let (bytes, words) = if self.is_words {
            (&[][..], self.raw)
        } else {
            (self.raw, &[][..])
        };
        let bytes = bytes.iter().map(|byte| *byte as u32 as i32);
        let words = words
            .chunks_exact(2)
            .map(|chunk| i16::from_be_bytes([chunk[0], chunk[1]]) as i32);
        bytes.chain(words)
    }
}

/// Decoder for a TrueType bytecode stream.
///
/// Shared between the dispatch loop and the IF/ELSE/FDEF skip scanners so
/// the variable length opcode logic lives in exactly one place.
#[derive(Copy, Clone)]
pub struct Decoder<'a> {
    /// The type of program.
    pub program: Program,
    /// Bytes being decoded.
    pub bytecode: &'a [u8],
    /// The current offset into the bytecode.
    pub pc: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(program: Program, bytecode: &'a [u8], pc: usize) -> Self {
        Self {
            program,
            bytecode,
            pc,
        }
    }

    /// Decodes the next instruction, returning `None` at the end of the
    /// bytecode stream.
    pub fn maybe_next(&mut self) -> Option<Result<Instruction<'a>, HintErrorKind>> {
        Some(self.next_inner(*self.bytecode.get(self.pc)?))
    }

    /// Decodes the next instruction, failing at the end of the bytecode
    /// stream.
    pub fn next(&mut self) -> Result<Instruction<'a>, HintErrorKind> {
        let opcode = *self
            .bytecode
            .get(self.pc)
            .ok_or(HintErrorKind::UnexpectedEndOfBytecode)?;
        self.next_inner(opcode)
    }

    fn next_inner(&mut self, opcode: Opcode) -> Result<Instruction<'a>, HintErrorKind> {
        let pc = self.pc;
        let mut operands_start = pc + 1;
        let operand_bytes = match instruction_len(opcode) {
            len if len < 0 => {
                // the byte after an NPUSHB/NPUSHW opcode is the operand count
                let count = *self
                    .bytecode
                    .get(operands_start)
                    .ok_or(HintErrorKind::UnexpectedEndOfBytecode)?;
                operands_start += 1;
                count as usize * len.unsigned_abs() as usize
            }
            len => len as usize - 1,
        };
        let mut inline_operands = InlineOperands::default();
        if operand_bytes > 0 {
            let raw = self
                .bytecode
                .get(operands_start..operands_start + operand_bytes)
                .ok_or(HintErrorKind::UnexpectedEndOfBytecode)?;
            let is_words = opcode == opcodes::NPUSHW
                || (opcodes::PUSHW000..=opcodes::PUSHW111).contains(&opcode);
            let count = if is_words {
                operand_bytes / 2
            } else {
                operand_bytes
            };
            inline_operands = InlineOperands {
                raw,
                is_words,
                count: count as u8,
            };
        }
        self.pc = operands_start + operand_bytes;
        Ok(Instruction {
            program: self.program,
            pc,
            opcode,
            inline_operands,
        })
    }
}

/// Opcode constants for every named instruction.
pub mod opcodes {
    use super::Opcode;

    pub const SVTCA0: Opcode = 0x00;
    pub const SFVTCA1: Opcode = 0x05;
    pub const SPVTL0: Opcode = 0x06;
    pub const SPVTL1: Opcode = 0x07;
    pub const SFVTL1: Opcode = 0x09;
    pub const SPVFS: Opcode = 0x0A;
    pub const SFVFS: Opcode = 0x0B;
    pub const GPV: Opcode = 0x0C;
    pub const GFV: Opcode = 0x0D;
    pub const SFVTPV: Opcode = 0x0E;
    pub const ISECT: Opcode = 0x0F;
    pub const SRP0: Opcode = 0x10;
    pub const SRP1: Opcode = 0x11;
    pub const SRP2: Opcode = 0x12;
    pub const SZP0: Opcode = 0x13;
    pub const SZP1: Opcode = 0x14;
    pub const SZP2: Opcode = 0x15;
    pub const SZPS: Opcode = 0x16;
    pub const SLOOP: Opcode = 0x17;
    pub const RTG: Opcode = 0x18;
    pub const RTHG: Opcode = 0x19;
    pub const SMD: Opcode = 0x1A;
    pub const ELSE: Opcode = 0x1B;
    pub const JMPR: Opcode = 0x1C;
    pub const SCVTCI: Opcode = 0x1D;
    pub const SSWCI: Opcode = 0x1E;
    pub const SSW: Opcode = 0x1F;
    pub const DUP: Opcode = 0x20;
    pub const POP: Opcode = 0x21;
    pub const CLEAR: Opcode = 0x22;
    pub const SWAP: Opcode = 0x23;
    pub const DEPTH: Opcode = 0x24;
    pub const CINDEX: Opcode = 0x25;
    pub const MINDEX: Opcode = 0x26;
    pub const ALIGNPTS: Opcode = 0x27;
    pub const UTP: Opcode = 0x29;
    pub const LOOPCALL: Opcode = 0x2A;
    pub const CALL: Opcode = 0x2B;
    pub const FDEF: Opcode = 0x2C;
    pub const ENDF: Opcode = 0x2D;
    pub const MDAP0: Opcode = 0x2E;
    pub const MDAP1: Opcode = 0x2F;
    pub const IUP0: Opcode = 0x30;
    pub const IUP1: Opcode = 0x31;
    pub const SHP0: Opcode = 0x32;
    pub const SHP1: Opcode = 0x33;
    pub const SHC0: Opcode = 0x34;
    pub const SHC1: Opcode = 0x35;
    pub const SHZ0: Opcode = 0x36;
    pub const SHZ1: Opcode = 0x37;
    pub const SHPIX: Opcode = 0x38;
    pub const IP: Opcode = 0x39;
    pub const MSIRP0: Opcode = 0x3A;
    pub const MSIRP1: Opcode = 0x3B;
    pub const ALIGNRP: Opcode = 0x3C;
    pub const RTDG: Opcode = 0x3D;
    pub const MIAP0: Opcode = 0x3E;
    pub const MIAP1: Opcode = 0x3F;
    pub const NPUSHB: Opcode = 0x40;
    pub const NPUSHW: Opcode = 0x41;
    pub const WS: Opcode = 0x42;
    pub const RS: Opcode = 0x43;
    pub const WCVTP: Opcode = 0x44;
    pub const RCVT: Opcode = 0x45;
    pub const GC0: Opcode = 0x46;
    pub const GC1: Opcode = 0x47;
    pub const SCFS: Opcode = 0x48;
    pub const MD0: Opcode = 0x49;
    pub const MD1: Opcode = 0x4A;
    pub const MPPEM: Opcode = 0x4B;
    pub const MPS: Opcode = 0x4C;
    pub const FLIPON: Opcode = 0x4D;
    pub const FLIPOFF: Opcode = 0x4E;
    pub const DEBUG: Opcode = 0x4F;
    pub const LT: Opcode = 0x50;
    pub const LTEQ: Opcode = 0x51;
    pub const GT: Opcode = 0x52;
    pub const GTEQ: Opcode = 0x53;
    pub const EQ: Opcode = 0x54;
    pub const NEQ: Opcode = 0x55;
    pub const ODD: Opcode = 0x56;
    pub const EVEN: Opcode = 0x57;
    pub const IF: Opcode = 0x58;
    pub const EIF: Opcode = 0x59;
    pub const AND: Opcode = 0x5A;
    pub const OR: Opcode = 0x5B;
    pub const NOT: Opcode = 0x5C;
    pub const DELTAP1: Opcode = 0x5D;
    pub const SDB: Opcode = 0x5E;
    pub const SDS: Opcode = 0x5F;
    pub const ADD: Opcode = 0x60;
    pub const SUB: Opcode = 0x61;
    pub const DIV: Opcode = 0x62;
    pub const MUL: Opcode = 0x63;
    pub const ABS: Opcode = 0x64;
    pub const NEG: Opcode = 0x65;
    pub const FLOOR: Opcode = 0x66;
    pub const CEILING: Opcode = 0x67;
    pub const ROUND00: Opcode = 0x68;
    pub const ROUND11: Opcode = 0x6B;
    pub const NROUND00: Opcode = 0x6C;
    pub const NROUND11: Opcode = 0x6F;
    pub const WCVTF: Opcode = 0x70;
    pub const DELTAP2: Opcode = 0x71;
    pub const DELTAP3: Opcode = 0x72;
    pub const DELTAC1: Opcode = 0x73;
    pub const DELTAC2: Opcode = 0x74;
    pub const DELTAC3: Opcode = 0x75;
    pub const SROUND: Opcode = 0x76;
    pub const S45ROUND: Opcode = 0x77;
    pub const JROT: Opcode = 0x78;
    pub const JROF: Opcode = 0x79;
    pub const ROFF: Opcode = 0x7A;
    pub const RUTG: Opcode = 0x7C;
    pub const RDTG: Opcode = 0x7D;
    pub const SANGW: Opcode = 0x7E;
    pub const AA: Opcode = 0x7F;
    pub const FLIPPT: Opcode = 0x80;
    pub const FLIPRGON: Opcode = 0x81;
    pub const FLIPRGOFF: Opcode = 0x82;
    pub const SCANCTRL: Opcode = 0x85;
    pub const SDPVTL0: Opcode = 0x86;
    pub const SDPVTL1: Opcode = 0x87;
    pub const GETINFO: Opcode = 0x88;
    pub const IDEF: Opcode = 0x89;
    pub const ROLL: Opcode = 0x8A;
    pub const MAX: Opcode = 0x8B;
    pub const MIN: Opcode = 0x8C;
    pub const SCANTYPE: Opcode = 0x8D;
    pub const INSTCTRL: Opcode = 0x8E;
    pub const PUSHB000: Opcode = 0xB0;
    pub const PUSHB111: Opcode = 0xB7;
    pub const PUSHW000: Opcode = 0xB8;
    pub const PUSHW111: Opcode = 0xBF;
    pub const MDRP00000: Opcode = 0xC0;
    pub const MDRP11111: Opcode = 0xDF;
    pub const MIRP00000: Opcode = 0xE0;
    pub const MIRP11111: Opcode = 0xFF;
}

/// Declared stack arity as `(pop, push)` pairs, indexed by opcode.
#[rustfmt::skip]
const POP_PUSH_TABLE: [(u8, u8); 256] = [
    (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (2, 0), (2, 0), // 0x00
    (2, 0), (2, 0), (2, 0), (2, 0), (0, 2), (0, 2), (0, 0), (5, 0), // 0x08
    (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), // 0x10
    (0, 0), (0, 0), (1, 0), (0, 0), (1, 0), (1, 0), (1, 0), (1, 0), // 0x18
    (1, 2), (1, 0), (0, 0), (2, 2), (0, 1), (1, 1), (1, 0), (2, 0), // 0x20
    (0, 0), (1, 0), (2, 0), (1, 0), (1, 0), (0, 0), (1, 0), (1, 0), // 0x28
    (0, 0), (0, 0), (0, 0), (0, 0), (1, 0), (1, 0), (1, 0), (1, 0), // 0x30
    (1, 0), (0, 0), (2, 0), (2, 0), (0, 0), (0, 0), (2, 0), (2, 0), // 0x38
    (0, 0), (0, 0), (2, 0), (1, 1), (2, 0), (1, 1), (1, 1), (1, 1), // 0x40
    (2, 0), (2, 1), (2, 1), (0, 1), (0, 1), (0, 0), (0, 0), (1, 0), // 0x48
    (2, 1), (2, 1), (2, 1), (2, 1), (2, 1), (2, 1), (1, 1), (1, 1), // 0x50
    (1, 0), (0, 0), (2, 1), (2, 1), (1, 1), (1, 0), (1, 0), (1, 0), // 0x58
    (2, 1), (2, 1), (2, 1), (2, 1), (1, 1), (1, 1), (1, 1), (1, 1), // 0x60
    (1, 1), (1, 1), (1, 1), (1, 1), (1, 1), (1, 1), (1, 1), (1, 1), // 0x68
    (2, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), // 0x70
    (2, 0), (2, 0), (0, 0), (0, 0), (0, 0), (0, 0), (1, 0), (1, 0), // 0x78
    (0, 0), (2, 0), (2, 0), (0, 0), (0, 0), (1, 0), (2, 0), (2, 0), // 0x80
    (1, 1), (1, 0), (3, 3), (2, 1), (2, 1), (1, 0), (2, 0), (0, 0), // 0x88
    (0, 0), (0, 0), (0, 1), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), // 0x90
    (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), // 0x98
    (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), // 0xA0
    (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), // 0xA8
    (0, 1), (0, 2), (0, 3), (0, 4), (0, 5), (0, 6), (0, 7), (0, 8), // 0xB0
    (0, 1), (0, 2), (0, 3), (0, 4), (0, 5), (0, 6), (0, 7), (0, 8), // 0xB8
    (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), // 0xC0
    (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), // 0xC8
    (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), // 0xD0
    (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), (1, 0), // 0xD8
    (2, 0), (2, 0), (2, 0), (2, 0), (2, 0), (2, 0), (2, 0), (2, 0), // 0xE0
    (2, 0), (2, 0), (2, 0), (2, 0), (2, 0), (2, 0), (2, 0), (2, 0), // 0xE8
    (2, 0), (2, 0), (2, 0), (2, 0), (2, 0), (2, 0), (2, 0), (2, 0), // 0xF0
    (2, 0), (2, 0), (2, 0), (2, 0), (2, 0), (2, 0), (2, 0), (2, 0), // 0xF8
];

/// Instruction mnemonics, indexed by opcode.
///
/// Unassigned opcodes get an OPxx placeholder so error messages always
/// have something to print.
#[rustfmt::skip]
const NAME_TABLE: [&str; 256] = [
    "SVTCA0", "SVTCA1", "SPVTCA0", "SPVTCA1", "SFVTCA0", "SFVTCA1", "SPVTL0", "SPVTL1", // 0x00
    "SFVTL0", "SFVTL1", "SPVFS", "SFVFS", "GPV", "GFV", "SFVTPV", "ISECT", // 0x08
    "SRP0", "SRP1", "SRP2", "SZP0", "SZP1", "SZP2", "SZPS", "SLOOP", // 0x10
    "RTG", "RTHG", "SMD", "ELSE", "JMPR", "SCVTCI", "SSWCI", "SSW", // 0x18
    "DUP", "POP", "CLEAR", "SWAP", "DEPTH", "CINDEX", "MINDEX", "ALIGNPTS", // 0x20
    "OP28", "UTP", "LOOPCALL", "CALL", "FDEF", "ENDF", "MDAP0", "MDAP1", // 0x28
    "IUP0", "IUP1", "SHP0", "SHP1", "SHC0", "SHC1", "SHZ0", "SHZ1", // 0x30
    "SHPIX", "IP", "MSIRP0", "MSIRP1", "ALIGNRP", "RTDG", "MIAP0", "MIAP1", // 0x38
    "NPUSHB", "NPUSHW", "WS", "RS", "WCVTP", "RCVT", "GC0", "GC1", // 0x40
    "SCFS", "MD0", "MD1", "MPPEM", "MPS", "FLIPON", "FLIPOFF", "DEBUG", // 0x48
    "LT", "LTEQ", "GT", "GTEQ", "EQ", "NEQ", "ODD", "EVEN", // 0x50
    "IF", "EIF", "AND", "OR", "NOT", "DELTAP1", "SDB", "SDS", // 0x58
    "ADD", "SUB", "DIV", "MUL", "ABS", "NEG", "FLOOR", "CEILING", // 0x60
    "ROUND00", "ROUND01", "ROUND10", "ROUND11", "NROUND00", "NROUND01", "NROUND10", "NROUND11", // 0x68
    "WCVTF", "DELTAP2", "DELTAP3", "DELTAC1", "DELTAC2", "DELTAC3", "SROUND", "S45ROUND", // 0x70
    "JROT", "JROF", "ROFF", "OP7B", "RUTG", "RDTG", "SANGW", "AA", // 0x78
    "FLIPPT", "FLIPRGON", "FLIPRGOFF", "OP83", "OP84", "SCANCTRL", "SDPVTL0", "SDPVTL1", // 0x80
    "GETINFO", "IDEF", "ROLL", "MAX", "MIN", "SCANTYPE", "INSTCTRL", "OP8F", // 0x88
    "OP90", "OP91", "OP92", "OP93", "OP94", "OP95", "OP96", "OP97", // 0x90
    "OP98", "OP99", "OP9A", "OP9B", "OP9C", "OP9D", "OP9E", "OP9F", // 0x98
    "OPA0", "OPA1", "OPA2", "OPA3", "OPA4", "OPA5", "OPA6", "OPA7", // 0xA0
    "OPA8", "OPA9", "OPAA", "OPAB", "OPAC", "OPAD", "OPAE", "OPAF", // 0xA8
    "PUSHB000", "PUSHB001", "PUSHB010", "PUSHB011", "PUSHB100", "PUSHB101", "PUSHB110", "PUSHB111", // 0xB0
    "PUSHW000", "PUSHW001", "PUSHW010", "PUSHW011", "PUSHW100", "PUSHW101", "PUSHW110", "PUSHW111", // 0xB8
    "MDRP00000", "MDRP00001", "MDRP00010", "MDRP00011", "MDRP00100", "MDRP00101", "MDRP00110", "MDRP00111", // 0xC0
    "MDRP01000", "MDRP01001", "MDRP01010", "MDRP01011", "MDRP01100", "MDRP01101", "MDRP01110", "MDRP01111", // 0xC8
    "MDRP10000", "MDRP10001", "MDRP10010", "MDRP10011", "MDRP10100", "MDRP10101", "MDRP10110", "MDRP10111", // 0xD0
    "MDRP11000", "MDRP11001", "MDRP11010", "MDRP11011", "MDRP11100", "MDRP11101", "MDRP11110", "MDRP11111", // 0xD8
    "MIRP00000", "MIRP00001", "MIRP00010", "MIRP00011", "MIRP00100", "MIRP00101", "MIRP00110", "MIRP00111", // 0xE0
    "MIRP01000", "MIRP01001", "MIRP01010", "MIRP01011", "MIRP01100", "MIRP01101", "MIRP01110", "MIRP01111", // 0xE8
    "MIRP10000", "MIRP10001", "MIRP10010", "MIRP10011", "MIRP10100", "MIRP10101", "MIRP10110", "MIRP10111", // 0xF0
    "MIRP11000", "MIRP11001", "MIRP11010", "MIRP11011", "MIRP11100", "MIRP11101", "MIRP11110", "MIRP11111", // 0xF8
];

#[cfg(test)]
pub(crate) struct MockInlineOperands {
    bytes: Vec<u8>,
    is_words: bool,
}

#[cfg(test)]
impl MockInlineOperands {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.into(),
            is_words: false,
        }
    }

    pub fn from_words(words: &[i16]) -> Self {
        Self {
            bytes: words
                .iter()
                .flat_map(|word| (*word as u16).to_be_bytes())
                .collect(),
            is_words: true,
        }
    }

    pub fn operands(&self) -> InlineOperands {
        let count = if self.is_words {
            self.bytes.len() / 2
        } else {
            self.bytes.len()
        };
        InlineOperands {
            raw: &self.bytes,
            is_words: self.is_words,
            count: count as u8,
        }
    }
}
