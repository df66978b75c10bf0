//! The decode/dispatch loop at the heart of the interpreter.

use super::{
    super::{
        bytecode::{opcodes as op, stack_arity, Instruction, Program},
        error::{HintError, HintErrorKind},
    },
    Engine, OpResult,
};

/// Maximum number of instructions executed in a single run of the
/// interpreter.
///
/// Bounds execution of malformed or malicious programs that would
/// otherwise loop forever.
pub const MAX_RUN_INSTRUCTIONS: usize = 1_000_000;

impl<'a> Engine<'a> {
    /// Resets state and runs the given program to completion.
    pub fn run_program(&mut self, program: Program, is_pedantic: bool) -> Result<(), HintError> {
        self.reset(program, is_pedantic);
        self.run()
    }

    fn reset(&mut self, program: Program, is_pedantic: bool) {
        self.program.reset(program);
        self.graphics.reset();
        self.graphics.is_pedantic = is_pedantic;
        self.value_stack.is_pedantic = is_pedantic;
        self.value_stack.clear();
        match program {
            Program::Font => {
                // A new font program invalidates all prior definitions.
                self.definitions.functions.reset();
                self.definitions.instructions.reset();
            }
            Program::ControlValue => {}
            Program::Glyph => {
                if self.graphics.instruct_control & 2 != 0 {
                    self.graphics.reset_retained();
                }
            }
        }
    }

    /// Decodes and dispatches instructions until the end of the current
    /// program is reached or an error occurs.
    fn run(&mut self) -> Result<(), HintError> {
        let mut count = 0usize;
        while let Some(decoded) = self.program.decoder.maybe_next() {
            let ins = decoded.map_err(|kind| self.error_at_pc(kind))?;
            if count == MAX_RUN_INSTRUCTIONS {
                return Err(HintError {
                    program: self.program.current,
                    glyph_id: None,
                    pc: ins.pc,
                    opcode: Some(ins.opcode),
                    kind: HintErrorKind::ExceededExecutionBudget,
                });
            }
            count += 1;
            self.dispatch(&ins).map_err(|kind| HintError {
                program: self.program.current,
                glyph_id: None,
                pc: ins.pc,
                opcode: Some(ins.opcode),
                kind,
            })?;
        }
        if !self.program.call_stack.is_empty() {
            // Ran off the end of the bytecode with open call records which
            // means a function or instruction definition is missing ENDF.
            return Err(self.error_at_pc(HintErrorKind::UnexpectedEndOfBytecode));
        }
        Ok(())
    }

    fn error_at_pc(&self, kind: HintErrorKind) -> HintError {
        HintError {
            program: self.program.current,
            glyph_id: None,
            pc: self.program.decoder.pc,
            opcode: None,
            kind,
        }
    }

    fn dispatch(&mut self, ins: &Instruction) -> OpResult {
        // Arity declared for the opcode is enforced up front in both
        // lenient and pedantic modes. Instructions with data dependent
        // operand counts declare only their fixed portion.
        let (pop_count, _) = stack_arity(ins.opcode);
        if self.value_stack.len() < pop_count {
            return Err(HintErrorKind::ValueStackUnderflow);
        }
        self.dispatch_inner(ins)
    }

    fn dispatch_inner(&mut self, ins: &Instruction) -> OpResult {
        let opcode = ins.opcode;
        match opcode {
            op::SVTCA0..=op::SFVTCA1 => self.op_svtca(opcode),
            op::SPVTL0..=op::SFVTL1 => self.op_svtl(opcode),
            op::SPVFS => self.op_spvfs(),
            op::SFVFS => self.op_sfvfs(),
            op::GPV => self.op_gpv(),
            op::GFV => self.op_gfv(),
            op::SFVTPV => self.op_sfvtpv(),
            op::ISECT => self.op_isect(),
            op::SRP0 => self.op_srp0(),
            op::SRP1 => self.op_srp1(),
            op::SRP2 => self.op_srp2(),
            op::SZP0 => self.op_szp0(),
            op::SZP1 => self.op_szp1(),
            op::SZP2 => self.op_szp2(),
            op::SZPS => self.op_szps(),
            op::SLOOP => self.op_sloop(),
            op::RTG => self.op_rtg(),
            op::RTHG => self.op_rthg(),
            op::SMD => self.op_smd(),
            op::ELSE => self.op_else(),
            op::JMPR => self.op_jmpr(),
            op::SCVTCI => self.op_scvtci(),
            op::SSWCI => self.op_sswci(),
            op::SSW => self.op_ssw(),
            op::DUP => self.op_dup(),
            op::POP => self.op_pop(),
            op::CLEAR => self.op_clear(),
            op::SWAP => self.op_swap(),
            op::DEPTH => self.op_depth(),
            op::CINDEX => self.op_cindex(),
            op::MINDEX => self.op_mindex(),
            op::ALIGNPTS => self.op_alignpts(),
            op::UTP => self.op_utp(),
            op::LOOPCALL => self.op_loopcall(),
            op::CALL => self.op_call(),
            op::FDEF => self.op_fdef(),
            op::ENDF => self.op_endf(),
            op::MDAP0 | op::MDAP1 => self.op_mdap(opcode),
            op::IUP0 | op::IUP1 => self.op_iup(opcode),
            op::SHP0 | op::SHP1 => self.op_shp(opcode),
            op::SHC0 | op::SHC1 => self.op_shc(opcode),
            op::SHZ0 | op::SHZ1 => self.op_shz(opcode),
            op::SHPIX => self.op_shpix(),
            op::IP => self.op_ip(),
            op::MSIRP0 | op::MSIRP1 => self.op_msirp(opcode),
            op::ALIGNRP => self.op_alignrp(),
            op::RTDG => self.op_rtdg(),
            op::MIAP0 | op::MIAP1 => self.op_miap(opcode),
            op::NPUSHB..=op::NPUSHW => self.op_push(&ins.inline_operands),
            op::WS => self.op_ws(),
            op::RS => self.op_rs(),
            op::WCVTP => self.op_wcvtp(),
            op::RCVT => self.op_rcvt(),
            op::GC0 | op::GC1 => self.op_gc(opcode),
            op::SCFS => self.op_scfs(),
            op::MD0 | op::MD1 => self.op_md(opcode),
            op::MPPEM => self.op_mppem(),
            op::MPS => self.op_mps(),
            op::FLIPON => self.op_flipon(),
            op::FLIPOFF => self.op_flipoff(),
            op::DEBUG => self.op_debug(),
            op::LT => self.op_lt(),
            op::LTEQ => self.op_lteq(),
            op::GT => self.op_gt(),
            op::GTEQ => self.op_gteq(),
            op::EQ => self.op_eq(),
            op::NEQ => self.op_neq(),
            op::ODD => self.op_odd(),
            op::EVEN => self.op_even(),
            op::IF => self.op_if(),
            op::EIF => self.op_eif(),
            op::AND => self.op_and(),
            op::OR => self.op_or(),
            op::NOT => self.op_not(),
            op::DELTAP1 | op::DELTAP2 | op::DELTAP3 => self.op_deltap(opcode),
            op::SDB => self.op_sdb(),
            op::SDS => self.op_sds(),
            op::ADD => self.op_add(),
            op::SUB => self.op_sub(),
            op::DIV => self.op_div(),
            op::MUL => self.op_mul(),
            op::ABS => self.op_abs(),
            op::NEG => self.op_neg(),
            op::FLOOR => self.op_floor(),
            op::CEILING => self.op_ceiling(),
            op::ROUND00..=op::ROUND11 => self.op_round(),
            op::NROUND00..=op::NROUND11 => self.op_nround(),
            op::WCVTF => self.op_wcvtf(),
            op::DELTAC1..=op::DELTAC3 => self.op_deltac(opcode),
            op::SROUND => self.op_sround(),
            op::S45ROUND => self.op_s45round(),
            op::JROT => self.op_jrot(),
            op::JROF => self.op_jrof(),
            op::ROFF => self.op_roff(),
            op::RUTG => self.op_rutg(),
            op::RDTG => self.op_rdtg(),
            op::SANGW => self.op_sangw(),
            op::AA => self.op_aa(),
            op::FLIPPT => self.op_flippt(),
            op::FLIPRGON => self.op_fliprgon(),
            op::FLIPRGOFF => self.op_fliprgoff(),
            op::SCANCTRL => self.op_scanctrl(),
            op::SDPVTL0 | op::SDPVTL1 => self.op_sdpvtl(opcode),
            op::GETINFO => self.op_getinfo(),
            op::IDEF => self.op_idef(),
            op::ROLL => self.op_roll(),
            op::MAX => self.op_max(),
            op::MIN => self.op_min(),
            op::SCANTYPE => self.op_scantype(),
            op::INSTCTRL => self.op_instctrl(),
            op::PUSHB000..=op::PUSHW111 => self.op_push(&ins.inline_operands),
            op::MDRP00000..=op::MDRP11111 => self.op_mdrp(opcode),
            op::MIRP00000..=op::MIRP11111 => self.op_mirp(opcode),
            _ => self.op_unknown(opcode),
        }
    }
}
