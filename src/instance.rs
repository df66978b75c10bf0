//! Per-size hinting state shared across glyph runs.

use super::{
    bytecode::Program,
    cow_slice::CowSlice,
    definition::{Definition, DefinitionMap},
    engine::{Definitions, Engine},
    error::HintError,
    graphics::{GraphicsState, RetainedGraphicsState},
    math,
    point::PointFlags,
    program::ProgramState,
    value_stack::ValueStack,
    zone::Zone,
};
use font_types::{F26Dot6, Point};

/// Hinting programs and limits for a font.
///
/// All of the fields are available directly from the corresponding font
/// tables: the `fpgm` and `prep` tables supply the two shared programs,
/// `cvt ` supplies the unscaled control values and the limits are taken
/// from `maxp`.
#[derive(Copy, Clone, Default, Debug)]
pub struct FontPrograms<'a> {
    /// Font program, executed once per instance.
    pub fpgm: &'a [u8],
    /// Control value program, executed when scale or ppem change.
    pub prep: &'a [u8],
    /// Unscaled control values in font units.
    pub cvt: &'a [i16],
    pub max_function_defs: u16,
    pub max_instruction_defs: u16,
    pub max_stack_elements: u16,
    pub max_storage: u16,
    pub max_twilight_points: u16,
}

/// Settings that modify execution of the hinting programs.
#[derive(Copy, Clone, Default, Debug)]
pub struct HintOptions {
    /// If true, out of bounds references to points, control values and
    /// storage are hard errors rather than being ignored.
    pub is_pedantic: bool,
    /// True if a rotation is applied to glyphs. Reported by GETINFO.
    pub is_rotated: bool,
    /// True if a non-uniform scale is applied to glyphs. Reported by
    /// GETINFO.
    pub is_stretched: bool,
}

/// Glyph outline data that is passed to the hinter.
pub struct HintOutline<'a> {
    pub glyph_id: u16,
    /// Outline points in font units.
    pub unscaled: &'a [Point<i32>],
    /// Scaled outline points. These are modified in place.
    pub scaled: &'a mut [Point<F26Dot6>],
    /// Copy of the scaled points prior to hinting.
    pub original_scaled: &'a mut [Point<F26Dot6>],
    pub flags: &'a mut [PointFlags],
    pub contours: &'a [u16],
    /// Instructions for this glyph from the `glyf` table.
    pub bytecode: &'a [u8],
    pub is_composite: bool,
}

/// State for a hinted font instance at a particular scale.
///
/// Created by running the font and control value programs. The captured
/// state is then applied to each glyph program run.
#[derive(Clone, Default)]
pub struct HintInstance {
    functions: Vec<Definition>,
    instructions: Vec<Definition>,
    cvt: Vec<i32>,
    storage: Vec<i32>,
    graphics: RetainedGraphicsState,
    twilight_scaled: Vec<Point<F26Dot6>>,
    twilight_original_scaled: Vec<Point<F26Dot6>>,
    twilight_flags: Vec<PointFlags>,
    max_stack: usize,
    is_pedantic: bool,
}

impl HintInstance {
    /// Prepares the instance for hinting at the given scale and ppem.
    ///
    /// Captures limits, scales the control value table and runs the font
    /// and control value programs. The scale is a 16.16 factor that
    /// converts font units to 26.6 pixels.
    pub fn reconfigure(
        &mut self,
        font: &FontPrograms,
        scale: i32,
        ppem: i32,
        options: HintOptions,
    ) -> Result<(), HintError> {
        self.setup(font, scale, ppem, &options);
        let twilight_contours = [self.twilight_scaled.len() as u16];
        let twilight = Zone::new(
            &[],
            &mut self.twilight_original_scaled,
            &mut self.twilight_scaled,
            &mut self.twilight_flags,
            &twilight_contours,
        );
        let glyph = Zone::default();
        let mut graphics = GraphicsState {
            retained: self.graphics,
            zones: [twilight, glyph],
            ..Default::default()
        };
        graphics.update_projection_state();
        let mut stack_buf = vec![0; self.max_stack];
        let value_stack = ValueStack::new(&mut stack_buf, self.is_pedantic);
        let mut engine = Engine {
            program: ProgramState::new(font.fpgm, font.prep, &[], Program::Font),
            graphics,
            value_stack,
            definitions: Definitions {
                functions: DefinitionMap::Mut(&mut self.functions),
                instructions: DefinitionMap::Mut(&mut self.instructions),
            },
            cvt: CowSlice::new_mut(&mut self.cvt).into(),
            storage: CowSlice::new_mut(&mut self.storage).into(),
        };
        engine.run_program(Program::Font, self.is_pedantic)?;
        engine.run_program(Program::ControlValue, self.is_pedantic)?;
        // Writes to the graphics state from the control value program are
        // applied to all subsequent glyph program runs.
        self.graphics = engine.graphics.retained;
        Ok(())
    }

    /// Returns true if hinting should actually be applied.
    ///
    /// The control value program can disable hinting entirely.
    pub fn is_enabled(&self) -> bool {
        self.graphics.instruct_control & 1 == 0
    }

    /// Runs the glyph program against the given outline.
    pub fn hint(&self, font: &FontPrograms, outline: &mut HintOutline) -> Result<(), HintError> {
        if !self.is_enabled() {
            return Ok(());
        }
        // Seed the twilight zone from the copy captured by the control
        // value program.
        let mut twilight_scaled = self.twilight_scaled.clone();
        let mut twilight_original_scaled = self.twilight_original_scaled.clone();
        let mut twilight_flags = self.twilight_flags.clone();
        let twilight_contours = [twilight_scaled.len() as u16];
        let twilight = Zone::new(
            &[],
            &mut twilight_original_scaled,
            &mut twilight_scaled,
            &mut twilight_flags,
            &twilight_contours,
        );
        let glyph = Zone::new(
            outline.unscaled,
            outline.original_scaled,
            outline.scaled,
            outline.flags,
            outline.contours,
        );
        let mut graphics = GraphicsState {
            retained: self.graphics,
            zones: [twilight, glyph],
            is_composite: outline.is_composite,
            ..Default::default()
        };
        graphics.update_projection_state();
        let mut stack_buf = vec![0; self.max_stack];
        let value_stack = ValueStack::new(&mut stack_buf, self.is_pedantic);
        // Glyph programs are not allowed to modify the control value table
        // or storage area that is shared across glyphs so wrap those in
        // copy-on-write views.
        let mut cvt_scratch = vec![0; self.cvt.len()];
        let mut storage_scratch = vec![0; self.storage.len()];
        let mut engine = Engine {
            program: ProgramState::new(font.fpgm, font.prep, outline.bytecode, Program::Glyph),
            graphics,
            value_stack,
            definitions: Definitions {
                functions: DefinitionMap::Ref(&self.functions),
                instructions: DefinitionMap::Ref(&self.instructions),
            },
            cvt: CowSlice::new(&self.cvt, &mut cvt_scratch).into(),
            storage: CowSlice::new(&self.storage, &mut storage_scratch).into(),
        };
        engine
            .run_program(Program::Glyph, self.is_pedantic)
            .map_err(|mut e| {
                e.glyph_id = Some(outline.glyph_id);
                e
            })
    }

    /// Captures limits, resizes buffers and scales the control values.
    fn setup(&mut self, font: &FontPrograms, scale: i32, ppem: i32, options: &HintOptions) {
        self.functions.clear();
        self.functions
            .resize(font.max_function_defs as usize, Definition::default());
        self.instructions.clear();
        self.instructions
            .resize(font.max_instruction_defs as usize, Definition::default());
        self.cvt.clear();
        // Scale the control values from font units to 26.6 pixels.
        let cvt_scale = scale >> 6;
        self.cvt.extend(
            font.cvt
                .iter()
                .map(|value| math::mul(*value as i32 * 64, cvt_scale)),
        );
        self.storage.clear();
        self.storage.resize(font.max_storage as usize, 0);
        // FreeType reserves space for four phantom points in the twilight
        // zone.
        let max_twilight_points = font.max_twilight_points as usize + 4;
        self.twilight_scaled.clear();
        self.twilight_scaled
            .resize(max_twilight_points, Default::default());
        self.twilight_original_scaled.clear();
        self.twilight_original_scaled
            .resize(max_twilight_points, Default::default());
        self.twilight_flags.clear();
        self.twilight_flags
            .resize(max_twilight_points, Default::default());
        // Some shipped fonts under-declare maxStackElements; FreeType pads
        // the stack by 32 slots and fonts rely on it.
        self.max_stack = font.max_stack_elements as usize + 32;
        self.graphics = RetainedGraphicsState {
            scale,
            ppem,
            is_rotated: options.is_rotated,
            is_stretched: options.is_stretched,
            ..Default::default()
        };
        self.is_pedantic = options.is_pedantic;
    }
}

#[cfg(test)]
mod tests {
    use super::{FontPrograms, HintInstance, HintOptions, HintOutline};
    use crate::{error::HintErrorKind, point::PointFlags};
    use font_types::{F26Dot6, Point};

    fn test_font<'a>() -> FontPrograms<'a> {
        FontPrograms {
            // function 0 pushes 100
            fpgm: &[
                0xB0, 0,    // PUSHB[0] 0
                0x2C, // FDEF
                0xB0, 100,  // PUSHB[0] 100
                0x2D, // ENDF
            ],
            // cvt[0] = 2 pixels
            prep: &[
                0xB1, 0, 128, // PUSHB[1] 0 128
                0x44, // WCVTP
            ],
            cvt: &[64],
            max_function_defs: 4,
            max_instruction_defs: 2,
            max_stack_elements: 16,
            max_storage: 4,
            max_twilight_points: 2,
            ..Default::default()
        }
    }

    #[test]
    fn reconfigure_scales_cvt_and_runs_prep() {
        let font = test_font();
        let mut instance = HintInstance::default();
        // identity scale: one font unit is 1/64th of a pixel
        instance
            .reconfigure(&font, 1 << 16, 12, HintOptions::default())
            .unwrap();
        // prep overwrote the scaled entry
        assert_eq!(instance.cvt, [128]);
        assert!(instance.is_enabled());
    }

    #[test]
    fn hint_moves_points() {
        let font = test_font();
        let mut instance = HintInstance::default();
        instance
            .reconfigure(&font, 1 << 16, 12, HintOptions::default())
            .unwrap();
        let unscaled = [Point::new(50, 0)];
        let mut scaled = [Point::new(F26Dot6::from_bits(100), F26Dot6::ZERO)];
        let mut original_scaled = scaled;
        let mut flags = [PointFlags::on_curve()];
        let mut outline = HintOutline {
            glyph_id: 1,
            unscaled: &unscaled,
            scaled: &mut scaled,
            original_scaled: &mut original_scaled,
            flags: &mut flags,
            contours: &[0],
            // cvt[0]; RCVT; call function 0; ADD; point 0; MDAP[round]
            bytecode: &[
                0xB0, 0,    // PUSHB[0] 0
                0x45, // RCVT
                0xB0, 0,    // PUSHB[0] 0
                0x2B, // CALL
                0x60, // ADD
                0x21, // POP
                0xB0, 0,    // PUSHB[0] 0
                0x2F, // MDAP[1]
            ],
            is_composite: false,
        };
        instance.hint(&font, &mut outline).unwrap();
        // MDAP rounds 100/64 to the nearest pixel
        assert_eq!(scaled[0].x, F26Dot6::from_bits(128));
    }

    #[test]
    fn hint_error_carries_glyph_id() {
        let font = test_font();
        let mut instance = HintInstance::default();
        instance
            .reconfigure(&font, 1 << 16, 12, HintOptions::default())
            .unwrap();
        let unscaled = [Point::new(50, 0)];
        let mut scaled = [Point::default()];
        let mut original_scaled = [Point::default()];
        let mut flags = [PointFlags::on_curve()];
        let mut outline = HintOutline {
            glyph_id: 5,
            unscaled: &unscaled,
            scaled: &mut scaled,
            original_scaled: &mut original_scaled,
            flags: &mut flags,
            contours: &[0],
            bytecode: &[0xB0, 0, 0x4F], // PUSHB[0] 0; DEBUG
            is_composite: false,
        };
        let err = instance.hint(&font, &mut outline).unwrap_err();
        assert_eq!(err.glyph_id, Some(5));
        assert_eq!(err.kind, HintErrorKind::DebugOpcode);
    }

    #[test]
    fn disabled_by_instruct_control() {
        let mut font = test_font();
        // prep sets instruct control bit 0 which disables hinting
        font.prep = &[
            0xB1, 1, 1, // PUSHB[1] 1 1
            0x8E, // INSTCTRL
        ];
        let mut instance = HintInstance::default();
        instance
            .reconfigure(&font, 1 << 16, 12, HintOptions::default())
            .unwrap();
        assert!(!instance.is_enabled());
        let unscaled = [Point::new(50, 0)];
        let mut scaled = [Point::default()];
        let mut original_scaled = [Point::default()];
        let mut flags = [PointFlags::on_curve()];
        let mut outline = HintOutline {
            glyph_id: 0,
            unscaled: &unscaled,
            scaled: &mut scaled,
            original_scaled: &mut original_scaled,
            flags: &mut flags,
            contours: &[0],
            bytecode: &[0x4F], // DEBUG would fail if executed
            is_composite: false,
        };
        instance.hint(&font, &mut outline).unwrap();
    }
}
