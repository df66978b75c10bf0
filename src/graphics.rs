//! Graphics state.

use super::{
    round::RoundState,
    zone::{Zone, ZonePointer},
};
use core::ops::{Deref, DerefMut};
use font_types::{F26Dot6, Point};

/// Axis classification for a measurement or movement vector.
///
/// Most fonts hint along the coordinate axes, so the projection code keys
/// off this to skip the general dot product.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum CoordAxis {
    #[default]
    Both,
    X,
    Y,
}

/// The full interpreter context: zones, vectors, reference points and the
/// control parameters instructions read and write.
///
/// The per-run portion lives directly in this struct and is rebuilt for
/// every program. The portion the control value program is allowed to
/// carry into glyph programs lives in [`RetainedGraphicsState`], reachable
/// through `Deref`.
#[derive(Debug)]
pub struct GraphicsState<'a> {
    /// State that survives between program runs.
    pub retained: RetainedGraphicsState,
    /// The twilight zone followed by the glyph zone.
    pub zones: [Zone<'a>; 2],
    /// Zone selected for points addressed through rp0.
    pub zp0: ZonePointer,
    /// Zone selected for points addressed through rp1.
    pub zp1: ZonePointer,
    /// Zone selected for points addressed through rp2.
    pub zp2: ZonePointer,
    /// Unit vector (2.14) along which distances are measured.
    pub proj_vector: Point<i32>,
    /// Axis classification of the projection vector.
    pub proj_axis: CoordAxis,
    /// Unit vector (2.14) for measuring against the outline as it stood
    /// before this program ran.
    pub dual_proj_vector: Point<i32>,
    /// Axis classification of the dual projection vector.
    pub dual_proj_axis: CoordAxis,
    /// Unit vector (2.14) along which points are moved.
    pub freedom_vector: Point<i32>,
    /// Axis classification of the freedom vector.
    pub freedom_axis: CoordAxis,
    /// Cached dot product of the freedom and projection vectors, the
    /// divisor when converting a projected distance into a movement.
    pub fdotp: i32,
    /// Active rounding function and its parameters.
    pub round_state: RoundState,
    /// Reference point numbers used by movement instructions.
    pub rp0: usize,
    pub rp1: usize,
    pub rp2: usize,
    /// Repeat count for SHP, SHPIX, IP, FLIPPT and ALIGNRP; consumed back
    /// to one by the next such instruction.
    pub loop_counter: u32,
    /// True when hinting a component of a composite glyph.
    pub is_composite: bool,
    /// True to fail on out of bounds references instead of ignoring them.
    pub is_pedantic: bool,
}

impl<'a> GraphicsState<'a> {
    /// Returns the 16.16 factor that maps "unscaled" point coordinates to
    /// pixels.
    ///
    /// Composite components are assembled from already scaled outlines, so
    /// the factor is one in that case.
    pub fn unscaled_to_pixels(&self) -> i32 {
        if self.is_composite {
            1 << 16
        } else {
            self.scale
        }
    }

    /// Restores the per-run portion of the state to its defaults, keeping
    /// the retained portion, the zones and the composite/pedantic flags.
    pub fn reset(&mut self) {
        let mut fresh = GraphicsState {
            retained: self.retained,
            zones: core::mem::take(&mut self.zones),
            is_composite: self.is_composite,
            is_pedantic: self.is_pedantic,
            ..Default::default()
        };
        fresh.update_projection_state();
        *self = fresh;
    }

    /// Restores the retained portion to its defaults, keeping the instance
    /// parameters (scale, ppem, rotation and stretch).
    pub fn reset_retained(&mut self) {
        self.retained = RetainedGraphicsState {
            scale: self.scale,
            ppem: self.ppem,
            is_rotated: self.is_rotated,
            is_stretched: self.is_stretched,
            ..Default::default()
        }
    }
}

impl Default for GraphicsState<'_> {
    // Default values per the OpenType graphics state table:
    // <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_graphics_state>
    fn default() -> Self {
        // every vector starts on the x axis, 1.0 in 2.14
        let x_axis = Point::new(0x4000, 0);
        Self {
            retained: RetainedGraphicsState::default(),
            zones: Default::default(),
            zp0: ZonePointer::default(),
            zp1: ZonePointer::default(),
            zp2: ZonePointer::default(),
            proj_vector: x_axis,
            proj_axis: CoordAxis::Both,
            dual_proj_vector: x_axis,
            dual_proj_axis: CoordAxis::Both,
            freedom_vector: x_axis,
            freedom_axis: CoordAxis::Both,
            fdotp: 0x4000,
            round_state: RoundState::default(),
            rp0: 0,
            rp1: 0,
            rp2: 0,
            loop_counter: 1,
            is_composite: false,
            is_pedantic: false,
        }
    }
}

/// Graphics state that carries across program runs.
///
/// The control value program sets these to establish font wide policy;
/// glyph programs see the values it left behind. The instance parameters
/// at the end are owned by the caller and survive even a retained reset.
#[derive(Copy, Clone, Debug)]
pub struct RetainedGraphicsState {
    /// When true, MIRP flips the sign of a CVT distance that disagrees
    /// with the measured direction.
    pub auto_flip: bool,
    /// Maximum difference between a CVT value and the measured distance
    /// for the CVT value to win.
    pub control_value_cutin: F26Dot6,
    /// Base ppem for decoding DELTA exception sizes.
    pub delta_base: u16,
    /// Log2 granularity of DELTA exception steps.
    pub delta_shift: u16,
    /// Bit flags set by INSTCTRL; bit 0 disables glyph hinting entirely.
    pub instruct_control: u8,
    /// Smallest distance MDRP/MIRP will produce when the minimum distance
    /// flag is set in the opcode.
    pub min_distance: F26Dot6,
    /// Dropout control enable, with its mode in `scan_type`.
    pub scan_control: bool,
    pub scan_type: i32,
    /// Difference below which a CVT or measured distance is replaced by
    /// the single width.
    pub single_width_cutin: F26Dot6,
    /// Replacement distance for the single width cut-in.
    pub single_width: F26Dot6,
    /// 16.16 factor from font units to 26.6 pixels at the current size.
    pub scale: i32,
    /// Nominal pixels per em.
    pub ppem: i32,
    /// True when the instance applies a rotation.
    pub is_rotated: bool,
    /// True when the instance scales x and y differently.
    pub is_stretched: bool,
}

impl Default for RetainedGraphicsState {
    // Default values per the OpenType graphics state table:
    // <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_graphics_state>
    fn default() -> Self {
        Self {
            auto_flip: true,
            // 17/16 pixel
            control_value_cutin: F26Dot6::from_bits(68),
            delta_base: 9,
            delta_shift: 3,
            instruct_control: 0,
            // one pixel
            min_distance: F26Dot6::from_bits(64),
            scan_control: false,
            scan_type: 0,
            single_width_cutin: F26Dot6::ZERO,
            single_width: F26Dot6::ZERO,
            scale: 0,
            ppem: 0,
            is_rotated: false,
            is_stretched: false,
        }
    }
}

impl Deref for GraphicsState<'_> {
    type Target = RetainedGraphicsState;

    fn deref(&self) -> &Self::Target {
        &self.retained
    }
}

impl DerefMut for GraphicsState<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.retained
    }
}
