//! A virtual machine for TrueType hinting programs.
//!
//! TrueType fonts carry up to three kinds of bytecode programs: a font
//! program (`fpgm`) run once per instance, a control value program (`prep`)
//! run when the scale or ppem change, and per-glyph programs embedded in
//! the `glyf` table. Executing them adjusts scaled outline points so that
//! stems and features align with the pixel grid.
//!
//! This crate implements the interpreter for those programs. It does not
//! parse font files: callers extract the programs, control values and
//! outline buffers themselves and hand them to a [`HintInstance`].
//!
//! ```no_run
//! use tthint::{FontPrograms, HintInstance, HintOptions, HintOutline};
//!
//! # fn run(font: FontPrograms, mut outline: HintOutline) -> Result<(), tthint::HintError> {
//! let mut instance = HintInstance::default();
//! // 16.16 scale factor mapping font units to 26.6 pixels
//! let scale = 0x10000;
//! instance.reconfigure(&font, scale, 16, HintOptions::default())?;
//! if instance.is_enabled() {
//!     instance.hint(&font, &mut outline)?;
//! }
//! # Ok(())
//! # }
//! ```

mod bytecode;
mod call_stack;
mod cow_slice;
mod cvt;
mod definition;
mod engine;
mod error;
mod graphics;
mod instance;
mod math;
mod point;
mod program;
mod projection;
mod round;
mod storage;
mod value_stack;
mod zone;

pub use bytecode::{Decoder, InlineOperands, Instruction, Opcode, Program};
pub use error::{HintError, HintErrorKind};
pub use instance::{FontPrograms, HintInstance, HintOptions, HintOutline};
pub use point::{PointFlags, PointMarker};
