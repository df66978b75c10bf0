//! Control value table.

use super::{cow_slice::CowSlice, error::HintErrorKind};
use font_types::F26Dot6;

/// Scaled control values with the bounds policy attached.
///
/// Entries live in the underlying [`CowSlice`] as raw 26.6 bit patterns;
/// this wrapper applies the fixed point type and maps misses to
/// [`InvalidCvtIndex`](HintErrorKind::InvalidCvtIndex) so handlers can
/// decide how pedantic to be.
pub struct Cvt<'a> {
    values: CowSlice<'a>,
}

impl<'a> Cvt<'a> {
    pub fn get(&self, index: usize) -> Result<F26Dot6, HintErrorKind> {
        match self.values.get(index) {
            Some(bits) => Ok(F26Dot6::from_bits(bits)),
            None => Err(HintErrorKind::InvalidCvtIndex(index)),
        }
    }

    pub fn set(&mut self, index: usize, value: F26Dot6) -> Result<(), HintErrorKind> {
        self.values
            .set(index, value.to_bits())
            .ok_or(HintErrorKind::InvalidCvtIndex(index))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl<'a> From<CowSlice<'a>> for Cvt<'a> {
    fn from(values: CowSlice<'a>) -> Self {
        Self { values }
    }
}
