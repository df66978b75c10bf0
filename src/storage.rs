//! Storage area.

use super::{cow_slice::CowSlice, error::HintErrorKind};

/// The bytecode-visible scratch array of 32-bit words.
///
/// Same shape as [`Cvt`](super::cvt::Cvt) but untyped: values written by
/// WS are read back verbatim by RS. Misses become
/// [`InvalidStorageIndex`](HintErrorKind::InvalidStorageIndex).
pub struct Storage<'a> {
    values: CowSlice<'a>,
}

impl<'a> Storage<'a> {
    pub fn get(&self, index: usize) -> Result<i32, HintErrorKind> {
        match self.values.get(index) {
            Some(value) => Ok(value),
            None => Err(HintErrorKind::InvalidStorageIndex(index)),
        }
    }

    pub fn set(&mut self, index: usize, value: i32) -> Result<(), HintErrorKind> {
        self.values
            .set(index, value)
            .ok_or(HintErrorKind::InvalidStorageIndex(index))
    }
}

impl<'a> From<CowSlice<'a>> for Storage<'a> {
    fn from(values: CowSlice<'a>) -> Self {
        Self { values }
    }
}
