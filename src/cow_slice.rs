//! Scratch views for the CVT and storage area.

/// A slice view that defers copying shared data until the first write.
///
/// A glyph program sees CVT and storage contents produced by the control
/// value program, and any edits it makes must be discarded when the glyph
/// is done. The font and control value programs, on the other hand, own
/// their buffers outright. Wrapping both cases in one type keeps the
/// instruction handlers oblivious: in the shared case reads hit the shared
/// data until a write forces a copy into the scratch buffer, after which
/// the scratch buffer is authoritative for the rest of the run.
pub enum CowSlice<'a> {
    /// Shared values with an uninitialized scratch buffer of the same size.
    Shared {
        data: &'a [i32],
        scratch: &'a mut [i32],
    },
    /// Directly owned values; writes persist.
    Owned(&'a mut [i32]),
}

impl<'a> CowSlice<'a> {
    /// Creates a view over shared values, copying into `scratch` on the
    /// first write. The two slices must be the same length.
    pub fn new(data: &'a [i32], scratch: &'a mut [i32]) -> Self {
        assert_eq!(data.len(), scratch.len());
        Self::Shared { data, scratch }
    }

    /// Creates a view that reads and writes `data` directly.
    pub fn new_mut(data: &'a mut [i32]) -> Self {
        Self::Owned(data)
    }

    pub fn get(&self, index: usize) -> Option<i32> {
        let values: &[i32] = match self {
            Self::Shared { data, .. } => data,
            Self::Owned(data) => data,
        };
        values.get(index).copied()
    }

    pub fn set(&mut self, index: usize, value: i32) -> Option<()> {
        if let Self::Shared { data, scratch } = self {
            scratch.copy_from_slice(data);
            *self = Self::Owned(core::mem::take(scratch));
        }
        let Self::Owned(values) = self else {
            // set above or constructed with new_mut
            unreachable!();
        };
        *values.get_mut(index)? = value;
        Some(())
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Shared { data, .. } => data.len(),
            Self::Owned(data) => data.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CowSlice;

    #[test]
    fn copies_shared_data_on_first_write() {
        let shared = [10, 20, 30];
        let mut scratch = [0; 3];
        let mut view = CowSlice::new(&shared, &mut scratch);
        assert_eq!(view.get(1), Some(20));
        view.set(1, -5).unwrap();
        // untouched entries were carried over by the copy
        assert_eq!(view.get(0), Some(10));
        assert_eq!(view.get(1), Some(-5));
        assert_eq!(view.get(2), Some(30));
        assert_eq!(view.get(3), None);
        assert_eq!(shared, [10, 20, 30]);
    }

    #[test]
    fn owned_writes_are_direct() {
        let mut data = [1, 2];
        let mut view = CowSlice::new_mut(&mut data);
        view.set(0, 7).unwrap();
        assert!(view.set(2, 0).is_none());
        assert_eq!(view.get(0), Some(7));
        drop(view);
        assert_eq!(data, [7, 2]);
    }
}
