//! Control value table reads and writes.

use super::{super::math, Engine, OpResult, F26Dot6};

impl<'a> Engine<'a> {
    /// WCVTP[] (0x44): store a 26.6 pixel value into a CVT slot.
    ///
    /// in: value (26.6), location (CVT index)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#write-control-value-table-in-pixel-units>
    pub(super) fn op_wcvtp(&mut self) -> OpResult {
        let value = self.value_stack.pop_f26dot6()?;
        let location = self.value_stack.pop_usize()?;
        let result = self.cvt.set(location, value);
        if self.graphics.is_pedantic {
            result
        } else {
            Ok(())
        }
    }

    /// WCVTF[] (0x70): store a font unit value into a CVT slot, scaling it
    /// to pixels first.
    ///
    /// in: value (font units), location (CVT index)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#write-control-value-table-in-funits>
    pub(super) fn op_wcvtf(&mut self) -> OpResult {
        let value = self.value_stack.pop()?;
        let location = self.value_stack.pop_usize()?;
        let result = self.cvt.set(
            location,
            F26Dot6::from_bits(math::mul(value, self.graphics.scale)),
        );
        if self.graphics.is_pedantic {
            result
        } else {
            Ok(())
        }
    }

    /// RCVT[] (0x45): push the 26.6 value stored in a CVT slot.
    ///
    /// in: location (CVT index); out: value (26.6)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#read-control-value-table>
    pub(super) fn op_rcvt(&mut self) -> OpResult {
        let location = self.value_stack.pop_usize()?;
        let maybe_value = self.cvt.get(location);
        let value = if self.graphics.is_pedantic {
            maybe_value?
        } else {
            maybe_value.unwrap_or_default()
        };
        self.value_stack.push(value.to_bits())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{super::error::HintErrorKind, MockEngine};

    #[test]
    fn write_read() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        engine.value_stack.push(1).unwrap();
        engine.value_stack.push(128).unwrap();
        engine.op_wcvtp().unwrap();
        engine.value_stack.push(1).unwrap();
        engine.op_rcvt().unwrap();
        assert_eq!(engine.value_stack.pop().unwrap(), 128);
    }

    #[test]
    fn write_scaled() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        // scale mapping one font unit to one pixel, in 16.16
        engine.graphics.scale = 64 << 16;
        engine.value_stack.push(1).unwrap();
        engine.value_stack.push(100).unwrap();
        engine.op_wcvtf().unwrap();
        engine.value_stack.push(1).unwrap();
        engine.op_rcvt().unwrap();
        // 100 font units at this scale is 100 * 64 in 26.6
        assert_eq!(engine.value_stack.pop().unwrap(), 6400);
    }

    #[test]
    fn out_of_bounds() {
        let mut mock = MockEngine::new();
        let mut engine = mock.engine();
        // lenient mode ignores bad writes and yields 0 for bad reads
        engine.value_stack.push(9999).unwrap();
        engine.value_stack.push(128).unwrap();
        engine.op_wcvtp().unwrap();
        engine.value_stack.push(9999).unwrap();
        engine.op_rcvt().unwrap();
        assert_eq!(engine.value_stack.pop().unwrap(), 0);
        // pedantic mode raises errors
        engine.graphics.is_pedantic = true;
        engine.value_stack.push(9999).unwrap();
        engine.value_stack.push(128).unwrap();
        assert_eq!(
            engine.op_wcvtp(),
            Err(HintErrorKind::InvalidCvtIndex(9999))
        );
        engine.value_stack.push(9999).unwrap();
        assert_eq!(engine.op_rcvt(), Err(HintErrorKind::InvalidCvtIndex(9999)));
    }
}
