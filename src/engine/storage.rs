//! Storage area reads and writes.

use super::{Engine, OpResult};

impl<'a> Engine<'a> {
    /// RS[] (0x43): push the 32 bit value held in a storage slot.
    ///
    /// in: location (storage index); out: value
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#read-store>
    pub(super) fn op_rs(&mut self) -> OpResult {
        let location = self.value_stack.pop_usize()?;
        let maybe_value = self.storage.get(location);
        let value = if self.graphics.is_pedantic {
            maybe_value?
        } else {
            maybe_value.unwrap_or_default()
        };
        self.value_stack.push(value)
    }

    /// WS[] (0x42): store a 32 bit value into a storage slot.
    ///
    /// in: value, location (storage index)
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#write-store>
    pub(super) fn op_ws(&mut self) -> OpResult {
        let value = self.value_stack.pop()?;
        let location = self.value_stack.pop_usize()?;
        let result = self.storage.set(location, value);
        if self.graphics.is_pedantic {
            result
        } else {
            Ok(())
        }
    }
}
