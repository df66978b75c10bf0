//! Operand stack.

use super::{bytecode::InlineOperands, error::HintErrorKind};

use font_types::F26Dot6;
use HintErrorKind::{ValueStackOverflow, ValueStackUnderflow};

/// Interpreter operand stack over a caller supplied buffer.
///
/// The capacity never changes once constructed: it is sized from the
/// font's declared `maxStackElements` plus slack for fonts that overrun
/// their own declaration.
pub struct ValueStack<'a> {
    values: &'a mut [i32],
    top: usize,
    /// When false, popping an empty stack yields 0 rather than an error.
    ///
    /// This only matters for instructions with data dependent arity; the
    /// dispatcher checks each opcode's declared arity up front in both
    /// modes.
    pub is_pedantic: bool,
}

impl<'a> ValueStack<'a> {
    pub fn new(values: &'a mut [i32], is_pedantic: bool) -> Self {
        Self {
            values,
            top: 0,
            is_pedantic,
        }
    }

    /// Returns the number of elements currently on the stack.
    pub fn len(&self) -> usize {
        self.top
    }

    pub fn is_empty(&self) -> bool {
        self.top == 0
    }

    /// Returns the fixed number of available slots.
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// Returns the live elements, bottom first.
    pub fn values(&self) -> &[i32] {
        &self.values[..self.top]
    }

    pub fn push(&mut self, value: i32) -> Result<(), HintErrorKind> {
        if self.top == self.values.len() {
            return Err(ValueStackOverflow);
        }
        self.values[self.top] = value;
        self.top += 1;
        Ok(())
    }

    /// Pushes the operands decoded from a PUSHB, PUSHW, NPUSHB or NPUSHW
    /// instruction.
    pub fn push_inline_operands(&mut self, operands: &InlineOperands) -> Result<(), HintErrorKind> {
        let end = self.top + operands.len();
        let slots = self
            .values
            .get_mut(self.top..end)
            .ok_or(ValueStackOverflow)?;
        for (slot, value) in slots.iter_mut().zip(operands.values()) {
            *slot = value;
        }
        self.top = end;
        Ok(())
    }

    pub fn peek(&self) -> Option<i32> {
        self.top.checked_sub(1).map(|ix| self.values[ix])
    }

    pub fn pop(&mut self) -> Result<i32, HintErrorKind> {
        if let Some(value) = self.peek() {
            self.top -= 1;
            Ok(value)
        } else if self.is_pedantic {
            Err(ValueStackUnderflow)
        } else {
            Ok(0)
        }
    }

    /// Pops an index or point number.
    pub fn pop_usize(&mut self) -> Result<usize, HintErrorKind> {
        Ok(self.pop()? as usize)
    }

    /// Pops a 26.6 pixel value.
    pub fn pop_f26dot6(&mut self) -> Result<F26Dot6, HintErrorKind> {
        Ok(F26Dot6::from_bits(self.pop()?))
    }

    /// Pops an element count, refusing negative values.
    ///
    /// Fonts in the wild pass negative counts to DELTA instructions;
    /// reinterpreting one as unsigned would spin the handler for billions
    /// of iterations. Lenient mode clamps to zero, pedantic mode errors.
    pub fn pop_count_checked(&mut self) -> Result<usize, HintErrorKind> {
        let count = self.pop()?;
        if count >= 0 {
            Ok(count as usize)
        } else if self.is_pedantic {
            Err(HintErrorKind::InvalidStackValue(count))
        } else {
            Ok(0)
        }
    }

    /// Pops `a`, pushes `op(a)`.
    pub fn apply_unary(
        &mut self,
        mut op: impl FnMut(i32) -> Result<i32, HintErrorKind>,
    ) -> Result<(), HintErrorKind> {
        let a = self.pop()?;
        self.push(op(a)?)
    }

    /// Pops `b` then `a`, pushes `op(a, b)`.
    pub fn apply_binary(
        &mut self,
        mut op: impl FnMut(i32, i32) -> Result<i32, HintErrorKind>,
    ) -> Result<(), HintErrorKind> {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(op(a, b)?)
    }

    /// Empties the stack. Implements CLEAR.
    pub fn clear(&mut self) {
        self.top = 0;
    }

    /// Pushes a copy of the top element. Implements DUP.
    pub fn dup(&mut self) -> Result<(), HintErrorKind> {
        match self.peek() {
            Some(value) => self.push(value),
            None => Err(ValueStackUnderflow),
        }
    }

    /// Exchanges the top two elements. Implements SWAP.
    pub fn swap(&mut self) -> Result<(), HintErrorKind> {
        let base = self.top.checked_sub(2).ok_or(ValueStackUnderflow)?;
        self.values.swap(base, base + 1);
        Ok(())
    }

    /// Replaces the top element (a 1-based depth) with a copy of the
    /// element that far below it. Implements CINDEX.
    pub fn copy_index(&mut self) -> Result<(), HintErrorKind> {
        let depth = self.top.checked_sub(1).ok_or(ValueStackUnderflow)?;
        let source = depth
            .checked_sub(self.values[depth] as usize)
            .ok_or(ValueStackUnderflow)?;
        self.values[depth] = self.values[source];
        Ok(())
    }

    /// Pops a 1-based depth and moves the element that far down to the
    /// top, closing the gap. Implements MINDEX.
    pub fn move_index(&mut self) -> Result<(), HintErrorKind> {
        let depth = self.top.checked_sub(1).ok_or(ValueStackUnderflow)?;
        let source = depth
            .checked_sub(self.values[depth] as usize)
            .ok_or(ValueStackUnderflow)?;
        self.top = depth;
        self.values[source..depth].rotate_left(1);
        Ok(())
    }

    /// Cycles the top three elements. Implements ROLL.
    pub fn roll(&mut self) -> Result<(), HintErrorKind> {
        let base = self.top.checked_sub(3).ok_or(ValueStackUnderflow)?;
        self.values[base..self.top].rotate_left(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{HintErrorKind, ValueStack};
    use crate::bytecode::MockInlineOperands;

    fn fill(stack: &mut ValueStack, values: &[i32]) {
        for value in values {
            stack.push(*value).unwrap();
        }
    }

    #[test]
    fn push_to_capacity() {
        let mut buf = [0; 3];
        let mut stack = ValueStack::new(&mut buf, true);
        fill(&mut stack, &[7, 8, 9]);
        assert_eq!(stack.len(), stack.capacity());
        assert_eq!(stack.push(10), Err(HintErrorKind::ValueStackOverflow));
    }

    #[test]
    fn inline_operands() {
        let mut buf = [0; 16];
        let mut stack = ValueStack::new(&mut buf, true);
        let words = [312, -1, i16::MIN, 44, i16::MAX];
        let mock = MockInlineOperands::from_words(&words);
        stack.push_inline_operands(&mock.operands()).unwrap();
        let expected = words.iter().map(|w| *w as i32).collect::<Vec<_>>();
        assert_eq!(stack.values(), expected);
    }

    #[test]
    fn inline_operands_overflow() {
        let mut buf = [0; 2];
        let mut stack = ValueStack::new(&mut buf, true);
        let mock = MockInlineOperands::from_bytes(&[1, 2, 3]);
        assert_eq!(
            stack.push_inline_operands(&mock.operands()),
            Err(HintErrorKind::ValueStackOverflow)
        );
    }

    #[test]
    fn pop_order_and_underflow() {
        let mut buf = [0; 4];
        let mut stack = ValueStack::new(&mut buf, true);
        fill(&mut stack, &[1, 2, 3]);
        assert_eq!(stack.pop(), Ok(3));
        assert_eq!(stack.pop(), Ok(2));
        assert_eq!(stack.pop(), Ok(1));
        assert_eq!(stack.pop(), Err(HintErrorKind::ValueStackUnderflow));
    }

    #[test]
    fn lenient_underflow_yields_zero() {
        let mut buf = [0; 4];
        let mut stack = ValueStack::new(&mut buf, false);
        assert_eq!(stack.pop(), Ok(0));
        stack.push(-3).unwrap();
        assert_eq!(stack.pop_count_checked(), Ok(0));
    }

    #[test]
    fn pedantic_negative_count() {
        let mut buf = [0; 4];
        let mut stack = ValueStack::new(&mut buf, true);
        stack.push(-3).unwrap();
        assert_eq!(
            stack.pop_count_checked(),
            Err(HintErrorKind::InvalidStackValue(-3))
        );
    }

    #[test]
    fn shuffles() {
        let mut buf = [0; 8];
        let mut stack = ValueStack::new(&mut buf, true);
        fill(&mut stack, &[1, 2, 3]);
        stack.dup().unwrap();
        assert_eq!(stack.values(), &[1, 2, 3, 3]);
        stack.swap().unwrap();
        assert_eq!(stack.values(), &[1, 2, 3, 3]);
        stack.push(9).unwrap();
        stack.swap().unwrap();
        assert_eq!(stack.values(), &[1, 2, 3, 9, 3]);
        stack.roll().unwrap();
        assert_eq!(stack.values(), &[1, 2, 9, 3, 3]);
    }

    #[test]
    fn copy_index() {
        let mut buf = [0; 8];
        let mut stack = ValueStack::new(&mut buf, true);
        fill(&mut stack, &[20, 30, 40, 3]);
        stack.copy_index().unwrap();
        assert_eq!(stack.values(), &[20, 30, 40, 20]);
        // depth past the bottom of the stack
        stack.push(100).unwrap();
        assert_eq!(stack.copy_index(), Err(HintErrorKind::ValueStackUnderflow));
    }

    #[test]
    fn move_index() {
        let mut buf = [0; 8];
        let mut stack = ValueStack::new(&mut buf, true);
        fill(&mut stack, &[20, 30, 40, 50, 3]);
        stack.move_index().unwrap();
        assert_eq!(stack.values(), &[20, 40, 50, 30]);
    }

    #[test]
    fn unary_binary() {
        let mut buf = [0; 8];
        let mut stack = ValueStack::new(&mut buf, true);
        stack.push(6).unwrap();
        stack.apply_unary(|a| Ok(a * a)).unwrap();
        assert_eq!(stack.peek(), Some(36));
        stack.push(12).unwrap();
        // op sees (a, b) with b popped first
        stack.apply_binary(|a, b| Ok(a - b)).unwrap();
        assert_eq!(stack.peek(), Some(24));
    }
}
