//! Function and instruction definition tables.

use super::{bytecode::Program, error::HintErrorKind};
use core::ops::Range;

/// One FDEF or IDEF entry: where its body lives and which key selects it.
//
// repr(C) with explicit padding keeps the entry at 16 bytes.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[repr(C)]
pub struct Definition {
    start: u32,
    end: u32,
    /// Function number for an FDEF, opcode for an IDEF.
    key: i32,
    _pad: u16,
    program: u8,
    is_active: u8,
}

impl Definition {
    /// Creates an active definition covering `code_range` of `program`.
    pub fn new(program: Program, code_range: Range<usize>, key: i32) -> Self {
        Self {
            program: program as u8,
            // Program sizes are 16 bit quantities in the font tables, so
            // the narrowing casts cannot truncate valid ranges.
            start: code_range.start as u32,
            end: code_range.end as u32,
            key,
            is_active: 1,
            _pad: 0,
        }
    }

    /// The program holding this definition's body.
    pub fn program(&self) -> Program {
        match self.program {
            0 => Program::Font,
            1 => Program::ControlValue,
            _ => Program::Glyph,
        }
    }

    /// The function number or opcode this definition answers to.
    pub fn key(&self) -> i32 {
        self.key
    }

    /// Byte range of the body within the containing program.
    pub fn code_range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    /// False for slots that were never filled or have been cleared.
    pub fn is_active(&self) -> bool {
        self.is_active != 0
    }
}

/// Table of function or instruction definitions, borrowed read-only for
/// glyph runs and mutably for fpgm/prep runs.
pub enum DefinitionMap<'a> {
    Ref(&'a [Definition]),
    Mut(&'a mut [Definition]),
}

impl<'a> DefinitionMap<'a> {
    /// Finds a slot for `key` and hands it out for (re)definition.
    ///
    /// A slot already holding `key` is reused; failing that, an inactive
    /// slot is taken.
    pub fn allocate(&mut self, key: i32) -> Result<&mut Definition, HintErrorKind> {
        let DefinitionMap::Mut(defs) = self else {
            return Err(HintErrorKind::DefinitionInGlyphProgram);
        };
        // Most fonts number their functions densely from zero, making the
        // key its own index.
        let direct = (key >= 0)
            .then_some(key as usize)
            .filter(|&ix| match defs.get(ix) {
                Some(def) => !def.is_active() || def.key() == key,
                None => false,
            });
        let ix = direct
            .or_else(|| {
                defs.iter()
                    .rposition(|def| def.is_active() && def.key() == key)
            })
            .or_else(|| defs.iter().position(|def| !def.is_active()))
            .ok_or(HintErrorKind::TooManyDefinitions)?;
        let def = defs
            .get_mut(ix)
            .ok_or(HintErrorKind::TooManyDefinitions)?;
        *def = Definition::new(Program::Font, 0..0, key);
        Ok(def)
    }

    /// Looks up the active definition for `key`.
    pub fn get(&self, key: i32) -> Result<&Definition, HintErrorKind> {
        let defs = self.as_slice();
        // Dense key fast path, same as allocate.
        if key >= 0 {
            match defs.get(key as usize) {
                Some(def) if def.is_active() && def.key() == key => return Ok(def),
                _ => {}
            }
        }
        defs.iter()
            .rfind(|def| def.is_active() && def.key() == key)
            .ok_or(HintErrorKind::InvalidDefinition(key as usize))
    }

    /// Deactivates every slot.
    pub fn reset(&mut self) {
        if let Self::Mut(defs) = self {
            defs.fill(Definition::default());
        }
    }

    pub fn as_slice(&self) -> &[Definition] {
        match self {
            Self::Mut(defs) => defs,
            Self::Ref(defs) => defs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Definition, DefinitionMap, HintErrorKind, Program};

    #[test]
    fn too_many_and_invalid() {
        let mut defs = vec![Definition::default(); 4];
        let mut map = DefinitionMap::Mut(&mut defs);
        for key in 0..4 {
            map.allocate(key).unwrap();
        }
        assert!(matches!(
            map.allocate(4),
            Err(HintErrorKind::TooManyDefinitions)
        ));
        assert!(matches!(
            map.get(4),
            Err(HintErrorKind::InvalidDefinition(4))
        ));
    }

    #[test]
    fn allocate_dense() {
        let mut defs = vec![Definition::default(); 8];
        let mut map = DefinitionMap::Mut(&mut defs);
        for key in 0..8 {
            map.allocate(key).unwrap();
        }
        // Dense keys land at their own index.
        for (i, def) in map.as_slice().iter().enumerate() {
            assert_eq!(def.key(), i as i32);
        }
    }

    #[test]
    fn allocate_sparse() {
        let mut defs = vec![Definition::default(); 8];
        let mut map = DefinitionMap::Mut(&mut defs);
        let keys = [0, 1, 2, 3, 987654, -17, -4242, 6];
        for key in keys {
            *map.allocate(key).unwrap() = Definition::new(Program::Font, 0..0, key);
        }
        for key in keys {
            assert_eq!(map.get(key).unwrap().key(), key);
        }
    }

    #[test]
    fn redefinition_reuses_slot() {
        let mut defs = vec![Definition::default(); 2];
        let mut map = DefinitionMap::Mut(&mut defs);
        *map.allocate(5000).unwrap() = Definition::new(Program::Font, 1..4, 5000);
        *map.allocate(7000).unwrap() = Definition::new(Program::Font, 4..8, 7000);
        // Redefining key 5000 must not consume a fresh slot in the (now
        // full) table.
        *map.allocate(5000).unwrap() = Definition::new(Program::Font, 8..12, 5000);
        assert_eq!(map.get(5000).unwrap().code_range(), 8..12);
        assert_eq!(map.get(7000).unwrap().code_range(), 4..8);
    }
}
