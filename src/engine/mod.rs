//! Hinting engine.

mod arith;
mod control_flow;
mod cvt;
mod data;
mod definition;
mod delta;
mod dispatch;
mod graphics;
mod logical;
mod misc;
mod outline;
mod round;
mod stack;
mod storage;

use super::{
    cvt::Cvt,
    definition::DefinitionMap,
    error::HintErrorKind,
    graphics::GraphicsState,
    program::ProgramState,
    storage::Storage,
    value_stack::ValueStack,
};

use font_types::{F26Dot6, Point};

pub(crate) type OpResult = Result<(), HintErrorKind>;

/// Function and instruction definition tables.
pub(crate) struct Definitions<'a> {
    pub functions: DefinitionMap<'a>,
    pub instructions: DefinitionMap<'a>,
}

/// Executes instructions against the current program and graphics state.
pub(crate) struct Engine<'a> {
    pub program: ProgramState<'a>,
    pub graphics: GraphicsState<'a>,
    pub value_stack: ValueStack<'a>,
    pub definitions: Definitions<'a>,
    pub cvt: Cvt<'a>,
    pub storage: Storage<'a>,
}

#[cfg(test)]
pub(crate) use mock::MockEngine;

#[cfg(test)]
mod mock {
    use super::super::{
        bytecode::Program,
        cow_slice::CowSlice,
        definition::{Definition, DefinitionMap},
        graphics::GraphicsState,
        point::PointFlags,
        program::ProgramState,
        value_stack::ValueStack,
        zone::Zone,
    };
    use super::{Definitions, Engine, F26Dot6, Point};

    /// Owns the buffers for a self-contained engine for testing.
    pub(crate) struct MockEngine {
        value_stack: Vec<i32>,
        cvt: Vec<i32>,
        storage: Vec<i32>,
        functions: Vec<Definition>,
        instructions: Vec<Definition>,
        unscaled: Vec<Point<i32>>,
        original: Vec<Point<F26Dot6>>,
        points: Vec<Point<F26Dot6>>,
        flags: Vec<PointFlags>,
        contours: Vec<u16>,
        twilight_original: Vec<Point<F26Dot6>>,
        twilight_points: Vec<Point<F26Dot6>>,
        twilight_flags: Vec<PointFlags>,
    }

    impl MockEngine {
        pub fn new() -> Self {
            const POINT_COUNT: usize = 32;
            Self {
                value_stack: vec![0; 32],
                cvt: vec![0; 32],
                storage: vec![0; 32],
                functions: vec![Definition::default(); 6],
                instructions: vec![Definition::default(); 2],
                unscaled: (0..POINT_COUNT as i32)
                    .map(|i| Point::new(i * 16, -i * 16))
                    .collect(),
                original: vec![Point::default(); POINT_COUNT],
                points: vec![Point::default(); POINT_COUNT],
                flags: vec![PointFlags::default(); POINT_COUNT],
                contours: vec![POINT_COUNT as u16 - 1],
                twilight_original: vec![Point::default(); POINT_COUNT],
                twilight_points: vec![Point::default(); POINT_COUNT],
                twilight_flags: vec![PointFlags::default(); POINT_COUNT],
            }
        }

        pub fn engine(&mut self) -> Engine {
            let twilight = Zone::new(
                &[],
                &mut self.twilight_original,
                &mut self.twilight_points,
                &mut self.twilight_flags,
                &[],
            );
            let glyph = Zone::new(
                &self.unscaled,
                &mut self.original,
                &mut self.points,
                &mut self.flags,
                &self.contours,
            );
            let mut graphics = GraphicsState {
                zones: [twilight, glyph],
                ..Default::default()
            };
            graphics.update_projection_state();
            Engine {
                program: ProgramState::new(&[], &[], &[], Program::Font),
                graphics,
                value_stack: ValueStack::new(&mut self.value_stack, true),
                definitions: Definitions {
                    functions: DefinitionMap::Mut(&mut self.functions),
                    instructions: DefinitionMap::Mut(&mut self.instructions),
                },
                cvt: CowSlice::new_mut(&mut self.cvt).into(),
                storage: CowSlice::new_mut(&mut self.storage).into(),
            }
        }
    }

    impl Default for MockEngine {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<'a> Engine<'a> {
        /// Pushes the given inputs, evaluates the operation and compares the
        /// value left on the stack with the expected result.
        pub(super) fn test_exec(
            &mut self,
            inputs: &[i32],
            expected: impl Into<i32>,
            mut f: impl FnMut(&mut Engine),
        ) {
            for input in inputs {
                self.value_stack.push(*input).unwrap();
            }
            f(self);
            assert_eq!(self.value_stack.pop().ok(), Some(expected.into()));
        }
    }
}
