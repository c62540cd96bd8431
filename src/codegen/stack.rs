//! Stack generators: push, pop, dup and swap.
//!
//! Values are stored least significant byte first and the head rests on
//! the first free cell above the top byte.

use crate::core::machine::{Direction, StateId, Transition};

use super::TuringCompiler;

impl<'a, 'arena> TuringCompiler<'a, 'arena> {
    /// Write `bytes` bytes of `value`, low byte first.
    pub(super) fn gen_push(&mut self, entry: StateId, value: u64, bytes: usize, exit: StateId) {
        let mut current = entry;
        for i in 0..bytes {
            let next = if i + 1 == bytes { exit } else { self.add_state() };
            let byte = (value >> (i * 8)) & 0xFF;
            self.set_default(current, Transition::write(byte, Direction::Right, next));
            current = next;
        }
    }

    /// Drop `bytes` cells. The lowest dropped cell becomes the free cell.
    pub(super) fn gen_pop(&mut self, entry: StateId, bytes: usize, exit: StateId) {
        let mut current = entry;
        for i in 0..bytes {
            let next = if i + 1 == bytes { exit } else { self.add_state() };
            self.set_default(current, Transition::write(0, Direction::Left, next));
            current = next;
        }
    }

    /// Push a copy of the top `bytes`-wide value.
    pub(super) fn gen_dup(&mut self, entry: StateId, bytes: usize, exit: StateId) {
        let mut current = entry;
        for i in 0..bytes {
            let next = if i + 1 == bytes { exit } else { self.add_state() };
            self.gen_copy_byte(current, bytes, next);
            current = next;
        }
    }

    /// Copy the cell `distance` below the head onto the free cell.
    fn gen_copy_byte(&mut self, entry: StateId, distance: usize, exit: StateId) {
        let source = self.walk(entry, Direction::Left, distance);
        for value in 0..256u64 {
            let carry = self.add_state();
            self.push_transition(source, Transition::new(value, value, Direction::Right, carry));
            let dest = self.walk(carry, Direction::Right, distance.saturating_sub(1));
            self.set_default(dest, Transition::write(value, Direction::Right, exit));
        }
    }

    /// Exchange the top value with the value `offset` bytes below it.
    pub(super) fn gen_swap(&mut self, entry: StateId, bytes: usize, offset: usize, exit: StateId) {
        let span = bytes + offset;
        let mut current = self.walk(entry, Direction::Left, bytes);

        for i in 0..bytes {
            let merge = if i + 1 == bytes { exit } else { self.add_state() };
            let back = self.session.add_states(256);

            for upper in 0..256u64 {
                let carry = self.add_state();
                self.push_transition(current, Transition::new(upper, upper, Direction::Left, carry));
                let partner = self.walk(carry, Direction::Left, span - 1);
                for lower in 0..256u64 {
                    self.push_transition(
                        partner,
                        Transition::new(lower, upper, Direction::Right, back[lower as usize]),
                    );
                }
            }

            for (lower, &state) in back.iter().enumerate() {
                let upper_cell = self.walk(state, Direction::Right, span - 1);
                self.set_default(upper_cell, Transition::write(lower as u64, Direction::Right, merge));
            }

            current = merge;
        }
    }
}
