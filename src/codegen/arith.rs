// Arithmetic generators. Binary operators consume the top operand (its cells are cleared as
// they are read) and leave the result in place of the lower operand, so the head ends on the
// first cell of the old top operand. Add and Sub run least significant byte first and carry
// between bytes by switching between a "plain" and a "carry" family of states; And/Or/Xor
// have no carry and run most significant byte first. Every byte pair is a full 256x256 table,
// which dominates the size of the generated machine.

//! Arithmetic, bitwise and index-shift generators.

use crate::core::machine::{Direction, StateId, Transition};

use super::TuringCompiler;

/// Byte result and carry-out of one column.
type ColumnFn = fn(top: u64, lower: u64, carry_in: u64) -> (u64, bool);

fn add_column(top: u64, lower: u64, carry_in: u64) -> (u64, bool) {
    let sum = top + lower + carry_in;
    (sum % 256, sum >= 256)
}

fn sub_column(top: u64, lower: u64, carry_in: u64) -> (u64, bool) {
    let subtrahend = top + carry_in;
    ((lower + 512 - subtrahend) % 256, lower < subtrahend)
}

impl<'a, 'arena> TuringCompiler<'a, 'arena> {
    pub(super) fn gen_add(&mut self, entry: StateId, bytes: usize, exit: StateId) {
        self.gen_carry_chain(entry, bytes, exit, add_column);
    }

    /// Lower operand minus top operand; the final borrow is dropped.
    pub(super) fn gen_sub(&mut self, entry: StateId, bytes: usize, exit: StateId) {
        self.gen_carry_chain(entry, bytes, exit, sub_column);
    }

    fn gen_carry_chain(&mut self, entry: StateId, bytes: usize, exit: StateId, column: ColumnFn) {
        let first = self.walk(entry, Direction::Left, bytes);
        let mut plain = first;
        let mut carry = first;

        for i in 0..bytes {
            let last = i + 1 == bytes;
            let mut next_plain = if last { exit } else { self.add_state() };
            let mut next_carry = if last { exit } else { self.add_state() };
            let carry_values = if i == 0 { 1 } else { 2 };

            for top in 0..256u64 {
                for carry_in in 0..carry_values {
                    let from = if carry_in == 0 { plain } else { carry };
                    let split = self.add_state();
                    self.push_transition(from, Transition::new(top, 0, Direction::Left, split));
                    let lower_cell = self.walk(split, Direction::Left, bytes - 1);

                    for lower in 0..256u64 {
                        let (result, carry_out) = column(top, lower, carry_in);
                        let next = if carry_out { next_carry } else { next_plain };
                        self.push_transition(
                            lower_cell,
                            Transition::new(lower, result, Direction::Right, next),
                        );
                    }
                }
            }

            if !last {
                next_plain = self.walk(next_plain, Direction::Right, bytes);
                next_carry = self.walk(next_carry, Direction::Right, bytes);
            }
            plain = next_plain;
            carry = next_carry;
        }
    }

    /// Combine the two top values byte by byte with `op`.
    pub(super) fn gen_bitwise(
        &mut self,
        entry: StateId,
        bytes: usize,
        exit: StateId,
        op: impl Fn(u64, u64) -> u64,
    ) {
        let mut current = self.add_state();
        self.set_default(entry, Transition::skip(Direction::Left, current));

        for _ in 0..bytes {
            let end = if bytes == 1 { exit } else { self.add_state() };

            for top in 0..256u64 {
                let split = self.add_state();
                self.push_transition(current, Transition::new(top, 0, Direction::Left, split));
                let lower_cell = self.walk(split, Direction::Left, bytes - 1);
                for lower in 0..256u64 {
                    self.push_transition(
                        lower_cell,
                        Transition::new(lower, op(top, lower), Direction::Right, end),
                    );
                }
            }

            current = self.walk(end, Direction::Right, bytes.saturating_sub(2));
        }

        if bytes > 1 {
            self.set_default(current, Transition::skip(Direction::Right, exit));
        }
    }

    /// Shift the top 4-byte index left by `shift` bits in place.
    pub(super) fn gen_index_shift(&mut self, entry: StateId, shift: u32, exit: StateId) {
        let lowest = self.walk(entry, Direction::Left, 4);

        let mut carries = self.session.add_states(256);
        for value in 0..256u64 {
            let shifted = (value << shift) & 0xFF;
            self.push_transition(
                lowest,
                Transition::new(value, shifted, Direction::Right, carries[value as usize]),
            );
        }

        for i in 1..4 {
            let last = i == 3;
            let next = if last { None } else { Some(self.session.add_states(256)) };

            for (prev, &state) in carries.iter().enumerate() {
                let carried = (((prev as u64) << shift) >> 8) & 0xFF;
                for value in 0..256u64 {
                    let result = carried | ((value << shift) & 0xFF);
                    let target = match &next {
                        Some(table) => table[value as usize],
                        None => exit,
                    };
                    self.push_transition(state, Transition::new(value, result, Direction::Right, target));
                }
            }

            if let Some(table) = next {
                carries = table;
            }
        }
    }
}
