// Load and store generators for locals, arguments and globals. A variable lives at a fixed
// offset to the right of its frame marker (BP, AP or GP). Since the machine cannot address
// cells, every access parks a TEMP1 marker at the stack top, scans left to the nearest frame
// marker, walks the offset, and scans right again to TEMP1. The byte being moved travels in
// the control state: one branch per possible value.
//
// Indirect accesses pop a 4-byte index and decode it most significant byte first through a
// cascade of dispatch tables, ending in one leaf per index value. Each leaf is a complete
// direct access with the index folded into its offset, so an index outside the bound finds
// no transition and the machine rejects.

//! Direct and indirect memory access generators.

use bumpalo::collections::Vec as BumpVec;

use crate::core::machine::{Direction, StateId, Symbol, Transition, TAPE_AP, TAPE_TEMP1};

use super::TuringCompiler;

/// Indices covered by one entry of each dispatch level, most significant first.
const LEVEL_SPANS: [u64; 4] = [1 << 24, 1 << 16, 1 << 8, 1];

impl<'a, 'arena> TuringCompiler<'a, 'arena> {
    /// Push the `bytes`-wide variable at `offset` past `marker`.
    pub(super) fn gen_load(
        &mut self,
        entry: StateId,
        bytes: usize,
        offset: usize,
        marker: Symbol,
        exit: StateId,
    ) {
        let mut current = entry;
        for j in 0..bytes {
            let write_back = if j + 1 == bytes { exit } else { self.add_state() };

            let scan = self.add_state();
            self.set_default(current, Transition::write(TAPE_TEMP1, Direction::Left, scan));
            let found = self.add_state();
            self.scan_for(scan, Direction::Left, Transition::new(marker, marker, Direction::Right, found));

            let cell = self.walk(found, Direction::Right, offset + j);
            for value in 0..256u64 {
                let carry = self.add_state();
                self.push_transition(cell, Transition::new(value, value, Direction::Right, carry));
                self.scan_for(
                    carry,
                    Direction::Right,
                    Transition::new(TAPE_TEMP1, value, Direction::Right, write_back),
                );
            }

            current = write_back;
        }
    }

    /// Pop a `bytes`-wide value into the variable at `offset` past `marker`.
    pub(super) fn gen_store(
        &mut self,
        entry: StateId,
        bytes: usize,
        offset: usize,
        marker: Symbol,
        exit: StateId,
    ) {
        let mut current = entry;
        for k in 0..bytes {
            let next_iter = if k + 1 == bytes { exit } else { self.add_state() };

            let top = self.add_state();
            self.set_default(current, Transition::write(0, Direction::Left, top));
            let back = self.add_state();

            for value in 0..256u64 {
                let scan = self.add_state();
                self.push_transition(top, Transition::new(value, TAPE_TEMP1, Direction::Left, scan));
                let found = self.add_state();
                self.scan_for(scan, Direction::Left, Transition::new(marker, marker, Direction::Right, found));
                let cell = self.walk(found, Direction::Right, offset + bytes - k - 1);
                self.set_default(cell, Transition::write(value, Direction::Right, back));
            }

            self.scan_for(back, Direction::Right, Transition::new(TAPE_TEMP1, 0, Direction::Stay, next_iter));
            current = next_iter;
        }
    }

    pub(super) fn gen_load_indirect(
        &mut self,
        entry: StateId,
        bytes: usize,
        base: usize,
        max_index: usize,
        marker: Symbol,
        exit: StateId,
    ) {
        let leaves = self.gen_index_dispatch(entry, max_index);
        for (index, &leaf) in leaves.iter().enumerate() {
            self.gen_load(leaf, bytes, base + index, marker, exit);
        }
    }

    pub(super) fn gen_store_indirect(
        &mut self,
        entry: StateId,
        bytes: usize,
        base: usize,
        max_index: usize,
        marker: Symbol,
        exit: StateId,
    ) {
        let leaves = self.gen_index_dispatch(entry, max_index);
        for (index, &leaf) in leaves.iter().enumerate() {
            self.gen_store(leaf, bytes, base + index, marker, exit);
        }
    }

    /// Pop a 4-byte index and route to one leaf state per index below `max_index`.
    ///
    /// Every leaf starts on the cell of the popped index's low byte, which is
    /// the new free cell.
    fn gen_index_dispatch(&mut self, entry: StateId, max_index: usize) -> BumpVec<'arena, StateId> {
        let top = self.add_state();
        self.set_default(entry, Transition::write(0, Direction::Left, top));

        let mut levels = BumpVec::with_capacity_in(LEVEL_SPANS.len(), self.session.arena());
        for span in LEVEL_SPANS {
            let width = (max_index as u64).div_ceil(span) as usize;
            levels.push(self.session.add_states(width));
        }

        for (byte, &state) in levels[0].iter().enumerate() {
            self.push_transition(top, Transition::new(byte as u64, 0, Direction::Left, state));
        }

        for level in 0..LEVEL_SPANS.len() - 1 {
            let direction = if level + 2 == LEVEL_SPANS.len() {
                Direction::Stay
            } else {
                Direction::Left
            };
            for (j, &child) in levels[level + 1].iter().enumerate() {
                let parent = levels[level][j / 256];
                self.push_transition(
                    parent,
                    Transition::new((j % 256) as u64, 0, direction, child),
                );
            }
        }

        levels.pop().unwrap_or_else(|| BumpVec::new_in(self.session.arena()))
    }

    /// Pop a `bytes`-wide value into the caller's return slot below the
    /// nearest argument block.
    pub(super) fn gen_set_return(&mut self, entry: StateId, bytes: usize, exit: StateId) {
        let mut current = entry;
        for i in 0..bytes {
            let next_iter = if i + 1 == bytes { exit } else { self.add_state() };

            let top = self.add_state();
            self.set_default(current, Transition::write(0, Direction::Left, top));
            let join = self.add_state();

            for value in 0..256u64 {
                let scan = self.add_state();
                self.push_transition(top, Transition::new(value, TAPE_TEMP1, Direction::Left, scan));
                let found = self.add_state();
                self.scan_for(scan, Direction::Left, Transition::new(TAPE_AP, TAPE_AP, Direction::Left, found));
                // Skip the call-site id, then `i` bytes into the slot from its top.
                let slot = self.walk(found, Direction::Left, 2 + i);
                self.set_default(slot, Transition::write(value, Direction::Right, join));
            }

            self.scan_for(join, Direction::Right, Transition::new(TAPE_TEMP1, 0, Direction::Stay, next_iter));
            current = next_iter;
        }
    }
}
