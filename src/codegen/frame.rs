//! Frame generators: ENTER, ALLOC, FREE and MAKEARGS.

use crate::core::machine::{Direction, StateId, Transition, TAPE_AP, TAPE_BP};

use super::TuringCompiler;

impl<'a, 'arena> TuringCompiler<'a, 'arena> {
    /// Open a local frame.
    pub(super) fn gen_enter(&mut self, entry: StateId, exit: StateId) {
        self.set_default(entry, Transition::write(TAPE_BP, Direction::Right, exit));
    }

    /// Reserve `cells` zeroed cells.
    pub(super) fn gen_alloc(&mut self, entry: StateId, cells: usize, exit: StateId) {
        if cells == 0 {
            self.set_default(entry, Transition::skip(Direction::Stay, exit));
            return;
        }

        let mut current = entry;
        for i in 0..cells {
            let next = if i + 1 == cells { exit } else { self.add_state() };
            self.set_default(current, Transition::write(0, Direction::Right, next));
            current = next;
        }
    }

    /// Release `cells` cells, clearing them.
    pub(super) fn gen_free(&mut self, entry: StateId, cells: usize, exit: StateId) {
        let mut current = entry;
        for _ in 0..cells {
            let next = self.add_state();
            self.set_default(current, Transition::write(0, Direction::Left, next));
            current = next;
        }
        self.set_default(current, Transition::write(0, Direction::Stay, exit));
    }

    /// Open an argument block holding the top `bytes` bytes.
    ///
    /// The bytes are shifted one cell right so the `AP` marker lands
    /// directly below them.
    pub(super) fn gen_make_args(&mut self, entry: StateId, bytes: usize, exit: StateId) {
        if bytes == 0 {
            self.set_default(entry, Transition::write(TAPE_AP, Direction::Right, exit));
            return;
        }

        let first = self.walk(entry, Direction::Left, bytes);
        let mut carried = self.session.add_states(256);
        for value in 0..256u64 {
            self.push_transition(
                first,
                Transition::new(value, TAPE_AP, Direction::Right, carried[value as usize]),
            );
        }

        for _ in 1..bytes {
            let next = self.session.add_states(256);
            for (prev, &state) in carried.iter().enumerate() {
                for value in 0..256u64 {
                    self.push_transition(
                        state,
                        Transition::new(value, prev as u64, Direction::Right, next[value as usize]),
                    );
                }
            }
            carried = next;
        }

        for (prev, &state) in carried.iter().enumerate() {
            self.set_default(state, Transition::write(prev as u64, Direction::Right, exit));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::codegen::{compile, CompilerOptions};
    use crate::core::machine::{Direction, Transition, TuringMachine, TAPE_AP, TAPE_BP};
    use crate::isa::{Instruction, Opcode};

    fn build(program: &[Instruction]) -> TuringMachine {
        compile(program, &CompilerOptions::default()).unwrap()
    }

    fn entry(machine: &TuringMachine) -> usize {
        machine.states[machine.start_state].default.next_state
    }

    #[test]
    fn test_enter_writes_base_pointer() {
        let machine = build(&[Instruction::new(Opcode::Enter), Instruction::new(Opcode::Accept)]);
        let t = machine.states[entry(&machine)].default;
        assert_eq!(t.output, TAPE_BP);
        assert_eq!(t.direction, Direction::Right);
    }

    #[test]
    fn test_alloc_zero_passes_through() {
        let machine = build(&[
            Instruction::with_operand(Opcode::Alloc, 0),
            Instruction::new(Opcode::Accept),
        ]);
        let t = machine.states[entry(&machine)].default;
        assert_eq!(t, Transition::skip(Direction::Stay, t.next_state));
        assert_ne!(t.next_state, machine.reject_state);
    }

    #[test]
    fn test_free_ends_with_stay() {
        let machine = build(&[
            Instruction::with_operand(Opcode::Free, 2),
            Instruction::new(Opcode::Accept),
        ]);

        let mut t = machine.states[entry(&machine)].default;
        for _ in 0..2 {
            assert_eq!((t.output, t.direction), (0, Direction::Left));
            t = machine.states[t.next_state].default;
        }
        assert_eq!((t.output, t.direction), (0, Direction::Stay));
    }

    #[test]
    fn test_make_args_without_arguments() {
        let machine = build(&[
            Instruction::with_operand(Opcode::MakeArgs, 0),
            Instruction::new(Opcode::Accept),
        ]);
        let t = machine.states[entry(&machine)].default;
        assert_eq!((t.output, t.direction), (TAPE_AP, Direction::Right));
    }

    #[test]
    fn test_make_args_inserts_marker() {
        let machine = build(&[
            Instruction::with_operand(Opcode::MakeArgs, 1),
            Instruction::new(Opcode::Accept),
        ]);

        let first = machine.states[entry(&machine)].default.next_state;
        let branch = machine.states[first].transitions[42];
        assert_eq!((branch.input, branch.output), (42, TAPE_AP));
        let shifted = machine.states[branch.next_state].default;
        assert_eq!((shifted.output, shifted.direction), (42, Direction::Right));
    }
}
