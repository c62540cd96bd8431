// Control-transfer generators. Jumps and halts are a single default transition on the entry
// state. Conditional branches pop one byte and dispatch on it; markers are not a valid
// condition and fall through to the reject sink.
//
// Calls have no stack to push a return address onto. CALL instead stores the 2-byte id of
// its call site (see call_sites.rs) below the argument block, shifting the block one cell
// right per id byte, which yields [return slot][id_lo][id_hi][AP][args]. RET clears the
// callee's cells down to AP, reads the id back, and dispatches through a table over every
// call site in the program to the instruction after the matching CALL.

//! Jump, branch, call, return and halt generators.

use crate::core::machine::{Direction, StateId, Transition, TAPE_AP, TAPE_TEMP1};

use super::TuringCompiler;

impl<'a, 'arena> TuringCompiler<'a, 'arena> {
    pub(super) fn gen_jump(&mut self, entry: StateId, target: StateId) {
        self.set_default(entry, Transition::skip(Direction::Stay, target));
    }

    /// Pop one byte; go to `on_zero` for 0 and `on_nonzero` for any other byte.
    pub(super) fn gen_branch(&mut self, entry: StateId, on_zero: StateId, on_nonzero: StateId) {
        let cond = self.add_state();
        self.set_default(entry, Transition::skip(Direction::Left, cond));

        self.push_transition(cond, Transition::new(0, 0, Direction::Stay, on_zero));
        for value in 1..256u64 {
            self.push_transition(cond, Transition::new(value, 0, Direction::Stay, on_nonzero));
        }
    }

    /// Record call site `id` below the argument block and enter `target`.
    pub(super) fn gen_call(&mut self, entry: StateId, id: u16, target: StateId) {
        let mut current = entry;
        for i in 0..2 {
            let done = if i == 1 { target } else { self.add_state() };
            let id_byte = u64::from((id >> (8 * i)) & 0xFF);

            let scan = self.add_state();
            self.set_default(current, Transition::write(TAPE_TEMP1, Direction::Left, scan));
            let shift = self.add_state();
            self.scan_for(scan, Direction::Left, Transition::new(TAPE_AP, id_byte, Direction::Right, shift));

            // Move AP and every argument byte up by one until TEMP1 is reached.
            let carried = self.session.add_states(256);
            for value in 0..256u64 {
                self.push_transition(
                    shift,
                    Transition::new(value, TAPE_AP, Direction::Right, carried[value as usize]),
                );
            }
            self.push_transition(shift, Transition::new(TAPE_TEMP1, TAPE_AP, Direction::Right, done));

            for (prev, &state) in carried.iter().enumerate() {
                for value in 0..256u64 {
                    self.push_transition(
                        state,
                        Transition::new(value, prev as u64, Direction::Right, carried[value as usize]),
                    );
                }
                self.push_transition(state, Transition::new(TAPE_TEMP1, prev as u64, Direction::Right, done));
            }

            current = done;
        }
    }

    /// Unwind to the nearest argument block and resume after its CALL.
    pub(super) fn gen_return(&mut self, entry: StateId) {
        let high = self.add_state();
        self.set_default(entry, Transition::write(0, Direction::Left, entry));
        self.push_transition(entry, Transition::new(TAPE_AP, 0, Direction::Left, high));

        if self.call_sites.is_empty() {
            return;
        }

        let last_id = self.call_sites.len() - 1;
        let upper = last_id >> 8;
        for hi in 0..=upper {
            let low = self.add_state();
            self.push_transition(high, Transition::new(hi as u64, 0, Direction::Left, low));

            let range = if hi == upper { last_id & 0xFF } else { 0xFF };
            for lo in 0..=range {
                let return_address = self.call_sites.return_address((hi << 8) | lo);
                let resume = self.session.state_for_position(return_address);
                self.push_transition(low, Transition::new(lo as u64, 0, Direction::Stay, resume));
            }
        }
    }

    /// Stop in `sink` without touching the tape.
    pub(super) fn gen_halt(&mut self, entry: StateId, sink: StateId) {
        self.set_default(entry, Transition::skip(Direction::Stay, sink));
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;

    use crate::codegen::{compile, CompilerOptions, TuringCompiler};
    use crate::core::machine::{
        Direction, StateId, Symbol, Transition, TuringMachine, REJECT_STATE, TAPE_AP, WILDCARD,
    };
    use crate::isa::{Instruction, Opcode};

    fn build(program: &[Instruction]) -> TuringMachine {
        compile(program, &CompilerOptions::default()).unwrap()
    }

    fn entry(machine: &TuringMachine) -> usize {
        machine.states[machine.start_state].default.next_state
    }

    #[test]
    fn test_branch_enumerates_data_bytes() {
        let machine = build(&[
            Instruction::with_target(Opcode::Jf, 2),
            Instruction::new(Opcode::Reject),
            Instruction::new(Opcode::Accept),
        ]);

        let cond = &machine.states[machine.states[entry(&machine)].default.next_state];
        assert_eq!(cond.transitions.len(), 256);
        assert_eq!(cond.default.next_state, REJECT_STATE);

        let on_zero = cond.transitions[0].next_state;
        let on_one = cond.transitions[1].next_state;
        assert_ne!(on_zero, on_one);
        assert!(cond.transitions[1..].iter().all(|t| t.next_state == on_one));
        assert!(cond.transitions.iter().all(|t| t.output == 0 && t.direction == Direction::Stay));
    }

    #[test]
    fn test_jt_swaps_successors() {
        let program = |op| {
            [
                Instruction::with_target(op, 2),
                Instruction::new(Opcode::Reject),
                Instruction::new(Opcode::Accept),
            ]
        };
        let jf = build(&program(Opcode::Jf));
        let jt = build(&program(Opcode::Jt));

        let cond_f = &jf.states[jf.states[entry(&jf)].default.next_state];
        let cond_t = &jt.states[jt.states[entry(&jt)].default.next_state];
        assert_eq!(cond_f.transitions[0].next_state, cond_t.transitions[1].next_state);
        assert_eq!(cond_f.transitions[1].next_state, cond_t.transitions[0].next_state);
    }

    #[test]
    fn test_return_without_call_sites_rejects() {
        let machine = build(&[Instruction::new(Opcode::Ret)]);

        let start = entry(&machine);
        let unwind = &machine.states[start];
        assert_eq!(unwind.default.next_state, start);
        assert_eq!(unwind.transitions[0].input, TAPE_AP);

        let high = &machine.states[unwind.transitions[0].next_state];
        assert!(high.transitions.is_empty());
        assert_eq!(high.default.next_state, REJECT_STATE);
    }

    #[test]
    fn test_return_dispatch_covers_every_call_site() {
        let mut program = vec![Instruction::with_target(Opcode::Call, 4); 3];
        program.push(Instruction::new(Opcode::Accept));
        program.push(Instruction::new(Opcode::Ret));
        let machine = build(&program);

        let (_, ret_entry) = machine
            .states
            .iter()
            .enumerate()
            .find(|(id, s)| {
                s.default == Transition::write(0, Direction::Left, *id)
                    && s.transitions.len() == 1
                    && s.transitions[0].input == TAPE_AP
            })
            .unwrap();

        let high = &machine.states[ret_entry.transitions[0].next_state];
        assert_eq!(high.transitions.len(), 1);
        let low = &machine.states[high.transitions[0].next_state];
        assert_eq!(low.transitions.len(), 3);
        assert!(low.transitions.iter().all(|t| t.direction == Direction::Stay));

        let resumes: Vec<_> = low.transitions.iter().map(|t| t.next_state).collect();
        assert_ne!(resumes[0], resumes[1]);
        assert_ne!(resumes[1], resumes[2]);
    }

    /// Step from `state` until `stop` is reached; returns the final head.
    fn run_until(
        compiler: &TuringCompiler<'_, '_>,
        mut state: StateId,
        stop: StateId,
        tape: &mut [Symbol],
        mut head: usize,
    ) -> usize {
        while state != stop {
            assert_ne!(state, REJECT_STATE);
            let t = *compiler.session.state(state).transition_for(tape[head]);
            if t.output != WILDCARD {
                tape[head] = t.output;
            }
            match t.direction {
                Direction::Left => head -= 1,
                Direction::Right => head += 1,
                Direction::Stay => {}
            }
            state = t.next_state;
        }
        head
    }

    #[test]
    fn test_call_and_return_agree_on_id_byte_order() {
        let program = vec![Instruction::with_target(Opcode::Call, 0); 300];
        let arena = Bump::new();
        let mut compiler = TuringCompiler::new(&program, &arena, CompilerOptions::default()).unwrap();

        let call = compiler.add_state();
        let callee = compiler.add_state();
        compiler.gen_call(call, 0x0102, callee);
        compiler.gen_return(callee);
        let resume = compiler.session.state_for_position(0x0103);

        // Return slot, then an argument block holding one byte.
        let mut tape = [0, TAPE_AP, 9, 0, 0, 0, 0];
        let head = run_until(&compiler, call, callee, &mut tape, 3);
        assert_eq!(tape[..5], [0, 0x02, 0x01, TAPE_AP, 9]);
        assert_eq!(head, 5);

        let head = run_until(&compiler, callee, resume, &mut tape, head);
        assert_eq!(head, 1);
        assert!(tape.iter().all(|&cell| cell == 0));
    }

    #[test]
    fn test_return_dispatch_spans_two_high_bytes() {
        let program = vec![Instruction::with_target(Opcode::Call, 0); 300];
        let arena = Bump::new();
        let mut compiler = TuringCompiler::new(&program, &arena, CompilerOptions::default()).unwrap();

        let ret = compiler.add_state();
        compiler.gen_return(ret);

        let high = compiler.session.state(ret).transitions[0].next_state;
        let high = compiler.session.state(high);
        assert_eq!(high.transitions.len(), 2);

        let low_counts: Vec<_> = high
            .transitions
            .iter()
            .map(|t| compiler.session.state(t.next_state).transitions.len())
            .collect();
        assert_eq!(low_counts, vec![256, 300 - 256]);
    }
}
