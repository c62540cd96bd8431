//! Shared helpers for integration tests: a small tape simulator for compiled machines.

#![allow(dead_code)]

use hashbrown::HashMap;

use tmc::codegen::{compile, CompilerOptions};
use tmc::core::machine::{Direction, StateId, Symbol, TuringMachine, WILDCARD};
use tmc::isa::Instruction;

/// Step budget generous enough for every test program.
pub const MAX_STEPS: usize = 5_000_000;

/// Outcome of running a machine on a blank tape.
pub struct Run {
    pub final_state: StateId,
    pub accepted: bool,
    pub rejected: bool,
    pub head: i64,
    pub tape: HashMap<i64, Symbol>,
    pub steps: usize,
}

impl Run {
    /// Symbol at `pos`; unwritten cells are blank (0).
    pub fn cell(&self, pos: i64) -> Symbol {
        self.tape.get(&pos).copied().unwrap_or(0)
    }

    /// The `count` cells directly below the head, lowest address first.
    pub fn top_bytes(&self, count: usize) -> Vec<Symbol> {
        (self.head - count as i64..self.head).map(|pos| self.cell(pos)).collect()
    }

    /// Top stack byte.
    pub fn top(&self) -> Symbol {
        self.cell(self.head - 1)
    }

    /// Little-endian value of the top `bytes` cells.
    pub fn top_value(&self, bytes: usize) -> u64 {
        self.top_bytes(bytes)
            .iter()
            .rev()
            .fold(0, |acc, &byte| (acc << 8) | byte)
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Run `machine` from its start state on a blank tape with the head at 0.
pub fn simulate(machine: &TuringMachine) -> Run {
    let mut tape = HashMap::new();
    let mut head = 0i64;
    let mut state = machine.start_state;
    let mut steps = 0;

    while state != machine.accept_state && state != machine.reject_state && steps < MAX_STEPS {
        let symbol = tape.get(&head).copied().unwrap_or(0);
        let transition = machine.states[state].transition_for(symbol);

        if transition.output != WILDCARD {
            tape.insert(head, transition.output);
        }
        match transition.direction {
            Direction::Left => head -= 1,
            Direction::Right => head += 1,
            Direction::Stay => {}
        }
        state = transition.next_state;
        steps += 1;
    }

    Run {
        final_state: state,
        accepted: state == machine.accept_state,
        rejected: state == machine.reject_state,
        head,
        tape,
        steps,
    }
}

/// Compile with default options and simulate.
pub fn run_program(program: &[Instruction]) -> Run {
    let machine = compile(program, &CompilerOptions::default()).expect("program compiles");
    simulate(&machine)
}

/// Like [`run_program`], but the program must be accepted.
pub fn run_accepted(program: &[Instruction]) -> Run {
    let run = run_program(program);
    assert!(
        run.accepted,
        "machine stopped in state {} after {} steps",
        run.final_state, run.steps
    );
    run
}
