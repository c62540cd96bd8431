// This module provides the compilation session: the single owner of all mutable state of one
// compilation run. CompilationSession holds the state arena (an append-only Vec of states whose
// indices are the state ids), the lazily populated map from instruction position to entry
// state, a bumpalo arena for generator scratch tables (the 256-entry dispatch rows used by
// dup, swap, makeargs, idxshft, call and the indirect load/store index tables), and the
// compilation statistics. The reserved accept and reject sinks are allocated by the
// constructor so ids 0 and 1 are fixed before any generator runs. Every other state is born
// with a default transition into the reject sink, so a state that no generator finished
// wiring fails safe instead of looping.

//! Arena-based compilation session management.

use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;
use hashbrown::HashMap;
use std::fmt;

use super::machine::{
    Direction, State, StateId, Transition, ACCEPT_STATE, REJECT_STATE,
};

/// Compilation session owning the state arena of one compilation.
pub struct CompilationSession<'arena> {
    /// Scratch arena for generator tables.
    arena: &'arena Bump,

    /// State arena; a state's id is its index.
    states: Vec<State>,

    /// Entry state per instruction position.
    position_states: HashMap<usize, StateId>,

    stats: SessionStats,
}

impl<'arena> CompilationSession<'arena> {
    /// Create a new session with the accept and reject sinks in place.
    pub fn new(arena: &'arena Bump) -> Self {
        let mut states = Vec::new();
        states.push(State::with_default(Transition::skip(Direction::Stay, ACCEPT_STATE)));
        states.push(State::with_default(Transition::skip(Direction::Stay, REJECT_STATE)));

        Self {
            arena,
            states,
            position_states: HashMap::new(),
            stats: SessionStats::default(),
        }
    }

    /// Get access to the scratch arena.
    pub fn arena(&self) -> &'arena Bump {
        self.arena
    }

    /// Allocate a fresh state that rejects until wired.
    pub fn add_state(&mut self) -> StateId {
        let id = self.states.len();
        self.states
            .push(State::with_default(Transition::skip(Direction::Stay, REJECT_STATE)));
        self.stats.states_allocated += 1;
        id
    }

    /// Allocate `count` fresh states and return their ids in a scratch table.
    pub fn add_states(&mut self, count: usize) -> BumpVec<'arena, StateId> {
        let mut table = BumpVec::with_capacity_in(count, self.arena);
        for _ in 0..count {
            table.push(self.add_state());
        }
        table
    }

    /// Entry state of the instruction at `position`, allocated on first use.
    pub fn state_for_position(&mut self, position: usize) -> StateId {
        if let Some(&id) = self.position_states.get(&position) {
            return id;
        }
        let id = self.add_state();
        self.position_states.insert(position, id);
        id
    }

    /// Replace the default transition of `state`.
    pub fn set_default(&mut self, state: StateId, transition: Transition) {
        self.states[state].default = transition;
    }

    /// Append an explicit transition to `state`.
    pub fn push_transition(&mut self, state: StateId, transition: Transition) {
        self.states[state].transitions.push(transition);
    }

    pub fn state(&self, state: StateId) -> &State {
        &self.states[state]
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Record an instruction compilation.
    pub fn record_instruction_compiled(&mut self, opcode: &'static str) {
        self.stats.instructions_compiled += 1;
        *self.stats.instruction_counts.entry(opcode).or_insert(0) += 1;
    }

    /// Record the size of the call-site table.
    pub fn record_call_sites(&mut self, count: usize) {
        self.stats.call_sites = count;
    }

    /// Get compilation statistics.
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Finish the session, handing out the states in allocation order.
    pub fn into_states(self) -> Vec<State> {
        self.states
    }
}

/// Compilation session statistics.
#[derive(Debug, Default, Clone)]
pub struct SessionStats {
    /// States allocated after the two reserved sinks.
    pub states_allocated: usize,

    /// Number of instructions compiled.
    pub instructions_compiled: usize,

    /// Count of each opcode compiled.
    pub instruction_counts: HashMap<&'static str, usize>,

    /// Entries in the call-site table.
    pub call_sites: usize,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Compilation Session Statistics:")?;
        writeln!(f, "  Instructions compiled: {}", self.instructions_compiled)?;
        writeln!(f, "  States allocated: {}", self.states_allocated)?;
        writeln!(f, "  Call sites: {}", self.call_sites)?;

        if !self.instruction_counts.is_empty() {
            writeln!(f, "  Instruction breakdown:")?;
            let mut sorted: Vec<_> = self.instruction_counts.iter().collect();
            sorted.sort_by(|(a_name, a_count), (b_name, b_count)| {
                b_count.cmp(a_count).then(a_name.cmp(b_name))
            });

            for (opcode, count) in sorted.into_iter().take(10) {
                writeln!(f, "    {}: {}", opcode, count)?;
            }
        }

        Ok(())
    }
}
