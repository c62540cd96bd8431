// This module holds the pieces every other layer builds on. machine.rs is the output model
// (symbols, markers, transitions, states and the finished machine) and is deliberately free
// of compilation logic so the writer, the reader and test simulators can share it.
// session.rs owns the mutable state of a single compilation: the append-only state arena,
// the lazily filled map from instruction position to entry state, the bumpalo scratch arena
// and statistics. error.rs defines CompileError, the fatal conditions of a compilation.

//! Core tmc infrastructure
//!
//! ## Machine model (`machine`)
//! - Tape symbols, frame markers and the wildcard sentinel
//! - `Transition`, `State` and `TuringMachine`
//!
//! ## Session management (`session`)
//! - State arena with reserved accept/reject sinks
//! - Instruction-position map
//! - Scratch tables allocated with `bumpalo`
//! - Compilation statistics

pub mod error;
pub mod machine;
pub mod session;

pub use error::{CompileError, CompileResult};
pub use machine::{
    Direction, State, StateId, Symbol, Transition, TuringMachine, ACCEPT_STATE, REJECT_STATE,
    TAPE_AP, TAPE_BP, TAPE_GP, TAPE_TEMP1, WILDCARD,
};
pub use session::{CompilationSession, SessionStats};
