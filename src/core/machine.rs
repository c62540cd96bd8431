// This module defines the output model of the compiler: the Turing Machine itself. A machine
// is a start state plus an ordered list of states; each state holds an ordered list of
// explicit transitions and one default transition taken when no explicit input matches.
// Tape symbols are plain u64 values: 0..=255 are data bytes, 256..=259 are the frame and
// scratch markers, and u64::MAX is the wildcard sentinel used on transition inputs (match
// anything) and outputs (write back what was read). State ids are indices into the state
// list; 0 and 1 are always the accept and reject sinks.

//! Turing Machine data model.

use std::fmt;

/// Index of a state in [`TuringMachine::states`].
pub type StateId = usize;

/// A tape symbol.
pub type Symbol = u64;

/// Matches any symbol on input, writes back the read symbol on output.
pub const WILDCARD: Symbol = u64::MAX;

/// Base pointer marker, opens a local frame.
pub const TAPE_BP: Symbol = 256;
/// Argument pointer marker, opens an argument block.
pub const TAPE_AP: Symbol = 257;
/// Scratch marker used to find the way back after a scan.
pub const TAPE_TEMP1: Symbol = 258;
/// Global pointer marker, written once at the start of the tape.
pub const TAPE_GP: Symbol = 259;

pub const ACCEPT_STATE: StateId = 0;
pub const REJECT_STATE: StateId = 1;

/// Head movement after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Stay,
    Left,
    Right,
}

impl Direction {
    /// Wire encoding used by the binary format.
    pub fn code(self) -> u8 {
        match self {
            Direction::Stay => 0,
            Direction::Left => 1,
            Direction::Right => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Direction::Stay),
            1 => Some(Direction::Left),
            2 => Some(Direction::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Direction::Stay => "!",
            Direction::Left => "<",
            Direction::Right => ">",
        };
        f.write_str(c)
    }
}

/// A single transition: read `input`, write `output`, move, go to `next_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    pub input: Symbol,
    pub output: Symbol,
    pub direction: Direction,
    pub next_state: StateId,
}

impl Transition {
    pub const fn new(input: Symbol, output: Symbol, direction: Direction, next_state: StateId) -> Self {
        Self {
            input,
            output,
            direction,
            next_state,
        }
    }

    /// Leave the cell untouched and move.
    pub const fn skip(direction: Direction, next_state: StateId) -> Self {
        Self::new(WILDCARD, WILDCARD, direction, next_state)
    }

    /// Overwrite whatever is under the head and move.
    pub const fn write(output: Symbol, direction: Direction, next_state: StateId) -> Self {
        Self::new(WILDCARD, output, direction, next_state)
    }
}

fn fmt_symbol(f: &mut fmt::Formatter<'_>, symbol: Symbol) -> fmt::Result {
    if symbol == WILDCARD {
        f.write_str("*")
    } else {
        write!(f, "{symbol}")
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_symbol(f, self.input)?;
        f.write_str(" ")?;
        fmt_symbol(f, self.output)?;
        write!(f, " {} -> {}", self.direction, self.next_state)
    }
}

/// A machine state. Explicit transitions are tried in order before `default`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub transitions: Vec<Transition>,
    pub default: Transition,
}

impl State {
    /// A state whose only behavior is its default transition.
    pub fn with_default(default: Transition) -> Self {
        Self {
            transitions: Vec::new(),
            default,
        }
    }

    /// Transition that fires when `symbol` is under the head.
    pub fn transition_for(&self, symbol: Symbol) -> &Transition {
        self.transitions
            .iter()
            .find(|t| t.input == symbol)
            .unwrap_or(&self.default)
    }
}

/// A complete, immutable compilation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuringMachine {
    pub start_state: StateId,
    pub accept_state: StateId,
    pub reject_state: StateId,
    pub states: Vec<State>,
}

impl TuringMachine {
    /// Total number of explicit transitions across all states.
    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_star_for_wildcards() {
        let t = Transition::skip(Direction::Left, 7);
        assert_eq!(t.to_string(), "* * < -> 7");

        let t = Transition::new(3, TAPE_AP, Direction::Right, 12);
        assert_eq!(t.to_string(), "3 257 > -> 12");
    }

    #[test]
    fn direction_codes_are_stable() {
        for dir in [Direction::Stay, Direction::Left, Direction::Right] {
            assert_eq!(Direction::from_code(dir.code()), Some(dir));
        }
        assert_eq!(Direction::from_code(3), None);
    }

    #[test]
    fn transition_for_falls_back_to_default() {
        let mut state = State::with_default(Transition::skip(Direction::Stay, REJECT_STATE));
        state.transitions.push(Transition::new(0, 1, Direction::Right, 5));

        assert_eq!(state.transition_for(0).next_state, 5);
        assert_eq!(state.transition_for(TAPE_GP).next_state, REJECT_STATE);
    }
}
