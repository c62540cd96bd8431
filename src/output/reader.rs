//! Binary machine reader.

use std::io::Read;

use crate::core::machine::{Direction, State, Transition, TuringMachine, WILDCARD};

use super::{FormatError, FormatResult};

/// Read a machine written by [`write_machine`](super::write_machine).
pub fn read_machine(r: &mut impl Read) -> FormatResult<TuringMachine> {
    let start_state = read_u64(r)? as usize;
    let accept_state = read_u64(r)? as usize;
    let reject_state = read_u64(r)? as usize;
    let state_count = read_u64(r)?;

    let mut states = Vec::new();
    for expected in 0..state_count {
        let found = read_u64(r)?;
        if found != expected {
            return Err(FormatError::StateIndexMismatch { expected, found });
        }

        let transition_count = read_u64(r)?;
        let output = read_u64(r)?;
        let direction = read_direction(r)?;
        let next_state = read_u64(r)? as usize;
        let mut state = State::with_default(Transition::new(WILDCARD, output, direction, next_state));

        for _ in 0..transition_count {
            let input = read_u64(r)?;
            let output = read_u64(r)?;
            let direction = read_direction(r)?;
            let next_state = read_u64(r)? as usize;
            state
                .transitions
                .push(Transition::new(input, output, direction, next_state));
        }

        states.push(state);
    }

    Ok(TuringMachine {
        start_state,
        accept_state,
        reject_state,
        states,
    })
}

fn read_u64(r: &mut impl Read) -> FormatResult<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_direction(r: &mut impl Read) -> FormatResult<Direction> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Direction::from_code(buf[0]).ok_or(FormatError::InvalidDirection(buf[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{compile, CompilerOptions};
    use crate::isa::{Instruction, Opcode};
    use crate::output::write_machine;

    fn sample() -> TuringMachine {
        let program = [
            Instruction::with_operand(Opcode::Push8, 9),
            Instruction::with_target(Opcode::Jt, 3),
            Instruction::new(Opcode::Reject),
            Instruction::new(Opcode::Accept),
        ];
        compile(&program, &CompilerOptions::default()).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let machine = sample();
        let mut bytes = Vec::new();
        write_machine(&machine, &mut bytes).unwrap();

        let decoded = read_machine(&mut bytes.as_slice()).unwrap();
        assert_eq!(decoded, machine);
    }

    #[test]
    fn test_truncated_input() {
        let mut bytes = Vec::new();
        write_machine(&sample(), &mut bytes).unwrap();
        bytes.truncate(bytes.len() - 3);

        let err = read_machine(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(err, FormatError::Io(_)));
    }

    #[test]
    fn test_invalid_direction() {
        let mut bytes = Vec::new();
        write_machine(&sample(), &mut bytes).unwrap();
        // Direction byte of the accept sink's default transition.
        bytes[4 * 8 + 3 * 8] = 9;

        let err = read_machine(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(err, FormatError::InvalidDirection(9)));
    }

    #[test]
    fn test_state_index_mismatch() {
        let mut bytes = Vec::new();
        write_machine(&sample(), &mut bytes).unwrap();
        bytes[4 * 8] = 5;

        let err = read_machine(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            FormatError::StateIndexMismatch {
                expected: 0,
                found: 5
            }
        ));
    }
}
