//! Binary machine writer.

use std::io::Write;

use crate::core::machine::{Transition, TuringMachine};

use super::FormatResult;

/// Write `machine` in the binary format.
///
/// Header fields come first, then one record per state in id order.
pub fn write_machine(machine: &TuringMachine, w: &mut impl Write) -> FormatResult<()> {
    write_u64(w, machine.start_state as u64)?;
    write_u64(w, machine.accept_state as u64)?;
    write_u64(w, machine.reject_state as u64)?;
    write_u64(w, machine.states.len() as u64)?;

    for (index, state) in machine.states.iter().enumerate() {
        write_u64(w, index as u64)?;
        write_u64(w, state.transitions.len() as u64)?;

        let default = &state.default;
        write_u64(w, default.output)?;
        w.write_all(&[default.direction.code()])?;
        write_u64(w, default.next_state as u64)?;

        for transition in &state.transitions {
            write_transition(w, transition)?;
        }
    }

    log::debug!(
        "Wrote {} states with {} transitions",
        machine.states.len(),
        machine.transition_count()
    );
    Ok(())
}

fn write_transition(w: &mut impl Write, transition: &Transition) -> FormatResult<()> {
    write_u64(w, transition.input)?;
    write_u64(w, transition.output)?;
    w.write_all(&[transition.direction.code()])?;
    write_u64(w, transition.next_state as u64)
}

fn write_u64(w: &mut impl Write, value: u64) -> FormatResult<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::machine::{Direction, State, ACCEPT_STATE, REJECT_STATE, WILDCARD};

    #[test]
    fn test_layout_of_minimal_machine() {
        let mut start = State::with_default(Transition::write(7, Direction::Right, ACCEPT_STATE));
        start.transitions.push(Transition::new(3, WILDCARD, Direction::Left, REJECT_STATE));
        let machine = TuringMachine {
            start_state: 2,
            accept_state: ACCEPT_STATE,
            reject_state: REJECT_STATE,
            states: vec![
                State::with_default(Transition::skip(Direction::Stay, ACCEPT_STATE)),
                State::with_default(Transition::skip(Direction::Stay, REJECT_STATE)),
                start,
            ],
        };

        let mut bytes = Vec::new();
        write_machine(&machine, &mut bytes).unwrap();

        // Header, two bare states, one state with one transition.
        assert_eq!(bytes.len(), 4 * 8 + 2 * 33 + 33 + 25);
        assert_eq!(&bytes[0..8], &2u64.to_le_bytes());
        assert_eq!(&bytes[24..32], &3u64.to_le_bytes());

        // Sink 0: index, count, wildcard output, STAY, next 0.
        assert_eq!(&bytes[32..40], &0u64.to_le_bytes());
        assert_eq!(&bytes[48..56], &u64::MAX.to_le_bytes());
        assert_eq!(bytes[56], 0);

        let last = &bytes[bytes.len() - 25..];
        assert_eq!(&last[0..8], &3u64.to_le_bytes());
        assert_eq!(&last[8..16], &u64::MAX.to_le_bytes());
        assert_eq!(last[16], Direction::Left.code());
        assert_eq!(&last[17..25], &1u64.to_le_bytes());
    }
}
