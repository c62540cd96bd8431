//! Human-readable state listing.
//!
//! ```text
//! state 2:
//!   * 259 > -> 3
//! state 3:
//!   0 0 ! -> 5
//!   * * ! -> 1
//! ```

use std::io::{self, Write};

use crate::core::machine::TuringMachine;

pub fn write_listing(machine: &TuringMachine, w: &mut impl Write) -> io::Result<()> {
    for (index, state) in machine.states.iter().enumerate() {
        writeln!(w, "state {index}:")?;
        for transition in &state.transitions {
            writeln!(w, "  {transition}")?;
        }
        writeln!(w, "  {}", state.default)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{compile, CompilerOptions};
    use crate::isa::{Instruction, Opcode};

    #[test]
    fn test_listing_of_accepting_program() {
        let machine = compile(&[Instruction::new(Opcode::Accept)], &CompilerOptions::default()).unwrap();
        let mut out = Vec::new();
        write_listing(&machine, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let expected = "\
state 0:
  * * ! -> 0
state 1:
  * * ! -> 1
state 2:
  * 259 > -> 3
state 3:
  * * ! -> 0
";
        assert_eq!(text, expected);
    }
}
