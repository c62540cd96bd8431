//! Call-site table.
//!
//! The machine has no call stack, so a return is a finite dispatch over
//! every return address in the program. Each CALL gets a sequential id
//! that the call stores on the tape as two bytes and RET decodes again.

use crate::core::error::{CompileError, CompileResult};
use crate::isa::{Instruction, Opcode};

/// Most call sites a 2-byte id can address.
pub const MAX_CALL_SITES: usize = 1 << 16;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSiteTable {
    /// Return address per call-site id.
    return_addresses: Vec<usize>,
}

impl CallSiteTable {
    /// Scan `instructions` once, assigning ids to return addresses in order.
    pub fn build(instructions: &[Instruction]) -> CompileResult<Self> {
        let return_addresses: Vec<usize> = instructions
            .iter()
            .enumerate()
            .filter(|(_, instr)| instr.opcode == Opcode::Call)
            .map(|(position, _)| position + 1)
            .collect();

        if return_addresses.len() > MAX_CALL_SITES {
            return Err(CompileError::CallSiteOverflow {
                count: return_addresses.len(),
                limit: MAX_CALL_SITES,
            });
        }

        Ok(Self { return_addresses })
    }

    /// Id assigned to the CALL at `call_position`.
    ///
    /// Return addresses are strictly increasing, so this is a binary search.
    pub fn id_for_call(&self, call_position: usize) -> Option<u16> {
        self.return_addresses
            .binary_search(&(call_position + 1))
            .ok()
            .map(|id| id as u16)
    }

    /// Return address recorded for `id`.
    pub fn return_address(&self, id: usize) -> usize {
        self.return_addresses[id]
    }

    pub fn len(&self) -> usize {
        self.return_addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.return_addresses.is_empty()
    }
}
