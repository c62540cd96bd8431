// This module defines error types for the tmc compiler using the thiserror crate. CompileError
// covers the fatal conditions of a compilation: raw opcode values outside the instruction set,
// programs with more call sites than a 2-byte call-site id can encode, constants wider than
// their opcode's operand, indirect accesses whose index bound is unusable, index shifts that
// a single-byte carry cannot express, and jump targets past the end of the program. None of
// them is recoverable mid-compile because the partially built state graph is not valid.
// CompileResult<T> is a convenience alias.

//! Error types for the tmc compiler.

use thiserror::Error;

use crate::isa::Opcode;

/// Main error type for instruction-to-machine compilation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Unsupported opcode value {code}")]
    UnsupportedOpcode { code: u8 },

    #[error("Too many call sites: {count} (at most {limit} can be encoded)")]
    CallSiteOverflow { count: usize, limit: usize },

    #[error("Instruction {position}: index bound {max_index} outside 1..={limit}")]
    IndexOutOfRange {
        position: usize,
        max_index: u64,
        limit: u64,
    },

    #[error("Instruction {position}: operand {value} does not fit {opcode} (max {max})")]
    OperandOutOfRange {
        position: usize,
        opcode: Opcode,
        value: u64,
        max: u64,
    },

    #[error("Instruction {position}: index shift {amount} exceeds 8 bits")]
    InvalidShift { position: usize, amount: u64 },

    #[error("Instruction {position}: jump target {target} beyond program end {len}")]
    JumpTargetOutOfRange {
        position: usize,
        target: u64,
        len: usize,
    },
}

/// Result type alias for compile operations.
pub type CompileResult<T> = Result<T, CompileError>;
