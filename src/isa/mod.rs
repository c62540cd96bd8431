//! Instruction set of the stack machine the compiler consumes.

pub mod instruction;
pub mod opcode;

pub use instruction::Instruction;
pub use opcode::{Opcode, OperandKind};
