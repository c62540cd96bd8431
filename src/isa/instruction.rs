//! Instruction values consumed by the compiler.

use std::fmt;

use super::opcode::{Opcode, OperandKind};

/// One stack-machine instruction with its jump target already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand1: u64,
    pub operand2: u64,
    /// Absolute instruction position for `Label` opcodes.
    pub resolved_target: u64,
}

impl Instruction {
    /// An instruction without operands.
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            operand1: 0,
            operand2: 0,
            resolved_target: 0,
        }
    }

    /// An instruction with one constant operand.
    pub fn with_operand(opcode: Opcode, operand: u64) -> Self {
        Self {
            operand1: operand,
            ..Self::new(opcode)
        }
    }

    /// An indirect access: base offset and index bound.
    pub fn with_operands(opcode: Opcode, operand1: u64, operand2: u64) -> Self {
        Self {
            operand1,
            operand2,
            ..Self::new(opcode)
        }
    }

    /// A control transfer to an absolute instruction position.
    pub fn with_target(opcode: Opcode, target: u64) -> Self {
        Self {
            resolved_target: target,
            ..Self::new(opcode)
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        match self.opcode.operand_kind() {
            OperandKind::None => Ok(()),
            OperandKind::Const8 | OperandKind::Const16 | OperandKind::Const32 => {
                write!(f, " {}", self.operand1)
            }
            OperandKind::Const32Pair => write!(f, " {}, {}", self.operand1, self.operand2),
            OperandKind::Label => write!(f, " {}", self.resolved_target),
        }
    }
}
