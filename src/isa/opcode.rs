//! Stack-machine opcodes and their operand arity.
//!
//! The discriminant order is the raw opcode encoding shared with the
//! front end, so new opcodes may only be appended.

use std::fmt;

use crate::core::error::CompileError;
use crate::core::machine::{Symbol, TAPE_AP, TAPE_BP, TAPE_GP};

/// Operand shape an opcode expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    None,
    Const8,
    Const16,
    Const32,
    /// Base offset and index bound of an indirect access.
    Const32Pair,
    /// Absolute instruction position.
    Label,
}

impl OperandKind {
    /// Largest constant accepted for the first operand.
    pub fn max_value(self) -> u64 {
        match self {
            OperandKind::Const8 => u8::MAX as u64,
            OperandKind::Const16 => u16::MAX as u64,
            OperandKind::None => 0,
            OperandKind::Const32 | OperandKind::Const32Pair | OperandKind::Label => {
                u32::MAX as u64
            }
        }
    }

    /// Number of comma separated operands in assembly text.
    pub fn operand_count(self) -> usize {
        match self {
            OperandKind::None => 0,
            OperandKind::Const32Pair => 2,
            _ => 1,
        }
    }
}

macro_rules! opcodes {
    ($($variant:ident => $name:literal, $kind:ident;)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum Opcode {
            $($variant,)*
        }

        impl Opcode {
            /// Every opcode in encoding order.
            pub const ALL: &'static [Opcode] = &[$(Opcode::$variant,)*];

            /// Assembly mnemonic.
            pub fn name(self) -> &'static str {
                match self {
                    $(Opcode::$variant => $name,)*
                }
            }

            pub fn operand_kind(self) -> OperandKind {
                match self {
                    $(Opcode::$variant => OperandKind::$kind,)*
                }
            }
        }
    };
}

opcodes! {
    Push8 => "PUSH8", Const8;
    Push16 => "PUSH16", Const16;
    Push32 => "PUSH32", Const32;
    Pop8 => "POP8", None;
    Pop16 => "POP16", None;
    Pop32 => "POP32", None;
    Dup8 => "DUP8", None;
    Dup16 => "DUP16", None;
    Dup32 => "DUP32", None;
    Swap8 => "SWAP8", Const32;
    Swap16 => "SWAP16", Const32;
    Swap32 => "SWAP32", Const32;

    Enter => "ENTER", None;
    Alloc => "ALLOC", Const32;
    Free => "FREE", Const32;
    GetLocal8 => "GETLOCAL8", Const32;
    GetLocal16 => "GETLOCAL16", Const32;
    GetLocal32 => "GETLOCAL32", Const32;
    GetLocalInd8 => "GETLOCALIND8", Const32Pair;
    GetLocalInd16 => "GETLOCALIND16", Const32Pair;
    GetLocalInd32 => "GETLOCALIND32", Const32Pair;
    SetLocal8 => "SETLOCAL8", Const32;
    SetLocal16 => "SETLOCAL16", Const32;
    SetLocal32 => "SETLOCAL32", Const32;
    SetLocalInd8 => "SETLOCALIND8", Const32Pair;
    SetLocalInd16 => "SETLOCALIND16", Const32Pair;
    SetLocalInd32 => "SETLOCALIND32", Const32Pair;
    GetArg8 => "GETARG8", Const32;
    GetArg16 => "GETARG16", Const32;
    GetArg32 => "GETARG32", Const32;
    GetArgInd8 => "GETARGIND8", Const32Pair;
    GetArgInd16 => "GETARGIND16", Const32Pair;
    GetArgInd32 => "GETARGIND32", Const32Pair;
    SetArg8 => "SETARG8", Const32;
    SetArg16 => "SETARG16", Const32;
    SetArg32 => "SETARG32", Const32;
    SetArgInd8 => "SETARGIND8", Const32Pair;
    SetArgInd16 => "SETARGIND16", Const32Pair;
    SetArgInd32 => "SETARGIND32", Const32Pair;
    MakeArgs => "MAKEARGS", Const32;

    GetGlobal8 => "GETGLOBAL8", Const32;
    GetGlobal16 => "GETGLOBAL16", Const32;
    GetGlobal32 => "GETGLOBAL32", Const32;
    GetGlobalInd8 => "GETGLOBALIND8", Const32Pair;
    GetGlobalInd16 => "GETGLOBALIND16", Const32Pair;
    GetGlobalInd32 => "GETGLOBALIND32", Const32Pair;
    SetGlobal8 => "SETGLOBAL8", Const32;
    SetGlobal16 => "SETGLOBAL16", Const32;
    SetGlobal32 => "SETGLOBAL32", Const32;
    SetGlobalInd8 => "SETGLOBALIND8", Const32Pair;
    SetGlobalInd16 => "SETGLOBALIND16", Const32Pair;
    SetGlobalInd32 => "SETGLOBALIND32", Const32Pair;

    Add8 => "ADD8", None;
    Add16 => "ADD16", None;
    Add32 => "ADD32", None;
    Sub8 => "SUB8", None;
    Sub16 => "SUB16", None;
    Sub32 => "SUB32", None;
    And8 => "AND8", None;
    And16 => "AND16", None;
    And32 => "AND32", None;
    Or8 => "OR8", None;
    Or16 => "OR16", None;
    Or32 => "OR32", None;
    Xor8 => "XOR8", None;
    Xor16 => "XOR16", None;
    Xor32 => "XOR32", None;

    IdxShft => "IDXSHFT", Const32;

    Jmp => "JMP", Label;
    Jf => "JF", Label;
    Jt => "JT", Label;
    Call => "CALL", Label;
    Ret => "RET", None;

    SetRet8 => "SETRET8", None;
    SetRet16 => "SETRET16", None;
    SetRet32 => "SETRET32", None;

    Accept => "ACCEPT", None;
    Reject => "REJECT", None;
}

impl Opcode {
    /// Look up a mnemonic, ignoring case.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(mnemonic))
    }

    /// Raw encoding of this opcode.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Operand width in bytes of a sized opcode; 1 for everything else.
    pub fn width(self) -> usize {
        use Opcode::*;
        match self {
            Push16 | Pop16 | Dup16 | Swap16 | GetLocal16 | GetLocalInd16 | SetLocal16
            | SetLocalInd16 | GetArg16 | GetArgInd16 | SetArg16 | SetArgInd16 | GetGlobal16
            | GetGlobalInd16 | SetGlobal16 | SetGlobalInd16 | Add16 | Sub16 | And16 | Or16
            | Xor16 | SetRet16 => 2,
            Push32 | Pop32 | Dup32 | Swap32 | GetLocal32 | GetLocalInd32 | SetLocal32
            | SetLocalInd32 | GetArg32 | GetArgInd32 | SetArg32 | SetArgInd32 | GetGlobal32
            | GetGlobalInd32 | SetGlobal32 | SetGlobalInd32 | Add32 | Sub32 | And32 | Or32
            | Xor32 | SetRet32 => 4,
            _ => 1,
        }
    }

    /// Marker that anchors a local, argument or global access.
    pub fn frame_marker(self) -> Option<Symbol> {
        use Opcode::*;
        match self {
            GetLocal8 | GetLocal16 | GetLocal32 | GetLocalInd8 | GetLocalInd16
            | GetLocalInd32 | SetLocal8 | SetLocal16 | SetLocal32 | SetLocalInd8
            | SetLocalInd16 | SetLocalInd32 => Some(TAPE_BP),
            GetArg8 | GetArg16 | GetArg32 | GetArgInd8 | GetArgInd16 | GetArgInd32
            | SetArg8 | SetArg16 | SetArg32 | SetArgInd8 | SetArgInd16 | SetArgInd32 => {
                Some(TAPE_AP)
            }
            GetGlobal8 | GetGlobal16 | GetGlobal32 | GetGlobalInd8 | GetGlobalInd16
            | GetGlobalInd32 | SetGlobal8 | SetGlobal16 | SetGlobal32 | SetGlobalInd8
            | SetGlobalInd16 | SetGlobalInd32 => Some(TAPE_GP),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = CompileError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or(CompileError::UnsupportedOpcode { code })
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
