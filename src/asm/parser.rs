// Line-oriented assembler for the stack-machine instruction set. Each non-empty line holds
// an optional `label:` definition and at most one instruction: a case-insensitive mnemonic
// followed by comma separated operands. Everything after `#` is a comment. Labels name the
// position of the next instruction and may be referenced before they are defined, so
// parsing is two passes: the first builds instructions with pending label names, the second
// resolves them against the label map into absolute positions.

//! Textual assembly parser.

use hashbrown::HashMap;
use thiserror::Error;

use crate::isa::{Instruction, Opcode, OperandKind};

/// Assembly syntax errors. `line` is 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: unknown opcode `{mnemonic}`")]
    UnknownOpcode { line: usize, mnemonic: String },

    #[error("line {line}: {opcode} takes {expected} operand(s), {found} given")]
    OperandCount {
        line: usize,
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid integer literal `{literal}`")]
    InvalidInteger { line: usize, literal: String },

    #[error("line {line}: {value} does not fit operand of {opcode} (max {max})")]
    IntegerRange {
        line: usize,
        opcode: Opcode,
        value: u64,
        max: u64,
    },

    #[error("line {line}: reference to unknown label `{label}`")]
    UnknownLabel { line: usize, label: String },

    #[error("line {line}: label `{label}` already defined")]
    DuplicateLabel { line: usize, label: String },
}

pub type ParseResult<T> = Result<T, ParseError>;

struct PendingTarget<'s> {
    index: usize,
    line: usize,
    label: &'s str,
}

/// Parse a whole assembly listing into resolved instructions.
pub fn parse_assembly(source: &str) -> ParseResult<Vec<Instruction>> {
    let mut instructions = Vec::new();
    let mut labels: HashMap<&str, usize> = HashMap::new();
    let mut pending = Vec::new();

    for (number, raw) in source.lines().enumerate() {
        let line = number + 1;
        let text = strip_comment(raw).trim();
        if text.is_empty() {
            continue;
        }

        let (mut head, mut rest) = split_head(text);
        if let Some(label) = head.strip_suffix(':') {
            if labels.insert(label, instructions.len()).is_some() {
                return Err(ParseError::DuplicateLabel {
                    line,
                    label: label.to_string(),
                });
            }
            if rest.is_empty() {
                continue;
            }
            (head, rest) = split_head(rest);
        }

        let opcode = Opcode::from_mnemonic(head).ok_or_else(|| ParseError::UnknownOpcode {
            line,
            mnemonic: head.to_string(),
        })?;

        let operands = split_operands(rest);
        let kind = opcode.operand_kind();
        if operands.len() != kind.operand_count() {
            return Err(ParseError::OperandCount {
                line,
                opcode,
                expected: kind.operand_count(),
                found: operands.len(),
            });
        }

        let instruction = match kind {
            OperandKind::None => Instruction::new(opcode),
            OperandKind::Const8 | OperandKind::Const16 | OperandKind::Const32 => {
                let value = parse_operand(line, opcode, operands[0])?;
                Instruction::with_operand(opcode, value)
            }
            OperandKind::Const32Pair => {
                let base = parse_operand(line, opcode, operands[0])?;
                let max_index = parse_operand(line, opcode, operands[1])?;
                Instruction::with_operands(opcode, base, max_index)
            }
            OperandKind::Label => {
                pending.push(PendingTarget {
                    index: instructions.len(),
                    line,
                    label: operands[0],
                });
                Instruction::new(opcode)
            }
        };
        instructions.push(instruction);
    }

    for target in pending {
        let position = labels
            .get(target.label)
            .ok_or_else(|| ParseError::UnknownLabel {
                line: target.line,
                label: target.label.to_string(),
            })?;
        instructions[target.index].resolved_target = *position as u64;
    }

    log::debug!(
        "Assembled {} instructions, {} labels",
        instructions.len(),
        labels.len()
    );
    Ok(instructions)
}

/// Split off the first word; the remainder is trimmed.
fn split_head(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(split) => (&text[..split], text[split..].trim()),
        None => (text, ""),
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn split_operands(rest: &str) -> Vec<&str> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Vec::new();
    }
    rest.split(',').map(str::trim).collect()
}

fn parse_operand(line: usize, opcode: Opcode, literal: &str) -> ParseResult<u64> {
    let value = parse_integer(literal).ok_or_else(|| ParseError::InvalidInteger {
        line,
        literal: literal.to_string(),
    })?;

    let max = opcode.operand_kind().max_value();
    if value > max {
        return Err(ParseError::IntegerRange {
            line,
            opcode,
            value,
            max,
        });
    }
    Ok(value)
}

/// Decimal, `0x` hex, `0b` binary or leading-zero octal.
fn parse_integer(literal: &str) -> Option<u64> {
    let (digits, radix) = if let Some(hex) = literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
    {
        (hex, 16)
    } else if let Some(bin) = literal
        .strip_prefix("0b")
        .or_else(|| literal.strip_prefix("0B"))
    {
        (bin, 2)
    } else if literal.len() > 1 && literal.starts_with('0') {
        (&literal[1..], 8)
    } else {
        (literal, 10)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}
