// This module is the instruction-to-machine compiler. TuringCompiler borrows the instruction
// list, owns a CompilationSession (state arena, position map, scratch arena, statistics) and
// the call-site table, and walks the instructions once in order. Each instruction is bound to
// its entry state and, where it falls through, to the entry state of the next position; the
// generator for its opcode family wires freshly allocated intermediate states between them.
// Generators live in submodules by family (stack, arith, memory, frame, control) as inherent
// methods on TuringCompiler so they share the small state-wiring helpers defined here.
// Operand contracts that would silently produce a broken graph are checked up front and
// reported as CompileError.

//! Instruction-to-Turing-Machine compiler.
//!
//! ```ignore
//! use tmc::codegen::{compile, CompilerOptions};
//! use tmc::isa::{Instruction, Opcode};
//!
//! let program = [
//!     Instruction::with_operand(Opcode::Push8, 5),
//!     Instruction::with_operand(Opcode::Push8, 3),
//!     Instruction::new(Opcode::Add8),
//!     Instruction::new(Opcode::Accept),
//! ];
//! let machine = compile(&program, &CompilerOptions::default())?;
//! ```

pub mod call_sites;

mod arith;
mod control;
mod frame;
mod memory;
mod stack;

use bumpalo::Bump;

use crate::core::error::{CompileError, CompileResult};
use crate::core::machine::{
    Direction, StateId, Transition, TuringMachine, ACCEPT_STATE, REJECT_STATE, TAPE_GP,
};
use crate::core::session::{CompilationSession, SessionStats};
use crate::isa::{Instruction, Opcode, OperandKind};

pub use call_sites::{CallSiteTable, MAX_CALL_SITES};

/// Default bound on the index range of one indirect access.
pub const DEFAULT_MAX_INDIRECT_INDEX: u64 = 1 << 16;

/// Largest index bound a 4-byte index can address.
const ENCODABLE_INDEX_BOUND: u64 = 1 << 32;

/// Largest IDXSHFT amount a single-byte carry can express.
const MAX_INDEX_SHIFT: u64 = 8;

/// Knobs for one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Upper bound accepted for the index bound operand of `…IND` opcodes.
    /// Every index below the bound gets its own pre-generated access block.
    pub max_indirect_index: u64,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            max_indirect_index: DEFAULT_MAX_INDIRECT_INDEX,
        }
    }
}

/// Compile `instructions` with a private scratch arena.
pub fn compile(instructions: &[Instruction], options: &CompilerOptions) -> CompileResult<TuringMachine> {
    let arena = Bump::new();
    let compiler = TuringCompiler::new(instructions, &arena, options.clone())?;
    compiler.compile()
}

/// Compiler for one instruction list.
pub struct TuringCompiler<'a, 'arena> {
    instructions: &'a [Instruction],
    session: CompilationSession<'arena>,
    call_sites: CallSiteTable,
    options: CompilerOptions,
}

impl<'a, 'arena> TuringCompiler<'a, 'arena> {
    /// Set up the sinks and the call-site table.
    pub fn new(
        instructions: &'a [Instruction],
        arena: &'arena Bump,
        options: CompilerOptions,
    ) -> CompileResult<Self> {
        let mut session = CompilationSession::new(arena);
        let call_sites = CallSiteTable::build(instructions)?;
        session.record_call_sites(call_sites.len());

        Ok(Self {
            instructions,
            session,
            call_sites,
            options,
        })
    }

    /// Statistics gathered so far.
    pub fn stats(&self) -> &SessionStats {
        self.session.stats()
    }

    /// Generate the whole machine.
    pub fn compile(mut self) -> CompileResult<TuringMachine> {
        log::debug!(
            "Compiling {} instructions ({} call sites)",
            self.instructions.len(),
            self.call_sites.len()
        );

        let start_state = self.add_state();
        let first = self.session.state_for_position(0);
        self.set_default(start_state, Transition::write(TAPE_GP, Direction::Right, first));

        for position in 0..self.instructions.len() {
            self.compile_instruction(position)?;
        }

        log::info!(
            "Compiled {} instructions into {} states",
            self.instructions.len(),
            self.session.state_count()
        );
        log::debug!("{}", self.session.stats());

        Ok(TuringMachine {
            start_state,
            accept_state: ACCEPT_STATE,
            reject_state: REJECT_STATE,
            states: self.session.into_states(),
        })
    }

    fn compile_instruction(&mut self, position: usize) -> CompileResult<()> {
        use Opcode::*;

        let instr = self.instructions[position];
        self.check_operands(position, &instr)?;
        log::trace!("  [{}] {}", position, instr);

        let op = instr.opcode;
        let width = op.width();
        let entry = self.session.state_for_position(position);

        match op {
            Push8 | Push16 | Push32 => {
                let exit = self.exit_state(position);
                self.gen_push(entry, instr.operand1, width, exit);
            }
            Pop8 | Pop16 | Pop32 => {
                let exit = self.exit_state(position);
                self.gen_pop(entry, width, exit);
            }
            Dup8 | Dup16 | Dup32 => {
                let exit = self.exit_state(position);
                self.gen_dup(entry, width, exit);
            }
            Swap8 | Swap16 | Swap32 => {
                let exit = self.exit_state(position);
                self.gen_swap(entry, width, instr.operand1 as usize, exit);
            }

            Enter => {
                let exit = self.exit_state(position);
                self.gen_enter(entry, exit);
            }
            Alloc => {
                let exit = self.exit_state(position);
                self.gen_alloc(entry, instr.operand1 as usize, exit);
            }
            Free => {
                let exit = self.exit_state(position);
                self.gen_free(entry, instr.operand1 as usize, exit);
            }
            MakeArgs => {
                let exit = self.exit_state(position);
                self.gen_make_args(entry, instr.operand1 as usize, exit);
            }

            GetLocal8 | GetLocal16 | GetLocal32 | GetArg8 | GetArg16 | GetArg32 | GetGlobal8
            | GetGlobal16 | GetGlobal32 => {
                let exit = self.exit_state(position);
                let marker = frame_marker(op);
                self.gen_load(entry, width, instr.operand1 as usize, marker, exit);
            }
            GetLocalInd8 | GetLocalInd16 | GetLocalInd32 | GetArgInd8 | GetArgInd16
            | GetArgInd32 | GetGlobalInd8 | GetGlobalInd16 | GetGlobalInd32 => {
                let exit = self.exit_state(position);
                let marker = frame_marker(op);
                self.gen_load_indirect(
                    entry,
                    width,
                    instr.operand1 as usize,
                    instr.operand2 as usize,
                    marker,
                    exit,
                );
            }
            SetLocal8 | SetLocal16 | SetLocal32 | SetArg8 | SetArg16 | SetArg32 | SetGlobal8
            | SetGlobal16 | SetGlobal32 => {
                let exit = self.exit_state(position);
                let marker = frame_marker(op);
                self.gen_store(entry, width, instr.operand1 as usize, marker, exit);
            }
            SetLocalInd8 | SetLocalInd16 | SetLocalInd32 | SetArgInd8 | SetArgInd16
            | SetArgInd32 | SetGlobalInd8 | SetGlobalInd16 | SetGlobalInd32 => {
                let exit = self.exit_state(position);
                let marker = frame_marker(op);
                self.gen_store_indirect(
                    entry,
                    width,
                    instr.operand1 as usize,
                    instr.operand2 as usize,
                    marker,
                    exit,
                );
            }

            Add8 | Add16 | Add32 => {
                let exit = self.exit_state(position);
                self.gen_add(entry, width, exit);
            }
            Sub8 | Sub16 | Sub32 => {
                let exit = self.exit_state(position);
                self.gen_sub(entry, width, exit);
            }
            And8 | And16 | And32 => {
                let exit = self.exit_state(position);
                self.gen_bitwise(entry, width, exit, |a, b| a & b);
            }
            Or8 | Or16 | Or32 => {
                let exit = self.exit_state(position);
                self.gen_bitwise(entry, width, exit, |a, b| a | b);
            }
            Xor8 | Xor16 | Xor32 => {
                let exit = self.exit_state(position);
                self.gen_bitwise(entry, width, exit, |a, b| a ^ b);
            }
            IdxShft => {
                let exit = self.exit_state(position);
                self.gen_index_shift(entry, instr.operand1 as u32, exit);
            }

            Jmp => {
                let target = self.target_state(&instr);
                self.gen_jump(entry, target);
            }
            Jf | Jt => {
                let fallthrough = self.exit_state(position);
                let target = self.target_state(&instr);
                if op == Jf {
                    self.gen_branch(entry, target, fallthrough);
                } else {
                    self.gen_branch(entry, fallthrough, target);
                }
            }
            Call => {
                let target = self.target_state(&instr);
                // Every CALL was numbered by the table scan.
                let id = self.call_sites.id_for_call(position).unwrap_or_default();
                self.gen_call(entry, id, target);
            }
            Ret => self.gen_return(entry),
            SetRet8 | SetRet16 | SetRet32 => {
                let exit = self.exit_state(position);
                self.gen_set_return(entry, width, exit);
            }

            Accept => self.gen_halt(entry, ACCEPT_STATE),
            Reject => self.gen_halt(entry, REJECT_STATE),
        }

        self.session.record_instruction_compiled(op.name());
        Ok(())
    }

    /// Reject operand values the generators cannot turn into a valid graph.
    fn check_operands(&self, position: usize, instr: &Instruction) -> CompileResult<()> {
        let kind = instr.opcode.operand_kind();
        let has_constant = !matches!(kind, OperandKind::None | OperandKind::Label);
        if has_constant && instr.operand1 > kind.max_value() {
            return Err(CompileError::OperandOutOfRange {
                position,
                opcode: instr.opcode,
                value: instr.operand1,
                max: kind.max_value(),
            });
        }

        match instr.opcode {
            Opcode::Jmp | Opcode::Jf | Opcode::Jt | Opcode::Call => {
                let len = self.instructions.len();
                if instr.resolved_target > len as u64 {
                    return Err(CompileError::JumpTargetOutOfRange {
                        position,
                        target: instr.resolved_target,
                        len,
                    });
                }
            }
            Opcode::IdxShft if instr.operand1 > MAX_INDEX_SHIFT => {
                return Err(CompileError::InvalidShift {
                    position,
                    amount: instr.operand1,
                });
            }
            op if op.operand_kind() == OperandKind::Const32Pair => {
                let limit = self.options.max_indirect_index.min(ENCODABLE_INDEX_BOUND);
                if instr.operand2 == 0 || instr.operand2 > limit {
                    return Err(CompileError::IndexOutOfRange {
                        position,
                        max_index: instr.operand2,
                        limit,
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn exit_state(&mut self, position: usize) -> StateId {
        self.session.state_for_position(position + 1)
    }

    fn target_state(&mut self, instr: &Instruction) -> StateId {
        self.session.state_for_position(instr.resolved_target as usize)
    }

    fn add_state(&mut self) -> StateId {
        self.session.add_state()
    }

    fn set_default(&mut self, state: StateId, transition: Transition) {
        self.session.set_default(state, transition);
    }

    fn push_transition(&mut self, state: StateId, transition: Transition) {
        self.session.push_transition(state, transition);
    }

    /// Chain `count` plain head moves from `from`; returns the state reached.
    fn walk(&mut self, from: StateId, direction: Direction, count: usize) -> StateId {
        let mut current = from;
        for _ in 0..count {
            let next = self.add_state();
            self.set_default(current, Transition::skip(direction, next));
            current = next;
        }
        current
    }

    /// Make `state` move in `direction` until `found` matches.
    fn scan_for(&mut self, state: StateId, direction: Direction, found: Transition) {
        self.set_default(state, Transition::skip(direction, state));
        self.push_transition(state, found);
    }
}

fn frame_marker(op: Opcode) -> u64 {
    // Only called for memory opcodes, which all carry a marker.
    op.frame_marker().unwrap_or(TAPE_GP)
}
