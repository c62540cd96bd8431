//! tmc - compile stack-machine programs into single-tape Turing Machines.
//!
//! The input is an ordered list of [`Instruction`]s with jump targets
//! resolved to absolute positions. The output is a [`TuringMachine`] whose
//! run on a blank tape reproduces the program: the tape holds the stack,
//! frames are delimited by marker symbols, and every memory access, carry
//! and return address is encoded in the control states.
//!
//! # Usage
//!
//! ```ignore
//! use tmc::asm::parse_assembly;
//! use tmc::codegen::{compile, CompilerOptions};
//! use tmc::output::write_machine;
//!
//! let program = parse_assembly("push8 5\npush8 3\nadd8\naccept\n")?;
//! let machine = compile(&program, &CompilerOptions::default())?;
//! write_machine(&machine, &mut std::fs::File::create("sum.tm")?)?;
//! ```
//!
//! # Architecture
//!
//! - [`isa`] - Opcodes and instructions
//! - [`core`] - Machine model, compilation session, errors
//! - [`codegen`] - Instruction-to-machine compiler
//! - [`output`] - Binary format and listings
//! - [`asm`] - Textual assembly front end

pub mod asm;
pub mod codegen;
pub mod core;
pub mod isa;
pub mod output;

pub use crate::codegen::{compile, CompilerOptions, TuringCompiler};
pub use crate::core::{CompileError, CompileResult, TuringMachine};
pub use crate::isa::{Instruction, Opcode};
