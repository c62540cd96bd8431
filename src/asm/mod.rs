//! Assembly front end producing [`Instruction`](crate::isa::Instruction) lists.

pub mod parser;

pub use parser::{parse_assembly, ParseError, ParseResult};
