// This module turns a compiled TuringMachine into bytes and text. The binary format is a flat
// little-endian stream of u64 fields (u8 for directions) that the simulator side consumes;
// writer.rs and reader.rs implement both directions so a machine survives a round trip
// exactly. The default transition's input is never stored because it always matches
// anything. listing.rs renders the same machine as a human-readable state listing for
// debugging generated graphs.

//! Serialization of compiled machines.

pub mod listing;
pub mod reader;
pub mod writer;

use thiserror::Error;

pub use listing::write_listing;
pub use reader::read_machine;
pub use writer::write_machine;

/// Errors of the binary machine format.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid direction byte {0}")]
    InvalidDirection(u8),

    #[error("State record {found} where state {expected} was expected")]
    StateIndexMismatch { expected: u64, found: u64 },
}

pub type FormatResult<T> = Result<T, FormatError>;
