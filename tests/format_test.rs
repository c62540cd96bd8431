//! Binary format round trips on compiled programs.

mod common;

use std::io::Cursor;

use tmc::asm::parse_assembly;
use tmc::codegen::{compile, CompilerOptions};
use tmc::core::machine::WILDCARD;
use tmc::output::{read_machine, write_listing, write_machine, FormatError};

const PROGRAM: &str = "
        push8 0
        push16 0x0102
        makeargs 2
        call f
        jf ok
        reject
ok:     accept
f:      enter
        getarg16 0
        pop8
        setret8
        ret
";

fn compiled() -> tmc::TuringMachine {
    let program = parse_assembly(PROGRAM).unwrap();
    compile(&program, &CompilerOptions::default()).unwrap()
}

#[test]
fn test_compiled_machine_round_trips() {
    common::init_logging();
    let machine = compiled();
    assert!(machine
        .states
        .iter()
        .any(|s| s.default.output == WILDCARD));

    let mut bytes = Vec::new();
    write_machine(&machine, &mut bytes).unwrap();
    let restored = read_machine(&mut Cursor::new(&bytes)).unwrap();

    assert_eq!(restored, machine);
    assert!(common::simulate(&restored).rejected);
}

#[test]
fn test_serialized_bytes_are_deterministic() {
    let mut first = Vec::new();
    let mut second = Vec::new();
    write_machine(&compiled(), &mut first).unwrap();
    write_machine(&compiled(), &mut second).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_header_fields() {
    let machine = compiled();
    let mut bytes = Vec::new();
    write_machine(&machine, &mut bytes).unwrap();

    let field = |i: usize| u64::from_le_bytes(bytes[i * 8..i * 8 + 8].try_into().unwrap());
    assert_eq!(field(0), machine.start_state as u64);
    assert_eq!(field(1), 0);
    assert_eq!(field(2), 1);
    assert_eq!(field(3), machine.states.len() as u64);
}

#[test]
fn test_truncated_stream_is_io_error() {
    let mut bytes = Vec::new();
    write_machine(&compiled(), &mut bytes).unwrap();
    bytes.truncate(bytes.len() - 3);

    assert!(matches!(
        read_machine(&mut Cursor::new(&bytes)),
        Err(FormatError::Io(_))
    ));
}

#[test]
fn test_listing_covers_every_state() {
    let machine = compiled();
    let mut out = Vec::new();
    write_listing(&machine, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let headers = text.lines().filter(|l| l.starts_with("state ")).count();
    assert_eq!(headers, machine.states.len());
    let bodies = text.lines().filter(|l| l.starts_with("  ")).count();
    assert_eq!(bodies, machine.states.len() + machine.transition_count());
}
