//! `tmc`: assemble a stack-machine program and compile it to a Turing Machine.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use log::LevelFilter;

use tmc::asm::parse_assembly;
use tmc::codegen::{CompilerOptions, TuringCompiler, DEFAULT_MAX_INDIRECT_INDEX};
use tmc::output::{write_listing, write_machine};

#[derive(Parser, Debug)]
#[command(name = "tmc", version, about = "Compile stack-machine assembly into a Turing Machine")]
struct Args {
    /// Turn on verbose logging. Repeat to increase verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Assembly source file.
    input: PathBuf,

    /// Binary machine output (defaults to the input with a `.tm` extension).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write a human-readable state listing.
    #[arg(long)]
    listing: Option<PathBuf>,

    /// Largest index bound accepted by indirect loads and stores.
    #[arg(long, default_value_t = DEFAULT_MAX_INDIRECT_INDEX)]
    max_index: u64,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG, when set, takes precedence over -v.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(&args.input)
        .map_err(|e| format!("cannot read {}: {e}", args.input.display()))?;
    let program = parse_assembly(&source)?;
    log::info!("Parsed {} instructions from {}", program.len(), args.input.display());

    let options = CompilerOptions {
        max_indirect_index: args.max_index,
    };
    let arena = bumpalo::Bump::new();
    let compiler = TuringCompiler::new(&program, &arena, options)?;
    let machine = compiler.compile()?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.input));
    let mut writer = BufWriter::new(create(&output)?);
    write_machine(&machine, &mut writer)?;
    writer.flush()?;
    log::info!(
        "Wrote {} states ({} transitions) to {}",
        machine.states.len(),
        machine.transition_count(),
        output.display()
    );

    if let Some(path) = &args.listing {
        let mut writer = BufWriter::new(create(path)?);
        write_listing(&machine, &mut writer)?;
        writer.flush()?;
        log::info!("Wrote listing to {}", path.display());
    }

    Ok(())
}

fn create(path: &Path) -> Result<File, String> {
    File::create(path).map_err(|e| format!("cannot create {}: {e}", path.display()))
}

fn default_output(input: &Path) -> PathBuf {
    input.with_extension("tm")
}
