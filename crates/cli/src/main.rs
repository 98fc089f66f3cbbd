//! RISC-V hart emulator CLI.
//!
//! This binary is a thin layer over `rvhart_core`. It performs:
//! 1. **Run:** Loads a flat binary or ELF image, starts the machine and runs to a halt,
//!    forwarding host stdin to the UART receive ring.
//! 2. **Disassemble:** Prints every word of an image in assembler syntax.
//!
//! Log output is controlled with `RUST_LOG` (for example `RUST_LOG=rvhart_core=trace`).

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use clap::{Parser, Subcommand};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use rvhart_core::config::Config;
use rvhart_core::isa::disasm::disassemble;
use rvhart_core::sim::{BootImage, HaltReason, SerialInput, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "rvhart",
    author,
    version,
    about = "RISC-V RV64 hart emulator",
    long_about = "Run a bare-metal RV64 program on one hart with CLINT, PLIC and UART devices.\n\nExamples:\n  rvhart run program.bin\n  rvhart run kernel.elf --dump-state\n  rvhart run program.bin --end-address 0x80000040 --no-zero-halt\n  rvhart disasm program.bin"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an image until it halts.
    Run {
        /// Flat binary or ELF64 image.
        image: PathBuf,

        /// Load address (and entry point) for flat binaries.
        #[arg(long, value_parser = parse_u64)]
        load_address: Option<u64>,

        /// Halt when the pc reaches this address.
        #[arg(long, value_parser = parse_u64)]
        end_address: Option<u64>,

        /// Do not halt on an all-zero instruction word.
        #[arg(long)]
        no_zero_halt: bool,

        /// JSON configuration file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Halt after this many instructions.
        #[arg(long)]
        max_instructions: Option<u64>,

        /// Emit a trace event per instruction (needs `RUST_LOG=trace`).
        #[arg(long)]
        trace: bool,

        /// Print the final hart snapshot as JSON.
        #[arg(long)]
        dump_state: bool,
    },

    /// Disassemble an image.
    Disasm {
        /// Flat binary or ELF64 image.
        image: PathBuf,

        /// Load address for flat binaries.
        #[arg(long, value_parser = parse_u64)]
        load_address: Option<u64>,
    },
}

/// Parses decimal or `0x`-prefixed hexadecimal.
fn parse_u64(s: &str) -> Result<u64, String> {
    let s = s.replace('_', "");
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address `{s}`: {e}"))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            image,
            load_address,
            end_address,
            no_zero_halt,
            config,
            max_instructions,
            trace,
            dump_state,
        } => {
            let opts = RunOptions {
                load_address,
                end_address,
                no_zero_halt,
                max_instructions,
                trace,
                dump_state,
            };
            cmd_run(&image, config.as_deref(), &opts)
        }
        Commands::Disasm {
            image,
            load_address,
        } => cmd_disasm(&image, load_address),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

struct RunOptions {
    load_address: Option<u64>,
    end_address: Option<u64>,
    no_zero_halt: bool,
    max_instructions: Option<u64>,
    trace: bool,
    dump_state: bool,
}

fn cmd_run(
    image: &std::path::Path,
    config_path: Option<&std::path::Path>,
    opts: &RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if opts.end_address.is_some() {
        config.general.end_address = opts.end_address;
    }
    if opts.max_instructions.is_some() {
        config.general.max_instructions = opts.max_instructions;
    }
    if opts.no_zero_halt {
        config.general.halt_on_zero_word = false;
    }
    if opts.trace {
        config.general.trace_instructions = true;
    }

    let load_address = opts.load_address.unwrap_or(config.system.ram_base);
    let boot = BootImage::from_file(image, load_address)?;
    let mut sim = Simulator::new(&config, boot)?;
    spawn_stdin_forwarder(sim.serial_input());

    let reason = sim.run();
    if let HaltReason::WaitForever { pc } = reason {
        warn!(pc = format_args!("{pc:#x}"), "hart is waiting with no interrupt enabled");
    }
    eprintln!("[rvhart] halted: {reason} after {} steps", sim.executed());

    if opts.dump_state {
        println!("{}", serde_json::to_string_pretty(&sim.snapshot())?);
    }
    Ok(())
}

/// Forwards host stdin to the UART until EOF.
fn spawn_stdin_forwarder(input: SerialInput) {
    let spawned = thread::Builder::new()
        .name("rvhart-stdin".into())
        .spawn(move || {
            for byte in io::stdin().lock().bytes() {
                let Ok(byte) = byte else { break };
                let _ = input.send(byte);
            }
        });
    if let Err(e) = spawned {
        warn!("cannot forward stdin: {e}");
    }
}

fn cmd_disasm(
    image: &std::path::Path,
    load_address: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let load_address = load_address.unwrap_or(Config::default().system.ram_base);
    let boot = BootImage::from_file(image, load_address)?;
    for seg in boot.segments() {
        for (i, chunk) in seg.data.chunks_exact(4).enumerate() {
            let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            let addr = seg.addr + 4 * i as u64;
            println!("{addr:#010x}:  {word:08x}  {}", disassemble(word));
        }
    }
    Ok(())
}
