//! apex65 — run Apex OS executables on an emulated 6502.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use apex65::apex::{self, Apex, VectorOutcome};
use apex65::cpu::Cpu;
use apex65::devices::{ConsoleDevice, FileByteDevice, NullDevice, PrinterDevice};
use apex65::isa::VariantSet;
use apex65::loader;
use apex65::memory::Memory;

/// Exit code when the program halts (undefined opcode, tight loop,
/// unsupported Apex call).
const EXIT_HALT: u8 = 3;
/// Exit code after SIGINT teardown.
const EXIT_INTERRUPTED: u8 = 130;

fn parse_hex16(s: &str) -> Result<u16, String> {
    u16::from_str_radix(s.trim_start_matches("0x"), 16)
        .map_err(|e| format!("not a 16-bit hex address: {}", e))
}

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Apex executable to run
    executable: PathBuf,

    /// Executable is in Apex BIN format (ASCII hex with '*' records)
    #[arg(short, long, conflicts_with = "raw")]
    bin: bool,

    /// Executable is a raw binary file
    #[arg(short, long)]
    raw: bool,

    /// Emulate the CMOS R65C02 instead of the NMOS 6502
    #[arg(short, long)]
    cmos: bool,

    /// Input file for character device 3
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file for character device 3
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Printer output file (character device 2)
    #[arg(short, long, value_name = "FILE")]
    printer: Option<PathBuf>,

    /// Load address for raw binaries (hex)
    #[arg(long, value_parser = parse_hex16, default_value = "0000")]
    load_address: u16,

    /// Entry address for raw binaries (hex)
    #[arg(long, value_parser = parse_hex16, default_value = "0400")]
    exec_address: u16,

    /// Trace execution (instructions and registers)
    #[arg(short, long)]
    trace: bool,

    /// Trace memory writes
    #[arg(long)]
    memtrace: bool,

    /// Dump memory to FILE at exit
    #[arg(long, value_name = "FILE")]
    dump: Option<PathBuf>,
}

fn main() -> ExitCode {
    // argument errors exit 1, not clap's default 2
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(u8::from(e.use_stderr()));
        }
    };

    let log_level = if args.trace || args.memtrace {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    };
    if TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .is_err()
    {
        eprintln!("failed to initialize logging");
        return ExitCode::from(1);
    }

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let variants = if args.cmos {
        VariantSet::R65C02
    } else {
        VariantSet::MOS6502
    };

    let mut mem = Memory::new();
    let mut cpu = Cpu::new(variants);
    cpu.set_trace(args.trace);
    mem.set_trace(args.memtrace);

    let mut apex = Apex::new();
    apex.install_device(0, Box::new(ConsoleDevice::new()));
    apex.install_device(1, Box::new(ConsoleDevice::new()));

    let mut printer = PrinterDevice::new();
    if let Some(path) = &args.printer {
        printer.open_output_file(path)?;
    }
    apex.install_device(2, Box::new(printer));

    let mut file_device = FileByteDevice::new();
    if let Some(path) = &args.input {
        file_device.open_input_file(path, false)?;
    }
    if let Some(path) = &args.output {
        file_device.open_output_file(path, false)?;
    }
    apex.install_device(3, Box::new(file_device));

    apex.install_device(7, Box::new(NullDevice));

    apex.init(&mut mem);
    if args.raw {
        loader::load_raw(&mut mem, &args.executable, args.load_address)
            .with_context(|| format!("can't load {}", args.executable.display()))?;
        cpu.regs.pc = args.exec_address;
    } else if args.bin {
        loader::load_apex_bin(&mut mem, &args.executable)
            .with_context(|| format!("can't load {}", args.executable.display()))?;
        cpu.regs.pc = apex::SYS_PAGE + apex::syspage::VSTART;
    } else {
        loader::load_apex_sav(&mut mem, &args.executable)
            .with_context(|| format!("can't load {}", args.executable.display()))?;
        cpu.regs.pc = apex::SYS_PAGE + apex::syspage::VSTART;
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst))
            .context("can't install interrupt handler")?;
    }

    info!("starting at {:04x}", cpu.regs.pc);
    let code = loop {
        if interrupted.load(Ordering::Relaxed) {
            warn!("interrupted");
            break ExitCode::from(EXIT_INTERRUPTED);
        }
        if Apex::in_vector_band(cpu.regs.pc) {
            match apex.vector_exec(&mut cpu.regs, &mem) {
                VectorOutcome::Continue => cpu.execute_rts(&mut mem),
                VectorOutcome::Exit(_) => break ExitCode::SUCCESS,
                VectorOutcome::Halt => break ExitCode::from(EXIT_HALT),
            }
        } else if cpu.execute_instruction(&mut mem) {
            break ExitCode::from(EXIT_HALT);
        }
    };

    info!(
        "{} instructions, {} cycles executed",
        cpu.instruction_count(),
        cpu.cycle_count()
    );
    if let Some(path) = &args.dump {
        loader::dump_raw(&mem, path)
            .with_context(|| format!("can't dump memory to {}", path.display()))?;
    }
    Ok(code)
}
