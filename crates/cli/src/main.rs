//! Out-of-order core simulator CLI.
//!
//! This binary provides a single entry point for the simulator. It performs:
//! 1. **Run:** Assemble a program, step the machine to completion (or a cycle
//!    limit) and print statistics, optionally with a final status dump.
//! 2. **Asm:** Assemble a program and list the finalized instructions with
//!    their addresses, without simulating.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::{fs, process};
use tracing_subscriber::EnvFilter;

use ooosim_core::config::Config;
use ooosim_core::isa::asm;
use ooosim_core::sim::{Simulator, report};

#[derive(Parser, Debug)]
#[command(
    name = "ooosim",
    author,
    version,
    about = "Cycle-stepped out-of-order core simulator",
    long_about = "Run an assembly program on a Tomasulo-style core with a reorder buffer.\n\nExamples:\n  ooosim run programs/loop.s\n  ooosim run programs/loop.s --config wide.json --status\n  ooosim run programs/loop.s --memory 0x100:0x140 --json\n  ooosim asm programs/loop.s"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a program.
    Run {
        /// Assembly source file.
        program: PathBuf,

        /// JSON machine configuration; omitted fields take their defaults.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Load address of the first instruction (overrides the config).
        #[arg(long, value_parser = parse_u32)]
        base: Option<u32>,

        /// Stop after this many cycles even if the program has not finished.
        #[arg(long)]
        cycles: Option<u64>,

        /// Print ROB, reservation stations, registers and pending instructions at the end.
        #[arg(long)]
        status: bool,

        /// Dump data memory in `START:END` (hex or decimal) at the end.
        #[arg(long, value_parser = parse_range)]
        memory: Option<(u32, u32)>,

        /// Print the per-instruction execution log at the end.
        #[arg(long)]
        log: bool,

        /// Log every stage transition to stderr (`trace` level unless `RUST_LOG` is set).
        #[arg(long)]
        trace: bool,

        /// Statistics sections to print (summary, instruction_mix, speculation, stalls).
        #[arg(long, value_delimiter = ',')]
        stats: Vec<String>,

        /// Print statistics as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Assemble a program and list it.
    Asm {
        /// Assembly source file.
        program: PathBuf,

        /// Load address of the first instruction.
        #[arg(long, value_parser = parse_u32, default_value = "0")]
        base: u32,
    },
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number `{s}`: {e}"))
}

fn parse_range(s: &str) -> Result<(u32, u32), String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got `{s}`"))?;
    let (start, end) = (parse_u32(start)?, parse_u32(end)?);
    if end < start {
        return Err(format!("range end {end:#x} is below start {start:#x}"));
    }
    Ok((start, end))
}

/// Log level used when `RUST_LOG` is unset.
const fn default_directive(trace: bool) -> &'static str {
    if trace { "trace" } else { "warn" }
}

fn init_tracing(trace: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(trace)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            program,
            config,
            base,
            cycles,
            status,
            memory,
            log,
            trace,
            stats,
            json,
        } => {
            init_tracing(trace);
            let mut config = load_config(config.as_deref());
            if let Some(base) = base {
                config.general.base_address = base;
            }
            config.general.trace |= trace;
            let opts = RunOptions {
                cycles,
                status,
                memory,
                log,
                stats,
                json,
            };
            cmd_run(&program, config, &opts);
        }
        Commands::Asm { program, base } => {
            init_tracing(false);
            cmd_asm(&program, base);
        }
    }
}

struct RunOptions {
    cycles: Option<u64>,
    status: bool,
    memory: Option<(u32, u32)>,
    log: bool,
    stats: Vec<String>,
    json: bool,
}

fn load_config(path: Option<&Path>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("reading config {}: {e}", path.display())));
    Config::from_json(&text).unwrap_or_else(|e| fail(e))
}

/// Assembles and runs `path`, then prints the requested reports.
///
/// On a fatal error the machine state is dumped and the process exits with
/// code 1.
fn cmd_run(path: &Path, config: Config, opts: &RunOptions) {
    let program = asm::parse_file(path).unwrap_or_else(|e| fail(e));
    println!("[*] Program: {} ({} instructions)", path.display(), program.len());
    println!(
        "    ROB: {}  Issue width: {}  Store interlock: {}",
        config.pipeline.rob_size, config.pipeline.issue_width, config.pipeline.store_interlock
    );

    let mut sim = Simulator::new(&program, config).unwrap_or_else(|e| fail(e));

    if let Err(e) = sim.run(opts.cycles) {
        eprintln!("\n[!] FATAL: {e}");
        eprintln!("{}", report::status(&sim));
        sim.stats().print();
        process::exit(1);
    }

    if sim.is_finished() {
        println!("\n[*] Finished after {} cycles", sim.cycles());
    } else {
        println!("\n[*] Stopped at cycle {} (pc={:#010x})", sim.cycles(), sim.pc());
    }

    if opts.status {
        println!("{}", report::status(&sim));
    }
    if opts.log {
        println!("{}", report::log(&sim));
    }
    if let Some((start, end)) = opts.memory {
        match report::memory(&sim, start, end) {
            Ok(dump) => println!("{dump}"),
            Err(e) => fail(e),
        }
    }

    if opts.json {
        match serde_json::to_string_pretty(sim.stats()) {
            Ok(text) => println!("{text}"),
            Err(e) => fail(e),
        }
    } else {
        sim.stats().print_sections(&opts.stats);
    }
}

fn cmd_asm(path: &Path, base: u32) {
    let program = asm::parse_file(path).unwrap_or_else(|e| fail(e));
    for inst in program.relocated(base).instructions() {
        println!("{:#010x}  {inst}", inst.pc);
    }
}
