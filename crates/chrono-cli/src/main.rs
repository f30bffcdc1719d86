//! chrono-cli entrypoint: a thin binary wiring the VM core and the
//! governance core together for manual exploration — load a program, run
//! it with an optional step budget and trace dump, or ask whether a role
//! may exercise a capability.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use core_governance::{can, PanelLockContext};
use core_ir::IrInstruction;
use core_vm::{run, RunOptions, RunOutcome};

use config::RunConfig;

/// chrono-cli: run ChronoVM programs and query governance capability checks.
#[derive(Parser, Debug)]
#[command(name = "chrono-cli", version, about = "ChronoVM command-line driver")]
struct Args {
    /// Optional path to a `chrono.toml` configuration file (overrides
    /// discovery of defaults; see `[run]` in the README).
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an IR program (a JSON array of instructions) to completion.
    Run {
        /// Path to a JSON file containing a `Vec<IrInstruction>`.
        program: PathBuf,
        /// Overrides `[run] max_steps` from the config file.
        #[arg(long)]
        max_steps: Option<u64>,
        /// Overrides `[run] gc` from the config file.
        #[arg(long)]
        gc: bool,
        /// Print the full execution trace (one line per snapshot) instead
        /// of only the final output and state summary.
        #[arg(long)]
        trace: bool,
    },
    /// Check whether a role may exercise a capability, optionally against
    /// a set of locked panels.
    Can {
        /// One of `viewer`, `maintainer`, `instructor`, `owner`.
        role: String,
        /// A capability name, e.g. `update_template`.
        capability: String,
        /// Panel id the capability check is scoped to, e.g. `memory`.
        #[arg(long)]
        panel_id: Option<String>,
        /// Comma-separated panel ids currently locked.
        #[arg(long, value_delimiter = ',')]
        locked_panels: Vec<String>,
    },
}

fn configure_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn run_command(program_path: &PathBuf, config: RunConfig, print_trace: bool) -> Result<()> {
    let program_json = std::fs::read_to_string(program_path)
        .with_context(|| format!("reading program file {}", program_path.display()))?;
    let program: Vec<IrInstruction> = serde_json::from_str(&program_json)
        .with_context(|| format!("parsing program file {}", program_path.display()))?;

    let options = RunOptions {
        max_steps: config.max_steps,
        gc: config.gc,
    };
    let result = run(program, options).context("running program")?;

    if print_trace {
        for snapshot in result.trace.entries() {
            let opcode = snapshot.instruction.as_ref().map(IrInstruction::opcode_name);
            println!(
                "step={} pc={} opcode={}",
                snapshot.step_count,
                snapshot.pc,
                opcode.unwrap_or("<halt>")
            );
        }
    }

    for line in &result.state.output {
        println!("{line}");
    }

    match result.outcome {
        RunOutcome::Halted => {
            eprintln!("halted after {} steps", result.state.step_count);
        }
        RunOutcome::StepBudgetExceeded => {
            eprintln!(
                "step budget of {} exceeded before halting",
                options.max_steps
            );
        }
    }

    Ok(())
}

fn can_command(role: &str, capability: &str, panel_id: Option<&str>, locked_panels: &[String]) -> Result<()> {
    let locked: std::collections::BTreeSet<_> = locked_panels
        .iter()
        .filter_map(|p| p.parse().ok())
        .collect();
    let context = panel_id.map(|panel_id| PanelLockContext {
        panel_id,
        locked_panels: &locked,
    });
    let check = can(role, capability, context);

    if check.granted {
        println!("granted");
    } else {
        println!(
            "denied: {} ({})",
            check.reason.unwrap_or_default(),
            check.code.map(|c| c.as_str()).unwrap_or("unknown")
        );
        std::process::exit(1);
    }
    Ok(())
}

fn main() -> Result<()> {
    configure_logging();
    let args = Args::parse();

    match &args.command {
        Command::Run {
            program,
            max_steps,
            gc,
            trace,
        } => {
            let file_config = RunConfig::load(args.config.as_deref());
            let config = file_config.with_overrides(*max_steps, if *gc { Some(true) } else { None });
            run_command(program, config, *trace)
        }
        Command::Can {
            role,
            capability,
            panel_id,
            locked_panels,
        } => can_command(role, capability, panel_id.as_deref(), locked_panels),
    }
}
