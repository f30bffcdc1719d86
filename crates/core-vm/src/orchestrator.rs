//! Run-loop orchestration (§4.10, C8): driving `step` to completion with a
//! step budget, optional post-halt collection, and a single-step "stepper"
//! API for callers that want to pause between instructions (a debugger, a
//! UI) rather than run to completion — the same split between a render loop
//! and a single `handle_event` call that an editor's event loop draws.

use core_ir::{IrInstruction, VmError, VmState};
use tracing::{trace, warn};

use crate::gc;
use crate::snapshot::{Snapshot, Trace};

const DEFAULT_MAX_STEPS: u64 = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Hard ceiling on `step_count`; exceeding it halts the run with
    /// `RunOutcome::StepBudgetExceeded` rather than looping forever.
    pub max_steps: u64,
    /// Run the mark-sweep collector once over the final state before
    /// returning it. The trace itself is never collected — every snapshot
    /// it holds reflects the heap exactly as it stood at that step.
    pub gc: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            gc: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Halted,
    StepBudgetExceeded,
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub outcome: RunOutcome,
    pub state: VmState,
    pub trace: Trace,
}

fn snapshot_before(state: &VmState) -> Snapshot {
    Snapshot {
        step_count: state.step_count,
        pc: state.pc,
        instruction: state.program.get(state.pc).cloned(),
        state: state.clone(),
    }
}

/// Runs `program` to completion (or exhaustion of the step budget),
/// recording a snapshot before every instruction plus one final snapshot
/// after the run ends, then sealing the trace.
pub fn run(program: Vec<IrInstruction>, options: RunOptions) -> Result<RunResult, VmError> {
    let mut state = VmState::initial(program);
    let mut trace = Trace::new();

    let outcome = loop {
        if state.step_count >= options.max_steps {
            warn!(
                target: "core_vm::orchestrator",
                max_steps = options.max_steps,
                pc = state.pc,
                "run truncated by step budget"
            );
            break RunOutcome::StepBudgetExceeded;
        }
        if !state.is_running {
            break RunOutcome::Halted;
        }
        let opcode = state.program.get(state.pc).map(IrInstruction::opcode_name);
        trace!(
            target: "core_vm::orchestrator",
            pc = state.pc,
            step_count = state.step_count,
            opcode,
            "step"
        );
        trace
            .record(snapshot_before(&state))
            .expect("trace is not sealed while the run loop is active");
        state = crate::step::step(&state)?;
    };

    trace
        .record(Snapshot {
            step_count: state.step_count,
            pc: state.pc,
            instruction: None,
            state: state.clone(),
        })
        .expect("final snapshot precedes seal");
    trace.seal();

    if options.gc {
        state = gc::collect(&state);
    }

    Ok(RunResult {
        outcome,
        state,
        trace,
    })
}

/// Single-step driver: advances one instruction per call to `step_once`,
/// recording its own trace as it goes. Unlike `run`, the caller controls
/// pacing — useful for interactive inspection.
pub struct Stepper {
    state: VmState,
    trace: Trace,
    max_steps: u64,
}

impl Stepper {
    pub fn new(program: Vec<IrInstruction>, max_steps: u64) -> Self {
        Self {
            state: VmState::initial(program),
            trace: Trace::new(),
            max_steps,
        }
    }

    pub fn state(&self) -> &VmState {
        &self.state
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running && self.state.step_count < self.max_steps
    }

    /// Executes the next instruction, or does nothing and returns `Ok(())`
    /// if the run has already finished. Seals the trace on the step that
    /// ends the run, same as `finalize` does explicitly for callers who
    /// stop polling before that point.
    pub fn step_once(&mut self) -> Result<(), VmError> {
        if !self.is_running() {
            return Ok(());
        }
        let opcode = self.state.program.get(self.state.pc).map(IrInstruction::opcode_name);
        trace!(
            target: "core_vm::orchestrator",
            pc = self.state.pc,
            step_count = self.state.step_count,
            opcode,
            "step"
        );
        self.trace
            .record(snapshot_before(&self.state))
            .expect("trace not sealed while stepper is running");
        self.state = crate::step::step(&self.state)?;
        if !self.is_running() {
            self.finalize();
        }
        Ok(())
    }

    /// Appends the final post-halt snapshot and seals the trace. Idempotent
    /// if already sealed.
    pub fn finalize(&mut self) {
        if self.trace.is_sealed() {
            return;
        }
        self.trace
            .record(Snapshot {
                step_count: self.state.step_count,
                pc: self.state.pc,
                instruction: None,
                state: self.state.clone(),
            })
            .expect("final snapshot precedes seal");
        self.trace.seal();
    }
}

pub fn create_stepper(program: Vec<IrInstruction>, max_steps: u64) -> Stepper {
    Stepper::new(program, max_steps)
}
