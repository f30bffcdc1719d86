//! The instruction-level state machine (C5), its execution trace (C6),
//! reachability collector (C7), and run-loop orchestration (C8).

pub mod gc;
pub mod orchestrator;
pub mod snapshot;
pub mod step;

pub use orchestrator::{create_stepper, run, RunOptions, RunOutcome, RunResult, Stepper};
pub use snapshot::{Snapshot, Trace, TraceSealedError};
pub use step::step;
