//! Append-only execution trace (§4.8, C6).
//!
//! A `Snapshot` is a deep copy of the machine state taken immediately before
//! an instruction executes — because every `core-heap`/`step` function is
//! pure and returns a freshly owned `VmState`, capturing a snapshot is just
//! holding onto the state already in hand, the same way a replayable event
//! log retains past events rather than mutating subscribers directly.

use core_ir::{IrInstruction, VmState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub step_count: u64,
    pub pc: usize,
    /// The instruction about to execute, or `None` for the final snapshot
    /// taken after the program halted or errored.
    pub instruction: Option<IrInstruction>,
    pub state: VmState,
}

/// A trace is append-only: once sealed it refuses further snapshots. This
/// mirrors the VM's own behaviour — once a run has halted or errored there
/// is nothing left to record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trace {
    entries: Vec<Snapshot>,
    sealed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot record into a sealed trace")]
pub struct TraceSealedError;

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, snapshot: Snapshot) -> Result<(), TraceSealedError> {
        if self.sealed {
            return Err(TraceSealedError);
        }
        self.entries.push(snapshot);
        Ok(())
    }

    /// Freezes the trace; `record` errors from this point on. Called once
    /// by the orchestrator after the final post-halt snapshot is appended.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn entries(&self) -> &[Snapshot] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
