//! The complete, serialisable machine state (§3.1).
//!
//! Every field is logically read-only: every operation in `core-heap` and
//! `core-vm` takes a `&VMState` and returns a new owned `VMState` rather than
//! mutating in place, so `VMState: Clone` is part of the contract, not an
//! implementation detail.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::address::{EnvironmentAddress, HeapAddress};
use crate::instruction::IrInstruction;
use crate::value::HeapValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentRecord {
    pub address: EnvironmentAddress,
    pub parent: Option<EnvironmentAddress>,
    /// Name -> address. A single record never shadows itself; shadowing is
    /// resolved by walking the parent chain in `core-heap::environment::lookup`.
    pub bindings: IndexMap<String, HeapAddress>,
}

impl EnvironmentRecord {
    pub fn new(address: EnvironmentAddress, parent: Option<EnvironmentAddress>) -> Self {
        Self {
            address,
            parent,
            bindings: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    pub return_address: usize,
    pub environment: EnvironmentAddress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmState {
    pub program: Vec<IrInstruction>,
    pub pc: usize,
    pub operand_stack: Vec<HeapAddress>,
    pub heap: IndexMap<HeapAddress, HeapValue>,
    pub environment_records: IndexMap<EnvironmentAddress, EnvironmentRecord>,
    pub current_environment: EnvironmentAddress,
    pub global_environment: EnvironmentAddress,
    pub allocation_counter: u64,
    pub env_counter: u64,
    pub step_count: u64,
    pub is_running: bool,
    pub call_stack: Vec<StackFrame>,
    pub output: Vec<String>,
}

impl VmState {
    /// The initial state for a given program is a pure function of the
    /// program (§3.1 invariant 3): a single environment `env@0`, serving as
    /// both `current_environment` and `global_environment`.
    pub fn initial(program: Vec<IrInstruction>) -> Self {
        let global = EnvironmentAddress::new(0);
        let mut environment_records = IndexMap::new();
        environment_records.insert(global, EnvironmentRecord::new(global, None));

        Self {
            program,
            pc: 0,
            operand_stack: Vec::new(),
            heap: IndexMap::new(),
            environment_records,
            current_environment: global,
            global_environment: global,
            allocation_counter: 0,
            env_counter: 1,
            step_count: 0,
            is_running: true,
            call_stack: Vec::new(),
            output: Vec::new(),
        }
    }
}
