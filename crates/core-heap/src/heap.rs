//! Heap allocator (§4.1). Allocation appends a binding at
//! `heap@{allocation_counter}` and bumps the counter; reads are pure
//! lookups. There is no free — reclamation is `core-vm::gc`'s job alone.

use core_ir::{HeapAddress, HeapValue, VmError, VmState};

/// Allocate `value` at a fresh address, returning the updated state and the
/// address assigned. The counter only increases (§3.1 invariant 2).
pub fn alloc(state: &VmState, value: HeapValue) -> (VmState, HeapAddress) {
    let address = HeapAddress::new(state.allocation_counter);
    let mut next = state.clone();
    next.heap.insert(address, value);
    next.allocation_counter += 1;
    (next, address)
}

/// Read the value at `address`, or `HEAP_ACCESS_VIOLATION` if it has been
/// collected or never existed. Pure; does not require `pc`/`step_count`
/// context because callers in `core-vm` attach that when they build the
/// final `VmError`.
pub fn read<'a>(state: &'a VmState, address: HeapAddress) -> Result<&'a HeapValue, HeapReadError> {
    state.heap.get(&address).ok_or(HeapReadError { address })
}

/// Replace the value at an existing address in place, preserving its
/// identity so every aliased binding observes the mutation (§3.1
/// "Lifecycle", used by `SET_PROPERTY`/`LIST_APPEND`/`LIST_SET`).
pub fn replace(state: &VmState, address: HeapAddress, value: HeapValue) -> VmState {
    let mut next = state.clone();
    next.heap.insert(address, value);
    next
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapReadError {
    pub address: HeapAddress,
}

impl HeapReadError {
    pub fn into_vm_error(self, pc: usize, step_count: u64) -> VmError {
        VmError::heap_access_violation(self.address, pc, step_count, None)
    }
}
