//! Lexical scope chain (§4.2). Environments are created on `CALL` and become
//! unreachable (collectible) on `RET`; this module only ever adds records,
//! never removes them — removal is `core-vm::gc`'s job.

use core_ir::{EnvironmentAddress, EnvironmentRecord, HeapAddress, VmState};

/// Allocate a new environment whose parent is `parent`, from the
/// independent `env_counter` serial (kept separate from the heap counter so
/// traces stay legible — §4.2).
pub fn create(state: &VmState, parent: Option<EnvironmentAddress>) -> (VmState, EnvironmentAddress) {
    let address = EnvironmentAddress::new(state.env_counter);
    let mut next = state.clone();
    next.environment_records
        .insert(address, EnvironmentRecord::new(address, parent));
    next.env_counter += 1;
    (next, address)
}

/// Bind (or rebind) `name` to `heap_addr` in the record at `env_addr`.
/// Rebinding replaces the reference; it never creates a second binding.
pub fn bind(
    state: &VmState,
    env_addr: EnvironmentAddress,
    name: &str,
    heap_addr: HeapAddress,
) -> Result<VmState, EnvironmentAccessError> {
    let mut next = state.clone();
    let record = next
        .environment_records
        .get_mut(&env_addr)
        .ok_or(EnvironmentAccessError { address: env_addr })?;
    record.bindings.insert(name.to_string(), heap_addr);
    Ok(next)
}

/// Walk from `env_addr` up the parent chain, returning the innermost
/// binding for `name` — a binding in a child record always shadows one with
/// the same name further up the chain.
pub fn lookup(
    state: &VmState,
    env_addr: EnvironmentAddress,
    name: &str,
) -> Option<HeapAddress> {
    let mut current = Some(env_addr);
    while let Some(addr) = current {
        let record = state.environment_records.get(&addr)?;
        if let Some(heap_addr) = record.bindings.get(name) {
            return Some(*heap_addr);
        }
        current = record.parent;
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentAccessError {
    pub address: EnvironmentAddress,
}
