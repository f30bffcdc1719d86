//! Mark-sweep reachability collector (§4.9, C7).
//!
//! The collector only ever runs against a *final* returned state — never
//! mid-instruction, since `step` itself never observes or depends on heap
//! occupancy. Roots are the operand stack, `current_environment`,
//! `global_environment`, and every call-stack frame's environment; from
//! there, marking follows environment parent links and bindings, and heap
//! structure (object properties, list elements, function closures). Sweep
//! preserves every surviving address unchanged — collection never
//! renumbers the heap or the environment table, so a partially-collected
//! trace stays comparable to an uncollected one address-for-address.

use std::collections::BTreeSet;

use core_ir::{EnvironmentAddress, HeapAddress, HeapValue, VmState};

struct Reachable {
    envs: BTreeSet<EnvironmentAddress>,
    heap: BTreeSet<HeapAddress>,
}

fn mark(state: &VmState) -> Reachable {
    let mut envs = BTreeSet::new();
    let mut heap = BTreeSet::new();

    let mut env_worklist: Vec<EnvironmentAddress> = vec![state.current_environment, state.global_environment];
    env_worklist.extend(state.call_stack.iter().map(|frame| frame.environment));
    let mut heap_worklist: Vec<HeapAddress> = state.operand_stack.clone();

    loop {
        let mut progressed = false;

        while let Some(env_addr) = env_worklist.pop() {
            if !envs.insert(env_addr) {
                continue;
            }
            progressed = true;
            let Some(record) = state.environment_records.get(&env_addr) else {
                continue;
            };
            if let Some(parent) = record.parent {
                env_worklist.push(parent);
            }
            heap_worklist.extend(record.bindings.values().copied());
        }

        while let Some(heap_addr) = heap_worklist.pop() {
            if !heap.insert(heap_addr) {
                continue;
            }
            progressed = true;
            match state.heap.get(&heap_addr) {
                Some(HeapValue::Function { environment, .. }) => env_worklist.push(*environment),
                Some(HeapValue::Object { properties }) => {
                    heap_worklist.extend(properties.values().copied())
                }
                Some(HeapValue::List { elements }) => heap_worklist.extend(elements.iter().copied()),
                _ => {}
            }
        }

        if !progressed && env_worklist.is_empty() && heap_worklist.is_empty() {
            break;
        }
    }

    Reachable { envs, heap }
}

/// Returns a new state with every unreachable heap slot and environment
/// record removed. Insertion order of the surviving entries is unchanged.
pub fn collect(state: &VmState) -> VmState {
    let reachable = mark(state);
    let mut next = state.clone();
    next.heap.retain(|addr, _| reachable.heap.contains(addr));
    next.environment_records
        .retain(|addr, _| reachable.envs.contains(addr));
    next
}
