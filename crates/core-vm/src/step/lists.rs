//! NEW_LIST/LIST_APPEND/LIST_GET/LIST_SET/LIST_LEN (§4.3, §4.6 "Lists").

use core_heap::heap;
use core_ir::{HeapValue, IrInstruction, VmError, VmState};

use super::{advance, pop_operand, read_heap};

pub fn new_list(state: &VmState) -> Result<VmState, VmError> {
    let (mut next, addr) = heap::alloc(state, HeapValue::List { elements: Vec::new() });
    next.operand_stack.push(addr);
    Ok(advance(next))
}

fn require_list<'a>(
    state: &'a VmState,
    addr: core_ir::HeapAddress,
    instruction: &IrInstruction,
) -> Result<&'a Vec<core_ir::HeapAddress>, VmError> {
    match read_heap(state, addr, instruction)? {
        HeapValue::List { elements } => Ok(elements),
        _ => Err(VmError::type_error(
            format!("{} requires a list", instruction.opcode_name()),
            state.pc,
            state.step_count,
            instruction,
        )),
    }
}

fn require_index(
    state: &VmState,
    addr: core_ir::HeapAddress,
    instruction: &IrInstruction,
) -> Result<usize, VmError> {
    let value = read_heap(state, addr, instruction)?;
    let index = value.as_index().ok_or_else(|| {
        VmError::type_error(
            format!(
                "{} requires an int index, found {}",
                instruction.opcode_name(),
                value.type_name()
            ),
            state.pc,
            state.step_count,
            instruction,
        )
    })?;
    usize::try_from(index).map_err(|_| {
        VmError::type_error(
            format!("{} index {index} is negative", instruction.opcode_name()),
            state.pc,
            state.step_count,
            instruction,
        )
    })
}

/// Pops the value then the list, pushes the value's address onto the list's
/// element vector in place, preserving the list's identity so every other
/// binding aliasing the same list observes the appended element (§4.6).
pub fn list_append(state: &VmState, instruction: &IrInstruction) -> Result<VmState, VmError> {
    let mut working = state.clone();
    let value_addr = pop_operand(&mut working, instruction)?;
    let list_addr = pop_operand(&mut working, instruction)?;

    let mut elements = require_list(&working, list_addr, instruction)?.clone();
    elements.push(value_addr);

    let next = heap::replace(&working, list_addr, HeapValue::List { elements });
    let mut next = next;
    next.operand_stack.push(list_addr);
    Ok(advance(next))
}

pub fn list_get(state: &VmState, instruction: &IrInstruction) -> Result<VmState, VmError> {
    let mut working = state.clone();
    let index_addr = pop_operand(&mut working, instruction)?;
    let list_addr = pop_operand(&mut working, instruction)?;

    let index = require_index(&working, index_addr, instruction)?;
    let elements = require_list(&working, list_addr, instruction)?;
    let element_addr = *elements.get(index).ok_or_else(|| {
        VmError::type_error(
            format!("list index {index} out of range"),
            state.pc,
            state.step_count,
            instruction,
        )
    })?;

    let mut next = working;
    next.operand_stack.push(element_addr);
    Ok(advance(next))
}

/// Pops value, index, list (in that order — the last-pushed operand is on
/// top) and writes the value's address into the list's element vector at
/// `index` in place, preserving identity as `list_append` does.
pub fn list_set(state: &VmState, instruction: &IrInstruction) -> Result<VmState, VmError> {
    let mut working = state.clone();
    let value_addr = pop_operand(&mut working, instruction)?;
    let index_addr = pop_operand(&mut working, instruction)?;
    let list_addr = pop_operand(&mut working, instruction)?;

    let index = require_index(&working, index_addr, instruction)?;
    let mut elements = require_list(&working, list_addr, instruction)?.clone();
    if index >= elements.len() {
        return Err(VmError::type_error(
            format!("list index {index} out of range"),
            state.pc,
            state.step_count,
            instruction,
        ));
    }
    elements[index] = value_addr;

    let next = heap::replace(&working, list_addr, HeapValue::List { elements });
    let mut next = next;
    next.operand_stack.push(list_addr);
    Ok(advance(next))
}

pub fn list_len(state: &VmState, instruction: &IrInstruction) -> Result<VmState, VmError> {
    let mut working = state.clone();
    let list_addr = pop_operand(&mut working, instruction)?;
    let len = require_list(&working, list_addr, instruction)?.len() as i64;

    let (mut next, addr) = heap::alloc(&working, HeapValue::Int(len));
    next.operand_stack.push(addr);
    Ok(advance(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::stack_ops;
    use core_ir::ConstValue;

    fn push_int(state: &VmState, n: i64) -> VmState {
        stack_ops::load_const(state, &ConstValue::Int(n)).unwrap()
    }

    #[test]
    fn append_then_len_reflects_insertion() {
        let state = VmState::initial(vec![]);
        let state = new_list(&state).unwrap();
        let state = push_int(&state, 1);
        let state = list_append(&state, &IrInstruction::ListAppend).unwrap();
        let state = push_int(&state, 2);
        let state = list_append(&state, &IrInstruction::ListAppend).unwrap();
        let state = list_len(&state, &IrInstruction::ListLen).unwrap();
        let addr = *state.operand_stack.last().unwrap();
        assert_eq!(*heap::read(&state, addr).unwrap(), HeapValue::Int(2));
    }

    #[test]
    fn append_preserves_list_identity_for_aliases() {
        let state = VmState::initial(vec![]);
        let state = new_list(&state).unwrap();
        let list_addr = *state.operand_stack.last().unwrap();
        let state = push_int(&state, 9);
        let state = list_append(&state, &IrInstruction::ListAppend).unwrap();
        assert_eq!(*state.operand_stack.last().unwrap(), list_addr);
    }

    #[test]
    fn get_and_set_round_trip_by_index() {
        let state = VmState::initial(vec![]);
        let state = new_list(&state).unwrap();
        let state = push_int(&state, 1);
        let state = list_append(&state, &IrInstruction::ListAppend).unwrap();

        let state = push_int(&state, 0);
        let state = push_int(&state, 42);
        let state = list_set(&state, &IrInstruction::ListSet).unwrap();

        let state = push_int(&state, 0);
        let state = list_get(&state, &IrInstruction::ListGet).unwrap();
        let addr = *state.operand_stack.last().unwrap();
        assert_eq!(*heap::read(&state, addr).unwrap(), HeapValue::Int(42));
    }

    #[test]
    fn get_out_of_range_errors() {
        let state = VmState::initial(vec![]);
        let state = new_list(&state).unwrap();
        let state = push_int(&state, 0);
        let err = list_get(&state, &IrInstruction::ListGet).unwrap_err();
        assert_eq!(err.kind(), core_ir::VmErrorKind::TypeError);
    }
}
