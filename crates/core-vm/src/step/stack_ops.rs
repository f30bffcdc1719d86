//! LOAD_CONST/STORE/LOAD/DUP/POP/PRINT/MAKE_FUNCTION.

use core_heap::{environment, heap};
use core_ir::{ConstValue, HeapValue, IrInstruction, VmError, VmState};

use super::{advance, pop_operand, read_heap};

pub fn load_const(state: &VmState, value: &ConstValue) -> Result<VmState, VmError> {
    let (mut next, addr) = heap::alloc(state, HeapValue::from_const(value));
    next.operand_stack.push(addr);
    Ok(advance(next))
}

/// Pops the top of the operand stack and binds it to `name` in the current
/// environment (§4.3: `STORE` pops its operand and pushes nothing).
pub fn store(state: &VmState, instruction: &IrInstruction, name: &str) -> Result<VmState, VmError> {
    let mut next = state.clone();
    let addr = pop_operand(&mut next, instruction)?;
    let next = environment::bind(&next, next.current_environment, name, addr)
        .expect("current_environment always exists while running");
    Ok(advance(next))
}

pub fn load(state: &VmState, instruction: &IrInstruction, name: &str) -> Result<VmState, VmError> {
    let addr = environment::lookup(state, state.current_environment, name)
        .ok_or_else(|| VmError::unbound_variable(name, state.pc, state.step_count, instruction))?;
    let mut next = state.clone();
    next.operand_stack.push(addr);
    Ok(advance(next))
}

pub fn dup(state: &VmState, instruction: &IrInstruction) -> Result<VmState, VmError> {
    let addr = *state
        .operand_stack
        .last()
        .ok_or_else(|| VmError::stack_underflow(state.pc, state.step_count, instruction))?;
    let mut next = state.clone();
    next.operand_stack.push(addr);
    Ok(advance(next))
}

pub fn pop(state: &VmState, instruction: &IrInstruction) -> Result<VmState, VmError> {
    let mut next = state.clone();
    pop_operand(&mut next, instruction)?;
    Ok(advance(next))
}

pub fn print(state: &VmState, instruction: &IrInstruction) -> Result<VmState, VmError> {
    let mut next = state.clone();
    let addr = pop_operand(&mut next, instruction)?;
    let text = read_heap(&next, addr, instruction)?.format_for_print();
    next.output.push(text);
    Ok(advance(next))
}

/// Captures `current_environment` as the function's closure environment —
/// the value is only ever callable from the scope it was created in, which
/// is what makes closures work (§4.3, §8 "closure capture").
pub fn make_function(state: &VmState, entry: usize) -> Result<VmState, VmError> {
    let (mut next, addr) = heap::alloc(
        state,
        HeapValue::Function {
            entry,
            environment: state.current_environment,
        },
    );
    next.operand_stack.push(addr);
    Ok(advance(next))
}
