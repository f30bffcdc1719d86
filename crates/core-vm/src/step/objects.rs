//! NEW_OBJECT/SET_PROPERTY/GET_PROPERTY/BUILD_CLASS (§4.3, §4.5 "Objects").

use core_heap::{environment, heap};
use core_ir::{HeapValue, IrInstruction, VmError, VmState};
use indexmap::IndexMap;

use super::{advance, pop_operand, read_heap};

pub fn new_object(state: &VmState) -> Result<VmState, VmError> {
    let (mut next, addr) = heap::alloc(
        state,
        HeapValue::Object {
            properties: IndexMap::new(),
        },
    );
    next.operand_stack.push(addr);
    Ok(advance(next))
}

/// Pops the value then the object, and writes `name -> value` into the
/// object's property map in place at the object's existing address — other
/// bindings that alias the same object observe the write (§4.5). Assigning
/// an existing property updates its slot without changing its position in
/// iteration order; a new property is appended. Unlike `LIST_APPEND`, the
/// object is not left on the stack — both operands are consumed and nothing
/// is pushed (§4.3's `Push` column for `SET_PROPERTY` is `ε`); callers that
/// need the object afterwards re-`LOAD` it.
pub fn set_property(state: &VmState, instruction: &IrInstruction, name: &str) -> Result<VmState, VmError> {
    let mut working = state.clone();
    let value_addr = pop_operand(&mut working, instruction)?;
    let object_addr = pop_operand(&mut working, instruction)?;

    let HeapValue::Object { properties } = read_heap(&working, object_addr, instruction)? else {
        return Err(VmError::invalid_object_access(
            state.pc,
            state.step_count,
            instruction,
        ));
    };
    let mut properties = properties.clone();
    properties.insert(name.to_string(), value_addr);

    let next = heap::replace(&working, object_addr, HeapValue::Object { properties });
    Ok(advance(next))
}

pub fn get_property(state: &VmState, instruction: &IrInstruction, name: &str) -> Result<VmState, VmError> {
    let mut next = state.clone();
    let object_addr = pop_operand(&mut next, instruction)?;

    let HeapValue::Object { properties } = read_heap(&next, object_addr, instruction)? else {
        return Err(VmError::invalid_object_access(
            state.pc,
            state.step_count,
            instruction,
        ));
    };
    let value_addr = *properties
        .get(name)
        .ok_or_else(|| VmError::property_not_found(name, state.pc, state.step_count, instruction))?;
    next.operand_stack.push(value_addr);
    Ok(advance(next))
}

/// Pops a function value and binds `name -> fn` in the current environment
/// (§4.3: `BUILD_CLASS` pops `fn`, pushes nothing) — declaring a class is
/// naming the constructor function the compiler already emitted via
/// `MAKE_FUNCTION`, the same binding `STORE` performs for an ordinary name.
pub fn build_class(state: &VmState, instruction: &IrInstruction, name: &str) -> Result<VmState, VmError> {
    let mut next = state.clone();
    let fn_addr = pop_operand(&mut next, instruction)?;
    let next = environment::bind(&next, next.current_environment, name, fn_addr)
        .expect("current_environment always exists while running");
    Ok(advance(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::stack_ops;
    use core_ir::ConstValue;

    #[test]
    fn set_then_get_property_round_trips() {
        let state = VmState::initial(vec![]);
        let state = new_object(&state).unwrap();
        let state = stack_ops::store(&state, &IrInstruction::Store { name: "o".into() }, "o").unwrap();

        let state = stack_ops::load(&state, &IrInstruction::Load { name: "o".into() }, "o").unwrap();
        let state = stack_ops::load_const(&state, &ConstValue::Int(5)).unwrap();
        let state = set_property(&state, &IrInstruction::SetProperty { name: "x".into() }, "x").unwrap();
        assert!(state.operand_stack.is_empty());

        let state = stack_ops::load(&state, &IrInstruction::Load { name: "o".into() }, "o").unwrap();
        let state = get_property(&state, &IrInstruction::GetProperty { name: "x".into() }, "x").unwrap();
        let addr = *state.operand_stack.last().unwrap();
        assert_eq!(*heap::read(&state, addr).unwrap(), HeapValue::Int(5));
    }

    #[test]
    fn set_property_mutates_shared_object_in_place() {
        // Two independent bindings to the same object address; a property
        // write through one is visible reading through the other.
        let state = VmState::initial(vec![]);
        let state = new_object(&state).unwrap();
        let state = stack_ops::store(&state, &IrInstruction::Store { name: "a".into() }, "a").unwrap();
        let state = stack_ops::load(&state, &IrInstruction::Load { name: "a".into() }, "a").unwrap();
        let state = stack_ops::store(&state, &IrInstruction::Store { name: "b".into() }, "b").unwrap();

        let state = stack_ops::load(&state, &IrInstruction::Load { name: "a".into() }, "a").unwrap();
        let state = stack_ops::load_const(&state, &ConstValue::Int(1)).unwrap();
        let state = set_property(&state, &IrInstruction::SetProperty { name: "x".into() }, "x").unwrap();

        let state = stack_ops::load(&state, &IrInstruction::Load { name: "b".into() }, "b").unwrap();
        let state = get_property(&state, &IrInstruction::GetProperty { name: "x".into() }, "x").unwrap();
        let addr = *state.operand_stack.last().unwrap();
        assert_eq!(*heap::read(&state, addr).unwrap(), HeapValue::Int(1));
    }

    #[test]
    fn get_missing_property_errors() {
        let state = VmState::initial(vec![]);
        let state = new_object(&state).unwrap();
        let err = get_property(&state, &IrInstruction::GetProperty { name: "missing".into() }, "missing")
            .unwrap_err();
        assert_eq!(err.kind(), core_ir::VmErrorKind::PropertyNotFound);
    }

    #[test]
    fn get_property_on_non_object_errors() {
        let state = VmState::initial(vec![]);
        let state = stack_ops::load_const(&state, &ConstValue::Int(1)).unwrap();
        let err = get_property(&state, &IrInstruction::GetProperty { name: "x".into() }, "x").unwrap_err();
        assert_eq!(err.kind(), core_ir::VmErrorKind::InvalidObjectAccess);
    }

    #[test]
    fn build_class_binds_name_to_popped_function_and_consumes_operand() {
        let state = VmState::initial(vec![]);
        let state = stack_ops::make_function(&state, 7).unwrap();
        let fn_addr = *state.operand_stack.last().unwrap();
        let state =
            build_class(&state, &IrInstruction::BuildClass { name: "Point".into() }, "Point").unwrap();
        assert!(state.operand_stack.is_empty());
        let bound = environment::lookup(&state, state.current_environment, "Point").unwrap();
        assert_eq!(bound, fn_addr);
    }

    #[test]
    fn build_class_on_empty_stack_is_underflow() {
        let state = VmState::initial(vec![]);
        let err = build_class(&state, &IrInstruction::BuildClass { name: "Point".into() }, "Point")
            .unwrap_err();
        assert_eq!(err.kind(), core_ir::VmErrorKind::StackUnderflow);
    }
}
