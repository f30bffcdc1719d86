//! ADD/SUB/MUL/DIV/MOD/NEGATE/NOT/EQ/NEQ/LT/GT/LTE/GTE.
//!
//! Every binary op pops the right operand first, then the left (§4.3
//! "Operand stack discipline"), reads both from the heap, computes a result,
//! and allocates it fresh — results are never written back into an existing
//! slot by these opcodes.

use core_heap::heap;
use core_ir::{HeapValue, IrInstruction, Number, VmError, VmState};

use super::{advance, pop_operand, read_heap};

fn pop_two(
    state: &VmState,
    instruction: &IrInstruction,
) -> Result<(VmState, HeapValue, HeapValue), VmError> {
    let mut working = state.clone();
    let r_addr = pop_operand(&mut working, instruction)?;
    let l_addr = pop_operand(&mut working, instruction)?;
    let r = read_heap(&working, r_addr, instruction)?.clone();
    let l = read_heap(&working, l_addr, instruction)?.clone();
    Ok((working, l, r))
}

pub fn binary_arithmetic(state: &VmState, instruction: &IrInstruction) -> Result<VmState, VmError> {
    let (working, l, r) = pop_two(state, instruction)?;

    let result = match instruction {
        IrInstruction::Add => match (&l, &r) {
            (HeapValue::Str(a), HeapValue::Str(b)) => HeapValue::Str(format!("{a}{b}")),
            _ => numeric_binop(&l, &r, instruction, state, |a, b| a + b, |a, b| a + b)?,
        },
        IrInstruction::Sub => numeric_binop(&l, &r, instruction, state, |a, b| a - b, |a, b| a - b)?,
        IrInstruction::Mul => numeric_binop(&l, &r, instruction, state, |a, b| a * b, |a, b| a * b)?,
        IrInstruction::Div => {
            let rn = require_number(&r, instruction, state)?;
            if rn.is_zero() {
                return Err(VmError::division_by_zero(
                    state.pc,
                    state.step_count,
                    instruction,
                ));
            }
            numeric_binop(&l, &r, instruction, state, |a, b| a / b, |a, b| a / b)?
        }
        IrInstruction::Mod => {
            let rn = require_number(&r, instruction, state)?;
            if rn.is_zero() {
                return Err(VmError::division_by_zero(
                    state.pc,
                    state.step_count,
                    instruction,
                ));
            }
            numeric_binop(&l, &r, instruction, state, |a, b| a % b, |a, b| a % b)?
        }
        _ => unreachable!("binary_arithmetic only dispatches arithmetic opcodes"),
    };

    let (mut next, addr) = heap::alloc(&working, result);
    next.operand_stack.push(addr);
    Ok(advance(next))
}

fn require_number(
    v: &HeapValue,
    instruction: &IrInstruction,
    state: &VmState,
) -> Result<Number, VmError> {
    v.as_number().ok_or_else(|| {
        VmError::type_error(
            format!(
                "{} requires a number, found {}",
                instruction.opcode_name(),
                v.type_name()
            ),
            state.pc,
            state.step_count,
            instruction,
        )
    })
}

fn numeric_binop(
    l: &HeapValue,
    r: &HeapValue,
    instruction: &IrInstruction,
    state: &VmState,
    int_op: impl Fn(i64, i64) -> i64,
    float_op: impl Fn(f64, f64) -> f64,
) -> Result<HeapValue, VmError> {
    let l = require_number(l, instruction, state)?;
    let r = require_number(r, instruction, state)?;
    let result = match (l, r) {
        (Number::Int(a), Number::Int(b)) => Number::Int(int_op(a, b)),
        _ => Number::Float(float_op(l.as_f64(), r.as_f64())),
    };
    Ok(result.to_heap_value())
}

pub fn negate(state: &VmState, instruction: &IrInstruction) -> Result<VmState, VmError> {
    let mut working = state.clone();
    let addr = pop_operand(&mut working, instruction)?;
    let value = read_heap(&working, addr, instruction)?.clone();
    let number = value.as_number().ok_or_else(|| {
        VmError::type_error(
            format!("NEGATE requires a number, found {}", value.type_name()),
            state.pc,
            state.step_count,
            instruction,
        )
    })?;
    let result = match number {
        Number::Int(n) => HeapValue::Int(-n),
        Number::Float(n) => HeapValue::Float(-n),
    };
    let (mut next, new_addr) = heap::alloc(&working, result);
    next.operand_stack.push(new_addr);
    Ok(advance(next))
}

pub fn not(state: &VmState, instruction: &IrInstruction) -> Result<VmState, VmError> {
    let mut working = state.clone();
    let addr = pop_operand(&mut working, instruction)?;
    let value = read_heap(&working, addr, instruction)?.clone();
    let (mut next, new_addr) = heap::alloc(&working, HeapValue::Bool(!value.is_truthy()));
    next.operand_stack.push(new_addr);
    Ok(advance(next))
}

/// Value equality: scalars compare by value (numeric types compare across
/// `Int`/`Float`), compound heap values (`Function`/`Object`/`List`) compare
/// by address identity — two allocations with identical contents are not
/// equal unless they are the same allocation.
fn values_equal(l_addr: core_ir::HeapAddress, r_addr: core_ir::HeapAddress, l: &HeapValue, r: &HeapValue) -> bool {
    match (l, r) {
        (HeapValue::Function { .. }, HeapValue::Function { .. })
        | (HeapValue::Object { .. }, HeapValue::Object { .. })
        | (HeapValue::List { .. }, HeapValue::List { .. }) => l_addr == r_addr,
        (HeapValue::Int(_) | HeapValue::Float(_), HeapValue::Int(_) | HeapValue::Float(_)) => {
            l.as_number().unwrap().as_f64() == r.as_number().unwrap().as_f64()
        }
        (HeapValue::Bool(a), HeapValue::Bool(b)) => a == b,
        (HeapValue::Str(a), HeapValue::Str(b)) => a == b,
        (HeapValue::Null, HeapValue::Null) => true,
        _ => false,
    }
}

pub fn equality(state: &VmState, instruction: &IrInstruction) -> Result<VmState, VmError> {
    let mut working = state.clone();
    let r_addr = pop_operand(&mut working, instruction)?;
    let l_addr = pop_operand(&mut working, instruction)?;
    let r = read_heap(&working, r_addr, instruction)?.clone();
    let l = read_heap(&working, l_addr, instruction)?.clone();

    let eq = values_equal(l_addr, r_addr, &l, &r);
    let result = match instruction {
        IrInstruction::Eq => eq,
        IrInstruction::Neq => !eq,
        _ => unreachable!("equality only dispatches EQ/NEQ"),
    };

    let (mut next, addr) = heap::alloc(&working, HeapValue::Bool(result));
    next.operand_stack.push(addr);
    Ok(advance(next))
}

pub fn comparison(state: &VmState, instruction: &IrInstruction) -> Result<VmState, VmError> {
    let (working, l, r) = pop_two(state, instruction)?;
    let l = require_number(&l, instruction, state)?.as_f64();
    let r = require_number(&r, instruction, state)?.as_f64();

    let result = match instruction {
        IrInstruction::Lt => l < r,
        IrInstruction::Gt => l > r,
        IrInstruction::Lte => l <= r,
        IrInstruction::Gte => l >= r,
        _ => unreachable!("comparison only dispatches LT/GT/LTE/GTE"),
    };

    let (mut next, addr) = heap::alloc(&working, HeapValue::Bool(result));
    next.operand_stack.push(addr);
    Ok(advance(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_ir::ConstValue;

    fn push_const(state: &VmState, value: ConstValue) -> VmState {
        let (mut next, addr) = heap::alloc(state, HeapValue::from_const(&value));
        next.operand_stack.push(addr);
        next
    }

    #[test]
    fn add_numbers() {
        let state = VmState::initial(vec![]);
        let state = push_const(&state, ConstValue::Int(3));
        let state = push_const(&state, ConstValue::Int(4));
        let state = binary_arithmetic(&state, &IrInstruction::Add).unwrap();
        let top = *state.operand_stack.last().unwrap();
        assert_eq!(*heap::read(&state, top).unwrap(), HeapValue::Int(7));
    }

    #[test]
    fn add_strings_concatenates() {
        let state = VmState::initial(vec![]);
        let state = push_const(&state, ConstValue::Str("foo".into()));
        let state = push_const(&state, ConstValue::Str("bar".into()));
        let state = binary_arithmetic(&state, &IrInstruction::Add).unwrap();
        let top = *state.operand_stack.last().unwrap();
        assert_eq!(
            *heap::read(&state, top).unwrap(),
            HeapValue::Str("foobar".into())
        );
    }

    #[test]
    fn add_mismatched_types_is_type_error() {
        let state = VmState::initial(vec![]);
        let state = push_const(&state, ConstValue::Int(1));
        let state = push_const(&state, ConstValue::Str("x".into()));
        let err = binary_arithmetic(&state, &IrInstruction::Add).unwrap_err();
        assert_eq!(err.kind(), core_ir::VmErrorKind::TypeError);
    }

    #[test]
    fn div_by_zero_errors() {
        let state = VmState::initial(vec![]);
        let state = push_const(&state, ConstValue::Int(1));
        let state = push_const(&state, ConstValue::Int(0));
        let err = binary_arithmetic(&state, &IrInstruction::Div).unwrap_err();
        assert_eq!(err.kind(), core_ir::VmErrorKind::DivisionByZero);
    }

    #[test]
    fn int_and_float_promote_to_float() {
        let state = VmState::initial(vec![]);
        let state = push_const(&state, ConstValue::Int(1));
        let state = push_const(&state, ConstValue::Float(0.5));
        let state = binary_arithmetic(&state, &IrInstruction::Add).unwrap();
        let top = *state.operand_stack.last().unwrap();
        assert_eq!(*heap::read(&state, top).unwrap(), HeapValue::Float(1.5));
    }

    #[test]
    fn equality_is_reference_identity_for_lists() {
        let state = VmState::initial(vec![]);
        let (state, list_a) = heap::alloc(&state, HeapValue::List { elements: vec![] });
        let (state, list_b) = heap::alloc(&state, HeapValue::List { elements: vec![] });
        let mut state = state;
        state.operand_stack.push(list_a);
        state.operand_stack.push(list_a);
        let eq_same = equality(&state, &IrInstruction::Eq).unwrap();
        let top = *eq_same.operand_stack.last().unwrap();
        assert_eq!(*heap::read(&eq_same, top).unwrap(), HeapValue::Bool(true));

        let mut state2 = state.clone();
        state2.operand_stack = vec![list_a, list_b];
        let eq_diff = equality(&state2, &IrInstruction::Eq).unwrap();
        let top = *eq_diff.operand_stack.last().unwrap();
        assert_eq!(*heap::read(&eq_diff, top).unwrap(), HeapValue::Bool(false));
    }
}
