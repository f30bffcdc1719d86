//! JUMP/JUMP_IF_FALSE/JUMP_IF_TRUE/CALL/RET/HALT (§4.3, §4.4 "Call
//! discipline").

use core_heap::{environment, heap};
use core_ir::{HeapValue, IrInstruction, StackFrame, VmError, VmState};

use super::{advance, pop_operand, read_heap};

pub fn jump(state: &VmState, target: usize) -> Result<VmState, VmError> {
    let mut next = state.clone();
    next.pc = target;
    Ok(next)
}

fn branch_if(
    state: &VmState,
    instruction: &IrInstruction,
    target: usize,
    branch_when: bool,
) -> Result<VmState, VmError> {
    let mut next = state.clone();
    let addr = pop_operand(&mut next, instruction)?;
    let truthy = read_heap(&next, addr, instruction)?.is_truthy();
    if truthy == branch_when {
        next.pc = target;
    } else {
        next.pc += 1;
    }
    Ok(next)
}

pub fn jump_if_false(state: &VmState, instruction: &IrInstruction, target: usize) -> Result<VmState, VmError> {
    branch_if(state, instruction, target, false)
}

pub fn jump_if_true(state: &VmState, instruction: &IrInstruction, target: usize) -> Result<VmState, VmError> {
    branch_if(state, instruction, target, true)
}

/// Pops the callee (the compiler pushes it last, after every argument
/// expression), then pops `arg_count` arguments — last-pushed argument on
/// top, so the collected list is reversed to recover source order before
/// binding. Creates a fresh environment parented to the callee's
/// *captured* environment (not the caller's — this is what makes closures
/// and recursion both work), binds `arg0`, `arg1`, … to the argument
/// addresses in that new environment (§4.3 "CALL semantics"; the operand
/// stack itself is untouched — the catalogue's `Push` column for `CALL` is
/// `ε`), pushes a `StackFrame` recording the return address (`pc + 1`) and
/// the caller's environment, then jumps to `entry`.
pub fn call(state: &VmState, instruction: &IrInstruction, arg_count: usize) -> Result<VmState, VmError> {
    let mut working = state.clone();
    let callee_addr = pop_operand(&mut working, instruction)?;
    let mut args = Vec::with_capacity(arg_count);
    for _ in 0..arg_count {
        args.push(pop_operand(&mut working, instruction)?);
    }
    args.reverse();

    let (entry, captured_environment) = match read_heap(&working, callee_addr, instruction)? {
        HeapValue::Function { entry, environment } => (*entry, *environment),
        _ => {
            return Err(VmError::type_error(
                format!("{} target is not callable", instruction.opcode_name()),
                state.pc,
                state.step_count,
                instruction,
            ))
        }
    };

    let (mut next, call_env) = environment::create(&working, Some(captured_environment));
    next.call_stack.push(StackFrame {
        return_address: state.pc + 1,
        environment: next.current_environment,
    });
    next.current_environment = call_env;
    for (index, arg_addr) in args.into_iter().enumerate() {
        next = environment::bind(&next, call_env, &format!("arg{index}"), arg_addr)
            .expect("call_env was just created and cannot be missing");
    }
    next.pc = entry;
    Ok(next)
}

/// Pops the innermost call frame and restores `pc`/`current_environment`
/// from it; the operand stack is left exactly as the callee left it, so the
/// value the callee pushed before `RET` becomes the call's result (§4.4).
/// `RET` with an empty call stack halts the program — top-level code ending
/// in `RET` is equivalent to `HALT`.
pub fn ret(state: &VmState) -> Result<VmState, VmError> {
    let mut next = state.clone();
    match next.call_stack.pop() {
        Some(frame) => {
            next.current_environment = frame.environment;
            next.pc = frame.return_address;
            Ok(next)
        }
        None => halt(state),
    }
}

pub fn halt(state: &VmState) -> Result<VmState, VmError> {
    let mut next = state.clone();
    next.is_running = false;
    next.pc += 1;
    Ok(next)
}
