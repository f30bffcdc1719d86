//! Single-instruction state transition function (§4.3, C5).
//!
//! `step` is the one entry point; it dispatches on opcode to a focused
//! sub-module, the same decomposition an editor's action dispatcher uses
//! for its per-action handlers (`{motion,mode,edit,...}`).
//! Every sub-module function receives the state *before* the instruction
//! runs and returns the state *after*, with `pc` already advanced — `step`
//! itself only validates the precondition and stamps `step_count`.

mod arithmetic;
mod control_flow;
mod lists;
mod objects;
mod stack_ops;

use core_ir::{IrInstruction, VmError, VmState};

/// Advance `state.pc` by one; the default for every opcode except the
/// handful that redirect control flow (`Jump*`, `Call`, `Ret`).
pub(crate) fn advance(mut state: VmState) -> VmState {
    state.pc += 1;
    state
}

pub(crate) fn pop_operand(
    state: &mut VmState,
    instruction: &IrInstruction,
) -> Result<core_ir::HeapAddress, VmError> {
    state
        .operand_stack
        .pop()
        .ok_or_else(|| VmError::stack_underflow(state.pc, state.step_count, instruction))
}

pub(crate) fn read_heap<'a>(
    state: &'a VmState,
    address: core_ir::HeapAddress,
    instruction: &IrInstruction,
) -> Result<&'a core_ir::HeapValue, VmError> {
    core_heap::heap::read(state, address)
        .map_err(|e| e.into_vm_error(state.pc, state.step_count).tag(instruction))
}

/// Execute the instruction at `state.pc`, returning the successor state.
///
/// Preconditions: `state.pc` must index `state.program`, otherwise
/// `PC_OUT_OF_BOUNDS`. Every other failure mode is opcode-specific and
/// documented on the opcode catalogue in spec §4.3.
pub fn step(state: &VmState) -> Result<VmState, VmError> {
    let Some(instruction) = state.program.get(state.pc).cloned() else {
        return Err(VmError::pc_out_of_bounds(state.pc, state.step_count));
    };

    tracing::trace!(
        pc = state.pc,
        step = state.step_count,
        opcode = instruction.opcode_name(),
        "executing instruction"
    );

    let mut next = dispatch(state, &instruction)?;
    next.step_count = state.step_count + 1;
    Ok(next)
}

fn dispatch(state: &VmState, instruction: &IrInstruction) -> Result<VmState, VmError> {
    use IrInstruction as I;
    match instruction {
        I::LoadConst { value } => stack_ops::load_const(state, value),
        I::Add | I::Sub | I::Mul | I::Div | I::Mod => {
            arithmetic::binary_arithmetic(state, instruction)
        }
        I::Negate => arithmetic::negate(state, instruction),
        I::Not => arithmetic::not(state, instruction),
        I::Eq | I::Neq => arithmetic::equality(state, instruction),
        I::Lt | I::Gt | I::Lte | I::Gte => arithmetic::comparison(state, instruction),
        I::Store { name } => stack_ops::store(state, instruction, name),
        I::Load { name } => stack_ops::load(state, instruction, name),
        I::Jump { target } => control_flow::jump(state, *target),
        I::JumpIfFalse { target } => control_flow::jump_if_false(state, instruction, *target),
        I::JumpIfTrue { target } => control_flow::jump_if_true(state, instruction, *target),
        I::Dup => stack_ops::dup(state, instruction),
        I::Pop => stack_ops::pop(state, instruction),
        I::Print => stack_ops::print(state, instruction),
        I::MakeFunction { entry } => stack_ops::make_function(state, *entry),
        I::Call { arg_count } => control_flow::call(state, instruction, *arg_count),
        I::Ret => control_flow::ret(state),
        I::NewObject => objects::new_object(state),
        I::SetProperty { name } => objects::set_property(state, instruction, name),
        I::GetProperty { name } => objects::get_property(state, instruction, name),
        I::BuildClass { name } => objects::build_class(state, instruction, name),
        I::NewList => lists::new_list(state),
        I::ListAppend => lists::list_append(state, instruction),
        I::ListGet => lists::list_get(state, instruction),
        I::ListSet => lists::list_set(state, instruction),
        I::ListLen => lists::list_len(state, instruction),
        I::Halt => control_flow::halt(state),
    }
}

/// Small extension used by `read_heap` to attach the opcode that was being
/// executed onto a heap-access error built from `core-heap`, which has no
/// notion of "current instruction".
trait TagInstruction {
    fn tag(self, instruction: &IrInstruction) -> Self;
}

impl TagInstruction for VmError {
    fn tag(mut self, instruction: &IrInstruction) -> Self {
        if self.instruction.is_none() {
            self.instruction = Some(instruction.clone());
        }
        self
    }
}
