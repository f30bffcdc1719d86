//! Structured VM errors (§4.7, §7). Every error carries full execution
//! context and is returned, never silently swallowed or approximated.

use serde::{Deserialize, Serialize};

use crate::instruction::IrInstruction;

/// The `type` tag in the serialised error value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VmErrorKind {
    StackUnderflow,
    /// Reserved by the §4.7 taxonomy for a decode-time bad opcode. `step`
    /// never produces it: `IrInstruction` is a typed enum, so an unrecognised
    /// opcode is rejected by the compiler-side decoder before it ever
    /// reaches a `VmState`, not by the VM itself.
    InvalidOpcode,
    UnboundVariable,
    DivisionByZero,
    HeapAccessViolation,
    PcOutOfBounds,
    TypeError,
    InvalidObjectAccess,
    PropertyNotFound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind:?} at pc={pc} (step {step_count}): {message}")]
pub struct VmError {
    #[serde(rename = "type")]
    pub kind: VmErrorKind,
    pub message: String,
    pub pc: usize,
    pub step_count: u64,
    pub instruction: Option<IrInstruction>,
}

impl VmError {
    pub fn new(
        kind: VmErrorKind,
        message: impl Into<String>,
        pc: usize,
        step_count: u64,
        instruction: Option<IrInstruction>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            pc,
            step_count,
            instruction,
        }
    }

    pub fn stack_underflow(pc: usize, step_count: u64, instruction: &IrInstruction) -> Self {
        Self::new(
            VmErrorKind::StackUnderflow,
            format!(
                "operand stack underflow executing {}",
                instruction.opcode_name()
            ),
            pc,
            step_count,
            Some(instruction.clone()),
        )
    }

    pub fn pc_out_of_bounds(pc: usize, step_count: u64) -> Self {
        Self::new(
            VmErrorKind::PcOutOfBounds,
            format!("pc {pc} is outside the program"),
            pc,
            step_count,
            None,
        )
    }

    pub fn unbound_variable(
        name: &str,
        pc: usize,
        step_count: u64,
        instruction: &IrInstruction,
    ) -> Self {
        Self::new(
            VmErrorKind::UnboundVariable,
            format!("unbound variable `{name}`"),
            pc,
            step_count,
            Some(instruction.clone()),
        )
    }

    pub fn division_by_zero(pc: usize, step_count: u64, instruction: &IrInstruction) -> Self {
        Self::new(
            VmErrorKind::DivisionByZero,
            "division by zero".to_string(),
            pc,
            step_count,
            Some(instruction.clone()),
        )
    }

    pub fn heap_access_violation(
        address: impl std::fmt::Display,
        pc: usize,
        step_count: u64,
        instruction: Option<&IrInstruction>,
    ) -> Self {
        Self::new(
            VmErrorKind::HeapAccessViolation,
            format!("no heap value at {address}"),
            pc,
            step_count,
            instruction.cloned(),
        )
    }

    pub fn type_error(
        message: impl Into<String>,
        pc: usize,
        step_count: u64,
        instruction: &IrInstruction,
    ) -> Self {
        Self::new(
            VmErrorKind::TypeError,
            message.into(),
            pc,
            step_count,
            Some(instruction.clone()),
        )
    }

    pub fn invalid_object_access(pc: usize, step_count: u64, instruction: &IrInstruction) -> Self {
        Self::new(
            VmErrorKind::InvalidObjectAccess,
            format!(
                "{} target is not an object",
                instruction.opcode_name()
            ),
            pc,
            step_count,
            Some(instruction.clone()),
        )
    }

    pub fn property_not_found(
        name: &str,
        pc: usize,
        step_count: u64,
        instruction: &IrInstruction,
    ) -> Self {
        Self::new(
            VmErrorKind::PropertyNotFound,
            format!("no property `{name}`"),
            pc,
            step_count,
            Some(instruction.clone()),
        )
    }

    pub fn kind(&self) -> VmErrorKind {
        self.kind
    }
}
