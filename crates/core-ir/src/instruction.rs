//! The IR instruction set consumed from the compiler (§4.3, §6).
//!
//! Each variant is an immutable record carrying its opcode and operands. The
//! extended instruction set is authoritative per spec.md §9 ("Open
//! questions"): comparisons, lists, and `Print` are first-class opcodes, not
//! a later extension.

use serde::{Deserialize, Serialize};

use crate::value::ConstValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum IrInstruction {
    LoadConst { value: ConstValue },
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Negate,
    Not,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    Store { name: String },
    Load { name: String },
    Jump { target: usize },
    JumpIfFalse { target: usize },
    JumpIfTrue { target: usize },
    Dup,
    Pop,
    Print,
    MakeFunction { entry: usize },
    Call { arg_count: usize },
    Ret,
    NewObject,
    SetProperty { name: String },
    GetProperty { name: String },
    BuildClass { name: String },
    NewList,
    ListAppend,
    ListGet,
    ListSet,
    ListLen,
    Halt,
}

impl IrInstruction {
    /// Stable opcode name, used for error context and trace narration.
    pub fn opcode_name(&self) -> &'static str {
        match self {
            IrInstruction::LoadConst { .. } => "LOAD_CONST",
            IrInstruction::Add => "ADD",
            IrInstruction::Sub => "SUB",
            IrInstruction::Mul => "MUL",
            IrInstruction::Div => "DIV",
            IrInstruction::Mod => "MOD",
            IrInstruction::Negate => "NEGATE",
            IrInstruction::Not => "NOT",
            IrInstruction::Eq => "EQ",
            IrInstruction::Neq => "NEQ",
            IrInstruction::Lt => "LT",
            IrInstruction::Gt => "GT",
            IrInstruction::Lte => "LTE",
            IrInstruction::Gte => "GTE",
            IrInstruction::Store { .. } => "STORE",
            IrInstruction::Load { .. } => "LOAD",
            IrInstruction::Jump { .. } => "JUMP",
            IrInstruction::JumpIfFalse { .. } => "JUMP_IF_FALSE",
            IrInstruction::JumpIfTrue { .. } => "JUMP_IF_TRUE",
            IrInstruction::Dup => "DUP",
            IrInstruction::Pop => "POP",
            IrInstruction::Print => "PRINT",
            IrInstruction::MakeFunction { .. } => "MAKE_FUNCTION",
            IrInstruction::Call { .. } => "CALL",
            IrInstruction::Ret => "RET",
            IrInstruction::NewObject => "NEW_OBJECT",
            IrInstruction::SetProperty { .. } => "SET_PROPERTY",
            IrInstruction::GetProperty { .. } => "GET_PROPERTY",
            IrInstruction::BuildClass { .. } => "BUILD_CLASS",
            IrInstruction::NewList => "NEW_LIST",
            IrInstruction::ListAppend => "LIST_APPEND",
            IrInstruction::ListGet => "LIST_GET",
            IrInstruction::ListSet => "LIST_SET",
            IrInstruction::ListLen => "LIST_LEN",
            IrInstruction::Halt => "HALT",
        }
    }
}

/// The compiler also supplies a source map parallel to the program; the VM
/// never interprets it, but carries it through so a narrator/UI can map a
/// `pc` back to source.
pub type SourceMap = Vec<u32>;
