//! Value representations: literal constants carried by `LoadConst`, and the
//! tagged heap values produced by evaluating them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::address::{EnvironmentAddress, HeapAddress};

/// A literal embedded directly in the program, as the operand of `LoadConst`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum ConstValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Null,
}

/// A heap-resident value. Every reference between values (object property,
/// list element, closure capture, call-frame environment) is a plain
/// address — the heap map is the sole owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum HeapValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Null,
    Function {
        entry: usize,
        environment: EnvironmentAddress,
    },
    Object {
        /// Insertion order at first assignment; a later `SetProperty` on an
        /// existing key updates in place and does not reorder.
        properties: IndexMap<String, HeapAddress>,
    },
    List {
        elements: Vec<HeapAddress>,
    },
}

impl HeapValue {
    pub fn from_const(value: &ConstValue) -> Self {
        match value {
            ConstValue::Int(n) => HeapValue::Int(*n),
            ConstValue::Float(n) => HeapValue::Float(*n),
            ConstValue::Bool(b) => HeapValue::Bool(*b),
            ConstValue::Str(s) => HeapValue::Str(s.clone()),
            ConstValue::Null => HeapValue::Null,
        }
    }

    /// Truthiness per §4.3: `false`, numeric zero, `null`, and the empty
    /// string are falsy; everything else (including lists/objects/functions)
    /// is truthy. Used identically by `Not`, `JumpIfFalse`, `JumpIfTrue`.
    pub fn is_truthy(&self) -> bool {
        match self {
            HeapValue::Bool(b) => *b,
            HeapValue::Int(n) => *n != 0,
            HeapValue::Float(n) => *n != 0.0,
            HeapValue::Null => false,
            HeapValue::Str(s) => !s.is_empty(),
            HeapValue::Function { .. } | HeapValue::Object { .. } | HeapValue::List { .. } => true,
        }
    }

    /// Text rendered by `Print`.
    pub fn format_for_print(&self) -> String {
        match self {
            HeapValue::Null => "None".to_string(),
            HeapValue::Bool(true) => "True".to_string(),
            HeapValue::Bool(false) => "False".to_string(),
            HeapValue::List { .. } => "[list]".to_string(),
            HeapValue::Object { .. } => "{object}".to_string(),
            HeapValue::Function { .. } => "<function>".to_string(),
            HeapValue::Int(n) => n.to_string(),
            HeapValue::Float(n) => n.to_string(),
            HeapValue::Str(s) => s.clone(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            HeapValue::Int(_) => "int",
            HeapValue::Float(_) => "float",
            HeapValue::Bool(_) => "bool",
            HeapValue::Str(_) => "string",
            HeapValue::Null => "null",
            HeapValue::Function { .. } => "function",
            HeapValue::Object { .. } => "object",
            HeapValue::List { .. } => "list",
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            HeapValue::Int(n) => Some(Number::Int(*n)),
            HeapValue::Float(n) => Some(Number::Float(*n)),
            _ => None,
        }
    }

    pub fn as_index(&self) -> Option<i64> {
        match self {
            HeapValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

/// Numeric coercion helper: arithmetic promotes to `Float` if either operand
/// is a `Float`, otherwise stays `Int`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn to_heap_value(self) -> HeapValue {
        match self {
            Number::Int(n) => HeapValue::Int(n),
            Number::Float(n) => HeapValue::Float(n),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(n) => n,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(n) => n == 0,
            Number::Float(n) => n == 0.0,
        }
    }
}
