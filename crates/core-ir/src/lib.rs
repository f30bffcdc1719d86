//! Error taxonomy, IR instruction set, value representations, and the
//! complete serialisable VM state. Everything in this crate is plain,
//! immutable data — no behaviour lives here beyond small pure constructors
//! and formatting helpers (`core-heap`/`core-vm` own the transition logic).

pub mod address;
pub mod error;
pub mod instruction;
pub mod state;
pub mod value;

pub use address::{AddressParseError, EnvironmentAddress, HeapAddress};
pub use error::{VmError, VmErrorKind};
pub use instruction::{IrInstruction, SourceMap};
pub use state::{EnvironmentRecord, StackFrame, VmState};
pub use value::{ConstValue, HeapValue, Number};
