//! Pure heap allocator and lexical-scope environment chain (C2, C3).
//!
//! Every function here takes a `&VmState` and returns a freshly owned
//! `VmState` — no argument is ever mutated in place, which is what lets
//! `core-vm` build the per-instruction snapshot trail just by holding onto
//! the returned values.

pub mod environment;
pub mod heap;

pub use environment::EnvironmentAccessError;
pub use heap::HeapReadError;
