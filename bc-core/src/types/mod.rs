//! Core Type Definitions

pub mod common;
pub mod value;

pub use common::{AssetId, EntryId, Hash};
pub use value::{AssetAmount, ValueDestination, ValueSource};

/// Guarding program, shared with the VM
pub use bc_vm::Program;
