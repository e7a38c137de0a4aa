//! Script Virtual Machine
//!
//! A stack machine that runs the programs guarding transaction graph
//! entries and blocks. Programs execute under a cost budget; every
//! instruction charges its cost before it runs and execution stops with
//! [`VmError::BudgetExceeded`] once the budget is gone.
//!
//! # Contexts
//!
//! | Context | Available opcodes |
//! |---------|-------------------|
//! | [`Context::Standalone`] | data, stack, numeric, crypto |
//! | [`Context::Tx`] | + CHECKOUTPUT, ASSET, AMOUNT, PROGRAM, MINTIME, MAXTIME, REFDATAHASH, TXREFDATAHASH, INDEX, OUTPUTID, NONCE, TXSIGHASH |
//! | [`Context::Block`] | + NEXTPROGRAM, BLOCKTIME, BLOCKHASH |
//!
//! The entry graph is reached only through the [`TxView`] and
//! [`BlockView`] traits, so this crate has no knowledge of entry types.
//!
//! # Example
//!
//! ```rust
//! use bc_vm::{verify, Builder, Context, Op, Program, VmConfig};
//!
//! let code = Builder::new().add_int64(2).add_int64(3).add_op(Op::Add)
//!     .add_int64(5).add_op(Op::NumEqual).build();
//! assert!(verify(Context::Standalone, &Program::new(code), &[], &VmConfig::default()).is_ok());
//! ```

pub mod builder;
pub mod context;
pub mod disasm;
pub mod error;
pub mod numeric;
pub mod ops;
pub mod vm;

mod arith;
mod control;
mod crypto;
mod introspection;
mod stack;

pub use builder::Builder;
pub use context::{BlockView, Context, MuxDestination, TxView};
pub use disasm::disassemble;
pub use error::{VmError, VmResult};
pub use numeric::{as_bool, as_int64, bool_bytes, int64_bytes};
pub use ops::{parse_op, Instruction, Op};
pub use vm::{verify, Program, VirtualMachine, VmConfig, DEFAULT_RUN_LIMIT, VM_VERSION};

pub use crypto::{MIN_HASH_COST, SIG_CHECK_COST};
