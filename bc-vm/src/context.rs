//! Execution contexts
//!
//! A program runs either on behalf of a transaction entry or a block.
//! Context opcodes match on the active [`Context`] and fail with
//! [`VmError::Context`](crate::VmError::Context) on a mismatch.

use crate::error::VmResult;

/// Shape of a Mux destination as seen by CHECKOUTPUT
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MuxDestination {
    /// Destination is a retirement rather than an output
    pub is_retirement: bool,
    /// Asset routed to the destination
    pub asset_id: [u8; 32],
    /// Amount routed to the destination
    pub amount: u64,
    /// Reference-data digest of the destination entry
    pub ref_data_hash: [u8; 32],
    /// VM version of the destination's control program (0 for retirements)
    pub vm_version: u64,
    /// Control program bytes (empty for retirements)
    pub code: Vec<u8>,
}

/// Read view of the transaction entry whose program is running
pub trait TxView {
    /// Transaction header version
    fn tx_version(&self) -> u64;

    /// Position of the entry among the transaction inputs
    fn input_index(&self) -> VmResult<u32>;

    /// Asset flowing out of the entry
    fn asset_id(&self) -> VmResult<[u8; 32]>;

    /// Amount flowing out of the entry
    fn amount(&self) -> VmResult<u64>;

    /// Entry-level reference-data digest
    fn ref_data_hash(&self) -> VmResult<[u8; 32]>;

    /// Transaction-level reference-data digest
    fn tx_ref_data_hash(&self) -> [u8; 32];

    /// Transaction minimum time (ms)
    fn min_time_ms(&self) -> u64;

    /// Transaction maximum time (ms), zero when unbounded
    fn max_time_ms(&self) -> u64;

    /// ID of the output being spent
    fn spent_output_id(&self) -> VmResult<[u8; 32]>;

    /// ID of the issuance anchor
    fn anchor_id(&self) -> VmResult<[u8; 32]>;

    /// Whether the entry's value flows into a Mux
    fn dest_is_mux(&self) -> bool;

    /// Destination `index` of the Mux the entry's value flows into
    fn mux_destination(&self, index: u32) -> VmResult<MuxDestination>;

    /// Signature hash binding the entry to the transaction
    fn sig_hash(&self) -> [u8; 32];
}

/// Read view of the block whose consensus program is running
pub trait BlockView {
    /// Consensus program the block commits to for its successor
    fn next_consensus_program(&self) -> &[u8];

    /// Block timestamp (ms)
    fn timestamp_ms(&self) -> u64;

    /// Block header ID
    fn block_hash(&self) -> [u8; 32];
}

/// Active execution context
#[derive(Clone, Copy)]
pub enum Context<'a> {
    /// No introspection available
    Standalone,
    /// Verifying a transaction entry's guarding program
    Tx(&'a dyn TxView),
    /// Verifying a block's consensus program
    Block(&'a dyn BlockView),
}

impl<'a> Context<'a> {
    /// Transaction view, if running in transaction context
    pub fn tx(&self) -> Option<&'a dyn TxView> {
        match self {
            Context::Tx(view) => Some(*view),
            _ => None,
        }
    }

    /// Block view, if running in block context
    pub fn block(&self) -> Option<&'a dyn BlockView> {
        match self {
            Context::Block(view) => Some(*view),
            _ => None,
        }
    }

    /// Whether unassigned opcodes are rejected
    pub fn expansion_reserved(&self) -> bool {
        match self {
            Context::Standalone => false,
            Context::Tx(view) => view.tx_version() == 1,
            Context::Block(_) => true,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Context::Standalone => "standalone",
            Context::Tx(_) => "tx",
            Context::Block(_) => "block",
        }
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Context({})", self.name())
    }
}
