//! Validation Engine
//!
//! Depth-first descent over the entry graph starting at the transaction
//! header. Each entry type's `check_valid` receives a [`ValidationState`]
//! by reference and hands copies to its children, so positional fields
//! never leak between sibling branches.
//!
//! Within one top-level call an entry is checked at most once: entries
//! are marked when first entered and later visits are skipped. This is
//! what terminates the Mux / Output back-references.

mod vm_context;

pub use vm_context::{sig_hash, BlockVmContext, TxVmContext};

use std::cell::RefCell;
use std::collections::HashSet;

use bc_vm::{Context, VmConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::entries::{BlockHeader, Entry, EntryBody};
use crate::error::{ResultExt, ValidationError, ValidationResult};
use crate::graph::{BlockEntries, TxEntries};
use crate::logging::{fields, operations, LogEvent};
use crate::merkle::transactions_root;
use crate::types::{EntryId, Hash, Program, ValueDestination, ValueSource};

/// Chain-level inputs to validation, fixed before a call starts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationContext {
    pub block_version: u64,
    pub initial_block_id: EntryId,
    pub vm_config: VmConfig,
    /// Zero disables the issuance window check
    pub max_issuance_window_ms: u64,
    /// Block time; zero outside block validation
    pub timestamp_ms: u64,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            block_version: 1,
            initial_block_id: EntryId::zero(),
            vm_config: VmConfig::default(),
            max_issuance_window_ms: 0,
            timestamp_ms: 0,
        }
    }
}

impl ValidationContext {
    pub fn new(block_version: u64, initial_block_id: EntryId) -> Self {
        Self {
            block_version,
            initial_block_id,
            ..Default::default()
        }
    }

    pub fn with_vm_config(mut self, vm_config: VmConfig) -> Self {
        self.vm_config = vm_config;
        self
    }

    pub fn with_issuance_window(mut self, max_issuance_window_ms: u64) -> Self {
        self.max_issuance_window_ms = max_issuance_window_ms;
        self
    }

    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }
}

/// Branch-local view threaded through the descent
#[derive(Clone, Copy)]
pub struct ValidationState<'a> {
    pub block_version: u64,
    pub initial_block_id: EntryId,
    pub current_entry_id: EntryId,
    /// Index of the source being checked in the consuming entry
    pub source_position: u64,
    /// Index of the destination being checked in the producing entry
    pub dest_position: u64,
    pub timestamp_ms: u64,
    pub max_issuance_window_ms: u64,
    pub vm_config: VmConfig,
    current_tx: &'a TxEntries,
    /// Earlier transactions of the enclosing block
    block_txs: &'a [TxEntries],
    visited: &'a RefCell<HashSet<EntryId>>,
}

impl<'a> ValidationState<'a> {
    fn new(
        ctx: &ValidationContext,
        current_tx: &'a TxEntries,
        block_txs: &'a [TxEntries],
        visited: &'a RefCell<HashSet<EntryId>>,
    ) -> Self {
        Self {
            block_version: ctx.block_version,
            initial_block_id: ctx.initial_block_id,
            current_entry_id: current_tx.id(),
            source_position: 0,
            dest_position: 0,
            timestamp_ms: ctx.timestamp_ms,
            max_issuance_window_ms: ctx.max_issuance_window_ms,
            vm_config: ctx.vm_config,
            current_tx,
            block_txs,
            visited,
        }
    }

    pub fn tx(&self) -> &'a TxEntries {
        self.current_tx
    }

    /// Resolve `id` in the current transaction, then in earlier
    /// transactions of the block
    pub fn lookup(&self, id: EntryId) -> ValidationResult<&'a Entry> {
        if let Some(entry) = self.current_tx.entry(&id) {
            return Ok(entry);
        }
        self.block_txs
            .iter()
            .find_map(|tx| tx.entry(&id))
            .ok_or(ValidationError::MissingEntry { id })
    }

    pub fn at_entry(&self, id: EntryId) -> Self {
        Self {
            current_entry_id: id,
            ..*self
        }
    }

    pub fn with_source_position(&self, source_position: u64) -> Self {
        Self {
            source_position,
            ..*self
        }
    }

    pub fn with_dest_position(&self, dest_position: u64) -> Self {
        Self {
            dest_position,
            ..*self
        }
    }

    /// Version-1 transactions leave extension hashes empty
    pub fn check_ext_hash(&self, ext_hash: &Hash, entry_type: &'static str) -> ValidationResult<()> {
        if self.current_tx.header().body.version == 1 && !ext_hash.is_zero() {
            return Err(ValidationError::NonemptyExtensionHash { entry_type });
        }
        Ok(())
    }

    /// Run `program` against the current entry
    pub fn verify_program(&self, program: &Program, args: &[Vec<u8>]) -> ValidationResult<()> {
        let view = TxVmContext::new(*self);
        bc_vm::verify(Context::Tx(&view), program, args, &self.vm_config)
            .map_err(ValidationError::ProgramVerification)
    }
}

impl std::fmt::Debug for ValidationState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationState")
            .field("tx", &self.current_tx.id())
            .field("entry", &self.current_entry_id)
            .field("source_position", &self.source_position)
            .field("dest_position", &self.dest_position)
            .finish()
    }
}

/// Validate the entry `id` and, through it, everything it reaches
pub fn check_entry(state: &ValidationState<'_>, id: EntryId) -> ValidationResult<()> {
    let first_visit = state.visited.borrow_mut().insert(id);
    if !first_visit {
        return Ok(());
    }

    let entry = state.lookup(id)?;
    let state = state.at_entry(id);
    trace!(
        entry_id = %id,
        entry_type = entry.type_name(),
        operation = operations::CHECK_ENTRY,
        "checking entry"
    );

    match entry {
        Entry::TxHeader(e) => e.check_valid(&state),
        Entry::Mux(e) => e.check_valid(&state),
        Entry::Issuance(e) => e.check_valid(&state),
        Entry::Spend(e) => e.check_valid(&state),
        Entry::Output(e) => e.check_valid(&state),
        Entry::Retirement(e) => e.check_valid(&state),
        Entry::Nonce(e) => e.check_valid(&state),
        Entry::TimeRange(e) => e.check_valid(&state),
        Entry::BlockHeader(_) => Err(ValidationError::InvalidEntryType {
            expected: "transaction entry",
            found: BlockHeader::TYPE,
        }),
    }
}

/// Check a value source of the current entry at `state.source_position`.
///
/// The producer is validated first, then its destination at
/// `src.position` must point back here with the same value.
pub fn check_source(state: &ValidationState<'_>, src: &ValueSource) -> ValidationResult<()> {
    check_entry(state, src.entry_ref)?;

    let dest = match state.lookup(src.entry_ref)? {
        Entry::Issuance(e) => single(&e.witness.destination, src.position)?,
        Entry::Spend(e) => single(&e.witness.destination, src.position)?,
        Entry::Mux(e) => indexed(e.destinations(), src.position)?,
        other => {
            return Err(ValidationError::InvalidEntryType {
                expected: "issuance, spend or mux",
                found: other.type_name(),
            })
        }
    };

    if dest.entry_ref != state.current_entry_id {
        return Err(ValidationError::MismatchedReference);
    }
    if dest.position != state.source_position {
        return Err(ValidationError::InvalidPosition {
            position: dest.position,
        });
    }
    if dest.value != src.value {
        return Err(ValidationError::MismatchedValue);
    }
    Ok(())
}

/// Check a value destination of the current entry at
/// `state.dest_position`. Mirror image of [`check_source`].
pub fn check_destination(state: &ValidationState<'_>, dest: &ValueDestination) -> ValidationResult<()> {
    check_entry(state, dest.entry_ref)?;

    let src = match state.lookup(dest.entry_ref)? {
        Entry::Output(e) => single(&e.body.source, dest.position)?,
        Entry::Retirement(e) => single(&e.body.source, dest.position)?,
        Entry::Mux(e) => indexed(&e.body.sources, dest.position)?,
        other => {
            return Err(ValidationError::InvalidEntryType {
                expected: "output, retirement or mux",
                found: other.type_name(),
            })
        }
    };

    if src.entry_ref != state.current_entry_id {
        return Err(ValidationError::MismatchedReference);
    }
    if src.position != state.dest_position {
        return Err(ValidationError::InvalidPosition {
            position: src.position,
        });
    }
    if src.value != dest.value {
        return Err(ValidationError::MismatchedValue);
    }
    Ok(())
}

fn single<T>(item: &T, position: u64) -> ValidationResult<&T> {
    if position != 0 {
        return Err(ValidationError::InvalidPosition { position });
    }
    Ok(item)
}

fn indexed<T>(items: &[T], position: u64) -> ValidationResult<&T> {
    usize::try_from(position)
        .ok()
        .and_then(|i| items.get(i))
        .ok_or(ValidationError::InvalidPosition { position })
}

/// Validate a standalone transaction
pub fn validate_tx(ctx: &ValidationContext, tx: &TxEntries) -> ValidationResult<()> {
    validate_tx_in_block(ctx, tx, &[])
}

fn validate_tx_in_block(
    ctx: &ValidationContext,
    tx: &TxEntries,
    block_txs: &[TxEntries],
) -> ValidationResult<()> {
    let tx_id = tx.id();
    debug!(
        tx_id = %tx_id,
        operation = operations::VALIDATE_TX,
        entries = tx.len(),
        "validating transaction"
    );

    let result = check_timeliness(ctx.timestamp_ms, tx).and_then(|()| {
        let visited = RefCell::new(HashSet::new());
        let state = ValidationState::new(ctx, tx, block_txs, &visited);
        check_entry(&state, tx_id)
    });

    if let Err(ref e) = result {
        warn!(
            tx_id = %tx_id,
            error_code = e.code(),
            error = %e,
            "transaction rejected"
        );
    }
    result
}

/// Block time must fall inside the transaction's time window
fn check_timeliness(timestamp_ms: u64, tx: &TxEntries) -> ValidationResult<()> {
    if timestamp_ms == 0 {
        return Ok(());
    }
    let header = &tx.header().body;
    let too_early = timestamp_ms < header.min_time_ms;
    let too_late = header.max_time_ms > 0 && timestamp_ms > header.max_time_ms;
    if too_early || too_late {
        return Err(ValidationError::UntimelyTransaction { timestamp_ms });
    }
    Ok(())
}

/// Validate a block against its predecessor.
///
/// `prev` is `None` only for the initial block, which must be at
/// height 1. Transactions are validated in block order and may spend
/// outputs of earlier transactions in the same block.
pub fn validate_block(
    ctx: &ValidationContext,
    block: &BlockEntries,
    prev: Option<&BlockHeader>,
) -> ValidationResult<()> {
    let block_id = block.id();
    debug!(
        block_id = %block_id,
        operation = operations::VALIDATE_BLOCK,
        height = block.header.body.height,
        transactions = block.transactions.len(),
        "validating block"
    );

    let result = check_block(ctx, block, prev);
    match result {
        Ok(()) => LogEvent::info("block accepted")
            .field(fields::BLOCK_ID, block_id.to_string())
            .field(fields::HEIGHT, block.header.body.height)
            .field(fields::COUNT, block.transactions.len())
            .emit(),
        Err(ref e) => warn!(
            block_id = %block_id,
            error_code = e.code(),
            error = %e,
            "block rejected"
        ),
    }
    result
}

fn check_block(
    ctx: &ValidationContext,
    block: &BlockEntries,
    prev: Option<&BlockHeader>,
) -> ValidationResult<()> {
    let header = &block.header.body;

    match prev {
        Some(prev) => {
            let prev_body = &prev.body;
            if header.version < prev_body.version {
                return Err(ValidationError::VersionRegression {
                    previous: prev_body.version,
                    current: header.version,
                });
            }
            let expected = prev_body.height.saturating_add(1);
            if header.height != expected {
                return Err(ValidationError::MisorderedBlockHeight {
                    expected,
                    actual: header.height,
                });
            }
            if header.previous_block_id != prev.id() {
                return Err(ValidationError::MismatchedBlock);
            }
            if header.timestamp_ms <= prev_body.timestamp_ms {
                return Err(ValidationError::MisorderedBlockTime);
            }

            let view = BlockVmContext::new(&block.header);
            let program = Program::new(prev_body.next_consensus_program.clone());
            bc_vm::verify(
                Context::Block(&view),
                &program,
                &block.header.witness.arguments,
                &ctx.vm_config,
            )
            .map_err(ValidationError::ProgramVerification)
            .context("checking block consensus program")?;
        }
        None => {
            if header.height != 1 {
                return Err(ValidationError::NoPrevBlock);
            }
        }
    }

    let tx_ctx = ValidationContext {
        block_version: header.version,
        timestamp_ms: header.timestamp_ms,
        ..*ctx
    };
    for (i, tx) in block.transactions.iter().enumerate() {
        validate_tx_in_block(&tx_ctx, tx, &block.transactions[..i])
            .with_context(|| format!("checking transaction {}", i))?;
    }

    if transactions_root(&block.tx_ids()) != header.transactions_root {
        return Err(ValidationError::MismatchedMerkleRoot);
    }

    if header.version == 1 && !header.ext_hash.is_zero() {
        return Err(ValidationError::NonemptyExtensionHash {
            entry_type: BlockHeader::TYPE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{find_mux, TxBuilder};
    use crate::entries::{AssetDefinition, Mux, Output, TxHeader};
    use crate::types::{AssetAmount, AssetId};
    use assert_matches::assert_matches;

    fn tx_with(entries: Vec<Entry>, results: Vec<EntryId>) -> TxEntries {
        TxEntries::new(TxHeader::new(1, results, Hash::zero(), 0, 0), entries)
    }

    #[test]
    fn test_state_copies_are_branch_local() {
        let tx = tx_with(Vec::new(), Vec::new());
        let visited = RefCell::new(HashSet::new());
        let state = ValidationState::new(&ValidationContext::default(), &tx, &[], &visited);

        let a = state.with_source_position(2);
        let b = a.with_dest_position(5);
        assert_eq!(state.source_position, 0);
        assert_eq!(a.dest_position, 0);
        assert_eq!((b.source_position, b.dest_position), (2, 5));
    }

    #[test]
    fn test_missing_result() {
        let missing = EntryId(Hash([4; 32]));
        let tx = tx_with(Vec::new(), vec![missing]);
        let err = validate_tx(&ValidationContext::default(), &tx).unwrap_err();
        assert_eq!(err.root_cause(), &ValidationError::MissingEntry { id: missing });
        assert_eq!(err.context_path(), vec!["checking result 0"]);
    }

    #[test]
    fn test_source_must_point_back() {
        // Output claims a mux source, but the mux has no destinations
        let asset = AssetId(Hash([1; 32]));
        let value = AssetAmount::new(asset, 5);
        let mux = Mux::new(Vec::new(), Program::trivial());
        let mux_id = mux.entry_id();
        let out = Output::new(ValueSource::new(mux_id, value, 0), Program::trivial(), Hash::zero(), 0);
        let out_id = out.entry_id();

        let tx = tx_with(vec![mux.into(), out.into()], vec![out_id]);
        let err = validate_tx(&ValidationContext::default(), &tx).unwrap_err();
        assert_eq!(err.root_cause(), &ValidationError::InvalidPosition { position: 0 });
    }

    #[test]
    fn test_untimely() {
        let tx = TxEntries::new(TxHeader::new(1, Vec::new(), Hash::zero(), 100, 200), Vec::new());
        assert!(check_timeliness(0, &tx).is_ok());
        assert!(check_timeliness(150, &tx).is_ok());
        assert_matches!(
            check_timeliness(99, &tx),
            Err(ValidationError::UntimelyTransaction { timestamp_ms: 99 })
        );
        assert_matches!(
            check_timeliness(201, &tx),
            Err(ValidationError::UntimelyTransaction { .. })
        );
    }

    #[test]
    fn test_block_header_not_a_tx_entry() {
        let block = BlockHeader::new(1, 1, EntryId::zero(), 1, Vec::new());
        let block_id = block.id();
        let tx = tx_with(vec![block.into()], Vec::new());
        let visited = RefCell::new(HashSet::new());
        let state = ValidationState::new(&ValidationContext::default(), &tx, &[], &visited);
        assert_matches!(
            check_entry(&state, block_id),
            Err(ValidationError::InvalidEntryType { found: "blockheader", .. })
        );
    }

    #[test]
    fn test_mux_and_nonce_extension_hash_in_v1() {
        let def = AssetDefinition::new(EntryId::zero(), Program::trivial(), Hash::zero());
        let tx = TxBuilder::new()
            .time_range(1, 2)
            .issue(def.clone(), 3, Vec::new())
            .output(AssetAmount::new(def.asset_id(), 3), Program::trivial(), Hash::zero())
            .build();
        let mux_id = find_mux(&tx).unwrap();
        let mut mux = match tx.entry(&mux_id) {
            Some(Entry::Mux(m)) => m.clone(),
            other => panic!("expected mux, got {:?}", other),
        };

        let visited = RefCell::new(HashSet::new());
        let state = ValidationState::new(&ValidationContext::default(), &tx, &[], &visited).at_entry(mux_id);
        assert!(mux.check_valid(&state).is_ok());

        mux.body.ext_hash = Hash([1; 32]);
        let visited = RefCell::new(HashSet::new());
        let state = ValidationState::new(&ValidationContext::default(), &tx, &[], &visited).at_entry(mux_id);
        assert_matches!(
            mux.check_valid(&state),
            Err(ValidationError::NonemptyExtensionHash { entry_type: "mux1" })
        );

        let (nonce_id, mut nonce) = tx
            .iter()
            .find_map(|(id, e)| match e {
                Entry::Nonce(n) => Some((*id, n.clone())),
                _ => None,
            })
            .unwrap();
        let visited = RefCell::new(HashSet::new());
        let state = ValidationState::new(&ValidationContext::default(), &tx, &[], &visited).at_entry(nonce_id);
        assert!(nonce.check_valid(&state).is_ok());
        nonce.body.ext_hash = Hash([1; 32]);
        assert_matches!(
            nonce.check_valid(&state),
            Err(ValidationError::NonemptyExtensionHash { entry_type: "nonce1" })
        );

        // Later versions may carry extensions
        let v2 = TxEntries::new(TxHeader::new(2, Vec::new(), Hash::zero(), 0, 0), Vec::new());
        let state = ValidationState::new(&ValidationContext::new(2, EntryId::zero()), &v2, &[], &visited);
        assert!(state.check_ext_hash(&Hash([1; 32]), Mux::TYPE).is_ok());
    }
}
