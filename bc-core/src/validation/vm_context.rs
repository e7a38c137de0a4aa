//! Entry graph views handed to the VM

use bc_vm::{BlockView, MuxDestination, TxView, VmError, VmResult};
use sha2::{Digest, Sha256};

use super::ValidationState;
use crate::canon::SIG_HASH_TAG;
use crate::entries::{BlockHeader, Entry, Mux, Output};
use crate::types::{AssetAmount, EntryId, Hash, ValueDestination};

/// Message signed by a program guarding `entry_id` in transaction `tx_id`:
/// `SHA-256("sighash:" || entry id || tx id)`
pub fn sig_hash(entry_id: &EntryId, tx_id: &EntryId) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(SIG_HASH_TAG.as_bytes());
    hasher.update(b":");
    hasher.update(entry_id.as_bytes());
    hasher.update(tx_id.as_bytes());
    Hash(hasher.finalize().into())
}

/// Transaction view of the entry whose program is running
pub struct TxVmContext<'a> {
    state: ValidationState<'a>,
}

impl<'a> TxVmContext<'a> {
    pub fn new(state: ValidationState<'a>) -> Self {
        Self { state }
    }

    fn current(&self) -> VmResult<&'a Entry> {
        self.state
            .lookup(self.state.current_entry_id)
            .map_err(|_| VmError::Context)
    }

    /// Output consumed by the current spend
    fn spent_output(&self, spent: EntryId) -> VmResult<&'a Output> {
        match self.state.lookup(spent) {
            Ok(Entry::Output(output)) => Ok(output),
            _ => Err(VmError::Context),
        }
    }

    /// Value and reference data flowing out of an issuance or spend
    fn input_value(&self) -> VmResult<(AssetAmount, Hash)> {
        match self.current()? {
            Entry::Issuance(e) => Ok((e.body.value, e.body.data)),
            Entry::Spend(e) => {
                let output = self.spent_output(e.body.spent_output)?;
                Ok((output.body.source.value, output.body.data))
            }
            _ => Err(VmError::Context),
        }
    }

    fn destination(&self) -> Option<&'a ValueDestination> {
        match self.current().ok()? {
            Entry::Issuance(e) => Some(&e.witness.destination),
            Entry::Spend(e) => Some(&e.witness.destination),
            _ => None,
        }
    }

    fn destination_mux(&self) -> Option<&'a Mux> {
        let dest = self.destination()?;
        match self.state.lookup(dest.entry_ref).ok()? {
            Entry::Mux(mux) => Some(mux),
            _ => None,
        }
    }
}

impl TxView for TxVmContext<'_> {
    fn tx_version(&self) -> u64 {
        self.state.tx().header().body.version
    }

    fn input_index(&self) -> VmResult<u32> {
        self.state
            .tx()
            .input_index(&self.state.current_entry_id)
            .and_then(|i| u32::try_from(i).ok())
            .ok_or(VmError::Context)
    }

    fn asset_id(&self) -> VmResult<[u8; 32]> {
        self.input_value().map(|(value, _)| value.asset_id.0 .0)
    }

    fn amount(&self) -> VmResult<u64> {
        self.input_value().map(|(value, _)| value.amount)
    }

    fn ref_data_hash(&self) -> VmResult<[u8; 32]> {
        self.input_value().map(|(_, data)| data.0)
    }

    fn tx_ref_data_hash(&self) -> [u8; 32] {
        self.state.tx().header().body.data.0
    }

    fn min_time_ms(&self) -> u64 {
        self.state.tx().header().body.min_time_ms
    }

    fn max_time_ms(&self) -> u64 {
        self.state.tx().header().body.max_time_ms
    }

    fn spent_output_id(&self) -> VmResult<[u8; 32]> {
        match self.current()? {
            Entry::Spend(e) => Ok(*e.body.spent_output.as_bytes()),
            _ => Err(VmError::Context),
        }
    }

    fn anchor_id(&self) -> VmResult<[u8; 32]> {
        match self.current()? {
            Entry::Issuance(e) => Ok(*e.body.anchor.as_bytes()),
            _ => Err(VmError::Context),
        }
    }

    fn dest_is_mux(&self) -> bool {
        self.destination_mux().is_some()
    }

    fn mux_destination(&self, index: u32) -> VmResult<MuxDestination> {
        let mux = self.destination_mux().ok_or(VmError::Context)?;
        let dest = usize::try_from(index)
            .ok()
            .and_then(|i| mux.destinations().get(i))
            .ok_or(VmError::NoSuchDestination { index })?;

        match self.state.lookup(dest.entry_ref) {
            Ok(Entry::Output(output)) => Ok(MuxDestination {
                is_retirement: false,
                asset_id: dest.value.asset_id.0 .0,
                amount: dest.value.amount,
                ref_data_hash: output.body.data.0,
                vm_version: output.body.control_program.vm_version,
                code: output.body.control_program.code.clone(),
            }),
            Ok(Entry::Retirement(retirement)) => Ok(MuxDestination {
                is_retirement: true,
                asset_id: dest.value.asset_id.0 .0,
                amount: dest.value.amount,
                ref_data_hash: retirement.body.data.0,
                vm_version: 0,
                code: Vec::new(),
            }),
            _ => Err(VmError::Execution(format!(
                "mux destination {} is not an output or retirement",
                index
            ))),
        }
    }

    fn sig_hash(&self) -> [u8; 32] {
        sig_hash(&self.state.current_entry_id, &self.state.tx().id()).0
    }
}

/// Block view for consensus programs
pub struct BlockVmContext<'a> {
    header: &'a BlockHeader,
    header_id: EntryId,
}

impl<'a> BlockVmContext<'a> {
    pub fn new(header: &'a BlockHeader) -> Self {
        Self {
            header,
            header_id: header.id(),
        }
    }
}

impl BlockView for BlockVmContext<'_> {
    fn next_consensus_program(&self) -> &[u8] {
        &self.header.body.next_consensus_program
    }

    fn timestamp_ms(&self) -> u64 {
        self.header.body.timestamp_ms
    }

    fn block_hash(&self) -> [u8; 32] {
        *self.header_id.as_bytes()
    }
}
