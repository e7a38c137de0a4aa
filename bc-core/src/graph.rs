//! Entry arenas
//!
//! A transaction is a set of entries keyed by [`EntryId`]. All graph
//! edges are ids resolved through the arena; nothing holds a pointer
//! to another entry.

use std::collections::HashMap;

use crate::entries::{BlockHeader, Entry, TxHeader};
use crate::error::{ValidationError, ValidationResult};
use crate::types::EntryId;

/// All entries of one transaction, plus any prior outputs it spends
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxEntries {
    header: TxHeader,
    header_id: EntryId,
    entries: HashMap<EntryId, Entry>,
    /// Issuances and spends in ordinal order
    inputs: Vec<EntryId>,
}

impl TxEntries {
    /// Build an arena rooted at `header`. The header is stored in the
    /// arena too, so it resolves like any other entry.
    pub fn new(header: TxHeader, entries: impl IntoIterator<Item = Entry>) -> Self {
        let header_id = Entry::TxHeader(header.clone()).id();
        let mut tx = Self {
            header: header.clone(),
            header_id,
            entries: HashMap::new(),
            inputs: Vec::new(),
        };
        tx.entries.insert(header_id, Entry::TxHeader(header));
        for entry in entries {
            tx.insert(entry);
        }
        tx
    }

    /// Add an entry, returning its id. Re-inserting an entry with the
    /// same id replaces its witness.
    pub fn insert(&mut self, entry: Entry) -> EntryId {
        let id = entry.id();
        let is_input = matches!(entry, Entry::Issuance(_) | Entry::Spend(_));
        let ordinal = entry.ordinal();
        if self.entries.insert(id, entry).is_none() && is_input {
            let pos = self
                .inputs
                .iter()
                .position(|other| {
                    self.entries
                        .get(other)
                        .map(|e| e.ordinal() > ordinal)
                        .unwrap_or(false)
                })
                .unwrap_or(self.inputs.len());
            self.inputs.insert(pos, id);
        }
        id
    }

    /// Transaction id: the id of its header
    pub fn id(&self) -> EntryId {
        self.header_id
    }

    pub fn header(&self) -> &TxHeader {
        &self.header
    }

    pub fn entry(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.get(id)
    }

    /// Resolve a reference, failing with [`ValidationError::MissingEntry`]
    pub fn lookup(&self, id: &EntryId) -> ValidationResult<&Entry> {
        self.entry(id)
            .ok_or(ValidationError::MissingEntry { id: *id })
    }

    /// Replace the witness arguments of entry `id`. Arguments are
    /// witness data, so ids are unaffected. Returns false if the entry
    /// is missing or takes no arguments.
    pub fn set_arguments(&mut self, id: &EntryId, arguments: Vec<Vec<u8>>) -> bool {
        let slot = match self.entries.get_mut(id) {
            Some(Entry::Mux(e)) => &mut e.witness.arguments,
            Some(Entry::Issuance(e)) => &mut e.witness.arguments,
            Some(Entry::Spend(e)) => &mut e.witness.arguments,
            Some(Entry::Nonce(e)) => &mut e.witness.arguments,
            _ => return false,
        };
        *slot = arguments;
        true
    }

    pub fn inputs(&self) -> &[EntryId] {
        &self.inputs
    }

    /// Position of `id` among the inputs
    pub fn input_index(&self, id: &EntryId) -> Option<usize> {
        self.inputs.iter().position(|input| input == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntryId, &Entry)> {
        self.entries.iter()
    }
}

/// A block header and its transactions, in block order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockEntries {
    pub header: BlockHeader,
    pub transactions: Vec<TxEntries>,
}

impl BlockEntries {
    pub fn new(header: BlockHeader, transactions: Vec<TxEntries>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    pub fn id(&self) -> EntryId {
        self.header.id()
    }

    pub fn tx_ids(&self) -> Vec<EntryId> {
        self.transactions.iter().map(TxEntries::id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::{Issuance, Spend};
    use crate::types::{AssetAmount, Hash};
    use assert_matches::assert_matches;

    fn header() -> TxHeader {
        TxHeader::new(1, Vec::new(), Hash::zero(), 0, 0)
    }

    #[test]
    fn test_header_resolves() {
        let tx = TxEntries::new(header(), Vec::new());
        assert_eq!(tx.len(), 1);
        assert_matches!(tx.lookup(&tx.id()), Ok(Entry::TxHeader(_)));
    }

    #[test]
    fn test_missing_entry() {
        let tx = TxEntries::new(header(), Vec::new());
        let missing = EntryId(Hash([3; 32]));
        assert_eq!(
            tx.lookup(&missing).unwrap_err(),
            ValidationError::MissingEntry { id: missing }
        );
    }

    #[test]
    fn test_inputs_sorted_by_ordinal() {
        let spend: Entry = Spend::new(EntryId(Hash([1; 32])), Hash::zero(), 2).into();
        let iss: Entry = Issuance::new(EntryId::zero(), AssetAmount::default(), Hash::zero(), 0).into();
        let iss2: Entry = Issuance::new(EntryId::zero(), AssetAmount::default(), Hash([2; 32]), 1).into();
        let (a, b, c) = (spend.id(), iss.id(), iss2.id());

        let tx = TxEntries::new(header(), vec![spend, iss, iss2]);
        assert_eq!(tx.inputs(), &[b, c, a]);
        assert_eq!(tx.input_index(&a), Some(2));
        assert_eq!(tx.input_index(&tx.id()), None);
    }
}
