//! Entry Graph Model
//!
//! Every entry has a body, which is hashed into its [`EntryId`], and
//! optionally a witness, which is not. Cross references are always
//! [`EntryId`]s resolved through a [`TxEntries`](crate::graph::TxEntries)
//! arena, so the graph never holds owning links.
//!
//! | Variant | Type string | Ordinal |
//! |---------|-------------|---------|
//! | [`TxHeader`] | `txheader` | -1 |
//! | [`Mux`] | `mux1` | -1 |
//! | [`Issuance`] | `issuance1` | yes |
//! | [`Spend`] | `spend1` | yes |
//! | [`Output`] | `output1` | yes |
//! | [`Retirement`] | `retirement1` | yes |
//! | [`Nonce`] | `nonce1` | -1 |
//! | [`TimeRange`] | `timerange1` | -1 |
//! | [`BlockHeader`] | `blockheader` | -1 |

mod block;
mod header;
mod issuance;
mod mux;
mod nonce;
mod output;
mod spend;

pub use block::{BlockHeader, BlockHeaderBody, BlockHeaderWitness};
pub use header::{TxHeader, TxHeaderBody};
pub use issuance::{AssetDefinition, Issuance, IssuanceBody, IssuanceWitness};
pub use mux::{Mux, MuxBody, MuxWitness};
pub use nonce::{Nonce, NonceBody, NonceWitness, TimeRange, TimeRangeBody};
pub use output::{Output, OutputBody, Retirement, RetirementBody};
pub use spend::{Spend, SpendBody, SpendWitness};

use serde::{Deserialize, Serialize};

use crate::canon::{self, CanonWriter};
use crate::types::EntryId;

/// Ordinal of entries without one
pub const NO_ORDINAL: i64 = -1;

/// Content-hashed part of an entry
pub trait EntryBody {
    /// Stable type string, part of the id preimage
    const TYPE: &'static str;

    /// Append the canonical body encoding
    fn write_body(&self, w: &mut CanonWriter);

    fn body_bytes(&self) -> Vec<u8> {
        let mut w = CanonWriter::new();
        self.write_body(&mut w);
        w.finish()
    }

    fn entry_id(&self) -> EntryId {
        canon::entry_id(Self::TYPE, &self.body_bytes())
    }
}

/// Any entry of a transaction or block graph
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entry {
    TxHeader(TxHeader),
    Mux(Mux),
    Issuance(Issuance),
    Spend(Spend),
    Output(Output),
    Retirement(Retirement),
    Nonce(Nonce),
    TimeRange(TimeRange),
    BlockHeader(BlockHeader),
}

impl Entry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Entry::TxHeader(_) => TxHeader::TYPE,
            Entry::Mux(_) => Mux::TYPE,
            Entry::Issuance(_) => Issuance::TYPE,
            Entry::Spend(_) => Spend::TYPE,
            Entry::Output(_) => Output::TYPE,
            Entry::Retirement(_) => Retirement::TYPE,
            Entry::Nonce(_) => Nonce::TYPE,
            Entry::TimeRange(_) => TimeRange::TYPE,
            Entry::BlockHeader(_) => BlockHeader::TYPE,
        }
    }

    /// Position among siblings, or [`NO_ORDINAL`]
    pub fn ordinal(&self) -> i64 {
        let ordinal = match self {
            Entry::Issuance(e) => e.ordinal,
            Entry::Spend(e) => e.ordinal,
            Entry::Output(e) => e.ordinal,
            Entry::Retirement(e) => e.ordinal,
            _ => return NO_ORDINAL,
        };
        i64::try_from(ordinal).unwrap_or(i64::MAX)
    }

    pub fn body_bytes(&self) -> Vec<u8> {
        match self {
            Entry::TxHeader(e) => e.body_bytes(),
            Entry::Mux(e) => e.body_bytes(),
            Entry::Issuance(e) => e.body_bytes(),
            Entry::Spend(e) => e.body_bytes(),
            Entry::Output(e) => e.body_bytes(),
            Entry::Retirement(e) => e.body_bytes(),
            Entry::Nonce(e) => e.body_bytes(),
            Entry::TimeRange(e) => e.body_bytes(),
            Entry::BlockHeader(e) => e.body_bytes(),
        }
    }

    /// Content-addressed id; independent of witness data
    pub fn id(&self) -> EntryId {
        canon::entry_id(self.type_name(), &self.body_bytes())
    }
}

macro_rules! impl_from_entry {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Entry {
                fn from(e: $variant) -> Self {
                    Entry::$variant(e)
                }
            }
        )*
    };
}

impl_from_entry!(TxHeader, Mux, Issuance, Spend, Output, Retirement, Nonce, TimeRange, BlockHeader);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssetAmount, AssetId, Hash, Program, ValueSource};

    fn sample_entries() -> Vec<Entry> {
        let program = Program::new(vec![1]);
        let mut mux = Mux::new(Vec::new(), program.clone());
        mux.body.sources.push(ValueSource::new(
            EntryId::zero(),
            AssetAmount::default(),
            1,
        ));
        vec![
            Issuance::new(EntryId::zero(), AssetAmount::default(), Hash::zero(), 0).into(),
            TxHeader::new(1, Vec::new(), Hash::zero(), 1_000, 2_000).into(),
            mux.into(),
            Nonce::new(program.clone(), EntryId::zero()).into(),
            Output::new(
                ValueSource::new(EntryId::zero(), AssetAmount::default(), 0),
                program.clone(),
                Hash::zero(),
                0,
            )
            .into(),
            Retirement::new(
                ValueSource::new(EntryId::zero(), AssetAmount::default(), 0),
                Hash::zero(),
                1,
            )
            .into(),
            Spend::new(EntryId::zero(), Hash::zero(), 0).into(),
            TimeRange::new(1, 2).into(),
        ]
    }

    #[test]
    fn test_ids_are_distinct_and_stable() {
        let entries = sample_entries();
        let ids: Vec<EntryId> = entries.iter().map(Entry::id).collect();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
        let again: Vec<EntryId> = entries.iter().map(Entry::id).collect();
        assert_eq!(ids, again);
    }

    #[test]
    fn test_witness_does_not_change_id() {
        let mut mux = Mux::new(Vec::new(), Program::trivial());
        let before = mux.entry_id();
        mux.witness.arguments.push(vec![1, 2, 3]);
        mux.witness.destinations.push(crate::types::ValueDestination::new(
            EntryId::zero(),
            AssetAmount::new(AssetId(Hash([9; 32])), 1),
            0,
        ));
        assert_eq!(mux.entry_id(), before);
        assert_eq!(Entry::from(mux).id(), before);
    }

    #[test]
    fn test_ordinals() {
        let entries = sample_entries();
        assert_eq!(entries[0].ordinal(), 0);
        assert_eq!(entries[1].ordinal(), NO_ORDINAL);
        assert_eq!(entries[2].ordinal(), NO_ORDINAL);
        assert_eq!(entries[5].ordinal(), 1);
    }

    #[test]
    fn test_type_names() {
        let names: Vec<&str> = sample_entries().iter().map(Entry::type_name).collect();
        assert_eq!(
            names,
            vec![
                "issuance1",
                "txheader",
                "mux1",
                "nonce1",
                "output1",
                "retirement1",
                "spend1",
                "timerange1"
            ]
        );
    }
}
