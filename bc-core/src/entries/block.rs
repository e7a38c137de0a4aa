use serde::{Deserialize, Serialize};

use crate::canon::{entry_types, CanonWriter};
use crate::entries::EntryBody;
use crate::types::{EntryId, Hash};

/// Header committing to a block's transactions and its successor's
/// consensus program
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub body: BlockHeaderBody,
    pub witness: BlockHeaderWitness,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeaderBody {
    pub version: u64,
    pub height: u64,
    pub previous_block_id: EntryId,
    pub timestamp_ms: u64,
    /// Merkle root over transaction ids
    pub transactions_root: Hash,
    pub assets_root: Hash,
    /// Program the next block's witness must satisfy
    #[serde(with = "hex_code")]
    pub next_consensus_program: Vec<u8>,
    pub ext_hash: Hash,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeaderWitness {
    pub arguments: Vec<Vec<u8>>,
}

impl BlockHeader {
    pub fn new(
        version: u64,
        height: u64,
        previous_block_id: EntryId,
        timestamp_ms: u64,
        next_consensus_program: Vec<u8>,
    ) -> Self {
        Self {
            body: BlockHeaderBody {
                version,
                height,
                previous_block_id,
                timestamp_ms,
                next_consensus_program,
                ..Default::default()
            },
            witness: BlockHeaderWitness::default(),
        }
    }

    pub fn id(&self) -> EntryId {
        self.entry_id()
    }
}

impl EntryBody for BlockHeader {
    const TYPE: &'static str = entry_types::BLOCK_HEADER;

    fn write_body(&self, w: &mut CanonWriter) {
        w.write_varint(self.body.version);
        w.write_varint(self.body.height);
        w.write_entry_id(&self.body.previous_block_id);
        w.write_varint(self.body.timestamp_ms);
        w.write_hash(&self.body.transactions_root);
        w.write_hash(&self.body.assets_root);
        w.write_varstr(&self.body.next_consensus_program);
        w.write_hash(&self.body.ext_hash);
    }
}

mod hex_code {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
