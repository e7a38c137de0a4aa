//! Domain separation tags

/// Prefix of every entry id preimage
pub const ENTRY_ID_TAG: &str = "entryid";

/// Prefix of asset id preimages
pub const ASSET_ID_TAG: &str = "assetid";

/// Prefix of signature hash preimages
pub const SIG_HASH_TAG: &str = "sighash";

/// Merkle leaf prefix byte
pub const MERKLE_LEAF_PREFIX: u8 = 0x00;

/// Merkle interior node prefix byte
pub const MERKLE_NODE_PREFIX: u8 = 0x01;

/// Entry type strings, part of the entry id preimage
pub mod entry_types {
    pub const TX_HEADER: &str = "txheader";
    pub const MUX: &str = "mux1";
    pub const ISSUANCE: &str = "issuance1";
    pub const SPEND: &str = "spend1";
    pub const OUTPUT: &str = "output1";
    pub const RETIREMENT: &str = "retirement1";
    pub const NONCE: &str = "nonce1";
    pub const TIME_RANGE: &str = "timerange1";
    pub const BLOCK_HEADER: &str = "blockheader";
}
