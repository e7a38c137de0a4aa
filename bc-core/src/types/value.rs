//! Value edges of the entry graph

use serde::{Deserialize, Serialize};

use super::common::{AssetId, EntryId};

/// A quantity of one asset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AssetAmount {
    pub asset_id: AssetId,
    pub amount: u64,
}

impl AssetAmount {
    pub fn new(asset_id: AssetId, amount: u64) -> Self {
        Self { asset_id, amount }
    }
}

/// Value flowing out of `entry_ref` at destination index `position`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueSource {
    pub entry_ref: EntryId,
    pub value: AssetAmount,
    pub position: u64,
}

impl ValueSource {
    pub fn new(entry_ref: EntryId, value: AssetAmount, position: u64) -> Self {
        Self {
            entry_ref,
            value,
            position,
        }
    }
}

/// Value flowing into `entry_ref` at source index `position`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueDestination {
    pub entry_ref: EntryId,
    pub value: AssetAmount,
    pub position: u64,
}

impl ValueDestination {
    pub fn new(entry_ref: EntryId, value: AssetAmount, position: u64) -> Self {
        Self {
            entry_ref,
            value,
            position,
        }
    }
}
