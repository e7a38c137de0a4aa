use serde::{Deserialize, Serialize};

use crate::canon::{entry_types, hash_typed, CanonWriter, ASSET_ID_TAG};
use crate::entries::{Entry, EntryBody};
use crate::error::{ResultExt, ValidationError, ValidationResult};
use crate::types::{AssetAmount, AssetId, EntryId, Hash, Program, ValueDestination};
use crate::validation::{check_destination, check_entry, ValidationState};

/// Creates new units of an asset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuance {
    pub body: IssuanceBody,
    pub witness: IssuanceWitness,
    pub ordinal: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceBody {
    /// Nonce, spend or issuance making this issuance unique
    pub anchor: EntryId,
    pub value: AssetAmount,
    pub data: Hash,
    pub ext_hash: Hash,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceWitness {
    pub destination: ValueDestination,
    pub asset_definition: AssetDefinition,
    pub arguments: Vec<Vec<u8>>,
}

/// Preimage of an asset id
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDefinition {
    pub initial_block_id: EntryId,
    pub issuance_program: Program,
    pub data: Hash,
}

impl AssetDefinition {
    pub fn new(initial_block_id: EntryId, issuance_program: Program, data: Hash) -> Self {
        Self {
            initial_block_id,
            issuance_program,
            data,
        }
    }

    pub fn asset_id(&self) -> AssetId {
        let mut w = CanonWriter::new();
        w.write_entry_id(&self.initial_block_id);
        w.write_program(&self.issuance_program);
        w.write_hash(&self.data);
        AssetId(hash_typed(ASSET_ID_TAG, "definition", w.as_bytes()))
    }
}

impl Issuance {
    pub fn new(anchor: EntryId, value: AssetAmount, data: Hash, ordinal: u64) -> Self {
        Self {
            body: IssuanceBody {
                anchor,
                value,
                data,
                ext_hash: Hash::zero(),
            },
            witness: IssuanceWitness {
                destination: ValueDestination::new(EntryId::zero(), value, 0),
                asset_definition: AssetDefinition::default(),
                arguments: Vec::new(),
            },
            ordinal,
        }
    }

    pub(crate) fn check_valid(&self, state: &ValidationState<'_>) -> ValidationResult<()> {
        let definition = &self.witness.asset_definition;
        state
            .verify_program(&definition.issuance_program, &self.witness.arguments)
            .context("checking issuance program")?;

        if definition.asset_id() != self.body.value.asset_id {
            return Err(ValidationError::MismatchedAssetId);
        }
        if definition.initial_block_id != state.initial_block_id {
            return Err(ValidationError::WrongBlockchain);
        }

        let window_ms = state.max_issuance_window_ms;
        if window_ms > 0 {
            let header = &state.tx().header().body;
            let unbounded = header.max_time_ms == 0;
            if unbounded || header.max_time_ms.saturating_sub(header.min_time_ms) > window_ms {
                return Err(ValidationError::IssuanceWindow { window_ms });
            }
        }

        match state.lookup(self.body.anchor)? {
            Entry::Nonce(nonce) => {
                if nonce.witness.anchored != state.current_entry_id {
                    return Err(ValidationError::MismatchedReference)
                        .context("checking issuance anchor");
                }
            }
            Entry::Spend(_) | Entry::Issuance(_) => {}
            other => {
                return Err(ValidationError::InvalidEntryType {
                    expected: "nonce, spend or issuance",
                    found: other.type_name(),
                })
                .context("checking issuance anchor");
            }
        }
        check_entry(state, self.body.anchor).context("checking issuance anchor")?;

        check_destination(&state.with_dest_position(0), &self.witness.destination)
            .context("checking issuance destination")?;

        state.check_ext_hash(&self.body.ext_hash, Self::TYPE)
    }
}

impl EntryBody for Issuance {
    const TYPE: &'static str = entry_types::ISSUANCE;

    fn write_body(&self, w: &mut CanonWriter) {
        w.write_entry_id(&self.body.anchor);
        w.write_asset_amount(&self.body.value);
        w.write_hash(&self.body.data);
        w.write_hash(&self.body.ext_hash);
    }
}
