use serde::{Deserialize, Serialize};

use crate::canon::{entry_types, CanonWriter};
use crate::entries::{Entry, EntryBody};
use crate::error::{ResultExt, ValidationError, ValidationResult};
use crate::types::{EntryId, Hash};
use crate::validation::{check_entry, ValidationState};

/// Root of a transaction graph
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHeader {
    pub body: TxHeaderBody,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHeaderBody {
    pub version: u64,
    /// Outputs and retirements
    pub results: Vec<EntryId>,
    pub data: Hash,
    pub min_time_ms: u64,
    /// Zero means unbounded
    pub max_time_ms: u64,
    pub ext_hash: Hash,
}

impl TxHeader {
    pub fn new(
        version: u64,
        results: Vec<EntryId>,
        data: Hash,
        min_time_ms: u64,
        max_time_ms: u64,
    ) -> Self {
        Self {
            body: TxHeaderBody {
                version,
                results,
                data,
                min_time_ms,
                max_time_ms,
                ext_hash: Hash::zero(),
            },
        }
    }

    pub(crate) fn check_valid(&self, state: &ValidationState<'_>) -> ValidationResult<()> {
        let version = self.body.version;
        if version == 0 || (state.block_version == 1 && version != 1) {
            return Err(ValidationError::TxVersion { version });
        }

        if version == 1 {
            if self.body.results.is_empty() {
                return Err(ValidationError::EmptyResults);
            }
            if self.body.max_time_ms > 0 && self.body.min_time_ms > self.body.max_time_ms {
                return Err(ValidationError::BadTimeRange);
            }
            if !self.body.ext_hash.is_zero() {
                return Err(ValidationError::NonemptyExtensionHash {
                    entry_type: Self::TYPE,
                });
            }
        }

        for (i, result) in self.body.results.iter().enumerate() {
            let entry = state
                .lookup(*result)
                .with_context(|| format!("checking result {}", i))?;
            match entry {
                Entry::Output(_) | Entry::Retirement(_) => {}
                other => {
                    return Err(ValidationError::InvalidEntryType {
                        expected: "output or retirement",
                        found: other.type_name(),
                    })
                    .with_context(|| format!("checking result {}", i))
                }
            }
            check_entry(state, *result).with_context(|| format!("checking result {}", i))?;
        }

        Ok(())
    }
}

impl EntryBody for TxHeader {
    const TYPE: &'static str = entry_types::TX_HEADER;

    fn write_body(&self, w: &mut CanonWriter) {
        w.write_varint(self.body.version);
        w.write_list(&self.body.results, |w, id| {
            w.write_entry_id(id);
        });
        w.write_hash(&self.body.data);
        w.write_varint(self.body.min_time_ms);
        w.write_varint(self.body.max_time_ms);
        w.write_hash(&self.body.ext_hash);
    }
}
