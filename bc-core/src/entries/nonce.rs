use serde::{Deserialize, Serialize};

use crate::canon::{entry_types, CanonWriter};
use crate::entries::{Entry, EntryBody};
use crate::error::{ResultExt, ValidationError, ValidationResult};
use crate::types::{EntryId, Hash, Program};
use crate::validation::ValidationState;

/// Time-bounded anchor distinguishing otherwise identical issuances
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nonce {
    pub body: NonceBody,
    pub witness: NonceWitness,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceBody {
    pub program: Program,
    pub time_range: EntryId,
    pub ext_hash: Hash,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceWitness {
    pub arguments: Vec<Vec<u8>>,
    /// Issuance using this nonce as its anchor
    pub anchored: EntryId,
}

impl Nonce {
    pub fn new(program: Program, time_range: EntryId) -> Self {
        Self {
            body: NonceBody {
                program,
                time_range,
                ext_hash: Hash::zero(),
            },
            witness: NonceWitness::default(),
        }
    }

    pub(crate) fn check_valid(&self, state: &ValidationState<'_>) -> ValidationResult<()> {
        state
            .verify_program(&self.body.program, &self.witness.arguments)
            .context("checking nonce program")?;

        // The referenced time range is read here but not validated as an entry.
        let time_range = match state.lookup(self.body.time_range)? {
            Entry::TimeRange(tr) => tr,
            other => {
                return Err(ValidationError::InvalidEntryType {
                    expected: TimeRange::TYPE,
                    found: other.type_name(),
                })
            }
        };
        if time_range.body.min_time_ms == 0 || time_range.body.max_time_ms == 0 {
            return Err(ValidationError::ZeroTimeRange);
        }

        state.check_ext_hash(&self.body.ext_hash, Self::TYPE)
    }
}

impl EntryBody for Nonce {
    const TYPE: &'static str = entry_types::NONCE;

    fn write_body(&self, w: &mut CanonWriter) {
        w.write_program(&self.body.program);
        w.write_entry_id(&self.body.time_range);
        w.write_hash(&self.body.ext_hash);
    }
}

/// Validity window
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub body: TimeRangeBody,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRangeBody {
    pub min_time_ms: u64,
    /// Zero means unbounded
    pub max_time_ms: u64,
    pub ext_hash: Hash,
}

impl TimeRange {
    pub fn new(min_time_ms: u64, max_time_ms: u64) -> Self {
        Self {
            body: TimeRangeBody {
                min_time_ms,
                max_time_ms,
                ext_hash: Hash::zero(),
            },
        }
    }

    /// Whether `[min_time_ms, max_time_ms]` lies inside this range
    pub fn contains(&self, min_time_ms: u64, max_time_ms: u64) -> bool {
        if self.body.min_time_ms > min_time_ms {
            return false;
        }
        if self.body.max_time_ms > 0 && (max_time_ms == 0 || max_time_ms > self.body.max_time_ms) {
            return false;
        }
        true
    }

    pub(crate) fn check_valid(&self, state: &ValidationState<'_>) -> ValidationResult<()> {
        let header = &state.tx().header().body;
        if !self.contains(header.min_time_ms, header.max_time_ms) {
            return Err(ValidationError::BadTimeRange);
        }
        state.check_ext_hash(&self.body.ext_hash, Self::TYPE)
    }
}

impl EntryBody for TimeRange {
    const TYPE: &'static str = entry_types::TIME_RANGE;

    fn write_body(&self, w: &mut CanonWriter) {
        w.write_varint(self.body.min_time_ms);
        w.write_varint(self.body.max_time_ms);
        w.write_hash(&self.body.ext_hash);
    }
}
