use serde::{Deserialize, Serialize};

use crate::canon::{entry_types, CanonWriter};
use crate::entries::{Entry, EntryBody};
use crate::error::{ResultExt, ValidationError, ValidationResult};
use crate::types::{AssetAmount, EntryId, Hash, ValueDestination};
use crate::validation::{check_destination, ValidationState};

/// Consumes an output of an earlier transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spend {
    pub body: SpendBody,
    pub witness: SpendWitness,
    pub ordinal: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendBody {
    pub spent_output: EntryId,
    pub data: Hash,
    pub ext_hash: Hash,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendWitness {
    pub destination: ValueDestination,
    pub arguments: Vec<Vec<u8>>,
}

impl Spend {
    pub fn new(spent_output: EntryId, data: Hash, ordinal: u64) -> Self {
        Self {
            body: SpendBody {
                spent_output,
                data,
                ext_hash: Hash::zero(),
            },
            witness: SpendWitness {
                destination: ValueDestination::new(EntryId::zero(), AssetAmount::default(), 0),
                arguments: Vec::new(),
            },
            ordinal,
        }
    }

    pub(crate) fn check_valid(&self, state: &ValidationState<'_>) -> ValidationResult<()> {
        let spent = match state.lookup(self.body.spent_output)? {
            Entry::Output(output) => output,
            other => {
                return Err(ValidationError::InvalidEntryType {
                    expected: "output",
                    found: other.type_name(),
                })
                .context("checking spent output")
            }
        };

        state
            .verify_program(&spent.body.control_program, &self.witness.arguments)
            .context("checking control program")?;

        if spent.body.source.value != self.witness.destination.value {
            return Err(ValidationError::MismatchedValue).context("checking spent value");
        }

        check_destination(&state.with_dest_position(0), &self.witness.destination)
            .context("checking spend destination")?;

        state.check_ext_hash(&self.body.ext_hash, Self::TYPE)
    }
}

impl EntryBody for Spend {
    const TYPE: &'static str = entry_types::SPEND;

    fn write_body(&self, w: &mut CanonWriter) {
        w.write_entry_id(&self.body.spent_output);
        w.write_hash(&self.body.data);
        w.write_hash(&self.body.ext_hash);
    }
}
