use serde::{Deserialize, Serialize};

use crate::canon::{entry_types, CanonWriter};
use crate::entries::EntryBody;
use crate::error::{ResultExt, ValidationResult};
use crate::types::{Hash, Program, ValueSource};
use crate::validation::{check_source, ValidationState};

/// Value locked under a control program
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub body: OutputBody,
    pub ordinal: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputBody {
    pub source: ValueSource,
    pub control_program: Program,
    pub data: Hash,
    pub ext_hash: Hash,
}

impl Output {
    pub fn new(source: ValueSource, control_program: Program, data: Hash, ordinal: u64) -> Self {
        Self {
            body: OutputBody {
                source,
                control_program,
                data,
                ext_hash: Hash::zero(),
            },
            ordinal,
        }
    }

    pub(crate) fn check_valid(&self, state: &ValidationState<'_>) -> ValidationResult<()> {
        check_source(&state.with_source_position(0), &self.body.source)
            .context("checking output source")?;
        state.check_ext_hash(&self.body.ext_hash, Self::TYPE)
    }
}

impl EntryBody for Output {
    const TYPE: &'static str = entry_types::OUTPUT;

    fn write_body(&self, w: &mut CanonWriter) {
        w.write_value_source(&self.body.source);
        w.write_program(&self.body.control_program);
        w.write_hash(&self.body.data);
        w.write_hash(&self.body.ext_hash);
    }
}

/// Value permanently removed from circulation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retirement {
    pub body: RetirementBody,
    pub ordinal: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementBody {
    pub source: ValueSource,
    pub data: Hash,
    pub ext_hash: Hash,
}

impl Retirement {
    pub fn new(source: ValueSource, data: Hash, ordinal: u64) -> Self {
        Self {
            body: RetirementBody {
                source,
                data,
                ext_hash: Hash::zero(),
            },
            ordinal,
        }
    }

    pub(crate) fn check_valid(&self, state: &ValidationState<'_>) -> ValidationResult<()> {
        check_source(&state.with_source_position(0), &self.body.source)
            .context("checking retirement source")?;
        state.check_ext_hash(&self.body.ext_hash, Self::TYPE)
    }
}

impl EntryBody for Retirement {
    const TYPE: &'static str = entry_types::RETIREMENT;

    fn write_body(&self, w: &mut CanonWriter) {
        w.write_value_source(&self.body.source);
        w.write_hash(&self.body.data);
        w.write_hash(&self.body.ext_hash);
    }
}
