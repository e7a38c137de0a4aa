//! Entry ID Conformance Tests

use super::{ConformanceResult, ConformanceRunner, SuiteResults};
use crate::vectors::{entry_id as vectors, hexes, TestVector};
use bc_core::canon;
use bc_core::entries::EntryBody;
use bc_core::{AssetDefinition, EntryId, Hash, Program, TimeRange};
use std::time::Instant;

/// Entry id conformance runner
#[derive(Debug, Default)]
pub struct EntryIdConformanceRunner;

impl EntryIdConformanceRunner {
    pub fn new() -> Self {
        Self
    }

    pub fn run_all(&self) -> SuiteResults {
        self.run_suite(&vectors::all_vectors())
    }

    fn compute(input: &vectors::EntryIdInput) -> Result<Hash, String> {
        match input {
            vectors::EntryIdInput::Raw {
                entry_type,
                body_hex,
            } => Ok(canon::entry_id(entry_type, &hexes::decode(body_hex)?).0),
            vectors::EntryIdInput::TimeRange {
                min_time_ms,
                max_time_ms,
            } => Ok(TimeRange::new(*min_time_ms, *max_time_ms).entry_id().0),
            vectors::EntryIdInput::AssetDefinition {
                initial_block_id_hex,
                program_hex,
                data_hex,
            } => {
                let definition = AssetDefinition::new(
                    EntryId(hexes::decode_hash(initial_block_id_hex)?),
                    Program::new(hexes::decode(program_hex)?),
                    hexes::decode_hash(data_hex)?,
                );
                Ok(definition.asset_id().0)
            }
        }
    }
}

impl ConformanceRunner for EntryIdConformanceRunner {
    type Input = vectors::EntryIdInput;

    fn name(&self) -> &'static str {
        "entry_id"
    }

    fn run_vector(&self, vector: &TestVector<Self::Input>) -> ConformanceResult {
        let start = Instant::now();

        let computed = match Self::compute(&vector.input) {
            Ok(hash) => hash.to_hex(),
            Err(e) => return ConformanceResult::fail(&vector.id, start.elapsed(), e),
        };

        match vector.expected_str("id_hex") {
            Some(expected) if expected == computed => {
                ConformanceResult::pass(&vector.id, start.elapsed())
            }
            Some(expected) => ConformanceResult::fail(
                &vector.id,
                start.elapsed(),
                format!("Id mismatch: expected {}, got {}", expected, computed),
            ),
            None => ConformanceResult::pass(&vector.id, start.elapsed())
                .with_notes(format!("Computed id: {}", computed)),
        }
    }
}

/// Run all entry id conformance tests
pub fn run_conformance_tests() -> SuiteResults {
    EntryIdConformanceRunner::new().run_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_conformance() {
        let results = run_conformance_tests();
        assert!(results.total > 0);
        assert!(
            results.all_passed(),
            "failures: {:?}",
            results.failures().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_type_strings_separate_ids() {
        let mux = EntryIdConformanceRunner::compute(&vectors::raw_empty_mux().input).unwrap();
        let output = EntryIdConformanceRunner::compute(&vectors::raw_empty_output().input).unwrap();
        assert_ne!(mux, output);
    }

    #[test]
    fn test_mismatch_reported() {
        let vector = vectors::time_range_unbounded()
            .with_expected(serde_json::json!({ "id_hex": hexes::zero() }));
        let result = EntryIdConformanceRunner::new().run_vector(&vector);
        assert!(!result.passed);
        assert!(result.error.unwrap().contains("Id mismatch"));
    }
}
