//! Entry ID Test Vectors
//!
//! Known ids for canonical bodies. Any change to the canonical layout
//! or the domain tags breaks these.

use super::{hexes, TestVector};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// What to hash
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryIdInput {
    /// Pre-encoded body under an entry type string
    Raw { entry_type: String, body_hex: String },
    /// Time range entry with an empty extension hash
    TimeRange { min_time_ms: u64, max_time_ms: u64 },
    /// Asset id of a definition
    AssetDefinition {
        initial_block_id_hex: String,
        program_hex: String,
        data_hex: String,
    },
}

pub fn all_vectors() -> Vec<TestVector<EntryIdInput>> {
    vec![
        raw_empty_mux(),
        raw_empty_output(),
        time_range_unbounded(),
        time_range_window(),
        time_range_raw_matches(),
        asset_trivial(),
        asset_unspendable(),
    ]
}

pub fn raw_empty_mux() -> TestVector<EntryIdInput> {
    TestVector::new(
        "EID-001",
        "Empty body under mux1",
        EntryIdInput::Raw {
            entry_type: "mux1".to_string(),
            body_hex: String::new(),
        },
    )
    .with_expected(json!({
        "id_hex": "a523a764eeec85548c241ee516c17c48b5cc664c9970a3ba814bb9d01b110871"
    }))
    .with_tags(vec!["raw", "l1"])
}

/// Same body, different type: the id must differ from EID-001
pub fn raw_empty_output() -> TestVector<EntryIdInput> {
    TestVector::new(
        "EID-002",
        "Empty body under output1",
        EntryIdInput::Raw {
            entry_type: "output1".to_string(),
            body_hex: String::new(),
        },
    )
    .with_expected(json!({
        "id_hex": "ab9cb24b2b97489180402be53965eafdff48b235db6151d403b180a4bb104eb0"
    }))
    .with_tags(vec!["raw", "l1"])
}

pub fn time_range_unbounded() -> TestVector<EntryIdInput> {
    TestVector::new(
        "EID-003",
        "Time range 0..0",
        EntryIdInput::TimeRange {
            min_time_ms: 0,
            max_time_ms: 0,
        },
    )
    .with_expected(json!({
        "id_hex": "67e4a35e12cbb5588891fc539b7f4ee24799ab18792594c293473a1a1b2328bb"
    }))
    .with_tags(vec!["timerange", "l1"])
}

pub fn time_range_window() -> TestVector<EntryIdInput> {
    TestVector::new(
        "EID-004",
        "Time range 1000..2000, varints spanning two bytes",
        EntryIdInput::TimeRange {
            min_time_ms: 1_000,
            max_time_ms: 2_000,
        },
    )
    .with_expected(json!({
        "id_hex": "bbd23775cc6c731292141198af1807e42404d858da3ab8d73120e7bb5caa3723"
    }))
    .with_tags(vec!["timerange", "l1"])
}

/// The typed entry and its hand-encoded body agree
pub fn time_range_raw_matches() -> TestVector<EntryIdInput> {
    TestVector::new(
        "EID-005",
        "Hand-encoded time range body 1000..2000",
        EntryIdInput::Raw {
            entry_type: "timerange1".to_string(),
            body_hex: format!("e807d00f{}", hexes::zero()),
        },
    )
    .with_expected(json!({
        "id_hex": "bbd23775cc6c731292141198af1807e42404d858da3ab8d73120e7bb5caa3723"
    }))
    .with_tags(vec!["raw", "timerange", "l1"])
}

pub fn asset_trivial() -> TestVector<EntryIdInput> {
    TestVector::new(
        "EID-006",
        "Asset defined on the zero chain by the trivial program",
        EntryIdInput::AssetDefinition {
            initial_block_id_hex: hexes::zero(),
            program_hex: "51".to_string(),
            data_hex: hexes::zero(),
        },
    )
    .with_expected(json!({
        "id_hex": "0e409dcc81862bd256af3161812dd26dcdd35e5deb56e6ad3aeb700493cca35f"
    }))
    .with_tags(vec!["asset", "l1"])
}

pub fn asset_unspendable() -> TestVector<EntryIdInput> {
    TestVector::new(
        "EID-007",
        "Asset defined on the zero chain by FAIL",
        EntryIdInput::AssetDefinition {
            initial_block_id_hex: hexes::zero(),
            program_hex: "6a".to_string(),
            data_hex: hexes::zero(),
        },
    )
    .with_expected(json!({
        "id_hex": "7d3169f3cd8696cd87aeba30021427308bc8b9a9d8ee1166582f232beb8f046a"
    }))
    .with_tags(vec!["asset", "l1"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_vector_ids_unique() {
        let vectors = all_vectors();
        let ids: HashSet<_> = vectors.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids.len(), vectors.len());
    }

    #[test]
    fn test_every_vector_names_an_id() {
        for vector in all_vectors() {
            let id = vector.expected_str("id_hex").unwrap();
            assert_eq!(id.len(), 64, "{}", vector.id);
        }
    }

    #[test]
    fn test_input_json_tagging() {
        let json = serde_json::to_value(&time_range_window().input).unwrap();
        assert_eq!(json["kind"], "time_range");
        assert_eq!(json["min_time_ms"], 1_000);
    }
}
