//! Transaction Validation Test Vectors
//!
//! Each vector describes a single-Mux transaction over one asset (the
//! trivially issuable asset of the zero chain) and the outcome of
//! validating it.

use super::{hexes, TestVector};
use bc_core::{
    AssetAmount, AssetDefinition, AssetId, EntryId, Hash, Output, Program, TxBuilder, TxEntries,
    ValidationContext, ValueSource,
};
use bc_vm::{VmConfig, DEFAULT_RUN_LIMIT};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// A prior output consumed by the transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendInput {
    pub amount: u64,
    pub control_hex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TxScenario {
    pub block_version: u64,
    pub tx_version: u64,
    pub min_time_ms: u64,
    pub max_time_ms: u64,
    pub issuance_window_ms: u64,
    pub run_limit: i64,
    pub mux_program_hex: String,
    pub issued: Vec<u64>,
    pub spent: Vec<SpendInput>,
    pub outputs: Vec<u64>,
    pub retired: Vec<u64>,
    /// Set a non-empty extension hash on the transaction header
    pub header_ext_hash: bool,
}

impl Default for TxScenario {
    fn default() -> Self {
        Self {
            block_version: 1,
            tx_version: 1,
            min_time_ms: 1_000,
            max_time_ms: 2_000,
            issuance_window_ms: 0,
            run_limit: DEFAULT_RUN_LIMIT,
            mux_program_hex: "51".to_string(),
            issued: Vec::new(),
            spent: Vec::new(),
            outputs: Vec::new(),
            retired: Vec::new(),
            header_ext_hash: false,
        }
    }
}

impl TxScenario {
    fn amounts(issued: &[u64], outputs: &[u64]) -> Self {
        Self {
            issued: issued.to_vec(),
            outputs: outputs.to_vec(),
            ..Default::default()
        }
    }

    pub fn definition() -> AssetDefinition {
        AssetDefinition::new(EntryId::zero(), Program::trivial(), Hash::zero())
    }

    pub fn asset() -> AssetId {
        Self::definition().asset_id()
    }

    pub fn context(&self) -> ValidationContext {
        ValidationContext::new(self.block_version, EntryId::zero())
            .with_vm_config(VmConfig::with_run_limit(self.run_limit))
            .with_issuance_window(self.issuance_window_ms)
    }

    /// Assemble the transaction graph
    pub fn build(&self) -> Result<TxEntries, String> {
        let asset = Self::asset();
        let mux_program = Program::new(hexes::decode(&self.mux_program_hex)?);
        let mut builder = TxBuilder::new()
            .version(self.tx_version)
            .time_range(self.min_time_ms, self.max_time_ms)
            .mux_program(mux_program, Vec::new());

        for amount in &self.issued {
            builder = builder.issue(Self::definition(), *amount, Vec::new());
        }
        for (index, spend) in self.spent.iter().enumerate() {
            let origin = EntryId(Hash([index as u8 + 1; 32]));
            let prior = Output::new(
                ValueSource::new(origin, AssetAmount::new(asset, spend.amount), 0),
                Program::new(hexes::decode(&spend.control_hex)?),
                Hash::zero(),
                0,
            );
            builder = builder.spend(prior, Vec::new());
        }
        for amount in &self.outputs {
            builder = builder.output(AssetAmount::new(asset, *amount), Program::trivial(), Hash::zero());
        }
        for amount in &self.retired {
            builder = builder.retire(AssetAmount::new(asset, *amount), Hash::zero());
        }

        let tx = builder.build();
        if !self.header_ext_hash {
            return Ok(tx);
        }

        let mut header = tx.header().clone();
        header.body.ext_hash = Hash([1; 32]);
        let header_id = tx.id();
        let rest = tx
            .iter()
            .filter(|(id, _)| **id != header_id)
            .map(|(_, entry)| entry.clone())
            .collect::<Vec<_>>();
        Ok(TxEntries::new(header, rest))
    }
}

/// Pays Mux destination 0 seven units of the spent asset under `code`
fn covenant_hex(code_hex: &str) -> String {
    format!("000057c251{:02x}{}c1", code_hex.len() / 2, code_hex)
}

pub fn all_vectors() -> Vec<TestVector<TxScenario>> {
    let mut vectors = conservation_vectors();
    vectors.extend(header_vectors());
    vectors.extend(issuance_vectors());
    vectors.extend(program_vectors());
    vectors
}

pub fn conservation_vectors() -> Vec<TestVector<TxScenario>> {
    vec![
        TestVector::new("TX-001", "Issue 100, pay 60 and 40", TxScenario::amounts(&[100], &[60, 40]))
            .with_tags(vec!["conservation", "l2"]),
        TestVector::new("TX-002", "Issue 100, pay 60 and 41", TxScenario::amounts(&[100], &[60, 41]))
            .rejects_with("BC-MUX-004")
            .with_tags(vec!["conservation", "l2"]),
        TestVector::new(
            "TX-003",
            "Second source pushes the sum past int64",
            TxScenario::amounts(&[i64::MAX as u64, 1], &[1]),
        )
        .rejects_with("BC-MUX-001")
        .with_tags(vec!["overflow", "l2"]),
        TestVector::new(
            "TX-004",
            "Destination amount beyond int64",
            TxScenario::amounts(&[5], &[i64::MAX as u64 + 1]),
        )
        .rejects_with("BC-MUX-002")
        .with_tags(vec!["overflow", "l2"]),
        TestVector::new(
            "TX-005",
            "Retire everything issued",
            TxScenario {
                issued: vec![5],
                retired: vec![5],
                ..Default::default()
            },
        )
        .with_tags(vec!["conservation", "l2"]),
    ]
}

pub fn header_vectors() -> Vec<TestVector<TxScenario>> {
    vec![
        TestVector::new("TX-010", "No results", TxScenario::amounts(&[], &[]))
            .rejects_with("BC-TX-002")
            .with_tags(vec!["header", "l2"]),
        TestVector::new(
            "TX-011",
            "Version 2 transaction in a version 1 block",
            TxScenario {
                tx_version: 2,
                ..TxScenario::amounts(&[1], &[1])
            },
        )
        .rejects_with("BC-TX-001")
        .with_tags(vec!["header", "l2"]),
        TestVector::new(
            "TX-012",
            "Inverted window",
            TxScenario {
                min_time_ms: 2_000,
                max_time_ms: 1_000,
                retired: vec![0],
                ..Default::default()
            },
        )
        .rejects_with("BC-TX-003")
        .with_tags(vec!["header", "l2"]),
        TestVector::new(
            "TX-013",
            "Extension hash on a version 1 header",
            TxScenario {
                header_ext_hash: true,
                ..TxScenario::amounts(&[1], &[1])
            },
        )
        .rejects_with("BC-ENTRY-006")
        .with_tags(vec!["ext_hash", "l2"]),
        TestVector::new(
            "TX-014",
            "Extension hash on a version 2 header",
            TxScenario {
                block_version: 2,
                tx_version: 2,
                header_ext_hash: true,
                ..TxScenario::amounts(&[1], &[1])
            },
        )
        .with_tags(vec!["ext_hash", "l2"]),
    ]
}

pub fn issuance_vectors() -> Vec<TestVector<TxScenario>> {
    vec![
        TestVector::new(
            "TX-020",
            "Window equal to the issuance limit",
            TxScenario {
                issuance_window_ms: 1_000,
                ..TxScenario::amounts(&[1], &[1])
            },
        )
        .with_tags(vec!["issuance", "l2"]),
        TestVector::new(
            "TX-021",
            "Window wider than the issuance limit",
            TxScenario {
                issuance_window_ms: 999,
                ..TxScenario::amounts(&[1], &[1])
            },
        )
        .rejects_with("BC-ISS-003")
        .with_tags(vec!["issuance", "l2"]),
        TestVector::new(
            "TX-022",
            "Issuance anchored on a half-open time range",
            TxScenario {
                min_time_ms: 0,
                ..TxScenario::amounts(&[1], &[1])
            },
        )
        .rejects_with("BC-NONCE-001")
        .with_tags(vec!["nonce", "l2"]),
    ]
}

pub fn program_vectors() -> Vec<TestVector<TxScenario>> {
    vec![
        TestVector::new(
            "TX-030",
            "Mux program fails",
            TxScenario {
                mux_program_hex: "6a".to_string(),
                ..TxScenario::amounts(&[1], &[1])
            },
        )
        .with_expected(json!({ "error_code": "BC-PROG-001", "vm_error_code": "BC-VM-009" }))
        .should_fail()
        .with_tags(vec!["program", "l2"]),
        TestVector::new(
            "TX-031",
            "Mux program exceeds the run limit",
            TxScenario {
                mux_program_hex: "6300000000".to_string(),
                run_limit: 50,
                ..TxScenario::amounts(&[1], &[1])
            },
        )
        .with_expected(json!({ "error_code": "BC-PROG-001", "vm_error_code": "BC-VM-003" }))
        .should_fail()
        .with_tags(vec!["budget", "l2"]),
        TestVector::new(
            "TX-032",
            "Covenant on a spend pays the named program",
            TxScenario {
                spent: vec![SpendInput {
                    amount: 7,
                    control_hex: covenant_hex("51"),
                }],
                outputs: vec![7],
                ..Default::default()
            },
        )
        .with_tags(vec!["checkoutput", "l3"]),
        TestVector::new(
            "TX-033",
            "Covenant naming a program is not met by a retirement",
            TxScenario {
                spent: vec![SpendInput {
                    amount: 7,
                    control_hex: covenant_hex("51"),
                }],
                retired: vec![7],
                ..Default::default()
            },
        )
        .with_expected(json!({ "error_code": "BC-PROG-001", "vm_error_code": "BC-VM-007" }))
        .should_fail()
        .with_tags(vec!["checkoutput", "l3"]),
        TestVector::new(
            "TX-034",
            "Covenant naming FAIL is met by a retirement",
            TxScenario {
                spent: vec![SpendInput {
                    amount: 7,
                    control_hex: covenant_hex("6a"),
                }],
                retired: vec![7],
                ..Default::default()
            },
        )
        .with_tags(vec!["checkoutput", "legacy", "l3"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_build() {
        for vector in all_vectors() {
            assert!(vector.input.build().is_ok(), "{}", vector.id);
        }
    }

    #[test]
    fn test_covenant_hex() {
        assert_eq!(covenant_hex("6a"), "000057c251016ac1");
    }

    #[test]
    fn test_header_ext_hash_changes_tx_id() {
        let plain = TxScenario::amounts(&[1], &[1]).build().unwrap();
        let extended = TxScenario {
            header_ext_hash: true,
            ..TxScenario::amounts(&[1], &[1])
        }
        .build()
        .unwrap();
        assert_ne!(plain.id(), extended.id());
        assert_eq!(plain.len(), extended.len());
    }

    #[test]
    fn test_scenario_json_defaults() {
        let scenario: TxScenario = serde_json::from_str(r#"{"issued":[3],"outputs":[3]}"#).unwrap();
        assert_eq!(scenario.block_version, 1);
        assert_eq!(scenario.mux_program_hex, "51");
    }
}
