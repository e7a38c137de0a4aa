//! VM Test Vectors
//!
//! Programs run outside any transaction or block.

use super::TestVector;
use bc_vm::DEFAULT_RUN_LIMIT;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmInput {
    pub vm_version: u64,
    pub code_hex: String,
    /// Witness arguments, bottom of the stack first
    #[serde(default)]
    pub args_hex: Vec<String>,
    pub run_limit: i64,
}

impl VmInput {
    pub fn new(code_hex: &str) -> Self {
        Self {
            vm_version: 1,
            code_hex: code_hex.to_string(),
            args_hex: Vec::new(),
            run_limit: DEFAULT_RUN_LIMIT,
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args_hex = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn run_limit(mut self, run_limit: i64) -> Self {
        self.run_limit = run_limit;
        self
    }
}

pub fn all_vectors() -> Vec<TestVector<VmInput>> {
    vec![
        TestVector::new("VM-001", "OP_1 is true", VmInput::new("51")).with_tags(vec!["l1"]),
        TestVector::new("VM-002", "FALSE leaves a false top", VmInput::new("00"))
            .rejects_with("BC-VM-007")
            .with_tags(vec!["l1"]),
        TestVector::new("VM-003", "Empty program leaves an empty stack", VmInput::new(""))
            .rejects_with("BC-VM-007")
            .with_tags(vec!["l1"]),
        TestVector::new("VM-004", "FAIL", VmInput::new("6a"))
            .rejects_with("BC-VM-009")
            .with_tags(vec!["l1"]),
        TestVector::new("VM-005", "1 2 ADD 3 EQUAL", VmInput::new("5152935387"))
            .with_tags(vec!["l1", "arith"]),
        TestVector::new("VM-006", "DROP on an empty stack", VmInput::new("75"))
            .rejects_with("BC-VM-004")
            .with_tags(vec!["l1", "stack"]),
        TestVector::new(
            "VM-007",
            "Argument consumed by VERIFY",
            VmInput::new("6951").args(&["01"]),
        )
        .with_tags(vec!["l1", "stack"]),
        TestVector::new(
            "VM-008",
            "Self jump exhausts the budget",
            VmInput::new("6300000000").run_limit(50),
        )
        .rejects_with("BC-VM-003")
        .with_tags(vec!["l2", "budget"]),
        TestVector::new("VM-009", "ASSET needs a transaction", VmInput::new("c2"))
            .rejects_with("BC-VM-001")
            .with_tags(vec!["l2", "introspection"]),
        TestVector::new(
            "VM-010",
            "Unknown VM version",
            VmInput {
                vm_version: 2,
                ..VmInput::new("51")
            },
        )
        .rejects_with("BC-VM-010")
        .with_tags(vec!["l1"]),
        TestVector::new(
            "VM-011",
            "9223372036854775807 1ADD leaves int64 range",
            VmInput::new("08ffffffffffffff7f8b"),
        )
        .rejects_with("BC-VM-012")
        .with_tags(vec!["l2", "arith"]),
        TestVector::new(
            "VM-012",
            "Jump past the end",
            VmInput::new("63ff000000"),
        )
        .rejects_with("BC-VM-013")
        .with_tags(vec!["l2"]),
    ]
    .into_iter()
    .map(|v| {
        if v.should_succeed {
            v.with_expected(json!({ "ok": true }))
        } else {
            v
        }
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_vectors_name_a_code() {
        for vector in all_vectors() {
            if !vector.should_succeed {
                assert!(vector.expected_str("error_code").is_some(), "{}", vector.id);
            }
        }
    }

    #[test]
    fn test_code_hex_decodes() {
        for vector in all_vectors() {
            assert!(hex::decode(&vector.input.code_hex).is_ok(), "{}", vector.id);
        }
    }
}
