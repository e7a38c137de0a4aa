//! Test Vectors Module
//!
//! Fixed inputs and expected outcomes shared by every implementation
//! of the validation core.

pub mod entry_id;
pub mod validation;
pub mod vm;

use serde::{Deserialize, Serialize};

/// Test vector for any operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestVector<T> {
    /// Test vector ID
    pub id: String,
    pub description: String,
    pub input: T,
    /// Expected output (if applicable)
    pub expected: Option<serde_json::Value>,
    /// Whether this should succeed
    pub should_succeed: bool,
    /// Tags for categorization
    pub tags: Vec<String>,
}

impl<T> TestVector<T> {
    pub fn new(id: impl Into<String>, description: impl Into<String>, input: T) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            input,
            expected: None,
            should_succeed: true,
            tags: Vec::new(),
        }
    }

    pub fn with_expected(mut self, expected: serde_json::Value) -> Self {
        self.expected = Some(expected);
        self
    }

    /// Mark as should fail
    pub fn should_fail(mut self) -> Self {
        self.should_succeed = false;
        self
    }

    /// Expect rejection with the given error code
    pub fn rejects_with(mut self, code: &str) -> Self {
        self.should_succeed = false;
        self.expected = Some(serde_json::json!({ "error_code": code }));
        self
    }

    pub fn with_tags(mut self, tags: Vec<&str>) -> Self {
        self.tags = tags.into_iter().map(String::from).collect();
        self
    }

    /// Expected value of `key`, if the vector names one
    pub fn expected_str(&self, key: &str) -> Option<&str> {
        self.expected.as_ref()?.get(key)?.as_str()
    }
}

/// Hex helpers for vector inputs
pub mod hexes {
    use bc_core::Hash;

    /// 32 zero bytes
    pub fn zero() -> String {
        Hash::zero().to_hex()
    }

    pub fn decode_hash(s: &str) -> Result<Hash, String> {
        Hash::from_hex(s).ok_or_else(|| format!("not a 32-byte hex string: {:?}", s))
    }

    pub fn decode(s: &str) -> Result<Vec<u8>, String> {
        hex::decode(s).map_err(|e| format!("bad hex {:?}: {}", s, e))
    }
}
