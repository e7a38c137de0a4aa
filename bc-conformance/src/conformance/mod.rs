//! Conformance Test Module
//!
//! Runners that replay the vectors against `bc-core` and `bc-vm`.

pub mod entry_id;
pub mod validation;
pub mod vm;

use crate::vectors::TestVector;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Conformance test result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceResult {
    /// Test vector ID
    pub vector_id: String,
    pub passed: bool,
    pub duration_ms: u64,
    /// Error message (if failed)
    pub error: Option<String>,
    pub notes: Option<String>,
}

impl ConformanceResult {
    pub fn pass(vector_id: impl Into<String>, duration: Duration) -> Self {
        Self {
            vector_id: vector_id.into(),
            passed: true,
            duration_ms: duration.as_millis() as u64,
            error: None,
            notes: None,
        }
    }

    pub fn fail(vector_id: impl Into<String>, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            vector_id: vector_id.into(),
            passed: false,
            duration_ms: duration.as_millis() as u64,
            error: Some(error.into()),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Outcome of running one vector, reduced to what vectors can express
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    /// Rejected with a stable error code, plus the VM code behind a
    /// program failure
    Rejected {
        code: &'static str,
        vm_code: Option<&'static str>,
        message: String,
    },
}

/// Compare an outcome against the vector's expectations
pub fn judge<T>(vector: &TestVector<T>, outcome: Outcome, duration: Duration) -> ConformanceResult {
    match (vector.should_succeed, outcome) {
        (true, Outcome::Accepted) => ConformanceResult::pass(&vector.id, duration),
        (true, Outcome::Rejected { message, .. }) => {
            ConformanceResult::fail(&vector.id, duration, format!("Unexpected rejection: {}", message))
        }
        (false, Outcome::Accepted) => {
            ConformanceResult::fail(&vector.id, duration, "Expected rejection, but accepted")
        }
        (false, Outcome::Rejected { code, vm_code, message }) => {
            if let Some(expected) = vector.expected_str("error_code") {
                if expected != code {
                    return ConformanceResult::fail(
                        &vector.id,
                        duration,
                        format!("Expected {}, got {}", expected, message),
                    );
                }
            }
            if let Some(expected) = vector.expected_str("vm_error_code") {
                if Some(expected) != vm_code {
                    return ConformanceResult::fail(
                        &vector.id,
                        duration,
                        format!("Expected VM error {}, got {}", expected, message),
                    );
                }
            }
            ConformanceResult::pass(&vector.id, duration).with_notes(message)
        }
    }
}

/// Conformance test suite results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResults {
    pub name: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<ConformanceResult>,
}

impl SuiteResults {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            duration_ms: 0,
            results: Vec::new(),
        }
    }

    pub fn add_result(&mut self, result: ConformanceResult) {
        self.total += 1;
        self.duration_ms += result.duration_ms;

        if result.passed {
            self.passed += 1;
        } else {
            warn!(
                suite = %self.name,
                vector_id = %result.vector_id,
                error = ?result.error,
                "conformance vector failed"
            );
            self.failed += 1;
        }

        self.results.push(result);
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Pass rate as a percentage
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &ConformanceResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

/// Conformance level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConformanceLevel {
    /// L1: encodings, ids and standalone programs
    L1,
    /// L2: transaction validation
    L2,
    /// L3: introspection across entries
    L3,
}

impl ConformanceLevel {
    pub fn name(&self) -> &'static str {
        match self {
            ConformanceLevel::L1 => "L1 (Basic)",
            ConformanceLevel::L2 => "L2 (Standard)",
            ConformanceLevel::L3 => "L3 (Full)",
        }
    }

    /// Tag carried by vectors at this level
    pub fn tag(&self) -> &'static str {
        match self {
            ConformanceLevel::L1 => "l1",
            ConformanceLevel::L2 => "l2",
            ConformanceLevel::L3 => "l3",
        }
    }

    /// Level of a vector, from its tags; untagged vectors are L1
    pub fn of<T>(vector: &TestVector<T>) -> Self {
        [ConformanceLevel::L3, ConformanceLevel::L2]
            .into_iter()
            .find(|level| vector.tags.iter().any(|t| t == level.tag()))
            .unwrap_or(ConformanceLevel::L1)
    }
}

/// Trait for conformance test runners
pub trait ConformanceRunner {
    type Input;

    fn name(&self) -> &'static str;

    fn run_vector(&self, vector: &TestVector<Self::Input>) -> ConformanceResult;

    fn run_suite(&self, vectors: &[TestVector<Self::Input>]) -> SuiteResults
    where
        Self: Sized,
    {
        self.run_suite_up_to(vectors, ConformanceLevel::L3)
    }

    /// Run vectors at or below `level`; the rest count as skipped
    fn run_suite_up_to(&self, vectors: &[TestVector<Self::Input>], level: ConformanceLevel) -> SuiteResults
    where
        Self: Sized,
    {
        let mut results = SuiteResults::new(self.name());

        for vector in vectors {
            if ConformanceLevel::of(vector) > level {
                results.skipped += 1;
                continue;
            }
            debug!(suite = self.name(), vector_id = %vector.id, "running vector");
            results.add_result(self.run_vector(vector));
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conformance_result_pass() {
        let result = ConformanceResult::pass("test-001", Duration::from_millis(100));
        assert!(result.passed);
        assert_eq!(result.duration_ms, 100);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_suite_results() {
        let mut suite = SuiteResults::new("Test Suite");
        suite.add_result(ConformanceResult::pass("test-001", Duration::from_millis(100)));
        suite.add_result(ConformanceResult::pass("test-002", Duration::from_millis(50)));
        suite.add_result(ConformanceResult::fail("test-003", Duration::from_millis(75), "Error"));

        assert_eq!(suite.total, 3);
        assert_eq!(suite.passed, 2);
        assert_eq!(suite.failed, 1);
        assert!(!suite.all_passed());
        assert!((suite.pass_rate() - 66.67).abs() < 1.0);
        assert_eq!(suite.failures().count(), 1);
    }

    #[test]
    fn test_judge() {
        let rejected = || Outcome::Rejected {
            code: "BC-PROG-001",
            vm_code: Some("BC-VM-009"),
            message: "program verification failed".to_string(),
        };
        let ok = TestVector::new("v-1", "accepts", ());
        assert!(judge(&ok, Outcome::Accepted, Duration::ZERO).passed);
        assert!(!judge(&ok, rejected(), Duration::ZERO).passed);

        let fails = TestVector::new("v-2", "rejects", ()).rejects_with("BC-PROG-001");
        assert!(judge(&fails, rejected(), Duration::ZERO).passed);
        assert!(!judge(&fails, Outcome::Accepted, Duration::ZERO).passed);

        let wrong = TestVector::new("v-3", "rejects", ()).rejects_with("BC-MUX-004");
        assert!(!judge(&wrong, rejected(), Duration::ZERO).passed);

        let vm = TestVector::new("v-4", "rejects", ())
            .with_expected(serde_json::json!({ "error_code": "BC-PROG-001", "vm_error_code": "BC-VM-003" }))
            .should_fail();
        assert!(!judge(&vm, rejected(), Duration::ZERO).passed);
    }

    #[test]
    fn test_conformance_levels() {
        assert_eq!(ConformanceLevel::L1.name(), "L1 (Basic)");
        assert_eq!(ConformanceLevel::L3.name(), "L3 (Full)");
        assert!(ConformanceLevel::L1 < ConformanceLevel::L2);

        let v = TestVector::new("v", "d", ()).with_tags(vec!["checkoutput", "l3"]);
        assert_eq!(ConformanceLevel::of(&v), ConformanceLevel::L3);
        let v = TestVector::new("v", "d", ());
        assert_eq!(ConformanceLevel::of(&v), ConformanceLevel::L1);
    }
}
