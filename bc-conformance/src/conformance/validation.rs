//! Transaction Validation Conformance Tests

use super::{judge, ConformanceResult, ConformanceRunner, Outcome, SuiteResults};
use crate::vectors::{validation as vectors, TestVector};
use bc_core::validate_tx;
use std::time::Instant;

/// Runner building and validating scenario transactions
#[derive(Debug, Default)]
pub struct ValidationConformanceRunner;

impl ValidationConformanceRunner {
    pub fn new() -> Self {
        Self
    }

    pub fn run_all(&self) -> SuiteResults {
        self.run_suite(&vectors::all_vectors())
    }

    fn execute(scenario: &vectors::TxScenario) -> Result<Outcome, String> {
        let tx = scenario.build()?;
        let outcome = match validate_tx(&scenario.context(), &tx) {
            Ok(()) => Outcome::Accepted,
            Err(e) => Outcome::Rejected {
                code: e.code(),
                vm_code: e.vm_error().map(|v| v.code()),
                message: e.to_string(),
            },
        };
        Ok(outcome)
    }
}

impl ConformanceRunner for ValidationConformanceRunner {
    type Input = vectors::TxScenario;

    fn name(&self) -> &'static str {
        "validation"
    }

    fn run_vector(&self, vector: &TestVector<Self::Input>) -> ConformanceResult {
        let start = Instant::now();
        match Self::execute(&vector.input) {
            Ok(outcome) => judge(vector, outcome, start.elapsed()),
            Err(e) => ConformanceResult::fail(&vector.id, start.elapsed(), e),
        }
    }
}

/// Run all validation conformance tests
pub fn run_conformance_tests() -> SuiteResults {
    ValidationConformanceRunner::new().run_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance::ConformanceLevel;

    #[test]
    fn test_validation_conformance() {
        let results = run_conformance_tests();
        assert!(results.total > 0);
        assert!(
            results.all_passed(),
            "failures: {:?}",
            results.failures().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_level_filter_skips_introspection() {
        let runner = ValidationConformanceRunner::new();
        let vectors = vectors::all_vectors();
        let results = runner.run_suite_up_to(&vectors, ConformanceLevel::L2);
        assert!(results.skipped > 0);
        assert_eq!(results.total + results.skipped, vectors.len());
    }
}
