//! Conformance Testing Framework
//!
//! Standardized vectors for the entry graph validation core, and
//! runners that replay them against `bc-core` and `bc-vm`.
//!
//! # Usage
//!
//! ```rust
//! use bc_conformance::run_all_conformance_tests;
//!
//! let results = run_all_conformance_tests();
//! assert!(results.all_passed(), "All conformance tests should pass");
//! ```
//!
//! ## Running Specific Suites
//!
//! ```rust
//! use bc_conformance::conformance::{entry_id, validation, vm};
//!
//! let ids = entry_id::run_conformance_tests();
//! println!("Entry id tests: {}/{} passed", ids.passed, ids.total);
//!
//! let txs = validation::run_conformance_tests();
//! println!("Validation tests: {}/{} passed", txs.passed, txs.total);
//! ```
//!
//! # Conformance Levels
//!
//! - **L1 (Basic)**: entry ids, asset ids, standalone programs
//! - **L2 (Standard)**: transaction validation, conservation, budgets
//! - **L3 (Full)**: programs introspecting other entries (CHECKOUTPUT)

pub mod conformance;
pub mod vectors;

pub use conformance::{ConformanceLevel, ConformanceResult, ConformanceRunner, SuiteResults};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run all conformance test suites
pub fn run_all_conformance_tests() -> AllConformanceResults {
    AllConformanceResults {
        entry_id: conformance::entry_id::run_conformance_tests(),
        vm: conformance::vm::run_conformance_tests(),
        validation: conformance::validation::run_conformance_tests(),
    }
}

/// Results from all conformance test suites
#[derive(Debug)]
pub struct AllConformanceResults {
    pub entry_id: SuiteResults,
    pub vm: SuiteResults,
    pub validation: SuiteResults,
}

impl AllConformanceResults {
    fn suites(&self) -> [&SuiteResults; 3] {
        [&self.entry_id, &self.vm, &self.validation]
    }

    pub fn all_passed(&self) -> bool {
        self.suites().iter().all(|s| s.all_passed())
    }

    pub fn total_tests(&self) -> usize {
        self.suites().iter().map(|s| s.total).sum()
    }

    pub fn total_passed(&self) -> usize {
        self.suites().iter().map(|s| s.passed).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.suites().iter().map(|s| s.failed).sum()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.suites().iter().map(|s| s.duration_ms).sum()
    }

    /// Overall pass rate as a percentage
    pub fn pass_rate(&self) -> f64 {
        let total = self.total_tests();
        if total == 0 {
            100.0
        } else {
            (self.total_passed() as f64 / total as f64) * 100.0
        }
    }

    pub fn print_summary(&self) {
        println!("=== Conformance Test Results ===\n");

        println!("Entry Id Tests:   {}/{} passed", self.entry_id.passed, self.entry_id.total);
        println!("VM Tests:         {}/{} passed", self.vm.passed, self.vm.total);
        println!("Validation Tests: {}/{} passed", self.validation.passed, self.validation.total);

        println!("\n---");
        println!(
            "Total: {}/{} tests passed ({:.1}%)",
            self.total_passed(),
            self.total_tests(),
            self.pass_rate()
        );
        println!("Duration: {}ms", self.total_duration_ms());

        if !self.all_passed() {
            for result in self.suites().iter().flat_map(|s| s.failures()) {
                println!("  FAIL: {} - {:?}", result.vector_id, result.error);
            }
        }
    }
}
