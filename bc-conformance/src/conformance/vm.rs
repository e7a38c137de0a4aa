//! VM Conformance Tests

use super::{judge, ConformanceResult, ConformanceRunner, Outcome, SuiteResults};
use crate::vectors::{hexes, vm as vectors, TestVector};
use bc_vm::{verify, Context, Program, VmConfig};
use std::time::Instant;

/// Standalone program runner
#[derive(Debug, Default)]
pub struct VmConformanceRunner;

impl VmConformanceRunner {
    pub fn new() -> Self {
        Self
    }

    pub fn run_all(&self) -> SuiteResults {
        self.run_suite(&vectors::all_vectors())
    }

    fn execute(input: &vectors::VmInput) -> Result<Outcome, String> {
        let program = Program {
            vm_version: input.vm_version,
            code: hexes::decode(&input.code_hex)?,
        };
        let args = input
            .args_hex
            .iter()
            .map(|a| hexes::decode(a))
            .collect::<Result<Vec<_>, _>>()?;

        let outcome = match verify(
            Context::Standalone,
            &program,
            &args,
            &VmConfig::with_run_limit(input.run_limit),
        ) {
            Ok(()) => Outcome::Accepted,
            Err(e) => Outcome::Rejected {
                code: e.code(),
                vm_code: Some(e.code()),
                message: e.to_string(),
            },
        };
        Ok(outcome)
    }
}

impl ConformanceRunner for VmConformanceRunner {
    type Input = vectors::VmInput;

    fn name(&self) -> &'static str {
        "vm"
    }

    fn run_vector(&self, vector: &TestVector<Self::Input>) -> ConformanceResult {
        let start = Instant::now();
        match Self::execute(&vector.input) {
            Ok(outcome) => judge(vector, outcome, start.elapsed()),
            Err(e) => ConformanceResult::fail(&vector.id, start.elapsed(), e),
        }
    }
}

/// Run all VM conformance tests
pub fn run_conformance_tests() -> SuiteResults {
    VmConformanceRunner::new().run_all()
}
