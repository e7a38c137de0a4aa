//! VM Error Registry
//!
//! Error code format: BC-VM-{sequence}

use thiserror::Error;

/// VM result type
pub type VmResult<T> = Result<T, VmError>;

/// Errors raised while executing a program
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    /// [BC-VM-001] Opcode requires a context the VM is not running in
    #[error("[BC-VM-001] wrong context")]
    Context,

    /// [BC-VM-002] Malformed numeric operand
    #[error("[BC-VM-002] bad value")]
    BadValue,

    /// [BC-VM-003] Run limit exhausted
    #[error("[BC-VM-003] run limit exceeded: cost {cost}, remaining {remaining}")]
    BudgetExceeded { cost: i64, remaining: i64 },

    /// [BC-VM-004] Pop from an empty data stack
    #[error("[BC-VM-004] data stack underflow")]
    DataStackUnderflow,

    /// [BC-VM-005] Pop from an empty alt stack
    #[error("[BC-VM-005] alt stack underflow")]
    AltStackUnderflow,

    /// [BC-VM-006] Instruction runs past the end of the program
    #[error("[BC-VM-006] unexpected end of program at pc {pc}")]
    ShortProgram { pc: u32 },

    /// [BC-VM-007] Program finished without a truthy stack top
    #[error("[BC-VM-007] false VM result")]
    FalseResult,

    /// [BC-VM-008] VERIFY-style opcode saw a false value
    #[error("[BC-VM-008] VERIFY failed")]
    VerifyFailed,

    /// [BC-VM-009] FAIL executed
    #[error("[BC-VM-009] FAIL executed")]
    Fail,

    /// [BC-VM-010] Program targets an unknown VM version
    #[error("[BC-VM-010] unsupported VM version {0}")]
    UnsupportedVm(u64),

    /// [BC-VM-011] Reserved expansion opcode under a strict version
    #[error("[BC-VM-011] disallowed opcode 0x{0:02x}")]
    DisallowedOpcode(u8),

    /// [BC-VM-012] Integer arithmetic left the signed 64-bit range
    #[error("[BC-VM-012] range error")]
    Range,

    /// [BC-VM-013] Jump outside the program
    #[error("[BC-VM-013] jump target {target} outside program of length {len}")]
    BadJumpTarget { target: u32, len: usize },

    /// [BC-VM-014] CHECKOUTPUT index past the mux destinations
    #[error("[BC-VM-014] no mux destination at index {index}")]
    NoSuchDestination { index: u32 },

    /// Execution error raised by a context opcode
    #[error("execution error: {0}")]
    Execution(String),
}

impl VmError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            VmError::Context => "BC-VM-001",
            VmError::BadValue => "BC-VM-002",
            VmError::BudgetExceeded { .. } => "BC-VM-003",
            VmError::DataStackUnderflow => "BC-VM-004",
            VmError::AltStackUnderflow => "BC-VM-005",
            VmError::ShortProgram { .. } => "BC-VM-006",
            VmError::FalseResult => "BC-VM-007",
            VmError::VerifyFailed => "BC-VM-008",
            VmError::Fail => "BC-VM-009",
            VmError::UnsupportedVm(_) => "BC-VM-010",
            VmError::DisallowedOpcode(_) => "BC-VM-011",
            VmError::Range => "BC-VM-012",
            VmError::BadJumpTarget { .. } => "BC-VM-013",
            VmError::NoSuchDestination { .. } => "BC-VM-014",
            VmError::Execution(_) => "BC-VM-000",
        }
    }
}
