//! Validation Error Registry
//!
//! Error code format: BC-{module}-{sequence}
//! - BC-ENTRY: Graph structure errors
//! - BC-TX: Transaction header errors
//! - BC-ISS: Issuance errors
//! - BC-MUX: Value routing errors
//! - BC-NONCE: Anchor errors
//! - BC-BLOCK: Block errors
//! - BC-PROG: Program verification errors
//! - BC-CFG: Configuration errors

use bc_vm::VmError;
use thiserror::Error;

use crate::types::{AssetId, EntryId};

/// Validation result type
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Reasons a transaction or block is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    // ============================================================
    // Entry Errors (BC-ENTRY-*)
    // ============================================================
    /// [BC-ENTRY-001] Reference resolved to the wrong kind of entry
    #[error("[BC-ENTRY-001] invalid entry type: expected {expected}, found {found}")]
    InvalidEntryType {
        expected: &'static str,
        found: &'static str,
    },

    /// [BC-ENTRY-002] Reference does not resolve
    #[error("[BC-ENTRY-002] entry {id} not found")]
    MissingEntry { id: EntryId },

    /// [BC-ENTRY-003] Source or destination position out of range or inconsistent
    #[error("[BC-ENTRY-003] invalid source or destination position {position}")]
    InvalidPosition { position: u64 },

    /// [BC-ENTRY-004] Source and destination do not point at each other
    #[error("[BC-ENTRY-004] mismatched reference")]
    MismatchedReference,

    /// [BC-ENTRY-005] Source and destination carry different values
    #[error("[BC-ENTRY-005] mismatched value")]
    MismatchedValue,

    /// [BC-ENTRY-006] Version-1 entry with a non-zero extension hash
    #[error("[BC-ENTRY-006] non-empty extension hash on {entry_type}")]
    NonemptyExtensionHash { entry_type: &'static str },

    // ============================================================
    // Transaction Errors (BC-TX-*)
    // ============================================================
    /// [BC-TX-001] Unsupported transaction version
    #[error("[BC-TX-001] invalid transaction version {version}")]
    TxVersion { version: u64 },

    /// [BC-TX-002] Version-1 transaction without results
    #[error("[BC-TX-002] transaction has no results")]
    EmptyResults,

    /// [BC-TX-003] Time bounds are inverted or outside a time range
    #[error("[BC-TX-003] bad time range")]
    BadTimeRange,

    // ============================================================
    // Issuance Errors (BC-ISS-*)
    // ============================================================
    /// [BC-ISS-001] Issued asset does not match its definition
    #[error("[BC-ISS-001] mismatched asset id")]
    MismatchedAssetId,

    /// [BC-ISS-002] Asset defined on another blockchain
    #[error("[BC-ISS-002] wrong blockchain")]
    WrongBlockchain,

    /// [BC-ISS-003] Transaction window wider than the issuance window
    #[error("[BC-ISS-003] transaction time range exceeds issuance window of {window_ms}ms")]
    IssuanceWindow { window_ms: u64 },

    // ============================================================
    // Value Routing Errors (BC-MUX-*)
    // ============================================================
    /// [BC-MUX-001] Adding a source amount overflowed the parity
    #[error("[BC-MUX-001] adding mux source {index} of asset {asset} overflows int64")]
    ArithmeticOverflow { asset: AssetId, index: usize },

    /// [BC-MUX-002] Subtracting a destination amount underflowed the parity
    #[error("[BC-MUX-002] subtracting mux destination {index} of asset {asset} underflows int64")]
    ArithmeticUnderflow { asset: AssetId, index: usize },

    /// [BC-MUX-003] Destination asset never appeared among the sources
    #[error("[BC-MUX-003] mux destination {index}, asset {asset}, has no corresponding source")]
    NoMatchingSource { asset: AssetId, index: usize },

    /// [BC-MUX-004] Non-zero residual parity
    #[error("[BC-MUX-004] unbalanced: asset {asset} sources - destinations = {residual}")]
    Unbalanced { asset: AssetId, residual: i64 },

    // ============================================================
    // Nonce Errors (BC-NONCE-*)
    // ============================================================
    /// [BC-NONCE-001] Time range bound left at zero
    #[error("[BC-NONCE-001] timerange has one or two bounds set to zero")]
    ZeroTimeRange,

    // ============================================================
    // Block Errors (BC-BLOCK-*)
    // ============================================================
    /// [BC-BLOCK-001] Block version lower than its predecessor's
    #[error("[BC-BLOCK-001] version regression: {current} after {previous}")]
    VersionRegression { previous: u64, current: u64 },

    /// [BC-BLOCK-002] Height does not follow the previous block
    #[error("[BC-BLOCK-002] misordered block height: expected {expected}, got {actual}")]
    MisorderedBlockHeight { expected: u64, actual: u64 },

    /// [BC-BLOCK-003] Previous block id does not match
    #[error("[BC-BLOCK-003] mismatched block")]
    MismatchedBlock,

    /// [BC-BLOCK-004] Timestamp not after the previous block's
    #[error("[BC-BLOCK-004] misordered block time")]
    MisorderedBlockTime,

    /// [BC-BLOCK-005] Non-initial block without a predecessor
    #[error("[BC-BLOCK-005] no previous block")]
    NoPrevBlock,

    /// [BC-BLOCK-006] Transactions root does not match
    #[error("[BC-BLOCK-006] mismatched merkle root")]
    MismatchedMerkleRoot,

    /// [BC-BLOCK-007] Block time outside a transaction's time range
    #[error("[BC-BLOCK-007] block timestamp {timestamp_ms} outside transaction time range")]
    UntimelyTransaction { timestamp_ms: u64 },

    // ============================================================
    // Program Errors (BC-PROG-*)
    // ============================================================
    /// [BC-PROG-001] Guarding program rejected its witness
    #[error("[BC-PROG-001] program verification failed: {0}")]
    ProgramVerification(#[source] VmError),

    /// Positional annotation added while unwinding the traversal
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Wrap with a positional annotation
    pub fn context(self, context: impl Into<String>) -> Self {
        ValidationError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Innermost causal error
    pub fn root_cause(&self) -> &ValidationError {
        let mut err = self;
        while let ValidationError::Context { source, .. } = err {
            err = source;
        }
        err
    }

    /// Annotations from outermost to innermost
    pub fn context_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut err = self;
        while let ValidationError::Context { context, source } = err {
            path.push(context.as_str());
            err = source;
        }
        path
    }

    /// VM error behind a program verification failure
    pub fn vm_error(&self) -> Option<&VmError> {
        match self.root_cause() {
            ValidationError::ProgramVerification(e) => Some(e),
            _ => None,
        }
    }

    /// Stable code of the root cause
    pub fn code(&self) -> &'static str {
        match self.root_cause() {
            ValidationError::InvalidEntryType { .. } => "BC-ENTRY-001",
            ValidationError::MissingEntry { .. } => "BC-ENTRY-002",
            ValidationError::InvalidPosition { .. } => "BC-ENTRY-003",
            ValidationError::MismatchedReference => "BC-ENTRY-004",
            ValidationError::MismatchedValue => "BC-ENTRY-005",
            ValidationError::NonemptyExtensionHash { .. } => "BC-ENTRY-006",
            ValidationError::TxVersion { .. } => "BC-TX-001",
            ValidationError::EmptyResults => "BC-TX-002",
            ValidationError::BadTimeRange => "BC-TX-003",
            ValidationError::MismatchedAssetId => "BC-ISS-001",
            ValidationError::WrongBlockchain => "BC-ISS-002",
            ValidationError::IssuanceWindow { .. } => "BC-ISS-003",
            ValidationError::ArithmeticOverflow { .. } => "BC-MUX-001",
            ValidationError::ArithmeticUnderflow { .. } => "BC-MUX-002",
            ValidationError::NoMatchingSource { .. } => "BC-MUX-003",
            ValidationError::Unbalanced { .. } => "BC-MUX-004",
            ValidationError::ZeroTimeRange => "BC-NONCE-001",
            ValidationError::VersionRegression { .. } => "BC-BLOCK-001",
            ValidationError::MisorderedBlockHeight { .. } => "BC-BLOCK-002",
            ValidationError::MismatchedBlock => "BC-BLOCK-003",
            ValidationError::MisorderedBlockTime => "BC-BLOCK-004",
            ValidationError::NoPrevBlock => "BC-BLOCK-005",
            ValidationError::MismatchedMerkleRoot => "BC-BLOCK-006",
            ValidationError::UntimelyTransaction { .. } => "BC-BLOCK-007",
            ValidationError::ProgramVerification(_) => "BC-PROG-001",
            // root_cause never returns Context
            ValidationError::Context { .. } => "BC-CTX-000",
        }
    }
}

/// Extension for annotating results as they propagate
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> ValidationResult<T>;

    fn with_context<F, S>(self, f: F) -> ValidationResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for ValidationResult<T> {
    fn context(self, context: impl Into<String>) -> ValidationResult<T> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<F, S>(self, f: F) -> ValidationResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| e.context(f()))
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// [BC-CFG-001] Field is not valid hex of the right length
    #[error("[BC-CFG-001] {field} is not a valid 32-byte hex string")]
    InvalidHex { field: &'static str },

    /// [BC-CFG-002] Quorum outside 1..=signers
    #[error("[BC-CFG-002] quorum {quorum} invalid for {signers} signers")]
    InvalidQuorum { quorum: usize, signers: usize },

    /// [BC-CFG-003] Run limit must be positive
    #[error("[BC-CFG-003] vm run limit must be positive, got {0}")]
    InvalidRunLimit(i64),

    /// [BC-CFG-004] Signer key is not a valid ed25519 public key
    #[error("[BC-CFG-004] signer key {index} is not a valid ed25519 public key")]
    InvalidSignerKey { index: usize },
}
