//! Validation Configuration
//!
//! Per-network parameters consumed when a validation context is built.
//! Supports loading from environment variables with the BC_ prefix.

use std::env;
use std::str::FromStr;

use bc_vm::{Builder, Op, Program, VmConfig, DEFAULT_RUN_LIMIT};
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{EntryId, Hash};
use crate::validation::ValidationContext;

/// One day
pub const DEFAULT_MAX_ISSUANCE_WINDOW_MS: u64 = 24 * 60 * 60 * 1000;

/// Block signer set and issuance policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParams {
    /// Widest transaction window an issuance may use; zero disables the check
    #[serde(default = "default_issuance_window")]
    pub max_issuance_window_ms: u64,
    /// Signatures required on each block
    #[serde(default)]
    pub quorum: usize,
    /// Hex-encoded ed25519 public keys of the block signers
    #[serde(default)]
    pub signer_pubkeys: Vec<String>,
}

fn default_issuance_window() -> u64 {
    DEFAULT_MAX_ISSUANCE_WINDOW_MS
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            max_issuance_window_ms: DEFAULT_MAX_ISSUANCE_WINDOW_MS,
            quorum: 0,
            signer_pubkeys: Vec::new(),
        }
    }
}

impl NetworkParams {
    fn signer_keys(&self) -> Result<Vec<[u8; 32]>, ConfigError> {
        self.signer_pubkeys
            .iter()
            .enumerate()
            .map(|(index, key)| {
                let bytes: [u8; 32] = hex::decode(key)
                    .ok()
                    .and_then(|b| b.try_into().ok())
                    .ok_or(ConfigError::InvalidSignerKey { index })?;
                VerifyingKey::from_bytes(&bytes).map_err(|_| ConfigError::InvalidSignerKey { index })?;
                Ok(bytes)
            })
            .collect()
    }

    /// `quorum`-of-n consensus program over the block hash.
    ///
    /// The next block's witness supplies `quorum` signatures in signer
    /// order. With no signers the program is trivially true.
    pub fn consensus_program(&self) -> Result<Program, ConfigError> {
        let keys = self.signer_keys()?;
        if keys.is_empty() {
            return Ok(Program::trivial());
        }

        let mut builder = Builder::new()
            .add_op(Op::BlockHash)
            .add_int64(self.quorum as i64);
        for key in &keys {
            builder = builder.add_data(key);
        }
        let code = builder
            .add_int64(keys.len() as i64)
            .add_op(Op::CheckMultiSig)
            .build();
        Ok(Program::new(code))
    }
}

/// Parsed value of `key`; unset or malformed values read as `None`
fn parse_var<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    var(key).and_then(|s| s.trim().parse().ok())
}

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub block_version: u64,
    /// Hex id of the chain's initial block
    pub initial_block_id: String,
    #[serde(default = "default_run_limit")]
    pub vm_run_limit: i64,
    #[serde(default)]
    pub network: NetworkParams,
}

fn default_run_limit() -> i64 {
    DEFAULT_RUN_LIMIT
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            block_version: 1,
            initial_block_id: Hash::zero().to_hex(),
            vm_run_limit: DEFAULT_RUN_LIMIT,
            network: NetworkParams::default(),
        }
    }
}

impl ValidationConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - BC_BLOCK_VERSION: Block version (default 1)
    /// - BC_INITIAL_BLOCK_ID: Hex id of the initial block
    /// - BC_VM_RUN_LIMIT: VM cost budget per program
    /// - BC_MAX_ISSUANCE_WINDOW_MS: Issuance window in milliseconds
    /// - BC_QUORUM: Required block signatures
    /// - BC_SIGNER_PUBKEYS: Comma-separated hex ed25519 keys
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            block_version: parse_var(&var, "BC_BLOCK_VERSION").unwrap_or(defaults.block_version),
            initial_block_id: var("BC_INITIAL_BLOCK_ID").unwrap_or(defaults.initial_block_id),
            vm_run_limit: parse_var(&var, "BC_VM_RUN_LIMIT").unwrap_or(defaults.vm_run_limit),
            network: NetworkParams {
                max_issuance_window_ms: parse_var(&var, "BC_MAX_ISSUANCE_WINDOW_MS")
                    .unwrap_or(defaults.network.max_issuance_window_ms),
                quorum: parse_var(&var, "BC_QUORUM").unwrap_or(defaults.network.quorum),
                signer_pubkeys: var("BC_SIGNER_PUBKEYS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|k| !k.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
        }
    }

    /// Reject malformed values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.initial_block_id()?;
        if self.vm_run_limit <= 0 {
            return Err(ConfigError::InvalidRunLimit(self.vm_run_limit));
        }

        let signers = self.network.signer_pubkeys.len();
        let quorum = self.network.quorum;
        let open_network = signers == 0 && quorum == 0;
        if !open_network && (quorum == 0 || quorum > signers) {
            return Err(ConfigError::InvalidQuorum { quorum, signers });
        }
        self.network.signer_keys()?;
        Ok(())
    }

    pub fn initial_block_id(&self) -> Result<EntryId, ConfigError> {
        Hash::from_hex(&self.initial_block_id)
            .map(EntryId)
            .ok_or(ConfigError::InvalidHex {
                field: "initial_block_id",
            })
    }

    pub fn vm_config(&self) -> VmConfig {
        VmConfig::with_run_limit(self.vm_run_limit)
    }

    /// Context for validating a transaction outside a block.
    /// `timestamp_ms` of zero skips the timeliness check.
    pub fn tx_context(&self, timestamp_ms: u64) -> Result<ValidationContext, ConfigError> {
        self.validate()?;
        Ok(ValidationContext::new(self.block_version, self.initial_block_id()?)
            .with_vm_config(self.vm_config())
            .with_issuance_window(self.network.max_issuance_window_ms)
            .with_timestamp(timestamp_ms))
    }

    /// Context for validating blocks; the block supplies its own time
    pub fn block_context(&self) -> Result<ValidationContext, ConfigError> {
        self.tx_context(0)
    }
}
