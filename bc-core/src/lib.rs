//! Entry Graph Validation Core
//!
//! Transactions are graphs of immutable, content-addressed entries.
//! Value flows from inputs (issuances and spends) through Mux entries
//! into results (outputs and retirements); each entry may carry a
//! program that must accept its witness arguments.
//!
//! # Modules
//!
//! - `types`: hashes, ids, value edges
//! - `canon`: canonical body encoding and entry ids
//! - `entries`: the closed set of entry variants and their checks
//! - `graph`: per-transaction entry arenas
//! - `validation`: recursive graph traversal and block rules
//! - `merkle`: transactions root
//! - `builder`: single-Mux transaction construction
//! - `config`: per-network parameters
//! - `logging`: tracing conventions and subscriber setup
//!
//! # Example
//!
//! ```rust
//! use bc_core::{AssetAmount, AssetDefinition, EntryId, Hash, Program, TxBuilder};
//! use bc_core::validation::{validate_tx, ValidationContext};
//!
//! let def = AssetDefinition::new(EntryId::zero(), Program::trivial(), Hash::zero());
//! let asset = def.asset_id();
//! let tx = TxBuilder::new()
//!     .time_range(1_000, 2_000)
//!     .issue(def, 100, vec![])
//!     .output(AssetAmount::new(asset, 60), Program::trivial(), Hash::zero())
//!     .output(AssetAmount::new(asset, 40), Program::trivial(), Hash::zero())
//!     .build();
//!
//! assert!(validate_tx(&ValidationContext::default(), &tx).is_ok());
//! ```

pub mod builder;
pub mod canon;
pub mod config;
pub mod entries;
pub mod error;
pub mod graph;
pub mod logging;
pub mod merkle;
pub mod types;
pub mod validation;

pub use builder::{find_mux, TxBuilder};
pub use config::{NetworkParams, ValidationConfig};
pub use entries::{
    AssetDefinition, BlockHeader, Entry, EntryBody, Issuance, Mux, Nonce, Output, Retirement,
    Spend, TimeRange, TxHeader,
};
pub use error::{ConfigError, ResultExt, ValidationError, ValidationResult};
pub use graph::{BlockEntries, TxEntries};
pub use merkle::{merkle_root, transactions_root};
pub use types::{AssetAmount, AssetId, EntryId, Hash, Program, ValueDestination, ValueSource};
pub use validation::{sig_hash, validate_block, validate_tx, ValidationContext, ValidationState};

/// Protocol version
pub const PROTOCOL_VERSION: &str = "1.0.0";
