//! Integration tests for transaction and block validation
//!
//! Graphs are assembled with `TxBuilder` and validated end to end.

use assert_matches::assert_matches;
use bc_core::config::NetworkParams;
use bc_core::entries::EntryBody;
use bc_core::merkle::transactions_root;
use bc_core::{
    find_mux, sig_hash, validate_block, validate_tx, AssetAmount, AssetDefinition, AssetId,
    BlockEntries, BlockHeader, Entry, EntryId, Hash, Output, Program, TxBuilder, TxEntries,
    ValidationContext, ValidationError, ValueSource,
};
use bc_vm::{Builder, Op, VmConfig, VmError};
use ed25519_dalek::{Signer, SigningKey};

fn definition() -> AssetDefinition {
    AssetDefinition::new(EntryId::zero(), Program::trivial(), Hash::zero())
}

fn asset() -> AssetId {
    definition().asset_id()
}

fn ctx() -> ValidationContext {
    ValidationContext::default()
}

fn issue_and_split(amounts: &[u64], issued: u64) -> TxEntries {
    let mut builder = TxBuilder::new().time_range(1_000, 2_000).issue(definition(), issued, vec![]);
    for amount in amounts {
        builder = builder.output(AssetAmount::new(asset(), *amount), Program::trivial(), Hash::zero());
    }
    builder.build()
}

// ============ Value Routing ============

#[test]
fn test_balanced_split_validates() {
    let tx = issue_and_split(&[60, 40], 100);
    assert!(validate_tx(&ctx(), &tx).is_ok());
}

#[test]
fn test_unbalanced_split_reports_residual() {
    let tx = issue_and_split(&[60, 41], 100);
    let err = validate_tx(&ctx(), &tx).unwrap_err();
    assert_eq!(
        err.root_cause(),
        &ValidationError::Unbalanced {
            asset: asset(),
            residual: -1
        }
    );
    assert_eq!(err.code(), "BC-MUX-004");
    assert_eq!(err.context_path()[0], "checking result 0");
}

#[test]
fn test_perturbing_any_amount_fails() {
    for (amounts, issued) in [(vec![61, 40], 100), (vec![59, 40], 100), (vec![60, 40], 99)] {
        let err = validate_tx(&ctx(), &issue_and_split(&amounts, issued)).unwrap_err();
        assert_matches!(err.root_cause(), ValidationError::Unbalanced { .. });
    }
}

#[test]
fn test_source_overflow() {
    let tx = TxBuilder::new()
        .time_range(1_000, 2_000)
        .issue(definition(), i64::MAX as u64, vec![])
        .issue(definition(), 1, vec![])
        .output(AssetAmount::new(asset(), 1), Program::trivial(), Hash::zero())
        .build();
    let err = validate_tx(&ctx(), &tx).unwrap_err();
    assert_eq!(
        err.root_cause(),
        &ValidationError::ArithmeticOverflow {
            asset: asset(),
            index: 1
        }
    );
}

#[test]
fn test_multi_asset_retirement() {
    let other = AssetDefinition::new(EntryId::zero(), Program::trivial(), Hash([2; 32]));
    let other_asset = other.asset_id();
    let tx = TxBuilder::new()
        .time_range(1_000, 2_000)
        .issue(definition(), 10, vec![])
        .issue(other, 5, vec![])
        .output(AssetAmount::new(asset(), 10), Program::trivial(), Hash::zero())
        .retire(AssetAmount::new(other_asset, 5), Hash::zero())
        .build();
    assert!(validate_tx(&ctx(), &tx).is_ok());
}

// ============ Header Rules ============

#[test]
fn test_empty_results_rejected() {
    let tx = TxBuilder::new().time_range(1_000, 2_000).build();
    assert_eq!(validate_tx(&ctx(), &tx), Err(ValidationError::EmptyResults));
}

#[test]
fn test_version_must_match_block_version() {
    let tx = TxBuilder::new()
        .version(2)
        .time_range(1_000, 2_000)
        .issue(definition(), 1, vec![])
        .output(AssetAmount::new(asset(), 1), Program::trivial(), Hash::zero())
        .build();
    assert_eq!(
        validate_tx(&ctx(), &tx),
        Err(ValidationError::TxVersion { version: 2 })
    );

    let v2_block = ValidationContext::new(2, EntryId::zero());
    assert!(validate_tx(&v2_block, &tx).is_ok());
}

#[test]
fn test_inverted_window_rejected() {
    let tx = TxBuilder::new()
        .time_range(2_000, 1_000)
        .retire(AssetAmount::default(), Hash::zero())
        .build();
    assert_eq!(validate_tx(&ctx(), &tx), Err(ValidationError::BadTimeRange));
}

// ============ Issuance Rules ============

#[test]
fn test_wrong_blockchain() {
    let tx = issue_and_split(&[1], 1);
    let other_chain = ValidationContext::new(1, EntryId(Hash([7; 32])));
    let err = validate_tx(&other_chain, &tx).unwrap_err();
    assert_eq!(err.root_cause(), &ValidationError::WrongBlockchain);
}

#[test]
fn test_issuance_window() {
    let tx = issue_and_split(&[1], 1);
    assert!(validate_tx(&ctx().with_issuance_window(1_000), &tx).is_ok());
    let err = validate_tx(&ctx().with_issuance_window(999), &tx).unwrap_err();
    assert_eq!(
        err.root_cause(),
        &ValidationError::IssuanceWindow { window_ms: 999 }
    );
}

#[test]
fn test_issuance_program_rejects() {
    let def = AssetDefinition::new(EntryId::zero(), Program::unspendable(), Hash::zero());
    let asset = def.asset_id();
    let tx = TxBuilder::new()
        .time_range(1_000, 2_000)
        .issue(def, 1, vec![])
        .output(AssetAmount::new(asset, 1), Program::trivial(), Hash::zero())
        .build();
    let err = validate_tx(&ctx(), &tx).unwrap_err();
    assert_eq!(err.vm_error(), Some(&VmError::Fail));
    assert!(err.context_path().contains(&"checking issuance program"));
}

// ============ Nonce Rules ============

#[test]
fn test_nonce_zero_time_range() {
    let tx = TxBuilder::new()
        .time_range(0, 2_000)
        .issue(definition(), 1, vec![])
        .output(AssetAmount::new(asset(), 1), Program::trivial(), Hash::zero())
        .build();
    let err = validate_tx(&ctx(), &tx).unwrap_err();
    assert_eq!(err.root_cause(), &ValidationError::ZeroTimeRange);
    assert!(err.context_path().contains(&"checking issuance anchor"));
}

// ============ Programs and Introspection ============

/// Program requiring Mux destination `index` to pay `amount` to `program`.
/// `asset` of `None` means the asset flowing out of the guarded entry.
fn covenant(index: i64, amount: i64, asset: Option<AssetId>, program: &Program) -> Program {
    let builder = Builder::new().add_int64(index).add_data(&[]).add_int64(amount);
    let builder = match asset {
        Some(asset) => builder.add_data(asset.as_bytes()),
        None => builder.add_op(Op::Asset),
    };
    let code = builder
        .add_int64(program.vm_version as i64)
        .add_data(&program.code)
        .add_op(Op::CheckOutput)
        .build();
    Program::new(code)
}

#[test]
fn test_checkoutput_covenant_on_issuance() {
    let payee = Program::new(vec![0x51, 0x51]);
    let def = AssetDefinition::new(EntryId::zero(), covenant(0, 60, None, &payee), Hash::zero());
    let asset = def.asset_id();

    let honest = TxBuilder::new()
        .time_range(1_000, 2_000)
        .issue(def.clone(), 100, vec![])
        .output(AssetAmount::new(asset, 60), payee, Hash::zero())
        .output(AssetAmount::new(asset, 40), Program::trivial(), Hash::zero())
        .build();
    assert!(validate_tx(&ctx(), &honest).is_ok());

    let swapped = TxBuilder::new()
        .time_range(1_000, 2_000)
        .issue(def, 100, vec![])
        .output(AssetAmount::new(asset, 40), Program::trivial(), Hash::zero())
        .output(AssetAmount::new(asset, 60), Program::new(vec![0x51, 0x51]), Hash::zero())
        .build();
    let err = validate_tx(&ctx(), &swapped).unwrap_err();
    assert_eq!(err.vm_error(), Some(&VmError::FalseResult));
    assert!(err.context_path().contains(&"checking issuance program"));
}

#[test]
fn test_checkoutput_on_spend() {
    let payee = Program::new(vec![0x51, 0x51]);
    let prior_asset = asset();
    let control = covenant(0, 7, Some(prior_asset), &payee);
    let prior = Output::new(
        ValueSource::new(EntryId(Hash([5; 32])), AssetAmount::new(prior_asset, 7), 0),
        control,
        Hash::zero(),
        0,
    );

    let pays = TxBuilder::new()
        .spend(prior.clone(), vec![])
        .output(AssetAmount::new(prior_asset, 7), payee, Hash::zero())
        .build();
    assert!(validate_tx(&ctx(), &pays).is_ok());

    let diverts = TxBuilder::new()
        .spend(prior, vec![])
        .output(AssetAmount::new(prior_asset, 7), Program::new(vec![0x51, 0x52]), Hash::zero())
        .build();
    let err = validate_tx(&ctx(), &diverts).unwrap_err();
    assert_eq!(err.vm_error(), Some(&VmError::FalseResult));
    assert!(err.context_path().contains(&"checking control program"));
}

#[test]
fn test_checkoutput_legacy_retirement() {
    let legacy = Program::new(vec![Op::Fail.byte()]);
    let control = covenant(0, 7, None, &legacy);
    let prior = Output::new(
        ValueSource::new(EntryId(Hash([5; 32])), AssetAmount::new(asset(), 7), 0),
        control,
        Hash::zero(),
        0,
    );
    let tx = TxBuilder::new()
        .spend(prior, vec![])
        .retire(AssetAmount::new(asset(), 7), Hash::zero())
        .build();
    assert!(validate_tx(&ctx(), &tx).is_ok());
}

#[test]
fn test_spend_signature() {
    let key = SigningKey::from_bytes(&[11; 32]);
    let control = Program::new(
        Builder::new()
            .add_op(Op::TxSigHash)
            .add_data(key.verifying_key().as_bytes())
            .add_op(Op::CheckSig)
            .build(),
    );
    let prior = Output::new(
        ValueSource::new(EntryId(Hash([5; 32])), AssetAmount::new(asset(), 3), 0),
        control,
        Hash::zero(),
        0,
    );

    let mut tx = TxBuilder::new()
        .spend(prior, vec![])
        .output(AssetAmount::new(asset(), 3), Program::trivial(), Hash::zero())
        .build();
    let spend_id = tx.inputs()[0];
    let unsigned = validate_tx(&ctx(), &tx).unwrap_err();
    assert_matches!(unsigned.vm_error(), Some(VmError::DataStackUnderflow));

    let msg = sig_hash(&spend_id, &tx.id());
    let sig = key.sign(msg.as_bytes()).to_bytes().to_vec();
    assert!(tx.set_arguments(&spend_id, vec![sig]));
    assert_eq!(tx.inputs()[0], spend_id);
    assert!(validate_tx(&ctx(), &tx).is_ok());
}

#[test]
fn test_run_limit_applies_to_entry_programs() {
    let spin = Program::new(Builder::new().add_jump(Op::Jump, 0).build());
    let tx = TxBuilder::new()
        .time_range(1_000, 2_000)
        .mux_program(spin, vec![])
        .issue(definition(), 1, vec![])
        .output(AssetAmount::new(asset(), 1), Program::trivial(), Hash::zero())
        .build();
    let tight = ctx().with_vm_config(VmConfig::with_run_limit(50));
    let err = validate_tx(&tight, &tx).unwrap_err();
    assert_matches!(err.vm_error(), Some(VmError::BudgetExceeded { .. }));
    assert!(err.context_path().contains(&"checking mux program"));
}

// ============ Graph Structure ============

#[test]
fn test_missing_spent_output() {
    let prior = Output::new(
        ValueSource::new(EntryId(Hash([5; 32])), AssetAmount::new(asset(), 3), 0),
        Program::trivial(),
        Hash::zero(),
        0,
    );
    let prior_id = prior.entry_id();
    let built = TxBuilder::new()
        .spend(prior, vec![])
        .output(AssetAmount::new(asset(), 3), Program::trivial(), Hash::zero())
        .build();
    let without_prior: Vec<Entry> = built
        .iter()
        .filter(|(id, e)| **id != prior_id && !matches!(e, Entry::TxHeader(_)))
        .map(|(_, e)| e.clone())
        .collect();
    let tx = TxEntries::new(built.header().clone(), without_prior);

    let err = validate_tx(&ctx(), &tx).unwrap_err();
    assert_eq!(err.root_cause(), &ValidationError::MissingEntry { id: prior_id });
}

#[test]
fn test_witness_does_not_change_tx_id() {
    let mut tx = issue_and_split(&[60, 40], 100);
    let id = tx.id();
    let mux = find_mux(&tx).unwrap();
    assert!(tx.set_arguments(&mux, vec![vec![1, 2, 3]]));
    assert_eq!(tx.id(), id);
    let output = tx.header().body.results[0];
    assert!(!tx.set_arguments(&output, vec![]));
}

// ============ Blocks ============

fn signers() -> Vec<SigningKey> {
    (1..=3).map(|seed| SigningKey::from_bytes(&[seed; 32])).collect()
}

fn consensus_params() -> NetworkParams {
    NetworkParams {
        quorum: 2,
        signer_pubkeys: signers()
            .iter()
            .map(|k| hex::encode(k.verifying_key().to_bytes()))
            .collect(),
        ..Default::default()
    }
}

fn block(height: u64, prev: EntryId, timestamp_ms: u64, txs: Vec<TxEntries>) -> BlockEntries {
    let program = consensus_params().consensus_program().unwrap();
    let mut header = BlockHeader::new(1, height, prev, timestamp_ms, program.code);
    let ids: Vec<EntryId> = txs.iter().map(TxEntries::id).collect();
    header.body.transactions_root = transactions_root(&ids);
    BlockEntries::new(header, txs)
}

fn sign_block(block: &mut BlockEntries, keys: &[&SigningKey]) {
    let id = block.id();
    block.header.witness.arguments = keys
        .iter()
        .map(|k| k.sign(id.as_bytes()).to_bytes().to_vec())
        .collect();
}

#[test]
fn test_block_chain_with_multisig() {
    let genesis = block(1, EntryId::zero(), 1_000, vec![]);
    assert!(validate_block(&ctx(), &genesis, None).is_ok());

    let keys = signers();
    let mut next = block(2, genesis.id(), 1_500, vec![issue_and_split(&[60, 40], 100)]);
    sign_block(&mut next, &[&keys[0], &keys[2]]);
    assert!(validate_block(&ctx(), &next, Some(&genesis.header)).is_ok());

    // Signatures out of signer order do not satisfy the program
    sign_block(&mut next, &[&keys[2], &keys[0]]);
    let err = validate_block(&ctx(), &next, Some(&genesis.header)).unwrap_err();
    assert_eq!(err.vm_error(), Some(&VmError::FalseResult));
    assert_eq!(err.context_path(), vec!["checking block consensus program"]);
}

#[test]
fn test_block_linkage_rules() {
    let genesis = block(1, EntryId::zero(), 1_000, vec![]);
    let prev = Some(&genesis.header);

    let wrong_height = block(3, genesis.id(), 1_500, vec![]);
    assert_eq!(
        validate_block(&ctx(), &wrong_height, prev),
        Err(ValidationError::MisorderedBlockHeight {
            expected: 2,
            actual: 3
        })
    );

    let wrong_prev = block(2, EntryId(Hash([1; 32])), 1_500, vec![]);
    assert_eq!(
        validate_block(&ctx(), &wrong_prev, prev),
        Err(ValidationError::MismatchedBlock)
    );

    let stale = block(2, genesis.id(), 1_000, vec![]);
    assert_eq!(
        validate_block(&ctx(), &stale, prev),
        Err(ValidationError::MisorderedBlockTime)
    );

    let orphan = block(2, genesis.id(), 1_500, vec![]);
    assert_eq!(
        validate_block(&ctx(), &orphan, None),
        Err(ValidationError::NoPrevBlock)
    );
}

#[test]
fn test_block_transaction_rules() {
    let mut genesis = block(1, EntryId::zero(), 1_500, vec![issue_and_split(&[1], 1)]);
    genesis.header.body.transactions_root = Hash([9; 32]);
    assert_eq!(
        validate_block(&ctx(), &genesis, None),
        Err(ValidationError::MismatchedMerkleRoot)
    );

    let late = block(1, EntryId::zero(), 2_500, vec![issue_and_split(&[1], 1)]);
    let err = validate_block(&ctx(), &late, None).unwrap_err();
    assert_eq!(
        err.root_cause(),
        &ValidationError::UntimelyTransaction {
            timestamp_ms: 2_500
        }
    );
    assert_eq!(err.context_path(), vec!["checking transaction 0"]);
}

#[test]
fn test_block_extension_hash() {
    let mut genesis = block(1, EntryId::zero(), 1_000, vec![]);
    genesis.header.body.ext_hash = Hash([1; 32]);
    assert_matches!(
        validate_block(&ctx(), &genesis, None),
        Err(ValidationError::NonemptyExtensionHash {
            entry_type: "blockheader"
        })
    );
}
