//! Hash and signature opcodes
//!
//! Signatures are ed25519 over a 32-byte message. A malformed key or
//! signature in CHECKSIG yields false rather than an error.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::error::{VmError, VmResult};
use crate::vm::VirtualMachine;

/// Cost of one signature check
pub const SIG_CHECK_COST: i64 = 1024;

/// Minimum cost of SHA256
pub const MIN_HASH_COST: i64 = 64;

pub(crate) fn op_sha256(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let data = vm.pop()?;
    let len = i64::try_from(data.len()).map_err(|_| VmError::Range)?;
    vm.apply_cost(len.max(MIN_HASH_COST))?;
    vm.push(Sha256::digest(&data).to_vec())
}

pub(crate) fn op_check_sig(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    vm.apply_cost(SIG_CHECK_COST)?;
    let pubkey = vm.pop()?;
    let msg = vm.pop()?;
    let sig = vm.pop()?;
    if msg.len() != 32 {
        return Err(VmError::BadValue);
    }
    let ok = match parse_key(&pubkey) {
        Some(key) => verify_sig(&key, &msg, &sig),
        None => false,
    };
    vm.push_bool(ok)
}

/// Stack layout, bottom to top:
/// `sig_1 .. sig_k  msg  k  pubkey_1 .. pubkey_n  n`
///
/// Signatures must appear in the same order as the keys they match.
pub(crate) fn op_check_multi_sig(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let num_pubkeys = vm.pop_int64()?;
    if num_pubkeys < 0 {
        return Err(VmError::BadValue);
    }
    let cost = SIG_CHECK_COST
        .checked_mul(num_pubkeys)
        .ok_or(VmError::Range)?;
    vm.apply_cost(cost)?;

    let mut pubkeys = Vec::with_capacity(vm.data_stack.len().min(num_pubkeys as usize));
    for _ in 0..num_pubkeys {
        pubkeys.push(vm.pop()?);
    }
    pubkeys.reverse();

    let num_sigs = vm.pop_int64()?;
    if num_sigs < 0 || num_sigs > num_pubkeys {
        return Err(VmError::BadValue);
    }
    let msg = vm.pop()?;
    if msg.len() != 32 {
        return Err(VmError::BadValue);
    }

    let mut sigs = Vec::with_capacity(vm.data_stack.len().min(num_sigs as usize));
    for _ in 0..num_sigs {
        sigs.push(vm.pop()?);
    }
    sigs.reverse();

    let keys = pubkeys
        .iter()
        .map(|pk| parse_key(pk).ok_or(VmError::BadValue))
        .collect::<VmResult<Vec<_>>>()?;

    let mut sig_iter = sigs.iter().peekable();
    for key in &keys {
        match sig_iter.peek() {
            Some(sig) => {
                if verify_sig(key, &msg, sig) {
                    sig_iter.next();
                }
            }
            None => break,
        }
    }
    vm.push_bool(sig_iter.peek().is_none())
}

fn parse_key(bytes: &[u8]) -> Option<VerifyingKey> {
    let arr: [u8; 32] = bytes.try_into().ok()?;
    VerifyingKey::from_bytes(&arr).ok()
}

fn verify_sig(key: &VerifyingKey, msg: &[u8], sig: &[u8]) -> bool {
    match Signature::from_slice(sig) {
        Ok(sig) => key.verify(msg, &sig).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Signer, SigningKey};

    use super::*;
    use crate::builder::Builder;
    use crate::context::Context;
    use crate::ops::Op;
    use crate::vm::{verify, Program, VmConfig};

    fn key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    fn run(code: Vec<u8>, args: &[Vec<u8>]) -> VmResult<()> {
        verify(
            Context::Standalone,
            &Program::new(code),
            args,
            &VmConfig::default(),
        )
    }

    #[test]
    fn test_sha256() {
        let expected = Sha256::digest(b"abc").to_vec();
        let code = Builder::new()
            .add_data(b"abc")
            .add_op(Op::Sha256)
            .add_data(&expected)
            .add_op(Op::Equal)
            .build();
        assert!(run(code, &[]).is_ok());
    }

    #[test]
    fn test_check_sig() {
        let sk = key(1);
        let msg = [7u8; 32];
        let sig = sk.sign(&msg).to_bytes().to_vec();
        let code = Builder::new()
            .add_data(&msg)
            .add_data(sk.verifying_key().as_bytes())
            .add_op(Op::CheckSig)
            .build();
        assert!(run(code.clone(), &[sig]).is_ok());
        assert_eq!(run(code, &[vec![0u8; 64]]), Err(VmError::FalseResult));
    }

    #[test]
    fn test_check_sig_short_message() {
        let sk = key(1);
        let code = Builder::new()
            .add_data(b"short")
            .add_data(sk.verifying_key().as_bytes())
            .add_op(Op::CheckSig)
            .build();
        assert_eq!(run(code, &[vec![0u8; 64]]), Err(VmError::BadValue));
    }

    fn multisig_program(msg: &[u8; 32], quorum: i64, keys: &[SigningKey]) -> Vec<u8> {
        let mut b = Builder::new().add_data(msg).add_int64(quorum);
        for k in keys {
            b = b.add_data(k.verifying_key().as_bytes());
        }
        b.add_int64(keys.len() as i64)
            .add_op(Op::CheckMultiSig)
            .build()
    }

    #[test]
    fn test_check_multi_sig_two_of_three() {
        let keys = [key(1), key(2), key(3)];
        let msg = [9u8; 32];
        let code = multisig_program(&msg, 2, &keys);

        let sig1 = keys[0].sign(&msg).to_bytes().to_vec();
        let sig3 = keys[2].sign(&msg).to_bytes().to_vec();
        assert!(run(code.clone(), &[sig1.clone(), sig3.clone()]).is_ok());

        // out of key order
        assert_eq!(run(code, &[sig3, sig1]), Err(VmError::FalseResult));
    }

    #[test]
    fn test_check_multi_sig_too_many_sigs() {
        let keys = [key(1)];
        let msg = [9u8; 32];
        let code = multisig_program(&msg, 2, &keys);
        assert_eq!(run(code, &[vec![], vec![]]), Err(VmError::BadValue));
    }

    #[test]
    fn test_check_multi_sig_huge_key_count_underflows() {
        let code = Builder::new()
            .add_int64(1 << 40)
            .add_op(Op::CheckMultiSig)
            .build();
        let result = verify(
            Context::Standalone,
            &Program::new(code),
            &[],
            &VmConfig::with_run_limit(i64::MAX),
        );
        assert_eq!(result, Err(VmError::DataStackUnderflow));
    }

    #[test]
    fn test_check_sig_charges_budget() {
        let sk = key(1);
        let code = Builder::new()
            .add_data(&[0u8; 32])
            .add_data(sk.verifying_key().as_bytes())
            .add_op(Op::CheckSig)
            .build();
        let result = verify(
            Context::Standalone,
            &Program::new(code),
            &[vec![0u8; 64]],
            &VmConfig::with_run_limit(500),
        );
        assert!(matches!(result, Err(VmError::BudgetExceeded { cost: 1024, .. })));
    }
}
