//! Context opcodes
//!
//! Each opcode checks its context before charging cost, so a program
//! using one in the wrong context fails with [`VmError::Context`]
//! without consuming budget.

use crate::context::{BlockView, TxView};
use crate::error::{VmError, VmResult};
use crate::ops::Op;
use crate::vm::VirtualMachine;

const CHECK_OUTPUT_COST: i64 = 16;
const TX_SIG_HASH_COST: i64 = 256;
const INTROSPECTION_COST: i64 = 1;

fn tx_view<'a>(vm: &VirtualMachine<'a>) -> VmResult<&'a dyn TxView> {
    vm.context.tx().ok_or(VmError::Context)
}

fn block_view<'a>(vm: &VirtualMachine<'a>) -> VmResult<&'a dyn BlockView> {
    vm.context.block().ok_or(VmError::Context)
}

fn clamp_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// `index refdatahash amount assetid vmversion code CHECKOUTPUT`
pub(crate) fn op_check_output(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let tx = tx_view(vm)?;
    vm.apply_cost(CHECK_OUTPUT_COST)?;

    let code = vm.pop()?;
    let vm_version = vm.pop_int64()?;
    if vm_version < 0 {
        return Err(VmError::BadValue);
    }
    let asset_id = vm.pop()?;
    let amount = vm.pop_int64()?;
    if amount < 0 {
        return Err(VmError::BadValue);
    }
    let ref_data_hash = vm.pop()?;
    let index = vm.pop_int64()?;
    let index = u32::try_from(index).map_err(|_| VmError::BadValue)?;

    if !tx.dest_is_mux() {
        return Err(VmError::Context);
    }
    let dest = tx.mux_destination(index)?;

    let shape_matches = dest.asset_id.as_slice() == asset_id.as_slice()
        && dest.amount == amount as u64
        && (ref_data_hash.is_empty() || dest.ref_data_hash.as_slice() == ref_data_hash.as_slice());
    if !shape_matches {
        return vm.push_bool(false);
    }

    if dest.is_retirement {
        // Legacy retirements were outputs whose program began with FAIL.
        let legacy = vm_version == 1 && code.first() == Some(&Op::Fail.byte());
        return vm.push_bool(legacy);
    }

    let ok = dest.vm_version == vm_version as u64 && dest.code == code;
    vm.push_bool(ok)
}

pub(crate) fn op_asset(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let tx = tx_view(vm)?;
    vm.apply_cost(INTROSPECTION_COST)?;
    let asset_id = tx.asset_id().map_err(|_| VmError::Context)?;
    vm.push(asset_id.to_vec())
}

pub(crate) fn op_amount(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let tx = tx_view(vm)?;
    vm.apply_cost(INTROSPECTION_COST)?;
    let amount = tx.amount()?;
    vm.push_int64(amount as i64)
}

pub(crate) fn op_program(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    tx_view(vm)?;
    vm.apply_cost(INTROSPECTION_COST)?;
    vm.push(vm.program.to_vec())
}

pub(crate) fn op_min_time(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let tx = tx_view(vm)?;
    vm.apply_cost(INTROSPECTION_COST)?;
    vm.push_int64(tx.min_time_ms() as i64)
}

/// Zero means unbounded and reads as `i64::MAX`. Unlike MINTIME and
/// AMOUNT, which reinterpret the bits, larger bounds saturate.
pub(crate) fn op_max_time(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let tx = tx_view(vm)?;
    vm.apply_cost(INTROSPECTION_COST)?;
    let max_time = match tx.max_time_ms() {
        0 => i64::MAX,
        t => clamp_i64(t),
    };
    vm.push_int64(max_time)
}

pub(crate) fn op_ref_data_hash(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let tx = tx_view(vm)?;
    vm.apply_cost(INTROSPECTION_COST)?;
    let hash = tx.ref_data_hash()?;
    vm.push(hash.to_vec())
}

pub(crate) fn op_tx_ref_data_hash(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let tx = tx_view(vm)?;
    vm.apply_cost(INTROSPECTION_COST)?;
    vm.push(tx.tx_ref_data_hash().to_vec())
}

pub(crate) fn op_index(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let tx = tx_view(vm)?;
    vm.apply_cost(INTROSPECTION_COST)?;
    let index = tx.input_index()?;
    vm.push_int64(i64::from(index))
}

pub(crate) fn op_output_id(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let tx = tx_view(vm)?;
    vm.apply_cost(INTROSPECTION_COST)?;
    let id = tx.spent_output_id().map_err(|_| VmError::Context)?;
    vm.push(id.to_vec())
}

pub(crate) fn op_nonce(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let tx = tx_view(vm)?;
    vm.apply_cost(INTROSPECTION_COST)?;
    let anchor = tx.anchor_id()?;
    vm.push(anchor.to_vec())
}

pub(crate) fn op_tx_sig_hash(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let tx = tx_view(vm)?;
    vm.apply_cost(TX_SIG_HASH_COST)?;
    vm.push(tx.sig_hash().to_vec())
}

pub(crate) fn op_block_hash(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let block = block_view(vm)?;
    vm.apply_cost(INTROSPECTION_COST)?;
    vm.push(block.block_hash().to_vec())
}

pub(crate) fn op_next_program(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let block = block_view(vm)?;
    vm.apply_cost(INTROSPECTION_COST)?;
    vm.push(block.next_consensus_program().to_vec())
}

pub(crate) fn op_block_time(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let block = block_view(vm)?;
    vm.apply_cost(INTROSPECTION_COST)?;
    let ts = i64::try_from(block.timestamp_ms())
        .map_err(|_| VmError::Execution("block timestamp out of range".into()))?;
    vm.push_int64(ts)
}
