//! Numeric opcodes
//!
//! All arithmetic is checked; leaving the i64 range is a range error.

use crate::error::{VmError, VmResult};
use crate::vm::VirtualMachine;

pub(crate) fn op_unary<F>(vm: &mut VirtualMachine<'_>, f: F) -> VmResult<()>
where
    F: FnOnce(i64) -> Option<i64>,
{
    let n = vm.pop_int64()?;
    let result = f(n).ok_or(VmError::Range)?;
    vm.push_int64(result)
}

pub(crate) fn op_binary<F>(vm: &mut VirtualMachine<'_>, f: F) -> VmResult<()>
where
    F: FnOnce(i64, i64) -> Option<i64>,
{
    let y = vm.pop_int64()?;
    let x = vm.pop_int64()?;
    let result = f(x, y).ok_or(VmError::Range)?;
    vm.push_int64(result)
}

pub(crate) fn op_num_equal_verify(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let y = vm.pop_int64()?;
    let x = vm.pop_int64()?;
    if x == y {
        Ok(())
    } else {
        Err(VmError::VerifyFailed)
    }
}

/// `x min max WITHIN` is true when `min <= x < max`
pub(crate) fn op_within(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let max = vm.pop_int64()?;
    let min = vm.pop_int64()?;
    let x = vm.pop_int64()?;
    vm.push_bool(min <= x && x < max)
}
