//! Stack manipulation and byte-string opcodes

use crate::error::{VmError, VmResult};
use crate::vm::VirtualMachine;

pub(crate) fn op_to_alt_stack(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let item = vm.pop()?;
    vm.alt_stack.push(item);
    Ok(())
}

pub(crate) fn op_from_alt_stack(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let item = vm.alt_stack.pop().ok_or(VmError::AltStackUnderflow)?;
    vm.push(item)
}

pub(crate) fn op_depth(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let depth = i64::try_from(vm.data_stack.len()).map_err(|_| VmError::Range)?;
    vm.push_int64(depth)
}

pub(crate) fn op_drop(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    vm.pop().map(|_| ())
}

pub(crate) fn op_dup(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let top = vm.top()?.clone();
    vm.push(top)
}

pub(crate) fn op_nip(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let top = vm.pop()?;
    vm.pop()?;
    vm.push(top)
}

pub(crate) fn op_over(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let n = vm.data_stack.len();
    if n < 2 {
        return Err(VmError::DataStackUnderflow);
    }
    let item = vm.data_stack[n - 2].clone();
    vm.push(item)
}

pub(crate) fn op_swap(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let n = vm.data_stack.len();
    if n < 2 {
        return Err(VmError::DataStackUnderflow);
    }
    vm.data_stack.swap(n - 1, n - 2);
    Ok(())
}

pub(crate) fn op_cat(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let b = vm.pop()?;
    let mut a = vm.pop()?;
    a.extend_from_slice(&b);
    vm.push(a)
}

pub(crate) fn op_size(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let size = i64::try_from(vm.top()?.len()).map_err(|_| VmError::Range)?;
    vm.push_int64(size)
}

pub(crate) fn op_equal(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let b = vm.pop()?;
    let a = vm.pop()?;
    vm.push_bool(a == b)
}

pub(crate) fn op_equal_verify(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let b = vm.pop()?;
    let a = vm.pop()?;
    if a == b {
        Ok(())
    } else {
        Err(VmError::VerifyFailed)
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::Builder;
    use crate::context::Context;
    use crate::error::VmError;
    use crate::numeric::int64_bytes;
    use crate::ops::Op;
    use crate::vm::VirtualMachine;

    fn run_stack(code: &[u8]) -> Result<Vec<Vec<u8>>, VmError> {
        let mut vm = VirtualMachine::new(Context::Standalone, code, 10_000);
        vm.run()?;
        Ok(vm.data_stack().to_vec())
    }

    #[test]
    fn test_swap_and_over() {
        let code = Builder::new()
            .add_int64(1)
            .add_int64(2)
            .add_op(Op::Swap)
            .add_op(Op::Over)
            .build();
        let stack = run_stack(&code).unwrap();
        assert_eq!(stack, vec![int64_bytes(2), int64_bytes(1), int64_bytes(2)]);
    }

    #[test]
    fn test_alt_stack_round_trip() {
        let code = Builder::new()
            .add_int64(7)
            .add_op(Op::ToAltStack)
            .add_op(Op::Depth)
            .add_op(Op::FromAltStack)
            .build();
        let stack = run_stack(&code).unwrap();
        assert_eq!(stack, vec![Vec::new(), int64_bytes(7)]);
    }

    #[test]
    fn test_alt_stack_underflow() {
        let code = [Op::FromAltStack.byte()];
        assert_eq!(run_stack(&code), Err(VmError::AltStackUnderflow));
    }

    #[test]
    fn test_cat_and_size() {
        let code = Builder::new()
            .add_data(b"ab")
            .add_data(b"cd")
            .add_op(Op::Cat)
            .add_op(Op::Size)
            .build();
        let stack = run_stack(&code).unwrap();
        assert_eq!(stack, vec![b"abcd".to_vec(), int64_bytes(4)]);
    }

    #[test]
    fn test_nip_and_drop() {
        let code = Builder::new()
            .add_int64(1)
            .add_int64(2)
            .add_op(Op::Nip)
            .add_op(Op::Dup)
            .add_op(Op::Drop)
            .build();
        assert_eq!(run_stack(&code).unwrap(), vec![int64_bytes(2)]);
    }

    #[test]
    fn test_equal_verify() {
        let code = Builder::new()
            .add_data(b"x")
            .add_data(b"y")
            .add_op(Op::EqualVerify)
            .build();
        assert_eq!(run_stack(&code), Err(VmError::VerifyFailed));
    }

    #[test]
    fn test_underflow() {
        assert_eq!(run_stack(&[Op::Swap.byte()]), Err(VmError::DataStackUnderflow));
        assert_eq!(run_stack(&[Op::Dup.byte()]), Err(VmError::DataStackUnderflow));
    }
}
