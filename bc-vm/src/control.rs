//! Control flow opcodes

use crate::error::{VmError, VmResult};
use crate::numeric::as_bool;
use crate::vm::VirtualMachine;

fn jump_target(vm: &VirtualMachine<'_>, imm: &[u8]) -> VmResult<u32> {
    let bytes: [u8; 4] = imm.try_into().map_err(|_| VmError::ShortProgram { pc: vm.pc })?;
    let target = u32::from_le_bytes(bytes);
    if target as usize > vm.program.len() {
        return Err(VmError::BadJumpTarget {
            target,
            len: vm.program.len(),
        });
    }
    Ok(target)
}

pub(crate) fn op_jump(vm: &mut VirtualMachine<'_>, imm: &[u8]) -> VmResult<()> {
    vm.next_pc = jump_target(vm, imm)?;
    Ok(())
}

pub(crate) fn op_jump_if(vm: &mut VirtualMachine<'_>, imm: &[u8]) -> VmResult<()> {
    let target = jump_target(vm, imm)?;
    let cond = vm.pop()?;
    if as_bool(&cond) {
        vm.next_pc = target;
    }
    Ok(())
}

pub(crate) fn op_verify(vm: &mut VirtualMachine<'_>) -> VmResult<()> {
    let top = vm.pop()?;
    if as_bool(&top) {
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
    use crate::ops::Op;
    use crate::vm::{verify, Program, VmConfig};

    fn run(code: Vec<u8>) -> Result<(), VmError> {
        verify(Context::Standalone, &Program::new(code), &[], &VmConfig::default())
    }

    #[test]
    fn test_jump_skips_fail() {
        // 0: JUMP 6, 5: FAIL, 6: 1
        let code = Builder::new()
            .add_jump(Op::Jump, 6)
            .add_op(Op::Fail)
            .add_op(Op::Op1)
            .build();
        assert!(run(code).is_ok());
    }

    #[test]
    fn test_jump_if_false_falls_through() {
        let code = Builder::new()
            .add_op(Op::False)
            .add_jump(Op::JumpIf, 7)
            .add_op(Op::Fail)
            .add_op(Op::Op1)
            .build();
        assert_eq!(run(code), Err(VmError::Fail));
    }

    #[test]
    fn test_jump_to_end_is_allowed() {
        let code = Builder::new().add_op(Op::Op1).add_jump(Op::Jump, 6).build();
        assert!(run(code).is_ok());
    }

    #[test]
    fn test_jump_past_end_rejected() {
        let code = Builder::new().add_jump(Op::Jump, 99).build();
        assert_eq!(run(code), Err(VmError::BadJumpTarget { target: 99, len: 5 }));
    }

    #[test]
    fn test_verify() {
        let ok = Builder::new().add_op(Op::Op1).add_op(Op::Verify).add_op(Op::Op1).build();
        assert!(run(ok).is_ok());

        let bad = Builder::new().add_op(Op::False).add_op(Op::Verify).build();
        assert_eq!(run(bad), Err(VmError::VerifyFailed));
    }
}
