//! Human-readable program rendering
//!
//! Pushes render as `0x<hex>`, jumps as `JUMP:<addr>`, unassigned bytes
//! as `NOPx<hex>`.

use crate::error::VmResult;
use crate::ops::{parse_op, Op};

/// Render `code` as space-separated mnemonics
pub fn disassemble(code: &[u8]) -> VmResult<String> {
    let mut parts = Vec::new();
    let mut pc = 0u32;
    while (pc as usize) < code.len() {
        let inst = parse_op(code, pc)?;
        let text = if inst.is_push_data() {
            format!("0x{}", hex::encode(inst.data))
        } else {
            match inst.op() {
                Some(op @ (Op::Jump | Op::JumpIf)) => {
                    let mut imm = [0u8; 4];
                    imm.copy_from_slice(inst.data);
                    format!("{}:{}", op.name(), u32::from_le_bytes(imm))
                }
                Some(op) => op.name().to_string(),
                None => format!("NOPx{:02x}", inst.opcode),
            }
        };
        parts.push(text);
        pc += inst.len;
    }
    Ok(parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    #[test]
    fn test_disassemble() {
        let code = Builder::new()
            .add_data(&[0xab, 0xcd])
            .add_op(Op::Dup)
            .add_jump(Op::JumpIf, 9)
            .add_op(Op::CheckOutput)
            .add_raw(&[0x50])
            .build();
        assert_eq!(
            disassemble(&code).unwrap(),
            "0xabcd DUP JUMPIF:9 CHECKOUTPUT NOPx50"
        );
    }

    #[test]
    fn test_disassemble_truncated() {
        assert!(disassemble(&[0x05, 0x01]).is_err());
    }
}
