//! Program assembly

use crate::numeric::int64_bytes;
use crate::ops::{Op, OP_DATA_75};

/// Assembles bytecode
#[derive(Clone, Debug, Default)]
pub struct Builder {
    code: Vec<u8>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_op(mut self, op: Op) -> Self {
        self.code.push(op.byte());
        self
    }

    /// Append the shortest push of `data`
    pub fn add_data(mut self, data: &[u8]) -> Self {
        let len = data.len();
        if len == 0 {
            self.code.push(Op::False.byte());
            return self;
        }
        if len <= OP_DATA_75 as usize {
            self.code.push(len as u8);
        } else if len <= u8::MAX as usize {
            self.code.push(Op::PushData1.byte());
            self.code.push(len as u8);
        } else if len <= u16::MAX as usize {
            self.code.push(Op::PushData2.byte());
            self.code.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.code.push(Op::PushData4.byte());
            self.code.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.code.extend_from_slice(data);
        self
    }

    /// Append the shortest push of `n`
    pub fn add_int64(self, n: i64) -> Self {
        match n {
            0 => self.add_op(Op::False),
            -1 => self.add_op(Op::Negate1),
            _ => match Op::small_int(n) {
                Some(op) => self.add_op(op),
                None => self.add_data(&int64_bytes(n)),
            },
        }
    }

    /// Append `JUMP` or `JUMPIF` to an absolute address
    pub fn add_jump(mut self, op: Op, target: u32) -> Self {
        debug_assert!(matches!(op, Op::Jump | Op::JumpIf));
        self.code.push(op.byte());
        self.code.extend_from_slice(&target.to_le_bytes());
        self
    }

    /// Append raw bytes
    pub fn add_raw(mut self, bytes: &[u8]) -> Self {
        self.code.extend_from_slice(bytes);
        self
    }

    /// Current length, for computing jump targets
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn build(self) -> Vec<u8> {
        self.code
    }
}
