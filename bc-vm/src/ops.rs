//! Opcode table and instruction decoding
//!
//! Bytes 0x01..=0x4b push that many following bytes. Bytes with no
//! assigned opcode are expansion no-ops.

use crate::error::{VmError, VmResult};

/// First direct-push opcode (pushes one byte)
pub const OP_DATA_1: u8 = 0x01;
/// Last direct-push opcode (pushes 75 bytes)
pub const OP_DATA_75: u8 = 0x4b;

/// Assigned opcodes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Op {
    False = 0x00,
    PushData1 = 0x4c,
    PushData2 = 0x4d,
    PushData4 = 0x4e,
    Negate1 = 0x4f,
    Op1 = 0x51,
    Op2 = 0x52,
    Op3 = 0x53,
    Op4 = 0x54,
    Op5 = 0x55,
    Op6 = 0x56,
    Op7 = 0x57,
    Op8 = 0x58,
    Op9 = 0x59,
    Op10 = 0x5a,
    Op11 = 0x5b,
    Op12 = 0x5c,
    Op13 = 0x5d,
    Op14 = 0x5e,
    Op15 = 0x5f,
    Op16 = 0x60,

    Nop = 0x61,
    Jump = 0x63,
    JumpIf = 0x64,
    Verify = 0x69,
    Fail = 0x6a,

    ToAltStack = 0x6b,
    FromAltStack = 0x6c,
    Depth = 0x74,
    Drop = 0x75,
    Dup = 0x76,
    Nip = 0x77,
    Over = 0x78,
    Swap = 0x7c,

    Cat = 0x7e,
    Size = 0x82,

    Equal = 0x87,
    EqualVerify = 0x88,

    Add1 = 0x8b,
    Sub1 = 0x8c,
    Negate = 0x8f,
    Abs = 0x90,
    Not = 0x91,
    NotEqual0 = 0x92,
    Add = 0x93,
    Sub = 0x94,
    BoolAnd = 0x9a,
    BoolOr = 0x9b,
    NumEqual = 0x9c,
    NumEqualVerify = 0x9d,
    LessThan = 0x9f,
    GreaterThan = 0xa0,
    Min = 0xa3,
    Max = 0xa4,
    Within = 0xa5,

    Sha256 = 0xa8,
    CheckSig = 0xac,
    CheckMultiSig = 0xad,
    TxSigHash = 0xae,
    BlockHash = 0xaf,

    CheckOutput = 0xc1,
    Asset = 0xc2,
    Amount = 0xc3,
    Program = 0xc4,
    MinTime = 0xc5,
    MaxTime = 0xc6,
    TxRefDataHash = 0xc7,
    RefDataHash = 0xc8,
    Index = 0xc9,
    OutputId = 0xcb,
    Nonce = 0xcc,
    NextProgram = 0xcd,
    BlockTime = 0xce,
}

const SMALL_INTS: [Op; 16] = [
    Op::Op1,
    Op::Op2,
    Op::Op3,
    Op::Op4,
    Op::Op5,
    Op::Op6,
    Op::Op7,
    Op::Op8,
    Op::Op9,
    Op::Op10,
    Op::Op11,
    Op::Op12,
    Op::Op13,
    Op::Op14,
    Op::Op15,
    Op::Op16,
];

const ALL_OPS: [Op; 73] = [
    Op::False,
    Op::PushData1,
    Op::PushData2,
    Op::PushData4,
    Op::Negate1,
    Op::Op1,
    Op::Op2,
    Op::Op3,
    Op::Op4,
    Op::Op5,
    Op::Op6,
    Op::Op7,
    Op::Op8,
    Op::Op9,
    Op::Op10,
    Op::Op11,
    Op::Op12,
    Op::Op13,
    Op::Op14,
    Op::Op15,
    Op::Op16,
    Op::Nop,
    Op::Jump,
    Op::JumpIf,
    Op::Verify,
    Op::Fail,
    Op::ToAltStack,
    Op::FromAltStack,
    Op::Depth,
    Op::Drop,
    Op::Dup,
    Op::Nip,
    Op::Over,
    Op::Swap,
    Op::Cat,
    Op::Size,
    Op::Equal,
    Op::EqualVerify,
    Op::Add1,
    Op::Sub1,
    Op::Negate,
    Op::Abs,
    Op::Not,
    Op::NotEqual0,
    Op::Add,
    Op::Sub,
    Op::BoolAnd,
    Op::BoolOr,
    Op::NumEqual,
    Op::NumEqualVerify,
    Op::LessThan,
    Op::GreaterThan,
    Op::Min,
    Op::Max,
    Op::Within,
    Op::Sha256,
    Op::CheckSig,
    Op::CheckMultiSig,
    Op::TxSigHash,
    Op::BlockHash,
    Op::CheckOutput,
    Op::Asset,
    Op::Amount,
    Op::Program,
    Op::MinTime,
    Op::MaxTime,
    Op::TxRefDataHash,
    Op::RefDataHash,
    Op::Index,
    Op::OutputId,
    Op::Nonce,
    Op::NextProgram,
    Op::BlockTime,
];

impl Op {
    /// Opcode byte value
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Look up an assigned opcode
    pub fn from_byte(b: u8) -> Option<Self> {
        ALL_OPS.iter().copied().find(|op| op.byte() == b)
    }

    /// Opcode pushing the small integer `n` (1..=16)
    pub fn small_int(n: i64) -> Option<Self> {
        if (1..=16).contains(&n) {
            Some(SMALL_INTS[(n - 1) as usize])
        } else {
            None
        }
    }

    /// Value pushed by OP_1..OP_16
    pub fn small_int_value(self) -> Option<i64> {
        SMALL_INTS
            .iter()
            .position(|op| *op == self)
            .map(|i| i as i64 + 1)
    }

    /// Mnemonic
    pub fn name(self) -> &'static str {
        match self {
            Op::False => "FALSE",
            Op::PushData1 => "PUSHDATA1",
            Op::PushData2 => "PUSHDATA2",
            Op::PushData4 => "PUSHDATA4",
            Op::Negate1 => "1NEGATE",
            Op::Op1 => "1",
            Op::Op2 => "2",
            Op::Op3 => "3",
            Op::Op4 => "4",
            Op::Op5 => "5",
            Op::Op6 => "6",
            Op::Op7 => "7",
            Op::Op8 => "8",
            Op::Op9 => "9",
            Op::Op10 => "10",
            Op::Op11 => "11",
            Op::Op12 => "12",
            Op::Op13 => "13",
            Op::Op14 => "14",
            Op::Op15 => "15",
            Op::Op16 => "16",
            Op::Nop => "NOP",
            Op::Jump => "JUMP",
            Op::JumpIf => "JUMPIF",
            Op::Verify => "VERIFY",
            Op::Fail => "FAIL",
            Op::ToAltStack => "TOALTSTACK",
            Op::FromAltStack => "FROMALTSTACK",
            Op::Depth => "DEPTH",
            Op::Drop => "DROP",
            Op::Dup => "DUP",
            Op::Nip => "NIP",
            Op::Over => "OVER",
            Op::Swap => "SWAP",
            Op::Cat => "CAT",
            Op::Size => "SIZE",
            Op::Equal => "EQUAL",
            Op::EqualVerify => "EQUALVERIFY",
            Op::Add1 => "1ADD",
            Op::Sub1 => "1SUB",
            Op::Negate => "NEGATE",
            Op::Abs => "ABS",
            Op::Not => "NOT",
            Op::NotEqual0 => "0NOTEQUAL",
            Op::Add => "ADD",
            Op::Sub => "SUB",
            Op::BoolAnd => "BOOLAND",
            Op::BoolOr => "BOOLOR",
            Op::NumEqual => "NUMEQUAL",
            Op::NumEqualVerify => "NUMEQUALVERIFY",
            Op::LessThan => "LESSTHAN",
            Op::GreaterThan => "GREATERTHAN",
            Op::Min => "MIN",
            Op::Max => "MAX",
            Op::Within => "WITHIN",
            Op::Sha256 => "SHA256",
            Op::CheckSig => "CHECKSIG",
            Op::CheckMultiSig => "CHECKMULTISIG",
            Op::TxSigHash => "TXSIGHASH",
            Op::BlockHash => "BLOCKHASH",
            Op::CheckOutput => "CHECKOUTPUT",
            Op::Asset => "ASSET",
            Op::Amount => "AMOUNT",
            Op::Program => "PROGRAM",
            Op::MinTime => "MINTIME",
            Op::MaxTime => "MAXTIME",
            Op::TxRefDataHash => "TXREFDATAHASH",
            Op::RefDataHash => "REFDATAHASH",
            Op::Index => "INDEX",
            Op::OutputId => "OUTPUTID",
            Op::Nonce => "NONCE",
            Op::NextProgram => "NEXTPROGRAM",
            Op::BlockTime => "BLOCKTIME",
        }
    }

    /// Look up an opcode by mnemonic
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_OPS.iter().copied().find(|op| op.name() == name)
    }

    /// Fixed cost charged before the opcode runs.
    ///
    /// Context opcodes and the signature/hash opcodes report zero here
    /// and charge inside their handlers, after the context check.
    pub fn cost(self) -> i64 {
        match self {
            Op::Sha256
            | Op::CheckSig
            | Op::CheckMultiSig
            | Op::TxSigHash
            | Op::BlockHash
            | Op::CheckOutput
            | Op::Asset
            | Op::Amount
            | Op::Program
            | Op::MinTime
            | Op::MaxTime
            | Op::TxRefDataHash
            | Op::RefDataHash
            | Op::Index
            | Op::OutputId
            | Op::Nonce
            | Op::NextProgram
            | Op::BlockTime => 0,
            Op::Cat => 4,
            Op::Add | Op::Sub | Op::Min | Op::Max | Op::Within => 2,
            _ => 1,
        }
    }
}

/// A decoded instruction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction<'a> {
    /// Raw opcode byte
    pub opcode: u8,
    /// Push payload or jump immediate
    pub data: &'a [u8],
    /// Encoded length in bytes
    pub len: u32,
}

impl<'a> Instruction<'a> {
    /// Assigned opcode, if any
    pub fn op(&self) -> Option<Op> {
        Op::from_byte(self.opcode)
    }

    /// Whether this instruction pushes its payload
    pub fn is_push_data(&self) -> bool {
        (OP_DATA_1..=OP_DATA_75).contains(&self.opcode)
            || matches!(
                self.op(),
                Some(Op::PushData1) | Some(Op::PushData2) | Some(Op::PushData4)
            )
    }
}

/// Decode the instruction starting at `pc`
pub fn parse_op(code: &[u8], pc: u32) -> VmResult<Instruction<'_>> {
    let start = pc as usize;
    let opcode = *code.get(start).ok_or(VmError::ShortProgram { pc })?;
    let rest = &code[start + 1..];

    let (prefix, data_len) = match opcode {
        OP_DATA_1..=OP_DATA_75 => (0usize, opcode as usize),
        b if b == Op::PushData1.byte() => (1, read_len(rest, 1, pc)?),
        b if b == Op::PushData2.byte() => (2, read_len(rest, 2, pc)?),
        b if b == Op::PushData4.byte() => (4, read_len(rest, 4, pc)?),
        b if b == Op::Jump.byte() || b == Op::JumpIf.byte() => (0, 4),
        _ => {
            return Ok(Instruction {
                opcode,
                data: &[],
                len: 1,
            })
        }
    };

    let end = prefix
        .checked_add(data_len)
        .filter(|end| *end <= rest.len())
        .ok_or(VmError::ShortProgram { pc })?;
    let len = u32::try_from(1 + end).map_err(|_| VmError::ShortProgram { pc })?;

    Ok(Instruction {
        opcode,
        data: &rest[prefix..end],
        len,
    })
}

fn read_len(rest: &[u8], width: usize, pc: u32) -> VmResult<usize> {
    let bytes = rest.get(..width).ok_or(VmError::ShortProgram { pc })?;
    let mut buf = [0u8; 4];
    buf[..width].copy_from_slice(bytes);
    Ok(u32::from_le_bytes(buf) as usize)
}
