//! Interpreter
//!
//! The VM executes a program against a data stack under a run limit.
//! Witness arguments are pushed before the first instruction; the
//! program succeeds when it runs to completion with a truthy stack top.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::context::Context;
use crate::error::{VmError, VmResult};
use crate::numeric::{as_bool, as_int64, bool_bytes, int64_bytes};
use crate::ops::{parse_op, Instruction, Op};
use crate::{arith, control, crypto, introspection, stack};

/// Only VM version understood by this interpreter
pub const VM_VERSION: u64 = 1;

/// Default run limit
pub const DEFAULT_RUN_LIMIT: i64 = 10_000;

/// A guarding program
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Program {
    /// VM version the code targets
    pub vm_version: u64,
    /// Bytecode
    #[serde(with = "hex_bytes")]
    pub code: Vec<u8>,
}

impl Program {
    /// Version 1 program
    pub fn new(code: Vec<u8>) -> Self {
        Self {
            vm_version: VM_VERSION,
            code,
        }
    }

    /// Program that accepts any witness
    pub fn trivial() -> Self {
        Self::new(vec![Op::Op1.byte()])
    }

    /// Program that always fails
    pub fn unspendable() -> Self {
        Self::new(vec![Op::Fail.byte()])
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// VM execution limits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmConfig {
    /// Cost budget for one program run
    pub run_limit: i64,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            run_limit: DEFAULT_RUN_LIMIT,
        }
    }
}

impl VmConfig {
    pub fn with_run_limit(run_limit: i64) -> Self {
        Self { run_limit }
    }
}

/// Verify `program` against `args` in `context`
pub fn verify(
    context: Context<'_>,
    program: &Program,
    args: &[Vec<u8>],
    config: &VmConfig,
) -> VmResult<()> {
    if program.vm_version != VM_VERSION {
        return Err(VmError::UnsupportedVm(program.vm_version));
    }

    let mut vm = VirtualMachine::new(context, &program.code, config.run_limit);
    for arg in args {
        vm.push(arg.clone())?;
    }

    let result = vm.run().and_then(|()| vm.final_result());
    if let Err(ref e) = result {
        debug!(
            context = context.name(),
            pc = vm.pc,
            run_limit = vm.run_limit,
            error = %e,
            "program verification failed"
        );
    }
    result
}

/// Stack machine state for a single program run
pub struct VirtualMachine<'a> {
    pub(crate) context: Context<'a>,
    pub(crate) program: &'a [u8],
    pub(crate) pc: u32,
    pub(crate) next_pc: u32,
    pub(crate) run_limit: i64,
    pub(crate) data_stack: Vec<Vec<u8>>,
    pub(crate) alt_stack: Vec<Vec<u8>>,
    expansion_reserved: bool,
}

impl<'a> VirtualMachine<'a> {
    /// Create a VM positioned at the start of `program`
    pub fn new(context: Context<'a>, program: &'a [u8], run_limit: i64) -> Self {
        Self {
            context,
            program,
            pc: 0,
            next_pc: 0,
            run_limit,
            data_stack: Vec::new(),
            alt_stack: Vec::new(),
            expansion_reserved: context.expansion_reserved(),
        }
    }

    /// Remaining budget
    pub fn run_limit(&self) -> i64 {
        self.run_limit
    }

    /// Current data stack, bottom first
    pub fn data_stack(&self) -> &[Vec<u8>] {
        &self.data_stack
    }

    /// Execute until the program counter leaves the program
    pub fn run(&mut self) -> VmResult<()> {
        while (self.pc as usize) < self.program.len() {
            self.step()?;
        }
        Ok(())
    }

    /// Execute one instruction
    pub fn step(&mut self) -> VmResult<()> {
        let inst = parse_op(self.program, self.pc)?;
        self.next_pc = self.pc + inst.len;

        trace!(
            pc = self.pc,
            opcode = inst.opcode,
            run_limit = self.run_limit,
            "step"
        );

        self.execute(&inst)?;
        self.pc = self.next_pc;
        Ok(())
    }

    fn final_result(&self) -> VmResult<()> {
        match self.data_stack.last() {
            Some(top) if as_bool(top) => Ok(()),
            _ => Err(VmError::FalseResult),
        }
    }

    fn execute(&mut self, inst: &Instruction<'_>) -> VmResult<()> {
        if inst.is_push_data() {
            self.apply_cost(1 + inst.data.len() as i64)?;
            return self.push(inst.data.to_vec());
        }

        let op = match inst.op() {
            Some(op) => op,
            None => {
                if self.expansion_reserved {
                    return Err(VmError::DisallowedOpcode(inst.opcode));
                }
                return self.apply_cost(1);
            }
        };

        self.apply_cost(op.cost())?;

        if let Some(n) = op.small_int_value() {
            return self.push_int64(n);
        }

        match op {
            Op::False => self.push(Vec::new()),
            Op::Negate1 => self.push_int64(-1),
            Op::Nop => Ok(()),
            Op::Jump => control::op_jump(self, inst.data),
            Op::JumpIf => control::op_jump_if(self, inst.data),
            Op::Verify => control::op_verify(self),
            Op::Fail => Err(VmError::Fail),
            Op::ToAltStack => stack::op_to_alt_stack(self),
            Op::FromAltStack => stack::op_from_alt_stack(self),
            Op::Depth => stack::op_depth(self),
            Op::Drop => stack::op_drop(self),
            Op::Dup => stack::op_dup(self),
            Op::Nip => stack::op_nip(self),
            Op::Over => stack::op_over(self),
            Op::Swap => stack::op_swap(self),
            Op::Cat => stack::op_cat(self),
            Op::Size => stack::op_size(self),
            Op::Equal => stack::op_equal(self),
            Op::EqualVerify => stack::op_equal_verify(self),
            Op::Add1 => arith::op_unary(self, |n| n.checked_add(1)),
            Op::Sub1 => arith::op_unary(self, |n| n.checked_sub(1)),
            Op::Negate => arith::op_unary(self, |n| n.checked_neg()),
            Op::Abs => arith::op_unary(self, |n| n.checked_abs()),
            Op::Not => arith::op_unary(self, |n| Some(i64::from(n == 0))),
            Op::NotEqual0 => arith::op_unary(self, |n| Some(i64::from(n != 0))),
            Op::Add => arith::op_binary(self, |x, y| x.checked_add(y)),
            Op::Sub => arith::op_binary(self, |x, y| x.checked_sub(y)),
            Op::BoolAnd => arith::op_binary(self, |x, y| Some(i64::from(x != 0 && y != 0))),
            Op::BoolOr => arith::op_binary(self, |x, y| Some(i64::from(x != 0 || y != 0))),
            Op::NumEqual => arith::op_binary(self, |x, y| Some(i64::from(x == y))),
            Op::NumEqualVerify => arith::op_num_equal_verify(self),
            Op::LessThan => arith::op_binary(self, |x, y| Some(i64::from(x < y))),
            Op::GreaterThan => arith::op_binary(self, |x, y| Some(i64::from(x > y))),
            Op::Min => arith::op_binary(self, |x, y| Some(x.min(y))),
            Op::Max => arith::op_binary(self, |x, y| Some(x.max(y))),
            Op::Within => arith::op_within(self),
            Op::Sha256 => crypto::op_sha256(self),
            Op::CheckSig => crypto::op_check_sig(self),
            Op::CheckMultiSig => crypto::op_check_multi_sig(self),
            Op::TxSigHash => introspection::op_tx_sig_hash(self),
            Op::BlockHash => introspection::op_block_hash(self),
            Op::CheckOutput => introspection::op_check_output(self),
            Op::Asset => introspection::op_asset(self),
            Op::Amount => introspection::op_amount(self),
            Op::Program => introspection::op_program(self),
            Op::MinTime => introspection::op_min_time(self),
            Op::MaxTime => introspection::op_max_time(self),
            Op::TxRefDataHash => introspection::op_tx_ref_data_hash(self),
            Op::RefDataHash => introspection::op_ref_data_hash(self),
            Op::Index => introspection::op_index(self),
            Op::OutputId => introspection::op_output_id(self),
            Op::Nonce => introspection::op_nonce(self),
            Op::NextProgram => introspection::op_next_program(self),
            Op::BlockTime => introspection::op_block_time(self),
            Op::PushData1 | Op::PushData2 | Op::PushData4 => Ok(()),
            Op::Op1
            | Op::Op2
            | Op::Op3
            | Op::Op4
            | Op::Op5
            | Op::Op6
            | Op::Op7
            | Op::Op8
            | Op::Op9
            | Op::Op10
            | Op::Op11
            | Op::Op12
            | Op::Op13
            | Op::Op14
            | Op::Op15
            | Op::Op16 => Ok(()),
        }
    }

    /// Charge `cost` against the run limit
    pub(crate) fn apply_cost(&mut self, cost: i64) -> VmResult<()> {
        if cost > self.run_limit {
            let remaining = self.run_limit;
            self.run_limit = 0;
            return Err(VmError::BudgetExceeded { cost, remaining });
        }
        self.run_limit -= cost;
        Ok(())
    }

    pub(crate) fn push(&mut self, item: Vec<u8>) -> VmResult<()> {
        self.data_stack.push(item);
        Ok(())
    }

    pub(crate) fn push_bool(&mut self, b: bool) -> VmResult<()> {
        self.push(bool_bytes(b))
    }

    pub(crate) fn push_int64(&mut self, n: i64) -> VmResult<()> {
        self.push(int64_bytes(n))
    }

    pub(crate) fn pop(&mut self) -> VmResult<Vec<u8>> {
        self.data_stack.pop().ok_or(VmError::DataStackUnderflow)
    }

    pub(crate) fn pop_int64(&mut self) -> VmResult<i64> {
        let bytes = self.pop()?;
        as_int64(&bytes)
    }

    pub(crate) fn top(&self) -> VmResult<&Vec<u8>> {
        self.data_stack.last().ok_or(VmError::DataStackUnderflow)
    }
}
