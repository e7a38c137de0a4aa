//! Transaction builder
//!
//! Assembles a complete single-Mux transaction graph: every input
//! (issuance or spend) feeds the Mux, and the Mux feeds every result
//! (output or retirement). Sources, destinations and positions are
//! wired both ways so the graph validates as long as the amounts
//! balance and the programs accept their arguments.

use bc_vm::{Builder, Op};
use tracing::debug;

use crate::entries::{
    AssetDefinition, Entry, EntryBody, Issuance, Mux, Nonce, Output, Retirement, Spend,
    TimeRange, TxHeader,
};
use crate::graph::TxEntries;
use crate::logging::operations;
use crate::types::{AssetAmount, EntryId, Hash, Program, ValueDestination, ValueSource};

#[derive(Clone, Debug)]
enum Input {
    Issuance {
        definition: AssetDefinition,
        amount: u64,
        data: Hash,
        arguments: Vec<Vec<u8>>,
        nonce_program: Option<Program>,
    },
    Spend {
        output: Output,
        data: Hash,
        arguments: Vec<Vec<u8>>,
    },
}

impl Input {
    fn value(&self) -> AssetAmount {
        match self {
            Input::Issuance {
                definition, amount, ..
            } => AssetAmount::new(definition.asset_id(), *amount),
            Input::Spend { output, .. } => output.body.source.value,
        }
    }
}

#[derive(Clone, Debug)]
enum TxResult {
    Output {
        value: AssetAmount,
        program: Program,
        data: Hash,
    },
    Retirement {
        value: AssetAmount,
        data: Hash,
    },
}

impl TxResult {
    fn value(&self) -> AssetAmount {
        match self {
            TxResult::Output { value, .. } | TxResult::Retirement { value, .. } => *value,
        }
    }
}

/// Builder for single-Mux transactions
#[derive(Clone, Debug)]
pub struct TxBuilder {
    version: u64,
    data: Hash,
    min_time_ms: u64,
    max_time_ms: u64,
    mux_program: Program,
    mux_arguments: Vec<Vec<u8>>,
    inputs: Vec<Input>,
    results: Vec<TxResult>,
}

impl Default for TxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TxBuilder {
    /// Version-1 transaction with an unbounded window and a trivial mux program
    pub fn new() -> Self {
        Self {
            version: 1,
            data: Hash::zero(),
            min_time_ms: 0,
            max_time_ms: 0,
            mux_program: Program::trivial(),
            mux_arguments: Vec::new(),
            inputs: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn data(mut self, data: Hash) -> Self {
        self.data = data;
        self
    }

    pub fn time_range(mut self, min_time_ms: u64, max_time_ms: u64) -> Self {
        self.min_time_ms = min_time_ms;
        self.max_time_ms = max_time_ms;
        self
    }

    pub fn mux_program(mut self, program: Program, arguments: Vec<Vec<u8>>) -> Self {
        self.mux_program = program;
        self.mux_arguments = arguments;
        self
    }

    /// Issue `amount` of the asset `definition` defines, anchored on a
    /// fresh nonce bound to the transaction window
    pub fn issue(self, definition: AssetDefinition, amount: u64, arguments: Vec<Vec<u8>>) -> Self {
        self.issue_with(definition, amount, Hash::zero(), arguments, None)
    }

    /// [`issue`](Self::issue) with reference data and an explicit nonce program
    pub fn issue_with(
        mut self,
        definition: AssetDefinition,
        amount: u64,
        data: Hash,
        arguments: Vec<Vec<u8>>,
        nonce_program: Option<Program>,
    ) -> Self {
        self.inputs.push(Input::Issuance {
            definition,
            amount,
            data,
            arguments,
            nonce_program,
        });
        self
    }

    /// Spend a prior `output`, which is carried in the built arena
    pub fn spend(mut self, output: Output, arguments: Vec<Vec<u8>>) -> Self {
        self.inputs.push(Input::Spend {
            output,
            data: Hash::zero(),
            arguments,
        });
        self
    }

    pub fn output(mut self, value: AssetAmount, program: Program, data: Hash) -> Self {
        self.results.push(TxResult::Output {
            value,
            program,
            data,
        });
        self
    }

    pub fn retire(mut self, value: AssetAmount, data: Hash) -> Self {
        self.results.push(TxResult::Retirement { value, data });
        self
    }

    /// Nonce programs must differ between issuances of one transaction,
    /// otherwise their nonces collide. The default pushes and drops the
    /// input index.
    fn default_nonce_program(index: usize) -> Program {
        let code = Builder::new()
            .add_data(&(index as u64).to_le_bytes())
            .add_op(Op::Drop)
            .add_int64(1)
            .build();
        Program::new(code)
    }

    pub fn build(self) -> TxEntries {
        let mut entries: Vec<Entry> = Vec::new();
        let time_range = TimeRange::new(self.min_time_ms, self.max_time_ms);
        let time_range_id = time_range.entry_id();
        let has_issuance = self.inputs.iter().any(|i| matches!(i, Input::Issuance { .. }));
        if has_issuance {
            entries.push(time_range.into());
        }

        // Input bodies do not depend on the mux, so their ids come first
        let mut issuances = Vec::new();
        let mut spends = Vec::new();
        let mut sources = Vec::with_capacity(self.inputs.len());
        for (index, input) in self.inputs.iter().enumerate() {
            let ordinal = index as u64;
            let value = input.value();
            let id = match input {
                Input::Issuance {
                    definition,
                    data,
                    arguments,
                    nonce_program,
                    ..
                } => {
                    let program = nonce_program
                        .clone()
                        .unwrap_or_else(|| Self::default_nonce_program(index));
                    let nonce = Nonce::new(program, time_range_id);
                    let mut issuance = Issuance::new(nonce.entry_id(), value, *data, ordinal);
                    issuance.witness.asset_definition = definition.clone();
                    issuance.witness.arguments = arguments.clone();
                    let id = issuance.entry_id();
                    issuances.push((issuance, nonce));
                    id
                }
                Input::Spend {
                    output,
                    data,
                    arguments,
                } => {
                    let mut spend = Spend::new(output.entry_id(), *data, ordinal);
                    spend.witness.arguments = arguments.clone();
                    let id = spend.entry_id();
                    spends.push((spend, output.clone()));
                    id
                }
            };
            sources.push(ValueSource::new(id, value, 0));
        }

        let mut mux = Mux::new(sources, self.mux_program);
        mux.witness.arguments = self.mux_arguments;
        let mux_id = mux.entry_id();

        let mut result_ids = Vec::with_capacity(self.results.len());
        for (index, result) in self.results.iter().enumerate() {
            let value = result.value();
            let source = ValueSource::new(mux_id, value, index as u64);
            let entry: Entry = match result {
                TxResult::Output { program, data, .. } => {
                    Output::new(source, program.clone(), *data, index as u64).into()
                }
                TxResult::Retirement { data, .. } => {
                    Retirement::new(source, *data, index as u64).into()
                }
            };
            let id = entry.id();
            mux.witness
                .destinations
                .push(ValueDestination::new(id, value, 0));
            result_ids.push(id);
            entries.push(entry);
        }

        let destination = |position: usize, value: AssetAmount| {
            ValueDestination::new(mux_id, value, position as u64)
        };
        for (mut issuance, mut nonce) in issuances {
            let position = issuance.ordinal as usize;
            issuance.witness.destination = destination(position, issuance.body.value);
            nonce.witness.anchored = issuance.entry_id();
            entries.push(nonce.into());
            entries.push(issuance.into());
        }
        for (mut spend, output) in spends {
            let position = spend.ordinal as usize;
            spend.witness.destination = destination(position, output.body.source.value);
            entries.push(output.into());
            entries.push(spend.into());
        }
        entries.push(mux.into());

        let header = TxHeader::new(
            self.version,
            result_ids,
            self.data,
            self.min_time_ms,
            self.max_time_ms,
        );
        let tx = TxEntries::new(header, entries);
        debug!(
            tx_id = %tx.id(),
            operation = operations::BUILD_TX,
            inputs = tx.inputs().len(),
            entries = tx.len(),
            "transaction built"
        );
        tx
    }
}

/// Id of the single Mux in a built transaction
pub fn find_mux(tx: &TxEntries) -> Option<EntryId> {
    tx.iter()
        .find(|(_, entry)| matches!(entry, Entry::Mux(_)))
        .map(|(id, _)| *id)
}
