//! Canonical Encoding
//!
//! Deterministic binary layout of entry bodies. Entry ids hash this
//! layout, so it is a compatibility surface and must never change.
//!
//! | Item | Layout |
//! |------|--------|
//! | integer | unsigned LEB128 varint |
//! | byte string | varint length, then bytes |
//! | hash | 32 raw bytes |
//! | program | varint vm_version, byte string code |
//! | asset amount | asset id hash, varint amount |
//! | value source/destination | ref hash, asset amount, varint position |
//! | list | varint count, then items |

mod rules;

pub use rules::*;

use crate::types::{AssetAmount, EntryId, Hash, Program, ValueDestination, ValueSource};

/// Append-only writer for the canonical layout
#[derive(Debug, Default)]
pub struct CanonWriter {
    buf: Vec<u8>,
}

impl CanonWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_varint(&mut self, mut n: u64) -> &mut Self {
        loop {
            let byte = (n & 0x7f) as u8;
            n >>= 7;
            if n == 0 {
                self.buf.push(byte);
                return self;
            }
            self.buf.push(byte | 0x80);
        }
    }

    pub fn write_varstr(&mut self, bytes: &[u8]) -> &mut Self {
        self.write_varint(bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn write_hash(&mut self, hash: &Hash) -> &mut Self {
        self.buf.extend_from_slice(hash.as_bytes());
        self
    }

    pub fn write_entry_id(&mut self, id: &EntryId) -> &mut Self {
        self.write_hash(&id.0)
    }

    pub fn write_program(&mut self, program: &Program) -> &mut Self {
        self.write_varint(program.vm_version);
        self.write_varstr(&program.code)
    }

    pub fn write_asset_amount(&mut self, value: &AssetAmount) -> &mut Self {
        self.write_hash(&value.asset_id.0);
        self.write_varint(value.amount)
    }

    pub fn write_value_source(&mut self, src: &ValueSource) -> &mut Self {
        self.write_entry_id(&src.entry_ref);
        self.write_asset_amount(&src.value);
        self.write_varint(src.position)
    }

    pub fn write_value_destination(&mut self, dest: &ValueDestination) -> &mut Self {
        self.write_entry_id(&dest.entry_ref);
        self.write_asset_amount(&dest.value);
        self.write_varint(dest.position)
    }

    pub fn write_list<T, F>(&mut self, items: &[T], mut f: F) -> &mut Self
    where
        F: FnMut(&mut Self, &T),
    {
        self.write_varint(items.len() as u64);
        for item in items {
            f(self, item);
        }
        self
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// `SHA-256(tag || ":" || type || ":" || SHA-256(body))`
pub fn hash_typed(tag: &str, entry_type: &str, body: &[u8]) -> Hash {
    let inner = Hash::sha256(body);
    let mut preimage = Vec::with_capacity(tag.len() + entry_type.len() + 2 + 32);
    preimage.extend_from_slice(tag.as_bytes());
    preimage.push(b':');
    preimage.extend_from_slice(entry_type.as_bytes());
    preimage.push(b':');
    preimage.extend_from_slice(inner.as_bytes());
    Hash::sha256(&preimage)
}

/// Entry id of a body of the given type
pub fn entry_id(entry_type: &str, body: &[u8]) -> EntryId {
    EntryId(hash_typed(ENTRY_ID_TAG, entry_type, body))
}
