use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::canon::{entry_types, CanonWriter};
use crate::entries::EntryBody;
use crate::error::{ResultExt, ValidationError, ValidationResult};
use crate::types::{AssetId, Hash, Program, ValueDestination, ValueSource};
use crate::validation::{check_destination, check_source, ValidationState};

/// Splits and combines value from its sources into its destinations
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mux {
    pub body: MuxBody,
    pub witness: MuxWitness,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuxBody {
    /// Issuances, spends and muxes
    pub sources: Vec<ValueSource>,
    pub program: Program,
    pub ext_hash: Hash,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuxWitness {
    /// Outputs, retirements and muxes
    pub destinations: Vec<ValueDestination>,
    pub arguments: Vec<Vec<u8>>,
}

impl Mux {
    /// Destinations are attached later by the entries consuming this mux
    pub fn new(sources: Vec<ValueSource>, program: Program) -> Self {
        Self {
            body: MuxBody {
                sources,
                program,
                ext_hash: Hash::zero(),
            },
            witness: MuxWitness::default(),
        }
    }

    pub fn destinations(&self) -> &[ValueDestination] {
        &self.witness.destinations
    }

    pub(crate) fn check_valid(&self, state: &ValidationState<'_>) -> ValidationResult<()> {
        state
            .verify_program(&self.body.program, &self.witness.arguments)
            .context("checking mux program")?;

        for (i, src) in self.body.sources.iter().enumerate() {
            let src_state = state.with_source_position(i as u64);
            check_source(&src_state, src).with_context(|| format!("checking mux source {}", i))?;
        }

        for (i, dest) in self.witness.destinations.iter().enumerate() {
            let dest_state = state.with_dest_position(i as u64);
            check_destination(&dest_state, dest)
                .with_context(|| format!("checking mux destination {}", i))?;
        }

        self.check_parity()?;

        state.check_ext_hash(&self.body.ext_hash, Self::TYPE)
    }

    /// Per-asset conservation between sources and destinations.
    ///
    /// Assets are visited in id order, so with several unbalanced
    /// assets the lowest id is reported.
    pub fn check_parity(&self) -> ValidationResult<()> {
        let mut parity: BTreeMap<AssetId, i64> = BTreeMap::new();

        for (index, src) in self.body.sources.iter().enumerate() {
            let asset = src.value.asset_id;
            let total = parity.entry(asset).or_insert(0);
            *total = i64::try_from(src.value.amount)
                .ok()
                .and_then(|amount| total.checked_add(amount))
                .ok_or(ValidationError::ArithmeticOverflow { asset, index })?;
        }

        for (index, dest) in self.witness.destinations.iter().enumerate() {
            let asset = dest.value.asset_id;
            let total = parity
                .get_mut(&asset)
                .ok_or(ValidationError::NoMatchingSource { asset, index })?;
            *total = i64::try_from(dest.value.amount)
                .ok()
                .and_then(|amount| total.checked_sub(amount))
                .ok_or(ValidationError::ArithmeticUnderflow { asset, index })?;
        }

        match parity.into_iter().find(|(_, residual)| *residual != 0) {
            Some((asset, residual)) => Err(ValidationError::Unbalanced { asset, residual }),
            None => Ok(()),
        }
    }
}

impl EntryBody for Mux {
    const TYPE: &'static str = entry_types::MUX;

    fn write_body(&self, w: &mut CanonWriter) {
        w.write_list(&self.body.sources, |w, src| {
            w.write_value_source(src);
        });
        w.write_program(&self.body.program);
        w.write_hash(&self.body.ext_hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssetAmount, EntryId};
    use assert_matches::assert_matches;

    fn asset(b: u8) -> AssetId {
        AssetId(Hash([b; 32]))
    }

    fn mux(sources: &[(AssetId, u64)], dests: &[(AssetId, u64)]) -> Mux {
        let mut m = Mux::new(
            sources
                .iter()
                .map(|(a, n)| ValueSource::new(EntryId::zero(), AssetAmount::new(*a, *n), 0))
                .collect(),
            Program::trivial(),
        );
        m.witness.destinations = dests
            .iter()
            .map(|(a, n)| ValueDestination::new(EntryId::zero(), AssetAmount::new(*a, *n), 0))
            .collect();
        m
    }

    #[test]
    fn test_balanced() {
        let a = asset(1);
        assert!(mux(&[(a, 100)], &[(a, 60), (a, 40)]).check_parity().is_ok());
    }

    #[test]
    fn test_unbalanced_residual() {
        let a = asset(1);
        let err = mux(&[(a, 100)], &[(a, 60), (a, 41)]).check_parity().unwrap_err();
        assert_eq!(err, ValidationError::Unbalanced { asset: a, residual: -1 });
    }

    #[test]
    fn test_lowest_unbalanced_asset_reported() {
        let (a, b) = (asset(1), asset(2));
        let err = mux(&[(b, 5), (a, 5)], &[(b, 4), (a, 4)]).check_parity().unwrap_err();
        assert_eq!(err, ValidationError::Unbalanced { asset: a, residual: 1 });
    }

    #[test]
    fn test_no_matching_source() {
        let (a, b) = (asset(1), asset(2));
        let err = mux(&[(a, 5)], &[(a, 5), (b, 1)]).check_parity().unwrap_err();
        assert_eq!(err, ValidationError::NoMatchingSource { asset: b, index: 1 });
    }

    #[test]
    fn test_overflow() {
        let a = asset(1);
        let err = mux(&[(a, i64::MAX as u64), (a, 1)], &[]).check_parity().unwrap_err();
        assert_eq!(err, ValidationError::ArithmeticOverflow { asset: a, index: 1 });

        let err = mux(&[(a, u64::MAX)], &[]).check_parity().unwrap_err();
        assert_matches!(err, ValidationError::ArithmeticOverflow { index: 0, .. });
    }

    #[test]
    fn test_underflow() {
        let a = asset(1);
        let err = mux(&[(a, 1)], &[(a, i64::MAX as u64), (a, i64::MAX as u64)])
            .check_parity()
            .unwrap_err();
        assert_eq!(err, ValidationError::ArithmeticUnderflow { asset: a, index: 1 });
    }
}
