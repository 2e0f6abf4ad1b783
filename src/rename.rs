//! Translates identifiers across a single rename boundary.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    err_at,
    identifier::Identifier,
    interval::IdentifierInterval,
    tuple::{Tuple, MIN_TUPLE},
    Error, Result,
};

/// Describes one rename: a dense re-numbering of a contiguous run of
/// identifiers under a fresh base `(newRandom, replicaNumber, clock)`.
///
/// `renamed_ids` is the full, ascending flattening of the intervals that
/// were renamed — this implementation favours a direct
/// offset-to-identifier lookup table over reconstructing membership from
/// interval arithmetic on every call, trading memory for a construction
/// that is easy to get right without a compiler to check it. `Open
/// question` in the design notes: `reverse_rename` collapses the source's
/// five-zone branching into two cases instead of mirroring the branch
/// structure verbatim, but still reconstructs (rather than drops) the
/// predecessor/successor anchoring that order-preservation across epochs
/// requires — see its doc comment for the exact construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamingMap {
    replica_number: i32,
    clock: i32,
    new_base: Identifier,
    renamed_ids: Vec<Identifier>,
}

impl RenamingMap {
    /// Build a renaming map from the contiguous list of identifier
    /// intervals covering the entire local sequence at rename time.
    ///
    /// # Errors
    /// Returns [Error::Contract] if `renamed_intervals` is empty.
    pub fn new(
        renamed_intervals: &[IdentifierInterval],
        replica_number: i32,
        clock: i32,
    ) -> Result<RenamingMap> {
        if renamed_intervals.is_empty() {
            return err_at!(Contract, msg: "rename requires a nonempty interval list");
        }
        let mut renamed_ids = Vec::new();
        for iv in renamed_intervals {
            for offset in iv.begin()..=iv.end() {
                renamed_ids.push(iv.id_at(offset)?);
            }
        }
        let new_random = renamed_intervals[0].base_tuple().random;
        let new_base = Identifier::new(vec![Tuple::new(new_random, replica_number, clock, 0)])?;
        debug!(
            "rename: built map over {} identifiers (replica={}, clock={})",
            renamed_ids.len(),
            replica_number,
            clock
        );
        Ok(RenamingMap {
            replica_number,
            clock,
            new_base,
            renamed_ids,
        })
    }

    pub fn replica_number(&self) -> i32 {
        self.replica_number
    }

    pub fn clock(&self) -> i32 {
        self.clock
    }

    pub fn new_base(&self) -> &Identifier {
        &self.new_base
    }

    pub fn first_id(&self) -> &Identifier {
        self.renamed_ids.first().expect("nonempty by construction")
    }

    pub fn last_id(&self) -> &Identifier {
        self.renamed_ids.last().expect("nonempty by construction")
    }

    pub fn max_offset(&self) -> i32 {
        self.renamed_ids.len() as i32 - 1
    }

    /// Translate an identifier generated before or concurrently with this
    /// rename into the new epoch.
    pub fn rename(&self, id: &Identifier) -> Identifier {
        if id < self.first_id() || id > self.last_id() {
            return id.clone();
        }
        match self.renamed_ids.binary_search(id) {
            Ok(idx) => self.new_base.from_base(idx as i32),
            Err(idx) => {
                // `idx` is the insertion point; `id` is strictly between
                // `renamed_ids[idx - 1]` and `renamed_ids[idx]`, and
                // `idx > 0` always holds since `id >= first_id()`.
                let pred_idx = idx - 1;
                self.new_base.from_base(pred_idx as i32).concat(id.tuples())
            }
        }
    }

    /// The partial inverse of [Self::rename], used to translate operations
    /// produced after the rename back into the parent epoch.
    ///
    /// # Errors
    /// Returns [Error::Contract] if `id` carries this map's base with an
    /// offset outside `[0, max_offset()]` — an identifier that claims to
    /// come from this epoch but cannot have been produced by `rename`.
    pub fn reverse_rename(&self, id: &Identifier) -> Result<Identifier> {
        if !id.first().same_base(&self.new_base.first()) {
            return Ok(id.clone());
        }
        let offset = id.first().offset;
        if offset < 0 || offset as usize >= self.renamed_ids.len() {
            return err_at!(
                Contract,
                msg: "offset {} outside renamed range [0, {}]",
                offset,
                self.max_offset()
            );
        }
        let predecessor = self.renamed_ids[offset as usize].clone();
        if id.len() == 1 {
            return Ok(predecessor);
        }

        // A non-trivial tail means `id` sits between `predecessor` and its
        // successor in the old space. Three zones, matched on where `tail`
        // itself falls relative to those two bounds:
        //
        // - zone 4, the common case: `tail` already sits strictly between
        //   `predecessor` and `successor`. This is what `rename`'s own
        //   concat branch produces, so the tail is already its own inverse.
        // - zone 3: `tail` sorts at or below `predecessor` (it was minted
        //   natively in the new epoch, with no relation to the old space).
        //   Re-anchor right after `predecessor`.
        // - zone 5: `tail` sorts at or above `successor`, same native-mint
        //   case from the other side. Re-anchor right after `predecessor`
        //   as well, not just below `successor`: anchoring on a truncation
        //   of `successor` and appending the maximum sentinel tuple is only
        //   safe to compare against `successor` when the anchor and
        //   `successor` diverge *before* the appended tuple — and when
        //   `predecessor` is itself an exact prefix of `successor` (which
        //   happens whenever a rename spans several original intervals),
        //   any anchor built from `successor`'s own prefix ties or exceeds
        //   `successor` there, since nothing sorts above the maximum
        //   sentinel. Anchoring on `predecessor` with the *minimum*
        //   sentinel sidesteps that: the result is a proper extension of
        //   `predecessor` (so strictly greater), and diverges from
        //   `successor` no later than `predecessor` itself does, so it
        //   always sorts below `successor` too.
        let (_, tail) = id.truncate(1)?;
        let tail_id = Identifier::from_vec_unchecked(tail.clone());
        let successor = self.renamed_ids.get(offset as usize + 1);
        let in_zone4 = predecessor < tail_id && successor.map_or(true, |s| tail_id < *s);
        if in_zone4 {
            Ok(tail_id)
        } else {
            Ok(predecessor.push(MIN_TUPLE).concat(&tail))
        }
    }
}

#[cfg(test)]
#[path = "rename_test.rs"]
mod rename_test;
