//! A contiguous run of identifiers sharing a common base.

use serde::{Deserialize, Serialize};

use crate::{err_at, identifier::Identifier, tuple::Tuple, Error, Result};

/// `(base, begin, end)` representing the set of identifiers
/// `{ base · (r, p, c, o) : begin <= o <= end }`, where `base` is the
/// prefix shared by every identifier in the run and `(r, p, c)` is the last
/// tuple of `base` with `offset` varying.
///
/// Concretely: `base` holds every tuple of the identifier except the last
/// one's offset, i.e. `base.tuples()` has the *last* tuple present too, but
/// callers only ever read its `(random, replica_number, clock)` fields —
/// `offset` on the stored base tuple is ignored in favour of `begin`/`end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierInterval {
    base: Identifier,
    begin: i32,
    end: i32,
}

impl IdentifierInterval {
    /// # Errors
    /// Returns [Error::Contract] if `begin > end`.
    pub fn new(base: Identifier, begin: i32, end: i32) -> Result<IdentifierInterval> {
        if begin > end {
            return err_at!(Contract, msg: "interval begin {} > end {}", begin, end);
        }
        Ok(IdentifierInterval { base, begin, end })
    }

    pub fn base(&self) -> &Identifier {
        &self.base
    }

    pub fn begin(&self) -> i32 {
        self.begin
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    /// Number of identifiers covered by this interval.
    pub fn length(&self) -> i64 {
        self.end as i64 - self.begin as i64 + 1
    }

    /// The first identifier in the run.
    pub fn first_id(&self) -> Identifier {
        self.base.from_base(self.begin)
    }

    /// The last identifier in the run.
    pub fn last_id(&self) -> Identifier {
        self.base.from_base(self.end)
    }

    /// The identifier at `offset` within `[begin..end]`.
    ///
    /// # Errors
    /// Returns [Error::Contract] if `offset` is outside `[begin, end]`.
    pub fn id_at(&self, offset: i32) -> Result<Identifier> {
        if offset < self.begin || offset > self.end {
            return err_at!(
                Contract,
                msg: "offset {} outside interval [{}, {}]",
                offset,
                self.begin,
                self.end
            );
        }
        Ok(self.base.from_base(offset))
    }

    /// Whether `id` falls within this interval (same base, offset in range).
    pub fn contains(&self, id: &Identifier) -> bool {
        self.base.equals_base(id) && {
            let o = id.last_offset();
            o >= self.begin && o <= self.end
        }
    }

    /// Split this interval at `offset`: everything strictly before `offset`
    /// stays in `self`-shaped left part, everything from `offset` on is the
    /// right part. Used by the rope tree when a positional delete lands in
    /// the interior of a node's live range.
    ///
    /// # Errors
    /// Returns [Error::Contract] if `offset` does not strictly split the
    /// interval (`begin < offset <= end` is required for a nonempty left
    /// part, left may be empty only when `offset == begin`).
    pub fn split_at(&self, offset: i32) -> Result<(IdentifierInterval, IdentifierInterval)> {
        if offset <= self.begin || offset > self.end {
            return err_at!(
                Contract,
                msg: "split_at({}) out of range for [{}, {}]",
                offset,
                self.begin,
                self.end
            );
        }
        let left = IdentifierInterval::new(self.base.clone(), self.begin, offset - 1)?;
        let right = IdentifierInterval::new(self.base.clone(), offset, self.end)?;
        Ok((left, right))
    }

    /// Produce the smallest contiguous interval containing the union of
    /// `self` and `other`.
    ///
    /// # Errors
    /// Returns [Error::Contract] if the two intervals neither overlap nor
    /// abut, or do not share a base: the union would not be contiguous.
    pub fn union(&self, other: &IdentifierInterval) -> Result<IdentifierInterval> {
        if !self.base.equals_base(&other.base) {
            return err_at!(Contract, msg: "cannot union intervals with different bases");
        }
        let abuts_or_overlaps =
            other.begin <= self.end.saturating_add(1) && self.begin <= other.end.saturating_add(1);
        if !abuts_or_overlaps {
            return err_at!(
                Contract,
                msg: "intervals [{}, {}] and [{}, {}] neither overlap nor abut",
                self.begin,
                self.end,
                other.begin,
                other.end
            );
        }
        IdentifierInterval::new(
            self.base.clone(),
            self.begin.min(other.begin),
            self.end.max(other.end),
        )
    }

    /// Whether appending `other` right after `self` (`other.begin == self.end + 1`,
    /// same base) would produce a single contiguous run.
    pub fn abuts(&self, other: &IdentifierInterval) -> bool {
        self.base.equals_base(&other.base) && other.begin == self.end + 1
    }

    pub fn base_tuple(&self) -> Tuple {
        self.base.last()
    }
}

#[cfg(test)]
#[path = "interval_test.rs"]
mod interval_test;
