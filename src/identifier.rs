//! Nonempty sequence of [Tuple]s, totally ordered, that names a single
//! position in the shared sequence.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::{
    err_at,
    tuple::Tuple,
    Error, Result,
};

/// A position identifier: a nonempty sequence of [Tuple]s.
///
/// Order is lexicographic over the tuple sequence, with the usual
/// shorter-is-smaller tie-break when one identifier is a strict prefix of
/// the other (this is what lets [crate::factory::create_between] extend an
/// existing identifier with a fresh tuple to build a descendant strictly
/// between two siblings).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tuple>")]
pub struct Identifier(Vec<Tuple>);

impl std::convert::TryFrom<Vec<Tuple>> for Identifier {
    type Error = String;

    /// Backs `#[serde(try_from)]`: an inbound identifier deserializes
    /// through this instead of the derived tuple-struct form so an empty
    /// `base` array is rejected the same way [Identifier::new] rejects it,
    /// rather than silently producing an invalid zero-length identifier.
    fn try_from(tuples: Vec<Tuple>) -> std::result::Result<Self, Self::Error> {
        if tuples.is_empty() {
            Err("identifier must have at least one tuple".to_string())
        } else {
            Ok(Identifier(tuples))
        }
    }
}

impl Identifier {
    /// Build an identifier from a nonempty tuple sequence.
    ///
    /// # Errors
    /// Returns [Error::Contract] if `tuples` is empty.
    pub fn new(tuples: Vec<Tuple>) -> Result<Identifier> {
        if tuples.is_empty() {
            return err_at!(Contract, msg: "identifier must have at least one tuple");
        }
        Ok(Identifier(tuples))
    }

    /// Build an identifier known by the caller to be nonempty, for example
    /// one reconstructed from an already-validated [IdentifierInterval].
    pub(crate) fn from_vec_unchecked(tuples: Vec<Tuple>) -> Identifier {
        debug_assert!(!tuples.is_empty());
        Identifier(tuples)
    }

    pub fn tuples(&self) -> &[Tuple] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// An `Identifier` is never empty by construction, this exists to
    /// satisfy clippy's `len_without_is_empty` lint.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn last(&self) -> Tuple {
        self.0[self.0.len() - 1]
    }

    pub fn last_offset(&self) -> i32 {
        self.last().offset
    }

    pub fn first(&self) -> Tuple {
        self.0[0]
    }

    /// Split into `(head, tail)` with `head` the first `k` tuples.
    ///
    /// # Errors
    /// Returns [Error::Contract] if `k == 0` or `k > self.len()`.
    pub fn truncate(&self, k: usize) -> Result<(Identifier, Vec<Tuple>)> {
        if k == 0 || k > self.0.len() {
            return err_at!(
                Contract,
                msg: "truncate({}) out of range for identifier of length {}",
                k,
                self.0.len()
            );
        }
        let head = Identifier(self.0[..k].to_vec());
        let tail = self.0[k..].to_vec();
        Ok((head, tail))
    }

    /// Return the tuples from index `k` onward (may be empty).
    pub fn get_tail(&self, k: usize) -> Vec<Tuple> {
        self.0.get(k..).map(|s| s.to_vec()).unwrap_or_default()
    }

    /// An identifier with the same base as `self` but a fresh last-tuple
    /// offset.
    pub fn from_base(&self, new_offset: i32) -> Identifier {
        let mut tuples = self.0.clone();
        let last = tuples.len() - 1;
        tuples[last] = tuples[last].with_offset(new_offset);
        Identifier(tuples)
    }

    /// `self` is a prefix of `other`.
    pub fn is_prefix_of(&self, other: &Identifier) -> bool {
        self.0.len() <= other.0.len() && self.0[..] == other.0[..self.0.len()]
    }

    /// Two identifiers share a base: same length, every tuple but the last
    /// shares a base *and* agrees on offset, and the last tuples share a
    /// base (offset may differ).
    pub fn equals_base(&self, other: &Identifier) -> bool {
        if self.0.len() != other.0.len() {
            return false;
        }
        let n = self.0.len();
        for i in 0..n - 1 {
            if !self.0[i].same_base(&other.0[i]) || self.0[i].offset != other.0[i].offset {
                return false;
            }
        }
        self.0[n - 1].same_base(&other.0[n - 1])
    }

    /// Concatenate the tuple sequences of `self` and `other`, building a
    /// descendant identifier (used when extending a renamed prefix with a
    /// concurrently-generated tail, see [crate::rename::RenamingMap::rename]).
    pub fn concat(&self, other: &[Tuple]) -> Identifier {
        let mut tuples = self.0.clone();
        tuples.extend_from_slice(other);
        Identifier(tuples)
    }

    /// Append a single tuple, building a child identifier.
    pub fn push(&self, tuple: Tuple) -> Identifier {
        let mut tuples = self.0.clone();
        tuples.push(tuple);
        Identifier(tuples)
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

#[cfg(test)]
#[path = "identifier_test.rs"]
mod identifier_test;
