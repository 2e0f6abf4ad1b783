//! One level of a position identifier.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Top of the signed 32-bit domain every tuple field lives in.
pub const INT32_TOP: i32 = i32::MAX;
/// Bottom of the signed 32-bit domain every tuple field lives in.
pub const INT32_BOTTOM: i32 = i32::MIN;

/// One level of a position [Identifier][crate::identifier::Identifier]:
/// `(random, replica_number, clock, offset)`.
///
/// Order is lexicographic on the four fields in that order. Two tuples
/// share a *base* when `random`, `replica_number` and `clock` agree; only
/// `offset` may then differ, which is how an [IdentifierInterval]
/// represents a contiguous run without repeating the other three fields
/// per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tuple {
    pub random: i32,
    pub replica_number: i32,
    pub clock: i32,
    pub offset: i32,
}

/// Sentinel standing in for "`-infinity`" during generation and translation.
pub const MIN_TUPLE: Tuple = Tuple {
    random: INT32_BOTTOM,
    replica_number: 0,
    clock: 0,
    offset: 0,
};

/// Sentinel standing in for "`+infinity`" during generation and translation.
pub const MAX_TUPLE: Tuple = Tuple {
    random: INT32_TOP,
    replica_number: 0,
    clock: 0,
    offset: 0,
};

impl Tuple {
    pub fn new(random: i32, replica_number: i32, clock: i32, offset: i32) -> Tuple {
        Tuple {
            random,
            replica_number,
            clock,
            offset,
        }
    }

    /// Return a copy of this tuple with `offset` replaced.
    pub fn with_offset(&self, offset: i32) -> Tuple {
        Tuple { offset, ..*self }
    }

    /// Two tuples share a base when their first three fields agree; only
    /// `offset` may differ.
    pub fn same_base(&self, other: &Tuple) -> bool {
        self.random == other.random
            && self.replica_number == other.replica_number
            && self.clock == other.clock
    }
}

/// `(replica_number, clock)` lexicographic comparison, ignoring `random` and
/// `offset`. Used when comparing tuples that are known to share the same
/// `random` draw, e.g. while walking an [IdentifierInterval][crate::interval::IdentifierInterval].
pub fn cmp_base(a: &Tuple, b: &Tuple) -> Ordering {
    (a.random, a.replica_number, a.clock).cmp(&(b.random, b.replica_number, b.clock))
}

#[cfg(test)]
#[path = "tuple_test.rs"]
mod tuple_test;
