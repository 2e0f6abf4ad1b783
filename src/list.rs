//! The replicable sequence: wraps the rope tree with op encode/decode.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    identifier::Identifier,
    interval::IdentifierInterval,
    random::RandomSource,
    rope::RopeTree,
    Result,
};

/// One contiguous run inserted at a single position, carrying its content.
///
/// `content` is stored as opaque elements rather than `char`s: the tree
/// only ever reasons about identifiers, so callers are free to run this
/// over bytes, chars or any other element type that round-trips through
/// `serde`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertOp<T> {
    #[serde(rename = "id")]
    pub id_interval: IdentifierInterval,
    pub content: Vec<T>,
}

/// A delete, possibly fragmented across several runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelOp {
    #[serde(rename = "lid")]
    pub id_intervals: Vec<IdentifierInterval>,
}

/// A positional effect an applied op has on the rendered sequence, for a
/// caller maintaining its own text buffer alongside the identifier space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOp<T> {
    Insert { pos: usize, content: Vec<T> },
    Delete { pos: usize, length: usize },
}

/// A Logoot-split sequence, replicated by exchanging [InsertOp]/[DelOp]
/// values derived from local edits.
#[derive(Debug, Default)]
pub struct LogootSList {
    tree: RopeTree,
}

impl LogootSList {
    pub fn new() -> LogootSList {
        LogootSList {
            tree: RopeTree::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Insert `content` at `pos`, returning the op to broadcast to other
    /// replicas.
    pub fn insert<T, R: RandomSource>(
        &mut self,
        pos: usize,
        content: Vec<T>,
        replica_number: i32,
        clock: i32,
        rng: &mut R,
    ) -> Result<InsertOp<T>> {
        let id_interval = self
            .tree
            .insert_local(pos, content.len(), replica_number, clock, rng)?;
        debug!("list: local insert at {} of {} elements", pos, content.len());
        Ok(InsertOp { id_interval, content })
    }

    /// Delete `[begin, end]` (inclusive), returning the op to broadcast.
    pub fn del(&mut self, begin: usize, end: usize) -> Result<DelOp> {
        let id_intervals = self.tree.del_local(begin, end)?;
        debug!(
            "list: local delete [{}, {}] fragmented into {} interval(s)",
            begin,
            end,
            id_intervals.len()
        );
        Ok(DelOp { id_intervals })
    }

    /// Apply a remote insert, returning the positional effects a caller
    /// should replay against its own text buffer.
    pub fn apply_insert<T: Clone>(&mut self, op: &InsertOp<T>) -> Result<Vec<TextOp<T>>> {
        // Position must be read before mutating, since insertion shifts
        // every identifier at or after it by `content.len()`.
        let pos = self.position_of_first(&op.id_interval)?;
        self.tree.insert_remote(op.id_interval.clone())?;
        Ok(vec![TextOp::Insert {
            pos,
            content: op.content.clone(),
        }])
    }

    /// Apply a remote delete, returning the positional effects a caller
    /// should replay against its own text buffer. Intervals already absent
    /// (beaten to it by a concurrent delete) are silently skipped.
    pub fn apply_del<T>(&mut self, op: &DelOp) -> Result<Vec<TextOp<T>>> {
        let mut effects = Vec::new();
        for iv in &op.id_intervals {
            let pos = self.position_of_first(iv)?;
            let removed = self.tree.del_remote(iv.clone())?;
            if removed > 0 {
                effects.push(TextOp::Delete { pos, length: removed });
            }
        }
        Ok(effects)
    }

    /// Every live identifier interval, in sequence order. Used by
    /// [crate::renamable::RenamableList] to snapshot the entire local
    /// sequence at rename time when building a [crate::rename::RenamingMap].
    pub fn snapshot_intervals(&self) -> Vec<IdentifierInterval> {
        self.tree.iter_intervals()
    }

    /// Replace every live element's identifier with a dense run under
    /// `new_base`, preserving order and count. Called once a rename has
    /// been issued or observed locally and the local sequence itself must
    /// move into the new epoch's identifier space.
    pub fn rebase(&mut self, new_base: &Identifier) -> Result<()> {
        self.tree.rebase(new_base)
    }

    /// Position `id_interval.first_id()` would occupy if it is currently
    /// present in the tree, by linear scan of the identifier-ordered
    /// sequence via repeated halving. Used to translate an identifier-space
    /// op into the positional effect a text buffer needs.
    fn position_of_first(&self, id_interval: &IdentifierInterval) -> Result<usize> {
        let target = id_interval.first_id();
        let mut lo = 0usize;
        let mut hi = self.tree.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let mid_id = self.tree.id_at(mid)?;
            if mid_id < target {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Ok(lo)
    }
}

#[cfg(test)]
#[path = "list_test.rs"]
mod list_test;
