//! Wraps [LogootSList] with the renaming protocol: every emitted op is
//! tagged with the epoch it was produced in, and inbound ops from a
//! different epoch are translated before being applied.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    epoch::{EpochId, EpochTree},
    err_at,
    interval::IdentifierInterval,
    list::{DelOp, InsertOp, LogootSList, TextOp},
    random::RandomSource,
    rename::RenamingMap,
    Error, Result,
};

/// An ordinary insert, tagged with the epoch it was generated in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamableInsertOp<T> {
    #[serde(flatten)]
    pub inner: InsertOp<T>,
    pub epoch: EpochId,
}

/// An ordinary delete, tagged with the epoch it was generated in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamableDeleteOp {
    #[serde(flatten)]
    pub inner: DelOp,
    pub epoch: EpochId,
}

/// Issues a rename: `renamed_id_intervals` covers the entire sequence as
/// observed by the issuer at rename time, under the *parent* epoch's
/// identifiers. A receiver reconstructs the same [RenamingMap] from these
/// fields via [RenamingMap::new] rather than having it shipped wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameOp {
    pub replica_number: i32,
    pub clock: i32,
    pub epoch: EpochId,
    pub parent_epoch: EpochId,
    pub renamed_id_intervals: Vec<IdentifierInterval>,
}

impl RenameOp {
    /// Rebuild the [RenamingMap] this op describes.
    pub fn renaming_map(&self) -> Result<RenamingMap> {
        RenamingMap::new(&self.renamed_id_intervals, self.replica_number, self.clock)
    }
}

/// One CRDT operation, flattened into a tagged variant rather than an
/// inheritance hierarchy of operation classes: dispatch is a single
/// `match` in [Operation::apply].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Operation<T> {
    Insert(RenamableInsertOp<T>),
    Delete(RenamableDeleteOp),
    Rename(RenameOp),
}

impl<T: Clone> Operation<T> {
    /// Apply this operation to `list`, returning the positional effects a
    /// caller should replay against its own text buffer (empty for a
    /// rename, which has no visible effect on the rendered sequence).
    pub fn apply(&self, list: &mut RenamableList) -> Result<Vec<TextOp<T>>> {
        match self {
            Operation::Insert(op) => list.apply_insert(op),
            Operation::Delete(op) => list.apply_delete(op),
            Operation::Rename(op) => {
                list.apply_rename(op)?;
                Ok(Vec::new())
            }
        }
    }
}

/// A replicated sequence that additionally tracks which identifier epoch
/// it is currently in, translating inbound operations from other epochs
/// through the [EpochTree] before handing them to the underlying
/// [LogootSList].
pub struct RenamableList {
    current_epoch: EpochId,
    list: LogootSList,
    epochs: EpochTree,
    op_count: u64,
}

impl RenamableList {
    /// Start a fresh replica at the genesis epoch `(replica_number, clock)`.
    pub fn new(genesis: EpochId) -> RenamableList {
        RenamableList {
            current_epoch: genesis,
            list: LogootSList::new(),
            epochs: EpochTree::new(genesis),
            op_count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn current_epoch(&self) -> EpochId {
        self.current_epoch
    }

    /// Whether the local sequence has drifted far enough from `config`'s
    /// thresholds that issuing a rename would be worthwhile. Purely
    /// advisory: the core never renames on its own (see [crate::config]).
    pub fn needs_rename(&self, config: &Config) -> bool {
        if self.op_count >= config.rename_trigger_ops {
            return true;
        }
        self.list
            .snapshot_intervals()
            .iter()
            .any(|iv| iv.base().len() >= config.rename_trigger_identifier_len)
    }

    /// Insert `content` at `pos`, returning the op to broadcast.
    pub fn insert<T, R: RandomSource>(
        &mut self,
        pos: usize,
        content: Vec<T>,
        replica_number: i32,
        clock: i32,
        rng: &mut R,
    ) -> Result<RenamableInsertOp<T>> {
        let inner = self.list.insert(pos, content, replica_number, clock, rng)?;
        self.op_count += 1;
        Ok(RenamableInsertOp {
            inner,
            epoch: self.current_epoch,
        })
    }

    /// Delete `[begin, end]` (inclusive), returning the op to broadcast.
    pub fn del(&mut self, begin: usize, end: usize) -> Result<RenamableDeleteOp> {
        let inner = self.list.del(begin, end)?;
        self.op_count += 1;
        Ok(RenamableDeleteOp {
            inner,
            epoch: self.current_epoch,
        })
    }

    /// Snapshot the entire local sequence, build a [RenamingMap] under
    /// `(replica_number, clock)`, install it as a new epoch, and rewrite
    /// the local sequence into the new epoch's dense identifier space.
    pub fn rename<R: RandomSource>(
        &mut self,
        replica_number: i32,
        clock: i32,
        _rng: &mut R,
    ) -> Result<RenameOp> {
        let renamed_id_intervals = self.list.snapshot_intervals();
        let map = RenamingMap::new(&renamed_id_intervals, replica_number, clock)?;
        let epoch = EpochId::new(replica_number, clock);
        let op = RenameOp {
            replica_number,
            clock,
            epoch,
            parent_epoch: self.current_epoch,
            renamed_id_intervals,
        };

        self.epochs.insert_child(op.parent_epoch, epoch, map.clone())?;
        self.list.rebase(map.new_base())?;
        self.current_epoch = epoch;
        self.op_count = 0;
        info!(
            "renamable: issued rename epoch={:?} parent={:?}",
            epoch, op.parent_epoch
        );
        Ok(op)
    }

    /// Apply a remote insert, translating it into the local epoch first if
    /// necessary.
    pub fn apply_insert<T: Clone>(&mut self, op: &RenamableInsertOp<T>) -> Result<Vec<TextOp<T>>> {
        let id_interval = self.translate_interval(&op.inner.id_interval, op.epoch)?;
        let translated = InsertOp {
            id_interval,
            content: op.inner.content.clone(),
        };
        self.list.apply_insert(&translated)
    }

    /// Apply a remote delete, translating each of its intervals into the
    /// local epoch first if necessary.
    pub fn apply_delete<T>(&mut self, op: &RenamableDeleteOp) -> Result<Vec<TextOp<T>>> {
        let mut id_intervals = Vec::with_capacity(op.inner.id_intervals.len());
        for iv in &op.inner.id_intervals {
            id_intervals.push(self.translate_interval(iv, op.epoch)?);
        }
        self.list.apply_del(&DelOp { id_intervals })
    }

    /// Register a remote rename in the local epoch tree. Does not change
    /// this replica's own `current_epoch`: the epoch tree alone is enough
    /// to translate future operations tagged with the new epoch, whether
    /// or not this replica ever renames itself into it.
    pub fn apply_rename(&mut self, op: &RenameOp) -> Result<()> {
        let map = op.renaming_map()?;
        self.epochs.insert_child(op.parent_epoch, op.epoch, map)?;
        debug!("renamable: registered remote rename epoch={:?}", op.epoch);
        Ok(())
    }

    fn translate_interval(&self, iv: &IdentifierInterval, from: EpochId) -> Result<IdentifierInterval> {
        if from == self.current_epoch {
            return Ok(iv.clone());
        }
        let new_first = self.epochs.translate(&iv.first_id(), from, self.current_epoch)?;
        let new_last = self.epochs.translate(&iv.last_id(), from, self.current_epoch)?;
        if !new_first.equals_base(&new_last) {
            return err_at!(
                Contract,
                msg: "translated interval endpoints diverged in base across epochs {:?} -> {:?}",
                from,
                self.current_epoch
            );
        }
        IdentifierInterval::new(new_first.clone(), new_first.last_offset(), new_last.last_offset())
    }
}

#[cfg(test)]
#[path = "renamable_test.rs"]
mod renamable_test;
