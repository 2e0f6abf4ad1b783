//! The forest of renaming epochs and cross-epoch identifier translation.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{err_at, identifier::Identifier, rename::RenamingMap, Error, Result};

/// `(replica_number, clock)` naming a single epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochId {
    pub replica_number: i32,
    pub clock: i32,
}

impl EpochId {
    pub fn new(replica_number: i32, clock: i32) -> EpochId {
        EpochId { replica_number, clock }
    }
}

struct EpochNode {
    parent: Option<usize>,
    /// The transition from `parent` into this epoch; `None` only for the
    /// genesis root.
    rename_map: Option<RenamingMap>,
    depth: usize,
}

/// Rooted tree of [EpochId]s. Each non-root node carries the
/// [RenamingMap] describing its transition from its parent; translating an
/// identifier between two epochs walks from the deeper epoch up to their
/// lowest common ancestor via [RenamingMap::reverse_rename], then back down
/// to the target epoch via [RenamingMap::rename].
#[derive(Default)]
pub struct EpochTree {
    nodes: Vec<EpochNode>,
    by_id: HashMap<EpochId, usize>,
}

impl EpochTree {
    /// Start a tree with a single genesis epoch (no parent, no rename map).
    pub fn new(genesis: EpochId) -> EpochTree {
        let mut tree = EpochTree {
            nodes: Vec::new(),
            by_id: HashMap::new(),
        };
        tree.nodes.push(EpochNode {
            parent: None,
            rename_map: None,
            depth: 0,
        });
        tree.by_id.insert(genesis, 0);
        tree
    }

    pub fn contains(&self, epoch: EpochId) -> bool {
        self.by_id.contains_key(&epoch)
    }

    fn index_of(&self, epoch: EpochId) -> Result<usize> {
        self.by_id
            .get(&epoch)
            .copied()
            .ok_or(())
            .or_else(|_| err_at!(Contract, msg: "unknown epoch {:?}", epoch))
    }

    /// Register `child` as a new epoch below `parent`, transitioning
    /// through `map`. Idempotent: re-registering the same `(parent, child)`
    /// pair is a no-op, which is what lets a replica apply its own
    /// broadcast rename a second time if it is echoed back.
    ///
    /// # Errors
    /// Returns [Error::Contract] if `parent` is unknown, or if `child` is
    /// already registered under a *different* parent.
    pub fn insert_child(&mut self, parent: EpochId, child: EpochId, map: RenamingMap) -> Result<()> {
        let parent_idx = self.index_of(parent)?;
        if let Some(&existing) = self.by_id.get(&child) {
            let matches = self.nodes[existing].parent == Some(parent_idx);
            return if matches {
                Ok(())
            } else {
                err_at!(Contract, msg: "epoch {:?} already registered under a different parent", child)
            };
        }
        let depth = self.nodes[parent_idx].depth + 1;
        let idx = self.nodes.len();
        self.nodes.push(EpochNode {
            parent: Some(parent_idx),
            rename_map: Some(map),
            depth,
        });
        self.by_id.insert(child, idx);
        debug!("epoch: registered {:?} as child of {:?} at depth {}", child, parent, depth);
        Ok(())
    }

    fn depth(&self, idx: usize) -> usize {
        self.nodes[idx].depth
    }

    fn parent_map(&self, idx: usize) -> (usize, &RenamingMap) {
        let node = &self.nodes[idx];
        (
            node.parent.expect("non-root epoch always has a parent"),
            node.rename_map.as_ref().expect("non-root epoch always has a rename map"),
        )
    }

    /// Translate `id`, generated in epoch `from`, into the identifier space
    /// of epoch `to`.
    ///
    /// # Errors
    /// Returns [Error::Contract] if either epoch is unknown to this tree,
    /// or if a `reverse_rename` along the ascent rejects `id` as outside
    /// its map's renamed range.
    pub fn translate(&self, id: &Identifier, from: EpochId, to: EpochId) -> Result<Identifier> {
        let mut from_idx = self.index_of(from)?;
        let mut to_idx = self.index_of(to)?;
        let mut cur = id.clone();

        while self.depth(from_idx) > self.depth(to_idx) {
            let (parent_idx, map) = self.parent_map(from_idx);
            cur = map.reverse_rename(&cur)?;
            from_idx = parent_idx;
        }

        let mut descend: Vec<usize> = Vec::new();
        while self.depth(to_idx) > self.depth(from_idx) {
            descend.push(to_idx);
            to_idx = self.nodes[to_idx].parent.expect("non-root epoch always has a parent");
        }

        while from_idx != to_idx {
            let (parent_idx, map) = self.parent_map(from_idx);
            cur = map.reverse_rename(&cur)?;
            from_idx = parent_idx;

            descend.push(to_idx);
            to_idx = self.nodes[to_idx].parent.expect("non-root epoch always has a parent");
        }

        for &idx in descend.iter().rev() {
            let (_, map) = self.parent_map(idx);
            cur = map.rename(&cur);
        }
        Ok(cur)
    }
}

#[cfg(test)]
#[path = "epoch_test.rs"]
mod epoch_test;
