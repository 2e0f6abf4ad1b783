//! Metadata of a live run of identifiers held by the rope tree.

use crate::{err_at, interval::IdentifierInterval, Error, Result};

/// A contiguous run of identifiers plus how many of them are currently live.
///
/// `nb_element` is bookkeeping separate from the run's length: a block can
/// be shared by two sibling [rope::Node][crate::rope::Node]s after an
/// interior delete splits it (spec's split rule), in which case
/// `nb_element` is the sum of both siblings' live sub-ranges. A block with
/// no sibling referencing it is dropped by the tree the moment its last
/// live element goes away (see [crate::rope::RopeTree]); `nb_element`
/// reaching zero while the interval is still referenced only ever happens
/// for the instant between trimming one sibling and the other's own
/// removal.
#[derive(Debug, Clone)]
pub struct Block {
    pub interval: IdentifierInterval,
    pub nb_element: usize,
    pub(crate) ref_count: u32,
}

impl Block {
    pub fn new(interval: IdentifierInterval, nb_element: usize) -> Block {
        Block {
            interval,
            nb_element,
            ref_count: 1,
        }
    }

    /// Extend this block to also cover `other`, which must abut or overlap
    /// it on the same base.
    pub fn grow(&mut self, other: &IdentifierInterval, extra_elements: usize) -> Result<()> {
        self.interval = self.interval.union(other)?;
        self.nb_element += extra_elements;
        Ok(())
    }

    pub fn shrink(&mut self, removed_elements: usize) -> Result<()> {
        if removed_elements > self.nb_element {
            return err_at!(
                Contract,
                msg: "cannot remove {} elements from a block with {}",
                removed_elements,
                self.nb_element
            );
        }
        self.nb_element -= removed_elements;
        Ok(())
    }
}

#[cfg(test)]
#[path = "block_test.rs"]
mod block_test;
