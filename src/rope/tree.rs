//! The AVL-balanced block tree mapping positions to identifiers and back.

use log::debug;

use crate::{
    block::Block,
    err_at,
    factory::{self, Bound},
    identifier::Identifier,
    interval::IdentifierInterval,
    random::RandomSource,
    rope::{depth::Depth, node::Node, stats::Stats},
    Error, Result,
};

/// Maps integer positions in the rendered sequence to identifiers and back.
///
/// Nodes and blocks live in parallel arenas addressed by index rather than
/// behind `Arc`/`Box` pointers; there is exactly one live generation, and
/// arena slots freed by a deletion are recycled by later inserts, which
/// keeps memory bounded without a GC pass.
///
/// Node adjacency merging (two adjacent nodes referencing the same block
/// with abutting live ranges) and block-growth on insert are both treated
/// as optional compaction this implementation skips: every
/// `insert_local`/`insert_remote` allocates its own node and block.
/// This costs some node-count compactness but changes nothing observable
/// through `search`/position mapping or through convergence, since the
/// merge rule is explicitly optional for correctness.
#[derive(Debug, Default)]
pub struct RopeTree {
    nodes: Vec<Option<Node>>,
    free_nodes: Vec<usize>,
    blocks: Vec<Option<Block>>,
    free_blocks: Vec<usize>,
    root: Option<usize>,
}

impl RopeTree {
    pub fn new() -> RopeTree {
        RopeTree {
            nodes: Vec::new(),
            free_nodes: Vec::new(),
            blocks: Vec::new(),
            free_blocks: Vec::new(),
            root: None,
        }
    }

    /// Total number of live elements in the rendered sequence.
    pub fn len(&self) -> usize {
        self.size(self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    // -- arena plumbing -----------------------------------------------

    fn node(&self, i: usize) -> &Node {
        self.nodes[i].as_ref().expect("dangling node index")
    }

    fn node_mut(&mut self, i: usize) -> &mut Node {
        self.nodes[i].as_mut().expect("dangling node index")
    }

    fn block(&self, i: usize) -> &Block {
        self.blocks[i].as_ref().expect("dangling block index")
    }

    fn block_mut(&mut self, i: usize) -> &mut Block {
        self.blocks[i].as_mut().expect("dangling block index")
    }

    fn alloc_node(&mut self, node: Node) -> usize {
        match self.free_nodes.pop() {
            Some(i) => {
                self.nodes[i] = Some(node);
                i
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn alloc_block(&mut self, block: Block) -> usize {
        match self.free_blocks.pop() {
            Some(i) => {
                self.blocks[i] = Some(block);
                i
            }
            None => {
                self.blocks.push(Some(block));
                self.blocks.len() - 1
            }
        }
    }

    fn free_node(&mut self, i: usize) {
        let block = self.node(i).block;
        self.nodes[i] = None;
        self.free_nodes.push(i);
        self.dec_block_ref(block);
    }

    fn dec_block_ref(&mut self, block: usize) {
        let dead = {
            let b = self.block_mut(block);
            b.ref_count -= 1;
            b.ref_count == 0
        };
        if dead {
            self.blocks[block] = None;
            self.free_blocks.push(block);
        }
    }

    fn height(&self, idx: Option<usize>) -> i32 {
        idx.map_or(0, |i| self.node(i).height)
    }

    fn size(&self, idx: Option<usize>) -> usize {
        idx.map_or(0, |i| self.node(i).size)
    }

    fn update(&mut self, i: usize) {
        let (left, right, live) = {
            let n = self.node(i);
            (n.left, n.right, n.live_len())
        };
        let height = 1 + self.height(left).max(self.height(right));
        let size = live + self.size(left) + self.size(right);
        let n = self.node_mut(i);
        n.height = height;
        n.size = size;
    }

    /// The identifier interval this node's live range currently spans.
    fn node_interval(&self, i: usize) -> IdentifierInterval {
        let node = self.node(i);
        let block = self.block(node.block);
        IdentifierInterval::new(block.interval.base().clone(), node.off_begin, node.off_end)
            .expect("a node's live range is always a valid sub-range of its block")
    }

    // -- AVL rotations --------------------------------------------------

    fn rotate_right(&mut self, i: usize) -> usize {
        let l = self.node(i).left.expect("rotate_right requires a left child");
        let lr = self.node(l).right;
        self.node_mut(i).left = lr;
        self.node_mut(l).right = Some(i);
        self.update(i);
        self.update(l);
        l
    }

    fn rotate_left(&mut self, i: usize) -> usize {
        let r = self.node(i).right.expect("rotate_left requires a right child");
        let rl = self.node(r).left;
        self.node_mut(i).right = rl;
        self.node_mut(r).left = Some(i);
        self.update(i);
        self.update(r);
        r
    }

    fn rebalance(&mut self, i: usize) -> usize {
        let left = self.node(i).left;
        let right = self.node(i).right;
        let balance = self.height(left) - self.height(right);
        if balance > 1 {
            let l = left.unwrap();
            if self.height(self.node(l).left) < self.height(self.node(l).right) {
                let new_l = self.rotate_left(l);
                self.node_mut(i).left = Some(new_l);
            }
            self.rotate_right(i)
        } else if balance < -1 {
            let r = right.unwrap();
            if self.height(self.node(r).right) < self.height(self.node(r).left) {
                let new_r = self.rotate_right(r);
                self.node_mut(i).right = Some(new_r);
            }
            self.rotate_left(i)
        } else {
            i
        }
    }

    // -- insertion --------------------------------------------------

    /// Insert a pre-built node (identified by its current `off_begin`)
    /// keeping BST order by identifier, rebalancing on the way back up.
    fn insert_node_idx(&mut self, idx: Option<usize>, new_idx: usize) -> usize {
        match idx {
            None => new_idx,
            Some(i) => {
                let node_first = self.node_interval(i).first_id();
                let new_first = self.node_interval(new_idx).first_id();
                if new_first < node_first {
                    let left = self.node(i).left;
                    let new_left = self.insert_node_idx(left, new_idx);
                    self.node_mut(i).left = Some(new_left);
                } else {
                    let right = self.node(i).right;
                    let new_right = self.insert_node_idx(right, new_idx);
                    self.node_mut(i).right = Some(new_right);
                }
                self.update(i);
                self.rebalance(i)
            }
        }
    }

    /// Generate a fresh identifier between positions `pos-1` and `pos` and
    /// place an interval of `length` elements there.
    pub fn insert_local<R: RandomSource>(
        &mut self,
        pos: usize,
        length: usize,
        replica_number: i32,
        clock: i32,
        rng: &mut R,
    ) -> Result<IdentifierInterval> {
        if length == 0 {
            return err_at!(Contract, msg: "insert_local requires length > 0");
        }
        let total = self.len();
        if pos > total {
            return err_at!(Contract, msg: "insert position {} beyond length {}", pos, total);
        }
        let lower_id = if pos == 0 {
            None
        } else {
            let (i, off) = self.search(pos - 1).expect("pos-1 is within range");
            Some(self.node_interval(i).id_at(off)?)
        };
        let upper_id = if pos == total {
            None
        } else {
            let (i, off) = self.search(pos).expect("pos is within range");
            Some(self.node_interval(i).id_at(off)?)
        };
        let lower_bound = lower_id.as_ref().map_or(Bound::NegInf, Bound::Id);
        let upper_bound = upper_id.as_ref().map_or(Bound::PosInf, Bound::Id);
        let id = factory::create_between(lower_bound, upper_bound, replica_number, clock, rng)?;
        let interval = IdentifierInterval::new(id, 0, (length - 1) as i32)?;
        self.insert_remote(interval.clone())?;
        debug!("rope: insert_local pos={} length={} -> {:?}", pos, length, interval);
        Ok(interval)
    }

    /// Place `interval` (already fully formed, e.g. from a remote op or
    /// from `insert_local`) into the tree.
    pub fn insert_remote(&mut self, interval: IdentifierInterval) -> Result<()> {
        let nb_element = interval.length() as usize;
        let block = self.alloc_block(Block::new(interval.clone(), nb_element));
        let node = self.alloc_node(Node::new(block, interval.begin(), interval.end()));
        self.root = Some(self.insert_node_idx(self.root, node));
        Ok(())
    }

    // -- search --------------------------------------------------

    /// Map a 0-based position in the rendered sequence to the node holding
    /// it and the offset within that node's block.
    pub fn search(&self, pos: usize) -> Option<(usize, i32)> {
        self.search_rec(self.root, pos)
    }

    fn search_rec(&self, idx: Option<usize>, pos: usize) -> Option<(usize, i32)> {
        let i = idx?;
        let node = self.node(i);
        let left_size = self.size(node.left);
        if pos < left_size {
            self.search_rec(node.left, pos)
        } else {
            let pos = pos - left_size;
            let live = node.live_len();
            if pos < live {
                Some((i, node.off_begin + pos as i32))
            } else {
                self.search_rec(node.right, pos - live)
            }
        }
    }

    /// The identifier currently occupying position `pos`.
    pub fn id_at(&self, pos: usize) -> Result<Identifier> {
        let (i, off) = self
            .search(pos)
            .ok_or(())
            .or_else(|_| err_at!(Contract, msg: "position {} out of range", pos))?;
        self.node_interval(i).id_at(off)
    }

    // -- deletion --------------------------------------------------

    /// Delete positions `[begin, end]` inclusive, returning the identifier
    /// intervals that were removed (may be more than one if the range
    /// crosses several nodes).
    pub fn del_local(&mut self, begin: usize, end: usize) -> Result<Vec<IdentifierInterval>> {
        if begin > end {
            return err_at!(Contract, msg: "del_local begin {} > end {}", begin, end);
        }
        if end >= self.len() {
            return err_at!(Contract, msg: "del_local end {} out of range {}", end, self.len());
        }
        let mut removed = Vec::new();
        let mut pos = begin;
        let mut remaining = end - begin + 1;
        while remaining > 0 {
            let (i, off) = self
                .search(pos)
                .expect("pos is within range by the bounds check above");
            let node_iv = self.node_interval(i);
            let node_remaining = (node_iv.end() - off + 1) as usize;
            let take = node_remaining.min(remaining);
            let iv = IdentifierInterval::new(node_iv.base().clone(), off, off + take as i32 - 1)?;
            self.del_remote(iv.clone())?;
            removed.push(iv);
            remaining -= take;
            // positions shift left by `take` once removed; `pos` stays put.
        }
        Ok(removed)
    }

    /// Remove `target` from the tree, returning how many elements were
    /// actually live and removed. Idempotent: any portion of `target` that
    /// is no longer present is silently skipped and does not count.
    pub fn del_remote(&mut self, mut target: IdentifierInterval) -> Result<usize> {
        let mut total_removed = 0usize;
        loop {
            let found = self.locate_overlap(self.root, &target);
            let (node_idx, node_iv) = match found {
                Some(i) => (i, self.node_interval(i)),
                None => return Ok(total_removed),
            };
            if !node_iv.base().equals_base(target.base()) {
                return Ok(total_removed);
            }
            let ov_begin = target.begin().max(node_iv.begin());
            let ov_end = target.end().min(node_iv.end());
            if ov_begin > ov_end {
                return Ok(total_removed);
            }
            self.apply_removal(node_idx, ov_begin, ov_end)?;
            total_removed += (ov_end - ov_begin + 1) as usize;
            if ov_end >= target.end() {
                return Ok(total_removed);
            }
            target = IdentifierInterval::new(target.base().clone(), ov_end + 1, target.end())?;
        }
    }

    /// Find a node whose live range overlaps `target`, preferring the one
    /// containing `target.first_id()`. If that exact identifier is no
    /// longer live (an earlier delete already trimmed it away) this still
    /// finds the node with the smallest `first_id()` exceeding it — the
    /// survivor, if any, that a surviving tail of `target` would now live
    /// in — rather than returning `None` the moment a point lookup for
    /// `target.first_id()` alone would miss.
    fn locate_overlap(&self, idx: Option<usize>, target: &IdentifierInterval) -> Option<usize> {
        let i = idx?;
        let iv = self.node_interval(i);
        let point = target.first_id();
        if point > iv.last_id() {
            self.locate_overlap(self.node(i).right, target)
        } else if point < iv.first_id() {
            self.locate_overlap(self.node(i).left, target).or(Some(i))
        } else {
            Some(i)
        }
    }

    /// Trim, split or fully unlink `node_idx` to remove `[ov_begin, ov_end]`
    /// (already known to be a sub-range of that node's live range), then
    /// rebalance the tree rooted there.
    fn apply_removal(&mut self, node_idx: usize, ov_begin: i32, ov_end: i32) -> Result<()> {
        let removed = (ov_end - ov_begin + 1) as usize;
        let block = self.node(node_idx).block;
        self.block_mut(block).shrink(removed)?;

        let (off_begin, off_end) = {
            let n = self.node(node_idx);
            (n.off_begin, n.off_end)
        };

        self.root = self.remove_by_first_id(
            self.root.expect("a located node implies a nonempty tree"),
            &self.node_interval(node_idx).first_id(),
            |tree, idx| {
                debug_assert_eq!(idx, node_idx);
                if ov_begin == off_begin && ov_end == off_end {
                    // whole node emptied: report removal so the caller unlinks it.
                    None
                } else if ov_begin == off_begin {
                    tree.node_mut(idx).off_begin = ov_end + 1;
                    Some(idx)
                } else if ov_end == off_end {
                    tree.node_mut(idx).off_end = ov_begin - 1;
                    Some(idx)
                } else {
                    tree.node_mut(idx).off_end = ov_begin - 1;
                    tree.block_mut(block).ref_count += 1;
                    let right_idx = tree.alloc_node(Node::new(block, ov_end + 1, off_end));
                    let old_right = tree.node(idx).right;
                    let new_right = tree.insert_node_idx(old_right, right_idx);
                    tree.node_mut(idx).right = Some(new_right);
                    Some(idx)
                }
            },
        )?;
        Ok(())
    }

    /// Walk to the node whose interval's `first_id()` equals `target_first`,
    /// apply `mutate` to it (which returns `Some(idx)` to keep the node or
    /// `None` to unlink it), and rebalance back up to the root.
    fn remove_by_first_id(
        &mut self,
        idx: usize,
        target_first: &Identifier,
        mutate: impl FnOnce(&mut Self, usize) -> Option<usize> + Copy,
    ) -> Result<Option<usize>> {
        let node_first = self.node_interval(idx).first_id();
        if *target_first < node_first {
            let left = self.node(idx).left.expect("target is known to exist on the left");
            let new_left = self.remove_by_first_id(left, target_first, mutate)?;
            self.node_mut(idx).left = new_left;
            self.update(idx);
            Ok(Some(self.rebalance(idx)))
        } else if *target_first > node_first {
            let right = self.node(idx).right.expect("target is known to exist on the right");
            let new_right = self.remove_by_first_id(right, target_first, mutate)?;
            self.node_mut(idx).right = new_right;
            self.update(idx);
            Ok(Some(self.rebalance(idx)))
        } else {
            match mutate(self, idx) {
                Some(kept) => {
                    self.update(kept);
                    Ok(Some(self.rebalance(kept)))
                }
                None => {
                    let left = self.node(idx).left;
                    let right = self.node(idx).right;
                    let replacement = self.unlink(idx, left, right)?;
                    self.free_node(idx);
                    Ok(replacement)
                }
            }
        }
    }

    /// Remove a node with children `left`/`right`, returning the new
    /// subtree root (which may legitimately be absent, handled by the
    /// caller via the `Option` wrapping in the public entry points).
    fn unlink(&mut self, _idx: usize, left: Option<usize>, right: Option<usize>) -> Result<Option<usize>> {
        match (left, right) {
            (None, None) => Ok(None),
            (Some(l), None) => Ok(Some(l)),
            (None, Some(r)) => Ok(Some(r)),
            (Some(l), Some(r)) => {
                let (min_idx, new_right) = self.take_min(r);
                self.node_mut(min_idx).left = Some(l);
                self.node_mut(min_idx).right = new_right;
                self.update(min_idx);
                Ok(Some(self.rebalance(min_idx)))
            }
        }
    }

    /// Detach and return the in-order minimum node of the subtree rooted at
    /// `idx`, along with the new subtree root.
    fn take_min(&mut self, idx: usize) -> (usize, Option<usize>) {
        let left = self.node(idx).left;
        match left {
            None => {
                let right = self.node(idx).right;
                (idx, right)
            }
            Some(l) => {
                let (min_idx, new_left) = self.take_min(l);
                self.node_mut(idx).left = new_left;
                self.update(idx);
                (min_idx, Some(self.rebalance(idx)))
            }
        }
    }

    // -- rename support --------------------------------------------------

    /// In-order snapshot of every live identifier interval, the shape a
    /// rename needs to build a [RenamingMap][crate::rename::RenamingMap]
    /// over the entire local sequence at rename time.
    pub fn iter_intervals(&self) -> Vec<IdentifierInterval> {
        let mut out = Vec::new();
        self.collect_intervals(self.root, &mut out);
        out
    }

    fn collect_intervals(&self, idx: Option<usize>, out: &mut Vec<IdentifierInterval>) {
        let i = match idx {
            None => return,
            Some(i) => i,
        };
        let node = self.node(i);
        self.collect_intervals(node.left, out);
        out.push(self.node_interval(i));
        self.collect_intervals(node.right, out);
    }

    /// Replace every live element's identifier with a dense run under
    /// `new_base`, preserving element order and count. A completed rename
    /// maps every currently-live identifier to an exact
    /// `new_base.from_base(offset)`, so the renamed tree always collapses
    /// to a single contiguous block regardless of how fragmented the old
    /// tree was.
    pub fn rebase(&mut self, new_base: &Identifier) -> Result<()> {
        let len = self.len();
        self.nodes.clear();
        self.free_nodes.clear();
        self.blocks.clear();
        self.free_blocks.clear();
        self.root = None;
        if len == 0 {
            return Ok(());
        }
        let interval = IdentifierInterval::new(new_base.clone(), 0, (len - 1) as i32)?;
        self.insert_remote(interval)
    }

    // -- diagnostics --------------------------------------------------

    /// Size and shape snapshot, for logging and soak-test assertions.
    pub fn stats(&self) -> Stats {
        let n_nodes = self.nodes.iter().filter(|n| n.is_some()).count();
        let n_blocks = self.blocks.iter().filter(|b| b.is_some()).count();
        Stats {
            n_nodes,
            n_blocks,
            n_live_elements: self.len(),
            height: self.height(self.root),
            depths: if self.root.is_some() {
                Some(self.depth_histogram())
            } else {
                None
            },
        }
    }

    /// Depth of every leaf, root to leaf.
    pub fn depth_histogram(&self) -> Depth {
        let mut depth = Depth::default();
        self.sample_depths(self.root, 0, &mut depth);
        depth
    }

    fn sample_depths(&self, idx: Option<usize>, depth: usize, out: &mut Depth) {
        let i = match idx {
            None => return,
            Some(i) => i,
        };
        let node = self.node(i);
        if node.left.is_none() && node.right.is_none() {
            out.sample(depth);
        } else {
            self.sample_depths(node.left, depth + 1, out);
            self.sample_depths(node.right, depth + 1, out);
        }
    }
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
