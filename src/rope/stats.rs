//! Size and shape diagnostics for a [RopeTree][crate::rope::RopeTree].

use std::fmt;

use crate::rope::Depth;

/// Snapshot of a rope tree's size and shape.
pub struct Stats {
    pub n_nodes: usize,
    pub n_blocks: usize,
    pub n_live_elements: usize,
    pub height: i32,
    pub depths: Option<Depth>,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let d = self
            .depths
            .as_ref()
            .map_or("none".to_string(), |x| x.to_string());
        writeln!(
            f,
            "rope = {{ n_nodes={}, n_blocks={}, n_live_elements={}, height={} }}",
            self.n_nodes, self.n_blocks, self.n_live_elements, self.height
        )?;
        writeln!(f, "rope.depths = {}", d)
    }
}

#[cfg(test)]
#[path = "stats_test.rs"]
mod stats_test;
