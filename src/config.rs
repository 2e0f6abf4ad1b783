//! Tunables for when an embedding application should trigger a rename.
//!
//! The core never renames on its own initiative: renaming is something a
//! replica *issues*, deliberately, not a background process. `Config` only
//! holds the thresholds an application can poll against via
//! [crate::renamable::RenamableList::needs_rename] to decide when issuing
//! one is worthwhile: plain public fields, an `Arbitrary` impl for
//! property tests, a `Default`.

use serde::{Deserialize, Serialize};

/// Thresholds used by [crate::renamable::RenamableList::needs_rename] to
/// flag that identifiers have grown long or numerous enough that a rename
/// would shrink them back down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Suggest a rename once the local epoch has carried this many ops.
    pub rename_trigger_ops: u64,
    /// Suggest a rename once any live identifier grows this many tuples
    /// deep (heavy concurrent editing at one spot lengthens identifiers).
    pub rename_trigger_identifier_len: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            rename_trigger_ops: 10_000,
            rename_trigger_identifier_len: 32,
        }
    }
}

impl<'a> arbitrary::Arbitrary<'a> for Config {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Config {
            rename_trigger_ops: u.int_in_range(1..=1_000_000)?,
            rename_trigger_identifier_len: u.int_in_range(2..=256)?,
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
