//! Core of a sequence CRDT (the LogootSplit family) for concurrent
//! collaborative editing of a shared, totally ordered sequence of elements.
//!
//! Replicas apply local edits optimistically, broadcast the resulting
//! operations asynchronously, and converge to the same sequence after
//! delivering the same set of operations, in any order, without central
//! coordination.
//!
//! This crate covers three layers:
//!
//! - a dense [identifier] space ([tuple], [interval], [factory]) that
//!   orders elements and always admits a fresh identifier between any two
//!   existing ones;
//! - a [block]-based [rope] tree mapping integer positions to identifiers
//!   and back, wrapped by [list] into a replicable sequence that produces
//!   and applies ops;
//! - a renaming protocol ([rename], [epoch]) that periodically compacts
//!   identifiers back down to a short, dense form while staying able to
//!   translate operations generated under older identifier schemes, tied
//!   together by [renamable].
//!
//! Transport, broadcast, causal delivery and the embedding application's own
//! text buffer are out of scope: this crate assumes every operation is
//! delivered exactly once per replica, in arbitrary order, and hands back
//! [list::TextOp] values for the caller to replay against its own buffer.

pub mod block;
pub mod config;
pub mod epoch;
mod error;
pub mod factory;
pub mod identifier;
pub mod interval;
pub mod list;
pub mod random;
pub mod rename;
pub mod renamable;
pub mod rope;
pub mod tuple;
pub mod wire;

pub use crate::error::{Error, Result};
