//! JSON (de)serialization of the external operation contract.
//!
//! Transport, broadcast and causal delivery are explicitly out of scope;
//! this module only owns the structural contract: turning an [Operation]
//! into bytes and back, rejecting malformed input by returning
//! [Error::Decode] rather than panicking.

use serde::{de::DeserializeOwned, Serialize};

use crate::{err_at, renamable::Operation, Error, Result};

/// Serialize an operation to its wire JSON form.
pub fn encode_operation<T: Serialize>(op: &Operation<T>) -> Result<String> {
    err_at!(Decode, serde_json::to_string(op))
}

/// Parse a wire JSON payload into an [Operation].
///
/// # Errors
/// Returns [Error::Decode] for anything that fails structural or numeric
/// range validation: missing fields, a `base` that isn't an array, fields
/// outside the `i32` domain, or an unrecognized `kind` tag. No replica
/// state is touched on failure.
pub fn decode_operation<T: DeserializeOwned>(json: &str) -> Result<Operation<T>> {
    err_at!(Decode, serde_json::from_str(json))
}

#[cfg(test)]
#[path = "wire_test.rs"]
mod wire_test;
