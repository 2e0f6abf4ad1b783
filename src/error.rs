//! Module implement the error-type used across this crate.

use std::{fmt, result};

/// Error variants that can be returned by this package.
///
/// None of these are expected in normal operation between well-behaved
/// replicas; [Error::Contract] and [Error::Overflow] guard preconditions
/// documented on the functions that return them, while [Error::Decode]
/// guards the structural contract of inbound wire payloads: out-of-range
/// or missing fields never panic, they are rejected.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// A precondition was violated by the caller, for example an
    /// out-of-range position, `id1 >= id2` passed to the factory, or an
    /// empty interval list passed to the renaming protocol.
    Contract(String),
    /// An inbound operation payload failed structural or range validation.
    Decode(String),
    /// Identifier or tuple arithmetic would escape the `i32` contract.
    Overflow(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        match self {
            Error::Contract(msg) => write!(f, "contract-violation: {}", msg),
            Error::Decode(msg) => write!(f, "decode-error: {}", msg),
            Error::Overflow(msg) => write!(f, "overflow: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Result type used throughout this crate.
pub type Result<T> = result::Result<T, Error>;

/// Stamp `file!()`/`line!()` onto an [Error] variant.
///
/// ```ignore
/// err_at!(Contract, msg: "pos {} out of range 0..{}", pos, len)?;
/// err_at!(Decode, serde_json::from_str(text))?;
/// ```
#[macro_export]
macro_rules! err_at {
    ($v:ident, msg: $($arg:expr),+) => {{
        let msg = format!($($arg),+);
        Err($crate::Error::$v(format!("{}:{} {}", file!(), line!(), msg)))
    }};
    ($v:ident, $e:expr) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => Err($crate::Error::$v(format!("{}:{} {}", file!(), line!(), err))),
        }
    }};
}
