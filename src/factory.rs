//! Generation of a fresh identifier strictly between two existing ones.

use log::debug;

use crate::{
    err_at,
    identifier::Identifier,
    random::RandomSource,
    tuple::{Tuple, MAX_TUPLE, MIN_TUPLE},
    Error, Result,
};

/// One side of a `create_between` call: either a real identifier, or a
/// virtual bound standing for `-infinity` / `+infinity`.
#[derive(Debug, Clone, Copy)]
pub enum Bound<'a> {
    Id(&'a Identifier),
    NegInf,
    PosInf,
}

/// Tuple at `depth` when `bound` plays the role of the *lower* argument:
/// padded with [MIN_TUPLE] once its own tuples are exhausted.
fn lower_tuple_at(bound: Bound, depth: usize) -> Tuple {
    match bound {
        Bound::NegInf => MIN_TUPLE,
        Bound::PosInf => MAX_TUPLE, // precluded by the `precedes` precondition
        Bound::Id(id) => id.tuples().get(depth).copied().unwrap_or(MIN_TUPLE),
    }
}

/// Tuple at `depth` when `bound` plays the role of the *upper* argument:
/// padded with [MAX_TUPLE] once its own tuples are exhausted.
fn upper_tuple_at(bound: Bound, depth: usize) -> Tuple {
    match bound {
        Bound::PosInf => MAX_TUPLE,
        Bound::NegInf => MIN_TUPLE, // precluded by the `precedes` precondition
        Bound::Id(id) => id.tuples().get(depth).copied().unwrap_or(MAX_TUPLE),
    }
}

fn id_lt_bound(id: &Identifier, bound: Bound) -> bool {
    match bound {
        Bound::PosInf => true,
        Bound::NegInf => false,
        Bound::Id(x) => id < x,
    }
}

fn bound_lt_id(bound: Bound, id: &Identifier) -> bool {
    match bound {
        Bound::NegInf => true,
        Bound::PosInf => false,
        Bound::Id(x) => x < id,
    }
}

/// Generate a fresh [Identifier] `id` with `id1 < id < id2`.
///
/// `id1`/`id2` may be [Bound::NegInf]/[Bound::PosInf] to generate at the
/// very beginning or end of the sequence. `replica_number`/`clock` are
/// stamped onto the single fresh tuple this call appends; every tuple
/// inherited from `id1` along the way keeps its original `replica_number`
/// and `clock`, which is what lets two replicas observe the same
/// identifier prefix regardless of who created it.
///
/// # Errors
/// Returns [Error::Contract] if `id1` is not strictly less than `id2`.
///
/// # Panics (debug builds only)
/// `debug_assert!`s the bracketing postcondition before returning, as a
/// second line of defense against a logic error in this function itself.
pub fn create_between<R: RandomSource>(
    id1: Bound,
    id2: Bound,
    replica_number: i32,
    clock: i32,
    rng: &mut R,
) -> Result<Identifier> {
    if !precedes(id1, id2) {
        return err_at!(Contract, msg: "create_between requires id1 < id2");
    }

    let mut tuples: Vec<Tuple> = Vec::new();
    let mut depth = 0usize;
    loop {
        let t1 = lower_tuple_at(id1, depth);
        let t2 = upper_tuple_at(id2, depth);

        if (t2.random as i64) - (t1.random as i64) >= 2 {
            let random = rng.next_between(t1.random, t2.random);
            tuples.push(Tuple::new(random, replica_number, clock, 0));
            break;
        }

        // Gap too small at this depth to fit a fresh random draw: inherit
        // t1 verbatim (guarantees `id > id1` once a later depth diverges)
        // and keep descending.
        tuples.push(t1);
        depth += 1;

        if depth > MAX_DEPTH {
            return err_at!(
                Contract,
                msg: "identifier space exhausted after {} levels between two bounds",
                depth
            );
        }
    }

    let id = Identifier::from_vec_unchecked(tuples);
    debug!(
        "factory: created {:?} between {:?} and {:?} (replica={}, clock={})",
        id, id1, id2, replica_number, clock
    );
    debug_assert!(bound_lt_id(id1, &id));
    debug_assert!(id_lt_bound(&id, id2));
    Ok(id)
}

/// Safety valve: with genuine `i32` gaps this never gets remotely close,
/// since a gap of 2 or more terminates the loop immediately; this only
/// guards against a future regression turning the loop into an infinite one.
const MAX_DEPTH: usize = 4096;

fn precedes(a: Bound, b: Bound) -> bool {
    match (a, b) {
        (Bound::NegInf, Bound::NegInf) | (Bound::PosInf, Bound::PosInf) => false,
        (Bound::NegInf, _) => true,
        (_, Bound::PosInf) => true,
        (Bound::PosInf, _) => false,
        (_, Bound::NegInf) => false,
        (Bound::Id(x), Bound::Id(y)) => x < y,
    }
}

#[cfg(test)]
#[path = "factory_test.rs"]
mod factory_test;
