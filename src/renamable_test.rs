use super::*;
use rand::{rngs::SmallRng, SeedableRng};

fn seeded_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

fn apply_effects(buf: &mut Vec<char>, effects: Vec<TextOp<char>>) {
    for eff in effects {
        match eff {
            TextOp::Insert { pos, content } => buf.splice(pos..pos, content),
            TextOp::Delete { pos, length } => buf.splice(pos..pos + length, std::iter::empty()),
        };
    }
}

#[test]
fn test_insert_and_apply_within_same_epoch() {
    let mut rng_a = seeded_rng(1);
    let mut a = RenamableList::new(EpochId::new(0, 0));
    let mut b = RenamableList::new(EpochId::new(0, 0));
    let mut buf_a = Vec::new();
    let mut buf_b = Vec::new();

    let op = a.insert(0, "hello".chars().collect(), 1, 0, &mut rng_a).unwrap();
    apply_effects(
        &mut buf_a,
        vec![TextOp::Insert { pos: 0, content: op.inner.content.clone() }],
    );
    let effects = b.apply_insert(&op).unwrap();
    apply_effects(&mut buf_b, effects);

    assert_eq!(buf_a, buf_b);
    assert_eq!(buf_b.iter().collect::<String>(), "hello");
}

#[test]
fn test_rename_collapses_local_sequence_without_changing_content() {
    let mut rng = seeded_rng(2);
    let mut a = RenamableList::new(EpochId::new(0, 0));
    a.insert(0, "hello".chars().collect(), 1, 0, &mut rng).unwrap();
    assert_eq!(a.len(), 5);

    let rename_op = a.rename(7, 0, &mut rng).unwrap();
    assert_eq!(a.current_epoch(), EpochId::new(7, 0));
    assert_eq!(a.len(), 5);
    assert_eq!(
        rename_op.renamed_id_intervals.iter().map(|iv| iv.length()).sum::<i64>(),
        5
    );
}

#[test]
fn test_late_insert_from_before_rename_translates_into_new_epoch() {
    let mut rng_a = seeded_rng(3);
    let mut rng_b = seeded_rng(4);
    let genesis = EpochId::new(0, 0);
    let mut a = RenamableList::new(genesis);
    let mut b = RenamableList::new(genesis);

    let op1 = a.insert(0, "abcde".chars().collect(), 1, 0, &mut rng_a).unwrap();
    b.apply_insert(&op1).unwrap();

    // A renames; B has not heard about it yet, but has the epoch tree
    // extended so it can still translate A's future ops.
    let rename_op = a.rename(7, 0, &mut rng_a).unwrap();
    b.apply_rename(&rename_op).unwrap();

    // B, still on genesis locally, issues an insert tagged with genesis.
    assert_eq!(b.current_epoch(), genesis);
    let op2 = b.insert(2, "XY".chars().collect(), 2, 5, &mut rng_b).unwrap();
    assert_eq!(op2.epoch, genesis);

    // A, now on epoch (7, 0), must translate the op before applying it.
    let mut buf_a: Vec<char> = "abcde".chars().collect();
    let effects = a.apply_insert(&op2).unwrap();
    apply_effects(&mut buf_a, effects);
    assert_eq!(buf_a.iter().collect::<String>(), "abXYcde");
    assert_eq!(a.len(), 7);
}

#[test]
fn test_late_delete_of_original_first_id_after_rename() {
    let mut rng = seeded_rng(5);
    let genesis = EpochId::new(0, 0);
    let mut a = RenamableList::new(genesis);
    let op1 = a.insert(0, "abcde".chars().collect(), 1, 0, &mut rng).unwrap();

    let mut c = RenamableList::new(genesis);
    c.apply_insert(&op1).unwrap();
    c.rename(7, 0, &mut rng).unwrap();

    // A deletes the first element under its still-genesis epoch.
    let del = a.del(0, 0).unwrap();
    assert_eq!(del.epoch, genesis);

    let mut buf_c: Vec<char> = "abcde".chars().collect();
    let effects = c.apply_delete::<char>(&del).unwrap();
    apply_effects(&mut buf_c, effects);
    assert_eq!(buf_c.iter().collect::<String>(), "bcde");
}

#[test]
fn test_apply_delete_is_idempotent() {
    let mut rng = seeded_rng(6);
    let genesis = EpochId::new(0, 0);
    let mut a = RenamableList::new(genesis);
    let op1 = a.insert(0, "abcde".chars().collect(), 1, 0, &mut rng).unwrap();

    let mut b = RenamableList::new(genesis);
    b.apply_insert(&op1).unwrap();

    let del = a.del(1, 2).unwrap();
    let first = b.apply_delete::<char>(&del).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(b.len(), 3);

    let second = b.apply_delete::<char>(&del).unwrap();
    assert!(second.is_empty());
    assert_eq!(b.len(), 3);
}

#[test]
fn test_operation_enum_dispatches_to_apply() {
    let mut rng = seeded_rng(7);
    let genesis = EpochId::new(0, 0);
    let mut a = RenamableList::new(genesis);
    let mut b = RenamableList::new(genesis);

    let op = a.insert(0, "xy".chars().collect(), 1, 0, &mut rng).unwrap();
    let operation = Operation::Insert(op);
    let effects = operation.apply(&mut b).unwrap();
    assert_eq!(effects.len(), 1);
    assert_eq!(b.len(), 2);
}

#[test]
fn test_operation_rename_variant_has_no_positional_effect() {
    let mut rng = seeded_rng(9);
    let genesis = EpochId::new(0, 0);
    let mut a = RenamableList::new(genesis);
    a.insert(0, "xy".chars().collect(), 1, 0, &mut rng).unwrap();
    let rename_op = a.rename(7, 0, &mut rng).unwrap();

    let mut b = RenamableList::new(genesis);
    b.apply_insert(&RenamableInsertOp {
        inner: InsertOp {
            id_interval: rename_op.renamed_id_intervals[0].clone(),
            content: vec!['x', 'y'],
        },
        epoch: genesis,
    })
    .unwrap();

    let operation: Operation<char> = Operation::Rename(rename_op);
    let effects = operation.apply(&mut b).unwrap();
    assert!(effects.is_empty());
}

#[test]
fn test_needs_rename_trips_on_op_count_threshold() {
    let mut rng = seeded_rng(8);
    let mut a = RenamableList::new(EpochId::new(0, 0));
    let config = Config {
        rename_trigger_ops: 3,
        rename_trigger_identifier_len: 1000,
    };
    assert!(!a.needs_rename(&config));
    for i in 0..3 {
        a.insert(0, vec!['x'], 1, i, &mut rng).unwrap();
    }
    assert!(a.needs_rename(&config));
}
