use super::*;
use rand::{rngs::SmallRng, SeedableRng};

fn seeded_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

#[test]
fn test_insert_and_convergence_across_two_replicas() {
    let mut rng_a = seeded_rng(1);
    let mut rng_b = seeded_rng(2);
    let mut a = LogootSList::new();
    let mut b = LogootSList::new();
    let mut buf_a: Vec<char> = Vec::new();
    let mut buf_b: Vec<char> = Vec::new();

    let op1 = a
        .insert(0, "hello".chars().collect(), 1, 0, &mut rng_a)
        .unwrap();
    buf_a.splice(0..0, op1.content.iter().copied());

    let effects = b.apply_insert(&op1).unwrap();
    for eff in effects {
        if let TextOp::Insert { pos, content } = eff {
            buf_b.splice(pos..pos, content);
        }
    }
    assert_eq!(buf_a, buf_b);

    let op2 = b
        .insert(5, "world".chars().collect(), 2, 0, &mut rng_b)
        .unwrap();
    buf_b.splice(5..5, op2.content.iter().copied());

    let effects = a.apply_insert(&op2).unwrap();
    for eff in effects {
        if let TextOp::Insert { pos, content } = eff {
            buf_a.splice(pos..pos, content);
        }
    }
    assert_eq!(buf_a, buf_b);
    assert_eq!(buf_a.iter().collect::<String>(), "helloworld");
}

#[test]
fn test_delete_fragments_across_nodes_and_applies_remotely() {
    let mut rng_a = seeded_rng(3);
    let mut a = LogootSList::new();
    let mut b = LogootSList::new();

    let op1 = a
        .insert(0, "abcde".chars().collect(), 1, 0, &mut rng_a)
        .unwrap();
    b.apply_insert(&op1).unwrap();
    let op2 = a
        .insert(5, "fghij".chars().collect(), 1, 1, &mut rng_a)
        .unwrap();
    b.apply_insert(&op2).unwrap();
    assert_eq!(a.len(), 10);
    assert_eq!(b.len(), 10);

    let del = a.del(3, 6).unwrap();
    assert_eq!(a.len(), 6);

    let effects = b.apply_del::<char>(&del).unwrap();
    assert_eq!(b.len(), 6);
    let total: usize = effects
        .into_iter()
        .map(|e| match e {
            TextOp::Delete { length, .. } => length,
            _ => 0,
        })
        .sum();
    assert_eq!(total, 4);
}

#[test]
fn test_apply_del_is_idempotent_on_replay() {
    let mut rng = seeded_rng(4);
    let mut a = LogootSList::new();
    let mut b = LogootSList::new();
    let op1 = a.insert(0, vec![1u8, 2, 3, 4, 5], 1, 0, &mut rng).unwrap();
    b.apply_insert(&op1).unwrap();

    let del = a.del(1, 3).unwrap();
    b.apply_del::<u8>(&del).unwrap();
    assert_eq!(b.len(), 2);

    // Replaying the same delete op must be a silent no-op.
    let effects = b.apply_del::<u8>(&del).unwrap();
    assert!(effects.is_empty());
    assert_eq!(b.len(), 2);
}

#[test]
fn test_empty_list() {
    let list: LogootSList = LogootSList::new();
    assert!(list.is_empty());
    assert_eq!(list.len(), 0);
}

#[test]
fn test_snapshot_intervals_covers_whole_sequence_and_rebase_preserves_len() {
    use crate::{identifier::Identifier, tuple::Tuple};

    let mut rng = seeded_rng(5);
    let mut list = LogootSList::new();
    list.insert(0, "abcde".chars().collect(), 1, 0, &mut rng).unwrap();
    list.insert(5, "fghij".chars().collect(), 2, 0, &mut rng).unwrap();
    list.del(3, 6).unwrap();

    let snapshot = list.snapshot_intervals();
    let total: i64 = snapshot.iter().map(|iv| iv.length()).sum();
    assert_eq!(total as usize, list.len());

    let new_base = Identifier::new(vec![Tuple::new(0, 9, 1, 0)]).unwrap();
    list.rebase(&new_base).unwrap();
    assert_eq!(list.len(), total as usize);
}
