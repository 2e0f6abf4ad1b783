use super::*;
use rand::{rngs::SmallRng, SeedableRng};

fn seeded_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

fn ids_in_order(tree: &RopeTree) -> Vec<crate::identifier::Identifier> {
    (0..tree.len()).map(|p| tree.id_at(p).unwrap()).collect()
}

#[test]
fn test_insert_local_sequential_append_orders_ids() {
    let mut tree = RopeTree::new();
    let mut rng = seeded_rng(1);
    for i in 0..10 {
        let pos = tree.len();
        tree.insert_local(pos, 1, 1, i, &mut rng).unwrap();
    }
    assert_eq!(tree.len(), 10);
    let ids = ids_in_order(&tree);
    for w in ids.windows(2) {
        assert!(w[0] < w[1]);
    }
}

#[test]
fn test_insert_local_in_middle_preserves_order() {
    let mut tree = RopeTree::new();
    let mut rng = seeded_rng(2);
    tree.insert_local(0, 5, 1, 0, &mut rng).unwrap();
    tree.insert_local(2, 3, 1, 1, &mut rng).unwrap();
    assert_eq!(tree.len(), 8);
    let ids = ids_in_order(&tree);
    for w in ids.windows(2) {
        assert!(w[0] < w[1]);
    }
}

#[test]
fn test_insert_local_rejects_out_of_range_position() {
    let mut tree = RopeTree::new();
    let mut rng = seeded_rng(3);
    assert!(tree.insert_local(1, 1, 1, 0, &mut rng).is_err());
}

#[test]
fn test_del_local_shrinks_and_preserves_order() {
    let mut tree = RopeTree::new();
    let mut rng = seeded_rng(4);
    tree.insert_local(0, 10, 1, 0, &mut rng).unwrap();
    let before = ids_in_order(&tree);
    let removed = tree.del_local(3, 6).unwrap();
    assert_eq!(removed.iter().map(|iv| iv.length()).sum::<i64>(), 4);
    assert_eq!(tree.len(), 6);
    let after = ids_in_order(&tree);
    assert_eq!(after, [&before[0..3], &before[7..10]].concat());
}

#[test]
fn test_del_remote_is_idempotent() {
    let mut tree = RopeTree::new();
    let mut rng = seeded_rng(5);
    tree.insert_local(0, 10, 1, 0, &mut rng).unwrap();
    let removed = tree.del_local(2, 5).unwrap();
    assert_eq!(tree.len(), 6);
    for iv in &removed {
        tree.del_remote(iv.clone()).unwrap();
    }
    assert_eq!(tree.len(), 6);
}

#[test]
fn test_del_remote_removes_surviving_tail_after_head_already_trimmed() {
    let mut tree = RopeTree::new();
    let mut rng = seeded_rng(12);
    let whole = tree.insert_local(0, 6, 1, 0, &mut rng).unwrap();
    assert_eq!(tree.len(), 6);

    // Trim away the head of the run locally; the node now only covers the
    // tail of `whole`'s interval.
    tree.del_local(0, 2).unwrap();
    assert_eq!(tree.len(), 3);

    // A remote delete naming the *entire original* interval must still
    // reach and remove the surviving tail, not bail out because a point
    // lookup on `whole`'s first id no longer finds anything live.
    let removed = tree.del_remote(whole).unwrap();
    assert_eq!(removed, 3);
    assert_eq!(tree.len(), 0);
}

#[test]
fn test_interior_delete_splits_node_shares_block() {
    let mut tree = RopeTree::new();
    let mut rng = seeded_rng(6);
    tree.insert_local(0, 10, 1, 0, &mut rng).unwrap();
    let before = tree.stats();
    assert_eq!(before.n_nodes, 1);
    assert_eq!(before.n_blocks, 1);
    tree.del_local(3, 6).unwrap();
    let after = tree.stats();
    assert_eq!(after.n_nodes, 2, "interior delete should split into two nodes");
    assert_eq!(after.n_blocks, 1, "the two nodes should still share one block");
    assert_eq!(after.n_live_elements, 6);
}

#[test]
fn test_search_matches_positional_order() {
    let mut tree = RopeTree::new();
    let mut rng = seeded_rng(7);
    tree.insert_local(0, 5, 1, 0, &mut rng).unwrap();
    tree.insert_local(5, 5, 2, 0, &mut rng).unwrap();
    let mut prev = None;
    for pos in 0..tree.len() {
        let id = tree.id_at(pos).unwrap();
        if let Some(p) = prev {
            assert!(p < id);
        }
        prev = Some(id);
    }
}

#[test]
fn test_insert_remote_application_order_does_not_affect_final_order() {
    let mut rng = seeded_rng(8);
    let mut origin = RopeTree::new();
    let iv_a = origin.insert_local(0, 3, 1, 0, &mut rng).unwrap();
    let iv_b = origin.insert_local(3, 3, 1, 1, &mut rng).unwrap();
    let iv_c = origin.insert_local(0, 2, 2, 0, &mut rng).unwrap();
    let expected = ids_in_order(&origin);

    let mut replica_a = RopeTree::new();
    replica_a.insert_remote(iv_a.clone()).unwrap();
    replica_a.insert_remote(iv_b.clone()).unwrap();
    replica_a.insert_remote(iv_c.clone()).unwrap();

    let mut replica_b = RopeTree::new();
    replica_b.insert_remote(iv_c).unwrap();
    replica_b.insert_remote(iv_b).unwrap();
    replica_b.insert_remote(iv_a).unwrap();

    assert_eq!(ids_in_order(&replica_a), expected);
    assert_eq!(ids_in_order(&replica_b), expected);
}

#[test]
fn test_del_local_rejects_out_of_range() {
    let mut tree = RopeTree::new();
    let mut rng = seeded_rng(9);
    tree.insert_local(0, 3, 1, 0, &mut rng).unwrap();
    assert!(tree.del_local(1, 0).is_err());
    assert!(tree.del_local(0, 3).is_err());
}

#[test]
fn test_stats_and_depth_on_empty_tree() {
    let tree = RopeTree::new();
    let stats = tree.stats();
    assert_eq!(stats.n_nodes, 0);
    assert!(stats.depths.is_none());
}

#[test]
fn test_iter_intervals_matches_positional_order() {
    let mut tree = RopeTree::new();
    let mut rng = seeded_rng(10);
    tree.insert_local(0, 4, 1, 0, &mut rng).unwrap();
    tree.insert_local(2, 3, 2, 0, &mut rng).unwrap();
    tree.del_local(1, 1).unwrap();

    let from_search = ids_in_order(&tree);
    let from_intervals: Vec<_> = tree
        .iter_intervals()
        .iter()
        .flat_map(|iv| (iv.begin()..=iv.end()).map(move |o| iv.id_at(o).unwrap()))
        .collect();
    assert_eq!(from_search, from_intervals);
}

#[test]
fn test_rebase_collapses_to_one_dense_block() {
    use crate::{identifier::Identifier, tuple::Tuple};

    let mut tree = RopeTree::new();
    let mut rng = seeded_rng(11);
    tree.insert_local(0, 4, 1, 0, &mut rng).unwrap();
    tree.insert_local(2, 3, 2, 0, &mut rng).unwrap();
    tree.del_local(1, 1).unwrap();
    let len_before = tree.len();

    let new_base = Identifier::new(vec![Tuple::new(0, 9, 3, 0)]).unwrap();
    tree.rebase(&new_base).unwrap();

    assert_eq!(tree.len(), len_before);
    let stats = tree.stats();
    assert_eq!(stats.n_nodes, 1);
    assert_eq!(stats.n_blocks, 1);
    for (pos, expected_offset) in (0..tree.len() as i32).enumerate() {
        assert_eq!(tree.id_at(pos).unwrap(), new_base.from_base(expected_offset));
    }
}

#[test]
fn test_rebase_of_empty_tree_stays_empty() {
    use crate::{identifier::Identifier, tuple::Tuple};

    let mut tree = RopeTree::new();
    let new_base = Identifier::new(vec![Tuple::new(0, 9, 3, 0)]).unwrap();
    tree.rebase(&new_base).unwrap();
    assert!(tree.is_empty());
}
