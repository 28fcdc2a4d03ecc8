use crate::error::EngineError;
use crate::test_utils::refined_hierarchy;
use crate::tree::{FlatTree, KdTree};

#[test]
fn test_rebuild_idempotence() {
  let h = refined_hierarchy();
  let tree = KdTree::build_full(&h).unwrap();
  let flat = tree.to_flat();

  let rebuilt = KdTree::from_flat(&flat, tree.min_level(), tree.max_level()).unwrap();
  assert_eq!(rebuilt.node_count(), tree.node_count());
  assert_eq!(rebuilt.sum_volume(), tree.sum_volume());
  assert_eq!(
    rebuilt.depth_first_touch().collect::<Vec<_>>(),
    tree.depth_first_touch().collect::<Vec<_>>()
  );
  rebuilt.check_tree(&h).unwrap();

  // Flattening again reproduces the same arrays.
  assert_eq!(rebuilt.to_flat(), flat);
}

#[test]
fn test_flat_arrays_are_canonical_order() {
  let h = refined_hierarchy();
  let tree = KdTree::build_full(&h).unwrap();
  let flat = tree.to_flat();
  assert_eq!(flat.node_ids, tree.depth_traverse().collect::<Vec<_>>());
  assert_eq!(flat.node_ids[0], crate::tree::ROOT_ID);
}

#[test]
fn test_malformed_flat_is_rejected() {
  assert!(matches!(
    KdTree::from_flat(&FlatTree::default(), 0, 0),
    Err(EngineError::MalformedFlatTree(_))
  ));

  let h = refined_hierarchy();
  let tree = KdTree::build_full(&h).unwrap();

  let mut missing_child = tree.to_flat();
  // Drop the last node; its parent's split now dangles.
  missing_child.node_ids.pop();
  missing_child.left_edges.pop();
  missing_child.right_edges.pop();
  missing_child.block_ids.pop();
  missing_child.split_dims.pop();
  missing_child.split_poss.pop();
  assert!(matches!(
    KdTree::from_flat(&missing_child, 0, 1),
    Err(EngineError::MalformedFlatTree(_))
  ));

  let mut misaligned = tree.to_flat();
  misaligned.split_poss.pop();
  assert!(matches!(
    KdTree::from_flat(&misaligned, 0, 1),
    Err(EngineError::MalformedFlatTree(_))
  ));
}
