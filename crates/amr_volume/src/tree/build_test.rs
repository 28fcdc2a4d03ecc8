use glam::DVec3;

use crate::error::EngineError;
use crate::test_utils::{quadrant_hierarchy, refined_hierarchy, unit_domain};
use crate::tree::KdTree;
use crate::types::Block;

use super::*;

#[test]
fn test_quadrants_build_complete_top() {
  let h = quadrant_hierarchy();
  let tree = KdTree::build_full(&h).unwrap();

  // Root splits x at 0.5, both children split y at 0.5; the four quadrant
  // leaves land at ids 4..8.
  let root = tree.get(ROOT_ID).unwrap();
  assert_eq!(root.split, Some(Split { dim: 0, pos: 0.5 }));
  for id in [2, 3] {
    assert_eq!(tree.get(id).unwrap().split, Some(Split { dim: 1, pos: 0.5 }));
  }
  let backings: Vec<_> = (4..8).map(|id| tree.get(id).unwrap().backing).collect();
  assert_eq!(
    backings,
    vec![Some(0), Some(1), Some(2), Some(3)],
    "quadrant leaves in canonical order"
  );
  tree.check_tree(&h).unwrap();
}

#[test]
fn test_exact_match_claims_hole_without_split() {
  let mut h = crate::hierarchy::InMemoryHierarchy::new(unit_domain(), [4, 4, 4]);
  h.add_block(0, DVec3::ZERO, DVec3::splat(1.0));
  let tree = KdTree::build_full(&h).unwrap();
  assert_eq!(tree.node_count(), 1, "no split for an exact match");
  assert_eq!(tree.get(ROOT_ID).unwrap().backing, Some(0));
}

#[test]
fn test_fine_block_inherits_coarse_backing() {
  let h = refined_hierarchy();
  let tree = KdTree::build_full(&h).unwrap();
  tree.check_tree(&h).unwrap();

  // The refined corner leaf points at the fine block; every other leaf under
  // the left half still points at the coarse block.
  let fine = tree.locate_node(DVec3::splat(0.1)).unwrap();
  assert_eq!(tree.node(fine).backing, Some(2));
  let coarse = tree.locate_node(DVec3::new(0.1, 0.1, 0.9)).unwrap();
  assert_eq!(tree.node(coarse).backing, Some(0));

  // All leaves remain inside their backing blocks.
  for id in tree.leaves() {
    tree.cell_bounds(&h, id).unwrap().unwrap();
  }
}

#[test]
fn test_straddling_block_is_structural_error() {
  let h = quadrant_hierarchy();
  let mut tree = KdTree::build_full(&h).unwrap();
  let straddler = Block {
    id: 99,
    level: 1,
    left_edge: DVec3::new(0.375, 0.0, 0.0),
    right_edge: DVec3::new(0.625, 0.25, 0.25),
  };
  match tree.add_blocks(&[straddler]) {
    Err(EngineError::UnalignedBlock { block: 99, dim: 0, .. }) => {}
    other => panic!("expected UnalignedBlock, got {other:?}"),
  }
}

#[test]
fn test_block_outside_domain_is_structural_error() {
  let mut tree = KdTree::empty(unit_domain(), 0, 0);
  let outside = Block {
    id: 7,
    level: 0,
    left_edge: DVec3::splat(0.5),
    right_edge: DVec3::splat(1.5),
  };
  assert!(matches!(
    tree.add_blocks(&[outside]),
    Err(EngineError::UnalignedBlock { block: 7, .. })
  ));
}

#[test]
fn test_level_range_filters_blocks() {
  let h = refined_hierarchy();
  let coarse_only = KdTree::build(&h, 0, 0).unwrap();
  assert!(coarse_only
    .leaves()
    .all(|id| coarse_only.node(id).backing != Some(2)));
  let full = KdTree::build(&h, 0, 1).unwrap();
  assert!(full.leaves().any(|id| full.node(id).backing == Some(2)));
}
