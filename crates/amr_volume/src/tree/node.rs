//! KdNode - one record of the arena kd-tree.
//!
//! Nodes are identified by complete-binary-tree numbering: root = 1, children
//! of node `n` are `2n` and `2n + 1`. Parent/child relations are index
//! arithmetic, so any node can be located from its id alone without pointer
//! traversal - the reduction step depends on this to recompute ownership
//! purely from rank/node-id arithmetic.

use glam::DVec3;

use crate::types::{Aabb3, BlockId};

/// Identifier of a node under complete-binary-tree numbering.
pub type NodeId = u64;

/// Id of the root node.
pub const ROOT_ID: NodeId = 1;

/// Parent of `id`, or `None` for the root.
#[inline]
pub fn parent_id(id: NodeId) -> Option<NodeId> {
  if id <= ROOT_ID {
    None
  } else {
    Some(id / 2)
  }
}

/// Left child of `id`.
#[inline]
pub fn left_child_id(id: NodeId) -> NodeId {
  id * 2
}

/// Right child of `id`.
#[inline]
pub fn right_child_id(id: NodeId) -> NodeId {
  id * 2 + 1
}

/// Whether `id` is a left child of its parent.
#[inline]
pub fn is_left_child(id: NodeId) -> bool {
  id > ROOT_ID && id % 2 == 0
}

/// Depth of `id` (root = 0).
#[inline]
pub fn node_depth(id: NodeId) -> u32 {
  debug_assert!(id >= ROOT_ID, "node ids start at 1");
  63 - id.leading_zeros() as u32
}

/// Split plane of an internal node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Split {
  /// Split dimension (0 = x, 1 = y, 2 = z).
  pub dim: usize,
  /// Split position along `dim`.
  pub pos: f64,
}

/// One node of the spatial partition tree.
///
/// A node is either an internal split node (`split` set, both children
/// present in the arena) or a terminal leaf referencing at most one block.
/// A leaf with `backing == None` is a hole: no block occupies that
/// sub-volume.
#[derive(Clone, Debug)]
pub struct KdNode {
  /// Minimum corner of the node's region.
  pub left_edge: DVec3,
  /// Maximum corner of the node's region.
  pub right_edge: DVec3,
  /// Block referenced by this leaf, if any.
  pub backing: Option<BlockId>,
  /// Split plane; `None` for leaves.
  pub split: Option<Split>,
}

impl KdNode {
  /// Create a leaf covering `bounds`, optionally backed by a block.
  pub fn leaf(bounds: Aabb3, backing: Option<BlockId>) -> Self {
    Self {
      left_edge: bounds.min,
      right_edge: bounds.max,
      backing,
      split: None,
    }
  }

  /// Region covered by this node.
  #[inline]
  pub fn bounds(&self) -> Aabb3 {
    Aabb3::new(self.left_edge, self.right_edge)
  }

  /// Whether this node is a terminal leaf.
  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.split.is_none()
  }

  /// Volume of the node's region.
  #[inline]
  pub fn volume(&self) -> f64 {
    self.bounds().volume()
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
