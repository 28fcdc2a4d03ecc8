//! Spatial partition tree over AMR blocks.
//!
//! A balanced-by-construction binary kd-tree whose leaves map one-to-one onto
//! renderable block sub-regions. Nodes live in an arena keyed by
//! complete-binary-tree ids, so structure is pure data: every rank rebuilds
//! an identical tree from the same hierarchy and never needs to exchange it.
//!
//! # Module Structure
//!
//! - [`node`]: `KdNode` records and node-id arithmetic
//! - [`build`]: level-ordered block insertion
//! - [`traverse`]: viewpoint-ordered and canonical depth-first traversals
//! - [`check`]: volume/cell accounting and invariant validation
//! - [`flat`]: flattened node arrays for serialization and rebuild
//! - [`locate`]: point location

use std::collections::HashMap;

use crate::types::Aabb3;

pub mod build;
pub mod check;
pub mod flat;
pub mod locate;
pub mod node;
pub mod traverse;

// Re-exports
pub use flat::FlatTree;
pub use node::{
  is_left_child, left_child_id, node_depth, parent_id, right_child_id, KdNode, NodeId, Split,
  ROOT_ID,
};
pub use traverse::{DepthFirst, LeafTouch, TraversalOrder, ViewpointTraversal};

/// Binary spatial partition tree with arena-backed nodes.
pub struct KdTree {
  nodes: HashMap<NodeId, KdNode>,
  domain: Aabb3,
  min_level: u32,
  max_level: u32,
}

impl KdTree {
  /// Create a tree consisting of a single hole leaf covering `domain`.
  pub fn empty(domain: Aabb3, min_level: u32, max_level: u32) -> Self {
    let mut nodes = HashMap::new();
    nodes.insert(ROOT_ID, KdNode::leaf(domain, None));
    Self {
      nodes,
      domain,
      min_level,
      max_level,
    }
  }

  /// Domain covered by the root.
  pub fn domain(&self) -> Aabb3 {
    self.domain
  }

  /// Coarsest level inserted during construction.
  pub fn min_level(&self) -> u32 {
    self.min_level
  }

  /// Finest level inserted during construction.
  pub fn max_level(&self) -> u32 {
    self.max_level
  }

  /// Number of nodes in the arena.
  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  /// Look up a node by id.
  pub fn get(&self, id: NodeId) -> Option<&KdNode> {
    self.nodes.get(&id)
  }

  /// Look up a node that structurally must exist.
  ///
  /// Children of a split node are inserted together with the split, so a miss
  /// here means the arena was corrupted.
  pub(crate) fn node(&self, id: NodeId) -> &KdNode {
    self.nodes.get(&id).expect("dangling NodeId in arena")
  }

  pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut KdNode {
    self.nodes.get_mut(&id).expect("dangling NodeId in arena")
  }

  pub(crate) fn insert_node(&mut self, id: NodeId, node: KdNode) {
    self.nodes.insert(id, node);
  }
}
