//! Flattened tree representation.
//!
//! Serializes the arena into parallel arrays in canonical depth-first order
//! and reconstructs an identical tree from them. Because node ids carry the
//! whole structure, the arrays need no parent/child pointers; a rank can
//! rebuild another rank's tree (or its own, after a restart) and obtain the
//! same volume and the same canonical leaf order.

use glam::DVec3;

use crate::error::{EngineError, Result};
use crate::tree::node::{left_child_id, parent_id, right_child_id, KdNode, NodeId, Split, ROOT_ID};
use crate::tree::KdTree;
use crate::types::Aabb3;

/// Parallel node arrays in canonical depth-first order.
///
/// `block_ids` uses `-1` for holes and internal nodes; `split_dims` uses `-1`
/// for leaves.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlatTree {
  /// Node ids, root first.
  pub node_ids: Vec<NodeId>,
  /// Minimum corners.
  pub left_edges: Vec<[f64; 3]>,
  /// Maximum corners.
  pub right_edges: Vec<[f64; 3]>,
  /// Backing block ids (`-1` sentinel).
  pub block_ids: Vec<i64>,
  /// Split dimensions (`-1` sentinel).
  pub split_dims: Vec<i8>,
  /// Split positions (unused slots are 0).
  pub split_poss: Vec<f64>,
}

impl KdTree {
  /// Flatten the tree into parallel arrays.
  pub fn to_flat(&self) -> FlatTree {
    let mut flat = FlatTree::default();
    for id in self.depth_traverse() {
      let node = self.node(id);
      flat.node_ids.push(id);
      flat.left_edges.push(node.left_edge.to_array());
      flat.right_edges.push(node.right_edge.to_array());
      flat.block_ids.push(node.backing.unwrap_or(-1));
      match node.split {
        Some(Split { dim, pos }) => {
          flat.split_dims.push(dim as i8);
          flat.split_poss.push(pos);
        }
        None => {
          flat.split_dims.push(-1);
          flat.split_poss.push(0.0);
        }
      }
    }
    flat
  }

  /// Reconstruct a tree from its flattened form.
  pub fn from_flat(flat: &FlatTree, min_level: u32, max_level: u32) -> Result<Self> {
    let n = flat.node_ids.len();
    if n == 0 {
      return Err(EngineError::MalformedFlatTree("no nodes".to_owned()));
    }
    let aligned = [
      flat.left_edges.len(),
      flat.right_edges.len(),
      flat.block_ids.len(),
      flat.split_dims.len(),
      flat.split_poss.len(),
    ]
    .iter()
    .all(|&len| len == n);
    if !aligned {
      return Err(EngineError::MalformedFlatTree(
        "array lengths disagree".to_owned(),
      ));
    }
    if flat.node_ids[0] != ROOT_ID {
      return Err(EngineError::MalformedFlatTree(
        "first node is not the root".to_owned(),
      ));
    }

    let domain = Aabb3::new(
      DVec3::from_array(flat.left_edges[0]),
      DVec3::from_array(flat.right_edges[0]),
    );
    let mut tree = Self::empty(domain, min_level, max_level);
    for i in 0..n {
      let id = flat.node_ids[i];
      if id != ROOT_ID && parent_id(id).is_none() {
        return Err(EngineError::MalformedFlatTree(format!("bad node id {id}")));
      }
      let bounds = Aabb3::new(
        DVec3::from_array(flat.left_edges[i]),
        DVec3::from_array(flat.right_edges[i]),
      );
      let backing = (flat.block_ids[i] >= 0).then_some(flat.block_ids[i]);
      let mut node = KdNode::leaf(bounds, backing);
      if flat.split_dims[i] >= 0 {
        node.split = Some(Split {
          dim: flat.split_dims[i] as usize,
          pos: flat.split_poss[i],
        });
      }
      tree.insert_node(id, node);
    }

    // Every split must have both children present in the arrays.
    for i in 0..n {
      let id = flat.node_ids[i];
      if flat.split_dims[i] >= 0
        && (tree.get(left_child_id(id)).is_none() || tree.get(right_child_id(id)).is_none())
      {
        return Err(EngineError::MalformedFlatTree(format!(
          "split node {id} is missing a child"
        )));
      }
    }
    Ok(tree)
  }
}

#[cfg(test)]
#[path = "flat_test.rs"]
mod flat_test;
