//! Point location.

use glam::DVec3;

use crate::tree::node::{left_child_id, right_child_id, NodeId, Split, ROOT_ID};
use crate::tree::KdTree;

impl KdTree {
  /// Find the leaf whose region contains `position`.
  ///
  /// Returns `None` when the position lies outside the domain. Points on a
  /// split plane resolve to the right child, matching the viewpoint
  /// traversal's tie-break.
  pub fn locate_node(&self, position: DVec3) -> Option<NodeId> {
    if !self.domain().contains_point(position) {
      return None;
    }
    let mut id = ROOT_ID;
    loop {
      match self.node(id).split {
        Some(Split { dim, pos }) => {
          id = if position[dim] >= pos {
            right_child_id(id)
          } else {
            left_child_id(id)
          };
        }
        None => return Some(id),
      }
    }
  }
}
