//! Tree traversals.
//!
//! The viewpoint traversal orders leaves for compositing: at each split node
//! an O(1) plane comparison decides which child is visited first, producing a
//! total visibility order without a global sort. The depth-first variants
//! ignore the viewpoint and give the canonical left-then-right order that
//! ownership assignment and the reduction rely on; they are pure functions of
//! tree structure and therefore identical across ranks.

use glam::DVec3;

use crate::tree::node::{left_child_id, right_child_id, NodeId, Split, ROOT_ID};
use crate::tree::KdTree;

/// Direction of a viewpoint-ordered traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraversalOrder {
  /// Nearest leaves first; supports early-exit optimizations.
  FrontToBack,
  /// Farthest leaves first; the order over-compositing consumes directly.
  BackToFront,
}

/// Lazy, restartable visibility-ordered iteration over backed leaves.
///
/// Holes are skipped. The iterator borrows the tree immutably, so it can be
/// re-created with a different viewpoint without mutating anything.
pub struct ViewpointTraversal<'a> {
  tree: &'a KdTree,
  viewpoint: DVec3,
  order: TraversalOrder,
  stack: Vec<NodeId>,
}

impl Iterator for ViewpointTraversal<'_> {
  type Item = NodeId;

  fn next(&mut self) -> Option<NodeId> {
    while let Some(id) = self.stack.pop() {
      let node = self.tree.node(id);
      match node.split {
        Some(Split { dim, pos }) => {
          // The child containing the viewpoint is the near child.
          let near_is_right = self.viewpoint[dim] >= pos;
          let (near, far) = if near_is_right {
            (right_child_id(id), left_child_id(id))
          } else {
            (left_child_id(id), right_child_id(id))
          };
          // Pushed last is popped first.
          match self.order {
            TraversalOrder::FrontToBack => {
              self.stack.push(far);
              self.stack.push(near);
            }
            TraversalOrder::BackToFront => {
              self.stack.push(near);
              self.stack.push(far);
            }
          }
        }
        None => {
          if node.backing.is_some() {
            return Some(id);
          }
        }
      }
    }
    None
  }
}

/// Canonical pre-order walk over every node, left then right.
pub struct DepthFirst<'a> {
  tree: &'a KdTree,
  stack: Vec<NodeId>,
}

impl Iterator for DepthFirst<'_> {
  type Item = NodeId;

  fn next(&mut self) -> Option<NodeId> {
    let id = self.stack.pop()?;
    if self.tree.node(id).split.is_some() {
      self.stack.push(right_child_id(id));
      self.stack.push(left_child_id(id));
    }
    Some(id)
  }
}

/// Canonical left-then-right walk over leaves only.
///
/// This is the touch order that makes per-rank leaf ownership contiguous.
pub struct LeafTouch<'a> {
  inner: DepthFirst<'a>,
}

impl Iterator for LeafTouch<'_> {
  type Item = NodeId;

  fn next(&mut self) -> Option<NodeId> {
    let tree = self.inner.tree;
    self.inner.by_ref().find(|&id| tree.node(id).is_leaf())
  }
}

impl KdTree {
  /// Visibility-ordered traversal of backed leaves relative to `viewpoint`.
  pub fn traverse(&self, viewpoint: DVec3, order: TraversalOrder) -> ViewpointTraversal<'_> {
    ViewpointTraversal {
      tree: self,
      viewpoint,
      order,
      stack: vec![ROOT_ID],
    }
  }

  /// Canonical pre-order walk over every node.
  pub fn depth_traverse(&self) -> DepthFirst<'_> {
    DepthFirst {
      tree: self,
      stack: vec![ROOT_ID],
    }
  }

  /// Canonical walk over leaves (holes included), left then right.
  pub fn depth_first_touch(&self) -> LeafTouch<'_> {
    LeafTouch {
      inner: self.depth_traverse(),
    }
  }

  /// Backed leaves in canonical order.
  pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
    self
      .depth_first_touch()
      .filter(|&id| self.node(id).backing.is_some())
  }
}

#[cfg(test)]
#[path = "traverse_test.rs"]
mod traverse_test;
