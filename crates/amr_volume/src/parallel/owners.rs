//! Rank-to-subtree ownership for the pairwise reduction.
//!
//! Each rank is assigned the subtree rooted at its slot node: the node
//! reached from the root by following the bits of `padded_size + rank`,
//! stopping early at leaves. `padded_size` rounds the rank count up to a
//! power of two; the surplus virtual ranks clamp onto the last real rank, so
//! their slots collapse and the lowest-ranked claimant wins. Internal nodes
//! inherit the owner of their left child, which makes the owner of any merge
//! point the rank that composites there.
//!
//! Every rank computes the identical table locally from the tree shape
//! alone, so ownership never travels over the wire.

use std::collections::HashMap;

use crate::tree::{
  is_left_child, left_child_id, node_depth, parent_id, right_child_id, KdTree, NodeId, ROOT_ID,
};

/// Ownership table for one reduction, valid for a fixed tree and rank count.
pub struct ReduceOwners {
  size: usize,
  padded_size: usize,
  /// Slot node per virtual rank.
  slot_nodes: Vec<NodeId>,
  /// Owner of each slot node.
  slot_owners: HashMap<NodeId, usize>,
  /// Owner of every node at or above the slot frontier.
  owners: HashMap<NodeId, usize>,
  /// Leftmost slot each real rank owns, if any.
  start_nodes: Vec<Option<NodeId>>,
  root_owner: usize,
}

impl ReduceOwners {
  /// Compute the table for `size` ranks over `tree`.
  pub fn compute(tree: &KdTree, size: usize) -> Self {
    debug_assert!(size > 0, "need at least one rank");
    let padded_size = size.next_power_of_two();

    let mut slot_nodes = Vec::with_capacity(padded_size);
    let mut slot_owners: HashMap<NodeId, usize> = HashMap::new();
    for virtual_rank in 0..padded_size {
      let effective = virtual_rank.min(size - 1);
      let slot = descend_to_slot(tree, (padded_size + virtual_rank) as NodeId);
      slot_nodes.push(slot);
      let owner = slot_owners.entry(slot).or_insert(effective);
      *owner = (*owner).min(effective);
    }

    // A merge point is owned by whoever owns its left child, so walk each
    // slot's left spine upward. Every node above the frontier lies on the
    // left spine of its leftmost slot descendant and gets covered.
    let mut owners = slot_owners.clone();
    for &slot in &slot_nodes {
      let mut node = slot;
      while is_left_child(node) {
        let Some(parent) = parent_id(node) else {
          break;
        };
        owners.insert(parent, owners[&node]);
        node = parent;
      }
    }

    // A rank can lose its own virtual slot to a lower rank yet still win a
    // later one through clamped claimants, so the reduce starts each rank at
    // the leftmost slot it owns rather than at slot_nodes[rank].
    let mut start_nodes = vec![None; size];
    for &slot in &slot_nodes {
      let owner = slot_owners[&slot];
      if start_nodes[owner].is_none() {
        start_nodes[owner] = Some(slot);
      }
    }

    let root_owner = owners[&ROOT_ID];
    Self {
      size,
      padded_size,
      slot_nodes,
      slot_owners,
      owners,
      start_nodes,
      root_owner,
    }
  }

  /// Number of real ranks.
  pub fn size(&self) -> usize {
    self.size
  }

  /// Rank count rounded up to a power of two.
  pub fn padded_size(&self) -> usize {
    self.padded_size
  }

  /// Slot node assigned to `rank`.
  pub fn slot_node(&self, rank: usize) -> NodeId {
    self.slot_nodes[rank]
  }

  /// Owner of `id`, if `id` is at or above the slot frontier.
  pub fn owner(&self, id: NodeId) -> Option<usize> {
    self.owners.get(&id).copied()
  }

  /// Rank that composites at the root and broadcasts the final frame.
  pub fn root_owner(&self) -> usize {
    self.root_owner
  }

  /// Leftmost slot owned by `rank`: where the rank enters the reduction.
  pub fn start_node(&self, rank: usize) -> Option<NodeId> {
    self.start_nodes[rank]
  }

  /// Whether `rank` lost every slot to lower ranks.
  ///
  /// A sharer owns no leaves, sends nothing, and only receives the final
  /// broadcast.
  pub fn is_sharer(&self, rank: usize) -> bool {
    self.start_nodes[rank].is_none()
  }

  /// Rank that owns leaf `id`: the owner of the slot whose subtree contains
  /// it.
  pub fn owner_of_leaf(&self, id: NodeId) -> usize {
    let mut node = id;
    loop {
      if let Some(&owner) = self.slot_owners.get(&node) {
        return owner;
      }
      match parent_id(node) {
        Some(parent) => node = parent,
        // The frontier covers the whole tree; the root is always in it or
        // above the walk's start.
        None => return self.root_owner,
      }
    }
  }

  /// Whether `rank` renders leaf `id`.
  pub fn owns_leaf(&self, rank: usize, id: NodeId) -> bool {
    self.owner_of_leaf(id) == rank
  }
}

/// Follow the bits of `virtual_id` below its leading one, left for 0 and
/// right for 1, stopping early at leaves.
fn descend_to_slot(tree: &KdTree, virtual_id: NodeId) -> NodeId {
  let mut node = ROOT_ID;
  for shift in (0..node_depth(virtual_id)).rev() {
    if tree.node(node).is_leaf() {
      break;
    }
    node = if (virtual_id >> shift) & 1 == 0 {
      left_child_id(node)
    } else {
      right_child_id(node)
    };
  }
  node
}

#[cfg(test)]
#[path = "owners_test.rs"]
mod owners_test;
