//! Level-ordered tree construction.
//!
//! Blocks are inserted level-by-level, coarsest first, so coarse blocks
//! establish the outer partition before fine blocks refine it. Insertion
//! follows the hole-exact-match discipline: a block either claims a leaf
//! whose bounds it matches exactly, or splits leaves along its own edges
//! until such a leaf exists. A block that straddles an existing split plane
//! is a structural error - the hierarchy is not well-nested.

use crate::error::{EngineError, Result};
use crate::hierarchy::BlockHierarchy;
use crate::tree::node::{left_child_id, right_child_id, KdNode, Split, ROOT_ID};
use crate::tree::KdTree;
use crate::types::{Block, EDGE_TOL};

impl KdTree {
  /// Build a tree from every block of `hierarchy` in `[min_level, max_level]`.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "tree::build"))]
  pub fn build(hierarchy: &impl BlockHierarchy, min_level: u32, max_level: u32) -> Result<Self> {
    let mut tree = Self::empty(hierarchy.domain(), min_level, max_level);
    for level in min_level..=max_level {
      let blocks = hierarchy.blocks_at_level(level);
      if blocks.is_empty() {
        continue;
      }
      tree.add_blocks(&blocks)?;
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(nodes = tree.node_count(), "tree built");
    Ok(tree)
  }

  /// Build over the hierarchy's full level range.
  pub fn build_full(hierarchy: &impl BlockHierarchy) -> Result<Self> {
    Self::build(hierarchy, 0, hierarchy.max_level())
  }

  /// Insert a batch of same-level blocks.
  pub fn add_blocks(&mut self, blocks: &[Block]) -> Result<()> {
    for block in blocks {
      self.insert_block(block)?;
    }
    Ok(())
  }

  /// Insert one block, descending from the root.
  ///
  /// At each internal node the block must fall entirely on one side of the
  /// split plane. At a leaf, an exact bounds match claims the leaf
  /// (re-pointing a coarser backing to the finer block); otherwise the leaf
  /// is split along a dimension and position implied by the block's edges and
  /// descent continues. Children of a split inherit the old leaf's backing,
  /// so the unrefined remainder of a coarse block stays covered.
  fn insert_block(&mut self, block: &Block) -> Result<()> {
    let misaligned = |dim: usize| EngineError::UnalignedBlock {
      block: block.id,
      level: block.level,
      dim,
    };

    let mut id = ROOT_ID;
    loop {
      let node = self.node(id);
      if let Some(Split { dim, pos }) = node.split {
        if block.right_edge[dim] <= pos + EDGE_TOL {
          id = left_child_id(id);
        } else if block.left_edge[dim] >= pos - EDGE_TOL {
          id = right_child_id(id);
        } else {
          // Straddles an existing boundary.
          return Err(misaligned(dim));
        }
        continue;
      }

      let bounds = node.bounds();
      if !bounds.contains_box(&block.bounds()) {
        let dim = (0..3)
          .find(|&d| {
            block.left_edge[d] < bounds.min[d] - EDGE_TOL
              || block.right_edge[d] > bounds.max[d] + EDGE_TOL
          })
          .unwrap_or(0);
        return Err(misaligned(dim));
      }
      if bounds.approx_eq(&block.bounds()) {
        self.node_mut(id).backing = Some(block.id);
        return Ok(());
      }

      // Split the leaf at the first block edge strictly interior to it.
      let split = (0..3)
        .find_map(|d| {
          if block.left_edge[d] > bounds.min[d] + EDGE_TOL {
            Some(Split {
              dim: d,
              pos: block.left_edge[d],
            })
          } else if block.right_edge[d] < bounds.max[d] - EDGE_TOL {
            Some(Split {
              dim: d,
              pos: block.right_edge[d],
            })
          } else {
            None
          }
        })
        .ok_or_else(|| misaligned(0))?;
      self.split_leaf(id, split);
    }
  }

  /// Turn the leaf `id` into a split node with two children covering its
  /// region exactly.
  fn split_leaf(&mut self, id: crate::tree::NodeId, split: Split) {
    let node = self.node(id);
    let backing = node.backing;
    let bounds = node.bounds();
    debug_assert!(
      split.pos > bounds.min[split.dim] && split.pos < bounds.max[split.dim],
      "split position must be interior to the leaf"
    );

    let mut left = bounds;
    left.max[split.dim] = split.pos;
    let mut right = bounds;
    right.min[split.dim] = split.pos;

    self.insert_node(left_child_id(id), KdNode::leaf(left, backing));
    self.insert_node(right_child_id(id), KdNode::leaf(right, backing));
    let node = self.node_mut(id);
    node.split = Some(split);
    node.backing = None;
  }
}

#[cfg(test)]
#[path = "build_test.rs"]
mod build_test;
