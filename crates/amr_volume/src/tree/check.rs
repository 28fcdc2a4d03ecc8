//! Volume and cell accounting - the primary correctness oracle.
//!
//! Every cell in the domain must be owned by exactly one leaf: no gaps, no
//! overlaps. `check_tree` validates containment, cell-index ranges, and the
//! child-partition invariant; `sum_volume` / `sum_cells` give independent
//! accounting paths that must agree with the domain.

use crate::error::{EngineError, Result};
use crate::hierarchy::BlockHierarchy;
use crate::tree::node::{left_child_id, right_child_id, NodeId, Split};
use crate::tree::KdTree;
use crate::types::{Block, EDGE_TOL};

/// Relative tolerance for volume comparisons.
const VOLUME_TOL: f64 = 1e-8;

/// Cell-index bounds of a leaf within its backing block.
#[derive(Clone, Copy, Debug)]
pub struct CellBounds {
  /// Backing block.
  pub block: Block,
  /// Inclusive lower cell index within the block.
  pub li: [i64; 3],
  /// Exclusive upper cell index within the block.
  pub ri: [i64; 3],
  /// Cell dimensions of the leaf region.
  pub dims: [usize; 3],
}

impl KdTree {
  /// Cell-index bounds of leaf `id`, or `None` for holes.
  ///
  /// Indices come from rounding `(edge - block_edge) / cell_size` to the
  /// nearest integer, tolerant of floating round-off. Containment and
  /// positivity are verified, so the result is safe to slice with.
  pub fn cell_bounds(
    &self,
    hierarchy: &impl BlockHierarchy,
    id: NodeId,
  ) -> Result<Option<CellBounds>> {
    let node = self.node(id);
    let Some(block_id) = node.backing else {
      return Ok(None);
    };
    let block = hierarchy
      .block(block_id)
      .ok_or(EngineError::UnknownBlock(block_id))?;

    if !block.bounds().contains_box(&node.bounds()) {
      return Err(EngineError::ContainmentViolation {
        node_id: id,
        block: block_id,
      });
    }

    let dds = hierarchy.cell_size(block.level);
    let mut li = [0i64; 3];
    let mut ri = [0i64; 3];
    let mut dims = [0usize; 3];
    for d in 0..3 {
      li[d] = ((node.left_edge[d] - block.left_edge[d]) / dds[d]).round() as i64;
      ri[d] = ((node.right_edge[d] - block.left_edge[d]) / dds[d]).round() as i64;
      if ri[d] <= li[d] {
        return Err(EngineError::DegenerateLeaf { node_id: id, dim: d });
      }
      // The rounded bounds must reproduce the node's edges to within a cell.
      let lo = block.left_edge[d] + li[d] as f64 * dds[d];
      let hi = block.left_edge[d] + ri[d] as f64 * dds[d];
      if (lo - node.left_edge[d]).abs() > dds[d] || (hi - node.right_edge[d]).abs() > dds[d] {
        return Err(EngineError::ContainmentViolation {
          node_id: id,
          block: block_id,
        });
      }
      dims[d] = (ri[d] - li[d]) as usize;
    }
    Ok(Some(CellBounds { block, li, ri, dims }))
  }

  /// Sum of leaf volumes over backed leaves.
  pub fn sum_volume(&self) -> f64 {
    self.leaves().map(|id| self.node(id).volume()).sum()
  }

  /// Sum of cell counts over backed leaves.
  ///
  /// With `all_cells` set, internal nodes that still carry index ranges are
  /// counted too; the default counts leaves only, which must equal the
  /// independent per-block accounting.
  pub fn sum_cells(&self, hierarchy: &impl BlockHierarchy, all_cells: bool) -> Result<u64> {
    let mut cells = 0u64;
    for id in self.depth_traverse() {
      let node = self.node(id);
      if node.backing.is_none() {
        continue;
      }
      if !all_cells && !node.is_leaf() {
        continue;
      }
      if let Some(cb) = self.cell_bounds(hierarchy, id)? {
        cells += (cb.dims[0] * cb.dims[1] * cb.dims[2]) as u64;
      }
    }
    Ok(cells)
  }

  /// Validate the whole structure against `hierarchy`.
  ///
  /// Walks every leaf checking containment and index ranges, verifies that
  /// each split node's children partition it exactly, and compares summed
  /// leaf volume against the domain volume.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "tree::check"))]
  pub fn check_tree(&self, hierarchy: &impl BlockHierarchy) -> Result<()> {
    for id in self.depth_traverse() {
      let node = self.node(id);
      if let Some(Split { dim, pos }) = node.split {
        let left = self.node(left_child_id(id));
        let right = self.node(right_child_id(id));
        let partitioned = (left.right_edge[dim] - pos).abs() <= EDGE_TOL
          && (right.left_edge[dim] - pos).abs() <= EDGE_TOL
          && left.left_edge == node.left_edge
          && right.right_edge == node.right_edge;
        if !partitioned {
          return Err(EngineError::PartitionViolation { node_id: id });
        }
      } else {
        self.cell_bounds(hierarchy, id)?;
      }
    }

    let expected = self.domain().volume();
    let actual = self.sum_volume();
    #[cfg(feature = "tracing")]
    tracing::debug!(volume = actual, "tree volume");
    // An empty tree legitimately accounts zero volume.
    if actual != 0.0 && (actual - expected).abs() > VOLUME_TOL * expected {
      return Err(EngineError::VolumeMismatch { expected, actual });
    }
    Ok(())
  }
}

#[cfg(test)]
#[path = "check_test.rs"]
mod check_test;
