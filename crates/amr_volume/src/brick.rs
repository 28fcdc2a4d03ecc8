//! Brick materialization and the per-scene brick cache.
//!
//! A brick is a self-contained renderable copy of one leaf's sample data:
//! bounds, one array per requested field, and a validity mask. Bricks are
//! created lazily the first time a leaf is visited for rendering and cached
//! for the lifetime of a scene, so repeated traversals (frames with an
//! unchanged camera) avoid re-reading block data. Changing the requested
//! field set invalidates the whole cache.

use std::collections::HashMap;
use std::sync::Arc;

use glam::DVec3;
use smallvec::SmallVec;

use crate::error::{EngineError, Result};
use crate::hierarchy::BlockHierarchy;
use crate::tree::{KdTree, NodeId};
use crate::types::{cell_count, coord_to_index, BlockId};

/// One scalar field to sample into bricks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
  /// Field name, resolved by the hierarchy.
  pub name: String,
  /// Store `log10` of the samples instead of raw values.
  pub take_log: bool,
}

impl FieldSpec {
  /// A linearly sampled field.
  pub fn linear(name: &str) -> Self {
    Self {
      name: name.to_owned(),
      take_log: false,
    }
  }

  /// A log10-sampled field.
  pub fn log(name: &str) -> Self {
    Self {
      name: name.to_owned(),
      take_log: true,
    }
  }
}

/// Materialized, renderable copy of a leaf's sample data.
#[derive(Clone, Debug)]
pub struct Brick {
  /// Backing block.
  pub block: BlockId,
  /// Minimum corner of the brick's region.
  pub left_edge: DVec3,
  /// Maximum corner of the brick's region.
  pub right_edge: DVec3,
  /// Cell dimensions of the region.
  pub dims: [usize; 3],
  /// Per-field sample arrays; ghosted bricks carry one extra layer per side.
  pub data: SmallVec<[Vec<f64>; 4]>,
  /// Per-cell validity mask (1 = valid).
  pub mask: Vec<u8>,
  /// Whether `data` includes the ghost layer.
  pub ghosted: bool,
}

impl Brick {
  /// Dimensions of the sample arrays (`dims`, plus the ghost layer if
  /// present).
  pub fn sample_dims(&self) -> [usize; 3] {
    if self.ghosted {
      [self.dims[0] + 2, self.dims[1] + 2, self.dims[2] + 2]
    } else {
      self.dims
    }
  }
}

/// Rank-local brick cache with field-set invalidation.
///
/// Never shared across ranks; the tree itself is the only cross-rank
/// consistent structure.
#[derive(Default)]
pub struct BrickCache {
  fields: Vec<FieldSpec>,
  ghost: bool,
  bricks: HashMap<NodeId, Arc<Brick>>,
  brick_dimensions: Vec<[usize; 3]>,
}

impl BrickCache {
  /// Create an empty cache with no fields selected.
  pub fn new() -> Self {
    Self::default()
  }

  /// Select the fields to sample, dropping every cached brick.
  pub fn set_fields(&mut self, fields: Vec<FieldSpec>, ghost: bool) {
    self.fields = fields;
    self.ghost = ghost;
    self.bricks.clear();
    self.brick_dimensions.clear();
  }

  /// Select fields only if the request differs from the current selection.
  pub fn initialize_source(&mut self, fields: Vec<FieldSpec>, ghost: bool) {
    if fields == self.fields && ghost == self.ghost {
      return;
    }
    self.set_fields(fields, ghost);
  }

  /// Currently selected fields.
  pub fn fields(&self) -> &[FieldSpec] {
    &self.fields
  }

  /// Drop every cached brick, keeping the field selection.
  pub fn clear(&mut self) {
    self.bricks.clear();
    self.brick_dimensions.clear();
  }

  /// Number of cached bricks.
  pub fn len(&self) -> usize {
    self.bricks.len()
  }

  /// True when nothing is cached.
  pub fn is_empty(&self) -> bool {
    self.bricks.is_empty()
  }

  /// Dimensions of every brick materialized so far.
  pub fn brick_dimensions(&self) -> &[[usize; 3]] {
    &self.brick_dimensions
  }

  /// Materialize the brick for leaf `id`, reusing the cache when possible.
  ///
  /// Holes produce `Ok(None)`; callers skip them during rendering and
  /// accounting.
  pub fn materialize(
    &mut self,
    tree: &KdTree,
    hierarchy: &impl BlockHierarchy,
    id: NodeId,
  ) -> Result<Option<Arc<Brick>>> {
    if let Some(brick) = self.bricks.get(&id) {
      return Ok(Some(Arc::clone(brick)));
    }
    let Some(cb) = tree.cell_bounds(hierarchy, id)? else {
      return Ok(None);
    };

    let node = tree.node(id);
    let block_dims = hierarchy.block_dims(&cb.block);

    // Ghost availability is decided for the brick as a whole: if any field
    // lacks ghost zones, every field falls back to un-smoothed sampling so
    // each array stays consistent with `sample_dims()`.
    let mut ghosted = self.ghost;
    let mut source: Vec<Vec<f64>> = Vec::with_capacity(self.fields.len());
    if ghosted {
      for field in &self.fields {
        match hierarchy.ghosted_field_values(cb.block.id, &field.name, 1) {
          Ok(values) => source.push(values),
          Err(EngineError::GhostZonesUnavailable(_)) => {
            ghosted = false;
            source.clear();
            break;
          }
          Err(err) => return Err(err),
        }
      }
    }
    if !ghosted {
      for field in &self.fields {
        source.push(hierarchy.field_values(cb.block.id, &field.name)?);
      }
    }

    // Cell range within the (possibly expanded) source arrays. In ghosted
    // coordinates block cell `li` sits at index `li`, and the slice is two
    // cells wider per dimension.
    let extra = if ghosted { 2 } else { 0 };
    let full_dims = [
      block_dims[0] + extra,
      block_dims[1] + extra,
      block_dims[2] + extra,
    ];
    let lo = [cb.li[0] as usize, cb.li[1] as usize, cb.li[2] as usize];
    let out_dims = [
      cb.dims[0] + extra,
      cb.dims[1] + extra,
      cb.dims[2] + extra,
    ];

    let mut data: SmallVec<[Vec<f64>; 4]> = SmallVec::new();
    for (field, full) in self.fields.iter().zip(source) {
      let mut values = copy_subarray(&full, full_dims, lo, out_dims);
      if field.take_log {
        for v in &mut values {
          *v = v.log10();
        }
      }
      data.push(values);
    }

    let brick = Arc::new(Brick {
      block: cb.block.id,
      left_edge: node.left_edge,
      right_edge: node.right_edge,
      dims: cb.dims,
      data,
      mask: vec![1; cell_count(cb.dims)],
      ghosted,
    });
    self.brick_dimensions.push(cb.dims);
    self.bricks.insert(id, Arc::clone(&brick));
    Ok(Some(brick))
  }
}

/// Copy a `out_dims` sub-array starting at `lo` from a row-major source.
fn copy_subarray(
  src: &[f64],
  src_dims: [usize; 3],
  lo: [usize; 3],
  out_dims: [usize; 3],
) -> Vec<f64> {
  let mut out = Vec::with_capacity(cell_count(out_dims));
  for x in 0..out_dims[0] {
    for y in 0..out_dims[1] {
      let base = coord_to_index([lo[0] + x, lo[1] + y, lo[2]], src_dims);
      out.extend_from_slice(&src[base..base + out_dims[2]]);
    }
  }
  out
}

#[cfg(test)]
#[path = "brick_test.rs"]
mod brick_test;
