//! Block hierarchy interface - the data-source collaborator.
//!
//! The engine never reads simulation output directly; it consumes an
//! enumerable, per-level set of blocks plus per-block field accessors through
//! [`BlockHierarchy`]. [`InMemoryHierarchy`] is a concrete implementation
//! backed by plain vectors, used by tests and demos.

use std::collections::HashMap;

use glam::DVec3;

use crate::error::{EngineError, Result};
use crate::types::{cell_count, coord_to_index, Aabb3, Block, BlockId};

/// Source of AMR blocks and their scalar field data.
///
/// Implementations must be deterministic: every rank rebuilds the spatial
/// partition independently from the same hierarchy, so `blocks_at_level` has
/// to return blocks in a stable order.
pub trait BlockHierarchy {
  /// Bounding box of the whole domain.
  fn domain(&self) -> Aabb3;

  /// Cell dimensions of the domain at level 0.
  fn base_dims(&self) -> [usize; 3];

  /// Refinement factor between consecutive levels.
  fn refine_factor(&self) -> usize {
    2
  }

  /// Highest refinement level present.
  fn max_level(&self) -> u32;

  /// All blocks at the given refinement level, in stable order.
  fn blocks_at_level(&self, level: u32) -> Vec<Block>;

  /// Look up a single block by id.
  fn block(&self, id: BlockId) -> Option<Block>;

  /// Scalar field samples for a block at its native resolution, row-major
  /// per [`coord_to_index`].
  fn field_values(&self, id: BlockId, field: &str) -> Result<Vec<f64>>;

  /// Expanded field samples covering `halo` layers of neighboring data on
  /// each side.
  ///
  /// Optional; the default reports ghost zones as unavailable and the brick
  /// materializer falls back to un-smoothed sampling.
  fn ghosted_field_values(&self, id: BlockId, _field: &str, _halo: usize) -> Result<Vec<f64>> {
    Err(EngineError::GhostZonesUnavailable(id))
  }

  /// Effective cell size at a refinement level.
  ///
  /// `dds = domain_width / (refine_factor^level * base_dims)`
  fn cell_size(&self, level: u32) -> DVec3 {
    let base = self.base_dims();
    let refine = (self.refine_factor() as f64).powi(level as i32);
    let width = self.domain().size();
    DVec3::new(
      width.x / (refine * base[0] as f64),
      width.y / (refine * base[1] as f64),
      width.z / (refine * base[2] as f64),
    )
  }

  /// Cell dimensions of a block, recovered from its extent and level.
  fn block_dims(&self, block: &Block) -> [usize; 3] {
    let dds = self.cell_size(block.level);
    let extent = block.right_edge - block.left_edge;
    [
      (extent.x / dds.x).round() as usize,
      (extent.y / dds.y).round() as usize,
      (extent.z / dds.z).round() as usize,
    ]
  }
}

/// Hierarchy held entirely in memory.
///
/// Blocks are registered with [`add_block`](Self::add_block); field data is
/// attached per block. Ghost zones are synthesized by clamped extension of
/// the block's own samples, which is enough for smoothed sampling in tests
/// and demos.
pub struct InMemoryHierarchy {
  domain: Aabb3,
  base_dims: [usize; 3],
  refine_factor: usize,
  blocks: Vec<Block>,
  fields: HashMap<(BlockId, String), Vec<f64>>,
}

impl InMemoryHierarchy {
  /// Create an empty hierarchy over `domain` with level-0 dimensions
  /// `base_dims`.
  pub fn new(domain: Aabb3, base_dims: [usize; 3]) -> Self {
    Self {
      domain,
      base_dims,
      refine_factor: 2,
      blocks: Vec::new(),
      fields: HashMap::new(),
    }
  }

  /// Override the refinement factor (default 2).
  pub fn with_refine_factor(mut self, refine_factor: usize) -> Self {
    self.refine_factor = refine_factor;
    self
  }

  /// Register a block; ids are assigned in registration order.
  pub fn add_block(&mut self, level: u32, left_edge: DVec3, right_edge: DVec3) -> BlockId {
    let id = self.blocks.len() as BlockId;
    self.blocks.push(Block {
      id,
      level,
      left_edge,
      right_edge,
    });
    id
  }

  /// Attach field samples to a block.
  ///
  /// # Panics
  /// Panics if `values` does not match the block's cell count; the mismatch
  /// is a test-construction bug, not a runtime condition.
  pub fn set_field(&mut self, id: BlockId, field: &str, values: Vec<f64>) {
    let block = self.block(id).expect("set_field on unknown block");
    let dims = self.block_dims(&block);
    assert_eq!(
      values.len(),
      cell_count(dims),
      "field data must match block cell count"
    );
    self.fields.insert((id, field.to_owned()), values);
  }

  /// Register a block with a constant-valued field in one call.
  pub fn add_constant_block(
    &mut self,
    level: u32,
    left_edge: DVec3,
    right_edge: DVec3,
    field: &str,
    value: f64,
  ) -> BlockId {
    let id = self.add_block(level, left_edge, right_edge);
    let block = self.blocks[id as usize];
    let dims = self.block_dims(&block);
    self.fields
      .insert((id, field.to_owned()), vec![value; cell_count(dims)]);
    id
  }
}

impl BlockHierarchy for InMemoryHierarchy {
  fn domain(&self) -> Aabb3 {
    self.domain
  }

  fn base_dims(&self) -> [usize; 3] {
    self.base_dims
  }

  fn refine_factor(&self) -> usize {
    self.refine_factor
  }

  fn max_level(&self) -> u32 {
    self.blocks.iter().map(|b| b.level).max().unwrap_or(0)
  }

  fn blocks_at_level(&self, level: u32) -> Vec<Block> {
    self
      .blocks
      .iter()
      .copied()
      .filter(|b| b.level == level)
      .collect()
  }

  fn block(&self, id: BlockId) -> Option<Block> {
    self.blocks.get(usize::try_from(id).ok()?).copied()
  }

  fn field_values(&self, id: BlockId, field: &str) -> Result<Vec<f64>> {
    if self.block(id).is_none() {
      return Err(EngineError::UnknownBlock(id));
    }
    self
      .fields
      .get(&(id, field.to_owned()))
      .cloned()
      .ok_or_else(|| EngineError::MissingField(field.to_owned(), id))
  }

  fn ghosted_field_values(&self, id: BlockId, field: &str, halo: usize) -> Result<Vec<f64>> {
    let block = self.block(id).ok_or(EngineError::UnknownBlock(id))?;
    let dims = self.block_dims(&block);
    let values = self.field_values(id, field)?;
    let gdims = [
      dims[0] + 2 * halo,
      dims[1] + 2 * halo,
      dims[2] + 2 * halo,
    ];
    let mut out = vec![0.0; cell_count(gdims)];
    for x in 0..gdims[0] {
      let sx = x.saturating_sub(halo).min(dims[0] - 1);
      for y in 0..gdims[1] {
        let sy = y.saturating_sub(halo).min(dims[1] - 1);
        for z in 0..gdims[2] {
          let sz = z.saturating_sub(halo).min(dims[2] - 1);
          out[coord_to_index([x, y, z], gdims)] = values[coord_to_index([sx, sy, sz], dims)];
        }
      }
    }
    Ok(out)
  }
}

#[cfg(test)]
#[path = "hierarchy_test.rs"]
mod hierarchy_test;
