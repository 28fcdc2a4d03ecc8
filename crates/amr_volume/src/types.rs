//! Core data types: blocks, bounding boxes, and flat 3D index math.

use glam::DVec3;

/// Identifier of a data block within the hierarchy.
///
/// Signed so that the flat serialized form can use `-1` as the hole sentinel;
/// in-memory structures use `Option<BlockId>` instead.
pub type BlockId = i64;

/// Absolute tolerance for edge comparisons in code units.
///
/// Block edges are produced by repeated halving of the domain, so genuine
/// boundaries agree to machine precision; this only absorbs round-off from
/// the `(edge - origin) / cell_size` style arithmetic.
pub const EDGE_TOL: f64 = 1e-10;

/// One rectangular region of simulation data at a fixed refinement level.
///
/// Immutable once read from the hierarchy. Blocks at higher levels are
/// spatially nested inside a level-0 ancestor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Block {
  /// Unique block identifier.
  pub id: BlockId,
  /// Refinement level (0 = coarsest).
  pub level: u32,
  /// Minimum corner in code units.
  pub left_edge: DVec3,
  /// Maximum corner in code units.
  pub right_edge: DVec3,
}

impl Block {
  /// Bounding box of this block.
  #[inline]
  pub fn bounds(&self) -> Aabb3 {
    Aabb3::new(self.left_edge, self.right_edge)
  }
}

/// Double-precision axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb3 {
  /// Minimum corner (inclusive).
  pub min: DVec3,
  /// Maximum corner (inclusive).
  pub max: DVec3,
}

impl Aabb3 {
  /// Create a new AABB from min and max corners.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on all axes.
  pub fn new(min: DVec3, max: DVec3) -> Self {
    debug_assert!(
      min.x <= max.x && min.y <= max.y && min.z <= max.z,
      "AABB min must be <= max on all axes"
    );
    Self { min, max }
  }

  /// Check if this AABB contains a point.
  #[inline]
  pub fn contains_point(&self, point: DVec3) -> bool {
    point.x >= self.min.x
      && point.x <= self.max.x
      && point.y >= self.min.y
      && point.y <= self.max.y
      && point.z >= self.min.z
      && point.z <= self.max.z
  }

  /// Check if `other` lies entirely inside this AABB, within [`EDGE_TOL`].
  #[inline]
  pub fn contains_box(&self, other: &Aabb3) -> bool {
    other.min.x >= self.min.x - EDGE_TOL
      && other.min.y >= self.min.y - EDGE_TOL
      && other.min.z >= self.min.z - EDGE_TOL
      && other.max.x <= self.max.x + EDGE_TOL
      && other.max.y <= self.max.y + EDGE_TOL
      && other.max.z <= self.max.z + EDGE_TOL
  }

  /// Componentwise equality within [`EDGE_TOL`].
  #[inline]
  pub fn approx_eq(&self, other: &Aabb3) -> bool {
    (self.min - other.min).abs().max_element() <= EDGE_TOL
      && (self.max - other.max).abs().max_element() <= EDGE_TOL
  }

  /// Get the size of the AABB (max - min).
  #[inline]
  pub fn size(&self) -> DVec3 {
    self.max - self.min
  }

  /// Volume of the AABB.
  #[inline]
  pub fn volume(&self) -> f64 {
    let s = self.size();
    s.x * s.y * s.z
  }

  /// Get the center of the AABB.
  #[inline]
  pub fn center(&self) -> DVec3 {
    (self.min + self.max) * 0.5
  }
}

/// Convert a 3D cell coordinate to a flat row-major index.
///
/// Layout matches C ordering: x varies slowest, z fastest.
#[inline]
pub fn coord_to_index(c: [usize; 3], dims: [usize; 3]) -> usize {
  (c[0] * dims[1] + c[1]) * dims[2] + c[2]
}

/// Total cell count of a `dims` box.
#[inline]
pub fn cell_count(dims: [usize; 3]) -> usize {
  dims[0] * dims[1] * dims[2]
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
