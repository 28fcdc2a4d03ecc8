//! Error taxonomy for tree construction, validation, and the distributed
//! reduction.
//!
//! Structural errors and invariant violations are fatal `Err` values; locally
//! recoverable conditions (hole leaves, cache misses) never surface here.

use thiserror::Error;

use crate::tree::NodeId;
use crate::types::BlockId;

/// Errors produced by the partitioning and compositing engine.
#[derive(Debug, Error)]
pub enum EngineError {
  /// A block does not align with the existing partition boundaries.
  ///
  /// Fatal: the input hierarchy violates the nesting invariant.
  #[error("block {block} (level {level}) does not align with the partition along dim {dim}")]
  UnalignedBlock {
    /// Offending block.
    block: BlockId,
    /// Refinement level of the block.
    level: u32,
    /// Dimension along which alignment failed.
    dim: usize,
  },

  /// A leaf's region is not contained within its backing block's edges.
  #[error("leaf {node_id} extends outside its backing block {block}")]
  ContainmentViolation {
    /// Leaf node id.
    node_id: NodeId,
    /// Backing block id.
    block: BlockId,
  },

  /// A leaf's computed cell-index range is empty along some dimension.
  #[error("leaf {node_id} has a non-positive cell extent along dim {dim}")]
  DegenerateLeaf {
    /// Leaf node id.
    node_id: NodeId,
    /// Degenerate dimension.
    dim: usize,
  },

  /// A split node's children do not partition its region exactly.
  #[error("children of node {node_id} do not partition its region")]
  PartitionViolation {
    /// Offending internal node.
    node_id: NodeId,
  },

  /// Summed leaf volume disagrees with the domain volume.
  #[error("tree volume {actual:e} does not match domain volume {expected:e}")]
  VolumeMismatch {
    /// Domain bounding-box volume.
    expected: f64,
    /// Summed leaf volume.
    actual: f64,
  },

  /// The hierarchy does not know the requested block.
  #[error("unknown block id {0}")]
  UnknownBlock(BlockId),

  /// The hierarchy does not provide the requested field.
  #[error("hierarchy does not provide field {0:?} for block {1}")]
  MissingField(String, BlockId),

  /// The hierarchy has no ghost-zone accessor but ghosted sampling was
  /// requested.
  #[error("hierarchy does not provide ghost zones for block {0}")]
  GhostZonesUnavailable(BlockId),

  /// The reduce owner table lacks an entry this rank depends on.
  #[error("reduce owner table is inconsistent at node {node_id}")]
  OwnerMismatch {
    /// Node id missing from the owner table.
    node_id: NodeId,
  },

  /// A send/receive partner disappeared mid-reduction.
  ///
  /// Fatal for the render pass; the caller must restart the whole
  /// distributed render.
  #[error("reduction desynchronized between rank {rank} and rank {partner}")]
  Desynchronized {
    /// This rank.
    rank: usize,
    /// The partner rank.
    partner: usize,
  },

  /// Flat node arrays cannot be reassembled into a tree.
  #[error("flat tree arrays are inconsistent: {0}")]
  MalformedFlatTree(String),

  /// A received image payload's shape header disagrees with its buffer.
  #[error("image payload is inconsistent: {0}")]
  MalformedPayload(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
