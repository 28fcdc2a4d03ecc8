//! amr_volume - Distributed spatial partitioning and compositing for AMR data
//!
//! This crate builds binary kd-trees over adaptive-mesh-refinement block
//! hierarchies and composites volume-rendered images across ranks. Leaves of
//! the tree map one-to-one onto non-overlapping block sub-regions, so a
//! viewpoint-ordered walk yields a correct global visibility order without
//! sorting.
//!
//! # Features
//!
//! - **Level-ordered construction**: coarse blocks first, finer blocks carve
//!   refined sub-volumes out of existing leaves
//! - **Viewpoint traversals**: front-to-back and back-to-front leaf orders
//!   from O(1) split-plane comparisons
//! - **Brick materialization**: cached, optionally ghosted per-leaf field
//!   arrays ready for sampling
//! - **Pairwise image reduction**: per-rank partial frames merge bottom-up
//!   along the tree and broadcast from the root owner
//!
//! # Example
//!
//! ```ignore
//! use amr_volume::{
//!   ExecutionStrategy, FieldSpec, InMemoryHierarchy, KdTree, RenderConfig,
//! };
//! use glam::DVec3;
//!
//! let mut hierarchy = InMemoryHierarchy::new(domain, [64, 64, 64]);
//! // Register blocks and fields...
//!
//! let tree = KdTree::build_full(&hierarchy)?;
//! tree.check_tree(&hierarchy)?;
//!
//! let config = RenderConfig {
//!   width: 512,
//!   height: 512,
//!   viewpoint: DVec3::new(2.0, 1.5, 3.0),
//!   fields: vec![FieldSpec::log("density")],
//!   ghost: false,
//! };
//! let frame = amr_volume::render_scene(
//!   ExecutionStrategy::Distributed(8),
//!   &tree,
//!   &hierarchy,
//!   &sampler,
//!   &config,
//! )?;
//! ```

pub mod error;
pub mod types;

// Re-export commonly used items
pub use error::{EngineError, Result};
pub use types::{cell_count, coord_to_index, Aabb3, Block, BlockId, EDGE_TOL};

// Block hierarchy seam
pub mod hierarchy;
pub use hierarchy::{BlockHierarchy, InMemoryHierarchy};

// Spatial partition tree
pub mod tree;
pub use tree::{FlatTree, KdNode, KdTree, NodeId, Split, TraversalOrder, ROOT_ID};

// Brick materialization and caching
pub mod brick;
pub use brick::{Brick, BrickCache, FieldSpec};

// Image buffers and compositing
pub mod image;
pub use image::{over, ImageBuffer, ImagePayload};

// Rank abstraction and the pairwise reduction
pub mod parallel;
pub use parallel::{
  reduce_tree_images, run_distributed, ChannelContext, InlineContext, ParallelContext,
  ReduceOwners,
};

// Render pass
pub mod render;
pub use render::{
  render_and_composite, render_scene, EmissionSampler, ExecutionStrategy, PixelFrame,
  PixelSampler, RenderConfig,
};

#[cfg(test)]
pub mod test_utils;
