//! Rank abstraction and the pairwise image reduction.
//!
//! Every rank builds the same tree and renders only the leaves it owns; this
//! module supplies the communication seam ([`ParallelContext`]), the
//! rank-to-subtree ownership table ([`ReduceOwners`]), and the binary merge
//! that composites per-rank images into one final frame
//! ([`reduce_tree_images`]).

pub mod context;
pub mod owners;
pub mod reduce;

// Re-exports
pub use context::{run_distributed, ChannelContext, InlineContext, ParallelContext};
pub use owners::ReduceOwners;
pub use reduce::reduce_tree_images;
