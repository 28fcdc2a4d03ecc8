//! Pairwise merge of per-rank images into one frame.
//!
//! Each rank starts at its slot node and climbs toward the root. At a merge
//! point it either owns the parent - then it receives the right subtree's
//! image from that subtree's owner and composites it - or it does not, in
//! which case it sends its image to the parent's owner and drops out. The
//! rank owning the root ends up with the complete frame and broadcasts it.
//!
//! Two degenerate moves fall out of clamped ownership: a sharer never
//! rendered anything and skips straight to the broadcast, and a rank that
//! owns both children of a merge point skips the exchange entirely, since
//! its local render already composited both subtrees in traversal order.

use glam::DVec3;

use crate::error::{EngineError, Result};
use crate::image::ImageBuffer;
use crate::parallel::context::ParallelContext;
use crate::parallel::owners::ReduceOwners;
use crate::tree::{parent_id, right_child_id, KdTree, ROOT_ID};

/// Merge per-rank images bottom-up and broadcast the final frame.
///
/// `image` is this rank's composite of the leaves it owns, blended
/// front-to-back along `viewpoint`. Every rank returns the same final frame.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, fields(rank = ctx.rank(), size = ctx.size()))
)]
pub fn reduce_tree_images<C: ParallelContext>(
  ctx: &C,
  tree: &KdTree,
  owners: &ReduceOwners,
  mut image: ImageBuffer,
  viewpoint: DVec3,
) -> Result<ImageBuffer> {
  if ctx.size() <= 1 {
    return Ok(image);
  }
  let rank = ctx.rank();

  if let Some(start) = owners.start_node(rank) {
    let mut node = start;
    while let Some(parent) = parent_id(node) {
      let parent_owner = owners
        .owner(parent)
        .ok_or(EngineError::OwnerMismatch { node_id: parent })?;
      if parent_owner != rank {
        ctx.send(parent_owner, image.to_payload())?;
        break;
      }

      let right = right_child_id(parent);
      let right_owner = owners
        .owner(right)
        .ok_or(EngineError::OwnerMismatch { node_id: right })?;
      if right_owner != rank {
        let received = ImageBuffer::from_payload(&ctx.recv(right_owner)?)?;
        let split = tree
          .node(parent)
          .split
          .ok_or(EngineError::OwnerMismatch { node_id: parent })?;
        // The received image covers the right subtree; it goes in front when
        // the viewpoint sits on the right side of the split plane.
        let received_in_front = viewpoint[split.dim] >= split.pos;
        image.blend(&received, received_in_front);
      }
      node = parent;
    }
  }

  let final_payload = ctx.broadcast(owners.root_owner(), image.to_payload())?;
  let final_image = ImageBuffer::from_payload(&final_payload)?;
  debug_assert_eq!(owners.owner(ROOT_ID), Some(owners.root_owner()));
  Ok(final_image)
}

#[cfg(test)]
#[path = "reduce_test.rs"]
mod reduce_test;
