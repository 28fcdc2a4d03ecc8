//! Distributed render pass.
//!
//! Each rank walks the tree front-to-back, materializes bricks for the
//! leaves it owns, splats every brick into an image with a [`PixelSampler`],
//! and composites the contributions in visibility order. The per-rank
//! partial frames are then merged by the pairwise reduction, so every rank
//! finishes holding the identical final frame.
//!
//! The sampler seam keeps the engine agnostic of shading: anything that can
//! turn one brick and one pixel into a premultiplied RGBA contribution plugs
//! in here. [`EmissionSampler`] is the built-in reference: an orthographic
//! x-y footprint shaded by the sampled field.

use glam::DVec3;
use rayon::prelude::*;

use crate::brick::{Brick, BrickCache, FieldSpec};
use crate::error::Result;
use crate::hierarchy::BlockHierarchy;
use crate::image::ImageBuffer;
use crate::parallel::context::{run_distributed, InlineContext, ParallelContext};
use crate::parallel::owners::ReduceOwners;
use crate::parallel::reduce::reduce_tree_images;
use crate::tree::{KdTree, TraversalOrder};
use crate::types::{coord_to_index, Aabb3};

/// How to execute a render pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionStrategy {
  /// Single rank on the calling thread.
  Inline,
  /// This many in-process ranks wired together by channels.
  Distributed(usize),
}

/// Camera and sampling parameters for one render pass.
#[derive(Clone, Debug)]
pub struct RenderConfig {
  /// Output width in pixels.
  pub width: usize,
  /// Output height in pixels.
  pub height: usize,
  /// Viewpoint that orders the traversal.
  pub viewpoint: DVec3,
  /// Fields to sample into bricks.
  pub fields: Vec<FieldSpec>,
  /// Request ghosted bricks.
  pub ghost: bool,
}

/// Per-pixel view of one render pass, handed to samplers.
pub struct PixelFrame {
  /// Output width in pixels.
  pub width: usize,
  /// Output height in pixels.
  pub height: usize,
  /// Domain covered by the tree.
  pub domain: Aabb3,
  /// Viewpoint that ordered the traversal.
  pub viewpoint: DVec3,
}

/// Turns one brick and one pixel into a premultiplied RGBA contribution.
pub trait PixelSampler: Sync {
  /// Contribution of `brick` to `pixel`; fully transparent where the brick
  /// does not project.
  fn sample(&self, brick: &Brick, pixel: [usize; 2], frame: &PixelFrame) -> [f64; 4];
}

/// Orthographic top-down footprint sampler.
///
/// Pixels map linearly onto the domain's x-y extent; a pixel inside the
/// brick's footprint is shaded grayscale from the field value of the cell
/// column at the brick's z mid-plane.
#[derive(Clone, Copy, Debug)]
pub struct EmissionSampler {
  /// Index into the brick's field arrays.
  pub field: usize,
  /// Multiplier applied to sampled values.
  pub scale: f64,
  /// Opacity of each brick's contribution.
  pub alpha: f64,
}

impl PixelSampler for EmissionSampler {
  fn sample(&self, brick: &Brick, pixel: [usize; 2], frame: &PixelFrame) -> [f64; 4] {
    let extent = frame.domain.size();
    let x = frame.domain.min.x + (pixel[0] as f64 + 0.5) / frame.width as f64 * extent.x;
    let y = frame.domain.min.y + (pixel[1] as f64 + 0.5) / frame.height as f64 * extent.y;
    if x < brick.left_edge.x
      || x >= brick.right_edge.x
      || y < brick.left_edge.y
      || y >= brick.right_edge.y
    {
      return [0.0; 4];
    }

    let halo = usize::from(brick.ghosted);
    let fx = (x - brick.left_edge.x) / (brick.right_edge.x - brick.left_edge.x);
    let fy = (y - brick.left_edge.y) / (brick.right_edge.y - brick.left_edge.y);
    let ix = ((fx * brick.dims[0] as f64) as usize).min(brick.dims[0] - 1) + halo;
    let iy = ((fy * brick.dims[1] as f64) as usize).min(brick.dims[1] - 1) + halo;
    let iz = brick.dims[2] / 2 + halo;
    let value = brick.data[self.field][coord_to_index([ix, iy, iz], brick.sample_dims())];

    let alpha = self.alpha.clamp(0.0, 1.0);
    let intensity = value * self.scale * alpha;
    [intensity, intensity, intensity, alpha]
  }
}

/// Render this rank's share of the tree and reduce to the final frame.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, fields(rank = ctx.rank(), size = ctx.size()))
)]
pub fn render_and_composite<C, H>(
  ctx: &C,
  tree: &KdTree,
  hierarchy: &H,
  cache: &mut BrickCache,
  sampler: &impl PixelSampler,
  config: &RenderConfig,
) -> Result<ImageBuffer>
where
  C: ParallelContext,
  H: BlockHierarchy,
{
  cache.initialize_source(config.fields.clone(), config.ghost);
  let owners = ReduceOwners::compute(tree, ctx.size());
  let frame = PixelFrame {
    width: config.width,
    height: config.height,
    domain: tree.domain(),
    viewpoint: config.viewpoint,
  };

  let mut image = ImageBuffer::transparent(config.width, config.height);
  for leaf in tree.traverse(config.viewpoint, TraversalOrder::FrontToBack) {
    if !owners.owns_leaf(ctx.rank(), leaf) {
      continue;
    }
    let Some(brick) = cache.materialize(tree, hierarchy, leaf)? else {
      continue;
    };
    // Each new leaf is farther than everything composited so far.
    let contribution = splat(&brick, sampler, &frame);
    image.blend(&contribution, false);
  }

  // No barrier before the reduction: its send/recv pairing is the
  // synchronization, and a rank that failed during rendering then surfaces
  // as Desynchronized at its partners instead of stalling them.
  reduce_tree_images(ctx, tree, &owners, image, config.viewpoint)
}

/// One-call entry point dispatching on the execution strategy.
pub fn render_scene<H>(
  strategy: ExecutionStrategy,
  tree: &KdTree,
  hierarchy: &H,
  sampler: &impl PixelSampler,
  config: &RenderConfig,
) -> Result<ImageBuffer>
where
  H: BlockHierarchy + Sync,
{
  match strategy {
    ExecutionStrategy::Inline => {
      let mut cache = BrickCache::new();
      render_and_composite(&InlineContext, tree, hierarchy, &mut cache, sampler, config)
    }
    ExecutionStrategy::Distributed(size) => {
      // Every rank's Result matters: any rank failing must surface even
      // though all successful ranks hold identical frames.
      let mut frames = run_distributed(size.max(1), |ctx| {
        let mut cache = BrickCache::new();
        render_and_composite(&ctx, tree, hierarchy, &mut cache, sampler, config)
      })
      .into_iter()
      .collect::<Result<Vec<_>>>()?;
      Ok(frames.swap_remove(0))
    }
  }
}

/// Sample one brick's contribution over the whole frame, pixels in parallel.
fn splat(brick: &Brick, sampler: &impl PixelSampler, frame: &PixelFrame) -> ImageBuffer {
  let pixels: Vec<[f64; 4]> = (0..frame.width * frame.height)
    .into_par_iter()
    .map(|i| sampler.sample(brick, [i % frame.width, i / frame.width], frame))
    .collect();
  ImageBuffer {
    width: frame.width,
    height: frame.height,
    pixels,
  }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;
