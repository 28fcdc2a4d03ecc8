//! Tree construction and traversal benchmarks.
//!
//! Measures the three hot phases of a frame against a synthetic two-level
//! hierarchy:
//! - **build**: level-ordered block insertion
//! - **traverse**: viewpoint-ordered leaf iteration
//! - **owners**: ownership table computation for varying rank counts

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::DVec3;

use amr_volume::parallel::ReduceOwners;
use amr_volume::{Aabb3, InMemoryHierarchy, KdTree, TraversalOrder};

/// `n^3` level-0 blocks tiling the unit domain, with every other block on
/// each axis refined by one level-1 block in its lower corner.
fn synthetic_hierarchy(n: usize) -> InMemoryHierarchy {
  let domain = Aabb3::new(DVec3::ZERO, DVec3::splat(1.0));
  let mut h = InMemoryHierarchy::new(domain, [8 * n, 8 * n, 8 * n]);
  let w = 1.0 / n as f64;
  for x in 0..n {
    for y in 0..n {
      for z in 0..n {
        let corner = DVec3::new(x as f64, y as f64, z as f64) * w;
        h.add_constant_block(0, corner, corner + DVec3::splat(w), "density", 1.0);
      }
    }
  }
  for x in (0..n).step_by(2) {
    for y in (0..n).step_by(2) {
      for z in (0..n).step_by(2) {
        let corner = DVec3::new(x as f64, y as f64, z as f64) * w;
        h.add_constant_block(
          1,
          corner,
          corner + DVec3::splat(w / 2.0),
          "density",
          4.0,
        );
      }
    }
  }
  h
}

fn bench_build(c: &mut Criterion) {
  let mut group = c.benchmark_group("tree_build");
  for n in [4, 8] {
    let h = synthetic_hierarchy(n);
    group.bench_with_input(BenchmarkId::from_parameter(n), &h, |b, h| {
      b.iter(|| KdTree::build_full(black_box(h)).unwrap());
    });
  }
  group.finish();
}

fn bench_traverse(c: &mut Criterion) {
  let h = synthetic_hierarchy(8);
  let tree = KdTree::build_full(&h).unwrap();
  let viewpoint = DVec3::new(2.0, -1.5, 3.0);

  c.bench_function("traverse_front_to_back", |b| {
    b.iter(|| {
      tree
        .traverse(black_box(viewpoint), TraversalOrder::FrontToBack)
        .count()
    });
  });
  c.bench_function("depth_first_touch", |b| {
    b.iter(|| tree.depth_first_touch().count());
  });
}

fn bench_owners(c: &mut Criterion) {
  let h = synthetic_hierarchy(8);
  let tree = KdTree::build_full(&h).unwrap();

  let mut group = c.benchmark_group("reduce_owners");
  for size in [4, 16, 64] {
    group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
      b.iter(|| ReduceOwners::compute(black_box(&tree), size));
    });
  }
  group.finish();
}

criterion_group!(benches, bench_build, bench_traverse, bench_owners);
criterion_main!(benches);
