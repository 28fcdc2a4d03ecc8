use glam::DVec3;

use super::*;

#[test]
fn test_contains_box_tolerant() {
  let outer = Aabb3::new(DVec3::ZERO, DVec3::splat(1.0));
  let inner = Aabb3::new(DVec3::splat(0.25), DVec3::splat(0.75));
  assert!(outer.contains_box(&inner));
  assert!(!inner.contains_box(&outer));

  // Identical boxes contain each other, even with round-off sized wiggle.
  let wiggled = Aabb3::new(DVec3::splat(-1e-12), DVec3::splat(1.0 + 1e-12));
  assert!(outer.contains_box(&wiggled));
}

#[test]
fn test_approx_eq() {
  let a = Aabb3::new(DVec3::ZERO, DVec3::splat(0.5));
  let b = Aabb3::new(DVec3::splat(1e-13), DVec3::splat(0.5 - 1e-13));
  assert!(a.approx_eq(&b));
  let c = Aabb3::new(DVec3::ZERO, DVec3::splat(0.5 + 1e-6));
  assert!(!a.approx_eq(&c));
}

#[test]
fn test_volume() {
  let a = Aabb3::new(DVec3::ZERO, DVec3::new(2.0, 3.0, 4.0));
  assert_eq!(a.volume(), 24.0);
}

#[test]
fn test_coord_to_index_row_major() {
  let dims = [4, 3, 2];
  // z varies fastest
  assert_eq!(coord_to_index([0, 0, 0], dims), 0);
  assert_eq!(coord_to_index([0, 0, 1], dims), 1);
  assert_eq!(coord_to_index([0, 1, 0], dims), 2);
  assert_eq!(coord_to_index([1, 0, 0], dims), 6);
  assert_eq!(coord_to_index([3, 2, 1], dims), cell_count(dims) - 1);
}
