//! Shared fixtures for unit tests.

use glam::DVec3;

use crate::hierarchy::InMemoryHierarchy;
use crate::types::Aabb3;

/// `[0,1]^3` domain.
pub fn unit_domain() -> Aabb3 {
  Aabb3::new(DVec3::ZERO, DVec3::splat(1.0))
}

/// Four constant-density level-0 blocks occupying the x-y quadrants of the
/// unit domain, full extent in z. Quadrant order: (-x,-y), (-x,+y), (+x,-y),
/// (+x,+y); densities 1..=4.
pub fn quadrant_hierarchy() -> InMemoryHierarchy {
  let mut h = InMemoryHierarchy::new(unit_domain(), [4, 4, 4]);
  let quads = [
    (DVec3::new(0.0, 0.0, 0.0), 1.0),
    (DVec3::new(0.0, 0.5, 0.0), 2.0),
    (DVec3::new(0.5, 0.0, 0.0), 3.0),
    (DVec3::new(0.5, 0.5, 0.0), 4.0),
  ];
  for (corner, value) in quads {
    h.add_constant_block(
      0,
      corner,
      corner + DVec3::new(0.5, 0.5, 1.0),
      "density",
      value,
    );
  }
  h
}

/// Two level-0 halves of the unit domain plus one level-1 block refining the
/// lower corner of the left half.
pub fn refined_hierarchy() -> InMemoryHierarchy {
  let mut h = InMemoryHierarchy::new(unit_domain(), [4, 4, 4]);
  h.add_constant_block(0, DVec3::ZERO, DVec3::new(0.5, 1.0, 1.0), "density", 1.0);
  h.add_constant_block(
    0,
    DVec3::new(0.5, 0.0, 0.0),
    DVec3::splat(1.0),
    "density",
    2.0,
  );
  h.add_constant_block(1, DVec3::ZERO, DVec3::splat(0.25), "density", 3.0);
  h
}
