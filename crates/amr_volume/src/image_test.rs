use super::*;

#[test]
fn test_over_is_identity_on_transparent() {
  let p = [0.2, 0.3, 0.1, 0.5];
  assert_eq!(over(p, [0.0; 4]), p);
  assert_eq!(over([0.0; 4], p), p);
}

#[test]
fn test_over_is_not_commutative() {
  let a = [0.5, 0.0, 0.0, 0.5];
  let b = [0.0, 0.5, 0.0, 0.5];
  assert_ne!(over(a, b), over(b, a));
  // But alpha accumulates the same either way.
  assert_eq!(over(a, b)[3], over(b, a)[3]);
}

#[test]
fn test_opaque_front_occludes() {
  let front = [0.1, 0.2, 0.3, 1.0];
  let back = [0.9, 0.9, 0.9, 0.9];
  assert_eq!(over(front, back), front);
}

#[test]
fn test_blend_direction() {
  let a = [0.5, 0.0, 0.0, 0.5];
  let b = [0.0, 0.5, 0.0, 0.5];

  let mut img = ImageBuffer::filled(2, 2, a);
  let other = ImageBuffer::filled(2, 2, b);

  img.blend(&other, true);
  assert_eq!(img.pixels[0], over(b, a));

  let mut img = ImageBuffer::filled(2, 2, a);
  img.blend(&other, false);
  assert_eq!(img.pixels[0], over(a, b));
}

#[test]
fn test_over_associativity() {
  let a = [0.3, 0.1, 0.0, 0.4];
  let b = [0.0, 0.2, 0.5, 0.3];
  let c = [0.1, 0.1, 0.1, 0.6];
  let left = over(over(a, b), c);
  let right = over(a, over(b, c));
  for d in 0..4 {
    assert!((left[d] - right[d]).abs() < 1e-15);
  }
}

#[test]
fn test_payload_round_trip() {
  let mut img = ImageBuffer::transparent(3, 2);
  for (i, p) in img.pixels.iter_mut().enumerate() {
    *p = [i as f64, 0.5, -1.0, 0.25 * i as f64];
  }
  let payload = img.to_payload();
  assert_eq!(payload.shape, [3, 2, 4]);
  assert_eq!(payload.buffer.len(), 24);
  assert_eq!(ImageBuffer::from_payload(&payload).unwrap(), img);
}

#[test]
fn test_malformed_payload_is_rejected() {
  let payload = ImagePayload {
    shape: [2, 2, 4],
    buffer: vec![0.0; 15],
  };
  assert!(ImageBuffer::from_payload(&payload).is_err());
}

#[test]
fn test_transparent_is_transparent() {
  assert!(ImageBuffer::transparent(4, 4).is_transparent());
  assert!(!ImageBuffer::filled(1, 1, [0.0, 0.0, 0.0, 0.1]).is_transparent());
}
