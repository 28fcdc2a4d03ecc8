//! RGBA image buffers, over-compositing, and the reduction wire payload.
//!
//! Channels are premultiplied-alpha f64. The over operator is the only blend
//! the engine performs and it is not commutative: `over(front, back)` differs
//! from `over(back, front)`, which is why traversal and reduction order
//! matter everywhere else in this crate.

use crate::error::{EngineError, Result};

/// Premultiplied RGBA image with f64 channels.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBuffer {
  /// Width in pixels.
  pub width: usize,
  /// Height in pixels.
  pub height: usize,
  /// Row-major pixels, `[r, g, b, a]` each.
  pub pixels: Vec<[f64; 4]>,
}

impl ImageBuffer {
  /// Fully transparent image - the identity of the over operator.
  pub fn transparent(width: usize, height: usize) -> Self {
    Self {
      width,
      height,
      pixels: vec![[0.0; 4]; width * height],
    }
  }

  /// Uniformly filled image.
  pub fn filled(width: usize, height: usize, pixel: [f64; 4]) -> Self {
    Self {
      width,
      height,
      pixels: vec![pixel; width * height],
    }
  }

  /// True when every pixel is fully transparent.
  pub fn is_transparent(&self) -> bool {
    self.pixels.iter().all(|p| p.iter().all(|&c| c == 0.0))
  }

  /// Composite `other` into `self` with the over operator.
  ///
  /// With `other_in_front`, `other` occludes `self`; otherwise `self` stays
  /// in front and `other` shows through the remaining transparency.
  pub fn blend(&mut self, other: &ImageBuffer, other_in_front: bool) {
    debug_assert_eq!(
      (self.width, self.height),
      (other.width, other.height),
      "blended images must agree in shape"
    );
    for (dst, src) in self.pixels.iter_mut().zip(&other.pixels) {
      let (front, back) = if other_in_front {
        (*src, *dst)
      } else {
        (*dst, *src)
      };
      *dst = over(front, back);
    }
  }
}

/// Premultiplied over operator for a single pixel.
#[inline]
pub fn over(front: [f64; 4], back: [f64; 4]) -> [f64; 4] {
  let transmission = 1.0 - front[3];
  [
    front[0] + back[0] * transmission,
    front[1] + back[1] * transmission,
    front[2] + back[2] * transmission,
    front[3] + back[3] * transmission,
  ]
}

/// Wire payload exchanged during the reduction: a flat channel buffer plus a
/// small shape header. This pairing is the only wire format the engine
/// defines.
#[derive(Clone, Debug, PartialEq)]
pub struct ImagePayload {
  /// `[width, height, channels]`.
  pub shape: [u64; 3],
  /// Row-major channel data, `width * height * channels` values.
  pub buffer: Vec<f64>,
}

impl ImageBuffer {
  /// Serialize into the wire payload.
  pub fn to_payload(&self) -> ImagePayload {
    let mut buffer = Vec::with_capacity(self.pixels.len() * 4);
    for p in &self.pixels {
      buffer.extend_from_slice(p);
    }
    ImagePayload {
      shape: [self.width as u64, self.height as u64, 4],
      buffer,
    }
  }

  /// Deserialize from the wire payload.
  pub fn from_payload(payload: &ImagePayload) -> Result<Self> {
    let [width, height, channels] = payload.shape;
    let expected = (width * height * channels) as usize;
    if channels != 4 || payload.buffer.len() != expected {
      return Err(EngineError::MalformedPayload(format!(
        "shape {:?} does not match buffer length {}",
        payload.shape,
        payload.buffer.len()
      )));
    }
    let pixels = payload
      .buffer
      .chunks_exact(4)
      .map(|c| [c[0], c[1], c[2], c[3]])
      .collect();
    Ok(Self {
      width: width as usize,
      height: height as usize,
      pixels,
    })
  }
}

#[cfg(test)]
#[path = "image_test.rs"]
mod image_test;
