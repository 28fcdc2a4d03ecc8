use crate::image::ImageBuffer;

use super::*;

fn payload_of(value: f64) -> ImagePayload {
  ImageBuffer::filled(1, 1, [value, 0.0, 0.0, 1.0]).to_payload()
}

#[test]
fn test_inline_context_shape() {
  let ctx = InlineContext;
  assert_eq!(ctx.rank(), 0);
  assert_eq!(ctx.size(), 1);
  ctx.barrier();
  assert!(ctx.send(0, payload_of(1.0)).is_err());
  assert!(ctx.recv(0).is_err());
}

#[test]
fn test_inline_broadcast_is_identity() {
  let ctx = InlineContext;
  let payload = payload_of(0.5);
  assert_eq!(ctx.broadcast(0, payload.clone()).unwrap(), payload);
}

#[test]
fn test_point_to_point_exchange() {
  let results = run_distributed(3, |ctx| {
    // Every rank sends its id to the next rank in a ring.
    let next = (ctx.rank() + 1) % ctx.size();
    let prev = (ctx.rank() + ctx.size() - 1) % ctx.size();
    ctx.send(next, payload_of(ctx.rank() as f64)).unwrap();
    ctx.recv(prev).unwrap().buffer[0]
  });
  assert_eq!(results, vec![2.0, 0.0, 1.0]);
}

#[test]
fn test_broadcast_from_nonzero_root() {
  let results = run_distributed(4, |ctx| {
    let payload = payload_of(ctx.rank() as f64 * 10.0);
    ctx.broadcast(2, payload).unwrap().buffer[0]
  });
  assert_eq!(results, vec![20.0; 4]);
}

#[test]
fn test_pairwise_channels_are_ordered() {
  let results = run_distributed(2, |ctx| {
    if ctx.rank() == 0 {
      ctx.send(1, payload_of(1.0)).unwrap();
      ctx.send(1, payload_of(2.0)).unwrap();
      Vec::new()
    } else {
      vec![
        ctx.recv(0).unwrap().buffer[0],
        ctx.recv(0).unwrap().buffer[0],
      ]
    }
  });
  assert_eq!(results[1], vec![1.0, 2.0]);
}

#[test]
fn test_barrier_releases_all_ranks_together() {
  use std::sync::atomic::{AtomicUsize, Ordering};

  let arrivals = AtomicUsize::new(0);
  run_distributed(4, |ctx| {
    arrivals.fetch_add(1, Ordering::SeqCst);
    ctx.barrier();
    assert_eq!(arrivals.load(Ordering::SeqCst), 4);
  });
}

#[test]
fn test_dropped_partner_is_detected() {
  let results = run_distributed(2, |ctx| {
    if ctx.rank() == 0 {
      // Exit immediately, dropping this rank's channel endpoints.
      Ok(ImagePayload {
        shape: [0, 0, 4],
        buffer: Vec::new(),
      })
    } else {
      ctx.recv(0)
    }
  });
  assert!(matches!(
    results[1],
    Err(crate::error::EngineError::Desynchronized { rank: 1, partner: 0 })
  ));
}
