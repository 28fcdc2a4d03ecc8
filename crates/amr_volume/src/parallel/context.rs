//! Communication seam between ranks.
//!
//! The reduction only ever needs point-to-point image exchange, a broadcast
//! of the final frame, and a barrier, so that is the whole trait.
//! [`InlineContext`] serves the single-process path; [`ChannelContext`] wires
//! a fixed set of in-process ranks together over crossbeam channels, one
//! channel per ordered rank pair.

use std::sync::{Arc, Barrier};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::error::{EngineError, Result};
use crate::image::ImagePayload;

/// Rank-local view of a communicator.
pub trait ParallelContext {
  /// This rank's index, in `0..size()`.
  fn rank(&self) -> usize;

  /// Number of participating ranks.
  fn size(&self) -> usize;

  /// Send a payload to rank `to`.
  fn send(&self, to: usize, payload: ImagePayload) -> Result<()>;

  /// Receive the next payload sent by rank `from`. Blocks.
  fn recv(&self, from: usize) -> Result<ImagePayload>;

  /// Distribute `root`'s payload to every rank. Payloads passed by non-root
  /// ranks are discarded.
  fn broadcast(&self, root: usize, payload: ImagePayload) -> Result<ImagePayload> {
    if self.rank() == root {
      for to in 0..self.size() {
        if to != root {
          self.send(to, payload.clone())?;
        }
      }
      Ok(payload)
    } else {
      self.recv(root)
    }
  }

  /// Wait for every rank to arrive.
  fn barrier(&self);
}

/// Degenerate single-rank communicator.
///
/// `send` and `recv` are unreachable with one rank; they fail loudly rather
/// than deadlock if a caller miscomputes a partner.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineContext;

impl ParallelContext for InlineContext {
  fn rank(&self) -> usize {
    0
  }

  fn size(&self) -> usize {
    1
  }

  fn send(&self, to: usize, _payload: ImagePayload) -> Result<()> {
    Err(EngineError::Desynchronized { rank: 0, partner: to })
  }

  fn recv(&self, from: usize) -> Result<ImagePayload> {
    Err(EngineError::Desynchronized { rank: 0, partner: from })
  }

  fn barrier(&self) {}
}

/// In-process communicator backed by a full mesh of crossbeam channels.
pub struct ChannelContext {
  rank: usize,
  size: usize,
  /// Indexed by destination rank.
  senders: Vec<Sender<ImagePayload>>,
  /// Indexed by source rank.
  receivers: Vec<Receiver<ImagePayload>>,
  barrier: Arc<Barrier>,
}

impl ChannelContext {
  /// Build one context per rank, all wired to each other.
  pub fn mesh(size: usize) -> Vec<ChannelContext> {
    let barrier = Arc::new(Barrier::new(size));
    let mut senders: Vec<Vec<Sender<ImagePayload>>> =
      (0..size).map(|_| Vec::with_capacity(size)).collect();
    let mut receivers: Vec<Vec<Receiver<ImagePayload>>> =
      (0..size).map(|_| Vec::with_capacity(size)).collect();
    for from in 0..size {
      for to in 0..size {
        let (tx, rx) = unbounded();
        senders[from].push(tx);
        receivers[to].push(rx);
      }
    }
    senders
      .into_iter()
      .zip(receivers)
      .enumerate()
      .map(|(rank, (senders, receivers))| ChannelContext {
        rank,
        size,
        senders,
        receivers,
        barrier: Arc::clone(&barrier),
      })
      .collect()
  }
}

impl ParallelContext for ChannelContext {
  fn rank(&self) -> usize {
    self.rank
  }

  fn size(&self) -> usize {
    self.size
  }

  fn send(&self, to: usize, payload: ImagePayload) -> Result<()> {
    self.senders[to].send(payload).map_err(|_| EngineError::Desynchronized {
      rank: self.rank,
      partner: to,
    })
  }

  fn recv(&self, from: usize) -> Result<ImagePayload> {
    self.receivers[from].recv().map_err(|_| EngineError::Desynchronized {
      rank: self.rank,
      partner: from,
    })
  }

  fn barrier(&self) {
    self.barrier.wait();
  }
}

/// Run `f` once per rank on `size` scoped threads and collect the results in
/// rank order.
pub fn run_distributed<R, F>(size: usize, f: F) -> Vec<R>
where
  R: Send,
  F: Fn(ChannelContext) -> R + Sync,
{
  let contexts = ChannelContext::mesh(size);
  std::thread::scope(|scope| {
    let f = &f;
    let handles: Vec<_> = contexts
      .into_iter()
      .map(|ctx| scope.spawn(move || f(ctx)))
      .collect();
    handles
      .into_iter()
      .map(|h| h.join().expect("rank thread panicked"))
      .collect()
  })
}

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;
