//! Completion mailbox between worker threads and the streaming update.
//!
//! Following the IStage pattern: workers post completions → the update pass
//! drains them once per tick without blocking.
//!
//! Workers hold a cloned [`CompletionSender`]; the update pass owns the
//! [`CompletionMailbox`]. Both queues carry chunk locations only, payloads
//! travel through the host's own storage.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::octree::ChunkLocation;

/// Worker-side handle for posting completions.
#[derive(Clone, Debug)]
pub struct CompletionSender {
  data_tx: Sender<ChunkLocation>,
  mesh_tx: Sender<ChunkLocation>,
}

impl CompletionSender {
  /// Report that a requested data chunk finished loading.
  pub fn data_block_loaded(&self, location: ChunkLocation) {
    if let Err(err) = self.data_tx.send(location) {
      tracing::warn!(?location, %err, "Data completion dropped, mailbox closed");
    }
  }

  /// Report that a requested mesh chunk finished building.
  pub fn mesh_block_loaded(&self, location: ChunkLocation) {
    if let Err(err) = self.mesh_tx.send(location) {
      tracing::warn!(?location, %err, "Mesh completion dropped, mailbox closed");
    }
  }
}

/// Update-side end of the completion queues.
pub struct CompletionMailbox {
  sender: CompletionSender,
  data_rx: Receiver<ChunkLocation>,
  mesh_rx: Receiver<ChunkLocation>,
}

impl Default for CompletionMailbox {
  fn default() -> Self {
    Self::new()
  }
}

impl CompletionMailbox {
  pub fn new() -> Self {
    let (data_tx, data_rx) = unbounded();
    let (mesh_tx, mesh_rx) = unbounded();
    Self {
      sender: CompletionSender { data_tx, mesh_tx },
      data_rx,
      mesh_rx,
    }
  }

  /// Handle for worker threads.
  pub fn sender(&self) -> CompletionSender {
    self.sender.clone()
  }

  /// Take every data completion posted so far.
  pub fn drain_data_blocks(&self) -> Vec<ChunkLocation> {
    self.data_rx.try_iter().collect()
  }

  /// Take every mesh completion posted so far.
  pub fn drain_mesh_blocks(&self) -> Vec<ChunkLocation> {
    self.mesh_rx.try_iter().collect()
  }
}

#[cfg(test)]
#[path = "mailbox_test.rs"]
mod mailbox_test;
