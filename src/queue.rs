//! Bounded, crash-durable, newline-delimited record queue.
//!
//! An append-only log of self-contained record lines over an abstract
//! byte store ([`QueueBackend`]). Two deliberate policies, preserved from
//! the field-proven behavior of this node:
//!
//! - **Overflow wipes everything.** If the queue exceeds its byte ceiling
//!   the whole log is deleted. Losing buffered history is accepted in
//!   exchange for a hard guarantee the device never runs out of storage.
//! - **Drain is all-or-nothing.** Records are published in insertion order;
//!   the first publish failure aborts the pass and leaves storage
//!   untouched, so earlier records of the pass will be re-sent next time.
//!   Delivery is at-least-once, never at-most-once.

use heapless::Vec;
use log::warn;

use crate::common::error::NodeError;
use crate::common::hal::QueueBackend;

/// Upper bound on one serialized record line, terminator excluded.
pub const MAX_RECORD_BYTES: usize = 512;

const READ_CHUNK: usize = 128;

/// Append-only bounded record log.
#[derive(Debug)]
pub struct DurableQueue<B: QueueBackend> {
    backend: B,
    max_bytes: u64,
}

impl<B: QueueBackend> DurableQueue<B> {
    pub fn new(backend: B, max_bytes: u64) -> Self {
        DurableQueue { backend, max_bytes }
    }

    #[cfg(test)]
    pub(crate) fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Mounts the underlying storage and enforces the capacity ceiling.
    pub fn open(&mut self) -> Result<(), NodeError<B::Error>> {
        self.backend.mount().map_err(NodeError::Io)?;
        self.enforce_capacity()
    }

    /// Current queue size in bytes.
    pub fn size_bytes(&mut self) -> Result<u64, NodeError<B::Error>> {
        self.backend.size_bytes().map_err(NodeError::Io)
    }

    /// Wipes the queue if it has grown past the ceiling.
    fn enforce_capacity(&mut self) -> Result<(), NodeError<B::Error>> {
        let size = self.backend.size_bytes().map_err(NodeError::Io)?;
        if size > self.max_bytes {
            warn!("queue overflow ({size} > {} bytes), dropping backlog", self.max_bytes);
            self.backend.wipe().map_err(NodeError::Io)?;
        }
        Ok(())
    }

    /// Appends one record plus line terminator as a single write.
    ///
    /// On success the record is syntactically complete on storage; no
    /// partial record is ever left behind by a successful append.
    pub fn append(&mut self, record: &[u8]) -> Result<(), NodeError<B::Error>> {
        self.enforce_capacity()?;

        let mut line = Vec::<u8, { MAX_RECORD_BYTES + 1 }>::new();
        line.extend_from_slice(record)
            .map_err(|_| NodeError::RecordTooLarge)?;
        line.push(b'\n').map_err(|_| NodeError::RecordTooLarge)?;
        self.backend.append(&line).map_err(NodeError::Io)
    }

    /// Publishes every record in insertion order, then clears the queue.
    ///
    /// `publish` returning `false` aborts the pass immediately; storage is
    /// only wiped after an uninterrupted full pass. Returns the number of
    /// records published. An empty or absent queue trivially succeeds.
    pub fn drain<F>(&mut self, mut publish: F) -> Result<u32, NodeError<B::Error>>
    where
        F: FnMut(&[u8]) -> bool,
    {
        let mut offset: u64 = 0;
        let mut published: u32 = 0;
        let mut line = Vec::<u8, MAX_RECORD_BYTES>::new();
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            let n = self
                .backend
                .read_at(offset, &mut chunk)
                .map_err(NodeError::Io)?;
            if n == 0 {
                break;
            }
            for &byte in &chunk[..n] {
                if byte == b'\n' {
                    if !line.is_empty() {
                        if !publish(&line) {
                            return Err(NodeError::PublishRejected);
                        }
                        published += 1;
                        line.clear();
                    }
                } else {
                    line.push(byte).map_err(|_| NodeError::RecordTooLarge)?;
                }
            }
            offset += n as u64;
        }

        // A trailing unterminated line should not occur (append always
        // writes the terminator) but is still delivered rather than lost.
        if !line.is_empty() {
            if !publish(&line) {
                return Err(NodeError::PublishRejected);
            }
            published += 1;
        }

        if offset > 0 {
            self.backend.wipe().map_err(NodeError::Io)?;
        }
        Ok(published)
    }
}
