//! Bounded wait-free SPSC queue of port identifiers
//!
//! Carries connection requests from the host's notifier path (which may be
//! the time-critical callback) to the non-realtime connection handler. One
//! producer, one consumer, fixed capacity, no locks, no allocation after
//! construction.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::error::CvError;
use crate::host::PortId;

/// Queue capacity used by [`ContextConfig`](crate::ContextConfig) defaults.
pub const DEFAULT_CAPACITY: usize = 64;

/// The ring itself, shared by exactly the two ends.
///
/// `head` and `tail` are free-running operation counters; the slot for an
/// operation is its counter value modulo capacity. Occupancy is
/// `tail - head`, always in `[0, capacity]`.
#[derive(Debug)]
struct Ring {
    slots: Box<[AtomicU32]>,
    /// Total pops so far. Written only by the consumer.
    head: AtomicUsize,
    /// Total pushes so far. Written only by the producer.
    tail: AtomicUsize,
}

/// Factory for a connection-request queue.
pub struct ConnectQueue;

impl ConnectQueue {
    /// Allocate the backing storage once and hand out the two ends.
    ///
    /// Capacity is immutable afterwards. Zero capacity is rejected.
    pub fn with_capacity(
        capacity: usize,
    ) -> Result<(ConnectProducer, ConnectConsumer), CvError> {
        if capacity == 0 {
            return Err(CvError::InvalidConfiguration(
                "queue capacity must be non-zero".into(),
            ));
        }

        let ring = Arc::new(Ring {
            slots: (0..capacity).map(|_| AtomicU32::new(0)).collect(),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        });

        Ok((
            ConnectProducer { ring: ring.clone() },
            ConnectConsumer { ring },
        ))
    }
}

/// Why a push did not happen. The identifier is handed back either way.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PushError {
    /// No space left; the item was dropped, visibly to the caller.
    #[error("queue is full")]
    Full(PortId),
    /// The consumer end no longer exists; nothing will ever drain this queue.
    #[error("consumer end is gone")]
    Abandoned(PortId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PopError {
    #[error("queue is empty")]
    Empty,
}

/// Write end. Safe on the time-critical path: every operation is a bounded
/// number of memory accesses.
#[derive(Debug)]
pub struct ConnectProducer {
    ring: Arc<Ring>,
}

impl ConnectProducer {
    /// Append an identifier, or report why not. Never blocks.
    pub fn push(&mut self, id: PortId) -> Result<(), PushError> {
        if self.is_abandoned() {
            return Err(PushError::Abandoned(id));
        }

        let ring = &*self.ring;
        let tail = ring.tail.load(Ordering::Relaxed);
        let head = ring.head.load(Ordering::Acquire);
        if tail.wrapping_sub(head) >= ring.slots.len() {
            return Err(PushError::Full(id));
        }

        // Full-width copy of the identifier into the slot, then publish.
        ring.slots[tail % ring.slots.len()].store(id.0, Ordering::Relaxed);
        ring.tail.store(tail.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Free space right now, from the producer's point of view.
    pub fn slots(&self) -> usize {
        let ring = &*self.ring;
        let tail = ring.tail.load(Ordering::Relaxed);
        let head = ring.head.load(Ordering::Acquire);
        ring.slots.len() - tail.wrapping_sub(head)
    }

    pub fn capacity(&self) -> usize {
        self.ring.slots.len()
    }

    /// True once the consumer end has been dropped.
    pub fn is_abandoned(&self) -> bool {
        Arc::strong_count(&self.ring) < 2
    }
}

/// Read end. Held by the connection handler; also non-blocking, though its
/// owner is allowed to block elsewhere.
pub struct ConnectConsumer {
    ring: Arc<Ring>,
}

impl ConnectConsumer {
    /// Remove and return the oldest identifier, if any. Never blocks.
    pub fn pop(&mut self) -> Result<PortId, PopError> {
        let ring = &*self.ring;
        let head = ring.head.load(Ordering::Relaxed);
        let tail = ring.tail.load(Ordering::Acquire);
        if head == tail {
            return Err(PopError::Empty);
        }

        // The acquire on `tail` orders this read after the producer's store.
        let id = ring.slots[head % ring.slots.len()].load(Ordering::Relaxed);
        ring.head.store(head.wrapping_add(1), Ordering::Release);
        Ok(PortId(id))
    }

    pub fn is_empty(&self) -> bool {
        let ring = &*self.ring;
        ring.head.load(Ordering::Relaxed) == ring.tail.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.ring.slots.len()
    }
}
