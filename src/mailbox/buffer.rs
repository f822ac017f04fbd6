//! Try-lock guarded single-slot frame buffer.

use crate::capture::{Frame, FrameError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, TryLockError};

/// Slot contents. `valid` implies `frame` is non-empty and well-formed.
#[derive(Debug)]
struct Slot {
    frame: Frame,
    valid: bool,
}

/// Counters describing mailbox traffic.
///
/// Drops are expected in steady state; these exist for diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameBufferStats {
    /// Frames accepted by `publish`.
    pub published: u64,
    /// Publishes dropped because the consumer held the guard.
    pub dropped_busy: u64,
    /// Publishes dropped because the previous frame was not consumed yet.
    pub dropped_unconsumed: u64,
    /// Frames handed to a consumer.
    pub consumed: u64,
    /// Consume attempts that found the guard held by the producer.
    pub consume_busy: u64,
    /// Consume attempts that found no fresh frame.
    pub consume_empty: u64,
}

#[derive(Debug, Default)]
struct Counters {
    published: AtomicU64,
    dropped_busy: AtomicU64,
    dropped_unconsumed: AtomicU64,
    consumed: AtomicU64,
    consume_busy: AtomicU64,
    consume_empty: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> FrameBufferStats {
        FrameBufferStats {
            published: self.published.load(Ordering::Relaxed),
            dropped_busy: self.dropped_busy.load(Ordering::Relaxed),
            dropped_unconsumed: self.dropped_unconsumed.load(Ordering::Relaxed),
            consumed: self.consumed.load(Ordering::Relaxed),
            consume_busy: self.consume_busy.load(Ordering::Relaxed),
            consume_empty: self.consume_empty.load(Ordering::Relaxed),
        }
    }
}

/// Single-slot mailbox between the camera thread and the render thread.
///
/// Neither side ever blocks: both `publish` and `try_consume` give up
/// immediately when the other side holds the guard. A frame that has not
/// been consumed yet is never overwritten, and a consumed frame is never
/// handed out twice.
#[derive(Debug)]
pub struct FrameBuffer {
    slot: Mutex<Slot>,
    /// Sequence number assigned to the next accepted frame.
    next_sequence: AtomicU64,
    counters: Counters,
}

impl FrameBuffer {
    /// Creates an empty mailbox.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                frame: Frame::empty(),
                valid: false,
            }),
            next_sequence: AtomicU64::new(1),
            counters: Counters::default(),
        }
    }

    /// Non-blocking guard acquisition. A poisoned lock is recovered: the
    /// slot is only mutated after validation, so it is always consistent.
    fn try_slot(&self) -> Option<MutexGuard<'_, Slot>> {
        match self.slot.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Offers a frame to the consumer.
    ///
    /// Copies the first `width * height` bytes of `data`. Returns
    /// `Ok(false)` when the frame was dropped, either because the consumer
    /// holds the guard or because the previous frame is still unconsumed.
    pub fn publish(&self, data: &[u8], width: u32, height: u32) -> Result<bool, FrameError> {
        let expected = crate::capture::luma_len(width, height)?;
        if data.len() < expected {
            return Err(FrameError::Truncated {
                expected,
                actual: data.len(),
            });
        }

        let Some(mut slot) = self.try_slot() else {
            Counters::bump(&self.counters.dropped_busy);
            tracing::trace!("publish dropped: consumer holds the frame buffer");
            return Ok(false);
        };

        if slot.valid {
            Counters::bump(&self.counters.dropped_unconsumed);
            tracing::trace!(
                pending = slot.frame.sequence(),
                "publish dropped: previous frame not consumed"
            );
            return Ok(false);
        }

        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        slot.frame.overwrite(data, width, height, sequence)?;
        slot.valid = true;
        Counters::bump(&self.counters.published);

        tracing::trace!(sequence, width, height, "frame published");
        Ok(true)
    }

    /// Hands the fresh frame, if any, to `f` while holding the guard.
    ///
    /// Returns `None` without calling `f` when the producer holds the guard
    /// or no unconsumed frame is present. After `f` returns the frame is
    /// marked consumed.
    pub fn try_consume<R>(&self, f: impl FnOnce(&Frame) -> R) -> Option<R> {
        let Some(mut slot) = self.try_slot() else {
            Counters::bump(&self.counters.consume_busy);
            return None;
        };

        if !slot.valid {
            Counters::bump(&self.counters.consume_empty);
            return None;
        }

        // Cleared before `f` runs so a panicking consumer cannot leave the
        // same frame to be rendered again.
        slot.valid = false;
        Counters::bump(&self.counters.consumed);
        Some(f(&slot.frame))
    }

    /// Consumes the fresh frame by cloning it out of the slot.
    pub fn try_take(&self) -> Option<Frame> {
        self.try_consume(Frame::clone)
    }

    /// True when an unconsumed frame is waiting. Returns `false` under
    /// contention, since the state cannot be observed without the guard.
    pub fn has_fresh_frame(&self) -> bool {
        self.try_slot().map(|slot| slot.valid).unwrap_or(false)
    }

    /// Returns the traffic counters.
    pub fn stats(&self) -> FrameBufferStats {
        self.counters.snapshot()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
