use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::shared::frame::Frame;

/// Outcome of offering a frame to the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Offer {
    Accepted,
    /// A previous frame is still in flight; this one was discarded.
    Dropped,
    /// The consumer is gone; the producer should stop.
    Closed,
}

/// Delivery counters shared by both halves of a slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub delivered: usize,
    pub dropped: usize,
}

#[derive(Default)]
struct SlotState {
    in_flight: AtomicBool,
    closed: AtomicBool,
    delivered: AtomicUsize,
    dropped: AtomicUsize,
}

impl SlotState {
    fn stats(&self) -> FrameStats {
        FrameStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Creates a single-slot hand-off between a capture thread and one consumer.
///
/// At most one frame is in flight: from the moment [`FrameSink::offer`]
/// accepts it until the consumer drops the [`FrameLease`]. Frames offered in
/// between are discarded, never queued.
pub fn frame_slot() -> (FrameSink, FrameReceiver) {
    let (tx, rx) = crossbeam_channel::bounded::<Frame>(1);
    let state = Arc::new(SlotState::default());
    (
        FrameSink {
            tx,
            state: state.clone(),
        },
        FrameReceiver { rx, state },
    )
}

/// Producer half, owned by the capture thread.
pub struct FrameSink {
    tx: Sender<Frame>,
    state: Arc<SlotState>,
}

impl FrameSink {
    pub fn offer(&self, frame: Frame) -> Offer {
        if self.state.closed.load(Ordering::Acquire) {
            return Offer::Closed;
        }
        if self
            .state
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.state.dropped.fetch_add(1, Ordering::Relaxed);
            log::trace!("Dropped late frame {}", frame.index());
            return Offer::Dropped;
        }

        match self.tx.try_send(frame) {
            Ok(()) => {
                self.state.delivered.fetch_add(1, Ordering::Relaxed);
                Offer::Accepted
            }
            Err(TrySendError::Full(frame)) => {
                // Only reachable if the in-flight flag was cleared while a
                // frame still sat in the channel.
                self.state.in_flight.store(false, Ordering::Release);
                self.state.dropped.fetch_add(1, Ordering::Relaxed);
                log::trace!("Dropped late frame {}", frame.index());
                Offer::Dropped
            }
            Err(TrySendError::Disconnected(_)) => {
                self.state.in_flight.store(false, Ordering::Release);
                Offer::Closed
            }
        }
    }

    pub fn stats(&self) -> FrameStats {
        self.state.stats()
    }
}

/// Consumer half, owned by the frame worker.
pub struct FrameReceiver {
    rx: Receiver<Frame>,
    state: Arc<SlotState>,
}

impl FrameReceiver {
    /// Blocks until a frame arrives. `None` once the sink is dropped.
    pub fn recv(&self) -> Option<FrameLease> {
        self.rx.recv().ok().map(|frame| self.lease(frame))
    }

    pub fn try_recv(&self) -> Option<FrameLease> {
        self.rx.try_recv().ok().map(|frame| self.lease(frame))
    }

    pub fn stats(&self) -> FrameStats {
        self.state.stats()
    }

    fn lease(&self, frame: Frame) -> FrameLease {
        FrameLease {
            frame,
            state: self.state.clone(),
        }
    }
}

impl Drop for FrameReceiver {
    fn drop(&mut self) {
        self.state.closed.store(true, Ordering::Release);
    }
}

/// Exclusive ownership of the in-flight frame. Dropping it reopens the slot.
pub struct FrameLease {
    frame: Frame,
    state: Arc<SlotState>,
}

impl Deref for FrameLease {
    type Target = Frame;

    fn deref(&self) -> &Frame {
        &self.frame
    }
}

impl Drop for FrameLease {
    fn drop(&mut self) {
        self.state.in_flight.store(false, Ordering::Release);
    }
}
