//! Small bounded frame queue between a landmark source and the recognizer.
//!
//! A superseded frame is worthless, so when the queue is full the oldest
//! frame is evicted to make room for the newest.

use crate::source::types::FrameSample;
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Producer side of the frame queue.
#[derive(Debug, Clone)]
pub struct FrameQueue {
    sender: Sender<FrameSample>,
    // Used only to evict the oldest sample when full.
    evictor: Receiver<FrameSample>,
    dropped: Arc<AtomicU64>,
}

impl FrameQueue {
    /// Create a queue holding at most `capacity` samples. The returned
    /// receiver is the consumer side.
    pub fn bounded(capacity: usize) -> (Self, Receiver<FrameSample>) {
        let (sender, receiver) = bounded(capacity.max(1));
        let queue = Self {
            sender,
            evictor: receiver.clone(),
            dropped: Arc::new(AtomicU64::new(0)),
        };
        (queue, receiver)
    }

    /// Enqueue without blocking, evicting the oldest sample if full.
    pub fn push(&self, sample: FrameSample) {
        let mut sample = sample;
        loop {
            match self.sender.try_send(sample) {
                Ok(()) => return,
                Err(TrySendError::Full(back)) => {
                    if self.evictor.try_recv().is_ok() {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                    }
                    sample = back;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    /// Enqueue losslessly, waiting for room while `running` stays set.
    /// Returns `false` if the wait was abandoned.
    pub fn push_blocking(&self, sample: FrameSample, running: &AtomicBool) -> bool {
        let mut sample = sample;
        loop {
            match self.sender.send_timeout(sample, Duration::from_millis(50)) {
                Ok(()) => return true,
                Err(SendTimeoutError::Timeout(back)) => {
                    if !running.load(Ordering::SeqCst) {
                        return false;
                    }
                    sample = back;
                }
                Err(SendTimeoutError::Disconnected(_)) => return false,
            }
        }
    }

    /// Number of samples evicted so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn dropped_counter(&self) -> Arc<AtomicU64> {
        self.dropped.clone()
    }
}
