//! Smoothing and bounded history used by the recognizer.

use std::collections::VecDeque;

/// Exponential smoothing of a 2D position.
///
/// The first sample after a reset is taken as-is, so a new gesture starts
/// exactly where the hand is.
#[derive(Debug, Clone)]
pub struct ExponentialSmoother {
    factor: f64,
    value: Option<(f64, f64)>,
}

impl ExponentialSmoother {
    /// `factor` is the weight of the new sample, in (0, 1].
    pub fn new(factor: f64) -> Self {
        Self {
            factor,
            value: None,
        }
    }

    pub fn update(&mut self, (x, y): (f64, f64)) -> (f64, f64) {
        let next = match self.value {
            Some((px, py)) => (px + self.factor * (x - px), py + self.factor * (y - py)),
            None => (x, y),
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<(f64, f64)> {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

/// Fixed-capacity FIFO; pushing into a full buffer evicts the oldest item.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.items.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

/// Recent per-tick wrist movements.
pub type MotionHistory = RingBuffer<(f64, f64)>;

impl RingBuffer<(f64, f64)> {
    /// Component-wise mean, or `None` when empty.
    pub fn mean(&self) -> Option<(f64, f64)> {
        if self.items.is_empty() {
            return None;
        }
        let n = self.items.len() as f64;
        let (sx, sy) = self
            .items
            .iter()
            .fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
        Some((sx / n, sy / n))
    }
}
