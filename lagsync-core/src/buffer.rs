//! Signal Buffer: a fixed-capacity sample buffer shared between exactly one
//! producer thread and the controller (§3 of the data model).

use std::sync::{Arc, Mutex};

struct Inner {
    samples: Vec<f64>,
    capacity: usize,
    intervals: Vec<usize>,
    next_interval_idx: usize,
}

/// A cheap-to-clone handle to a growing, fixed-capacity `f64` sample buffer.
///
/// Exactly one producer thread holds exclusive write access for the
/// duration of a run; the controller only reads through the lock, or after
/// the producer has been joined.
#[derive(Clone)]
pub struct SignalBuffer {
    inner: Arc<Mutex<Inner>>,
}

impl SignalBuffer {
    /// `intervals` are ascending checkpoint lengths; the last must equal `capacity`.
    pub fn new(capacity: usize, intervals: Vec<usize>) -> Self {
        SignalBuffer {
            inner: Arc::new(Mutex::new(Inner {
                samples: Vec::with_capacity(capacity),
                capacity,
                intervals,
                next_interval_idx: 0,
            })),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().expect("signal buffer lock poisoned").capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("signal buffer lock poisoned").samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining(&self) -> usize {
        let inner = self.inner.lock().expect("signal buffer lock poisoned");
        inner.capacity - inner.samples.len()
    }

    pub fn reached_len(&self, target: usize) -> bool {
        let inner = self.inner.lock().expect("signal buffer lock poisoned");
        inner.samples.len() >= target
    }

    /// Append `chunk`, clamped to remaining capacity. Returns `true` if an
    /// interval checkpoint was crossed.
    pub fn append(&self, chunk: &[f64]) -> bool {
        let mut inner = self.inner.lock().expect("signal buffer lock poisoned");
        let remaining = inner.capacity - inner.samples.len();
        let take = chunk.len().min(remaining);
        inner.samples.extend_from_slice(&chunk[..take]);

        let len = inner.samples.len();
        if inner.next_interval_idx < inner.intervals.len() && len >= inner.intervals[inner.next_interval_idx] {
            inner.next_interval_idx += 1;
            true
        } else {
            false
        }
    }

    /// Zero-fill any unfilled tail up to capacity, per the "producer exits
    /// early" boundary behavior.
    pub fn zero_fill_tail(&self) {
        let mut inner = self.inner.lock().expect("signal buffer lock poisoned");
        let capacity = inner.capacity;
        inner.samples.resize(capacity, 0.0);
    }

    /// Snapshot the first `n` samples. Panics if fewer than `n` samples are present.
    pub fn prefix(&self, n: usize) -> Vec<f64> {
        let inner = self.inner.lock().expect("signal buffer lock poisoned");
        inner.samples[..n].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_clamps_to_capacity() {
        let buf = SignalBuffer::new(4, vec![3, 4]);
        assert!(!buf.append(&[1.0, 2.0]));
        assert!(buf.append(&[3.0, 4.0, 5.0]));
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn zero_fill_tail_reaches_capacity() {
        let buf = SignalBuffer::new(5, vec![5]);
        buf.append(&[1.0, 2.0]);
        buf.zero_fill_tail();
        assert_eq!(buf.len(), 5);
        assert_eq!(buf.prefix(5), vec![1.0, 2.0, 0.0, 0.0, 0.0]);
    }
}
