use crate::signal::{Sample, Window};
use std::collections::VecDeque;

/// Trailing samples kept for live display when no history size is given.
pub const DEFAULT_HISTORY: usize = 1000;

/// Trailing store of the live sample stream.
///
/// The buffer is the only mutable piece of the pipeline. Readers get
/// [`Window`] snapshots copied out of it, never a reference into it.
#[derive(Debug, Clone)]
pub struct WindowBuffer {
    samples: VecDeque<Sample>,
    window_size: usize,
    capacity: usize,
}

impl WindowBuffer {
    /// Keep `max(window_size, DEFAULT_HISTORY)` trailing samples.
    pub fn new(window_size: usize) -> Self {
        Self::with_capacity(window_size, DEFAULT_HISTORY)
    }

    /// Keep up to `capacity` trailing samples (never fewer than one window).
    pub fn with_capacity(window_size: usize, capacity: usize) -> Self {
        let capacity = capacity.max(window_size);
        Self {
            samples: VecDeque::with_capacity(capacity),
            window_size,
            capacity,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_ready(&self) -> bool {
        self.samples.len() >= self.window_size
    }

    /// Append a batch as delivered; no resampling or gap checks.
    pub fn append(&mut self, batch: &[Sample]) {
        for &sample in batch {
            if self.samples.len() == self.capacity {
                self.samples.pop_front();
            }
            self.samples.push_back(sample);
        }
    }

    /// The last `window_size` samples, or `None` while the stream is too short.
    pub fn current_window(&self) -> Option<Window> {
        if !self.is_ready() {
            return None;
        }
        let skip = self.samples.len() - self.window_size;
        Some(Window::new(self.samples.iter().skip(skip).copied().collect()))
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
