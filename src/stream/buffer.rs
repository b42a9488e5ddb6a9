use std::collections::VecDeque;

use crate::stream::StreamError;
use crate::types::SamplePoint;

/// Rolling window that keeps the most recent `capacity` samples.
#[derive(Clone, Debug)]
pub struct SignalWindow {
    samples: VecDeque<SamplePoint>,
    capacity: usize,
}

impl SignalWindow {
    pub fn new(capacity: usize) -> Result<Self, StreamError> {
        if capacity == 0 {
            return Err(StreamError::ZeroCapacity);
        }
        Ok(Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Appends `sample`, returning the evicted oldest sample when the window was full.
    pub fn push(&mut self, sample: SamplePoint) -> Option<SamplePoint> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &SamplePoint> {
        self.samples.iter()
    }

    pub fn oldest(&self) -> Option<&SamplePoint> {
        self.samples.front()
    }

    pub fn newest(&self) -> Option<&SamplePoint> {
        self.samples.back()
    }

    /// Owned copy, oldest first.
    pub fn to_vec(&self) -> Vec<SamplePoint> {
        self.samples.iter().copied().collect()
    }

    /// `[x, y]` pairs in seconds / amplitude, ready for a line plot.
    pub fn plot_points(&self) -> Vec<[f64; 2]> {
        self.samples
            .iter()
            .map(|s| [s.timestamp as f64 / 1000.0, s.amplitude])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(t: u64) -> SamplePoint {
        SamplePoint {
            timestamp: t,
            amplitude: t as f64,
        }
    }

    #[test]
    fn rejects_zero_capacity() {
        assert_eq!(SignalWindow::new(0).unwrap_err(), StreamError::ZeroCapacity);
    }

    #[test]
    fn evicts_oldest_once_full() {
        let mut window = SignalWindow::new(3).unwrap();
        assert_eq!(window.push(point(0)), None);
        assert_eq!(window.push(point(1)), None);
        assert_eq!(window.push(point(2)), None);
        assert!(window.is_full());
        assert_eq!(window.push(point(3)), Some(point(0)));
        assert_eq!(window.len(), 3);
        assert_eq!(window.oldest(), Some(&point(1)));
        assert_eq!(window.newest(), Some(&point(3)));
    }

    #[test]
    fn plot_points_are_in_seconds() {
        let mut window = SignalWindow::new(2).unwrap();
        window.push(SamplePoint {
            timestamp: 1500,
            amplitude: -0.5,
        });
        assert_eq!(window.plot_points(), vec![[1.5, -0.5]]);
    }
}
