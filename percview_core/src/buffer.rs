//! The latest-message detection buffer.
//!
//! One writer (the subscription task) swaps in a whole new detection list;
//! any number of readers take a snapshot. A snapshot is an `Arc` to an
//! immutable slice, so a reader sees either the old message or the new one,
//! never a mix.

use percview_env::Detection;
use std::sync::{Arc, PoisonError, RwLock};

/// An immutable view of one delivered message.
#[derive(Debug, Clone)]
pub struct BufferSnapshot {
    /// Number of replacements made before this snapshot (0 = nothing received yet)
    pub generation: u64,

    pub detections: Arc<[Detection]>,
}

impl BufferSnapshot {
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.detections.iter()
    }
}

impl Default for BufferSnapshot {
    fn default() -> Self {
        Self {
            generation: 0,
            detections: Arc::from(Vec::new()),
        }
    }
}

/// Holds the most recently received detections.
#[derive(Debug, Default)]
pub struct DetectionBuffer {
    current: RwLock<BufferSnapshot>,
}

impl DetectionBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an Arc-wrapped buffer for sharing with a subscription task.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Replaces the whole buffer with `detections`.
    ///
    /// The new slice is built before the lock is taken; the critical section
    /// is a pointer swap.
    pub fn replace(&self, detections: Vec<Detection>) -> u64 {
        let detections: Arc<[Detection]> = Arc::from(detections);
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        current.generation += 1;
        current.detections = detections;
        current.generation
    }

    /// Returns the current message.
    pub fn snapshot(&self) -> BufferSnapshot {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of messages received so far.
    pub fn generation(&self) -> u64 {
        self.current.read().unwrap_or_else(PoisonError::into_inner).generation
    }

    pub fn len(&self) -> usize {
        self.current.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use percview_env::GeoPosition;
    use std::thread;

    fn tagged(tag: &str, count: usize) -> Vec<Detection> {
        (0..count)
            .map(|i| {
                Detection::new(tag, GeoPosition::default(), 0.0, Vector3::repeat(1.0))
                    .with_id(i as u32)
            })
            .collect()
    }

    #[test]
    fn test_starts_empty() {
        let buffer = DetectionBuffer::new();
        let snapshot = buffer.snapshot();

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.generation, 0);
    }

    #[test]
    fn test_replace_is_wholesale() {
        let buffer = DetectionBuffer::new();
        buffer.replace(tagged("Car", 5));
        buffer.replace(tagged("Pedestrian", 2));

        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|d| d.label == "Pedestrian"));
        assert_eq!(snapshot.generation, 2);
    }

    #[test]
    fn test_snapshot_survives_replacement() {
        let buffer = DetectionBuffer::new();
        buffer.replace(tagged("Car", 3));
        let old = buffer.snapshot();

        buffer.replace(Vec::new());

        assert_eq!(old.len(), 3);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_preserves_arrival_order() {
        let buffer = DetectionBuffer::new();
        buffer.replace(tagged("Car", 4));

        let ids: Vec<_> = buffer.snapshot().iter().filter_map(|d| d.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_concurrent_readers_never_see_mixed_messages() {
        let buffer = DetectionBuffer::shared();

        let writer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                for round in 0..500 {
                    let tag = if round % 2 == 0 { "Car" } else { "Bicycle" };
                    buffer.replace(tagged(tag, 1 + round % 7));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let buffer = Arc::clone(&buffer);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let snapshot = buffer.snapshot();
                        if let Some(first) = snapshot.iter().next() {
                            assert!(snapshot.iter().all(|d| d.label == first.label));
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(buffer.generation(), 500);
    }
}
