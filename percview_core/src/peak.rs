//! Running peak of per-frame detection counts.

/// Largest buffer length seen by any frame since (re)initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeakTracker {
    /// `None` until the first frame has been counted
    peak: Option<usize>,
}

impl PeakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one frame's buffer length into the peak and returns the new peak.
    pub fn update(&mut self, count: usize) -> usize {
        let peak = self.peak.map_or(count, |p| p.max(count));
        self.peak = Some(peak);
        peak
    }

    pub fn peak(&self) -> Option<usize> {
        self.peak
    }

    pub fn reset(&mut self) {
        self.peak = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unset_before_first_frame() {
        assert_eq!(PeakTracker::new().peak(), None);
    }

    #[test]
    fn test_two_five_three() {
        let mut tracker = PeakTracker::new();
        assert_eq!(tracker.update(2), 2);
        assert_eq!(tracker.update(5), 5);
        assert_eq!(tracker.update(3), 5);
        assert_eq!(tracker.peak(), Some(5));
    }

    #[test]
    fn test_empty_frame_counts() {
        let mut tracker = PeakTracker::new();
        tracker.update(0);
        assert_eq!(tracker.peak(), Some(0));
    }

    #[test]
    fn test_reset() {
        let mut tracker = PeakTracker::new();
        tracker.update(9);
        tracker.reset();
        assert_eq!(tracker.peak(), None);
    }

    proptest! {
        #[test]
        fn prop_monotone_and_equal_to_running_max(
            counts in prop::collection::vec(0usize..1000, 1..64)
        ) {
            let mut tracker = PeakTracker::new();
            let mut previous = 0;
            for (i, &count) in counts.iter().enumerate() {
                let peak = tracker.update(count);
                prop_assert!(peak >= previous);
                prop_assert_eq!(peak, *counts[..=i].iter().max().unwrap());
                previous = peak;
            }
        }
    }
}
