use crate::analysis::FaceAnalysis;
use std::time::{Duration, Instant};

pub const DEFAULT_ANALYSIS_INTERVAL: Duration = Duration::from_millis(800);

/// Debounce for analysis calls.
///
/// Every attempt counts, successful or not, so a failing analyzer is
/// called at most once per interval as well.
#[derive(Clone, Debug)]
pub struct AnalysisThrottle {
    interval: Duration,
    last_attempt: Option<Instant>,
}

impl AnalysisThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_attempt: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn should_analyze(&self, now: Instant) -> bool {
        match self.last_attempt {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.interval,
        }
    }

    pub fn record_attempt(&mut self, now: Instant) {
        self.last_attempt = Some(now);
    }
}

impl Default for AnalysisThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_ANALYSIS_INTERVAL)
    }
}

/// Holds the last successful analysis until it is replaced or cleared.
#[derive(Clone, Debug, Default)]
pub struct ResultCache {
    faces: Option<Vec<FaceAnalysis>>,
}

impl ResultCache {
    pub fn store(&mut self, faces: Vec<FaceAnalysis>) {
        self.faces = Some(faces);
    }

    pub fn clear(&mut self) {
        self.faces = None;
    }

    pub fn primary(&self) -> Option<&FaceAnalysis> {
        self.faces.as_deref().and_then(FaceAnalysis::primary)
    }

    pub fn is_empty(&self) -> bool {
        self.primary().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_first_call_always_allowed() {
        let throttle = AnalysisThrottle::default();
        assert!(throttle.should_analyze(Instant::now()));
    }

    #[rstest]
    #[case(0, false)]
    #[case(400, false)]
    #[case(800, false)]
    #[case(801, true)]
    #[case(5000, true)]
    fn test_interval_is_exclusive(#[case] elapsed_ms: u64, #[case] allowed: bool) {
        let start = Instant::now();
        let mut throttle = AnalysisThrottle::default();
        throttle.record_attempt(start);
        assert_eq!(
            throttle.should_analyze(start + Duration::from_millis(elapsed_ms)),
            allowed
        );
    }

    #[test]
    fn test_at_most_one_call_per_interval() {
        let start = Instant::now();
        let mut throttle = AnalysisThrottle::new(Duration::from_millis(800));
        let mut calls = 0;
        // 30 fps for three seconds
        for frame in 0..90u64 {
            let now = start + Duration::from_millis(frame * 33);
            if throttle.should_analyze(now) {
                throttle.record_attempt(now);
                calls += 1;
            }
        }
        // attempts at 0, 825, 1650, 2475 ms
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_clock_going_backwards_blocks() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut throttle = AnalysisThrottle::default();
        throttle.record_attempt(start);
        assert!(!throttle.should_analyze(start - Duration::from_millis(10)));
    }

    #[test]
    fn test_cache_store_and_clear() {
        let mut cache = ResultCache::default();
        assert!(cache.is_empty());

        cache.store(vec![FaceAnalysis {
            age: Some(40.0),
            ..Default::default()
        }]);
        assert_eq!(cache.primary().unwrap().age_label(), "40");

        cache.clear();
        assert!(cache.primary().is_none());
    }

    #[test]
    fn test_cache_with_no_faces_is_empty() {
        let mut cache = ResultCache::default();
        cache.store(Vec::new());
        assert!(cache.is_empty());
    }
}
