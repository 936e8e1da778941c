//! Collision telemetry
//!
//! Records per-frame timing and collision counts for diagnostics. Purely
//! observational: nothing here feeds back into detection or resolution.

use crate::foundation::time::Stopwatch;

/// Per-frame and cumulative collision statistics
#[derive(Default)]
pub struct CollisionStats {
    total_collisions: u64,
    active_collisions: usize,
    broad_phase_candidates: usize,
    last_frame_millis: f32,
    avg_frame_millis: f32,
    frames_processed: u64,
    stopwatch: Stopwatch,
}

impl CollisionStats {
    /// Create zeroed statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin timing a frame
    pub fn start_frame(&mut self) {
        self.stopwatch.restart();
    }

    /// Finish timing a frame and fold it into the running average
    pub fn end_frame(&mut self) {
        self.stopwatch.stop();
        self.last_frame_millis = self.stopwatch.elapsed_millis();
        let frames = self.frames_processed as f32;
        self.avg_frame_millis =
            (self.avg_frame_millis * frames + self.last_frame_millis) / (frames + 1.0);
        self.frames_processed += 1;
    }

    /// Record one newly detected collision
    pub fn record_collision(&mut self) {
        self.total_collisions += 1;
    }

    /// Set the number of pairs currently in the active set
    pub fn set_active_collisions(&mut self, count: usize) {
        self.active_collisions = count;
    }

    /// Set the number of candidate pairs the broad phase produced
    pub fn set_broad_phase_candidates(&mut self, count: usize) {
        self.broad_phase_candidates = count;
    }

    /// Collisions detected since creation or last reset
    pub fn total_collisions(&self) -> u64 {
        self.total_collisions
    }

    /// Pairs in the active collision set after the last frame
    pub fn active_collisions(&self) -> usize {
        self.active_collisions
    }

    /// Candidate pairs emitted by the broad phase last frame
    pub fn broad_phase_candidates(&self) -> usize {
        self.broad_phase_candidates
    }

    /// Duration of the last frame in milliseconds
    pub fn last_frame_millis(&self) -> f32 {
        self.last_frame_millis
    }

    /// Running average frame duration in milliseconds
    pub fn avg_frame_millis(&self) -> f32 {
        self.avg_frame_millis
    }

    /// Frames processed since creation or last reset
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Zero all counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_counters_accumulate() {
        let mut stats = CollisionStats::new();
        stats.start_frame();
        stats.record_collision();
        stats.record_collision();
        stats.set_active_collisions(2);
        stats.end_frame();

        assert_eq!(stats.total_collisions(), 2);
        assert_eq!(stats.active_collisions(), 2);
        assert_eq!(stats.frames_processed(), 1);
        assert!(stats.last_frame_millis() >= 0.0);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let mut stats = CollisionStats::new();
        stats.start_frame();
        stats.record_collision();
        stats.end_frame();

        stats.reset();
        assert_eq!(stats.total_collisions(), 0);
        assert_eq!(stats.frames_processed(), 0);
        assert_eq!(stats.avg_frame_millis(), 0.0);
    }
}
