use std::time::{Duration, Instant};

/// Frame and tick rates averaged over one reporting interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopStats {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    pub slowest_frame_ms: f32,
}

#[derive(Debug)]
pub(crate) struct LoopStatsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    frame_time_sum: Duration,
    slowest_frame: Duration,
}

impl LoopStatsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self::starting_at(Instant::now(), interval)
    }

    fn starting_at(interval_start: Instant, interval: Duration) -> Self {
        Self {
            interval_start,
            interval,
            frames: 0,
            ticks: 0,
            frame_time_sum: Duration::ZERO,
            slowest_frame: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
        self.slowest_frame = self.slowest_frame.max(frame_dt);
    }

    pub(crate) fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    /// Returns the stats for the finished interval once it has elapsed and
    /// starts a new one.
    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopStats> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            (self.frame_time_sum.as_secs_f32() / self.frames as f32) * 1000.0
        };

        let stats = LoopStats {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
            slowest_frame_ms: self.slowest_frame.as_secs_f32() * 1000.0,
        };

        *self = Self::starting_at(now, self.interval);
        Some(stats)
    }
}
