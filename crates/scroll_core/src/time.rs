//! Fixed-rate tick pacing for the outer loop.
//!
//! The simulation is coupled 1:1 to ticks (movement and animation both
//! advance once per tick), so the clock's only job is to hold ticks at the
//! target rate. It never splits or merges ticks.

use std::time::{Duration, Instant};

const FPS_SAMPLE_COUNT: usize = 60;

pub struct TickClock {
    pub tick_rate: u32,
    pub tick_duration: Duration,
    /// Lag beyond which the clock gives up catching up and resynchronises.
    pub max_lag: Duration,
    pub tick_count: u64,
    next_deadline: Instant,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
}

impl TickClock {
    /// `tick_rate` is clamped to at least 1 Hz.
    pub fn new(tick_rate: u32) -> Self {
        let tick_rate = tick_rate.max(1);
        let tick_duration = Duration::from_secs_f64(1.0 / f64::from(tick_rate));
        let now = Instant::now();
        Self {
            tick_rate,
            tick_duration,
            max_lag: Duration::from_millis(250),
            tick_count: 0,
            next_deadline: now + tick_duration,
            last_instant: now,
            fps_samples: [tick_duration.as_secs_f64(); FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: f64::from(tick_rate),
        }
    }

    /// Block until the next tick is due, then account for it.
    pub fn wait_for_next_tick(&mut self) {
        let now = Instant::now();
        if now < self.next_deadline {
            std::thread::sleep(self.next_deadline - now);
        }
        self.mark_tick(Instant::now());
    }

    /// Account for a tick without sleeping (unpaced runs and tests).
    pub fn mark_tick(&mut self, now: Instant) {
        let lag = now.saturating_duration_since(self.next_deadline);
        if lag > self.max_lag {
            log::warn!(
                "Tick {} ran {:.1}ms late, resynchronising clock",
                self.tick_count,
                lag.as_secs_f64() * 1000.0
            );
            self.next_deadline = now + self.tick_duration;
        } else {
            self.next_deadline += self.tick_duration;
        }

        let dt = now.saturating_duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.tick_count += 1;

        self.fps_samples[self.fps_sample_index] = dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_runs_at_sixty_hz() {
        let clock = TickClock::default();
        assert_eq!(clock.tick_rate, 60);
        assert!((clock.tick_duration.as_secs_f64() - 1.0 / 60.0).abs() < 1e-9);
        assert!((clock.smoothed_fps - 60.0).abs() < 1e-9);
    }

    #[test]
    fn zero_rate_is_clamped() {
        let clock = TickClock::new(0);
        assert_eq!(clock.tick_rate, 1);
        assert_eq!(clock.tick_duration, Duration::from_secs(1));
    }

    #[test]
    fn mark_tick_counts_ticks() {
        let mut clock = TickClock::new(60);
        let start = Instant::now();
        for i in 1..=5 {
            clock.mark_tick(start + clock.tick_duration * i);
        }
        assert_eq!(clock.tick_count, 5);
    }

    #[test]
    fn large_lag_resynchronises_deadline() {
        let mut clock = TickClock::new(60);
        let late = Instant::now() + Duration::from_secs(2);
        clock.mark_tick(late);
        assert_eq!(clock.next_deadline, late + clock.tick_duration);
    }

    #[test]
    fn wait_for_next_tick_sleeps_at_least_until_deadline() {
        let mut clock = TickClock::new(200);
        let start = Instant::now();
        clock.wait_for_next_tick();
        clock.wait_for_next_tick();
        assert!(start.elapsed() >= Duration::from_millis(9));
        assert_eq!(clock.tick_count, 2);
    }
}
