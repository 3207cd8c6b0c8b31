use std::time::{Duration, Instant};

/// Wall-clock delta source for driving a simulation in real time.
///
/// Deltas are clamped to `max_delta` so a stalled process (debugger, sleep)
/// does not hand the simulation one enormous step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    max_delta: Duration,
}

impl FrameClock {
    pub fn new(max_delta: Duration) -> Self {
        Self {
            last: Instant::now(),
            max_delta,
        }
    }

    /// Seconds since the previous call (or construction), clamped.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        elapsed.min(self.max_delta).as_secs_f32()
    }

    pub fn max_delta(&self) -> Duration {
        self.max_delta
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_is_clamped() {
        let mut clock = FrameClock::new(Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(20));
        let dt = clock.tick();
        assert!(dt <= 0.005 + f32::EPSILON, "dt {dt} exceeds clamp");
    }

    #[test]
    fn tick_is_non_negative() {
        let mut clock = FrameClock::default();
        assert!(clock.tick() >= 0.0);
        assert!(clock.tick() >= 0.0);
    }
}
