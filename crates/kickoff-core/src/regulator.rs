use serde::{Deserialize, Serialize};

/// Rate limiter answering "is it time to run again?" against the simulation
/// clock.
///
/// A positive frequency gives a period of `1 / frequency` seconds, zero means
/// always ready, and a negative frequency means never ready. The first query
/// after construction is ready for any non-negative frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Regulator {
    frequency: f32,
    next_ready_at: Option<f64>,
}

impl Regulator {
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency,
            next_ready_at: None,
        }
    }

    /// Returns `true` and arms the next period when `now` has reached it.
    pub fn ready(&mut self, now: f64) -> bool {
        if self.frequency == 0.0 {
            return true;
        }
        if self.frequency < 0.0 {
            return false;
        }
        match self.next_ready_at {
            Some(at) if now < at => false,
            _ => {
                self.next_ready_at = Some(now + 1.0 / f64::from(self.frequency));
                true
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_frequency_limits_rate() {
        let mut regulator = Regulator::new(2.0);
        assert!(regulator.ready(0.0));
        assert!(!regulator.ready(0.25));
        assert!(!regulator.ready(0.49));
        assert!(regulator.ready(0.5));
        assert!(!regulator.ready(0.6));
    }

    #[test]
    fn zero_frequency_is_always_ready() {
        let mut regulator = Regulator::new(0.0);
        for step in 0..10 {
            assert!(regulator.ready(f64::from(step) * 0.001));
        }
    }

    #[test]
    fn negative_frequency_is_never_ready() {
        let mut regulator = Regulator::new(-1.0);
        assert!(!regulator.ready(0.0));
        assert!(!regulator.ready(100.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn never_ready_twice_within_one_period(
                frequency in 0.1f32..60.0,
                start in 0.0f64..100.0,
                fraction in 0.0f64..0.99,
            ) {
                let mut regulator = Regulator::new(frequency);
                prop_assert!(regulator.ready(start));
                let period = 1.0 / f64::from(frequency);
                prop_assert!(!regulator.ready(start + period * fraction));
            }
        }
    }
}
