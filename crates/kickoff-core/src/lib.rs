pub mod fsm;
pub mod geometry;
pub mod messaging;
pub mod regulator;
pub mod simulation;
pub mod steering;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::simulation::Simulation;

    /// Run N ticks of `dt` seconds, returning all accumulated events.
    pub fn run_ticks<S: Simulation>(sim: &mut S, n: usize, dt: f32) -> Vec<S::Event> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(sim.update(dt));
        }
        all_events
    }

    /// Encoded snapshot, failing the test if encoding fails.
    pub fn encoded<S: Simulation>(sim: &S) -> Vec<u8> {
        sim.serialize_snapshot()
            .expect("snapshot serialization must succeed")
    }

    // ================================================================
    // Simulation Contract Tests
    // ================================================================
    // Every Simulation implementation must pass these. Simulation crates
    // call them from their own tests with a freshly built instance.

    /// update() with dt>0 must advance the clock and change the snapshot.
    pub fn contract_update_advances_clock<S: Simulation>(sim: &mut S) {
        let before = encoded(sim);
        let elapsed = sim.elapsed();
        sim.update(1.0 / 60.0);
        assert!(
            sim.elapsed() > elapsed,
            "update(dt>0) must advance the simulation clock"
        );
        assert_ne!(before, encoded(sim), "update(dt>0) must change the snapshot");
    }

    /// pause() must freeze the world, resume() must unfreeze it.
    pub fn contract_pause_stops_updates<S: Simulation>(sim: &mut S) {
        sim.pause();
        assert!(sim.is_paused());
        let before = encoded(sim);
        let events = sim.update(1.0 / 60.0);
        assert!(events.is_empty(), "no events may be emitted while paused");
        assert_eq!(before, encoded(sim), "state must not change while paused");

        sim.resume();
        assert!(!sim.is_paused());
        sim.update(1.0 / 60.0);
        assert_ne!(before, encoded(sim), "state must change after resume");
    }

    /// The snapshot must encode to non-empty bytes.
    pub fn contract_snapshot_serializes<S: Simulation>(sim: &S) {
        assert!(!encoded(sim).is_empty(), "snapshot must encode to bytes");
    }

    /// Two simulations built the same way must stay identical tick for tick.
    pub fn contract_same_seed_is_deterministic<S: Simulation>(
        build: impl Fn() -> S,
        ticks: usize,
        dt: f32,
    ) {
        let mut a = build();
        let mut b = build();
        for tick in 0..ticks {
            a.update(dt);
            b.update(dt);
            assert_eq!(
                encoded(&a),
                encoded(&b),
                "simulations diverged at tick {tick}"
            );
        }
    }
}
