use serde::{Deserialize, Serialize};

/// Core trait implemented by every Kickoff simulation.
///
/// The host owns the clock and calls [`Simulation::update`] once per frame;
/// renderers and debug tools only ever read [`Simulation::snapshot`].
pub trait Simulation {
    /// Read-only view handed to renderers once per tick.
    type Snapshot: Serialize;
    /// Notable things that happened during one update.
    type Event;

    fn metadata(&self) -> SimulationMetadata;

    /// Advance the whole world by `dt` seconds. Does nothing while paused.
    fn update(&mut self, dt: f32) -> Vec<Self::Event>;

    fn snapshot(&self) -> Self::Snapshot;

    /// MessagePack encoding of the current snapshot.
    fn serialize_snapshot(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec_named(&self.snapshot())
    }

    /// Preferred fixed step rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// Simulated seconds since the start.
    fn elapsed(&self) -> f64;

    fn pause(&mut self);

    fn resume(&mut self);

    fn is_paused(&self) -> bool;
}

/// Descriptive data about a simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationMetadata {
    pub name: String,
    pub description: String,
    /// Number of agents driven by state machines.
    pub agent_count: usize,
}

/// Generates `pause`, `resume` and `is_paused` for a struct with a
/// `paused: bool` field.
#[macro_export]
macro_rules! simulation_pause_boilerplate {
    () => {
        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn is_paused(&self) -> bool {
            self.paused
        }
    };
}
