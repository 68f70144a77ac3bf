//! Simulated time
//!
//! Time is an integer tick count. The registry never advances it; callers
//! pass the current tick to every dump.

/// Simulated time instant.
pub type Tick = u64;

/// Default tick frequency (1 tick = 1 ps).
pub const DEFAULT_FREQUENCY: u64 = 1_000_000_000_000;

/// Simulation time tracker
#[derive(Debug, Clone)]
pub struct SimClock {
    tick: Tick,
    frequency: u64,
}

impl SimClock {
    /// Create a clock at tick 0 running at `frequency` ticks per second.
    pub fn new(frequency: u64) -> Self {
        assert!(frequency > 0, "tick frequency must be non-zero");
        Self { tick: 0, frequency }
    }

    pub fn now(&self) -> Tick {
        self.tick
    }

    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    pub fn advance(&mut self, delta: Tick) {
        self.tick += delta;
    }

    /// Move to `tick`. Moving backwards is ignored.
    pub fn advance_to(&mut self, tick: Tick) {
        self.tick = self.tick.max(tick);
    }

    /// Simulated seconds elapsed since tick 0.
    pub fn seconds(&self) -> f64 {
        self.tick as f64 / self.frequency as f64
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(DEFAULT_FREQUENCY)
    }
}
