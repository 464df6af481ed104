//! Simulation clock.
//!
//! The tick counter is the only stored temporal state. The hour of day is
//! always derived from it (`tick % 24`), never stored independently, and
//! all arithmetic on the counter is checked.

/// Number of ticks (hours) in one simulated day.
pub const HOURS_PER_DAY: u64 = 24;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Tick counter with hour-of-day derivation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationClock {
    /// Number of ticks completed since start or the last reset.
    tick: u64,
}

impl SimulationClock {
    /// Create a clock at tick 0 (hour 0).
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// Create a clock at an explicit tick (useful for testing and state
    /// restoration).
    pub const fn from_tick(tick: u64) -> Self {
        Self { tick }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the clock to tick 0.
    pub const fn reset(&mut self) {
        self.tick = 0;
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Hour of day, `0..=23`.
    pub fn hour(&self) -> u8 {
        let hour = self.tick.checked_rem(HOURS_PER_DAY).unwrap_or(0);
        // Always below 24.
        u8::try_from(hour).unwrap_or(0)
    }

    /// Number of completed days.
    pub fn day(&self) -> u64 {
        self.tick.checked_div(HOURS_PER_DAY).unwrap_or(0)
    }
}
