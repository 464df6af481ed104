//! Operator control state for runtime simulation management.
//!
//! This module provides shared state used by the runner and the operator
//! REST API. The operator can pause/resume, change tick speed, queue
//! commands for the simulation (scenario switch, reset, train, retrain),
//! and trigger a clean shutdown, all without stopping the process.
//!
//! # Architecture
//!
//! Control flags use [`std::sync::atomic`] types so they can be shared
//! between the runner task and the Axum handler tasks without locks on the
//! hot path. Commands that mutate the simulation are never applied by the
//! handlers themselves: they are queued here and drained by the runner,
//! which owns the simulation.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use hydroequity_types::Scenario;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

use crate::config::{MIN_TICK_INTERVAL_MS, SimulationBoundsConfig};

/// Reason why the simulation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// Reached the configured `max_real_time_seconds` limit.
    MaxRealTimeReached,
    /// An operator issued a stop command.
    OperatorStop,
}

/// A state change requested by the operator, applied by the runner before
/// the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "scenario", rename_all = "snake_case")]
pub enum OperatorCommand {
    /// Switch the active scenario.
    SetScenario(Scenario),
    /// Return to hour 0 and clear the history.
    Reset,
    /// Train the equity allocator (no-op once trained unless retraining is
    /// allowed).
    Train,
    /// Re-initialize the weights and train from scratch.
    Retrain,
}

/// Shared operator control state.
///
/// This struct is wrapped in [`Arc`](std::sync::Arc) and shared between
/// the runner and operator API handlers.
#[derive(Debug)]
pub struct OperatorState {
    /// Whether the simulation is currently paused.
    paused: AtomicBool,

    /// Wakes the runner when resumed, stopped, or handed a command.
    wake_notify: Notify,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Current tick interval in milliseconds (runtime-adjustable).
    tick_interval_ms: AtomicU64,

    /// Wall-clock time when the simulation started.
    started_at: DateTime<Utc>,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,

    /// Maximum wall-clock seconds (0 = unlimited).
    max_real_time_seconds: u64,

    /// Commands awaiting the runner, oldest first.
    commands: Mutex<VecDeque<OperatorCommand>>,

    /// Reason the simulation ended, if it has.
    end_reason: Mutex<Option<SimulationEndReason>>,
}

impl OperatorState {
    /// Create a new operator state from configuration.
    pub fn new(tick_interval_ms: u64, bounds: &SimulationBoundsConfig) -> Self {
        Self {
            paused: AtomicBool::new(false),
            wake_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            started_at: Utc::now(),
            max_ticks: bounds.max_ticks,
            max_real_time_seconds: bounds.max_real_time_seconds,
            commands: Mutex::new(VecDeque::new()),
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Check whether the simulation is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the simulation. The runner stops ticking but keeps applying
    /// queued commands.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the simulation and wake the runner.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.wake_notify.notify_one();
    }

    /// Wait while paused with nothing to do.
    ///
    /// Returns immediately if not paused, if a stop was requested, or if
    /// commands are queued. Otherwise blocks until one of those changes.
    /// Callers should re-check state after it returns.
    pub async fn wait_while_idle(&self) {
        if !self.is_paused() || self.is_stop_requested() || self.has_pending_commands().await {
            return;
        }
        self.wake_notify.notified().await;
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean simulation stop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.wake_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Record the reason the simulation ended.
    pub async fn set_end_reason(&self, reason: SimulationEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Get the reason the simulation ended, if it has.
    pub async fn end_reason(&self) -> Option<SimulationEndReason> {
        self.end_reason.lock().await.clone()
    }

    // -----------------------------------------------------------------------
    // Tick Speed
    // -----------------------------------------------------------------------

    /// Get the current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Set the tick interval in milliseconds. Must be at least 100ms.
    ///
    /// Returns the previous interval on success, or `None` if the
    /// value was rejected (below 100ms).
    pub fn set_tick_interval_ms(&self, ms: u64) -> Option<u64> {
        if ms < MIN_TICK_INTERVAL_MS {
            return None;
        }
        let prev = self.tick_interval_ms.swap(ms, Ordering::AcqRel);
        Some(prev)
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Check whether the tick limit has been reached.
    ///
    /// Returns `true` if `max_ticks > 0` and `ticks_run >= max_ticks`.
    pub const fn tick_limit_reached(&self, ticks_run: u64) -> bool {
        self.max_ticks > 0 && ticks_run >= self.max_ticks
    }

    /// Check whether the wall-clock time limit has been reached.
    pub fn time_limit_reached(&self) -> bool {
        if self.max_real_time_seconds == 0 {
            return false;
        }
        self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Return the wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Return elapsed seconds since simulation start.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        // `num_seconds` can be negative if the system clock moved back.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Get the configured max ticks.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Get the configured max real-time seconds.
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Queue a command for the runner and wake it.
    pub async fn enqueue(&self, command: OperatorCommand) {
        self.commands.lock().await.push_back(command);
        self.wake_notify.notify_one();
    }

    /// Take every queued command, oldest first.
    pub async fn drain_commands(&self) -> Vec<OperatorCommand> {
        let mut queue = self.commands.lock().await;
        queue.drain(..).collect()
    }

    /// Whether any command is waiting for the runner.
    pub async fn has_pending_commands(&self) -> bool {
        !self.commands.lock().await.is_empty()
    }

    /// Number of queued commands.
    pub async fn pending_commands(&self) -> usize {
        self.commands.lock().await.len()
    }
}

/// JSON-serializable status of the simulation for the operator API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationStatus {
    /// Tick of the latest snapshot (0 before the first tick).
    pub tick: u64,
    /// Hour of day of the latest snapshot.
    pub hour: u8,
    /// Active scenario as of the latest snapshot.
    pub scenario: Scenario,
    /// Whether the equity allocator has been trained.
    pub trained: bool,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Whether a stop has been requested.
    pub stop_requested: bool,
    /// Current tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Elapsed wall-clock seconds since start.
    pub elapsed_seconds: u64,
    /// Configured maximum ticks (0 = unlimited).
    pub max_ticks: u64,
    /// Configured maximum real-time seconds (0 = unlimited).
    pub max_real_time_seconds: u64,
    /// Commands queued but not yet applied.
    pub pending_commands: usize,
    /// The reason the simulation ended, if applicable.
    pub end_reason: Option<SimulationEndReason>,
    /// ISO 8601 timestamp of when the simulation started.
    pub started_at: String,
}
