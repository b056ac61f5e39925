use super::{common::pinned_dt::ScheduledSlot, mission_phase::MissionPhase, physics};
use crate::{error, event, info};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use strum_macros::Display;
use tokio::time::Instant;

/// Altitude a fresh mission starts from, in meters.
pub const INITIAL_ALTITUDE: f64 = 1000.0;
/// Fuel of a fresh mission, in percent.
pub const INITIAL_FUEL: f64 = 100.0;
/// Gravity in m/s². Half the real lunar value to keep the descent playable.
pub const GRAVITY: f64 = 0.8;
/// Upward acceleration while a thrust pulse is active, in m/s².
pub const THRUST_ACCEL: f64 = 2.5;
/// Fuel bought by one thrust pulse, in percent.
pub const FUEL_PER_PULSE: f64 = 0.8;
/// Real-time length of one thrust pulse.
pub const PULSE_DURATION: Duration = Duration::from_millis(300);
/// Highest touchdown speed that still counts as a landing, in m/s.
pub const LANDING_SPEED_LIMIT: f64 = 5.0;

/// Read-only copy of the mission state handed to presenters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MissionSnapshot {
    pub altitude: f64,
    pub velocity: f64,
    pub fuel: f64,
    pub thrust_active: bool,
    pub phase: MissionPhase,
    pub is_auto_pilot: bool,
}

/// Why a control operation was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum IgnoreReason {
    #[strum(to_string = "mission is not running")]
    NotRunning,
    #[strum(to_string = "mission is not idle")]
    NotIdle,
    #[strum(to_string = "fuel tank is empty")]
    OutOfFuel,
}

/// Result of a control operation. Precondition failures are no-ops, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    Ignored(IgnoreReason),
}

impl CommandOutcome {
    pub fn is_applied(self) -> bool { matches!(self, CommandOutcome::Applied) }
}

/// Broken state invariant, reported by [`MissionStateMachine::check_invariants`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InvariantViolation {
    FuelOutOfRange,
    NegativeAltitude,
    ThrustOutsideRunning,
    NonFiniteTelemetry,
}

/// Outcome of reaching the surface at `velocity`. Exactly the limit still lands.
pub fn classify_touchdown(velocity: f64) -> MissionPhase {
    if velocity.abs() <= LANDING_SPEED_LIMIT { MissionPhase::Landed } else { MissionPhase::Crashed }
}

/// Owner of the mission state. All mutation goes through its methods.
#[derive(Debug)]
pub struct MissionStateMachine {
    altitude: f64,
    velocity: f64,
    fuel: f64,
    gravity: f64,
    thrust_active: bool,
    phase: MissionPhase,
    is_auto_pilot: bool,
    auto_pilot_tick: u64,
    started_at: Option<Instant>,
    started_at_utc: Option<DateTime<Utc>>,
    landed_at: Option<Instant>,
    pulse_end: ScheduledSlot<()>,
}

impl Default for MissionStateMachine {
    fn default() -> Self { Self::new() }
}

impl MissionStateMachine {
    /// Creates an idle mission with full fuel.
    pub fn new() -> Self {
        Self {
            altitude: INITIAL_ALTITUDE,
            velocity: 0.0,
            fuel: INITIAL_FUEL,
            gravity: GRAVITY,
            thrust_active: false,
            phase: MissionPhase::Idle,
            is_auto_pilot: false,
            auto_pilot_tick: 0,
            started_at: None,
            started_at_utc: None,
            landed_at: None,
            pulse_end: ScheduledSlot::default(),
        }
    }

    /// Replaces the whole mission with a fresh idle one.
    ///
    /// A pending pulse end is dropped together with the old state.
    pub fn reset(&mut self) {
        *self = Self::new();
        event!("Mission reset.");
    }

    /// Launches an idle mission.
    pub fn start(&mut self, now: Instant) -> CommandOutcome {
        if self.phase != MissionPhase::Idle || !self.enter_phase(MissionPhase::Running) {
            return CommandOutcome::Ignored(IgnoreReason::NotIdle);
        }
        self.started_at = Some(now);
        self.started_at_utc = Some(Utc::now());
        info!("Mission started from {:.0} m with {:.0}% fuel.", self.altitude, self.fuel);
        CommandOutcome::Applied
    }

    /// Buys one thrust pulse.
    ///
    /// Every accepted call costs [`FUEL_PER_PULSE`] and (re-)arms the single
    /// pulse end to `now + PULSE_DURATION`.
    pub fn command_thrust(&mut self, now: Instant) -> CommandOutcome {
        if self.phase != MissionPhase::Running {
            return CommandOutcome::Ignored(IgnoreReason::NotRunning);
        }
        if self.fuel <= 0.0 {
            return CommandOutcome::Ignored(IgnoreReason::OutOfFuel);
        }
        if let Some(left) = self.pulse_end.time_left(now) {
            event!("Re-arming thrust pulse with {}ms left.", left.as_millis());
        }
        self.thrust_active = true;
        self.fuel = (self.fuel - FUEL_PER_PULSE).max(0.0);
        self.pulse_end.arm(now, PULSE_DURATION, ());
        event!("Thrust pulse armed, {:.1}% fuel left.", self.fuel);
        CommandOutcome::Applied
    }

    /// Ends the thrust pulse once its deadline has passed. Returns `true` if a
    /// pulse ended.
    pub fn expire_pulse(&mut self, now: Instant) -> bool {
        if self.pulse_end.take_due(now).is_none() {
            return false;
        }
        if self.phase == MissionPhase::Running {
            self.thrust_active = false;
            event!("Thrust pulse ended.");
        }
        true
    }

    /// Advances a running mission by one fixed step and classifies touchdown.
    pub fn tick(&mut self, now: Instant) -> MissionSnapshot {
        if self.phase != MissionPhase::Running {
            return self.snapshot();
        }
        self.expire_pulse(now);
        let thrust_accel = if self.thrust_active { THRUST_ACCEL } else { 0.0 };
        let (velocity, altitude) =
            physics::integrate(self.gravity, thrust_accel, self.velocity, self.altitude, physics::DT);
        self.velocity = velocity;
        self.altitude = altitude.max(0.0);

        if self.altitude <= 0.0 && self.enter_phase(classify_touchdown(self.velocity)) {
            self.thrust_active = false;
            self.pulse_end.cancel();
            self.landed_at = Some(now);
            info!("Touchdown at {:.1} m/s: {}.", self.velocity.abs(), self.phase);
        }
        self.snapshot()
    }

    /// Moves to `next` if the phase graph allows it.
    fn enter_phase(&mut self, next: MissionPhase) -> bool {
        if !self.phase.can_transition_to(next) {
            error!("Refusing phase change {} -> {next}.", self.phase);
            return false;
        }
        self.phase = next;
        true
    }

    /// Marks the autopilot as the control source and restarts its tick counter.
    pub fn engage_autopilot(&mut self) {
        self.is_auto_pilot = true;
        self.auto_pilot_tick = 0;
    }

    pub fn disengage_autopilot(&mut self) { self.is_auto_pilot = false; }

    /// Counts one more tick under autopilot control and returns the new count.
    pub fn advance_autopilot_tick(&mut self) -> u64 {
        self.auto_pilot_tick += 1;
        self.auto_pilot_tick
    }

    pub fn snapshot(&self) -> MissionSnapshot {
        MissionSnapshot {
            altitude: self.altitude,
            velocity: self.velocity,
            fuel: self.fuel,
            thrust_active: self.thrust_active,
            phase: self.phase,
            is_auto_pilot: self.is_auto_pilot,
        }
    }

    pub fn phase(&self) -> MissionPhase { self.phase }
    #[cfg(test)]
    pub fn fuel(&self) -> f64 { self.fuel }
    pub fn is_auto_pilot(&self) -> bool { self.is_auto_pilot }
    pub fn auto_pilot_tick(&self) -> u64 { self.auto_pilot_tick }
    pub fn started_at_utc(&self) -> Option<DateTime<Utc>> { self.started_at_utc }

    /// Pending pulse end, if a pulse is armed.
    pub fn next_deadline(&self) -> Option<Instant> { self.pulse_end.deadline() }

    /// Real time between launch and touchdown, or up to `now` while running.
    pub fn flight_time(&self, now: Instant) -> Option<Duration> {
        let start = self.started_at?;
        Some(self.landed_at.unwrap_or(now).saturating_duration_since(start))
    }

    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        if !(0.0..=INITIAL_FUEL).contains(&self.fuel) {
            violations.push(InvariantViolation::FuelOutOfRange);
        }
        if self.altitude < 0.0 {
            violations.push(InvariantViolation::NegativeAltitude);
        }
        if self.thrust_active && self.phase != MissionPhase::Running {
            violations.push(InvariantViolation::ThrustOutsideRunning);
        }
        if !(self.altitude.is_finite() && self.velocity.is_finite()) {
            violations.push(InvariantViolation::NonFiniteTelemetry);
        }
        violations
    }

    /// Running mission at an arbitrary point of the descent.
    #[cfg(test)]
    pub(crate) fn running_at(altitude: f64, velocity: f64, fuel: f64) -> Self {
        Self {
            altitude,
            velocity,
            fuel,
            phase: MissionPhase::Running,
            ..Self::new()
        }
    }
}
