use super::{
    input_arbiter::{ControlMode, DemoStage, InputArbiter},
    signal::{ControlCommand, Notice, TouchdownReport},
};
use crate::flight_control::{
    AutoPilot, CommandOutcome, MissionPhase, MissionSnapshot, MissionStateMachine,
};
use crate::{demo, error, event, info};
use tokio::time::Instant;

/// The single owner of everything a tick mutates.
///
/// Timers, the clock loop and the input layer all go through this object, so
/// the mission invariants are enforced in one place and every call runs to
/// completion before the next one starts.
#[derive(Debug)]
pub struct SimulationContext {
    mission: MissionStateMachine,
    arbiter: InputArbiter,
    notices: Vec<Notice>,
}

impl SimulationContext {
    pub fn new(arbiter: InputArbiter) -> Self {
        Self {
            mission: MissionStateMachine::new(),
            arbiter,
            notices: vec![Notice::Welcome],
        }
    }

    /// Context around a mission already in flight.
    #[cfg(test)]
    pub(crate) fn with_mission(mission: MissionStateMachine, arbiter: InputArbiter) -> Self {
        Self { mission, arbiter, notices: Vec::new() }
    }

    /// Context for a freshly started process.
    pub fn at_boot(now: Instant) -> Self { Self::new(InputArbiter::at_boot(now)) }

    #[cfg(test)]
    pub fn mission(&self) -> &MissionStateMachine { &self.mission }
    #[cfg(test)]
    pub fn arbiter(&self) -> &InputArbiter { &self.arbiter }
    pub fn snapshot(&self) -> MissionSnapshot { self.mission.snapshot() }

    /// Presenter messages accumulated since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> { std::mem::take(&mut self.notices) }

    /// Earliest pending timer of the mission or the arbiter.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.mission.next_deadline(), self.arbiter.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Dispatches a command from the human interface layer.
    pub fn handle_command(&mut self, command: ControlCommand, now: Instant) -> CommandOutcome {
        let outcome = match command {
            ControlCommand::Thrust => self.request_thrust(now),
            ControlCommand::Start => self.request_start(now),
            ControlCommand::Instructions => {
                self.human_input(now);
                self.notices.push(Notice::Instructions);
                CommandOutcome::Applied
            }
            ControlCommand::Other => self.request_other(now),
        };
        if let CommandOutcome::Ignored(reason) = outcome {
            event!("{command} ignored: {reason}.");
        }
        outcome
    }

    /// Operator thrust. Takes control from the autopilot before firing.
    pub fn request_thrust(&mut self, now: Instant) -> CommandOutcome {
        self.human_input(now);
        self.mission.command_thrust(now)
    }

    /// Operator launch. A finished mission is reset first so it can be retried.
    pub fn request_start(&mut self, now: Instant) -> CommandOutcome {
        self.human_input(now);
        if self.mission.phase().is_terminal() {
            self.mission.reset();
        }
        let outcome = self.mission.start(now);
        if outcome.is_applied() {
            self.notices.push(Notice::MissionStarted { auto_pilot: false });
        }
        outcome
    }

    /// Any other key. Only counts as operator activity.
    pub fn request_other(&mut self, now: Instant) -> CommandOutcome {
        self.human_input(now);
        CommandOutcome::Applied
    }

    /// One simulation tick: arbitration, autopilot, physics and touchdown.
    pub fn on_sim_tick(&mut self, now: Instant) -> MissionSnapshot {
        self.poll_timers(now);

        if self.arbiter.check_idle(now, self.mission.phase()) {
            self.mission.engage_autopilot();
            self.notices.push(Notice::DemoBanner);
            let idle = now.saturating_duration_since(self.arbiter.last_human_input_at());
            demo!("No operator input for {:.1}s, starting demonstration.", idle.as_secs_f64());
        }

        if self.arbiter.mode() == ControlMode::AutoPilotControl && self.mission.is_auto_pilot() {
            let ap_tick = self.mission.advance_autopilot_tick();
            if self.mission.phase() == MissionPhase::Running {
                self.fly_autopilot(now, ap_tick);
            }
        }

        let was_running = self.mission.phase() == MissionPhase::Running;
        let snapshot = self.mission.tick(now);
        if cfg!(debug_assertions) {
            for violation in self.mission.check_invariants() {
                error!("Mission invariant broken: {violation}.");
            }
        }
        if was_running && snapshot.phase.is_terminal() {
            self.report_touchdown(now, &snapshot);
            if self.arbiter.on_mission_end(now) {
                demo!("Demonstration over, restarting in {}s.", InputArbiter::RESTART_DELAY.as_secs());
            }
        }
        snapshot
    }

    /// Fires every timer that has come due: pulse end and demo steps.
    pub fn poll_timers(&mut self, now: Instant) {
        self.mission.expire_pulse(now);
        while let Some(stage) = self.arbiter.take_due_stage(now) {
            event!("Demo step {stage} due.");
            match stage {
                DemoStage::LaunchAfterBanner => {
                    self.mission.reset();
                    self.launch_demo(now);
                }
                DemoStage::ResetAfterTouchdown => {
                    self.mission.reset();
                    self.mission.engage_autopilot();
                    self.notices.push(Notice::DemoBanner);
                }
                DemoStage::LaunchAfterReset => self.launch_demo(now),
            }
        }
    }

    /// Launches the demo mission with a fresh autopilot tick count.
    fn launch_demo(&mut self, now: Instant) {
        self.mission.engage_autopilot();
        if self.mission.start(now).is_applied() {
            demo!("Autopilot is flying the descent.");
            self.notices.push(Notice::MissionStarted { auto_pilot: true });
        }
    }

    fn fly_autopilot(&mut self, now: Instant, ap_tick: u64) {
        let telemetry = self.mission.snapshot();
        for reason in AutoPilot::decide(&telemetry, ap_tick).pulses() {
            let outcome = self.mission.command_thrust(now);
            event!(
                "Autopilot {reason} pulse at {:.1} m, {:.2} m/s: {outcome:?}.",
                telemetry.altitude,
                telemetry.velocity
            );
        }
    }

    fn human_input(&mut self, now: Instant) {
        let pending = self.arbiter.pending_stage();
        if self.arbiter.on_human_input(now) {
            if let Some(stage) = pending {
                event!("Demo step {stage} cancelled.");
            }
            self.mission.disengage_autopilot();
            self.notices.push(Notice::HumanTakeover);
            info!("Operator took over from the autopilot.");
        }
    }

    fn report_touchdown(&mut self, now: Instant, snapshot: &MissionSnapshot) {
        let flight_time_ms = self
            .mission
            .flight_time(now)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        if snapshot.is_auto_pilot {
            demo!("Autopilot flew {} ticks.", self.mission.auto_pilot_tick());
        }
        self.notices.push(Notice::Touchdown(TouchdownReport {
            phase: snapshot.phase,
            speed: snapshot.velocity.abs(),
            fuel: snapshot.fuel,
            flight_time_ms,
            auto_pilot: snapshot.is_auto_pilot,
            launched_at: self.mission.started_at_utc(),
        }));
    }
}
