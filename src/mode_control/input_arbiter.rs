use crate::flight_control::{MissionPhase, common::pinned_dt::ScheduledSlot};
use std::time::Duration;
use strum_macros::Display;
use tokio::time::Instant;

/// Who is flying the craft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ControlMode {
    HumanControl,
    AutoPilotControl,
}

/// Next step of the self-repeating demonstration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DemoStage {
    /// Banner has been shown, reset the mission and launch it.
    LaunchAfterBanner,
    /// Demo mission is over, reset it and show the banner again.
    ResetAfterTouchdown,
    /// Mission has been reset, launch it.
    LaunchAfterReset,
}

/// Arbitrates between the human operator and the autopilot.
///
/// The arbiter owns the single pending demo step. Any human event cancels it,
/// so a stale restart can never fire after the operator took over.
#[derive(Debug)]
pub struct InputArbiter {
    mode: ControlMode,
    last_human_input_at: Instant,
    demo_timer: ScheduledSlot<DemoStage>,
}

impl InputArbiter {
    /// Operator inactivity after which an idle mission is demonstrated.
    pub const IDLE_TIMEOUT: Duration = Duration::from_millis(5000);
    /// How long the demo banner is shown before the first launch.
    pub const BANNER_DELAY: Duration = Duration::from_millis(1500);
    /// Pause on the touchdown result before the demo resets.
    pub const RESTART_DELAY: Duration = Duration::from_millis(3000);
    /// Pause between demo reset and relaunch.
    pub const RELAUNCH_DELAY: Duration = Duration::from_millis(2000);
    /// Inactivity credited at process start, so the first demo begins early.
    pub const BOOT_HEAD_START: Duration = Duration::from_millis(3000);

    pub fn new(now: Instant) -> Self {
        Self {
            mode: ControlMode::HumanControl,
            last_human_input_at: now,
            demo_timer: ScheduledSlot::default(),
        }
    }

    /// Arbiter for a freshly launched process, pre-aged by [`Self::BOOT_HEAD_START`].
    pub fn at_boot(now: Instant) -> Self {
        Self::new(now.checked_sub(Self::BOOT_HEAD_START).unwrap_or(now))
    }

    pub fn mode(&self) -> ControlMode { self.mode }
    pub fn last_human_input_at(&self) -> Instant { self.last_human_input_at }
    pub fn pending_stage(&self) -> Option<DemoStage> { self.demo_timer.pending() }
    pub fn next_deadline(&self) -> Option<Instant> { self.demo_timer.deadline() }

    /// Records operator activity. Returns `true` if this took control away from
    /// the autopilot.
    pub fn on_human_input(&mut self, now: Instant) -> bool {
        self.last_human_input_at = now;
        self.demo_timer.cancel();
        let was_auto = self.mode == ControlMode::AutoPilotControl;
        self.mode = ControlMode::HumanControl;
        was_auto
    }

    /// Hands an idle mission to the autopilot once the operator has been
    /// inactive for [`Self::IDLE_TIMEOUT`]. Returns `true` on the handover.
    pub fn check_idle(&mut self, now: Instant, phase: MissionPhase) -> bool {
        let idle_for = now.saturating_duration_since(self.last_human_input_at);
        if self.mode != ControlMode::HumanControl || phase != MissionPhase::Idle || idle_for < Self::IDLE_TIMEOUT {
            return false;
        }
        self.mode = ControlMode::AutoPilotControl;
        self.demo_timer.arm(now, Self::BANNER_DELAY, DemoStage::LaunchAfterBanner);
        true
    }

    /// Schedules the demo restart after a demo mission ended. Returns `true`
    /// if a restart was scheduled.
    pub fn on_mission_end(&mut self, now: Instant) -> bool {
        if self.mode != ControlMode::AutoPilotControl || self.demo_timer.is_armed() {
            return false;
        }
        self.demo_timer.arm(now, Self::RESTART_DELAY, DemoStage::ResetAfterTouchdown);
        true
    }

    /// Takes the demo step that has come due, arming the one that follows it.
    pub fn take_due_stage(&mut self, now: Instant) -> Option<DemoStage> {
        let stage = self.demo_timer.take_due(now)?;
        if self.mode != ControlMode::AutoPilotControl {
            return None;
        }
        if stage == DemoStage::ResetAfterTouchdown {
            self.demo_timer.arm(now, Self::RELAUNCH_DELAY, DemoStage::LaunchAfterReset);
        }
        Some(stage)
    }
}
