use crate::flight_control::MissionPhase;
use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::Display;

/// Control requests arriving from the human interface layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ControlCommand {
    Thrust,
    Start,
    Instructions,
    /// Any other key. Counts as operator activity, does nothing else.
    Other,
}

/// Source of a presented frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameSource {
    Simulation,
    Render,
}

/// Outcome summary pushed once when a mission touches down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TouchdownReport {
    pub phase: MissionPhase,
    pub speed: f64,
    pub fuel: f64,
    pub flight_time_ms: u64,
    pub auto_pilot: bool,
    pub launched_at: Option<DateTime<Utc>>,
}

/// One-off messages for the presenter, next to the per-tick snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum Notice {
    Welcome,
    Instructions,
    DemoBanner,
    MissionStarted { auto_pilot: bool },
    Touchdown(TouchdownReport),
    HumanTakeover,
}
