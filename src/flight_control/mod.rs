pub(crate) mod autopilot;
pub(crate) mod common;
pub(crate) mod mission;
pub(crate) mod mission_phase;
pub(crate) mod physics;
#[cfg(test)]
mod tests;

pub use autopilot::AutoPilot;
pub use mission::{CommandOutcome, MissionSnapshot, MissionStateMachine};
pub use mission_phase::MissionPhase;
