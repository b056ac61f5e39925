use serde::Serialize;
use strum_macros::{Display, EnumIter};

/// Lifecycle stage of a landing mission.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, EnumIter, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionPhase {
    Idle,
    Running,
    Landed,
    Crashed,
}

impl MissionPhase {
    /// `true` for the outcomes that end a mission until the next reset.
    pub fn is_terminal(self) -> bool { matches!(self, MissionPhase::Landed | MissionPhase::Crashed) }

    /// Whether the phase graph allows moving from `self` to `next`.
    ///
    /// Only `Idle -> Running -> {Landed, Crashed}` moves forward; every phase may
    /// return to `Idle` through an explicit reset.
    pub fn can_transition_to(self, next: MissionPhase) -> bool {
        matches!(
            (self, next),
            (MissionPhase::Idle, MissionPhase::Running)
                | (MissionPhase::Running, MissionPhase::Landed | MissionPhase::Crashed)
                | (_, MissionPhase::Idle)
        )
    }
}

impl From<MissionPhase> for &'static str {
    fn from(value: MissionPhase) -> Self {
        match value {
            MissionPhase::Idle => "idle",
            MissionPhase::Running => "running",
            MissionPhase::Landed => "landed",
            MissionPhase::Crashed => "crashed",
        }
    }
}
