//! Presentation and operator input around the simulation core.
//! It includes the `console_presenter` and `json_presenter` frame sinks,
//! the `gauges` helpers both of them use to classify telemetry,
//! and the `keyboard` module that turns terminal lines into commands.

mod console_presenter;
pub(crate) mod gauges;
mod json_presenter;
pub(crate) mod keyboard;

use crate::flight_control::MissionSnapshot;
use crate::mode_control::signal::{FrameSource, Notice};
use crate::warn;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

pub use console_presenter::ConsolePresenter;
pub use json_presenter::JsonPresenter;

/// Environment variable selecting the presenter.
pub const PRESENTER_VAR: &str = "LANDER_PRESENTER";

/// Consumer of read-only simulation output.
pub trait Presenter: Send {
    /// Called after every simulation and every render tick.
    fn frame(&mut self, snapshot: &MissionSnapshot, source: FrameSource);
    fn notice(&mut self, notice: &Notice);
    /// Called once when the clock stops.
    fn finish(&mut self) {}
}

/// Presenter that discards everything. Touchdowns still reach the log.
pub struct SilentPresenter;

impl Presenter for SilentPresenter {
    fn frame(&mut self, _: &MissionSnapshot, _: FrameSource) {}
    fn notice(&mut self, _: &Notice) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PresenterKind {
    Console,
    Json,
    Off,
}

impl PresenterKind {
    /// Reads the presenter choice from `value`, falling back to the console.
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => PresenterKind::Console,
            Some(raw) => PresenterKind::from_str(raw).unwrap_or_else(|_| {
                warn!("Unknown {PRESENTER_VAR} value '{raw}'. Using the console presenter.");
                PresenterKind::Console
            }),
        }
    }

    pub fn build(self) -> Box<dyn Presenter> {
        match self {
            PresenterKind::Console => Box::new(ConsolePresenter::new(std::io::stdout())),
            PresenterKind::Json => Box::new(JsonPresenter::new(std::io::stdout())),
            PresenterKind::Off => Box::new(SilentPresenter),
        }
    }
}
