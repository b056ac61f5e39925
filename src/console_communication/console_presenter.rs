use super::{
    Presenter,
    gauges::{self, StatusLevel},
};
use crate::flight_control::{
    MissionPhase, MissionSnapshot,
    mission::{FUEL_PER_PULSE, GRAVITY, LANDING_SPEED_LIMIT, THRUST_ACCEL},
};
use crate::mode_control::signal::{FrameSource, Notice, TouchdownReport};
use crate::warn;
use std::io::Write;

const RESET: &str = "\x1b[0m";
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Terminal presenter drawing one status line that is redrawn in place.
///
/// Notices are printed on their own lines above the status line. A write
/// failure is reported once and further output is dropped.
pub struct ConsolePresenter<W: Write + Send> {
    out: W,
    last_line: Option<String>,
    broken: bool,
}

impl<W: Write + Send> ConsolePresenter<W> {
    pub fn new(out: W) -> Self { Self { out, last_line: None, broken: false } }

    #[cfg(test)]
    pub(crate) fn output(&self) -> &W { &self.out }

    /// Renders the status line for `snapshot`.
    pub fn status_line(snapshot: &MissionSnapshot) -> String {
        let vel_level = gauges::velocity_level(snapshot.velocity);
        let fuel_level = gauges::fuel_level(snapshot.fuel);
        let engine = if snapshot.thrust_active { "🔥" } else { "  " };
        let pilot = if snapshot.is_auto_pilot { "AUTO" } else { "MAN " };
        format!(
            "[{}] ALT {:>6.1} m {} | VEL {}{}{:>5.1} m/s{RESET} | FUEL {}{:>5.1}%{RESET} {:<20} | {engine} | {pilot} | {}",
            gauges::altitude_bar(snapshot.altitude),
            snapshot.altitude,
            if snapshot.altitude <= 0.0 { "▁" } else { " " },
            vel_level.ansi_color(),
            gauges::direction_arrow(snapshot.velocity),
            snapshot.velocity.abs(),
            fuel_level.ansi_color(),
            snapshot.fuel,
            gauges::fuel_bar(snapshot.fuel),
            <&str>::from(snapshot.phase),
        )
    }

    /// Operator-facing text for a notice.
    pub fn notice_text(notice: &Notice) -> String {
        match notice {
            Notice::Welcome => format!(
                "LUNAR LANDER\nLand softly below {LANDING_SPEED_LIMIT:.1} m/s. \
                 Press ENTER or 's' to launch, 't' to fire the engine, 'h' for help, 'q' to quit."
            ),
            Notice::Instructions => format!(
                "Gravity pulls at {GRAVITY} m/s². Each engine pulse pushes back with {THRUST_ACCEL} m/s² \
                 for 0.3 s and burns {FUEL_PER_PULSE}% fuel.\n\
                 Touch down at {LANDING_SPEED_LIMIT:.1} m/s or slower to land. \
                 Leave the keyboard alone and the autopilot will show you how."
            ),
            Notice::DemoBanner => String::from("AUTOPILOT DEMONSTRATION. Press any key to take control."),
            Notice::MissionStarted { auto_pilot: true } => String::from("Autopilot launch."),
            Notice::MissionStarted { auto_pilot: false } => String::from("Launch! Good luck."),
            Notice::Touchdown(report) => Self::touchdown_text(report),
            Notice::HumanTakeover => String::from("Manual control. The autopilot is off."),
        }
    }

    fn touchdown_text(report: &TouchdownReport) -> String {
        #[allow(clippy::cast_precision_loss)]
        let secs = report.flight_time_ms as f64 / 1000.0;
        let (headline, level) = match report.phase {
            MissionPhase::Landed => ("*** THE EAGLE HAS LANDED ***", StatusLevel::Nominal),
            _ => ("*** CRASH ***", StatusLevel::Critical),
        };
        let pilot = if report.auto_pilot { " (autopilot)" } else { "" };
        let launch = report
            .launched_at
            .map(|t| format!(", launched {} UTC", t.format("%H:%M:%S")))
            .unwrap_or_default();
        format!(
            "{}{headline}{RESET}{pilot}\nTouchdown speed {:.2} m/s, fuel left {:.1}%, flight time {secs:.1} s{launch}.",
            level.ansi_color(),
            report.speed,
            report.fuel,
        )
    }

    fn write_out(&mut self, text: &str) {
        if self.broken {
            return;
        }
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            warn!("Console output failed, dropping further frames: {e}");
            self.broken = true;
        }
    }
}

impl<W: Write + Send> Presenter for ConsolePresenter<W> {
    fn frame(&mut self, snapshot: &MissionSnapshot, _source: FrameSource) {
        let line = Self::status_line(snapshot);
        if self.last_line.as_ref() == Some(&line) {
            return;
        }
        self.write_out(&format!("{CLEAR_LINE}{line}"));
        self.last_line = Some(line);
    }

    fn notice(&mut self, notice: &Notice) {
        let text = Self::notice_text(notice);
        self.write_out(&format!("{CLEAR_LINE}{text}\n"));
        // the status line has to be redrawn below the notice
        self.last_line = None;
    }

    fn finish(&mut self) { self.write_out("\n"); }
}
