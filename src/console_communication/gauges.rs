use crate::flight_control::mission::INITIAL_ALTITUDE;
use serde::Serialize;
use strum_macros::Display;

/// Cells of the altitude bar, the last one being the surface.
pub const ALTITUDE_BAR_CELLS: usize = 40;
/// Fuel percent represented by one cell of the fuel bar.
pub const FUEL_PER_CELL: f64 = 5.0;

/// Severity a telemetry value is displayed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Nominal,
    Caution,
    Critical,
}

impl StatusLevel {
    pub fn ansi_color(self) -> &'static str {
        match self {
            StatusLevel::Nominal => "\x1b[32m",
            StatusLevel::Caution => "\x1b[33m",
            StatusLevel::Critical => "\x1b[31m",
        }
    }
}

pub fn fuel_level(fuel: f64) -> StatusLevel {
    if fuel < 20.0 {
        StatusLevel::Critical
    } else if fuel < 40.0 {
        StatusLevel::Caution
    } else {
        StatusLevel::Nominal
    }
}

pub fn velocity_level(velocity: f64) -> StatusLevel {
    if velocity > 10.0 {
        StatusLevel::Critical
    } else if velocity > 5.0 {
        StatusLevel::Caution
    } else {
        StatusLevel::Nominal
    }
}

/// Arrow for the direction of travel; velocity is positive when descending.
pub fn direction_arrow(velocity: f64) -> char {
    if velocity > 0.0 {
        '↓'
    } else if velocity < 0.0 {
        '↑'
    } else {
        '-'
    }
}

/// Descent progress bar with the craft as `▼` and the surface as `█`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn altitude_bar(altitude: f64) -> String {
    let progress = (INITIAL_ALTITUDE - altitude) / INITIAL_ALTITUDE;
    let last = ALTITUDE_BAR_CELLS - 1;
    let craft = ((progress * ALTITUDE_BAR_CELLS as f64).round().max(0.0) as usize).min(last);
    (0..ALTITUDE_BAR_CELLS)
        .map(|i| match i {
            i if i == craft => '▼',
            i if i == last => '█',
            _ => '·',
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn fuel_bar(fuel: f64) -> String { "█".repeat((fuel / FUEL_PER_CELL).round().max(0.0) as usize) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(fuel_level(100.0), StatusLevel::Nominal);
        assert_eq!(fuel_level(39.9), StatusLevel::Caution);
        assert_eq!(fuel_level(19.9), StatusLevel::Critical);
        assert_eq!(velocity_level(5.0), StatusLevel::Nominal);
        assert_eq!(velocity_level(7.0), StatusLevel::Caution);
        assert_eq!(velocity_level(10.5), StatusLevel::Critical);
        assert_eq!(velocity_level(-20.0), StatusLevel::Nominal);
    }

    #[test]
    fn test_altitude_bar_positions() {
        let top = altitude_bar(1000.0);
        assert_eq!(top.chars().count(), ALTITUDE_BAR_CELLS);
        assert!(top.starts_with('▼'));
        assert!(top.ends_with('█'));

        let half: Vec<char> = altitude_bar(500.0).chars().collect();
        assert_eq!(half[20], '▼');

        let ground = altitude_bar(0.0);
        assert!(ground.ends_with('▼'));
        assert!(altitude_bar(1200.0).starts_with('▼'));
    }

    #[test]
    fn test_fuel_bar_and_arrow() {
        assert_eq!(fuel_bar(100.0).chars().count(), 20);
        assert_eq!(fuel_bar(12.0).chars().count(), 2);
        assert_eq!(fuel_bar(0.0), "");
        assert_eq!(direction_arrow(3.0), '↓');
        assert_eq!(direction_arrow(-0.1), '↑');
        assert_eq!(direction_arrow(0.0), '-');
    }
}
