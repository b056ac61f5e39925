use super::mission::{INITIAL_ALTITUDE, MissionSnapshot};
use strum_macros::Display;

/// Why the autopilot asked for a pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ThrustReason {
    /// Descent faster than the altitude band allows.
    Regulate,
    /// Too fast too close to the surface; fired without reserve or pacing checks.
    Emergency,
}

/// Pulses the autopilot asks for on one tick. Both rules are evaluated
/// independently, so a tick may buy two pulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoPilotDecision {
    pub regulate: bool,
    pub emergency: bool,
}

impl AutoPilotDecision {
    /// Requested pulses in firing order, the regular one first.
    pub fn pulses(self) -> impl Iterator<Item = ThrustReason> {
        [(self.regulate, ThrustReason::Regulate), (self.emergency, ThrustReason::Emergency)]
            .into_iter()
            .filter_map(|(wanted, reason)| wanted.then_some(reason))
    }
}

/// Stateless descent policy flown during demonstrations.
///
/// Every threshold here balances the success rate of the demo against its
/// fuel use; they are fixed and must not be tuned independently.
pub struct AutoPilot;

impl AutoPilot {
    /// Minimum descent speed over which thrust is wanted.
    const VEL_DEADBAND: f64 = 0.3;
    /// Absolute floor of the fuel reserve, in percent.
    const MIN_FUEL_RESERVE: f64 = 5.0;
    /// Reserve added per unit of altitude ratio, in percent.
    const FUEL_RESERVE_PER_RATIO: f64 = 20.0;
    const EMERGENCY_ALTITUDE: f64 = 30.0;
    const EMERGENCY_VELOCITY: f64 = 4.0;

    /// Decides which pulses to command on this tick.
    ///
    /// `auto_pilot_tick` is the number of ticks flown since the autopilot took
    /// control and paces the regular pulses. The emergency pulse ignores pacing
    /// and reserve and comes on top of a regular one.
    pub fn decide(telemetry: &MissionSnapshot, auto_pilot_tick: u64) -> AutoPilotDecision {
        let altitude = telemetry.altitude;
        let velocity = telemetry.velocity;

        let altitude_ratio = altitude / INITIAL_ALTITUDE;
        let velocity_diff = velocity - Self::target_velocity(altitude);
        let wants_thrust = velocity_diff > Self::VEL_DEADBAND;
        let above_reserve = telemetry.fuel > Self::fuel_threshold(altitude_ratio);
        let on_beat = auto_pilot_tick % Self::thrust_interval(velocity_diff) == 0;

        AutoPilotDecision {
            regulate: wants_thrust && above_reserve && on_beat,
            emergency: altitude < Self::EMERGENCY_ALTITUDE && velocity > Self::EMERGENCY_VELOCITY,
        }
    }

    /// Desired descent speed for an altitude. Never increases as altitude drops.
    pub fn target_velocity(altitude: f64) -> f64 {
        let altitude_ratio = altitude / INITIAL_ALTITUDE;
        let mut target = if altitude_ratio > 0.7 {
            10.0
        } else if altitude_ratio > 0.5 {
            7.0
        } else if altitude_ratio > 0.3 {
            5.0
        } else if altitude_ratio > 0.1 {
            3.0
        } else {
            1.5
        };
        if altitude < 50.0 {
            target = f64::min(target, 2.5);
        }
        if altitude < 20.0 {
            target = f64::min(target, 1.8);
        }
        target
    }

    /// Fuel, in percent, the autopilot keeps in reserve at an altitude ratio.
    pub fn fuel_threshold(altitude_ratio: f64) -> f64 {
        f64::max(Self::MIN_FUEL_RESERVE, altitude_ratio * Self::FUEL_RESERVE_PER_RATIO + Self::MIN_FUEL_RESERVE)
    }

    /// Ticks between regular pulses for a given velocity error.
    pub fn thrust_interval(velocity_diff: f64) -> u64 {
        let err = velocity_diff.abs();
        if err > 2.0 {
            2
        } else if err > 1.0 {
            4
        } else if err > 0.5 {
            6
        } else {
            8
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AutoPilot, AutoPilotDecision, ThrustReason};
    use crate::flight_control::mission::MissionSnapshot;
    use crate::flight_control::mission_phase::MissionPhase;

    fn telemetry(altitude: f64, velocity: f64, fuel: f64) -> MissionSnapshot {
        MissionSnapshot {
            altitude,
            velocity,
            fuel,
            thrust_active: false,
            phase: MissionPhase::Running,
            is_auto_pilot: true,
        }
    }

    #[test]
    fn test_target_velocity_bands() {
        assert_eq!(AutoPilot::target_velocity(1000.0), 10.0);
        assert_eq!(AutoPilot::target_velocity(700.0), 7.0);
        assert_eq!(AutoPilot::target_velocity(600.0), 7.0);
        assert_eq!(AutoPilot::target_velocity(500.0), 5.0);
        assert_eq!(AutoPilot::target_velocity(300.0), 3.0);
        assert_eq!(AutoPilot::target_velocity(100.0), 1.5);
        assert_eq!(AutoPilot::target_velocity(45.0), 1.5);
        assert_eq!(AutoPilot::target_velocity(10.0), 1.5);
    }

    #[test]
    fn test_target_velocity_is_monotone() {
        let mut last = f64::INFINITY;
        for h in (0..=1000).rev() {
            let target = AutoPilot::target_velocity(f64::from(h));
            assert!(target <= last, "target rose to {target} at {h} m");
            last = target;
        }
    }

    #[test]
    fn test_fuel_threshold_and_intervals() {
        assert!((AutoPilot::fuel_threshold(1.0) - 25.0).abs() < 1e-12);
        assert!((AutoPilot::fuel_threshold(0.0) - 5.0).abs() < 1e-12);
        assert_eq!(AutoPilot::thrust_interval(2.5), 2);
        assert_eq!(AutoPilot::thrust_interval(-1.5), 4);
        assert_eq!(AutoPilot::thrust_interval(0.7), 6);
        assert_eq!(AutoPilot::thrust_interval(0.4), 8);
    }

    const HOLD: AutoPilotDecision = AutoPilotDecision { regulate: false, emergency: false };
    const REGULATE: AutoPilotDecision = AutoPilotDecision { regulate: true, emergency: false };
    const EMERGENCY: AutoPilotDecision = AutoPilotDecision { regulate: false, emergency: true };

    #[test]
    fn test_regulates_only_on_beat() {
        // 800 m: target 10, diff 3 -> every 2nd tick
        let t = telemetry(800.0, 13.0, 90.0);
        assert_eq!(AutoPilot::decide(&t, 1), HOLD);
        assert_eq!(AutoPilot::decide(&t, 2), REGULATE);
        assert_eq!(AutoPilot::decide(&t, 3), HOLD);
    }

    #[test]
    fn test_holds_inside_deadband() {
        let t = telemetry(800.0, 10.2, 90.0);
        assert_eq!(AutoPilot::decide(&t, 8), HOLD);
    }

    #[test]
    fn test_keeps_fuel_reserve() {
        // 800 m keeps 21% in reserve
        let t = telemetry(800.0, 20.0, 21.0);
        assert_eq!(AutoPilot::decide(&t, 2), HOLD);
        let t = telemetry(800.0, 20.0, 21.5);
        assert_eq!(AutoPilot::decide(&t, 2), REGULATE);
    }

    #[test]
    fn test_emergency_override_bypasses_gating() {
        // below reserve, off beat, still fires
        let t = telemetry(25.0, 5.0, 3.0);
        assert_eq!(AutoPilot::decide(&t, 7), EMERGENCY);
        let t = telemetry(25.0, 4.0, 3.0);
        assert_eq!(AutoPilot::decide(&t, 7), HOLD);
    }

    #[test]
    fn test_emergency_stacks_on_regular_pulse() {
        // 25 m: target 2.5, diff 3.5 -> every 2nd tick, reserve 5.5%
        let t = telemetry(25.0, 6.0, 90.0);
        let decision = AutoPilot::decide(&t, 2);
        assert_eq!(decision, AutoPilotDecision { regulate: true, emergency: true });
        assert_eq!(
            decision.pulses().collect::<Vec<_>>(),
            vec![ThrustReason::Regulate, ThrustReason::Emergency]
        );
        assert_eq!(AutoPilot::decide(&t, 3).pulses().collect::<Vec<_>>(), vec![ThrustReason::Emergency]);
    }
}
