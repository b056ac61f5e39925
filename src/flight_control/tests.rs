use super::mission::{
    classify_touchdown, CommandOutcome, FUEL_PER_PULSE, GRAVITY, IgnoreReason, INITIAL_ALTITUDE, MissionStateMachine,
    PULSE_DURATION, THRUST_ACCEL,
};
use super::{mission_phase::MissionPhase, physics};
use std::time::Duration;
use tokio::time::Instant;

const TICK: Duration = Duration::from_millis(100);

/// Ticks a running mission until touchdown, returning the number of ticks.
fn fly_to_touchdown(mission: &mut MissionStateMachine, t0: Instant) -> u32 {
    let mut ticks = 0;
    while mission.phase() == MissionPhase::Running {
        ticks += 1;
        mission.tick(t0 + TICK * ticks);
        assert!(ticks < 10_000, "mission never touched down");
    }
    ticks
}

#[test]
fn test_reset_restores_fresh_idle_mission() {
    let t0 = Instant::now();
    let mut mission = MissionStateMachine::new();
    mission.start(t0);
    mission.engage_autopilot();
    mission.command_thrust(t0);
    mission.tick(t0 + TICK);
    mission.reset();
    let snap = mission.snapshot();
    assert_eq!(snap.phase, MissionPhase::Idle);
    assert_eq!(snap.altitude, INITIAL_ALTITUDE);
    assert_eq!(snap.velocity, 0.0);
    assert_eq!(snap.fuel, 100.0);
    assert!(!snap.thrust_active);
    assert!(!snap.is_auto_pilot);
    assert_eq!(mission.next_deadline(), None);
}

#[test]
fn test_start_only_from_idle() {
    let t0 = Instant::now();
    let mut mission = MissionStateMachine::new();
    assert_eq!(mission.start(t0), CommandOutcome::Applied);
    assert_eq!(mission.start(t0), CommandOutcome::Ignored(IgnoreReason::NotIdle));
    assert_eq!(mission.phase(), MissionPhase::Running);
}

#[test]
fn test_commands_ignored_unless_running() {
    let t0 = Instant::now();
    let mut mission = MissionStateMachine::new();
    assert_eq!(mission.command_thrust(t0), CommandOutcome::Ignored(IgnoreReason::NotRunning));
    let before = mission.snapshot();
    assert_eq!(mission.tick(t0), before);
}

#[test]
fn test_tick_follows_integrator_law() {
    let t0 = Instant::now();
    let mut mission = MissionStateMachine::running_at(500.0, 12.0, 50.0);
    let mut expected = (12.0, 500.0);
    for i in 1..=20 {
        let snap = mission.tick(t0 + TICK * i);
        expected = physics::integrate(GRAVITY, 0.0, expected.0, expected.1, physics::DT);
        assert_eq!((snap.velocity, snap.altitude), expected);
    }
}

#[test]
fn test_thrust_pulse_costs_fuel_and_expires_in_real_time() {
    let t0 = Instant::now();
    let mut mission = MissionStateMachine::running_at(500.0, 10.0, 50.0);
    assert!(mission.command_thrust(t0).is_applied());
    assert!((mission.fuel() - (50.0 - FUEL_PER_PULSE)).abs() < 1e-12);
    assert_eq!(mission.next_deadline(), Some(t0 + PULSE_DURATION));

    // 100 ms and 200 ms ticks still see thrust, the 300 ms one does not
    let snap = mission.tick(t0 + TICK);
    assert!(snap.thrust_active);
    assert!((snap.velocity - (10.0 + (GRAVITY - THRUST_ACCEL) * physics::DT)).abs() < 1e-12);
    assert!(mission.tick(t0 + TICK * 2).thrust_active);
    assert!(!mission.tick(t0 + TICK * 3).thrust_active);
    assert_eq!(mission.next_deadline(), None);
}

#[test]
fn test_rearming_pulse_extends_window_without_stacking() {
    let t0 = Instant::now();
    let mut mission = MissionStateMachine::running_at(500.0, 10.0, 50.0);
    mission.command_thrust(t0);
    mission.command_thrust(t0 + Duration::from_millis(200));
    assert_eq!(mission.next_deadline(), Some(t0 + Duration::from_millis(500)));
    assert!(!mission.expire_pulse(t0 + Duration::from_millis(300)));
    assert!(mission.snapshot().thrust_active);
    assert!(mission.expire_pulse(t0 + Duration::from_millis(500)));
    assert!(!mission.snapshot().thrust_active);
}

#[test]
fn test_fuel_floors_at_zero_and_empty_tank_is_noop() {
    let t0 = Instant::now();
    let mut mission = MissionStateMachine::running_at(500.0, 10.0, 0.5);
    assert!(mission.command_thrust(t0).is_applied());
    assert_eq!(mission.fuel(), 0.0);
    mission.expire_pulse(t0 + PULSE_DURATION);

    assert_eq!(mission.command_thrust(t0 + TICK * 4), CommandOutcome::Ignored(IgnoreReason::OutOfFuel));
    assert_eq!(mission.fuel(), 0.0);
    assert!(!mission.snapshot().thrust_active);
    assert!(mission.check_invariants().is_empty());
}

#[test]
fn test_free_fall_crashes_after_exact_tick_count() {
    let t0 = Instant::now();
    let mut mission = MissionStateMachine::new();
    mission.start(t0);

    let (mut v, mut h, mut expected_ticks) = (0.0_f64, INITIAL_ALTITUDE, 0);
    while h > 0.0 {
        (v, h) = physics::integrate(GRAVITY, 0.0, v, h, physics::DT);
        expected_ticks += 1;
    }

    let ticks = fly_to_touchdown(&mut mission, t0);
    let snap = mission.snapshot();
    assert_eq!(ticks, expected_ticks);
    assert_eq!(ticks, 500);
    assert_eq!(snap.velocity, v);
    assert!((snap.velocity - 40.0).abs() < 1e-6);
    assert_eq!(snap.altitude, 0.0);
    assert_eq!(snap.phase, MissionPhase::Crashed);
    assert_eq!(mission.flight_time(t0 + Duration::from_secs(999)), Some(TICK * 500));
}

#[test]
fn test_touchdown_classification_boundary() {
    assert_eq!(classify_touchdown(5.0), MissionPhase::Landed);
    assert_eq!(classify_touchdown(-5.0), MissionPhase::Landed);
    assert_eq!(classify_touchdown(0.0), MissionPhase::Landed);
    assert_eq!(classify_touchdown(5.000_001), MissionPhase::Crashed);
    assert_eq!(classify_touchdown(-7.5), MissionPhase::Crashed);
}

#[test]
fn test_touchdown_sets_terminal_phase() {
    let t0 = Instant::now();
    let mut mission = MissionStateMachine::running_at(0.4, 5.0, 10.0);
    let snap = mission.tick(t0);
    assert_eq!(snap.altitude, 0.0);
    assert_eq!(snap.phase, MissionPhase::Crashed);

    let mut mission = MissionStateMachine::running_at(0.1, 2.0, 10.0);
    assert_eq!(mission.tick(t0).phase, MissionPhase::Landed);
}

#[test]
fn test_terminal_state_is_frozen() {
    let t0 = Instant::now();
    let mut mission = MissionStateMachine::running_at(0.1, 3.0, 10.0);
    mission.command_thrust(t0);
    let landed = mission.tick(t0);
    assert_eq!(landed.phase, MissionPhase::Landed);
    assert!(!landed.thrust_active);
    assert_eq!(mission.next_deadline(), None);
    for i in 1..10 {
        assert_eq!(mission.tick(t0 + TICK * i), landed);
        assert!(!mission.command_thrust(t0 + TICK * i).is_applied());
    }
    assert!(!mission.start(t0).is_applied());
}

#[test]
fn test_invariants_hold_through_random_play() {
    let t0 = Instant::now();
    let mut mission = MissionStateMachine::new();
    mission.start(t0);
    let mut last_fuel = mission.fuel();
    let mut i = 0;
    while mission.phase() == MissionPhase::Running {
        i += 1;
        let now = t0 + TICK * i;
        if i % 3 == 0 {
            mission.command_thrust(now);
        }
        let snap = mission.tick(now);
        assert!(snap.fuel <= last_fuel);
        assert!(snap.altitude >= 0.0);
        assert!(mission.check_invariants().is_empty(), "{:?}", mission.check_invariants());
        last_fuel = snap.fuel;
    }
    assert!(mission.phase().is_terminal());
}
