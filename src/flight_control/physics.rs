//! Fixed-step integrator for the vertical descent.

/// Simulated seconds advanced by one simulation tick.
pub const DT: f64 = 0.1;

/// Advances `(velocity, altitude)` by one semi-implicit Euler step.
///
/// Velocity is positive when descending, so gravity increases it and thrust
/// decreases it. The altitude update uses the already updated velocity.
pub fn integrate(gravity: f64, thrust_accel: f64, velocity: f64, altitude: f64, dt: f64) -> (f64, f64) {
    let net_accel = gravity - thrust_accel;
    let new_velocity = velocity + net_accel * dt;
    let new_altitude = altitude - new_velocity * dt;
    (new_velocity, new_altitude)
}
