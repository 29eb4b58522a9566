//! Constant-acceleration kinematics
//!
//! Pure functions, no state. The integrator and the collision sweep in
//! `projectile` both assume the averaged-velocity form used by [`step`].

use glam::{Quat, Vec3};

/// Canonical forward axis of a projectile at identity rotation
pub const FORWARD: Vec3 = Vec3::Z;

/// Advance position and velocity by `dt` under constant `gravity`.
///
/// Position moves with the velocity averaged over the step, so a single call
/// traces the exact parabola chord: `p + (v + g*dt/2)*dt`.
#[inline]
pub fn step(position: Vec3, velocity: Vec3, gravity: Vec3, dt: f32) -> (Vec3, Vec3) {
    let acc = gravity * dt;
    let mid_vel = velocity + acc * 0.5;
    (position + mid_vel * dt, velocity + acc)
}

/// Reflect `v` across the plane with unit normal `normal`
///
/// v' = 2 * project_on_plane(v) - v
#[inline]
pub fn reflect(v: Vec3, normal: Vec3) -> Vec3 {
    let projection = v - normal * v.dot(normal);
    2.0 * projection - v
}

/// Vector from `from` to `to`
#[inline]
pub fn vector_to(from: Vec3, to: Vec3) -> Vec3 {
    to - from
}

/// Rotation taking [`FORWARD`] onto the direction of `velocity`.
///
/// Returns `None` for a zero (or denormal) velocity, where no facing exists.
pub fn facing_rotation(velocity: Vec3) -> Option<Quat> {
    let dir = velocity.try_normalize()?;
    Some(Quat::from_rotation_arc(FORWARD, dir))
}
