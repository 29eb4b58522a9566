//! Fixed-timestep projectile simulation
//!
//! Presentation time and physics time are decoupled by a time debt: each
//! host tick adds its delta, each physics sub-step pays off one fixed
//! timestep. Within a sub-step the motion is swept against the collision
//! backend; on a hit the projectile is placed at the contact point, its
//! velocity reflected, and the rest of the sub-step simulated recursively.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::collision::CollisionBackend;
use super::events::{CollisionContext, CollisionEvent, CollisionSubscribers, ProjectileId, SubscriberId};
use super::kinematics::{facing_rotation, reflect, step, vector_to};
use crate::config::ProjectileConfig;
use crate::consts::{MAX_SIMULATION_RECURSION, SIMULATION_EPSILON, SWEEP_EPSILON};

/// Spawn pose supplied by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    /// Facing direction; normalized on spawn
    pub forward: Vec3,
}

impl Pose {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self { position, forward }
    }
}

/// Authoritative physics state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileState {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Simulation time owed but not yet stepped. Each bounce books its
    /// remaining time again, so this can be negative between ticks.
    pub time_debt: f32,
    pub active: bool,
}

/// A single bouncing projectile
#[derive(Debug)]
pub struct Projectile<S> {
    id: ProjectileId,
    config: ProjectileConfig,
    state: ProjectileState,
    subscribers: CollisionSubscribers<S>,
    /// Position shown by the presentation layer (may be extrapolated)
    presentation_position: Vec3,
    rotation: Option<Quat>,
    time_since_fixed_tick: f32,
}

impl<S> Projectile<S> {
    /// Launch a projectile along `pose.forward` at the configured speed
    pub fn spawn(id: ProjectileId, config: ProjectileConfig, pose: Pose) -> Self {
        let velocity = pose.forward.normalize_or_zero() * config.initial_speed;
        log::debug!(
            "Projectile {} spawned at {} with velocity {}",
            id.0,
            pose.position,
            velocity
        );

        Self {
            id,
            state: ProjectileState {
                position: pose.position,
                velocity,
                time_debt: 0.0,
                active: true,
            },
            config,
            subscribers: CollisionSubscribers::new(),
            presentation_position: pose.position,
            rotation: facing_rotation(velocity),
            time_since_fixed_tick: 0.0,
        }
    }

    pub fn id(&self) -> ProjectileId {
        self.id
    }

    pub fn config(&self) -> &ProjectileConfig {
        &self.config
    }

    /// Snapshot of the physics state
    pub fn state(&self) -> ProjectileState {
        self.state
    }

    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.state.velocity
    }

    /// Redirect the projectile. Takes effect from the next sub-step.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.state.velocity = velocity;
    }

    pub fn time_debt(&self) -> f32 {
        self.state.time_debt
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Position for rendering; equals [`Self::position`] unless extrapolating
    pub fn presentation_position(&self) -> Vec3 {
        self.presentation_position
    }

    /// Facing rotation as of the last fixed tick; `None` while not moving
    pub fn rotation(&self) -> Option<Quat> {
        self.rotation
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: FnMut(&CollisionEvent<S>, &mut CollisionContext) + 'static,
    {
        self.subscribers.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Permanently stop simulating. Position and velocity stay queryable and
    /// any owed time is left untouched.
    pub fn deactivate(&mut self) {
        if self.state.active {
            log::debug!("Projectile {} deactivated at {}", self.id.0, self.state.position);
        }
        self.state.active = false;
    }

    /// Host fixed tick. Returns the number of physics sub-steps run; stops
    /// early if a collision handler deactivates the projectile.
    pub fn advance<B>(&mut self, frame_dt: f32, backend: &B) -> usize
    where
        B: CollisionBackend<Surface = S>,
    {
        if !self.state.active {
            return 0;
        }

        self.state.time_debt += frame_dt;

        let iterations = self.config.timesteps_for_debt(self.state.time_debt);
        let timestep = self.config.fixed_timestep;
        let mut substeps = 0;
        for _ in 0..iterations {
            if !self.state.active {
                break;
            }
            self.simulate(timestep, backend);
            substeps += 1;
        }

        self.presentation_position = self.state.position;
        self.rotation = facing_rotation(self.state.velocity);
        self.time_since_fixed_tick = 0.0;

        substeps
    }

    /// Render-frame hook. With extrapolation enabled, moves the presentation
    /// position along the velocity by the time elapsed since the last fixed
    /// tick. Never alters simulation state.
    pub fn update_presentation(&mut self, frame_dt: f32) -> Vec3 {
        if self.config.extrapolate && self.state.active {
            self.time_since_fixed_tick += frame_dt;
            self.presentation_position =
                self.state.position + self.state.velocity * self.time_since_fixed_tick;
        }
        self.presentation_position
    }

    /// Simulate `timestep` seconds, resolving any collisions along the way
    pub fn simulate<B>(&mut self, timestep: f32, backend: &B)
    where
        B: CollisionBackend<Surface = S>,
    {
        if !self.state.active {
            return;
        }
        self.simulate_recursive(timestep, 0, backend);
    }

    fn simulate_recursive<B>(&mut self, timestep: f32, depth: u32, backend: &B)
    where
        B: CollisionBackend<Surface = S>,
    {
        if depth >= MAX_SIMULATION_RECURSION {
            log::trace!(
                "Projectile {} hit recursion limit, dropping {timestep}s",
                self.id.0
            );
            return;
        }
        if timestep <= SIMULATION_EPSILON {
            return;
        }

        self.state.time_debt -= timestep;

        let gravity = self.config.gravity;
        let avg_vel = self.state.velocity + gravity * timestep * 0.5;
        let avg_speed = avg_vel.length();

        let hit = backend.sweep(
            self.state.position,
            self.config.shape,
            avg_vel,
            avg_speed * timestep * SWEEP_EPSILON,
            self.config.collision_filter,
        );

        let Some(hit) = hit else {
            let (position, velocity) = step(self.state.position, self.state.velocity, gravity, timestep);
            self.state.position = position;
            self.state.velocity = velocity;
            log::trace!("Projectile {} stepped {timestep}s to {position}", self.id.0);
            return;
        };

        let hit_distance = vector_to(self.state.position, hit.point).length();
        let time_to_hit = if avg_speed > 0.0 {
            hit_distance / avg_speed
        } else {
            0.0
        };

        // Step only for the impact velocity; the position snaps to the contact
        let (_, velocity) = step(self.state.position, self.state.velocity, gravity, time_to_hit);
        self.state.position = hit.point;
        self.state.velocity = reflect(velocity, hit.normal);

        log::debug!(
            "Projectile {} bounced at {} after {time_to_hit}s, velocity now {}",
            self.id.0,
            hit.point,
            self.state.velocity
        );

        let event = CollisionEvent {
            projectile: self.id,
            surface: hit.surface,
            damage: self.config.damage,
        };
        if self.subscribers.emit(&event) {
            self.deactivate();
        }

        let remaining = timestep - time_to_hit;
        if self.state.active {
            self.simulate_recursive(remaining, depth + 1, backend);
        } else {
            self.state.time_debt += remaining;
        }
    }
}
