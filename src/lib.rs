//! Bounce Sim - a bouncing projectile on a fixed physics timestep
//!
//! Core modules:
//! - `sim`: Simulation (kinematics, swept collisions, collision events)
//! - `config`: Per-projectile tuning, loadable from JSON

pub mod config;
pub mod sim;

pub use config::ProjectileConfig;
pub use sim::{CollisionBackend, CollisionEvent, Pose, Projectile, ProjectileId};

/// Simulation constants
pub mod consts {
    /// Default fixed physics timestep (50 Hz)
    pub const DEFAULT_FIXED_DT: f32 = 1.0 / 50.0;
    /// Maximum host fixed ticks per render frame to prevent spiral of death
    pub const MAX_HOST_SUBSTEPS: u32 = 8;

    /// Sub-steps at or below this length are not simulated
    pub const SIMULATION_EPSILON: f32 = 0.01;
    /// Sweep distance padding so a hit right at the step boundary is not lost
    pub const SWEEP_EPSILON: f32 = 1.01;
    /// Bounces resolved within one sub-step
    pub const MAX_SIMULATION_RECURSION: u32 = 3;
}
