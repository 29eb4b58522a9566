//! Projectile configuration
//!
//! Immutable per-instance parameters. Loadable from JSON; missing fields
//! take the defaults below.

use std::path::Path;

use anyhow::{Context, ensure};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_FIXED_DT, SIMULATION_EPSILON};
use crate::sim::collision::{CollisionFilter, CollisionShape};

/// Projectile parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Restitution in [0, 1]. Declared for tuning but not applied:
    /// reflection is always elastic.
    pub bounciness: f32,
    /// Launch speed along the spawn pose's forward direction
    pub initial_speed: f32,
    /// Constant acceleration
    pub gravity: Vec3,
    /// Layer mask handed to the collision backend
    pub collision_filter: CollisionFilter,
    /// Physics sub-step length (seconds)
    pub fixed_timestep: f32,
    /// Move the presentation position between fixed ticks
    pub extrapolate: bool,
    /// Payload attached to collision events
    pub damage: u32,
    /// Swept shape used for collision queries
    pub shape: CollisionShape,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            bounciness: 1.0,
            initial_speed: 40.0,
            gravity: Vec3::ZERO,
            collision_filter: CollisionFilter::ALL,
            fixed_timestep: DEFAULT_FIXED_DT,
            extrapolate: false,
            damage: 10,
            shape: CollisionShape::Ray,
        }
    }
}

impl ProjectileConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("invalid projectile config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_json(&json).with_context(|| format!("in {}", path.display()))?;
        log::info!("Loaded projectile config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.bounciness),
            "bounciness must be within [0, 1], got {}",
            self.bounciness
        );
        ensure!(
            self.initial_speed.is_finite() && self.initial_speed > 0.0,
            "initial_speed must be positive, got {}",
            self.initial_speed
        );
        ensure!(
            self.fixed_timestep.is_finite() && self.fixed_timestep > 0.0,
            "fixed_timestep must be positive, got {}",
            self.fixed_timestep
        );
        // Shorter sub-steps are skipped by the simulator and never pay off debt
        ensure!(
            self.fixed_timestep > SIMULATION_EPSILON,
            "fixed_timestep must exceed {}s, got {}",
            SIMULATION_EPSILON,
            self.fixed_timestep
        );
        ensure!(self.gravity.is_finite(), "gravity must be finite, got {}", self.gravity);
        if let CollisionShape::Sphere { radius } = self.shape {
            ensure!(
                radius.is_finite() && radius > 0.0,
                "sphere radius must be positive, got {}",
                radius
            );
        }
        Ok(())
    }

    /// Number of fixed sub-steps to run for the given accumulated debt.
    ///
    /// Only half of the owed steps are caught up per tick (at least one), and
    /// none while the debt does not exceed a single step.
    pub fn timesteps_for_debt(&self, time_debt: f32) -> u32 {
        if time_debt <= self.fixed_timestep {
            return 0;
        }
        let owed = (time_debt / self.fixed_timestep) as u32;
        (owed / 2).max(1)
    }
}
