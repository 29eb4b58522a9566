//! Bounce Sim entry point
//!
//! Runs a headless demo: a projectile launched into a corner made of a floor
//! and a wall, driven by jittered render frames and a fixed-rate host tick.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Context;
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use bounce_sim::consts::MAX_HOST_SUBSTEPS;
use bounce_sim::sim::{CollisionContext, CollisionEvent, Plane, PlaneWorld, SurfaceId};
use bounce_sim::{Pose, Projectile, ProjectileConfig, ProjectileId};

const FLOOR: SurfaceId = SurfaceId(1);
const WALL: SurfaceId = SurfaceId(2);

/// Bounces before the demo projectile retires itself
const MAX_BOUNCES: u32 = 6;
/// Length of the demo run (seconds of render time)
const RUN_SECONDS: f32 = 3.0;

fn demo_config() -> ProjectileConfig {
    ProjectileConfig {
        initial_speed: 15.0,
        gravity: Vec3::new(0.0, -9.81, 0.0),
        extrapolate: true,
        ..Default::default()
    }
}

fn demo_world() -> PlaneWorld {
    let mut world = PlaneWorld::new();
    world
        .add(Plane::new(FLOOR, Vec3::ZERO, Vec3::Y))
        .add(Plane::new(WALL, Vec3::new(12.0, 0.0, 0.0), Vec3::NEG_X));
    world
}

/// Host-side clock: render frames of varying length, fixed physics ticks
struct Host {
    accumulator: f32,
    fixed_dt: f32,
}

impl Host {
    /// Number of fixed ticks owed after a render frame of `dt`
    fn frame(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.min(0.1);

        let mut ticks = 0;
        while self.accumulator >= self.fixed_dt && ticks < MAX_HOST_SUBSTEPS {
            self.accumulator -= self.fixed_dt;
            ticks += 1;
        }
        ticks
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Bounce Sim starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => ProjectileConfig::load(&path)?,
        None => {
            log::warn!("No config path given, using demo config");
            demo_config()
        }
    };
    config.validate()?;

    let world = demo_world();
    let seed = 0x5eed_u64;
    let mut rng = Pcg32::seed_from_u64(seed);
    log::info!("Frame jitter seeded with: {}", seed);

    let mut projectile = Projectile::spawn(
        ProjectileId(1),
        config.clone(),
        Pose::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(1.0, 1.0, 0.0)),
    );

    let bounces = Rc::new(Cell::new(0u32));
    let counter = bounces.clone();
    projectile.subscribe(move |event: &CollisionEvent<SurfaceId>, ctx: &mut CollisionContext| {
        let n = counter.get() + 1;
        counter.set(n);
        let surface = if event.surface == FLOOR { "floor" } else { "wall" };
        log::info!("Bounce {} off the {} ({} damage)", n, surface, event.damage);
        if n >= MAX_BOUNCES {
            ctx.deactivate();
        }
    });

    let mut host = Host {
        accumulator: 0.0,
        fixed_dt: config.fixed_timestep,
    };

    let mut elapsed = 0.0;
    let mut frames = 0u32;
    let mut substeps = 0usize;
    while elapsed < RUN_SECONDS && projectile.is_active() {
        // 30-120 fps with jitter
        let dt = rng.random_range(1.0 / 120.0..1.0 / 30.0);
        elapsed += dt;
        frames += 1;

        for _ in 0..host.frame(dt) {
            substeps += projectile.advance(config.fixed_timestep, &world);
        }
        let shown = projectile.update_presentation(dt);

        if frames % 30 == 0 {
            log::info!(
                "t={:.2}s physics={} shown={} debt={:.3}",
                elapsed,
                projectile.position(),
                shown,
                projectile.time_debt()
            );
        }
    }

    log::info!(
        "Finished after {} frames, {} physics sub-steps, {} bounces",
        frames,
        substeps,
        bounces.get()
    );

    let summary = serde_json::to_string_pretty(&projectile.state()).context("failed to encode final state")?;
    println!("{summary}");
    Ok(())
}
