//! Projectile simulation module
//!
//! Everything that affects the trajectory lives here:
//! - Fixed timestep only, driven explicitly by the host
//! - Pure kinematics, no hidden state
//! - Collision geometry behind the `CollisionBackend` seam
//! - No rendering or platform dependencies

pub mod collision;
pub mod events;
pub mod kinematics;
pub mod projectile;

pub use collision::{CollisionBackend, CollisionFilter, CollisionShape, Plane, PlaneWorld, SurfaceId, SweepHit};
pub use events::{CollisionContext, CollisionEvent, CollisionSubscribers, ProjectileId, SubscriberId};
pub use kinematics::{facing_rotation, reflect, step, vector_to};
pub use projectile::{Pose, Projectile, ProjectileState};
