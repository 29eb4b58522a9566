//! Collision notifications
//!
//! Subscribers are invoked synchronously, in registration order, from inside
//! the collision resolver. A handler can deactivate the projectile that hit
//! or remove itself through the [`CollisionContext`] it is handed.

use serde::{Deserialize, Serialize};

/// Identifier of a projectile instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(pub u32);

/// Emitted once per detected impact
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent<S> {
    /// Projectile that struck the surface
    pub projectile: ProjectileId,
    /// Surface handle reported by the collision backend
    pub surface: S,
    /// Damage payload from the projectile's config
    pub damage: u32,
}

/// Handle returned by [`CollisionSubscribers::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Requests a handler can make while it is being dispatched
#[derive(Debug, Default)]
pub struct CollisionContext {
    deactivate: bool,
    unsubscribe: bool,
}

impl CollisionContext {
    /// Deactivate the projectile. Takes effect before the resolver decides
    /// whether to keep simulating the rest of the sub-step.
    pub fn deactivate(&mut self) {
        self.deactivate = true;
    }

    /// Remove the calling handler once this dispatch returns
    pub fn unsubscribe(&mut self) {
        self.unsubscribe = true;
    }
}

pub type CollisionHandler<S> = Box<dyn FnMut(&CollisionEvent<S>, &mut CollisionContext)>;

struct Subscriber<S> {
    id: SubscriberId,
    handler: CollisionHandler<S>,
}

/// Ordered list of collision handlers
pub struct CollisionSubscribers<S> {
    next_id: u64,
    entries: Vec<Subscriber<S>>,
}

impl<S> Default for CollisionSubscribers<S> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<S> std::fmt::Debug for CollisionSubscribers<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionSubscribers")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl<S> CollisionSubscribers<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: FnMut(&CollisionEvent<S>, &mut CollisionContext) + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.entries.push(Subscriber {
            id,
            handler: Box::new(handler),
        });
        id
    }

    /// Returns `false` if `id` was not registered
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|sub| sub.id != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deliver `event` to every handler in registration order.
    ///
    /// Returns `true` if any handler asked for deactivation.
    pub fn emit(&mut self, event: &CollisionEvent<S>) -> bool {
        let mut deactivate = false;
        self.entries.retain_mut(|sub| {
            let mut ctx = CollisionContext::default();
            (sub.handler)(event, &mut ctx);
            deactivate |= ctx.deactivate;
            !ctx.unsubscribe
        });
        deactivate
    }
}
