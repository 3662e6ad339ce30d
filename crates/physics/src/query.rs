//! Rapier-backed ray query for the grab controller.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{QueryFilter, RapierContext};

use crate::grab::{PhysicsQuery, TraceHit};

/// Casts against dynamic bodies only, so fixed and kinematic colliders (floor, the caster's
/// own capsule) are transparent to the grab trace. A hit collider is resolved to the rigid
/// body it is attached to, which may be a parent entity.
pub struct RapierPhysicsQuery<'a, L> {
    context: &'a RapierContext<'a>,
    exclude: Option<Entity>,
    locate: L,
}

impl<'a, L> RapierPhysicsQuery<'a, L>
where
    L: Fn(Entity) -> Option<Vec3>,
{
    /// `locate` resolves a body entity to its world position (usually via `GlobalTransform`).
    pub fn new(context: &'a RapierContext<'a>, locate: L) -> Self {
        Self {
            context,
            exclude: None,
            locate,
        }
    }

    pub fn excluding(mut self, entity: Entity) -> Self {
        self.exclude = Some(entity);
        self
    }

    /// Rigid body owning `collider`, or the collider itself when it has no parent body.
    fn body_of(&self, collider: Entity) -> Entity {
        self.context
            .colliders
            .collider_parent(self.context.rigidbody_set, collider)
            .unwrap_or(collider)
    }
}

impl<L> PhysicsQuery for RapierPhysicsQuery<'_, L>
where
    L: Fn(Entity) -> Option<Vec3>,
{
    fn cast_physics_ray(
        &self,
        origin: Vec3,
        dir: Dir3,
        max_distance: f32,
        ignore: Option<Entity>,
    ) -> Option<TraceHit> {
        let not_ignored = |collider: Entity| ignore != Some(self.body_of(collider));
        let mut filter = QueryFilter::only_dynamic();
        if let Some(e) = self.exclude {
            filter = filter.exclude_collider(e).exclude_rigid_body(e);
        }
        if ignore.is_some() {
            filter = filter.predicate(&not_ignored);
        }
        let (collider, toi) = self
            .context
            .cast_ray(origin, dir.as_vec3(), max_distance, true, filter)?;
        let body = self.body_of(collider);
        let point = origin + dir * toi;
        Some(TraceHit {
            body,
            point,
            distance: toi,
            body_location: (self.locate)(body).unwrap_or(point),
        })
    }
}
